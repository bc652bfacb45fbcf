//! Consensus algorithms and their header validation rules.
#![warn(missing_docs)]

use core::fmt::Debug;
use std::sync::Arc;

use auto_impl::auto_impl;
use devchain_block_api::BlockHeader;
use devchain_primitives::U256;

/// Length of the vanity prefix of a clique block's extra data.
pub const CLIQUE_EXTRA_VANITY: usize = 32;

/// Length of the seal suffix of a clique block's extra data.
pub const CLIQUE_EXTRA_SEAL: usize = 65;

/// A consensus algorithm, selected by name.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConsensusAlgorithm {
    /// Proof-of-work
    Ethash,
    /// Proof-of-stake
    Casper,
    /// Proof-of-authority
    Clique,
}

/// An error that occurs when a header violates the consensus rules.
#[derive(Debug, thiserror::Error)]
pub enum ConsensusError {
    /// Proof-of-work blocks must have a difficulty
    #[error("Block {number} has zero difficulty, which is invalid for proof-of-work.")]
    ZeroDifficulty {
        /// The block's number
        number: u64,
    },
    /// Proof-of-stake blocks must not have a difficulty
    #[error("Block {number} has difficulty {difficulty}, but proof-of-stake blocks must have zero difficulty.")]
    NonZeroDifficulty {
        /// The block's number
        number: u64,
        /// The block's difficulty
        difficulty: U256,
    },
    /// Clique blocks must carry a vanity and a seal
    #[error("Block {number} has {actual} bytes of extra data, but clique requires at least {minimum}.")]
    MissingCliqueSeal {
        /// The block's number
        number: u64,
        /// The length of the block's extra data
        actual: usize,
        /// The minimum length of the extra data
        minimum: usize,
    },
}

/// Trait for validating headers according to a consensus algorithm.
#[auto_impl(&, Arc, Box)]
pub trait ConsensusValidator: Debug + Send + Sync {
    /// Returns the validator's consensus algorithm.
    fn algorithm(&self) -> ConsensusAlgorithm;

    /// Validates the header of a block that is about to be inserted.
    fn validate_header(&self, header: &BlockHeader) -> Result<(), ConsensusError>;
}

/// Proof-of-work validator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ethash;

impl ConsensusValidator for Ethash {
    fn algorithm(&self) -> ConsensusAlgorithm {
        ConsensusAlgorithm::Ethash
    }

    fn validate_header(&self, header: &BlockHeader) -> Result<(), ConsensusError> {
        if header.difficulty.is_zero() {
            return Err(ConsensusError::ZeroDifficulty {
                number: header.number,
            });
        }

        Ok(())
    }
}

/// Proof-of-stake validator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Casper;

impl ConsensusValidator for Casper {
    fn algorithm(&self) -> ConsensusAlgorithm {
        ConsensusAlgorithm::Casper
    }

    fn validate_header(&self, header: &BlockHeader) -> Result<(), ConsensusError> {
        if !header.difficulty.is_zero() {
            return Err(ConsensusError::NonZeroDifficulty {
                number: header.number,
                difficulty: header.difficulty,
            });
        }

        Ok(())
    }
}

/// Proof-of-authority validator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Clique;

impl ConsensusValidator for Clique {
    fn algorithm(&self) -> ConsensusAlgorithm {
        ConsensusAlgorithm::Clique
    }

    fn validate_header(&self, header: &BlockHeader) -> Result<(), ConsensusError> {
        let minimum = CLIQUE_EXTRA_VANITY + CLIQUE_EXTRA_SEAL;
        if header.extra_data.len() < minimum {
            return Err(ConsensusError::MissingCliqueSeal {
                number: header.number,
                actual: header.extra_data.len(),
                minimum,
            });
        }

        Ok(())
    }
}

/// Constructs the validator for the provided consensus algorithm.
pub fn validator_for(algorithm: ConsensusAlgorithm) -> Arc<dyn ConsensusValidator> {
    match algorithm {
        ConsensusAlgorithm::Ethash => Arc::new(Ethash),
        ConsensusAlgorithm::Casper => Arc::new(Casper),
        ConsensusAlgorithm::Clique => Arc::new(Clique),
    }
}
