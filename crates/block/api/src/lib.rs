//! Ethereum block types and block-level rules shared by all blockchain
//! implementations.
#![warn(missing_docs)]

mod block_spec;
mod header;
mod safe;

use std::sync::Arc;

use devchain_primitives::{B256, U256};
use devchain_transaction::Transaction;

pub use self::{
    block_spec::BlockSpec,
    header::BlockHeader,
    safe::{is_safe_block_number, largest_safe_block_number, safe_block_depth},
};

/// An Ethereum block.
///
/// Blocks are immutable once constructed. The hash is computed from the
/// header for local blocks, or taken verbatim from the remote node for
/// blocks fetched from a remote chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    hash: B256,
    header: BlockHeader,
    transactions: Vec<Transaction>,
}

impl Block {
    /// Constructs a new block, computing its hash from the header.
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            hash: header.hash(),
            header,
            transactions,
        }
    }

    /// Constructs a block with a known hash. Used for blocks whose hash
    /// cannot be reproduced locally, e.g. blocks fetched from a remote chain.
    pub fn with_hash(hash: B256, header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            hash,
            header,
            transactions,
        }
    }

    /// Returns the block's hash.
    pub fn block_hash(&self) -> &B256 {
        &self.hash
    }

    /// Returns the block's header.
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    /// Returns the block's transactions.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

/// The result returned by inserting a block.
#[derive(Clone, Debug)]
pub struct BlockAndTotalDifficulty {
    /// The block
    pub block: Arc<Block>,
    /// The total difficulty with the block
    pub total_difficulty: Option<U256>,
}

/// Error that occurs when trying to insert a block that does not extend the
/// current tip.
#[derive(Debug, thiserror::Error)]
pub enum BlockValidityError {
    /// Invalid block number
    #[error("Invalid block number: {actual}. Expected: {expected}.")]
    InvalidBlockNumber {
        /// Provided block number
        actual: u64,
        /// Expected block number
        expected: u64,
    },
    /// Invalid parent hash
    #[error("Invalid parent hash: {actual}. Expected: {expected}.")]
    InvalidParentHash {
        /// Provided parent hash
        actual: B256,
        /// Expected parent hash
        expected: B256,
    },
}

/// Validates whether `next_block` is a valid successor of `last_block`.
///
/// The parent hash is only checked when `check_parent_hash` is set. A forked
/// blockchain skips the check for the first block after the fork, as the
/// remote chain's hashes cannot always be reproduced locally.
pub fn validate_next_block(
    last_block: &Block,
    next_block: &Block,
    check_parent_hash: bool,
) -> Result<(), BlockValidityError> {
    let last_header = last_block.header();
    let next_header = next_block.header();

    let next_block_number = last_header.number + 1;
    if next_header.number != next_block_number {
        return Err(BlockValidityError::InvalidBlockNumber {
            actual: next_header.number,
            expected: next_block_number,
        });
    }

    if check_parent_hash && next_header.parent_hash != *last_block.block_hash() {
        return Err(BlockValidityError::InvalidParentHash {
            actual: next_header.parent_hash,
            expected: *last_block.block_hash(),
        });
    }

    Ok(())
}
