//! A blockchain consisting of locally created blocks.
#![warn(missing_docs)]

use std::{num::NonZeroU64, sync::Arc};

use devchain_block_api::{
    Block, BlockAndTotalDifficulty, BlockValidityError, validate_next_block,
};
use devchain_block_storage::{InsertBlockError, ReservableSparseBlockStorage, ReservationError};
use devchain_blockchain_api::{
    BlockHashByNumber, BlockchainMetadata, GetBlockchainBlock, GetBlockchainLogs, InsertBlock,
    ReceiptByTransactionHash, ReserveBlocks, RevertToBlock, TotalDifficultyByBlockHash,
    next_total_difficulty,
};
use devchain_consensus::ConsensusValidator;
use devchain_primitives::{Address, B256, HashSet, U256};
use devchain_receipt::{TransactionReceipt, log::FilterLog};
use devchain_transaction::Transaction;

/// An error that occurs upon creation of a [`LocalBlockchain`].
#[derive(Debug, thiserror::Error)]
pub enum InvalidGenesisBlock {
    /// Invalid block number in the genesis block.
    #[error("Invalid block number: {actual}. Expected: 0")]
    InvalidBlockNumber {
        /// The actual block number.
        actual: u64,
    },
    /// The genesis block must not have a parent.
    #[error("Invalid parent hash: {actual}. Expected: the zero hash")]
    InvalidParentHash {
        /// The actual parent hash.
        actual: B256,
    },
}

/// An error that occurs in a [`LocalBlockchain`].
#[derive(Debug, thiserror::Error)]
pub enum LocalBlockchainError {
    /// The genesis block cannot be deleted
    #[error("The genesis block cannot be deleted")]
    CannotDeleteGenesis,
    /// Storage insertion failed
    #[error(transparent)]
    Insert(#[from] InsertBlockError),
    /// The provided block does not match the stored block at its number
    #[error("Invalid block {number}: expected hash {expected}, but the stored block has hash {actual}")]
    InvalidBlock {
        /// The block number
        number: u64,
        /// Hash of the provided block
        expected: B256,
        /// Hash of the stored block
        actual: B256,
    },
    /// The block is not a valid successor of the last block
    #[error(transparent)]
    InvalidNextBlock(#[from] BlockValidityError),
    /// Reserving blocks failed
    #[error(transparent)]
    Reservation(#[from] ReservationError),
    /// Block hash does not exist in blockchain
    #[error("Unknown block hash: {hash}")]
    UnknownBlockHash {
        /// The block hash
        hash: B256,
    },
    /// Block number does not exist in blockchain
    #[error("Unknown block number")]
    UnknownBlockNumber,
}

/// A blockchain consisting of locally created blocks.
#[derive(Debug)]
pub struct LocalBlockchain {
    storage: ReservableSparseBlockStorage,
    chain_id: u64,
    network_id: u64,
    consensus: Arc<dyn ConsensusValidator>,
}

impl LocalBlockchain {
    /// Constructs a new instance with the provided genesis block, validating a
    /// zero block number and a zero parent hash.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn new(
        genesis_block: Block,
        chain_id: u64,
        network_id: u64,
        consensus: Arc<dyn ConsensusValidator>,
    ) -> Result<Self, InvalidGenesisBlock> {
        let genesis_header = genesis_block.header();

        if genesis_header.number != 0 {
            return Err(InvalidGenesisBlock::InvalidBlockNumber {
                actual: genesis_header.number,
            });
        }

        if genesis_header.parent_hash != B256::ZERO {
            return Err(InvalidGenesisBlock::InvalidParentHash {
                actual: genesis_header.parent_hash,
            });
        }

        let total_difficulty = next_total_difficulty(&genesis_block, None);
        let storage = ReservableSparseBlockStorage::with_genesis_block(genesis_block, total_difficulty);

        Ok(Self {
            storage,
            chain_id,
            network_id,
            consensus,
        })
    }

    /// Retrieves the underlying storage.
    pub fn storage(&self) -> &ReservableSparseBlockStorage {
        &self.storage
    }
}

impl BlockHashByNumber for LocalBlockchain {
    type Error = LocalBlockchainError;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn block_hash_by_number(&mut self, block_number: u64) -> Result<B256, Self::Error> {
        self.storage
            .block_by_number(block_number)?
            .map(|block| *block.block_hash())
            .ok_or(LocalBlockchainError::UnknownBlockNumber)
    }
}

impl BlockchainMetadata for LocalBlockchain {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn consensus(&self) -> &dyn ConsensusValidator {
        self.consensus.as_ref()
    }

    fn last_block_number(&self) -> u64 {
        self.storage.last_block_number()
    }

    fn network_id(&self) -> u64 {
        self.network_id
    }
}

impl GetBlockchainBlock for LocalBlockchain {
    type Error = LocalBlockchainError;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn block_by_hash(&mut self, hash: &B256) -> Result<Option<Arc<Block>>, Self::Error> {
        Ok(self.storage.block_by_hash(hash))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn block_by_number(&mut self, number: u64) -> Result<Option<Arc<Block>>, Self::Error> {
        Ok(self.storage.block_by_number(number)?)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn block_by_transaction_hash(
        &mut self,
        transaction_hash: &B256,
    ) -> Result<Option<Arc<Block>>, Self::Error> {
        Ok(self.storage.block_by_transaction_hash(transaction_hash))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn last_block(&mut self) -> Result<Arc<Block>, Self::Error> {
        let last_block = self
            .storage
            .block_by_number(self.storage.last_block_number())?
            .expect("Block must exist");

        Ok(last_block)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn transaction_by_hash(
        &mut self,
        transaction_hash: &B256,
    ) -> Result<Option<Transaction>, Self::Error> {
        Ok(self.storage.transaction_by_hash(transaction_hash).cloned())
    }
}

impl GetBlockchainLogs for LocalBlockchain {
    type Error = LocalBlockchainError;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn logs(
        &mut self,
        from_block: u64,
        to_block: u64,
        addresses: &HashSet<Address>,
        normalized_topics: &[Option<Vec<B256>>],
    ) -> Result<Vec<FilterLog>, Self::Error> {
        Ok(self
            .storage
            .logs(from_block, to_block, addresses, normalized_topics))
    }
}

impl InsertBlock for LocalBlockchain {
    type Error = LocalBlockchainError;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn insert_block(&mut self, block: Block) -> Result<BlockAndTotalDifficulty, Self::Error> {
        let last_block = self.last_block()?;

        validate_next_block(&last_block, &block, true)?;

        let previous_total_difficulty = self.storage.total_difficulty_by_hash(last_block.block_hash());
        let total_difficulty = next_total_difficulty(&block, previous_total_difficulty);

        let block = self.storage.insert_block(block, total_difficulty)?;

        Ok(BlockAndTotalDifficulty {
            block: block.clone(),
            total_difficulty: Some(total_difficulty),
        })
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn insert_receipts(&mut self, receipts: Vec<TransactionReceipt>) -> Result<(), Self::Error> {
        self.storage.insert_receipts(receipts);

        Ok(())
    }
}

impl ReceiptByTransactionHash for LocalBlockchain {
    type Error = LocalBlockchainError;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn receipt_by_transaction_hash(
        &mut self,
        transaction_hash: &B256,
    ) -> Result<Option<Arc<TransactionReceipt>>, Self::Error> {
        Ok(self.storage.receipt_by_transaction_hash(transaction_hash))
    }
}

impl ReserveBlocks for LocalBlockchain {
    type Error = LocalBlockchainError;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn reserve_blocks(&mut self, additional: u64, interval: u64) -> Result<(), Self::Error> {
        let additional = if let Some(additional) = NonZeroU64::new(additional) {
            additional
        } else {
            return Ok(()); // nothing to do
        };

        let previous_block = self
            .storage
            .previous_block_data()
            .expect("The last block is either stored or reserved");

        self.storage
            .reserve_blocks(additional, interval, previous_block)?;

        Ok(())
    }
}

impl RevertToBlock for LocalBlockchain {
    type Error = LocalBlockchainError;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn delete_block(&mut self, hash: &B256) -> Result<(), Self::Error> {
        let block = self
            .storage
            .block_by_hash(hash)
            .ok_or(LocalBlockchainError::UnknownBlockHash { hash: *hash })?;

        let block_number = block.header().number;
        if block_number == 0 {
            return Err(LocalBlockchainError::CannotDeleteGenesis);
        }

        self.revert_to_block(block_number - 1)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn delete_later_blocks(&mut self, block: &Block) -> Result<(), Self::Error> {
        let block_number = block.header().number;
        let stored = self
            .storage
            .block_by_number(block_number)?
            .ok_or(LocalBlockchainError::UnknownBlockNumber)?;

        if stored.block_hash() != block.block_hash() {
            return Err(LocalBlockchainError::InvalidBlock {
                number: block_number,
                expected: *block.block_hash(),
                actual: *stored.block_hash(),
            });
        }

        self.revert_to_block(block_number)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn revert_to_block(&mut self, block_number: u64) -> Result<(), Self::Error> {
        if self.storage.revert_to_block(block_number) {
            Ok(())
        } else {
            Err(LocalBlockchainError::UnknownBlockNumber)
        }
    }
}

impl TotalDifficultyByBlockHash for LocalBlockchain {
    type Error = LocalBlockchainError;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn total_difficulty_by_hash(&mut self, hash: &B256) -> Result<Option<U256>, Self::Error> {
        Ok(self.storage.total_difficulty_by_hash(hash))
    }
}
