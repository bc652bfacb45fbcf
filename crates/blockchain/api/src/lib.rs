//! Types for Ethereum blockchains
#![warn(missing_docs)]

mod criteria;
mod difficulty;
pub mod sync;

use std::sync::Arc;

use auto_impl::auto_impl;
use devchain_block_api::{Block, BlockAndTotalDifficulty};
use devchain_consensus::ConsensusValidator;
use devchain_primitives::{Address, B256, HashSet, U256};
use devchain_receipt::{TransactionReceipt, log::FilterLog};
use devchain_transaction::Transaction;

pub use self::{
    criteria::{LogFilterCriteria, logs_by_criteria},
    difficulty::next_total_difficulty,
};

/// Trait for retrieving a block's hash by number.
#[auto_impl(&mut, Box)]
pub trait BlockHashByNumber {
    /// The blockchain's error type.
    type Error;

    /// Retrieves the block hash at the provided number.
    fn block_hash_by_number(&mut self, block_number: u64) -> Result<B256, Self::Error>;
}

/// Trait for retrieving blockchain metadata.
#[auto_impl(&, &mut, Box)]
pub trait BlockchainMetadata {
    /// Retrieves the instance's chain ID.
    fn chain_id(&self) -> u64;

    /// Retrieves the consensus validator used for new blocks.
    fn consensus(&self) -> &dyn ConsensusValidator;

    /// Retrieves the last block number in the blockchain.
    fn last_block_number(&self) -> u64;

    /// Retrieves the network ID of the blockchain.
    fn network_id(&self) -> u64;
}

/// Trait for retrieving blocks and transactions.
///
/// Lookups take `&mut self` as they may materialize reserved blocks or cache
/// data fetched from a remote chain.
#[auto_impl(&mut, Box)]
pub trait GetBlockchainBlock {
    /// The blockchain's error type
    type Error;

    /// Retrieves the block with the provided hash, if it exists.
    fn block_by_hash(&mut self, hash: &B256) -> Result<Option<Arc<Block>>, Self::Error>;

    /// Retrieves the block with the provided number, if it exists.
    fn block_by_number(&mut self, number: u64) -> Result<Option<Arc<Block>>, Self::Error>;

    /// Retrieves the block that contains a transaction with the provided hash,
    /// if it exists.
    fn block_by_transaction_hash(
        &mut self,
        transaction_hash: &B256,
    ) -> Result<Option<Arc<Block>>, Self::Error>;

    /// Retrieves the last block in the blockchain.
    fn last_block(&mut self) -> Result<Arc<Block>, Self::Error>;

    /// Retrieves the transaction with the provided hash, if it exists.
    fn transaction_by_hash(
        &mut self,
        transaction_hash: &B256,
    ) -> Result<Option<Transaction>, Self::Error>;
}

/// Trait for retrieving logs from the blockchain.
#[auto_impl(&mut, Box)]
pub trait GetBlockchainLogs {
    /// The blockchain's error type
    type Error;

    /// Retrieves the logs that match the provided filter.
    fn logs(
        &mut self,
        from_block: u64,
        to_block: u64,
        addresses: &HashSet<Address>,
        normalized_topics: &[Option<Vec<B256>>],
    ) -> Result<Vec<FilterLog>, Self::Error>;
}

/// Trait for implementations of a mutable Ethereum blockchain
#[auto_impl(&mut, Box)]
pub trait InsertBlock {
    /// The blockchain's error type
    type Error;

    /// Inserts the provided block as the new tip, returning the inserted block
    /// and its total difficulty.
    fn insert_block(&mut self, block: Block) -> Result<BlockAndTotalDifficulty, Self::Error>;

    /// Inserts the provided receipts, replacing any receipts of the same
    /// transactions.
    fn insert_receipts(&mut self, receipts: Vec<TransactionReceipt>) -> Result<(), Self::Error>;
}

/// Trait for retrieving a receipt by its transaction hash.
#[auto_impl(&mut, Box)]
pub trait ReceiptByTransactionHash {
    /// The blockchain's error type
    type Error;

    /// Retrieves the receipt of the transaction with the provided hash, if it
    /// exists.
    fn receipt_by_transaction_hash(
        &mut self,
        transaction_hash: &B256,
    ) -> Result<Option<Arc<TransactionReceipt>>, Self::Error>;
}

/// Trait for reserving blocks in the blockchain.
#[auto_impl(&mut, Box)]
pub trait ReserveBlocks {
    /// The blockchain's error type
    type Error;

    /// Reserves the provided number of blocks, starting from the next block
    /// number.
    fn reserve_blocks(&mut self, additional: u64, interval: u64) -> Result<(), Self::Error>;
}

/// Trait for removing blocks from the tip of the blockchain.
#[auto_impl(&mut, Box)]
pub trait RevertToBlock {
    /// The blockchain's error type
    type Error;

    /// Deletes the block with the provided hash and all later blocks.
    fn delete_block(&mut self, hash: &B256) -> Result<(), Self::Error>;

    /// Deletes all blocks after the provided block, which must match the
    /// stored block at its number.
    fn delete_later_blocks(&mut self, block: &Block) -> Result<(), Self::Error>;

    /// Reverts to the block with the provided number, deleting all later
    /// blocks.
    fn revert_to_block(&mut self, block_number: u64) -> Result<(), Self::Error>;
}

/// Trait for retrieving the total difficulty by its block hash.
#[auto_impl(&mut, Box)]
pub trait TotalDifficultyByBlockHash {
    /// The blockchain's error type
    type Error;

    /// Retrieves the total difficulty at the block with the provided hash.
    fn total_difficulty_by_hash(&mut self, hash: &B256) -> Result<Option<U256>, Self::Error>;
}

/// Super-trait for implementations of an Ethereum blockchain.
pub trait Blockchain<BlockchainErrorT>:
    BlockHashByNumber<Error = BlockchainErrorT>
    + BlockchainMetadata
    + GetBlockchainBlock<Error = BlockchainErrorT>
    + GetBlockchainLogs<Error = BlockchainErrorT>
    + InsertBlock<Error = BlockchainErrorT>
    + ReceiptByTransactionHash<Error = BlockchainErrorT>
    + ReserveBlocks<Error = BlockchainErrorT>
    + RevertToBlock<Error = BlockchainErrorT>
    + TotalDifficultyByBlockHash<Error = BlockchainErrorT>
{
}

impl<BlockchainT, BlockchainErrorT> Blockchain<BlockchainErrorT> for BlockchainT where
    BlockchainT: BlockHashByNumber<Error = BlockchainErrorT>
        + BlockchainMetadata
        + GetBlockchainBlock<Error = BlockchainErrorT>
        + GetBlockchainLogs<Error = BlockchainErrorT>
        + InsertBlock<Error = BlockchainErrorT>
        + ReceiptByTransactionHash<Error = BlockchainErrorT>
        + ReserveBlocks<Error = BlockchainErrorT>
        + RevertToBlock<Error = BlockchainErrorT>
        + TotalDifficultyByBlockHash<Error = BlockchainErrorT>
{
}
