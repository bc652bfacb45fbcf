//! Data structures for storing a blockchain's blocks in-memory.
#![warn(missing_docs)]

mod reservable;
mod sparse;

use devchain_primitives::B256;

pub use self::{
    reservable::{PreviousBlockData, Reservation, ReservableSparseBlockStorage},
    sparse::SparseBlockStorage,
};

/// An error that occurs when trying to insert a block into storage.
#[derive(Debug, thiserror::Error)]
pub enum InsertBlockError {
    /// Block already exists
    #[error("A block with hash {block_hash} already exists.")]
    DuplicateBlock {
        /// The block's hash
        block_hash: B256,
    },
    /// Block number already exists
    #[error("A block with number {block_number} already exists.")]
    DuplicateBlockNumber {
        /// The block's number
        block_number: u64,
    },
    /// Transaction already exists
    #[error("A transaction with hash {hash} already exists.")]
    DuplicateTransaction {
        /// Hash of duplicated transaction
        hash: B256,
    },
}

/// An error that occurs when trying to reserve blocks.
#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    /// The last reserved block number would exceed `u64::MAX`
    #[error("Cannot reserve {additional} blocks after block {last_block_number}: block number overflow")]
    BlockNumberOverflow {
        /// The number of blocks to reserve
        additional: u64,
        /// The last block number before the reservation
        last_block_number: u64,
    },
    /// The timestamp of the last reserved block would exceed `u64::MAX`
    #[error("Cannot reserve {additional} blocks with interval {interval} after timestamp {previous_timestamp}: timestamp overflow")]
    TimestampOverflow {
        /// The number of blocks to reserve
        additional: u64,
        /// The timestamp spacing between reserved blocks
        interval: u64,
        /// The timestamp of the last block before the reservation
        previous_timestamp: u64,
    },
}
