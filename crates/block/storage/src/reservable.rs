use std::{num::NonZeroU64, sync::Arc};

use devchain_block_api::{Block, BlockHeader};
use devchain_primitives::{Address, B256, HashSet, U256};
use devchain_receipt::{TransactionReceipt, log::FilterLog};
use devchain_transaction::Transaction;

use super::{InsertBlockError, ReservationError, SparseBlockStorage};

/// Data of the block preceding a reservation, used to synthesize the reserved
/// blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviousBlockData {
    /// The previous block's base fee
    pub base_fee_per_gas: Option<u128>,
    /// The previous block's gas limit
    pub gas_limit: u64,
    /// The previous block's state root
    pub state_root: B256,
    /// The previous block's timestamp
    pub timestamp: u64,
    /// The previous block's total difficulty
    pub total_difficulty: U256,
}

impl PreviousBlockData {
    /// Extracts the data from the provided block and its total difficulty.
    pub fn new(block: &Block, total_difficulty: U256) -> Self {
        let header = block.header();

        Self {
            base_fee_per_gas: header.base_fee_per_gas,
            gas_limit: header.gas_limit,
            state_root: header.state_root,
            timestamp: header.timestamp,
            total_difficulty,
        }
    }
}

/// A reservation for a sequence of blocks that have not yet been inserted into
/// storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reservation {
    /// The first reserved block number
    pub first_number: u64,
    /// The last reserved block number
    pub last_number: u64,
    /// The timestamp spacing between reserved blocks
    pub interval: u64,
    /// Base fee of the block preceding the reservation
    pub previous_base_fee_per_gas: Option<u128>,
    /// Gas limit of the block preceding the reservation
    pub previous_gas_limit: u64,
    /// State root of the block preceding the reservation
    pub previous_state_root: B256,
    /// Timestamp of block `first_number - 1`. Needed when that block is
    /// neither stored nor reserved, e.g. the fork block of a forked chain.
    pub previous_timestamp: u64,
    /// Total difficulty of the block preceding the reservation
    pub previous_total_difficulty: U256,
}

impl Reservation {
    /// Whether the reservation covers the provided block number.
    pub fn contains(&self, block_number: u64) -> bool {
        self.first_number <= block_number && block_number <= self.last_number
    }
}

/// A storage solution for storing a subset of a blockchain's blocks in-memory,
/// while lazily materializing blocks that have been reserved.
///
/// Every block number up to the last block number is either stored or covered
/// by exactly one reservation; blocks before the first stored block may be
/// absent. No internal locking is performed: callers are expected to
/// serialize access.
#[derive(Debug)]
pub struct ReservableSparseBlockStorage {
    reservations: Vec<Reservation>,
    storage: SparseBlockStorage,
    last_block_number: u64,
}

impl ReservableSparseBlockStorage {
    /// Constructs a new instance with no blocks.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn empty(last_block_number: u64) -> Self {
        Self {
            reservations: Vec::new(),
            storage: SparseBlockStorage::default(),
            last_block_number,
        }
    }

    /// Constructs a new instance with the provided block as genesis block.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn with_genesis_block(block: Block, total_difficulty: U256) -> Self {
        Self {
            reservations: Vec::new(),
            last_block_number: block.header().number,
            storage: SparseBlockStorage::with_block(block, total_difficulty),
        }
    }

    /// Retrieves the last block number.
    pub fn last_block_number(&self) -> u64 {
        self.last_block_number
    }

    /// Retrieves the current reservations.
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    /// Retrieves the block by hash, if it exists.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn block_by_hash(&self, hash: &B256) -> Option<Arc<Block>> {
        self.storage.block_by_hash(hash).cloned()
    }

    /// Retrieves the block by number, if it exists. A reserved block is
    /// materialized first.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn block_by_number(&mut self, number: u64) -> Result<Option<Arc<Block>>, InsertBlockError> {
        if let Some(block) = self.fulfill_block_reservation(number)? {
            return Ok(Some(block));
        }

        Ok(self.storage.block_by_number(number).cloned())
    }

    /// Retrieves the block that contains the transaction with the provided
    /// hash, if it exists.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn block_by_transaction_hash(&self, transaction_hash: &B256) -> Option<Arc<Block>> {
        self.storage
            .block_by_transaction_hash(transaction_hash)
            .cloned()
    }

    /// Retrieves whether a block with the provided number is stored.
    pub fn contains_block_number(&self, number: u64) -> bool {
        self.storage.contains_block_number(number)
    }

    /// Retrieves the transaction with the provided hash, if it exists.
    pub fn transaction_by_hash(&self, transaction_hash: &B256) -> Option<&Transaction> {
        self.storage.transaction_by_hash(transaction_hash)
    }

    /// Retrieves the receipt of the transaction with the provided hash, if it
    /// exists.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn receipt_by_transaction_hash(
        &self,
        transaction_hash: &B256,
    ) -> Option<Arc<TransactionReceipt>> {
        self.storage
            .receipt_by_transaction_hash(transaction_hash)
            .cloned()
    }

    /// Retrieves the total difficulty of the block with the provided hash.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn total_difficulty_by_hash(&self, hash: &B256) -> Option<U256> {
        self.storage.total_difficulty_by_hash(hash).copied()
    }

    /// Retrieves the logs that match the provided filter. Reserved blocks are
    /// empty and therefore skipped without being materialized.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn logs(
        &self,
        from_block: u64,
        to_block: u64,
        addresses: &HashSet<Address>,
        normalized_topics: &[Option<Vec<B256>>],
    ) -> Vec<FilterLog> {
        self.storage
            .logs(from_block, to_block, addresses, normalized_topics)
    }

    /// Inserts a block as the new tip. Errors if a block with the same hash or
    /// number already exists.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn insert_block(
        &mut self,
        block: Block,
        total_difficulty: U256,
    ) -> Result<&Arc<Block>, InsertBlockError> {
        let block_number = block.header().number;
        let block = self.storage.insert_block(block, total_difficulty)?;
        self.last_block_number = block_number;

        Ok(block)
    }

    /// Inserts a receipt, replacing any receipt of the same transaction.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn insert_receipt(&mut self, receipt: TransactionReceipt) -> Arc<TransactionReceipt> {
        self.storage.insert_receipt(receipt).clone()
    }

    /// Inserts multiple receipts, replacing any receipts of the same
    /// transactions.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn insert_receipts(&mut self, receipts: impl IntoIterator<Item = TransactionReceipt>) {
        self.storage.insert_receipts(receipts);
    }

    /// Whether the provided block number is covered by a reservation.
    pub fn is_reserved_block(&self, block_number: u64) -> bool {
        find_reservation(&self.reservations, block_number).is_some()
    }

    /// Reserves the provided number of blocks, starting from the next block
    /// number.
    ///
    /// Fails if the last reserved block number or its timestamp would
    /// overflow.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn reserve_blocks(
        &mut self,
        additional: NonZeroU64,
        interval: u64,
        previous_block: PreviousBlockData,
    ) -> Result<(), ReservationError> {
        let last_number = self
            .last_block_number
            .checked_add(additional.get())
            .ok_or(ReservationError::BlockNumberOverflow {
                additional: additional.get(),
                last_block_number: self.last_block_number,
            })?;

        // Timestamps of all reserved blocks are bounded by that of the last one
        interval
            .checked_mul(additional.get())
            .and_then(|elapsed| previous_block.timestamp.checked_add(elapsed))
            .ok_or(ReservationError::TimestampOverflow {
                additional: additional.get(),
                interval,
                previous_timestamp: previous_block.timestamp,
            })?;

        let reservation = Reservation {
            first_number: self.last_block_number + 1,
            last_number,
            interval,
            previous_base_fee_per_gas: previous_block.base_fee_per_gas,
            previous_gas_limit: previous_block.gas_limit,
            previous_state_root: previous_block.state_root,
            previous_timestamp: previous_block.timestamp,
            previous_total_difficulty: previous_block.total_difficulty,
        };

        self.reservations.push(reservation);
        self.last_block_number = last_number;

        Ok(())
    }

    /// Data of the last block, computed without materializing it when the
    /// last block is reserved.
    ///
    /// Returns `None` if the last block is neither stored nor reserved.
    pub fn previous_block_data(&self) -> Option<PreviousBlockData> {
        if let Some(block) = self.storage.block_by_number(self.last_block_number) {
            let total_difficulty = *self
                .storage
                .total_difficulty_by_hash(block.block_hash())
                .expect("Must exist as its block is stored");

            return Some(PreviousBlockData::new(block, total_difficulty));
        }

        find_reservation(&self.reservations, self.last_block_number).map(|reservation| {
            PreviousBlockData {
                base_fee_per_gas: reservation.previous_base_fee_per_gas,
                gas_limit: reservation.previous_gas_limit,
                state_root: reservation.previous_state_root,
                timestamp: reserved_timestamp(
                    reservation.previous_timestamp,
                    reservation.interval,
                    self.last_block_number - reservation.first_number + 1,
                ),
                total_difficulty: reservation.previous_total_difficulty,
            }
        })
    }

    /// Materializes the reserved block with the provided number.
    ///
    /// The covering reservation is replaced by up to two reservations for the
    /// block numbers strictly before and strictly after the block. Returns
    /// `None` if the block number is not reserved.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn fulfill_block_reservation(
        &mut self,
        block_number: u64,
    ) -> Result<Option<Arc<Block>>, InsertBlockError> {
        let Some(idx) = self
            .reservations
            .iter()
            .position(|reservation| reservation.contains(block_number))
        else {
            return Ok(None);
        };

        let reservation = self.reservations.swap_remove(idx);
        if block_number != reservation.first_number {
            self.reservations.push(Reservation {
                last_number: block_number - 1,
                ..reservation.clone()
            });
        }

        let timestamp = self.timestamp_for_reserved_block(&reservation, block_number);

        if block_number != reservation.last_number {
            self.reservations.push(Reservation {
                first_number: block_number + 1,
                previous_timestamp: timestamp,
                ..reservation.clone()
            });
        }

        let block = Block::new(
            BlockHeader {
                number: block_number,
                state_root: reservation.previous_state_root,
                base_fee_per_gas: reservation.previous_base_fee_per_gas,
                gas_limit: reservation.previous_gas_limit,
                timestamp,
                ..BlockHeader::default()
            },
            Vec::new(),
        );

        let block = self
            .storage
            .insert_block(block, reservation.previous_total_difficulty)?
            .clone();

        Ok(Some(block))
    }

    /// Removes the reservation covering the provided block number, without
    /// materializing any blocks. Block numbers of the reservation before the
    /// provided number remain reserved.
    ///
    /// Returns the original reservation, if any.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn cancel_reservation_with_block(&mut self, block_number: u64) -> Option<Reservation> {
        let idx = self
            .reservations
            .iter()
            .position(|reservation| reservation.contains(block_number))?;

        let reservation = self.reservations.swap_remove(idx);
        if block_number != reservation.first_number {
            self.reservations.push(Reservation {
                last_number: block_number - 1,
                ..reservation.clone()
            });
        }

        Some(reservation)
    }

    /// Reverts to the block with the provided number, deleting all later
    /// blocks and cancelling all later reservations.
    ///
    /// Returns `false` if the block number is larger than the last block
    /// number.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn revert_to_block(&mut self, block_number: u64) -> bool {
        if block_number > self.last_block_number {
            return false;
        }

        while let Some(cancelled_number) = self
            .reservations
            .iter()
            .find(|reservation| reservation.last_number > block_number)
            .map(|reservation| reservation.first_number.max(block_number + 1))
        {
            self.cancel_reservation_with_block(cancelled_number);
        }

        self.storage.revert_to_block(block_number);
        self.last_block_number = block_number;

        true
    }

    /// Computes the timestamp of a reserved block by walking back through
    /// preceding reservations until a stored block is found.
    fn timestamp_for_reserved_block(&self, reservation: &Reservation, block_number: u64) -> u64 {
        let mut elapsed = reservation.interval * (block_number - reservation.first_number + 1);
        let mut fallback_timestamp = reservation.previous_timestamp;
        let mut previous_number = reservation.first_number - 1;

        loop {
            if let Some(previous_block) = self.storage.block_by_number(previous_number) {
                return previous_block
                    .header()
                    .timestamp
                    .checked_add(elapsed)
                    .expect("Bounded by the timestamp checked upon reservation");
            }

            let Some(previous_reservation) = find_reservation(&self.reservations, previous_number)
            else {
                return fallback_timestamp
                    .checked_add(elapsed)
                    .expect("Bounded by the timestamp checked upon reservation");
            };

            elapsed += previous_reservation.interval
                * (previous_number - previous_reservation.first_number + 1);
            fallback_timestamp = previous_reservation.previous_timestamp;
            previous_number = previous_reservation.first_number - 1;
        }
    }
}

/// Timestamp of the reserved block at the provided distance from the block
/// preceding its reservation.
fn reserved_timestamp(previous_timestamp: u64, interval: u64, distance: u64) -> u64 {
    interval
        .checked_mul(distance)
        .and_then(|elapsed| previous_timestamp.checked_add(elapsed))
        .expect("Bounded by the timestamp checked upon reservation")
}

fn find_reservation(reservations: &[Reservation], number: u64) -> Option<&Reservation> {
    reservations
        .iter()
        .find(|reservation| reservation.contains(number))
}
