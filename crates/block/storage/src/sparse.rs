use std::sync::Arc;

use devchain_block_api::Block;
use devchain_primitives::{Address, B256, HashMap, HashSet, U256};
use devchain_receipt::{
    TransactionReceipt,
    filter::{bloom_filter, filter_logs},
    log::FilterLog,
};
use devchain_transaction::Transaction;

use super::InsertBlockError;

/// Identifier of a block within the storage's arena.
type BlockId = u64;

#[derive(Debug)]
struct StoredBlock {
    block: Arc<Block>,
    total_difficulty: U256,
}

/// A storage solution for storing a subset of a blockchain's blocks in-memory.
///
/// Blocks are owned by an arena and addressed by a generated id. The number,
/// hash and transaction hash indices only hold ids, so removing a block is a
/// single arena removal plus index cleanup.
#[derive(Debug, Default)]
pub struct SparseBlockStorage {
    blocks: HashMap<BlockId, StoredBlock>,
    next_block_id: BlockId,
    hash_to_block: HashMap<B256, BlockId>,
    number_to_block: HashMap<u64, BlockId>,
    transaction_hash_to_block: HashMap<B256, (BlockId, usize)>,
    transaction_hash_to_receipt: HashMap<B256, Arc<TransactionReceipt>>,
}

impl SparseBlockStorage {
    /// Constructs a new instance with the provided block.
    pub fn with_block(block: Block, total_difficulty: U256) -> Self {
        let mut storage = Self::default();
        storage
            .insert_block(block, total_difficulty)
            .expect("Empty storage cannot contain duplicates");

        storage
    }

    /// Retrieves the block by hash, if it exists.
    pub fn block_by_hash(&self, hash: &B256) -> Option<&Arc<Block>> {
        self.hash_to_block
            .get(hash)
            .map(|block_id| &self.stored_block(block_id).block)
    }

    /// Retrieves the block by number, if it exists.
    pub fn block_by_number(&self, number: u64) -> Option<&Arc<Block>> {
        self.number_to_block
            .get(&number)
            .map(|block_id| &self.stored_block(block_id).block)
    }

    /// Retrieves the block that contains the transaction with the provided
    /// hash, if it exists.
    pub fn block_by_transaction_hash(&self, transaction_hash: &B256) -> Option<&Arc<Block>> {
        self.transaction_hash_to_block
            .get(transaction_hash)
            .map(|(block_id, _)| &self.stored_block(block_id).block)
    }

    /// Retrieves the transaction with the provided hash, if it exists.
    pub fn transaction_by_hash(&self, transaction_hash: &B256) -> Option<&Transaction> {
        self.transaction_hash_to_block
            .get(transaction_hash)
            .map(|(block_id, index)| {
                self.stored_block(block_id)
                    .block
                    .transactions()
                    .get(*index)
                    .expect("Transaction index is valid as the block is immutable")
            })
    }

    /// Retrieves whether a block with the provided number exists.
    pub fn contains_block_number(&self, number: u64) -> bool {
        self.number_to_block.contains_key(&number)
    }

    /// Retrieves the receipt of the transaction with the provided hash, if it
    /// exists.
    pub fn receipt_by_transaction_hash(
        &self,
        transaction_hash: &B256,
    ) -> Option<&Arc<TransactionReceipt>> {
        self.transaction_hash_to_receipt.get(transaction_hash)
    }

    /// Retrieves the total difficulty of the block with the provided hash.
    pub fn total_difficulty_by_hash(&self, hash: &B256) -> Option<&U256> {
        self.hash_to_block
            .get(hash)
            .map(|block_id| &self.stored_block(block_id).total_difficulty)
    }

    /// Inserts a block. Errors if a block with the same hash or number, or a
    /// transaction with the same hash, already exists.
    ///
    /// Neither contiguity nor parent linkage is validated.
    pub fn insert_block(
        &mut self,
        block: Block,
        total_difficulty: U256,
    ) -> Result<&Arc<Block>, InsertBlockError> {
        let block_hash = *block.block_hash();
        let block_number = block.header().number;

        if self.hash_to_block.contains_key(&block_hash) {
            return Err(InsertBlockError::DuplicateBlock { block_hash });
        }

        if self.number_to_block.contains_key(&block_number) {
            return Err(InsertBlockError::DuplicateBlockNumber { block_number });
        }

        if let Some(transaction) = block.transactions().iter().find(|transaction| {
            self.transaction_hash_to_block
                .contains_key(transaction.transaction_hash())
        }) {
            return Err(InsertBlockError::DuplicateTransaction {
                hash: *transaction.transaction_hash(),
            });
        }

        let block_id = self.next_block_id;
        self.next_block_id += 1;

        self.hash_to_block.insert(block_hash, block_id);
        self.number_to_block.insert(block_number, block_id);
        self.transaction_hash_to_block.extend(
            block
                .transactions()
                .iter()
                .enumerate()
                .map(|(index, transaction)| (*transaction.transaction_hash(), (block_id, index))),
        );

        let stored = self.blocks.entry(block_id).or_insert(StoredBlock {
            block: Arc::new(block),
            total_difficulty,
        });

        Ok(&stored.block)
    }

    /// Inserts a receipt, replacing any receipt of the same transaction.
    ///
    /// The receipt's block and transaction need not be stored.
    pub fn insert_receipt(&mut self, receipt: TransactionReceipt) -> &Arc<TransactionReceipt> {
        let transaction_hash = receipt.transaction_hash;
        self.transaction_hash_to_receipt
            .insert(transaction_hash, Arc::new(receipt));

        self.transaction_hash_to_receipt
            .get(&transaction_hash)
            .expect("Receipt was just inserted")
    }

    /// Inserts multiple receipts, replacing any receipts of the same
    /// transactions.
    pub fn insert_receipts(&mut self, receipts: impl IntoIterator<Item = TransactionReceipt>) {
        for receipt in receipts {
            self.insert_receipt(receipt);
        }
    }

    /// Removes the block with the provided hash, along with its transactions
    /// and their receipts.
    pub fn remove_block(&mut self, hash: &B256) -> Option<Arc<Block>> {
        let block_id = self.hash_to_block.remove(hash)?;
        let StoredBlock { block, .. } = self
            .blocks
            .remove(&block_id)
            .expect("Arena must contain indexed blocks");

        self.number_to_block.remove(&block.header().number);
        for transaction in block.transactions() {
            self.transaction_hash_to_block
                .remove(transaction.transaction_hash());
            self.transaction_hash_to_receipt
                .remove(transaction.transaction_hash());
        }

        Some(block)
    }

    /// Removes all blocks with a number larger than the provided block number.
    pub fn revert_to_block(&mut self, block_number: u64) {
        let removed_hashes: Vec<B256> = self
            .number_to_block
            .iter()
            .filter(|(number, _)| **number > block_number)
            .map(|(_, block_id)| *self.stored_block(block_id).block.block_hash())
            .collect();

        for hash in removed_hashes {
            self.remove_block(&hash);
        }
    }

    /// Retrieves the logs that match the provided filter, resolving receipts
    /// from storage.
    pub fn logs(
        &self,
        from_block: u64,
        to_block: u64,
        addresses: &HashSet<Address>,
        normalized_topics: &[Option<Vec<B256>>],
    ) -> Vec<FilterLog> {
        self.logs_with_resolver(
            from_block,
            to_block,
            addresses,
            normalized_topics,
            |transaction_hash| self.receipt_by_transaction_hash(transaction_hash).cloned(),
        )
    }

    /// Retrieves the logs that match the provided filter, resolving receipts
    /// using the provided resolver.
    ///
    /// Every block's bloom is checked before its receipts are resolved, so
    /// the resolver is never called for blocks that cannot contain a match.
    pub fn logs_with_resolver(
        &self,
        from_block: u64,
        to_block: u64,
        addresses: &HashSet<Address>,
        normalized_topics: &[Option<Vec<B256>>],
        mut resolver: impl FnMut(&B256) -> Option<Arc<TransactionReceipt>>,
    ) -> Vec<FilterLog> {
        let mut block_ids: Vec<(u64, BlockId)> = self
            .number_to_block
            .iter()
            .filter(|(number, _)| from_block <= **number && **number <= to_block)
            .map(|(number, block_id)| (*number, *block_id))
            .collect();

        block_ids.sort_unstable_by_key(|(number, _)| *number);

        let mut logs = Vec::new();
        for (_, block_id) in block_ids {
            let block = &self.stored_block(&block_id).block;
            if !bloom_filter(&block.header().logs_bloom, addresses, normalized_topics) {
                continue;
            }

            for transaction in block.transactions() {
                if let Some(receipt) = resolver(transaction.transaction_hash()) {
                    logs.extend(filter_logs(
                        receipt.transaction_logs(),
                        from_block,
                        to_block,
                        addresses,
                        normalized_topics,
                    ));
                }
            }
        }

        logs
    }

    fn stored_block(&self, block_id: &BlockId) -> &StoredBlock {
        self.blocks
            .get(block_id)
            .expect("Arena must contain indexed blocks")
    }
}
