//! A read-through cache of a remote blockchain's blocks, transactions and
//! receipts.
#![warn(missing_docs)]

use std::sync::Arc;

use devchain_block_api::{Block, BlockSpec};
use devchain_block_storage::{InsertBlockError, SparseBlockStorage};
use devchain_primitives::{Address, B256, HashSet, U256};
use devchain_receipt::{TransactionReceipt, log::FilterLog};
use devchain_rpc_client::RpcClientError;
use devchain_rpc_eth::{
    RemoteClient,
    block::{Block as RpcBlock, BlockConversionError},
    filter::OneOrMore,
    transaction::Transaction as RpcTransaction,
};
use devchain_transaction::Transaction;

/// A remote blockchain that caches everything it fetches.
///
/// Only data at or before the fork block number is accepted. Anything newer
/// is treated as unknown, as the local chain owns those block numbers.
#[derive(Debug)]
pub struct RemoteBlockchain<ClientT: RemoteClient> {
    client: Arc<ClientT>,
    cache: SparseBlockStorage,
    fork_block_number: u64,
}

impl<ClientT: RemoteClient> RemoteBlockchain<ClientT> {
    /// Constructs a new instance with the provided remote client.
    pub fn new(client: Arc<ClientT>, fork_block_number: u64) -> Self {
        Self {
            client,
            cache: SparseBlockStorage::default(),
            fork_block_number,
        }
    }

    /// Retrieves the instance's remote client.
    pub fn client(&self) -> &Arc<ClientT> {
        &self.client
    }

    /// Retrieves the number of the newest block that is served remotely.
    pub fn fork_block_number(&self) -> u64 {
        self.fork_block_number
    }

    /// Retrieves the block with the provided hash, if it exists.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn block_by_hash(
        &mut self,
        hash: &B256,
    ) -> Result<Option<Arc<Block>>, FetchRemoteBlockError> {
        if let Some(block) = self.cache.block_by_hash(hash) {
            return Ok(Some(block.clone()));
        }

        if let Some(block) = self
            .client
            .get_block_by_hash_with_transaction_data(*hash)
            .await?
        {
            Ok(self.fetch_and_cache_block(block)?)
        } else {
            Ok(None)
        }
    }

    /// Retrieves the block with the provided number, if it exists.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn block_by_number(
        &mut self,
        number: u64,
    ) -> Result<Option<Arc<Block>>, FetchRemoteBlockError> {
        if number > self.fork_block_number {
            return Ok(None);
        }

        if let Some(block) = self.cache.block_by_number(number) {
            return Ok(Some(block.clone()));
        }

        if let Some(block) = self
            .client
            .get_block_by_number_with_transaction_data(number)
            .await?
        {
            Ok(self.fetch_and_cache_block(block)?)
        } else {
            Ok(None)
        }
    }

    /// Retrieves the block that contains a transaction with the provided hash,
    /// if it exists.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn block_by_transaction_hash(
        &mut self,
        transaction_hash: &B256,
    ) -> Result<Option<Arc<Block>>, FetchRemoteBlockError> {
        if let Some(block) = self.cache.block_by_transaction_hash(transaction_hash) {
            return Ok(Some(block.clone()));
        }

        let Some(transaction) = self
            .client
            .get_transaction_by_hash(*transaction_hash)
            .await?
        else {
            return Ok(None);
        };

        // Pending transactions have not been included in a block yet
        let Some(block_hash) = transaction.block_hash else {
            return Ok(None);
        };

        if let Some(block_number) = transaction
            .block_number
            .filter(|block_number| *block_number > self.fork_block_number)
        {
            log::warn!(
                "Ignoring remote transaction {transaction_hash} as its block {block_number} is newer than the fork block {}",
                self.fork_block_number
            );
            return Ok(None);
        }

        self.block_by_hash(&block_hash).await
    }

    /// Retrieves the transaction with the provided hash, if it exists.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn transaction_by_hash(
        &mut self,
        transaction_hash: &B256,
    ) -> Result<Option<Transaction>, FetchRemoteBlockError> {
        if let Some(transaction) = self.cache.transaction_by_hash(transaction_hash) {
            return Ok(Some(transaction.clone()));
        }

        let transaction = self
            .block_by_transaction_hash(transaction_hash)
            .await?
            .and_then(|block| {
                block
                    .transactions()
                    .iter()
                    .find(|transaction| transaction.transaction_hash() == transaction_hash)
                    .cloned()
            });

        Ok(transaction)
    }

    /// Retrieves the receipt of the transaction with the provided hash, if it
    /// exists.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn receipt_by_transaction_hash(
        &mut self,
        transaction_hash: &B256,
    ) -> Result<Option<Arc<TransactionReceipt>>, RpcClientError> {
        if let Some(receipt) = self.cache.receipt_by_transaction_hash(transaction_hash) {
            return Ok(Some(receipt.clone()));
        }

        let Some(receipt) = self
            .client
            .get_transaction_receipt(*transaction_hash)
            .await?
        else {
            return Ok(None);
        };

        if receipt.block_number > self.fork_block_number {
            log::warn!(
                "Ignoring remote receipt of transaction {transaction_hash} as its block {} is newer than the fork block {}",
                receipt.block_number,
                self.fork_block_number
            );
            return Ok(None);
        }

        Ok(Some(self.cache.insert_receipt(receipt).clone()))
    }

    /// Retrieves the total difficulty at the block with the provided hash.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn total_difficulty_by_hash(
        &mut self,
        hash: &B256,
    ) -> Result<Option<U256>, FetchRemoteBlockError> {
        if let Some(total_difficulty) = self.cache.total_difficulty_by_hash(hash) {
            return Ok(Some(*total_difficulty));
        }

        let total_difficulty = self.block_by_hash(hash).await?.map(|block| {
            *self
                .cache
                .total_difficulty_by_hash(block.block_hash())
                .expect("Must exist as its block is cached")
        });

        Ok(total_difficulty)
    }

    /// Retrieves the logs in the provided range that match the filter, using
    /// a single remote query.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn logs(
        &self,
        from_block: u64,
        to_block: u64,
        addresses: &HashSet<Address>,
        normalized_topics: &[Option<Vec<B256>>],
    ) -> Result<Vec<FilterLog>, RpcClientError> {
        self.client
            .get_logs_by_range(
                BlockSpec::Number(from_block),
                BlockSpec::Number(to_block),
                OneOrMore::from_values(addresses.iter().copied().collect()),
                if normalized_topics.is_empty() {
                    None
                } else {
                    Some(
                        normalized_topics
                            .iter()
                            .map(|topics| {
                                topics
                                    .as_ref()
                                    .and_then(|topics| OneOrMore::from_values(topics.clone()))
                            })
                            .collect(),
                    )
                },
            )
            .await
    }

    /// Converts the remote block and caches it, unless it is newer than the
    /// fork block or conflicts with a cached block.
    fn fetch_and_cache_block(
        &mut self,
        block: RpcBlock<RpcTransaction>,
    ) -> Result<Option<Arc<Block>>, BlockConversionError> {
        let remote_total_difficulty = block.total_difficulty;
        let block = Block::try_from(block)?;

        let header = block.header();
        if header.number > self.fork_block_number {
            log::warn!(
                "Ignoring remote block {} as it is newer than the fork block {}",
                header.number,
                self.fork_block_number
            );
            return Ok(None);
        }

        let total_difficulty = remote_total_difficulty
            .or_else(|| {
                self.cache
                    .total_difficulty_by_hash(&header.parent_hash)
                    .map(|parent_total_difficulty| parent_total_difficulty + header.difficulty)
            })
            .unwrap_or_else(|| {
                // Geth no longer returns the total difficulty, so we fall back to the
                // terminal total difficulty of mainnet.
                log::warn!(
                    "Remote block {} has no total difficulty. Falling back to the terminal total difficulty.",
                    header.number
                );
                devchain_defaults::TERMINAL_TOTAL_DIFFICULTY
            });

        let block_number = header.number;
        match self.cache.insert_block(block, total_difficulty) {
            Ok(block) => Ok(Some(block.clone())),
            Err(InsertBlockError::DuplicateBlock { block_hash }) => {
                Ok(self.cache.block_by_hash(&block_hash).cloned())
            }
            // Non-canonical blocks, e.g. ommers or reorged blocks, share their
            // number or transactions with a cached canonical block.
            Err(error) => {
                log::warn!(
                    "Ignoring remote block {block_number} as it conflicts with a cached block: {error}"
                );
                Ok(None)
            }
        }
    }
}

/// An error that occurs when fetching a remote block.
#[derive(Debug, thiserror::Error)]
pub enum FetchRemoteBlockError {
    /// Error converting a block
    #[error(transparent)]
    Conversion(#[from] BlockConversionError),
    /// RPC client error
    #[error(transparent)]
    RpcClient(#[from] RpcClientError),
}
