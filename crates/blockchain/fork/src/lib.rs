//! A blockchain that extends a remote blockchain with locally created blocks.
#![warn(missing_docs)]

use std::{future::Future, num::NonZeroU64, sync::Arc};

use devchain_block_api::{
    Block, BlockAndTotalDifficulty, BlockValidityError, largest_safe_block_number,
    safe_block_depth, validate_next_block,
};
use devchain_block_storage::{
    InsertBlockError, PreviousBlockData, ReservableSparseBlockStorage, ReservationError,
};
use devchain_blockchain_api::{
    BlockHashByNumber, BlockchainMetadata, GetBlockchainBlock, GetBlockchainLogs, InsertBlock,
    ReceiptByTransactionHash, ReserveBlocks, RevertToBlock, TotalDifficultyByBlockHash,
    next_total_difficulty,
};
use devchain_blockchain_remote::{FetchRemoteBlockError, RemoteBlockchain};
use devchain_consensus::ConsensusValidator;
use devchain_primitives::{Address, B256, HashSet, U256};
use devchain_receipt::{TransactionReceipt, log::FilterLog};
use devchain_rpc_client::RpcClientError;
use devchain_rpc_eth::{RemoteClient, fork::ForkMetadata};
use devchain_transaction::Transaction;
use tokio::runtime;

/// An error that occurs upon creation of a [`ForkedBlockchain`].
#[derive(Debug, thiserror::Error)]
pub enum ForkedBlockchainCreationError {
    /// JSON-RPC error
    #[error(transparent)]
    RpcClientError(#[from] RpcClientError),
    /// The requested block number does not exist
    #[error(
        "Trying to initialize a provider with block {fork_block_number} but the current block is {latest_block_number}"
    )]
    InvalidBlockNumber {
        /// Requested fork block number
        fork_block_number: u64,
        /// Latest block number
        latest_block_number: u64,
    },
}

/// Error type for [`ForkedBlockchain`].
#[derive(Debug, thiserror::Error)]
pub enum ForkedBlockchainError {
    /// Remote blocks cannot be deleted
    #[error("Cannot delete remote block.")]
    CannotDeleteRemote,
    /// Failed to fetch a remote block.
    #[error(transparent)]
    FetchRemoteBlock(#[from] FetchRemoteBlockError),
    /// Failed to insert a block.
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
    /// The next block is invalid.
    #[error(transparent)]
    InvalidNextBlock(#[from] BlockValidityError),
    /// Reserving blocks failed
    #[error(transparent)]
    Reservation(#[from] ReservationError),
    /// Rpc client error
    #[error(transparent)]
    RpcClient(#[from] RpcClientError),
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

/// A blockchain that forked from a remote blockchain.
///
/// Blocks up to and including the fork block are served by the remote
/// blockchain and can never be modified. Later blocks are stored locally.
#[derive(Debug)]
pub struct ForkedBlockchain<ClientT: RemoteClient> {
    local_storage: ReservableSparseBlockStorage,
    remote: RemoteBlockchain<ClientT>,
    runtime: runtime::Handle,
    fork_block_number: u64,
    /// The chain id of the forked blockchain is either the local chain id
    /// override or the chain id of the remote blockchain.
    chain_id: u64,
    /// The chain id of the remote blockchain. It might deviate from `chain_id`.
    remote_chain_id: u64,
    network_id: u64,
    consensus: Arc<dyn ConsensusValidator>,
}

impl<ClientT: RemoteClient> ForkedBlockchain<ClientT> {
    /// Constructs a new instance.
    ///
    /// Without a fork block number, the largest block number that is safe
    /// from reorgs is used.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub async fn new(
        runtime: runtime::Handle,
        client: Arc<ClientT>,
        consensus: Arc<dyn ConsensusValidator>,
        fork_block_number: Option<u64>,
        chain_id_override: Option<u64>,
    ) -> Result<Self, ForkedBlockchainCreationError> {
        let ForkMetadata {
            chain_id: remote_chain_id,
            network_id,
            latest_block_number,
        } = client.fork_metadata().await?;

        let recommended_block_number =
            recommended_fork_block_number(RecommendedForkBlockNumberArgs {
                chain_id: remote_chain_id,
                latest_block_number,
            });

        let fork_block_number = if let Some(fork_block_number) = fork_block_number {
            if fork_block_number > latest_block_number {
                return Err(ForkedBlockchainCreationError::InvalidBlockNumber {
                    fork_block_number,
                    latest_block_number,
                });
            }

            if fork_block_number > recommended_block_number {
                let num_confirmations = latest_block_number - fork_block_number + 1;
                let required_confirmations = safe_block_depth(remote_chain_id) + 1;
                let missing_confirmations = required_confirmations - num_confirmations;

                log::warn!(
                    "You are forking from block {fork_block_number} which has less than {required_confirmations} confirmations, and will affect the node's performance. Please use block number {recommended_block_number} or wait for the block to get {missing_confirmations} more confirmations."
                );
            }

            fork_block_number
        } else {
            recommended_block_number
        };

        Ok(Self {
            local_storage: ReservableSparseBlockStorage::empty(fork_block_number),
            remote: RemoteBlockchain::new(client, fork_block_number),
            runtime,
            fork_block_number,
            chain_id: chain_id_override.unwrap_or(remote_chain_id),
            remote_chain_id,
            network_id,
            consensus,
        })
    }

    /// Returns the number of the block the blockchain was forked from.
    pub fn fork_block_number(&self) -> u64 {
        self.fork_block_number
    }

    /// Returns the chain id of the remote blockchain.
    pub fn remote_chain_id(&self) -> u64 {
        self.remote_chain_id
    }

    /// Retrieves the underlying local storage.
    pub fn local_storage(&self) -> &ReservableSparseBlockStorage {
        &self.local_storage
    }

    /// Retrieves the remote client.
    pub fn client(&self) -> &Arc<ClientT> {
        self.remote.client()
    }
}

/// Runs a remote request to completion from synchronous code.
///
/// Requires a multi-threaded runtime.
fn block_on_remote<FutureT: Future>(runtime: &runtime::Handle, future: FutureT) -> FutureT::Output {
    tokio::task::block_in_place(move || runtime.block_on(future))
}

impl<ClientT: RemoteClient> BlockHashByNumber for ForkedBlockchain<ClientT> {
    type Error = ForkedBlockchainError;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn block_hash_by_number(&mut self, block_number: u64) -> Result<B256, Self::Error> {
        self.block_by_number(block_number)?
            .map(|block| *block.block_hash())
            .ok_or(ForkedBlockchainError::UnknownBlockNumber)
    }
}

impl<ClientT: RemoteClient> BlockchainMetadata for ForkedBlockchain<ClientT> {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn consensus(&self) -> &dyn ConsensusValidator {
        self.consensus.as_ref()
    }

    fn last_block_number(&self) -> u64 {
        self.local_storage.last_block_number()
    }

    fn network_id(&self) -> u64 {
        self.network_id
    }
}

impl<ClientT: RemoteClient> GetBlockchainBlock for ForkedBlockchain<ClientT> {
    type Error = ForkedBlockchainError;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn block_by_hash(&mut self, hash: &B256) -> Result<Option<Arc<Block>>, Self::Error> {
        if let Some(local_block) = self.local_storage.block_by_hash(hash) {
            Ok(Some(local_block))
        } else {
            Ok(block_on_remote(
                &self.runtime,
                self.remote.block_by_hash(hash),
            )?)
        }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn block_by_number(&mut self, number: u64) -> Result<Option<Arc<Block>>, Self::Error> {
        if number <= self.fork_block_number {
            Ok(block_on_remote(
                &self.runtime,
                self.remote.block_by_number(number),
            )?)
        } else {
            Ok(self.local_storage.block_by_number(number)?)
        }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn block_by_transaction_hash(
        &mut self,
        transaction_hash: &B256,
    ) -> Result<Option<Arc<Block>>, Self::Error> {
        if let Some(local_block) = self
            .local_storage
            .block_by_transaction_hash(transaction_hash)
        {
            Ok(Some(local_block))
        } else {
            Ok(block_on_remote(
                &self.runtime,
                self.remote.block_by_transaction_hash(transaction_hash),
            )?)
        }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn last_block(&mut self) -> Result<Arc<Block>, Self::Error> {
        let last_block_number = self.last_block_number();
        if self.fork_block_number < last_block_number {
            let local_block = self
                .local_storage
                .block_by_number(last_block_number)?
                .expect("Block must exist since block number is less than the last block number");

            Ok(local_block)
        } else {
            block_on_remote(
                &self.runtime,
                self.remote.block_by_number(self.fork_block_number),
            )?
            .ok_or(ForkedBlockchainError::UnknownBlockNumber)
        }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn transaction_by_hash(
        &mut self,
        transaction_hash: &B256,
    ) -> Result<Option<Transaction>, Self::Error> {
        if let Some(transaction) = self.local_storage.transaction_by_hash(transaction_hash) {
            Ok(Some(transaction.clone()))
        } else {
            Ok(block_on_remote(
                &self.runtime,
                self.remote.transaction_by_hash(transaction_hash),
            )?)
        }
    }
}

impl<ClientT: RemoteClient> GetBlockchainLogs for ForkedBlockchain<ClientT> {
    type Error = ForkedBlockchainError;

    /// Remote logs, at or before the fork block, are retrieved using a single
    /// query and precede the local logs.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn logs(
        &mut self,
        from_block: u64,
        to_block: u64,
        addresses: &HashSet<Address>,
        normalized_topics: &[Option<Vec<B256>>],
    ) -> Result<Vec<FilterLog>, Self::Error> {
        if from_block > to_block {
            return Ok(Vec::new());
        }

        if from_block <= self.fork_block_number {
            let (to_block, mut local_logs) = if to_block <= self.fork_block_number {
                (to_block, Vec::new())
            } else {
                let local_logs = self.local_storage.logs(
                    self.fork_block_number + 1,
                    to_block,
                    addresses,
                    normalized_topics,
                );

                (self.fork_block_number, local_logs)
            };

            let mut remote_logs = block_on_remote(
                &self.runtime,
                self.remote
                    .logs(from_block, to_block, addresses, normalized_topics),
            )?;

            remote_logs.append(&mut local_logs);
            Ok(remote_logs)
        } else {
            Ok(self
                .local_storage
                .logs(from_block, to_block, addresses, normalized_topics))
        }
    }
}

impl<ClientT: RemoteClient> InsertBlock for ForkedBlockchain<ClientT> {
    type Error = ForkedBlockchainError;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn insert_block(&mut self, block: Block) -> Result<BlockAndTotalDifficulty, Self::Error> {
        let last_block = self.last_block()?;

        // The remote chain's hashing rules may differ from the local ones, so
        // the first local block is not linked to the fork block.
        let check_parent_hash = last_block.header().number > self.fork_block_number;
        validate_next_block(&last_block, &block, check_parent_hash)?;

        let previous_total_difficulty = self.total_difficulty_by_hash(last_block.block_hash())?;
        let total_difficulty = next_total_difficulty(&block, previous_total_difficulty);

        let block = self.local_storage.insert_block(block, total_difficulty)?;

        Ok(BlockAndTotalDifficulty {
            block: block.clone(),
            total_difficulty: Some(total_difficulty),
        })
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn insert_receipts(&mut self, receipts: Vec<TransactionReceipt>) -> Result<(), Self::Error> {
        self.local_storage.insert_receipts(receipts);

        Ok(())
    }
}

impl<ClientT: RemoteClient> ReceiptByTransactionHash for ForkedBlockchain<ClientT> {
    type Error = ForkedBlockchainError;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn receipt_by_transaction_hash(
        &mut self,
        transaction_hash: &B256,
    ) -> Result<Option<Arc<TransactionReceipt>>, Self::Error> {
        if let Some(receipt) = self
            .local_storage
            .receipt_by_transaction_hash(transaction_hash)
        {
            Ok(Some(receipt))
        } else {
            Ok(block_on_remote(
                &self.runtime,
                self.remote.receipt_by_transaction_hash(transaction_hash),
            )?)
        }
    }
}

impl<ClientT: RemoteClient> ReserveBlocks for ForkedBlockchain<ClientT> {
    type Error = ForkedBlockchainError;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn reserve_blocks(&mut self, additional: u64, interval: u64) -> Result<(), Self::Error> {
        let additional = if let Some(additional) = NonZeroU64::new(additional) {
            additional
        } else {
            return Ok(()); // nothing to do
        };

        let previous_block = if let Some(previous_block) = self.local_storage.previous_block_data()
        {
            previous_block
        } else {
            // Nothing has been stored or reserved locally since the fork
            let fork_block = self.last_block()?;
            let total_difficulty = self
                .total_difficulty_by_hash(fork_block.block_hash())?
                .expect("Must exist as its block is cached");

            PreviousBlockData::new(&fork_block, total_difficulty)
        };

        self.local_storage
            .reserve_blocks(additional, interval, previous_block)?;

        Ok(())
    }
}

impl<ClientT: RemoteClient> RevertToBlock for ForkedBlockchain<ClientT> {
    type Error = ForkedBlockchainError;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn delete_block(&mut self, hash: &B256) -> Result<(), Self::Error> {
        let Some(block) = self.local_storage.block_by_hash(hash) else {
            let remote_block = block_on_remote(&self.runtime, self.remote.block_by_hash(hash))?;

            return Err(if remote_block.is_some() {
                ForkedBlockchainError::CannotDeleteRemote
            } else {
                ForkedBlockchainError::UnknownBlockHash { hash: *hash }
            });
        };

        self.revert_to_block(block.header().number - 1)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn delete_later_blocks(&mut self, block: &Block) -> Result<(), Self::Error> {
        let block_number = block.header().number;
        if block_number < self.fork_block_number {
            return Err(ForkedBlockchainError::CannotDeleteRemote);
        }

        let stored = self
            .block_by_number(block_number)?
            .ok_or(ForkedBlockchainError::UnknownBlockNumber)?;

        if stored.block_hash() != block.block_hash() {
            return Err(ForkedBlockchainError::InvalidBlock {
                number: block_number,
                expected: *block.block_hash(),
                actual: *stored.block_hash(),
            });
        }

        self.revert_to_block(block_number)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn revert_to_block(&mut self, block_number: u64) -> Result<(), Self::Error> {
        match block_number.cmp(&self.fork_block_number) {
            std::cmp::Ordering::Less => Err(ForkedBlockchainError::CannotDeleteRemote),
            std::cmp::Ordering::Equal => {
                self.local_storage = ReservableSparseBlockStorage::empty(self.fork_block_number);

                Ok(())
            }
            std::cmp::Ordering::Greater => {
                if self.local_storage.revert_to_block(block_number) {
                    Ok(())
                } else {
                    Err(ForkedBlockchainError::UnknownBlockNumber)
                }
            }
        }
    }
}

impl<ClientT: RemoteClient> TotalDifficultyByBlockHash for ForkedBlockchain<ClientT> {
    type Error = ForkedBlockchainError;

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn total_difficulty_by_hash(&mut self, hash: &B256) -> Result<Option<U256>, Self::Error> {
        if let Some(difficulty) = self.local_storage.total_difficulty_by_hash(hash) {
            Ok(Some(difficulty))
        } else {
            Ok(block_on_remote(
                &self.runtime,
                self.remote.total_difficulty_by_hash(hash),
            )?)
        }
    }
}

/// Arguments for the `recommended_fork_block_number` function.
/// The purpose of this struct is to prevent mixing up the `u64` arguments.
struct RecommendedForkBlockNumberArgs {
    /// The chain id
    pub chain_id: u64,
    /// The latest known block number
    pub latest_block_number: u64,
}

/// Determines the recommended block number for forking a specific chain based
/// on the latest block number.
///
/// # Design
///
/// If there is no safe block number, then the latest block number will be used.
/// This decision is based on the assumption that a forked blockchain with a
/// `safe_block_depth` larger than the `latest_block_number` has a high
/// probability of being a devnet.
fn recommended_fork_block_number(args: RecommendedForkBlockNumberArgs) -> u64 {
    largest_safe_block_number(args.chain_id, args.latest_block_number)
        .unwrap_or(args.latest_block_number)
}
