//! The state store of a development node's blockchain, either fully local or
//! forked from a remote blockchain.
#![warn(missing_docs)]

mod config;

use std::{collections::HashMap, sync::Arc};

use devchain_block_api::{Block, BlockAndTotalDifficulty};
use devchain_blockchain_api::{
    BlockHashByNumber, BlockchainMetadata, GetBlockchainBlock, GetBlockchainLogs, InsertBlock,
    ReceiptByTransactionHash, ReserveBlocks, RevertToBlock, TotalDifficultyByBlockHash,
};
use devchain_blockchain_fork::{
    ForkedBlockchain, ForkedBlockchainCreationError, ForkedBlockchainError,
};
use devchain_blockchain_local::{InvalidGenesisBlock, LocalBlockchain, LocalBlockchainError};
use devchain_consensus::{ConsensusValidator, validator_for};
use devchain_primitives::{Address, B256, HashSet, U256};
use devchain_receipt::{TransactionReceipt, log::FilterLog};
use devchain_rpc_client::{
    RpcClientError,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use devchain_rpc_eth::client::EthRpcClient;
use devchain_transaction::Transaction;
use tokio::runtime;

pub use self::config::{ChainStoreConfig, ForkConfig};

/// An error that occurs upon creation of a [`ChainStore`].
#[derive(Debug, thiserror::Error)]
pub enum ChainStoreCreationError {
    /// An error that occurred while constructing a forked blockchain.
    #[error(transparent)]
    ForkedBlockchainCreation(#[from] ForkedBlockchainCreationError),
    /// An HTTP header could not be converted
    #[error("Invalid HTTP header: {name}")]
    InvalidHttpHeader {
        /// The header's name
        name: String,
    },
    /// An error that occurred while constructing a local blockchain.
    #[error(transparent)]
    LocalBlockchainCreation(#[from] InvalidGenesisBlock),
    /// An error that occurred while connecting to the remote endpoint.
    #[error(transparent)]
    RpcClient(#[from] RpcClientError),
}

/// Error type for [`ChainStore`].
#[derive(Debug, thiserror::Error)]
pub enum ChainStoreError {
    /// An error of the forked blockchain
    #[error(transparent)]
    Forked(#[from] ForkedBlockchainError),
    /// An error of the local blockchain
    #[error(transparent)]
    Local(#[from] LocalBlockchainError),
}

/// A blockchain that is either fully local or forked from a remote
/// blockchain.
#[derive(Debug)]
pub enum ChainStore {
    /// A blockchain consisting of locally created blocks
    Local(LocalBlockchain),
    /// A blockchain that extends a remote blockchain
    Forked(ForkedBlockchain<EthRpcClient>),
}

impl ChainStore {
    /// Constructs a new instance from the provided configuration.
    ///
    /// A forked blockchain connects to the remote endpoint, in which case the
    /// genesis block is not used. Has to be called from a multi-threaded
    /// runtime.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn new(
        config: &ChainStoreConfig,
        genesis_block: Block,
        runtime: runtime::Handle,
    ) -> Result<Self, ChainStoreCreationError> {
        let consensus = validator_for(config.consensus);

        if let Some(fork_config) = &config.fork {
            let http_headers = fork_config
                .http_headers
                .as_ref()
                .map(http_header_map)
                .transpose()?;

            let rpc_client = Arc::new(EthRpcClient::new(&fork_config.json_rpc_url, http_headers)?);

            let blockchain = tokio::task::block_in_place(|| {
                runtime.block_on(ForkedBlockchain::new(
                    runtime.clone(),
                    rpc_client,
                    consensus,
                    fork_config.block_number,
                    fork_config.chain_id_override,
                ))
            })?;

            Ok(Self::Forked(blockchain))
        } else {
            let blockchain = LocalBlockchain::new(
                genesis_block,
                config.chain_id,
                config.network_id.unwrap_or(config.chain_id),
                consensus,
            )?;

            Ok(Self::Local(blockchain))
        }
    }

    /// Returns the number of the block the blockchain was forked from, if it
    /// is forked.
    pub fn fork_block_number(&self) -> Option<u64> {
        match self {
            ChainStore::Local(_) => None,
            ChainStore::Forked(blockchain) => Some(blockchain.fork_block_number()),
        }
    }

    /// Returns the chain id of the remote blockchain, if it is forked.
    pub fn remote_chain_id(&self) -> Option<u64> {
        match self {
            ChainStore::Local(_) => None,
            ChainStore::Forked(blockchain) => Some(blockchain.remote_chain_id()),
        }
    }
}

fn http_header_map(
    headers: &HashMap<String, String>,
) -> Result<HeaderMap, ChainStoreCreationError> {
    headers
        .iter()
        .map(|(name, value)| {
            let invalid_header = || ChainStoreCreationError::InvalidHttpHeader { name: name.clone() };

            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid_header())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid_header())?;

            Ok((header_name, header_value))
        })
        .collect()
}

impl BlockHashByNumber for ChainStore {
    type Error = ChainStoreError;

    fn block_hash_by_number(&mut self, block_number: u64) -> Result<B256, Self::Error> {
        match self {
            ChainStore::Local(blockchain) => Ok(blockchain.block_hash_by_number(block_number)?),
            ChainStore::Forked(blockchain) => Ok(blockchain.block_hash_by_number(block_number)?),
        }
    }
}

impl BlockchainMetadata for ChainStore {
    fn chain_id(&self) -> u64 {
        match self {
            ChainStore::Local(blockchain) => blockchain.chain_id(),
            ChainStore::Forked(blockchain) => blockchain.chain_id(),
        }
    }

    fn consensus(&self) -> &dyn ConsensusValidator {
        match self {
            ChainStore::Local(blockchain) => blockchain.consensus(),
            ChainStore::Forked(blockchain) => blockchain.consensus(),
        }
    }

    fn last_block_number(&self) -> u64 {
        match self {
            ChainStore::Local(blockchain) => blockchain.last_block_number(),
            ChainStore::Forked(blockchain) => blockchain.last_block_number(),
        }
    }

    fn network_id(&self) -> u64 {
        match self {
            ChainStore::Local(blockchain) => blockchain.network_id(),
            ChainStore::Forked(blockchain) => blockchain.network_id(),
        }
    }
}

impl GetBlockchainBlock for ChainStore {
    type Error = ChainStoreError;

    fn block_by_hash(&mut self, hash: &B256) -> Result<Option<Arc<Block>>, Self::Error> {
        match self {
            ChainStore::Local(blockchain) => Ok(blockchain.block_by_hash(hash)?),
            ChainStore::Forked(blockchain) => Ok(blockchain.block_by_hash(hash)?),
        }
    }

    fn block_by_number(&mut self, number: u64) -> Result<Option<Arc<Block>>, Self::Error> {
        match self {
            ChainStore::Local(blockchain) => Ok(blockchain.block_by_number(number)?),
            ChainStore::Forked(blockchain) => Ok(blockchain.block_by_number(number)?),
        }
    }

    fn block_by_transaction_hash(
        &mut self,
        transaction_hash: &B256,
    ) -> Result<Option<Arc<Block>>, Self::Error> {
        match self {
            ChainStore::Local(blockchain) => {
                Ok(blockchain.block_by_transaction_hash(transaction_hash)?)
            }
            ChainStore::Forked(blockchain) => {
                Ok(blockchain.block_by_transaction_hash(transaction_hash)?)
            }
        }
    }

    fn last_block(&mut self) -> Result<Arc<Block>, Self::Error> {
        match self {
            ChainStore::Local(blockchain) => Ok(blockchain.last_block()?),
            ChainStore::Forked(blockchain) => Ok(blockchain.last_block()?),
        }
    }

    fn transaction_by_hash(
        &mut self,
        transaction_hash: &B256,
    ) -> Result<Option<Transaction>, Self::Error> {
        match self {
            ChainStore::Local(blockchain) => Ok(blockchain.transaction_by_hash(transaction_hash)?),
            ChainStore::Forked(blockchain) => Ok(blockchain.transaction_by_hash(transaction_hash)?),
        }
    }
}

impl GetBlockchainLogs for ChainStore {
    type Error = ChainStoreError;

    fn logs(
        &mut self,
        from_block: u64,
        to_block: u64,
        addresses: &HashSet<Address>,
        normalized_topics: &[Option<Vec<B256>>],
    ) -> Result<Vec<FilterLog>, Self::Error> {
        match self {
            ChainStore::Local(blockchain) => {
                Ok(blockchain.logs(from_block, to_block, addresses, normalized_topics)?)
            }
            ChainStore::Forked(blockchain) => {
                Ok(blockchain.logs(from_block, to_block, addresses, normalized_topics)?)
            }
        }
    }
}

impl InsertBlock for ChainStore {
    type Error = ChainStoreError;

    fn insert_block(&mut self, block: Block) -> Result<BlockAndTotalDifficulty, Self::Error> {
        match self {
            ChainStore::Local(blockchain) => Ok(blockchain.insert_block(block)?),
            ChainStore::Forked(blockchain) => Ok(blockchain.insert_block(block)?),
        }
    }

    fn insert_receipts(&mut self, receipts: Vec<TransactionReceipt>) -> Result<(), Self::Error> {
        match self {
            ChainStore::Local(blockchain) => Ok(blockchain.insert_receipts(receipts)?),
            ChainStore::Forked(blockchain) => Ok(blockchain.insert_receipts(receipts)?),
        }
    }
}

impl ReceiptByTransactionHash for ChainStore {
    type Error = ChainStoreError;

    fn receipt_by_transaction_hash(
        &mut self,
        transaction_hash: &B256,
    ) -> Result<Option<Arc<TransactionReceipt>>, Self::Error> {
        match self {
            ChainStore::Local(blockchain) => {
                Ok(blockchain.receipt_by_transaction_hash(transaction_hash)?)
            }
            ChainStore::Forked(blockchain) => {
                Ok(blockchain.receipt_by_transaction_hash(transaction_hash)?)
            }
        }
    }
}

impl ReserveBlocks for ChainStore {
    type Error = ChainStoreError;

    fn reserve_blocks(&mut self, additional: u64, interval: u64) -> Result<(), Self::Error> {
        match self {
            ChainStore::Local(blockchain) => Ok(blockchain.reserve_blocks(additional, interval)?),
            ChainStore::Forked(blockchain) => Ok(blockchain.reserve_blocks(additional, interval)?),
        }
    }
}

impl RevertToBlock for ChainStore {
    type Error = ChainStoreError;

    fn delete_block(&mut self, hash: &B256) -> Result<(), Self::Error> {
        match self {
            ChainStore::Local(blockchain) => Ok(blockchain.delete_block(hash)?),
            ChainStore::Forked(blockchain) => Ok(blockchain.delete_block(hash)?),
        }
    }

    fn delete_later_blocks(&mut self, block: &Block) -> Result<(), Self::Error> {
        match self {
            ChainStore::Local(blockchain) => Ok(blockchain.delete_later_blocks(block)?),
            ChainStore::Forked(blockchain) => Ok(blockchain.delete_later_blocks(block)?),
        }
    }

    fn revert_to_block(&mut self, block_number: u64) -> Result<(), Self::Error> {
        match self {
            ChainStore::Local(blockchain) => Ok(blockchain.revert_to_block(block_number)?),
            ChainStore::Forked(blockchain) => Ok(blockchain.revert_to_block(block_number)?),
        }
    }
}

impl TotalDifficultyByBlockHash for ChainStore {
    type Error = ChainStoreError;

    fn total_difficulty_by_hash(&mut self, hash: &B256) -> Result<Option<U256>, Self::Error> {
        match self {
            ChainStore::Local(blockchain) => Ok(blockchain.total_difficulty_by_hash(hash)?),
            ChainStore::Forked(blockchain) => Ok(blockchain.total_difficulty_by_hash(hash)?),
        }
    }
}
