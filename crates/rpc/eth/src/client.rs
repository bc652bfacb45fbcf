use devchain_block_api::BlockSpec;
use devchain_primitives::{Address, B256};
use devchain_receipt::{TransactionReceipt, log::FilterLog};
use devchain_rpc_client::RpcClient;
pub use devchain_rpc_client::{RpcClientError, header::HeaderMap};
use serde::{Deserialize, Deserializer, de};

use crate::{
    block::Block,
    filter::{LogFilterOptions, OneOrMore},
    fork::ForkMetadata,
    request_methods::RequestMethod,
    transaction::Transaction,
};

/// A client for the Ethereum JSON-RPC methods needed to fork a remote chain.
#[derive(Debug)]
pub struct EthRpcClient {
    inner: RpcClient<RequestMethod>,
}

impl EthRpcClient {
    /// Creates a new instance, given a remote node URL.
    pub fn new(url: &str, extra_headers: Option<HeaderMap>) -> Result<Self, RpcClientError> {
        let inner = RpcClient::new(url, extra_headers)?;
        Ok(Self { inner })
    }

    /// Calls `eth_blockNumber` and returns the block number.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub async fn block_number(&self) -> Result<u64, RpcClientError> {
        self.inner
            .call::<Quantity>(RequestMethod::BlockNumber(()))
            .await
            .map(|Quantity(number)| number)
    }

    /// Calls `eth_chainId` and returns the chain ID.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub async fn chain_id(&self) -> Result<u64, RpcClientError> {
        self.inner
            .call::<Quantity>(RequestMethod::ChainId(()))
            .await
            .map(|Quantity(chain_id)| chain_id)
    }

    /// Fetches the latest block number, chain ID, and network ID concurrently.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub async fn fork_metadata(&self) -> Result<ForkMetadata, RpcClientError> {
        let network_id = self.network_id();
        let block_number = self.block_number();
        let chain_id = self.chain_id();

        let (network_id, block_number, chain_id) =
            tokio::try_join!(network_id, block_number, chain_id)?;

        Ok(ForkMetadata {
            chain_id,
            network_id,
            latest_block_number: block_number,
        })
    }

    /// Calls `eth_getBlockByHash` and returns the block with its transaction
    /// data.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub async fn get_block_by_hash_with_transaction_data(
        &self,
        hash: B256,
    ) -> Result<Option<Block<Transaction>>, RpcClientError> {
        self.inner
            .call(RequestMethod::GetBlockByHash(hash, true))
            .await
    }

    /// Calls `eth_getBlockByNumber` and returns the block with its transaction
    /// data.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub async fn get_block_by_number_with_transaction_data(
        &self,
        number: u64,
    ) -> Result<Option<Block<Transaction>>, RpcClientError> {
        self.inner
            .call(RequestMethod::GetBlockByNumber(
                BlockSpec::Number(number),
                true,
            ))
            .await
    }

    /// Calls `eth_getLogs` using a starting and ending block (inclusive).
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub async fn get_logs_by_range(
        &self,
        from_block: BlockSpec,
        to_block: BlockSpec,
        address: Option<OneOrMore<Address>>,
        topics: Option<Vec<Option<OneOrMore<B256>>>>,
    ) -> Result<Vec<FilterLog>, RpcClientError> {
        self.inner
            .call(RequestMethod::GetLogs(LogFilterOptions {
                from_block: Some(from_block),
                to_block: Some(to_block),
                block_hash: None,
                address,
                topics,
            }))
            .await
    }

    /// Calls `eth_getTransactionByHash`.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub async fn get_transaction_by_hash(
        &self,
        transaction_hash: B256,
    ) -> Result<Option<Transaction>, RpcClientError> {
        self.inner
            .call(RequestMethod::GetTransactionByHash(transaction_hash))
            .await
    }

    /// Calls `eth_getTransactionReceipt`.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub async fn get_transaction_receipt(
        &self,
        transaction_hash: B256,
    ) -> Result<Option<TransactionReceipt>, RpcClientError> {
        self.inner
            .call(RequestMethod::GetTransactionReceipt(transaction_hash))
            .await
    }

    /// Calls `net_version`.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub async fn network_id(&self) -> Result<u64, RpcClientError> {
        self.inner
            .call::<Quantity>(RequestMethod::NetVersion(()))
            .await
            .map(|Quantity(network_id)| network_id)
    }
}

/// A numeric result returned either as a hexadecimal quantity or, as is
/// common for `net_version`, as a decimal string.
struct Quantity(u64);

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;

        let parsed = match value.strip_prefix("0x") {
            Some(digits) => u64::from_str_radix(digits, 16),
            None => value.parse(),
        };

        parsed
            .map(Quantity)
            .map_err(|error| de::Error::custom(format!("invalid quantity '{value}': {error}")))
    }
}
