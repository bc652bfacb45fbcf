use core::fmt::Debug;
use std::future::Future;

use devchain_block_api::BlockSpec;
use devchain_primitives::{Address, B256};
use devchain_receipt::{TransactionReceipt, log::FilterLog};
use devchain_rpc_client::RpcClientError;

use crate::{
    block::Block, client::EthRpcClient, filter::OneOrMore, fork::ForkMetadata,
    transaction::Transaction,
};

/// The remote chain data a forked blockchain consumes.
///
/// Implemented by [`EthRpcClient`]. Any transport failure is returned as an
/// [`RpcClientError`] and propagated unchanged by consumers.
pub trait RemoteClient: Debug + Send + Sync {
    /// Fetches the latest block number, chain ID, and network ID.
    fn fork_metadata(&self) -> impl Future<Output = Result<ForkMetadata, RpcClientError>> + Send;

    /// Fetches the block with the provided hash, including its transactions.
    fn get_block_by_hash_with_transaction_data(
        &self,
        hash: B256,
    ) -> impl Future<Output = Result<Option<Block<Transaction>>, RpcClientError>> + Send;

    /// Fetches the block with the provided number, including its
    /// transactions.
    fn get_block_by_number_with_transaction_data(
        &self,
        number: u64,
    ) -> impl Future<Output = Result<Option<Block<Transaction>>, RpcClientError>> + Send;

    /// Fetches the logs within the provided range (inclusive) that match the
    /// provided address and topic filters.
    fn get_logs_by_range(
        &self,
        from_block: BlockSpec,
        to_block: BlockSpec,
        address: Option<OneOrMore<Address>>,
        topics: Option<Vec<Option<OneOrMore<B256>>>>,
    ) -> impl Future<Output = Result<Vec<FilterLog>, RpcClientError>> + Send;

    /// Fetches the transaction with the provided hash.
    fn get_transaction_by_hash(
        &self,
        transaction_hash: B256,
    ) -> impl Future<Output = Result<Option<Transaction>, RpcClientError>> + Send;

    /// Fetches the receipt of the transaction with the provided hash.
    fn get_transaction_receipt(
        &self,
        transaction_hash: B256,
    ) -> impl Future<Output = Result<Option<TransactionReceipt>, RpcClientError>> + Send;
}

impl RemoteClient for EthRpcClient {
    fn fork_metadata(&self) -> impl Future<Output = Result<ForkMetadata, RpcClientError>> + Send {
        EthRpcClient::fork_metadata(self)
    }

    fn get_block_by_hash_with_transaction_data(
        &self,
        hash: B256,
    ) -> impl Future<Output = Result<Option<Block<Transaction>>, RpcClientError>> + Send {
        EthRpcClient::get_block_by_hash_with_transaction_data(self, hash)
    }

    fn get_block_by_number_with_transaction_data(
        &self,
        number: u64,
    ) -> impl Future<Output = Result<Option<Block<Transaction>>, RpcClientError>> + Send {
        EthRpcClient::get_block_by_number_with_transaction_data(self, number)
    }

    fn get_logs_by_range(
        &self,
        from_block: BlockSpec,
        to_block: BlockSpec,
        address: Option<OneOrMore<Address>>,
        topics: Option<Vec<Option<OneOrMore<B256>>>>,
    ) -> impl Future<Output = Result<Vec<FilterLog>, RpcClientError>> + Send {
        EthRpcClient::get_logs_by_range(self, from_block, to_block, address, topics)
    }

    fn get_transaction_by_hash(
        &self,
        transaction_hash: B256,
    ) -> impl Future<Output = Result<Option<Transaction>, RpcClientError>> + Send {
        EthRpcClient::get_transaction_by_hash(self, transaction_hash)
    }

    fn get_transaction_receipt(
        &self,
        transaction_hash: B256,
    ) -> impl Future<Output = Result<Option<TransactionReceipt>, RpcClientError>> + Send {
        EthRpcClient::get_transaction_receipt(self, transaction_hash)
    }
}
