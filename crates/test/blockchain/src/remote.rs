use devchain_block_api::BlockSpec;
use devchain_primitives::{Address, B64, B256, HashMap, HashSet, U256};
use devchain_receipt::{TransactionReceipt, filter::filter_logs, log::FilterLog};
use devchain_rpc_client::RpcClientError;
use devchain_rpc_eth::{
    RemoteClient, block::Block as RpcBlock, filter::OneOrMore, fork::ForkMetadata,
    transaction::Transaction as RpcTransaction,
};
use parking_lot::Mutex;

/// Returns the hash of the generated remote block with the provided number.
pub fn remote_block_hash(number: u64) -> B256 {
    let mut hash = B256::repeat_byte(0xbb);
    hash.0[24..].copy_from_slice(&number.to_be_bytes());
    hash
}

/// Generates a remote block without transactions. Every block has difficulty
/// one and links to the generated block before it.
pub fn remote_block(number: u64) -> RpcBlock<RpcTransaction> {
    RpcBlock {
        hash: Some(remote_block_hash(number)),
        parent_hash: number
            .checked_sub(1)
            .map_or(B256::ZERO, remote_block_hash),
        miner: Some(Address::ZERO),
        mix_hash: Some(B256::ZERO),
        nonce: Some(B64::ZERO),
        number: Some(number),
        difficulty: U256::from(1),
        total_difficulty: Some(U256::from(number + 1)),
        timestamp: 1_000 + number * 12,
        gas_limit: 30_000_000,
        ..RpcBlock::default()
    }
}

/// A call received by a [`MockRemoteClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteCall {
    /// `fork_metadata`
    ForkMetadata,
    /// `eth_getBlockByHash`
    BlockByHash(B256),
    /// `eth_getBlockByNumber`
    BlockByNumber(u64),
    /// `eth_getLogs`
    Logs {
        /// Start of the queried range
        from_block: BlockSpec,
        /// End of the queried range
        to_block: BlockSpec,
    },
    /// `eth_getTransactionByHash`
    TransactionByHash(B256),
    /// `eth_getTransactionReceipt`
    TransactionReceipt(B256),
}

/// An in-memory remote chain that records every call it receives.
///
/// Blocks up to the latest block number are generated by [`remote_block`],
/// unless replaced using [`MockRemoteClient::with_block`].
#[derive(Debug)]
pub struct MockRemoteClient {
    metadata: ForkMetadata,
    blocks: HashMap<u64, RpcBlock<RpcTransaction>>,
    ommers: Vec<RpcBlock<RpcTransaction>>,
    transactions: HashMap<B256, RpcTransaction>,
    receipts: HashMap<B256, TransactionReceipt>,
    logs: Vec<FilterLog>,
    calls: Mutex<Vec<RemoteCall>>,
}

impl MockRemoteClient {
    /// Constructs a remote chain with the provided chain ID and latest block
    /// number. The network ID equals the chain ID.
    pub fn new(chain_id: u64, latest_block_number: u64) -> Self {
        Self {
            metadata: ForkMetadata {
                chain_id,
                network_id: chain_id,
                latest_block_number,
            },
            blocks: HashMap::default(),
            ommers: Vec::new(),
            transactions: HashMap::default(),
            receipts: HashMap::default(),
            logs: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Overrides the network ID.
    pub fn with_network_id(mut self, network_id: u64) -> Self {
        self.metadata.network_id = network_id;
        self
    }

    /// Replaces the generated block at the block's number. The block's
    /// transactions become retrievable by hash.
    pub fn with_block(mut self, block: RpcBlock<RpcTransaction>) -> Self {
        let number = block.number.expect("Remote blocks must have a number");

        for (index, transaction) in block.transactions.iter().enumerate() {
            let mut transaction = transaction.clone();
            transaction.block_hash = block.hash;
            transaction.block_number = Some(number);
            transaction.transaction_index = Some(index as u64);

            self.transactions.insert(transaction.hash, transaction);
        }

        self.blocks.insert(number, block);
        self
    }

    /// Adds a non-canonical block that is only retrievable by hash.
    pub fn with_ommer(mut self, block: RpcBlock<RpcTransaction>) -> Self {
        self.ommers.push(block);
        self
    }

    /// Adds a transaction that is not included in any block.
    pub fn with_pending_transaction(mut self, mut transaction: RpcTransaction) -> Self {
        transaction.block_hash = None;
        transaction.block_number = None;
        transaction.transaction_index = None;

        self.transactions.insert(transaction.hash, transaction);
        self
    }

    /// Adds a receipt.
    pub fn with_receipt(mut self, receipt: TransactionReceipt) -> Self {
        self.receipts.insert(receipt.transaction_hash, receipt);
        self
    }

    /// Adds logs that are returned by `eth_getLogs`.
    pub fn with_logs(mut self, logs: impl IntoIterator<Item = FilterLog>) -> Self {
        self.logs.extend(logs);
        self
    }

    /// Returns the calls received so far.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().clone()
    }

    /// Forgets the calls received so far.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: RemoteCall) {
        self.calls.lock().push(call);
    }

    fn block_by_number(&self, number: u64) -> Option<RpcBlock<RpcTransaction>> {
        if number > self.metadata.latest_block_number {
            return None;
        }

        Some(
            self.blocks
                .get(&number)
                .cloned()
                .unwrap_or_else(|| remote_block(number)),
        )
    }

    fn block_by_hash(&self, hash: &B256) -> Option<RpcBlock<RpcTransaction>> {
        if let Some(block) = self
            .blocks
            .values()
            .chain(self.ommers.iter())
            .find(|block| block.hash.as_ref() == Some(hash))
        {
            return Some(block.clone());
        }

        if hash.0[..24] != [0xbb; 24] {
            return None;
        }

        let number = u64::from_be_bytes(hash.0[24..].try_into().expect("Slice has length 8"));
        self.block_by_number(number)
            .filter(|block| block.hash.as_ref() == Some(hash))
    }
}

impl RemoteClient for MockRemoteClient {
    async fn fork_metadata(&self) -> Result<ForkMetadata, RpcClientError> {
        self.record(RemoteCall::ForkMetadata);

        Ok(self.metadata.clone())
    }

    async fn get_block_by_hash_with_transaction_data(
        &self,
        hash: B256,
    ) -> Result<Option<RpcBlock<RpcTransaction>>, RpcClientError> {
        self.record(RemoteCall::BlockByHash(hash));

        Ok(self.block_by_hash(&hash))
    }

    async fn get_block_by_number_with_transaction_data(
        &self,
        number: u64,
    ) -> Result<Option<RpcBlock<RpcTransaction>>, RpcClientError> {
        self.record(RemoteCall::BlockByNumber(number));

        Ok(self.block_by_number(number))
    }

    async fn get_logs_by_range(
        &self,
        from_block: BlockSpec,
        to_block: BlockSpec,
        address: Option<OneOrMore<Address>>,
        topics: Option<Vec<Option<OneOrMore<B256>>>>,
    ) -> Result<Vec<FilterLog>, RpcClientError> {
        self.record(RemoteCall::Logs {
            from_block,
            to_block,
        });

        let latest_block_number = self.metadata.latest_block_number;
        let addresses: HashSet<Address> = address
            .map(OneOrMore::into_vec)
            .unwrap_or_default()
            .into_iter()
            .collect();
        let topics: Vec<Option<Vec<B256>>> = topics
            .unwrap_or_default()
            .into_iter()
            .map(|topics| topics.map(OneOrMore::into_vec))
            .collect();

        Ok(filter_logs(
            &self.logs,
            from_block.resolve(latest_block_number),
            to_block.resolve(latest_block_number),
            &addresses,
            &topics,
        ))
    }

    async fn get_transaction_by_hash(
        &self,
        transaction_hash: B256,
    ) -> Result<Option<RpcTransaction>, RpcClientError> {
        self.record(RemoteCall::TransactionByHash(transaction_hash));

        Ok(self.transactions.get(&transaction_hash).cloned())
    }

    async fn get_transaction_receipt(
        &self,
        transaction_hash: B256,
    ) -> Result<Option<TransactionReceipt>, RpcClientError> {
        self.record(RemoteCall::TransactionReceipt(transaction_hash));

        Ok(self.receipts.get(&transaction_hash).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generated_blocks_are_linked() -> anyhow::Result<()> {
        let client = MockRemoteClient::new(1, 10);

        let block = client
            .get_block_by_number_with_transaction_data(5)
            .await?
            .expect("Block exists");
        assert_eq!(block.hash, Some(remote_block_hash(5)));
        assert_eq!(block.parent_hash, remote_block_hash(4));

        let by_hash = client
            .get_block_by_hash_with_transaction_data(remote_block_hash(5))
            .await?;
        assert_eq!(by_hash, Some(block));

        assert!(
            client
                .get_block_by_number_with_transaction_data(11)
                .await?
                .is_none()
        );
        assert!(
            client
                .get_block_by_hash_with_transaction_data(B256::ZERO)
                .await?
                .is_none()
        );

        assert_eq!(
            client.calls(),
            vec![
                RemoteCall::BlockByNumber(5),
                RemoteCall::BlockByHash(remote_block_hash(5)),
                RemoteCall::BlockByNumber(11),
                RemoteCall::BlockByHash(B256::ZERO),
            ]
        );

        Ok(())
    }
}
