use std::ops::Deref;

use devchain_primitives::{Address, B256, Bytes};

/// A log emitted during the execution of a transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Log {
    /// Address of the contract that emitted the log
    pub address: Address,
    /// Indexed topics, at most four
    pub topics: Vec<B256>,
    /// Non-indexed data
    pub data: Bytes,
}

impl Log {
    /// Returns the log's topics.
    pub fn topics(&self) -> &[B256] {
        &self.topics
    }
}

/// A log together with its position in the chain.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterLog {
    /// Execution log
    #[serde(flatten)]
    pub inner: Log,
    /// Hash of the block containing the log
    pub block_hash: B256,
    /// Number of the block containing the log
    #[serde(with = "alloy_serde::quantity")]
    pub block_number: u64,
    /// Index of the log within the block
    #[serde(with = "alloy_serde::quantity")]
    pub log_index: u64,
    /// Hash of the transaction that emitted the log
    pub transaction_hash: B256,
    /// Index of the transaction within the block
    #[serde(with = "alloy_serde::quantity")]
    pub transaction_index: u64,
    /// Whether the log was removed due to a chain reorganisation
    #[serde(default)]
    pub removed: bool,
}

impl Deref for FilterLog {
    type Target = Log;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
