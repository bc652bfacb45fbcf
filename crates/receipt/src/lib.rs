//! Ethereum receipt and log types, and the log filter engine.
#![warn(missing_docs)]

/// Bloom-first log filtering
pub mod filter;
/// Ethereum log types
pub mod log;

use devchain_primitives::{Address, B256, Bloom};

use crate::log::FilterLog;

/// The receipt of a transaction that was included in a block.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Hash of the transaction
    pub transaction_hash: B256,
    /// Index of the transaction in its block
    #[serde(with = "alloy_serde::quantity")]
    pub transaction_index: u64,
    /// Hash of the block containing the transaction
    pub block_hash: B256,
    /// Number of the block containing the transaction
    #[serde(with = "alloy_serde::quantity")]
    pub block_number: u64,
    /// Address of the sender
    pub from: Address,
    /// Address of the receiver. `None` for contract creations.
    pub to: Option<Address>,
    /// The contract address created, if the transaction was a contract
    /// creation.
    pub contract_address: Option<Address>,
    /// Gas used by this transaction alone
    #[serde(with = "alloy_serde::quantity")]
    pub gas_used: u64,
    /// Gas used by this transaction and all preceding transactions in the
    /// block
    #[serde(with = "alloy_serde::quantity")]
    pub cumulative_gas_used: u64,
    /// The price paid per unit of gas
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub effective_gas_price: Option<u64>,
    /// Execution status: 1 for success, 0 for failure. `None` for
    /// pre-Byzantium receipts.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub status: Option<u64>,
    /// Bloom filter of the logs
    pub logs_bloom: Bloom,
    /// Logs emitted by the transaction
    pub logs: Vec<FilterLog>,
    /// Type of the transaction
    #[serde(rename = "type", default, with = "alloy_serde::quantity")]
    pub transaction_type: u8,
}

impl TransactionReceipt {
    /// Returns the logs emitted by the transaction.
    pub fn transaction_logs(&self) -> &[FilterLog] {
        &self.logs
    }
}
