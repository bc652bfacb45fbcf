use devchain_primitives::{Address, B256, Bytes, TxKind, U256};
use devchain_transaction::{AccessList, ReadOnly, RemoteTransactionKind};
use serde::{Deserialize, Serialize};

/// RPC transaction
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// hash of the transaction
    pub hash: B256,
    /// the number of transactions made by the sender prior to this one
    #[serde(with = "alloy_serde::quantity")]
    pub nonce: u64,
    /// hash of the block where this transaction was in
    pub block_hash: Option<B256>,
    /// block number where this transaction was in
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub block_number: Option<u64>,
    /// integer of the transactions index position in the block. null when its
    /// pending
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub transaction_index: Option<u64>,
    /// address of the sender
    pub from: Address,
    /// address of the receiver. null when its a contract creation transaction.
    pub to: Option<Address>,
    /// value transferred in Wei
    pub value: U256,
    /// gas price provided by the sender in Wei
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub gas_price: Option<u128>,
    /// gas provided by the sender
    #[serde(with = "alloy_serde::quantity")]
    pub gas: u64,
    /// the data sent along with the transaction
    pub input: Bytes,
    /// ECDSA recovery id
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub v: Option<u64>,
    /// ECDSA signature r
    #[serde(default)]
    pub r: U256,
    /// ECDSA signature s
    #[serde(default)]
    pub s: U256,
    /// chain ID
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub chain_id: Option<u64>,
    /// integer of the transaction type, 0x0 for legacy transactions, 0x1 for
    /// access list types, 0x2 for dynamic fees
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub transaction_type: Option<u64>,
    /// access list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_list: Option<AccessList>,
    /// max fee per gas
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub max_fee_per_gas: Option<u128>,
    /// max priority fee per gas
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub max_priority_fee_per_gas: Option<u128>,
}

/// Error that occurs when trying to convert the JSON-RPC `Transaction` type.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The transaction type does not fit into a type identifier.
    #[error("Unsupported type {0}")]
    UnsupportedType(u64),
}

impl TryFrom<Transaction> for ReadOnly {
    type Error = ConversionError;

    fn try_from(value: Transaction) -> Result<Self, Self::Error> {
        let transaction_type = value.transaction_type.unwrap_or_default();
        let kind_of_transaction = u8::try_from(transaction_type)
            .map(RemoteTransactionKind::from)
            .map_err(|_error| ConversionError::UnsupportedType(transaction_type))?;

        Ok(ReadOnly {
            kind_of_transaction,
            hash: value.hash,
            caller: value.from,
            nonce: value.nonce,
            gas_limit: value.gas,
            gas_price: value.gas_price,
            max_fee_per_gas: value.max_fee_per_gas,
            max_priority_fee_per_gas: value.max_priority_fee_per_gas,
            kind: value.to.map_or(TxKind::Create, TxKind::Call),
            value: value.value,
            input: value.input,
            chain_id: value.chain_id,
            access_list: value.access_list,
        })
    }
}
