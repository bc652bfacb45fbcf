//! Ethereum transaction types
#![allow(missing_docs)]

mod access_list;
/// Read-only transactions fetched from a remote chain.
pub mod remote;
/// Types for locally signed transactions.
pub mod signed;
/// Utility functions
pub mod utils;

use devchain_primitives::{Address, B256, Bytes, TxKind, U256};

pub use self::{
    access_list::{AccessList, AccessListItem},
    remote::{ReadOnly, RemoteTransactionKind},
};

/// An error that occurs when trying to mutate a transaction.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError {
    /// Remote transactions cannot be modified or re-signed.
    #[error("Transaction {transaction_hash} was fetched from a remote chain and is read-only")]
    ReadOnly {
        /// The hash of the remote transaction
        transaction_hash: B256,
    },
}

/// The type of a transaction, as encoded in its envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Legacy transaction
    Legacy,
    /// EIP-2930 transaction
    AccessList,
    /// EIP-1559 transaction
    FeeMarket,
    /// A transaction type unknown to this node
    Unknown(u8),
}

impl From<TransactionType> for u8 {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Legacy => signed::Legacy::TYPE,
            TransactionType::AccessList => signed::Eip2930::TYPE,
            TransactionType::FeeMarket => signed::Eip1559::TYPE,
            TransactionType::Unknown(r#type) => r#type,
        }
    }
}

impl From<u8> for TransactionType {
    fn from(value: u8) -> Self {
        match value {
            signed::Legacy::TYPE => Self::Legacy,
            signed::Eip2930::TYPE => Self::AccessList,
            signed::Eip1559::TYPE => Self::FeeMarket,
            r#type => Self::Unknown(r#type),
        }
    }
}

/// A transaction stored in a block.
///
/// Locally created transactions carry their sender and can be modified, which
/// invalidates their hash. Transactions fetched from a remote chain are
/// wrapped in [`ReadOnly`] and reject any modification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transaction {
    /// Legacy transaction
    Legacy(signed::Legacy),
    /// EIP-2930 transaction
    AccessList(signed::Eip2930),
    /// EIP-1559 transaction
    FeeMarket(signed::Eip1559),
    /// Transaction fetched from a remote chain
    ReadOnly(ReadOnly),
}

impl Transaction {
    /// Returns the transaction's hash.
    pub fn transaction_hash(&self) -> &B256 {
        match self {
            Transaction::Legacy(transaction) => transaction.transaction_hash(),
            Transaction::AccessList(transaction) => transaction.transaction_hash(),
            Transaction::FeeMarket(transaction) => transaction.transaction_hash(),
            Transaction::ReadOnly(transaction) => &transaction.hash,
        }
    }

    /// Returns the address of the transaction's sender.
    pub fn caller(&self) -> &Address {
        match self {
            Transaction::Legacy(transaction) => &transaction.caller,
            Transaction::AccessList(transaction) => &transaction.caller,
            Transaction::FeeMarket(transaction) => &transaction.caller,
            Transaction::ReadOnly(transaction) => &transaction.caller,
        }
    }

    /// Returns the transaction's nonce.
    pub fn nonce(&self) -> u64 {
        match self {
            Transaction::Legacy(transaction) => transaction.nonce,
            Transaction::AccessList(transaction) => transaction.nonce,
            Transaction::FeeMarket(transaction) => transaction.nonce,
            Transaction::ReadOnly(transaction) => transaction.nonce,
        }
    }

    /// Returns the transaction's gas limit.
    pub fn gas_limit(&self) -> u64 {
        match self {
            Transaction::Legacy(transaction) => transaction.gas_limit,
            Transaction::AccessList(transaction) => transaction.gas_limit,
            Transaction::FeeMarket(transaction) => transaction.gas_limit,
            Transaction::ReadOnly(transaction) => transaction.gas_limit,
        }
    }

    /// Returns the transaction's kind: a call or a contract creation.
    pub fn kind(&self) -> TxKind {
        match self {
            Transaction::Legacy(transaction) => transaction.kind,
            Transaction::AccessList(transaction) => transaction.kind,
            Transaction::FeeMarket(transaction) => transaction.kind,
            Transaction::ReadOnly(transaction) => transaction.kind,
        }
    }

    /// Returns the value transferred by the transaction.
    pub fn value(&self) -> &U256 {
        match self {
            Transaction::Legacy(transaction) => &transaction.value,
            Transaction::AccessList(transaction) => &transaction.value,
            Transaction::FeeMarket(transaction) => &transaction.value,
            Transaction::ReadOnly(transaction) => &transaction.value,
        }
    }

    /// Returns the transaction's input data.
    pub fn data(&self) -> &Bytes {
        match self {
            Transaction::Legacy(transaction) => &transaction.input,
            Transaction::AccessList(transaction) => &transaction.input,
            Transaction::FeeMarket(transaction) => &transaction.input,
            Transaction::ReadOnly(transaction) => &transaction.input,
        }
    }

    /// Returns the transaction's chain ID, if any.
    pub fn chain_id(&self) -> Option<u64> {
        match self {
            Transaction::Legacy(transaction) => Some(transaction.chain_id),
            Transaction::AccessList(transaction) => Some(transaction.chain_id),
            Transaction::FeeMarket(transaction) => Some(transaction.chain_id),
            Transaction::ReadOnly(transaction) => transaction.chain_id,
        }
    }

    /// Returns the transaction's access list, if its type supports one.
    pub fn access_list(&self) -> Option<&[AccessListItem]> {
        match self {
            Transaction::Legacy(_) => None,
            Transaction::AccessList(transaction) => Some(&transaction.access_list),
            Transaction::FeeMarket(transaction) => Some(&transaction.access_list),
            Transaction::ReadOnly(transaction) => transaction.access_list.as_deref(),
        }
    }

    /// Returns the transaction's type.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Transaction::Legacy(_) => TransactionType::Legacy,
            Transaction::AccessList(_) => TransactionType::AccessList,
            Transaction::FeeMarket(_) => TransactionType::FeeMarket,
            Transaction::ReadOnly(transaction) => transaction.kind_of_transaction.into(),
        }
    }

    /// Whether the transaction was fetched from a remote chain.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Transaction::ReadOnly(_))
    }

    /// Sets the transaction's nonce.
    pub fn set_nonce(&mut self, nonce: u64) -> Result<(), TransactionError> {
        match self {
            Transaction::Legacy(transaction) => transaction.set_nonce(nonce),
            Transaction::AccessList(transaction) => transaction.set_nonce(nonce),
            Transaction::FeeMarket(transaction) => transaction.set_nonce(nonce),
            Transaction::ReadOnly(transaction) => return Err(transaction.read_only_error()),
        }

        Ok(())
    }

    /// Sets the transaction's gas limit.
    pub fn set_gas_limit(&mut self, gas_limit: u64) -> Result<(), TransactionError> {
        match self {
            Transaction::Legacy(transaction) => transaction.set_gas_limit(gas_limit),
            Transaction::AccessList(transaction) => transaction.set_gas_limit(gas_limit),
            Transaction::FeeMarket(transaction) => transaction.set_gas_limit(gas_limit),
            Transaction::ReadOnly(transaction) => return Err(transaction.read_only_error()),
        }

        Ok(())
    }

    /// Re-signs the transaction for the provided sender.
    pub fn sign_as(&mut self, caller: Address) -> Result<(), TransactionError> {
        match self {
            Transaction::Legacy(transaction) => transaction.sign_as(caller),
            Transaction::AccessList(transaction) => transaction.sign_as(caller),
            Transaction::FeeMarket(transaction) => transaction.sign_as(caller),
            Transaction::ReadOnly(transaction) => return Err(transaction.read_only_error()),
        }

        Ok(())
    }
}

impl From<signed::Legacy> for Transaction {
    fn from(value: signed::Legacy) -> Self {
        Self::Legacy(value)
    }
}

impl From<signed::Eip2930> for Transaction {
    fn from(value: signed::Eip2930) -> Self {
        Self::AccessList(value)
    }
}

impl From<signed::Eip1559> for Transaction {
    fn from(value: signed::Eip1559) -> Self {
        Self::FeeMarket(value)
    }
}

impl From<ReadOnly> for Transaction {
    fn from(value: ReadOnly) -> Self {
        Self::ReadOnly(value)
    }
}
