use devchain_primitives::{Address, B256, Bytes, TxKind, U256};

use crate::{AccessList, TransactionError, TransactionType, signed};

/// The on-chain type of a remote transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemoteTransactionKind {
    /// Legacy transaction
    Legacy,
    /// EIP-2930 transaction
    AccessList,
    /// EIP-1559 transaction
    FeeMarket,
    /// A transaction type unknown to this node. The raw type identifier is
    /// preserved.
    Unknown(u8),
}

impl From<u8> for RemoteTransactionKind {
    fn from(value: u8) -> Self {
        match value {
            signed::Legacy::TYPE => Self::Legacy,
            signed::Eip2930::TYPE => Self::AccessList,
            signed::Eip1559::TYPE => Self::FeeMarket,
            r#type => Self::Unknown(r#type),
        }
    }
}

impl From<RemoteTransactionKind> for TransactionType {
    fn from(value: RemoteTransactionKind) -> Self {
        match value {
            RemoteTransactionKind::Legacy => Self::Legacy,
            RemoteTransactionKind::AccessList => Self::AccessList,
            RemoteTransactionKind::FeeMarket => Self::FeeMarket,
            RemoteTransactionKind::Unknown(r#type) => Self::Unknown(r#type),
        }
    }
}

/// A transaction fetched from a remote chain.
///
/// Its sender was recovered by the remote node and its hash is the one
/// reported by the remote node. Neither can be recomputed locally, so the
/// transaction cannot be modified nor re-signed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadOnly {
    pub kind_of_transaction: RemoteTransactionKind,
    pub hash: B256,
    pub caller: Address,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
    pub kind: TxKind,
    pub value: U256,
    pub input: Bytes,
    pub chain_id: Option<u64>,
    pub access_list: Option<AccessList>,
}

impl ReadOnly {
    pub(crate) fn read_only_error(&self) -> TransactionError {
        TransactionError::ReadOnly {
            transaction_hash: self.hash,
        }
    }
}
