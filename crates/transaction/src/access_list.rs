use alloy_rlp::RlpEncodable;
use devchain_primitives::{Address, B256};

/// An access list item, as defined by EIP-2930.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, RlpEncodable, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListItem {
    /// Account address that will be loaded at the start of execution
    pub address: Address,
    /// Keys of storage slots that will be loaded at the start of execution
    pub storage_keys: Vec<B256>,
}

/// A list of addresses and storage keys that a transaction plans to access.
pub type AccessList = Vec<AccessListItem>;
