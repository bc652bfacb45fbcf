use devchain_block_api::BlockSpec;
use devchain_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// A single value or a list of values.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OneOrMore<T> {
    /// A single value
    One(T),
    /// Multiple values
    Many(Vec<T>),
}

impl<T> OneOrMore<T> {
    /// Constructs an instance from a list of values. Returns `None` if the
    /// list is empty.
    pub fn from_values(values: Vec<T>) -> Option<Self> {
        if values.len() > 1 {
            Some(Self::Many(values))
        } else {
            values.into_iter().next().map(Self::One)
        }
    }

    /// Converts the instance into a list of values.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Filter options for `eth_getLogs`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilterOptions {
    /// Beginning of a range of blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_block: Option<BlockSpec>,
    /// End of a range of blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_block: Option<BlockSpec>,
    /// A single block, specified by its hash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<B256>,
    /// Address(es) of the contracts that emitted the logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<OneOrMore<Address>>,
    /// Topic alternatives per position. `None` matches any topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Option<OneOrMore<B256>>>>,
}
