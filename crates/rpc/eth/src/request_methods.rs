use devchain_block_api::BlockSpec;
use devchain_primitives::B256;
use serde::Serialize;

use crate::filter::LogFilterOptions;

/// Methods for requests to a remote Ethereum node. Only contains methods
/// needed to fork a remote chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum RequestMethod {
    /// `eth_blockNumber`
    #[serde(rename = "eth_blockNumber", serialize_with = "crate::params::empty")]
    BlockNumber(()),
    /// `eth_chainId`
    #[serde(rename = "eth_chainId", serialize_with = "crate::params::empty")]
    ChainId(()),
    /// `eth_getBlockByHash`
    #[serde(rename = "eth_getBlockByHash")]
    GetBlockByHash(
        /// hash
        B256,
        /// include transaction data
        bool,
    ),
    /// `eth_getBlockByNumber`
    #[serde(rename = "eth_getBlockByNumber")]
    GetBlockByNumber(
        /// block spec
        BlockSpec,
        /// include transaction data
        bool,
    ),
    /// `eth_getLogs`
    #[serde(rename = "eth_getLogs", serialize_with = "crate::params::sequence")]
    GetLogs(LogFilterOptions),
    /// `eth_getTransactionByHash`
    #[serde(
        rename = "eth_getTransactionByHash",
        serialize_with = "crate::params::sequence"
    )]
    GetTransactionByHash(B256),
    /// `eth_getTransactionReceipt`
    #[serde(
        rename = "eth_getTransactionReceipt",
        serialize_with = "crate::params::sequence"
    )]
    GetTransactionReceipt(B256),
    /// `net_version`
    #[serde(rename = "net_version", serialize_with = "crate::params::empty")]
    NetVersion(()),
}
