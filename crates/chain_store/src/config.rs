use std::collections::HashMap;

use devchain_consensus::ConsensusAlgorithm;
use serde::{Deserialize, Serialize};

/// Configuration for forking a remote blockchain
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkConfig {
    /// URL of the remote JSON-RPC endpoint
    pub json_rpc_url: String,
    /// The block to fork from. Defaults to the largest block number that is
    /// safe from reorgs.
    pub block_number: Option<u64>,
    /// Extra HTTP headers sent with every request
    pub http_headers: Option<HashMap<String, String>>,
    /// Replaces the remote chain ID for the forked blockchain
    pub chain_id_override: Option<u64>,
}

/// Configuration of a [`crate::ChainStore`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStoreConfig {
    /// The chain ID of a local blockchain
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// The network ID of a local blockchain. Defaults to the chain ID.
    #[serde(default)]
    pub network_id: Option<u64>,
    /// The consensus rules that new blocks must follow
    pub consensus: ConsensusAlgorithm,
    /// If present, the remote blockchain to fork
    #[serde(default)]
    pub fork: Option<ForkConfig>,
}

impl Default for ChainStoreConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            network_id: None,
            consensus: ConsensusAlgorithm::Ethash,
            fork: None,
        }
    }
}

fn default_chain_id() -> u64 {
    devchain_defaults::CHAIN_ID
}
