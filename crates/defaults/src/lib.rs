//! Default values used across the devchain crates.
#![warn(missing_docs)]

use devchain_primitives::{U256, uint};

/// The terminal total difficulty of Ethereum mainnet.
///
/// Used as the total difficulty of remote blocks when the remote node omits
/// the `totalDifficulty` field and it cannot be derived from a cached parent.
pub const TERMINAL_TOTAL_DIFFICULTY: U256 = uint!(58_750_000_000_000_000_000_000_U256);

/// The number of blocks below the latest block that are considered safe from
/// reorgs, for chains without a known value.
pub const DEFAULT_SAFE_BLOCK_DEPTH: u64 = 30;

/// Known safe block depths per chain ID.
pub const SAFE_BLOCK_DEPTHS: &[(u64, u64)] = &[
    // Mainnet
    (1, 5),
    // Ropsten
    (3, 100),
    // Rinkeby
    (4, 5),
    // Goerli
    (5, 5),
    // Kovan
    (42, 5),
    // Gnosis
    (100, 38),
];

/// The default chain ID of a local chain.
pub const CHAIN_ID: u64 = 31_337;
