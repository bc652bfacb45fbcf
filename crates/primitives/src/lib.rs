//! Primitive types shared by all devchain crates.
#![warn(missing_docs)]

pub use alloy_primitives::{
    Address, B64, B256, Bloom, BloomInput, Bytes, TxKind, U64, U256, address, b256, bytes, hex,
    keccak256,
    map::{self, HashMap, HashSet},
    uint,
};

/// The type of a chain ID.
pub type ChainId = u64;

/// The hash of an empty list of ommers, i.e. `keccak256(rlp([]))`.
pub const KECCAK_EMPTY_LIST: B256 =
    b256!("1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347");

/// The root of an empty Merkle-Patricia trie.
pub const KECCAK_NULL_RLP: B256 =
    b256!("56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421");
