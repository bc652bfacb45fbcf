use std::sync::OnceLock;

use alloy_rlp::RlpEncodable;
use devchain_primitives::{Address, B256, Bytes, TxKind, U256};

use super::impl_fake_signed;

/// A legacy transaction with EIP-155 replay protection.
#[derive(Clone, Debug, Eq, RlpEncodable)]
pub struct Legacy {
    // The order of these fields determines encoding order.
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub kind: TxKind,
    pub value: U256,
    pub input: Bytes,
    pub chain_id: u64,
    pub caller: Address,
    /// Cached transaction hash
    #[rlp(default)]
    #[rlp(skip)]
    pub hash: OnceLock<B256>,
}

impl Legacy {
    /// The type identifier for a legacy transaction.
    pub const TYPE: u8 = 0;
}

impl_fake_signed!(Legacy);

impl PartialEq for Legacy {
    fn eq(&self, other: &Self) -> bool {
        self.nonce == other.nonce
            && self.gas_price == other.gas_price
            && self.gas_limit == other.gas_limit
            && self.kind == other.kind
            && self.value == other.value
            && self.input == other.input
            && self.chain_id == other.chain_id
            && self.caller == other.caller
    }
}
