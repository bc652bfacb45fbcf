use std::sync::OnceLock;

use alloy_rlp::RlpEncodable;
use devchain_primitives::{Address, B256, Bytes, TxKind, U256};

use super::impl_fake_signed;
use crate::AccessList;

/// An EIP-2930 transaction.
#[derive(Clone, Debug, Eq, RlpEncodable)]
pub struct Eip2930 {
    // The order of these fields determines encoding order.
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub kind: TxKind,
    pub value: U256,
    pub input: Bytes,
    pub access_list: AccessList,
    pub caller: Address,
    /// Cached transaction hash
    #[rlp(default)]
    #[rlp(skip)]
    pub hash: OnceLock<B256>,
}

impl Eip2930 {
    /// The type identifier for an EIP-2930 transaction.
    pub const TYPE: u8 = 1;
}

impl_fake_signed!(Eip2930);

impl PartialEq for Eip2930 {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id
            && self.nonce == other.nonce
            && self.gas_price == other.gas_price
            && self.gas_limit == other.gas_limit
            && self.kind == other.kind
            && self.value == other.value
            && self.input == other.input
            && self.access_list == other.access_list
            && self.caller == other.caller
    }
}
