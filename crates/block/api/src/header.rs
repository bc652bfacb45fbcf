use devchain_primitives::{
    Address, B64, B256, Bloom, Bytes, KECCAK_EMPTY_LIST, KECCAK_NULL_RLP, U256, keccak256,
};

/// Ethereum block header
#[derive(Clone, Debug, PartialEq, Eq, alloy_rlp::RlpEncodable)]
#[rlp(trailing)]
pub struct BlockHeader {
    /// The parent block's hash
    pub parent_hash: B256,
    /// The ommers' root hash
    pub ommers_hash: B256,
    /// The block's beneficiary address
    pub beneficiary: Address,
    /// The state's root hash
    pub state_root: B256,
    /// The transactions' root hash
    pub transactions_root: B256,
    /// The receipts' root hash
    pub receipts_root: B256,
    /// The logs' bloom
    pub logs_bloom: Bloom,
    /// The block's difficulty
    pub difficulty: U256,
    /// The block's number
    pub number: u64,
    /// The block's gas limit
    pub gas_limit: u64,
    /// The amount of gas used by the block
    pub gas_used: u64,
    /// The block's timestamp
    pub timestamp: u64,
    /// The block's extra data
    pub extra_data: Bytes,
    /// The block's mix hash
    pub mix_hash: B256,
    /// The block's nonce
    pub nonce: B64,
    /// `BaseFee` was added by EIP-1559 and is ignored in legacy headers.
    pub base_fee_per_gas: Option<u128>,
}

impl BlockHeader {
    /// Calculates the block's hash.
    pub fn hash(&self) -> B256 {
        let encoded = alloy_rlp::encode(self);
        keccak256(encoded)
    }
}

impl Default for BlockHeader {
    fn default() -> Self {
        Self {
            parent_hash: B256::ZERO,
            ommers_hash: KECCAK_EMPTY_LIST,
            beneficiary: Address::ZERO,
            state_root: KECCAK_NULL_RLP,
            transactions_root: KECCAK_NULL_RLP,
            receipts_root: KECCAK_NULL_RLP,
            logs_bloom: Bloom::ZERO,
            difficulty: U256::ZERO,
            number: 0,
            gas_limit: 30_000_000,
            gas_used: 0,
            timestamp: 0,
            extra_data: Bytes::new(),
            mix_hash: B256::ZERO,
            nonce: B64::ZERO,
            base_fee_per_gas: None,
        }
    }
}
