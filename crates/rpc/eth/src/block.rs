use devchain_block_api::BlockHeader;
use devchain_primitives::{Address, B64, B256, Bloom, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::transaction::{ConversionError, Transaction};

/// block object returned by `eth_getBlockBy*`
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block<TransactionT> {
    /// Hash of the block
    pub hash: Option<B256>,
    /// hash of the parent block.
    pub parent_hash: B256,
    /// SHA3 of the uncles data in the block
    pub sha3_uncles: B256,
    /// the root of the final state trie of the block
    pub state_root: B256,
    /// the root of the transaction trie of the block
    pub transactions_root: B256,
    /// the root of the receipts trie of the block
    pub receipts_root: B256,
    /// the block number. None when its pending block.
    #[serde(default, with = "alloy_serde::quantity::opt")]
    pub number: Option<u64>,
    /// the total used gas by all transactions in this block
    #[serde(with = "alloy_serde::quantity")]
    pub gas_used: u64,
    /// the maximum gas allowed in this block
    #[serde(with = "alloy_serde::quantity")]
    pub gas_limit: u64,
    /// the "extra data" field of this block
    pub extra_data: Bytes,
    /// the bloom filter for the logs of the block
    pub logs_bloom: Bloom,
    /// the unix timestamp for when the block was collated
    #[serde(with = "alloy_serde::quantity")]
    pub timestamp: u64,
    /// integer of the difficulty for this block
    pub difficulty: U256,
    /// integer of the total difficulty of the chain until this block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_difficulty: Option<U256>,
    /// Array of uncle hashes
    #[serde(default)]
    pub uncles: Vec<B256>,
    /// Array of transaction objects, or 32 Bytes transaction hashes depending
    /// on the last given parameter
    #[serde(default)]
    pub transactions: Vec<TransactionT>,
    /// Mix hash. None when it's a pending block.
    #[serde(default)]
    pub mix_hash: Option<B256>,
    /// hash of the generated proof-of-work. null when its pending block.
    #[serde(default)]
    pub nonce: Option<B64>,
    /// base fee per gas
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "alloy_serde::quantity::opt"
    )]
    pub base_fee_per_gas: Option<u128>,
    /// the address of the beneficiary to whom the mining rewards were given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub miner: Option<Address>,
}

/// Error that occurs when trying to convert the JSON-RPC `Block` type.
#[derive(Debug, thiserror::Error)]
pub enum MissingFieldError {
    /// Missing hash
    #[error("Missing hash")]
    Hash,
    /// Missing miner
    #[error("Missing miner")]
    Miner,
    /// Missing mix hash
    #[error("Missing mix hash")]
    MixHash,
    /// Missing nonce
    #[error("Missing nonce")]
    Nonce,
    /// Missing number
    #[error("Missing number")]
    Number,
}

/// Error that occurs when converting a remote block into a
/// [`devchain_block_api::Block`].
#[derive(Debug, thiserror::Error)]
pub enum BlockConversionError {
    /// A required field is missing.
    #[error(transparent)]
    MissingField(#[from] MissingFieldError),
    /// A transaction could not be converted.
    #[error(transparent)]
    Transaction(#[from] ConversionError),
}

impl<TransactionT> TryFrom<&Block<TransactionT>> for BlockHeader {
    type Error = MissingFieldError;

    fn try_from(value: &Block<TransactionT>) -> Result<Self, Self::Error> {
        Ok(BlockHeader {
            parent_hash: value.parent_hash,
            ommers_hash: value.sha3_uncles,
            beneficiary: value.miner.ok_or(MissingFieldError::Miner)?,
            state_root: value.state_root,
            transactions_root: value.transactions_root,
            receipts_root: value.receipts_root,
            logs_bloom: value.logs_bloom,
            difficulty: value.difficulty,
            number: value.number.ok_or(MissingFieldError::Number)?,
            gas_limit: value.gas_limit,
            gas_used: value.gas_used,
            timestamp: value.timestamp,
            extra_data: value.extra_data.clone(),
            mix_hash: value.mix_hash.ok_or(MissingFieldError::MixHash)?,
            nonce: value.nonce.ok_or(MissingFieldError::Nonce)?,
            base_fee_per_gas: value.base_fee_per_gas,
        })
    }
}

impl TryFrom<Block<Transaction>> for devchain_block_api::Block {
    type Error = BlockConversionError;

    fn try_from(value: Block<Transaction>) -> Result<Self, Self::Error> {
        let header = BlockHeader::try_from(&value)?;
        let hash = value.hash.ok_or(MissingFieldError::Hash)?;

        let transactions = value
            .transactions
            .into_iter()
            .map(|transaction| {
                transaction
                    .try_into()
                    .map(devchain_transaction::Transaction::ReadOnly)
            })
            .collect::<Result<Vec<_>, ConversionError>>()?;

        Ok(Self::with_hash(hash, header, transactions))
    }
}

#[cfg(test)]
mod tests {
    use devchain_primitives::b256;

    use super::*;

    fn remote_block() -> serde_json::Value {
        serde_json::json!({
            "hash": "0x1b4ae9d8d8b3e2b4a9c0a8b3f1de1dc1c6b6f03e51a46dc1e2ab9b70a32d0f35",
            "parentHash": B256::with_last_byte(1),
            "sha3Uncles": "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
            "miner": Address::with_last_byte(2),
            "stateRoot": B256::with_last_byte(3),
            "transactionsRoot": B256::with_last_byte(4),
            "receiptsRoot": B256::with_last_byte(5),
            "logsBloom": Bloom::ZERO,
            "difficulty": "0x2",
            "totalDifficulty": "0x10",
            "number": "0x64",
            "gasLimit": "0x1c9c380",
            "gasUsed": "0x5208",
            "timestamp": "0x64b0c1f0",
            "extraData": "0x",
            "mixHash": B256::with_last_byte(6),
            "nonce": "0x0000000000000000",
            "baseFeePerGas": "0x7",
            "size": "0x220",
            "uncles": [],
            "transactions": [{
                "hash": B256::with_last_byte(0xaa),
                "nonce": "0x1",
                "blockHash": "0x1b4ae9d8d8b3e2b4a9c0a8b3f1de1dc1c6b6f03e51a46dc1e2ab9b70a32d0f35",
                "blockNumber": "0x64",
                "transactionIndex": "0x0",
                "from": Address::with_last_byte(7),
                "to": null,
                "value": "0x0",
                "gasPrice": "0x9",
                "gas": "0x5208",
                "input": "0x",
                "v": "0x1b",
                "r": "0x1",
                "s": "0x1",
                "type": "0x7e"
            }]
        })
    }

    #[test]
    fn convert_remote_block() -> anyhow::Result<()> {
        let rpc_block: Block<Transaction> = serde_json::from_value(remote_block())?;
        assert_eq!(rpc_block.total_difficulty, Some(U256::from(16)));

        let block = devchain_block_api::Block::try_from(rpc_block)?;
        assert_eq!(
            *block.block_hash(),
            b256!("0x1b4ae9d8d8b3e2b4a9c0a8b3f1de1dc1c6b6f03e51a46dc1e2ab9b70a32d0f35")
        );
        assert_eq!(block.header().number, 100);
        assert_eq!(block.header().base_fee_per_gas, Some(7));
        assert_eq!(block.header().beneficiary, Address::with_last_byte(2));

        let transactions = block.transactions();
        assert_eq!(transactions.len(), 1);
        assert!(transactions[0].is_read_only());
        assert_eq!(*transactions[0].caller(), Address::with_last_byte(7));
        assert_eq!(
            u8::from(transactions[0].transaction_type()),
            0x7e,
            "unknown transaction types are preserved"
        );

        Ok(())
    }

    #[test]
    fn missing_number_is_rejected() -> anyhow::Result<()> {
        let mut rpc_block: Block<Transaction> = serde_json::from_value(remote_block())?;
        rpc_block.number = None;

        let error = devchain_block_api::Block::try_from(rpc_block)
            .expect_err("pending blocks cannot be converted");
        assert!(matches!(
            error,
            BlockConversionError::MissingField(MissingFieldError::Number)
        ));

        Ok(())
    }
}
