//! Test utilities for blockchain-related tests.
#![warn(missing_docs)]

#[macro_use]
mod macros;
mod remote;

use core::fmt::Debug;
use std::sync::{Arc, OnceLock};

use devchain_block_api::{Block, BlockHeader};
use devchain_blockchain_api::{BlockchainMetadata, GetBlockchainBlock, InsertBlock};
use devchain_primitives::{Address, B256, Bytes, TxKind, U256};
use devchain_receipt::{
    TransactionReceipt,
    filter::logs_to_bloom,
    log::{FilterLog, Log},
};
use devchain_transaction::{Transaction, signed};
// Re-export types that are used by the macros.
pub use paste;

pub use self::remote::{MockRemoteClient, RemoteCall, remote_block, remote_block_hash};

/// Creates a dummy block for the provided blockchain.
pub fn create_dummy_block<BlockchainT>(blockchain: &mut BlockchainT) -> Block
where
    BlockchainT: BlockchainMetadata + GetBlockchainBlock + ?Sized,
    BlockchainT::Error: Debug,
{
    let block_number = blockchain.last_block_number() + 1;

    create_dummy_block_with_number(blockchain, block_number)
}

/// Creates a dummy block with the specified block number for the provided
/// blockchain.
pub fn create_dummy_block_with_number<BlockchainT>(
    blockchain: &mut BlockchainT,
    number: u64,
) -> Block
where
    BlockchainT: GetBlockchainBlock + ?Sized,
    BlockchainT::Error: Debug,
{
    let parent_hash = *blockchain
        .last_block()
        .expect("Failed to retrieve last block")
        .block_hash();

    create_dummy_block_with_hash(blockchain, number, parent_hash)
}

/// Creates a dummy block with the specified block number and difficulty for the
/// provided blockchain.
pub fn create_dummy_block_with_difficulty<BlockchainT>(
    blockchain: &mut BlockchainT,
    number: u64,
    difficulty: u64,
) -> Block
where
    BlockchainT: GetBlockchainBlock + ?Sized,
    BlockchainT::Error: Debug,
{
    let last_block = blockchain
        .last_block()
        .expect("Failed to retrieve last block");

    create_dummy_block_with_header(BlockHeader {
        parent_hash: *last_block.block_hash(),
        number,
        difficulty: U256::from(difficulty),
        timestamp: last_block.header().timestamp + 1,
        ..BlockHeader::default()
    })
}

/// Creates a dummy block with the specified block number and parent hash for
/// the provided blockchain.
pub fn create_dummy_block_with_hash<BlockchainT>(
    blockchain: &mut BlockchainT,
    number: u64,
    parent_hash: B256,
) -> Block
where
    BlockchainT: GetBlockchainBlock + ?Sized,
    BlockchainT::Error: Debug,
{
    let timestamp = blockchain
        .last_block()
        .expect("Failed to retrieve last block")
        .header()
        .timestamp
        + 1;

    create_dummy_block_with_header(BlockHeader {
        parent_hash,
        number,
        difficulty: U256::from(1),
        timestamp,
        ..BlockHeader::default()
    })
}

/// Creates an empty dummy block with the specified header.
pub fn create_dummy_block_with_header(header: BlockHeader) -> Block {
    Block::new(header, Vec::new())
}

/// Creates a dummy legacy transaction for the provided sender and nonce.
pub fn dummy_transaction(caller: Address, nonce: u64) -> Transaction {
    Transaction::from(signed::Legacy {
        nonce,
        gas_price: 1_000_000_000,
        gas_limit: 21_000,
        kind: TxKind::Call(Address::ZERO),
        value: U256::from(1),
        input: Bytes::new(),
        chain_id: 1,
        caller,
        hash: OnceLock::new(),
    })
}

/// A dummy block along with the contained singular transaction and its receipt.
pub struct DummyBlockAndTransaction {
    /// The mined dummy block.
    pub block: Arc<Block>,
    /// The hash of the singular mined dummy transaction.
    pub transaction_hash: B256,
    /// The receipt of the singular mined dummy transaction.
    pub transaction_receipt: TransactionReceipt,
}

/// Inserts a block with a single transaction, emitting two logs, and the
/// transaction's receipt.
pub fn insert_dummy_block_with_transaction<BlockchainT>(
    blockchain: &mut BlockchainT,
) -> anyhow::Result<DummyBlockAndTransaction>
where
    BlockchainT: GetBlockchainBlock + InsertBlock + ?Sized,
    <BlockchainT as GetBlockchainBlock>::Error: 'static + Send + Sync + std::error::Error,
    <BlockchainT as InsertBlock>::Error: 'static + Send + Sync + std::error::Error,
{
    const GAS_USED: u64 = 21_000;

    let caller = Address::random();
    let transaction = dummy_transaction(caller, 0);
    let transaction_hash = *transaction.transaction_hash();

    let logs = vec![
        Log {
            address: Address::random(),
            topics: Vec::new(),
            data: Bytes::new(),
        },
        Log {
            address: Address::random(),
            topics: vec![B256::random()],
            data: Bytes::from_static(&[0x01, 0x02]),
        },
    ];
    let logs_bloom = logs_to_bloom(&logs);

    let last_block = blockchain.last_block()?;
    let header = BlockHeader {
        parent_hash: *last_block.block_hash(),
        number: last_block.header().number + 1,
        difficulty: U256::from(1),
        timestamp: last_block.header().timestamp + 1,
        gas_used: GAS_USED,
        logs_bloom,
        ..BlockHeader::default()
    };

    let block = blockchain.insert_block(Block::new(header, vec![transaction]))?;
    assert_eq!(block.block.transactions().len(), 1);

    let block_hash = *block.block.block_hash();
    let block_number = block.block.header().number;

    let transaction_receipt = TransactionReceipt {
        transaction_hash,
        transaction_index: 0,
        block_hash,
        block_number,
        from: caller,
        to: Some(Address::ZERO),
        contract_address: None,
        gas_used: GAS_USED,
        cumulative_gas_used: GAS_USED,
        effective_gas_price: Some(1_000_000_000),
        status: Some(1),
        logs_bloom,
        logs: logs
            .into_iter()
            .enumerate()
            .map(|(log_index, inner)| FilterLog {
                inner,
                block_hash,
                block_number,
                log_index: log_index as u64,
                transaction_hash,
                transaction_index: 0,
                removed: false,
            })
            .collect(),
        transaction_type: signed::Legacy::TYPE,
    };

    blockchain.insert_receipts(vec![transaction_receipt.clone()])?;

    Ok(DummyBlockAndTransaction {
        block: block.block,
        transaction_hash,
        transaction_receipt,
    })
}
