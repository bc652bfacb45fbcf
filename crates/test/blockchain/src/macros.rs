/// Macro to implement common blockchain tests for different blockchain
/// implementations.
///
/// The calling module must import the blockchain traits, [`B256`],
/// [`BlockValidityError`], [`HashSet`], `serial_test::serial` and the named
/// error type.
///
/// [`B256`]: devchain_primitives::B256
/// [`BlockValidityError`]: devchain_block_api::BlockValidityError
/// [`HashSet`]: devchain_primitives::HashSet
#[macro_export]
macro_rules! impl_test_blockchain_tests {
    ($name:ident: $error_ty:ident => $blockchain_constructor:expr) => {
        $crate::paste::item! {
            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_get_last_block_from_ $name _blockchain>]() -> anyhow::Result<()> {
                let mut blockchain = $blockchain_constructor;

                let last_block_number = blockchain.last_block_number();

                let last_block = blockchain.last_block()?;
                assert_eq!(last_block.header().number, last_block_number);

                let next_block = $crate::create_dummy_block(&mut blockchain);
                let expected = blockchain.insert_block(next_block)?;

                let last_block = blockchain.last_block()?;
                assert_eq!(last_block.block_hash(), expected.block.block_hash());

                Ok(())
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_block_by_hash_some_from_ $name _blockchain>]() {
                let mut blockchain = $blockchain_constructor;

                let next_block = $crate::create_dummy_block(&mut blockchain);
                let expected = blockchain
                    .insert_block(next_block)
                    .expect("Failed to insert block");

                let found_block = blockchain
                    .block_by_hash(expected.block.block_hash())
                    .unwrap()
                    .unwrap();

                assert_eq!(found_block.block_hash(), expected.block.block_hash());
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_block_by_hash_none_from_ $name _blockchain>]() {
                let mut blockchain = $blockchain_constructor;

                let found_block = blockchain.block_by_hash(&B256::ZERO).unwrap();
                assert!(found_block.is_none());
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_block_by_number_some_from_ $name _blockchain>]() {
                let mut blockchain = $blockchain_constructor;

                let next_block = $crate::create_dummy_block(&mut blockchain);
                let expected = blockchain
                    .insert_block(next_block)
                    .expect("Failed to insert block");

                let found_block = blockchain
                    .block_by_number(expected.block.header().number)
                    .unwrap()
                    .unwrap();

                assert!(std::sync::Arc::ptr_eq(&found_block, &expected.block));
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_block_by_number_none_from_ $name _blockchain>]() {
                let mut blockchain = $blockchain_constructor;

                let next_block_number = blockchain.last_block_number() + 1;
                let found_block = blockchain.block_by_number(next_block_number).unwrap();
                assert!(found_block.is_none());
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_insert_block_multiple_from_ $name _blockchain>]() -> anyhow::Result<()> {
                let mut blockchain = $blockchain_constructor;

                let initial_block_number = blockchain.last_block_number();

                let one = $crate::create_dummy_block(&mut blockchain);
                let one = blockchain.insert_block(one)?;

                let two = $crate::create_dummy_block(&mut blockchain);
                let two = blockchain.insert_block(two)?;

                assert_eq!(blockchain.last_block_number(), initial_block_number + 2);

                let found_block = blockchain
                    .block_by_number(one.block.header().number)?
                    .unwrap();
                assert_eq!(found_block.block_hash(), one.block.block_hash());

                let found_block = blockchain
                    .block_by_number(two.block.header().number)?
                    .unwrap();
                assert_eq!(found_block.block_hash(), two.block.block_hash());

                Ok(())
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_insert_block_invalid_block_number_from_ $name _blockchain>]() {
                let mut blockchain = $blockchain_constructor;

                let next_block_number = blockchain.last_block_number() + 1;
                let invalid_block_number = next_block_number + 1;

                let invalid_block =
                    $crate::create_dummy_block_with_number(&mut blockchain, invalid_block_number);
                let error = blockchain
                    .insert_block(invalid_block)
                    .expect_err("Should fail to insert block");

                if let $error_ty::InvalidNextBlock(BlockValidityError::InvalidBlockNumber { actual, expected }) = error {
                    assert_eq!(actual, invalid_block_number);
                    assert_eq!(expected, next_block_number);
                } else {
                    panic!("Unexpected error: {error:?}");
                }
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_insert_block_invalid_parent_hash_from_ $name _blockchain>]() {
                const INVALID_BLOCK_HASH: B256 = B256::ZERO;

                let mut blockchain = $blockchain_constructor;

                // Forked blockchains don't check the parent hash of the first block after
                // the fork.
                let one = $crate::create_dummy_block(&mut blockchain);
                blockchain.insert_block(one).expect("Failed to insert block");

                let next_block_number = blockchain.last_block_number() + 1;
                let two = $crate::create_dummy_block_with_hash(
                    &mut blockchain,
                    next_block_number,
                    INVALID_BLOCK_HASH,
                );
                let error = blockchain
                    .insert_block(two)
                    .expect_err("Should fail to insert block");

                if let $error_ty::InvalidNextBlock(BlockValidityError::InvalidParentHash { actual, expected }) = error {
                    let last_block = blockchain.last_block().unwrap();

                    assert_eq!(actual, INVALID_BLOCK_HASH);
                    assert_eq!(expected, *last_block.block_hash());
                } else {
                    panic!("Unexpected error: {error:?}");
                }
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_logs_local_for_ $name _blockchain>]() -> anyhow::Result<()> {
                fn assert_eq_logs(actual: &[devchain_receipt::log::FilterLog], expected: &[devchain_receipt::log::FilterLog]) {
                    assert_eq!(expected.len(), actual.len());

                    for (log, filter_log) in expected.iter().zip(actual.iter()) {
                        assert_eq!(log.address, filter_log.address);
                        assert_eq!(log.topics(), filter_log.topics());
                        assert_eq!(log.data, filter_log.data);
                        assert_eq!(log.block_number, filter_log.block_number);
                    }
                }

                let mut blockchain = $blockchain_constructor;

                let last_block_number = blockchain.last_block_number();

                let $crate::DummyBlockAndTransaction {
                    block: one,
                    transaction_receipt,
                    ..
                } = $crate::insert_dummy_block_with_transaction(&mut blockchain)?;

                let filtered_logs = blockchain.logs(
                    one.header().number,
                    one.header().number,
                    &HashSet::default(),
                    &[],
                )?;

                assert_eq_logs(&filtered_logs, transaction_receipt.transaction_logs());

                let logs = transaction_receipt.transaction_logs().to_vec();
                let $crate::DummyBlockAndTransaction {
                    block: two,
                    transaction_receipt,
                    ..
                } = $crate::insert_dummy_block_with_transaction(&mut blockchain)?;

                let logs: Vec<devchain_receipt::log::FilterLog> = logs
                    .into_iter()
                    .chain(transaction_receipt.transaction_logs().iter().cloned())
                    .collect();

                let filtered_logs = blockchain.logs(
                    one.header().number,
                    two.header().number,
                    &HashSet::default(),
                    &[],
                )?;

                assert_eq_logs(&filtered_logs, &logs);

                // Filtering by address only returns the log of that address
                let address = transaction_receipt.transaction_logs()[1].address;
                let filtered_logs = blockchain.logs(
                    one.header().number,
                    two.header().number,
                    &std::iter::once(address).collect::<HashSet<_>>(),
                    &[],
                )?;

                assert_eq_logs(&filtered_logs, &transaction_receipt.transaction_logs()[1..]);

                // Removed blocks should not have logs
                blockchain.revert_to_block(last_block_number)?;

                let filtered_logs = blockchain.logs(
                    one.header().number,
                    two.header().number,
                    &HashSet::default(),
                    &[],
                )?;

                assert!(filtered_logs.is_empty());

                Ok(())
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_revert_to_block_local_for_ $name _blockchain>]() -> anyhow::Result<()> {
                let mut blockchain = $blockchain_constructor;

                let last_block = blockchain.last_block()?;

                let one = $crate::create_dummy_block(&mut blockchain);
                let one = blockchain.insert_block(one)?;

                let two = $crate::create_dummy_block(&mut blockchain);
                let two = blockchain.insert_block(two)?;

                blockchain.revert_to_block(last_block.header().number)?;

                // Last block still exists
                let reverted_block = blockchain.last_block()?;
                assert_eq!(reverted_block.block_hash(), last_block.block_hash());
                assert_eq!(last_block.header().number, blockchain.last_block_number());

                let found_block = blockchain
                    .block_by_hash(last_block.block_hash())?
                    .unwrap();
                assert_eq!(found_block.block_hash(), last_block.block_hash());

                // Blocks 1 and 2 are gone
                assert!(blockchain.block_by_number(one.block.header().number)?.is_none());
                assert!(blockchain.block_by_number(two.block.header().number)?.is_none());
                assert!(blockchain.block_by_hash(one.block.block_hash())?.is_none());
                assert!(blockchain.block_by_hash(two.block.block_hash())?.is_none());

                // Can insert a new block after reverting
                let new = $crate::create_dummy_block(&mut blockchain);
                let new = blockchain.insert_block(new)?;

                let last_block = blockchain.last_block()?;
                assert_eq!(last_block.block_hash(), new.block.block_hash());

                Ok(())
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_revert_to_block_invalid_number_for_ $name _blockchain>]() {
                let mut blockchain = $blockchain_constructor;

                let next_block_number = blockchain.last_block_number() + 1;
                let error = blockchain
                    .revert_to_block(next_block_number)
                    .expect_err("Should fail to revert to block");

                assert!(matches!(error, $error_ty::UnknownBlockNumber));
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_delete_block_for_ $name _blockchain>]() -> anyhow::Result<()> {
                let mut blockchain = $blockchain_constructor;

                let initial_block_number = blockchain.last_block_number();

                let one = $crate::create_dummy_block(&mut blockchain);
                let one = blockchain.insert_block(one)?;

                let two = $crate::create_dummy_block(&mut blockchain);
                let two = blockchain.insert_block(two)?;

                blockchain.delete_block(one.block.block_hash())?;

                assert_eq!(blockchain.last_block_number(), initial_block_number);
                assert!(blockchain.block_by_hash(one.block.block_hash())?.is_none());
                assert!(blockchain.block_by_hash(two.block.block_hash())?.is_none());

                Ok(())
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_delete_later_blocks_for_ $name _blockchain>]() -> anyhow::Result<()> {
                let mut blockchain = $blockchain_constructor;

                let one = $crate::create_dummy_block(&mut blockchain);
                let one = blockchain.insert_block(one)?;

                let two = $crate::create_dummy_block(&mut blockchain);
                let two = blockchain.insert_block(two)?;

                let unknown = $crate::create_dummy_block_with_difficulty(
                    &mut blockchain,
                    one.block.header().number,
                    1000,
                );
                let error = blockchain
                    .delete_later_blocks(&unknown)
                    .expect_err("Should fail to delete blocks");
                assert!(matches!(error, $error_ty::InvalidBlock { .. }));

                blockchain.delete_later_blocks(&one.block)?;

                assert_eq!(blockchain.last_block_number(), one.block.header().number);
                assert!(blockchain.block_by_hash(one.block.block_hash())?.is_some());
                assert!(blockchain.block_by_hash(two.block.block_hash())?.is_none());

                Ok(())
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_reserve_blocks_for_ $name _blockchain>]() -> anyhow::Result<()> {
                let mut blockchain = $blockchain_constructor;

                let last_block = blockchain.last_block()?;
                let last_header = last_block.header();
                let last_total_difficulty = blockchain
                    .total_difficulty_by_hash(last_block.block_hash())?
                    .expect("total difficulty must exist");

                blockchain.reserve_blocks(10, 5)?;
                assert_eq!(blockchain.last_block_number(), last_header.number + 10);

                let reserved = blockchain
                    .block_by_number(last_header.number + 6)?
                    .expect("Reserved block must be materialized");
                assert_eq!(reserved.header().timestamp, last_header.timestamp + 30);
                assert_eq!(reserved.header().state_root, last_header.state_root);
                assert_eq!(
                    blockchain.total_difficulty_by_hash(reserved.block_hash())?,
                    Some(last_total_difficulty)
                );

                let last_reserved = blockchain.last_block()?;
                assert_eq!(last_reserved.header().number, last_header.number + 10);
                assert_eq!(last_reserved.header().timestamp, last_header.timestamp + 50);

                // Can insert a new block after the reservation
                let next = $crate::create_dummy_block(&mut blockchain);
                let next = blockchain.insert_block(next)?;
                assert_eq!(next.block.header().number, last_header.number + 11);

                // Reverting into the reservation truncates it
                blockchain.revert_to_block(last_header.number + 3)?;
                assert_eq!(blockchain.last_block_number(), last_header.number + 3);
                assert!(blockchain.block_by_number(last_header.number + 6)?.is_none());

                let reserved = blockchain
                    .block_by_number(last_header.number + 2)?
                    .expect("Reserved block must be materialized");
                assert_eq!(reserved.header().timestamp, last_header.timestamp + 10);

                Ok(())
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_block_total_difficulty_by_hash_for_ $name _blockchain>]() {
                let mut blockchain = $blockchain_constructor;

                let last_block = blockchain.last_block().unwrap();
                let last_block_number = last_block.header().number;

                let one = $crate::create_dummy_block_with_difficulty(
                    &mut blockchain,
                    last_block_number + 1,
                    1000,
                );
                let one = blockchain.insert_block(one).unwrap();

                let two = $crate::create_dummy_block_with_difficulty(
                    &mut blockchain,
                    last_block_number + 2,
                    2000,
                );
                let two = blockchain.insert_block(two).unwrap();

                let last_block_difficulty = blockchain
                    .total_difficulty_by_hash(last_block.block_hash())
                    .unwrap()
                    .expect("total difficulty must exist");

                assert_eq!(
                    blockchain
                        .total_difficulty_by_hash(one.block.block_hash())
                        .unwrap(),
                    Some(last_block_difficulty + one.block.header().difficulty)
                );

                assert_eq!(
                    blockchain
                        .total_difficulty_by_hash(two.block.block_hash())
                        .unwrap(),
                    Some(
                        last_block_difficulty
                            + one.block.header().difficulty
                            + two.block.header().difficulty
                    )
                );

                blockchain
                    .revert_to_block(one.block.header().number)
                    .unwrap();

                // Block 1 has a total difficulty
                assert_eq!(
                    blockchain
                        .total_difficulty_by_hash(one.block.block_hash())
                        .unwrap(),
                    Some(last_block_difficulty + one.block.header().difficulty)
                );

                // Block 2 no longer stores a total difficulty
                assert!(blockchain
                    .total_difficulty_by_hash(two.block.block_hash())
                    .unwrap()
                    .is_none());
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_block_total_difficulty_by_hash_invalid_hash_for_ $name _blockchain>]() {
                let mut blockchain = $blockchain_constructor;

                let difficulty = blockchain.total_difficulty_by_hash(&B256::ZERO).unwrap();

                assert!(difficulty.is_none());
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_block_by_transaction_hash_local_from_ $name _blockchain>]() -> anyhow::Result<()> {
                let mut blockchain = $blockchain_constructor;

                let previous_block_number = blockchain.last_block_number();

                let $crate::DummyBlockAndTransaction {
                    block: mined_block,
                    transaction_hash,
                    ..
                } = $crate::insert_dummy_block_with_transaction(&mut blockchain)?;

                let block = blockchain
                    .block_by_transaction_hash(&transaction_hash)?
                    .expect("Block must exist");
                assert!(std::sync::Arc::ptr_eq(&block, &mined_block));

                let transactions = block.transactions();
                assert_eq!(transactions.len(), 1);
                assert_eq!(*transactions[0].transaction_hash(), transaction_hash);

                let transaction = blockchain
                    .transaction_by_hash(&transaction_hash)?
                    .expect("Transaction must exist");
                assert_eq!(*transaction.transaction_hash(), transaction_hash);

                blockchain.revert_to_block(previous_block_number)?;

                // Once reverted, the block is no longer available
                assert!(blockchain.block_by_transaction_hash(&transaction_hash)?.is_none());
                assert!(blockchain.transaction_by_hash(&transaction_hash)?.is_none());

                Ok(())
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_block_by_transaction_hash_unknown_from_ $name _blockchain>]() -> anyhow::Result<()> {
                let mut blockchain = $blockchain_constructor;

                let transaction = $crate::dummy_transaction(devchain_primitives::Address::random(), 0);

                let block = blockchain.block_by_transaction_hash(transaction.transaction_hash())?;
                assert!(block.is_none());

                Ok(())
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_receipt_by_transaction_hash_local_from_ $name _blockchain>]() -> anyhow::Result<()> {
                let mut blockchain = $blockchain_constructor;

                let previous_block_number = blockchain.last_block_number();

                let $crate::DummyBlockAndTransaction {
                    transaction_hash,
                    transaction_receipt,
                    ..
                } = $crate::insert_dummy_block_with_transaction(&mut blockchain)?;

                let receipt = blockchain
                    .receipt_by_transaction_hash(&transaction_hash)?
                    .expect("Receipt must exist");
                assert_eq!(*receipt, transaction_receipt);

                blockchain.revert_to_block(previous_block_number)?;

                // Once reverted, the receipt is no longer available
                let receipt = blockchain.receipt_by_transaction_hash(&transaction_hash)?;
                assert!(receipt.is_none());

                Ok(())
            }

            #[tokio::test(flavor = "multi_thread")]
            #[serial]
            async fn [<test_receipt_by_transaction_hash_unknown_from_ $name _blockchain>]() -> anyhow::Result<()> {
                let mut blockchain = $blockchain_constructor;

                let transaction = $crate::dummy_transaction(devchain_primitives::Address::random(), 0);

                let receipt =
                    blockchain.receipt_by_transaction_hash(transaction.transaction_hash())?;
                assert!(receipt.is_none());

                Ok(())
            }
        }
    };
}
