use plasma_db_types::{traits::PlasmaDatabase, DbError};
use plasma_primitives::{
    buf::{Address, Buf32, Signature},
    constants::MAX_CONFIRM_SIGS,
    position::Position,
};
use plasma_state::{
    block::PlasmaBlock,
    tx::{Input, Output, Transaction},
    tx_record::TxRecord,
};

fn block(seed: u8, height: u64) -> PlasmaBlock {
    PlasmaBlock::new(Buf32([seed; 32]), 2, 10, 1_600_000_000 + height, height)
}

pub fn test_blocks_in_order(db: &impl PlasmaDatabase) {
    assert_eq!(db.get_latest_block_num().unwrap(), None);
    assert_eq!(db.next_block_num().unwrap(), 1);

    // must start at 1
    assert_eq!(
        db.put_block(2, block(2, 2)),
        Err(DbError::OooInsert("PlasmaBlockSchema", 2))
    );

    db.put_block(1, block(1, 4)).unwrap();
    db.put_block(2, block(2, 7)).unwrap();
    assert_eq!(db.get_latest_block_num().unwrap(), Some(2));
    assert_eq!(db.next_block_num().unwrap(), 3);

    // no gaps and no rewrites
    assert!(matches!(db.put_block(4, block(4, 9)), Err(DbError::OooInsert(..))));
    assert!(matches!(db.put_block(2, block(9, 9)), Err(DbError::OooInsert(..))));

    assert_eq!(db.get_block(1).unwrap(), Some(block(1, 4)));
    assert_eq!(db.get_block(2).unwrap(), Some(block(2, 7)));
    assert_eq!(db.get_block(3).unwrap(), None);
}

pub fn test_blocks_from(db: &impl PlasmaDatabase) {
    for num in 1..=12u64 {
        db.put_block(num, block(num as u8, num)).unwrap();
    }

    let nums: Vec<u64> = db
        .get_blocks_from(3, 4)
        .unwrap()
        .into_iter()
        .map(|(n, _)| n)
        .collect();
    assert_eq!(nums, vec![3, 4, 5, 6]);

    let tail = db.get_blocks_from(11, 10).unwrap();
    assert_eq!(tail.len(), 2);
    assert_eq!(tail[1].1, block(12, 12));

    assert!(db.get_blocks_from(13, 10).unwrap().is_empty());
}

pub fn test_confirm_sigs(db: &impl PlasmaDatabase) {
    let pos = Position::tx_output(3, 0, 0);
    assert!(db.get_confirm_sigs(&pos).unwrap().is_empty());

    let a = Signature([1; 65]);
    let b = Signature([2; 65]);
    let c = Signature([3; 65]);

    db.append_confirm_sigs(&pos, &[a]).unwrap();
    // duplicates are skipped
    db.append_confirm_sigs(&pos, &[a, b]).unwrap();
    assert_eq!(db.get_confirm_sigs(&pos).unwrap(), vec![a, b]);

    let res = db.append_confirm_sigs(&pos, &[c]);
    assert_eq!(
        res,
        Err(DbError::ConfirmSigLimit {
            position: pos,
            limit: MAX_CONFIRM_SIGS
        })
    );
    assert_eq!(db.get_confirm_sigs(&pos).unwrap(), vec![a, b]);

    // re-appending stored sigs at the cap is fine
    db.append_confirm_sigs(&pos, &[b]).unwrap();

    // positions are independent
    let other = Position::tx_output(3, 0, 1);
    db.append_confirm_sigs(&other, &[c]).unwrap();
    assert_eq!(db.get_confirm_sigs(&other).unwrap(), vec![c]);
}

pub fn test_deposit_markers(db: &impl PlasmaDatabase) {
    assert!(!db.is_deposit_included(5).unwrap());
    db.mark_deposit_included(5).unwrap();
    assert!(db.is_deposit_included(5).unwrap());
    assert!(!db.is_deposit_included(6).unwrap());

    // marking twice is harmless
    db.mark_deposit_included(5).unwrap();
    assert!(db.is_deposit_included(5).unwrap());
}

pub fn test_tx_records(db: &impl PlasmaDatabase) {
    let tx = Transaction::new(
        Input::unsigned(Position::deposit(1)),
        None,
        Output::new(Address([8; 20]), 90),
        None,
        10,
    );
    let record = TxRecord {
        merkle_hash: tx.merkle_hash(),
        confirmation_hash: Buf32([4; 32]),
        tx,
        block_num: 2,
        tx_index: 0,
    };

    assert_eq!(db.get_tx_record(&record.merkle_hash).unwrap(), None);
    db.put_tx_record(record.clone()).unwrap();
    assert_eq!(db.get_tx_record(&record.merkle_hash).unwrap(), Some(record));
}

#[macro_export]
macro_rules! plasma_db_tests {
    ($setup_expr:expr) => {
        #[test]
        fn test_blocks_in_order() {
            let db = $setup_expr;
            $crate::plasma_tests::test_blocks_in_order(&db);
        }

        #[test]
        fn test_blocks_from() {
            let db = $setup_expr;
            $crate::plasma_tests::test_blocks_from(&db);
        }

        #[test]
        fn test_confirm_sigs() {
            let db = $setup_expr;
            $crate::plasma_tests::test_confirm_sigs(&db);
        }

        #[test]
        fn test_deposit_markers() {
            let db = $setup_expr;
            $crate::plasma_tests::test_deposit_markers(&db);
        }

        #[test]
        fn test_tx_records() {
            let db = $setup_expr;
            $crate::plasma_tests::test_tx_records(&db);
        }
    };
}
