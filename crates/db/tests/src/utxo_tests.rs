use plasma_db_types::{traits::UtxoDatabase, DbError};
use plasma_primitives::{
    buf::{Address, Buf32},
    position::Position,
};
use plasma_state::utxo::{Utxo, UtxoKey};

fn tx_output(owner: Address, amount: u64, position: Position) -> Utxo {
    Utxo::from_tx_output(
        owner,
        amount,
        position,
        vec![Address([0xaa; 20])],
        Buf32([1; 32]),
        Buf32([2; 32]),
    )
}

pub fn test_insert_and_get(db: &impl UtxoDatabase) {
    let owner = Address([1; 20]);
    let utxo = tx_output(owner, 100, Position::tx_output(1, 0, 0));
    db.insert_utxo(utxo.clone()).unwrap();

    let stored = db.get_utxo(&owner, &utxo.position).unwrap();
    assert_eq!(stored, Some(utxo.clone()));

    let by_pos = db.get_utxo_by_position(&utxo.position).unwrap();
    assert_eq!(by_pos, Some(utxo));

    // another owner has nothing at that position
    let other = Address([2; 20]);
    assert_eq!(db.get_utxo(&other, &Position::tx_output(1, 0, 0)).unwrap(), None);
    assert_eq!(db.get_utxo_by_position(&Position::deposit(9)).unwrap(), None);
}

pub fn test_insert_collision(db: &impl UtxoDatabase) {
    let owner = Address([1; 20]);
    let pos = Position::deposit(3);
    db.insert_utxo(Utxo::standalone(owner, 5, pos)).unwrap();

    let res = db.insert_utxo(Utxo::standalone(owner, 7, pos));
    assert_eq!(res, Err(DbError::UtxoExists(UtxoKey::new(&owner, &pos))));

    // same position under a different owner collides too
    let other = Address([9; 20]);
    let res = db.insert_utxo(Utxo::standalone(other, 7, pos));
    assert!(matches!(res, Err(DbError::UtxoExists(_))));

    // the original record is untouched
    let stored = db.get_utxo(&owner, &pos).unwrap().unwrap();
    assert_eq!(stored.amount, 5);
}

pub fn test_spend_once(db: &impl UtxoDatabase) {
    let owner = Address([4; 20]);
    let pos = Position::tx_output(2, 1, 1);
    db.insert_utxo(tx_output(owner, 50, pos)).unwrap();

    let spenders = vec![
        UtxoKey::new(&Address([5; 20]), &Position::tx_output(3, 0, 0)),
        UtxoKey::new(&owner, &Position::tx_output(3, 0, 1)),
    ];
    db.spend_utxo(&owner, &pos, spenders.clone()).unwrap();

    let stored = db.get_utxo(&owner, &pos).unwrap().unwrap();
    assert!(!stored.valid);
    assert_eq!(stored.spender_keys, spenders);

    let res = db.spend_utxo(&owner, &pos, vec![]);
    assert_eq!(res, Err(DbError::UtxoAlreadySpent(UtxoKey::new(&owner, &pos))));

    // failed spend leaves the spender keys in place
    let stored = db.get_utxo(&owner, &pos).unwrap().unwrap();
    assert_eq!(stored.spender_keys, spenders);
}

pub fn test_spend_missing(db: &impl UtxoDatabase) {
    let owner = Address([4; 20]);
    let pos = Position::deposit(77);
    let res = db.spend_utxo(&owner, &pos, vec![]);
    assert_eq!(res, Err(DbError::UtxoNotFound(UtxoKey::new(&owner, &pos))));
}

pub fn test_owner_scan(db: &impl UtxoDatabase) {
    let alice = Address([0x0a; 20]);
    let bob = Address([0x0b; 20]);

    db.insert_utxo(tx_output(alice, 3, Position::tx_output(5, 0, 1)))
        .unwrap();
    db.insert_utxo(Utxo::standalone(alice, 1, Position::deposit(2)))
        .unwrap();
    db.insert_utxo(tx_output(alice, 2, Position::tx_output(5, 0, 0)))
        .unwrap();
    db.insert_utxo(Utxo::standalone(bob, 9, Position::deposit(1)))
        .unwrap();

    db.spend_utxo(&alice, &Position::tx_output(5, 0, 0), vec![])
        .unwrap();

    let unspent = db.get_utxos_for_owner(&alice, false).unwrap();
    let positions: Vec<_> = unspent.iter().map(|u| u.position).collect();
    assert_eq!(
        positions,
        vec![Position::deposit(2), Position::tx_output(5, 0, 1)]
    );

    let all = db.get_utxos_for_owner(&alice, true).unwrap();
    let positions: Vec<_> = all.iter().map(|u| u.position).collect();
    assert_eq!(
        positions,
        vec![
            Position::deposit(2),
            Position::tx_output(5, 0, 0),
            Position::tx_output(5, 0, 1)
        ]
    );

    assert_eq!(db.get_utxos_for_owner(&bob, false).unwrap().len(), 1);
    assert!(db
        .get_utxos_for_owner(&Address([0x0c; 20]), true)
        .unwrap()
        .is_empty());
}

pub fn test_construct_key(db: &impl UtxoDatabase) {
    let owner = Address([6; 20]);
    let pos = Position::fee(4);
    assert_eq!(db.construct_key(&owner, &pos), UtxoKey::new(&owner, &pos));
}

#[macro_export]
macro_rules! utxo_db_tests {
    ($setup_expr:expr) => {
        #[test]
        fn test_insert_and_get() {
            let db = $setup_expr;
            $crate::utxo_tests::test_insert_and_get(&db);
        }

        #[test]
        fn test_insert_collision() {
            let db = $setup_expr;
            $crate::utxo_tests::test_insert_collision(&db);
        }

        #[test]
        fn test_spend_once() {
            let db = $setup_expr;
            $crate::utxo_tests::test_spend_once(&db);
        }

        #[test]
        fn test_spend_missing() {
            let db = $setup_expr;
            $crate::utxo_tests::test_spend_missing(&db);
        }

        #[test]
        fn test_owner_scan() {
            let db = $setup_expr;
            $crate::utxo_tests::test_owner_scan(&db);
        }

        #[test]
        fn test_construct_key() {
            let db = $setup_expr;
            $crate::utxo_tests::test_construct_key(&db);
        }
    };
}
