//! Store-level integration tests
//!
//! These tests exercise the typed record stores against real files on disk
//! and pin down the on-disk format:
//! - exact fixed-width line bytes and the sentinel line per store
//! - whole-file rewrite behavior (append, update, delete)
//! - tolerance for malformed lines and data after the sentinel
//! - the temp-file protocol leaving no droppings behind

use game_marketplace::{InventoryRecord, OwnershipRecord, RecordStore, UserRecord, UserType};
use rust_decimal::Decimal;
use std::fs;
use tempfile::TempDir;

fn alice() -> UserRecord {
    UserRecord::new("alice", UserType::Admin, Decimal::new(10000, 2))
}

#[test]
fn test_user_store_exact_bytes_on_disk() {
    let dir = TempDir::new().unwrap();
    let store: RecordStore<UserRecord> = RecordStore::open(dir.path().join("accounts.txt"));

    store.append(&alice()).unwrap();

    let raw = fs::read_to_string(store.path()).unwrap();
    assert_eq!(raw, "alice___________AA000100.00\nEND________________________\n");
}

#[test]
fn test_inventory_store_exact_bytes_on_disk() {
    let dir = TempDir::new().unwrap();
    let store: RecordStore<InventoryRecord> = RecordStore::open(dir.path().join("inventory.txt"));

    store
        .append(&InventoryRecord::new("Chess", "bob", Decimal::new(950, 2)))
        .unwrap();

    let raw = fs::read_to_string(store.path()).unwrap();
    assert_eq!(
        raw,
        "Chess_____________________bob_____________009.50\n\
         END_____________________________________________\n"
    );
}

#[test]
fn test_ownership_store_exact_bytes_on_disk() {
    let dir = TempDir::new().unwrap();
    let store: RecordStore<OwnershipRecord> = RecordStore::open(dir.path().join("ownership.txt"));

    store
        .append(&OwnershipRecord::new("Chess", "buyer"))
        .unwrap();

    let raw = fs::read_to_string(store.path()).unwrap();
    assert_eq!(
        raw,
        "Chess_____________________buyer___________\n\
         END_______________________________________\n"
    );
}

#[test]
fn test_round_trip_through_disk() {
    let dir = TempDir::new().unwrap();
    let store: RecordStore<UserRecord> = RecordStore::open(dir.path().join("accounts.txt"));

    let users = vec![
        alice(),
        UserRecord::new("bob", UserType::FullStandard, Decimal::ZERO),
        UserRecord::new("carol", UserType::SellStandard, Decimal::new(99999999, 2)),
    ];
    for user in &users {
        store.append(user).unwrap();
    }

    assert_eq!(store.load_all().unwrap(), users);
}

#[test]
fn test_update_rewrites_balance_in_place_on_disk() {
    let dir = TempDir::new().unwrap();
    let store: RecordStore<UserRecord> = RecordStore::open(dir.path().join("accounts.txt"));

    store
        .append(&UserRecord::new("bob", UserType::FullStandard, Decimal::ZERO))
        .unwrap();
    let replaced = store
        .update_by_key(
            &"bob".to_string(),
            UserRecord::new("bob", UserType::FullStandard, Decimal::new(51000, 2)),
        )
        .unwrap();

    assert_eq!(replaced, 1);
    let raw = fs::read_to_string(store.path()).unwrap();
    assert_eq!(raw, "bob_____________FS000510.00\nEND________________________\n");
}

#[test]
fn test_delete_missing_key_leaves_file_byte_identical() {
    let dir = TempDir::new().unwrap();
    let store: RecordStore<UserRecord> = RecordStore::open(dir.path().join("accounts.txt"));
    store.append(&alice()).unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    let removed = store.delete_by_key(&"ghost".to_string()).unwrap();

    assert_eq!(removed, 0);
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[test]
fn test_malformed_lines_are_skipped_not_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("accounts.txt");
    // A hand-edited file: a short line and a line with a bad type code
    // between two valid records.
    fs::write(
        &path,
        "alice___________AA000100.00\n\
         too-short\n\
         carol___________ZZ000074.50\n\
         bob_____________FS000510.00\n\
         END________________________\n",
    )
    .unwrap();

    let store: RecordStore<UserRecord> = RecordStore::open(&path);
    let loaded = store.load_all().unwrap();

    assert_eq!(
        loaded,
        vec![
            alice(),
            UserRecord::new("bob", UserType::FullStandard, Decimal::new(51000, 2)),
        ]
    );
}

#[test]
fn test_reading_stops_at_sentinel() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("accounts.txt");
    fs::write(
        &path,
        "alice___________AA000100.00\n\
         END________________________\n\
         carol___________BS000074.50\n",
    )
    .unwrap();

    let store: RecordStore<UserRecord> = RecordStore::open(&path);
    assert_eq!(store.load_all().unwrap(), vec![alice()]);
}

#[test]
fn test_mutations_leave_no_temp_file_behind() {
    let dir = TempDir::new().unwrap();
    let store: RecordStore<UserRecord> = RecordStore::open(dir.path().join("accounts.txt"));

    store.append(&alice()).unwrap();
    store.delete_by_key(&"alice".to_string()).unwrap();

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["accounts.txt".to_string()]);
}

#[test]
fn test_deleting_last_record_leaves_sentinel_only_file() {
    let dir = TempDir::new().unwrap();
    let store: RecordStore<UserRecord> = RecordStore::open(dir.path().join("accounts.txt"));

    store.append(&alice()).unwrap();
    let removed = store.delete_by_key(&"alice".to_string()).unwrap();

    assert_eq!(removed, 1);
    let raw = fs::read_to_string(store.path()).unwrap();
    assert_eq!(raw, "END________________________\n");
    assert!(store.load_all().unwrap().is_empty());
}
