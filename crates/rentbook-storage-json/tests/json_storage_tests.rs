use std::fs;

use chrono::NaiveDate;
use rentbook_core::{storage::BookStorage, CoreError, PaymentService, RoomService, TenantService};
use rentbook_domain::{Money, RentBook, Room, Tenant};
use rentbook_storage_json::{JsonBookStorage, StoragePaths};
use tempfile::tempdir;

fn storage_in(dir: &std::path::Path) -> JsonBookStorage {
    JsonBookStorage::new(StoragePaths::under(dir)).expect("create storage")
}

fn populated_book() -> RentBook {
    let mut book = RentBook::new("Sunrise Flats");
    let room = RoomService::add(&mut book, Room::new("1", "single", Money::from_major(15_000)))
        .expect("add room");
    let tenant = TenantService::add(
        &mut book,
        Tenant::new(
            "Eric Onyango",
            "0700",
            Some(room),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ),
    )
    .expect("add tenant");
    PaymentService::apply_payment(
        &mut book,
        tenant,
        Money::from_major(19_000),
        NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
        Some("M-Pesa".into()),
    )
    .expect("apply payment");
    book
}

#[test]
fn json_storage_can_save_and_load_book() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(dir.path());
    let book = populated_book();

    let revision = storage
        .save_book("Sunrise Flats", &book, None)
        .expect("save book");
    assert_eq!(revision, 1);

    let loaded = storage.load_book("sunrise flats").expect("load book");
    assert_eq!(loaded.name, "Sunrise Flats");
    assert_eq!(loaded.revision, 1);
    assert_eq!(loaded.payments.len(), 1);
    assert_eq!(loaded.tenants[0].credit_balance, Money::from_major(4_000));

    let path = storage.book_path("Sunrise Flats");
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("json"));
    assert_eq!(
        path.file_stem().and_then(|stem| stem.to_str()),
        Some("sunrise_flats")
    );
    assert_eq!(storage.list_books().unwrap(), vec!["sunrise_flats".to_string()]);
}

#[test]
fn stale_revision_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(dir.path());
    let book = RentBook::new("Shared");
    storage.save_book("shared", &book, None).expect("create");

    let mut first = storage.load_book("shared").unwrap();
    let second = storage.load_book("shared").unwrap();
    first.name = "Shared (edited)".into();
    let revision = storage
        .save_book("shared", &first, Some(first.revision))
        .expect("first writer wins");
    assert_eq!(revision, 2);

    let err = storage
        .save_book("shared", &second, Some(second.revision))
        .expect_err("second writer is stale");
    assert!(matches!(err, CoreError::Conflict(_)));
    assert_eq!(storage.load_book("shared").unwrap().name, "Shared (edited)");
}

#[test]
fn creating_an_existing_book_conflicts() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(dir.path());
    storage
        .save_book("dup", &RentBook::new("Dup"), None)
        .expect("create");
    let err = storage
        .save_book("dup", &RentBook::new("Dup"), None)
        .expect_err("already exists");
    assert!(matches!(err, CoreError::Conflict(_)));
}

#[test]
fn missing_book_is_not_found() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(dir.path());
    let err = storage.load_book("nowhere").expect_err("missing");
    assert!(err.is_not_found());
}

#[test]
fn json_storage_creates_and_restores_backups() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(dir.path());
    let book = populated_book();
    storage.save_book("backup-book", &book, None).expect("save");

    let info = storage
        .backup_book("backup-book", &book, Some("before move"))
        .expect("create backup");
    assert!(info.id.starts_with("backup_book_"));
    assert!(info.id.ends_with("_before-move.json"));
    assert_eq!(
        info.path.parent().map(|parent| parent.to_path_buf()),
        Some(dir.path().join("backups").join("backup_book"))
    );

    let backups = storage.list_backups("backup-book").expect("list backups");
    assert!(backups.iter().any(|entry| entry.id == info.id));

    let mut edited = storage.load_book("backup-book").unwrap();
    edited.payments.clear();
    storage
        .save_book("backup-book", &edited, Some(edited.revision))
        .expect("save edit");

    let restored = storage.restore_backup(&info).expect("restore backup");
    assert_eq!(restored.payments.len(), 1);
    assert_eq!(restored.revision, 3);
    assert_eq!(storage.load_book("backup-book").unwrap().revision, 3);
}

#[test]
fn backups_are_pruned_to_retention() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBookStorage::with_retention(StoragePaths::under(dir.path()), 2)
        .expect("create storage");
    let book = RentBook::new("Pruned");
    for note in ["one", "two", "three"] {
        storage
            .backup_book("pruned", &book, Some(note))
            .expect("backup");
    }
    assert_eq!(storage.list_backups("pruned").unwrap().len(), 2);
}

#[test]
fn loads_books_written_without_optional_fields() {
    let dir = tempdir().expect("tempdir");
    let storage = storage_in(dir.path());
    let legacy = r#"{
        "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
        "name": "Legacy",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
        "tenants": [{
            "id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
            "name": "Old Tenant",
            "phone": "0700",
            "move_in_date": "2023-05-01"
        }]
    }"#;
    fs::write(storage.book_path("legacy"), legacy).expect("write legacy file");

    let loaded = storage.load_book("legacy").expect("load legacy book");
    assert_eq!(loaded.revision, 0);
    assert_eq!(loaded.tenants[0].credit_balance, Money::ZERO);
    assert_eq!(loaded.tenants[0].credit_month, None);

    let revision = storage
        .save_book("legacy", &loaded, Some(0))
        .expect("save legacy");
    assert_eq!(revision, 1);
}
