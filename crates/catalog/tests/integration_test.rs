//! Integration tests for the catalogue store.
//!
//! These exercise the store through its public API against real temp files,
//! covering uniqueness, resolution, bulk import strategies and the
//! read-permissive / write-strict storage contract.

use catalog::{
    CatalogError, CatalogStore, ErrorKind, ExportFormat, ImportStrategy, ListQuery, RecordDraft,
    RecordPatch,
};
use std::fs;
use tempfile::TempDir;

fn create_test_store() -> (TempDir, CatalogStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = CatalogStore::new(dir.path().join("db.json"));

    store
        .add(RecordDraft::new("Citrus Aurora", "Sole", 48.0).notes("bergamot, lemon, neroli"))
        .unwrap();
    store
        .add(RecordDraft::new("Rose Dusk", "Floral", 55.0).notes("rose, musk"))
        .unwrap();
    store
        .add(RecordDraft::new("Vetiver Line", "Terra", 67.0).notes("vetiver, grapefruit, pepper"))
        .unwrap();

    (dir, store)
}

#[test]
fn test_names_stay_unique_across_many_adds() {
    let (_dir, store) = create_test_store();
    let attempts = ["Amber Night", "AMBER NIGHT", "rose dusk", " Vetiver line ", "Cedar Lake"];

    for name in attempts {
        let _ = store.add(RecordDraft::new(name, "Any", 10.0));
    }

    let records = store.list(&ListQuery::new());
    let mut keys: Vec<String> = records.iter().map(|r| r.name.to_lowercase()).collect();
    let total = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), total);
    assert_eq!(total, 5);
}

#[test]
fn test_round_trip_returns_normalized_record() {
    let (_dir, store) = create_test_store();
    let draft = RecordDraft::new("  Oud Smoke  ", " Noir ", 120.456)
        .notes("Oud; smoke, OUD")
        .allergens(" eugenol ")
        .rating(4.5)
        .stock(7);

    let added = store.add(draft).unwrap();
    let fetched = store.get(&added.id).unwrap();

    assert_eq!(fetched, added);
    assert_eq!(fetched.name, "Oud Smoke");
    assert_eq!(fetched.brand, "Noir");
    assert_eq!(fetched.price, 120.46);
    assert_eq!(fetched.notes, vec!["oud", "smoke"]);
    assert_eq!(fetched.allergens, vec!["eugenol"]);
    assert_eq!(fetched.rating, Some(4.5));
    assert_eq!(fetched.stock, 7);
}

#[test]
fn test_case_different_duplicate_fails() {
    let (_dir, store) = create_test_store();
    let err = store
        .add(RecordDraft::new("rose dusk", "Elsewhere", 20.0))
        .unwrap_err();

    assert!(matches!(err, CatalogError::Duplicate { .. }));
    assert_eq!(err.kind(), ErrorKind::Uniqueness);
}

#[test]
fn test_update_unknown_leaves_collection_unchanged() {
    let (_dir, store) = create_test_store();
    let before = store.list(&ListQuery::new());

    let patch = RecordPatch {
        name: Some("Renamed".to_string()),
        ..RecordPatch::default()
    };
    assert!(!store.update("00000000-0000-0000-0000-000000000000", &patch).unwrap());
    assert_eq!(store.list(&ListQuery::new()), before);
}

#[test]
fn test_update_by_name_revalidates() {
    let (_dir, store) = create_test_store();
    let patch = RecordPatch {
        price: Some(2_000_000.0),
        ..RecordPatch::default()
    };
    let err = store.update("Rose Dusk", &patch).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.get("Rose Dusk").unwrap().price, 55.0);

    let patch = RecordPatch {
        notes: Some(vec!["Rose".to_string(), "oud, rose".to_string()]),
        stock: Some(4),
        ..RecordPatch::default()
    };
    assert!(store.update("rose dusk", &patch).unwrap());
    let rose = store.get("Rose Dusk").unwrap();
    assert_eq!(rose.notes, vec!["rose", "oud"]);
    assert_eq!(rose.stock, 4);
}

#[test]
fn test_delete_twice() {
    let (_dir, store) = create_test_store();
    let rose = store.get("Rose Dusk").unwrap();

    assert!(store.delete(&rose.id).unwrap());
    assert!(!store.delete(&rose.id).unwrap());
    assert_eq!(store.list(&ListQuery::new()).len(), 2);
}

#[test]
fn test_merge_import_skips_existing_pair() {
    let (_dir, store) = create_test_store();
    let csv = "name,brand,price,notes\n\
               ROSE DUSK,floral,99,rose\n\
               Amber Night,Noctis,60,amber;vanilla\n";

    let summary = store.import_csv(csv, ImportStrategy::Merge).unwrap();
    assert_eq!(summary.ingested, 1);
    assert_eq!(summary.skipped, 1);

    // The existing record was not touched
    assert_eq!(store.get("Rose Dusk").unwrap().price, 55.0);
    assert_eq!(store.get("amber night").unwrap().notes, vec!["amber", "vanilla"]);
    assert_eq!(store.list(&ListQuery::new()).len(), 4);
}

#[test]
fn test_merge_import_only_duplicate_ingests_nothing() {
    let (_dir, store) = create_test_store();
    let csv = "id,name,brand,price\nx,Rose Dusk,Floral,55\n";

    let summary = store.import_csv(csv, ImportStrategy::Merge).unwrap();
    assert_eq!(summary.ingested, 0);
    assert_eq!(store.list(&ListQuery::new()).len(), 3);
}

#[test]
fn test_merge_import_name_clash_with_other_brand_is_atomic() {
    let (_dir, store) = create_test_store();
    let csv = "name,brand,price\nNew One,Brand,10\nrose dusk,NotFloral,10\n";

    let err = store.import_csv(csv, ImportStrategy::Merge).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidRow { line: 3, .. }));
    assert_eq!(err.kind(), ErrorKind::Uniqueness);
    assert!(store.get("New One").is_none());
}

#[test]
fn test_overwrite_import_replaces_and_dedups_by_id() {
    let (_dir, store) = create_test_store();
    let csv = "id,name,brand,price,notes,allergens,rating,stock\n\
               a1,First,One,10,rose,,,\n\
               a2,Second,Two,20,musk,,4,1\n\
               a1,First Again,One,11,oud,,,\n\
               ,Third,Three,30,,,,\n";

    let summary = store.import_csv(csv, ImportStrategy::Overwrite).unwrap();
    assert_eq!(summary.ingested, 3);
    assert_eq!(summary.skipped, 1);

    let records = store.list(&ListQuery::new());
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["First Again", "Second", "Third"]);
    assert_eq!(records[0].id, "a1");
    assert!(!records[2].id.is_empty());
    assert!(store.get("Rose Dusk").is_none());
}

#[test]
fn test_invalid_import_row_writes_nothing() {
    let (_dir, store) = create_test_store();
    let before = fs::read_to_string(store.path()).unwrap();
    let csv = "name,brand,price\nGood,B,10\n,B,10\n";

    let err = store.import_csv(csv, ImportStrategy::Overwrite).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidRow { line: 3, .. }));
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[test]
fn test_import_missing_file_is_storage_error() {
    let (dir, store) = create_test_store();
    let err = store
        .import_csv_file(&dir.path().join("missing.csv"), ImportStrategy::Merge)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageIo);
}

#[test]
fn test_export_then_import_into_fresh_store() {
    let (dir, store) = create_test_store();
    let csv_path = dir.path().join("out/catalog.csv");
    assert_eq!(store.export_to_file(&csv_path, ExportFormat::Csv).unwrap(), 3);

    let fresh = CatalogStore::new(dir.path().join("fresh.json"));
    let summary = fresh.import_csv_file(&csv_path, ImportStrategy::Overwrite).unwrap();
    assert_eq!(summary.ingested, 3);
    assert_eq!(fresh.list(&ListQuery::new()), store.list(&ListQuery::new()));
}

#[test]
fn test_corrupt_file_reads_empty_but_write_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    fs::write(&path, "[{\"broken\": ").unwrap();

    let store = CatalogStore::new(&path);
    assert!(store.list(&ListQuery::new()).is_empty());
    assert!(store.get("anything").is_none());

    store.add(RecordDraft::new("Fresh", "Start", 1.0)).unwrap();
    assert_eq!(store.list(&ListQuery::new()).len(), 1);
}

#[test]
fn test_write_failure_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blocked");
    fs::create_dir(&path).unwrap();
    fs::write(path.join("inner"), "x").unwrap();

    let store = CatalogStore::new(&path);
    let err = store.add(RecordDraft::new("A", "B", 1.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageIo);
}
