//! Integration tests for recommendations over a real catalogue store.
//!
//! Records are loaded from a temp-file store and handed to the recommender,
//! the same way the command surface wires the two crates together.

use catalog::{CatalogStore, ListQuery, ProfileStore, RecordDraft};
use recommend::filters::{BudgetFilter, MinimumRatingFilter};
use recommend::{DEFAULT_TOP_K, PreferenceProfile, Recommender};
use tempfile::TempDir;

fn create_test_setup() -> (TempDir, CatalogStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = CatalogStore::new(dir.path().join("db.json"));
    (dir, store)
}

#[test]
fn test_tied_scores_keep_store_order() {
    let (_dir, store) = create_test_setup();
    store.add(RecordDraft::new("A", "One", 50.0).notes("rose, musk")).unwrap();
    store.add(RecordDraft::new("B", "Two", 50.0).notes("citrus, musk")).unwrap();

    let records = store.list(&ListQuery::new());
    let prefs = PreferenceProfile::new().prefer(["musk"]);
    let recs = Recommender::new().recommend(records, &prefs, 2).unwrap();

    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].record.name, "A");
    assert_eq!(recs[1].record.name, "B");
    assert!(recs[0].total() > 0.0);
    assert_eq!(recs[0].total(), recs[1].total());
}

#[test]
fn test_allergen_in_avoid_set_ranks_lower() {
    let (_dir, store) = create_test_setup();
    store
        .add(RecordDraft::new("Flagged", "House", 40.0).notes("jasmine").allergens("coumarin"))
        .unwrap();
    store.add(RecordDraft::new("Clean", "House", 40.0).notes("jasmine")).unwrap();

    let prefs = PreferenceProfile::new().prefer(["jasmine"]).avoid(["coumarin"]);
    let recs = Recommender::new()
        .recommend(store.list(&ListQuery::new()), &prefs, DEFAULT_TOP_K)
        .unwrap();

    assert_eq!(recs[0].record.name, "Clean");
    assert_eq!(recs[1].record.name, "Flagged");
    assert!(recs[1].total() < recs[0].total());
}

#[test]
fn test_scoring_is_deterministic() {
    let (_dir, store) = create_test_setup();
    let notes = ["rose", "musk", "amber", "oud", "citrus", "vanilla"];
    for i in 0..40 {
        let price = 10.0 + i as f64;
        let draft = RecordDraft::new(format!("Scent {}", i), format!("Brand {}", i % 4), price)
            .notes(notes[i % notes.len()])
            .notes(notes[(i * 7) % notes.len()]);
        store.add(draft).unwrap();
    }

    let prefs = PreferenceProfile::new()
        .prefer(["rose", "amber"])
        .avoid(["oud"])
        .brand("brand 2")
        .budget(35.0);
    let records = store.list(&ListQuery::new());
    let recommender = Recommender::new();

    let first = recommender.recommend(records.clone(), &prefs, 10).unwrap();
    for _ in 0..5 {
        let again = recommender.recommend(records.clone(), &prefs, 10).unwrap();
        assert_eq!(again, first);
    }
    for pair in first.windows(2) {
        assert!(pair[0].total() >= pair[1].total());
    }
}

#[test]
fn test_stored_profile_drives_recommendation() {
    let dir = tempfile::tempdir().unwrap();
    let store = CatalogStore::new(dir.path().join("db.json"));
    let profiles = ProfileStore::new(dir.path().join("profiles.json"));

    store.add(RecordDraft::new("Amber Sky", "Noctis", 72.0).notes("amber, vanilla")).unwrap();
    store.add(RecordDraft::new("Cedar Lake", "Nord", 64.0).notes("cedar, wood")).unwrap();
    let velvet = RecordDraft::new("Velvet Night", "Noctis", 80.0)
        .notes("vanilla, tonka")
        .allergens("coumarin");
    store.add(velvet).unwrap();

    let profile = profiles.add("Evening", &["vanilla"], &["coumarin"]).unwrap();
    let prefs = PreferenceProfile::from(&profile);
    let recs = Recommender::new()
        .recommend(store.list(&ListQuery::new()), &prefs, 3)
        .unwrap();

    let names: Vec<&str> = recs.iter().map(|r| r.record.name.as_str()).collect();
    assert_eq!(names, ["Amber Sky", "Cedar Lake", "Velvet Night"]);
}

#[test]
fn test_opt_in_filters_with_store_records() {
    let (_dir, store) = create_test_setup();
    store.add(RecordDraft::new("Pricey", "H", 200.0).notes("rose").rating(4.8)).unwrap();
    store.add(RecordDraft::new("Cheap", "H", 20.0).notes("rose").rating(4.0)).unwrap();
    store.add(RecordDraft::new("Poor", "H", 20.0).notes("rose").rating(1.0)).unwrap();

    let prefs = PreferenceProfile::new().prefer(["rose"]).budget(100.0);

    // Without filters the over-budget record is only penalized
    let plain = Recommender::new()
        .recommend(store.list(&ListQuery::new()), &prefs, 5)
        .unwrap();
    assert_eq!(plain.len(), 3);
    assert_eq!(plain[2].record.name, "Pricey");

    let filtered = Recommender::new()
        .with_filter(BudgetFilter)
        .with_filter(MinimumRatingFilter::new(3.0, false))
        .recommend(store.list(&ListQuery::new()), &prefs, 5)
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].record.name, "Cheap");
}
