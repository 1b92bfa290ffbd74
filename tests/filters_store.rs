use std::fs;

use toplines_terminal::filters::{FilterPatch, FilterPrefs, FilterStore};

fn store_in(dir: &tempfile::TempDir) -> FilterStore {
    FilterStore::at(dir.path().join("nested").join("toplines-filters-v1.json"))
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir);
    assert_eq!(store.load(), FilterPrefs::default());
    assert_eq!(store.load().schedule_date, None);
}

#[test]
fn partial_save_keeps_other_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir);

    store.save(FilterPatch {
        selected_classes: Some(vec!["senior".into()]),
        selected_conferences: Some(vec!["ACC".into(), "SEC".into()]),
        schedule_date: Some(Some("2025-12-20".into())),
        ..FilterPatch::default()
    });
    store.save(FilterPatch {
        rsci_only: Some(true),
        ..FilterPatch::default()
    });

    let prefs = store.load();
    assert!(prefs.rsci_only);
    assert_eq!(prefs.selected_classes, vec!["senior".to_string()]);
    assert_eq!(prefs.selected_conferences, vec!["ACC".to_string(), "SEC".to_string()]);
    assert_eq!(prefs.schedule_date.as_deref(), Some("2025-12-20"));
}

#[test]
fn full_round_trip_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir);
    store.save(FilterPatch {
        selected_position: Some("G".into()),
        topline_dates: Some(vec!["2025-12-19".into(), "2025-12-20".into()]),
        ..FilterPatch::default()
    });

    let mut changed = store.load();
    changed.sort_desc = true;
    let saved = store.save(FilterPatch::from(changed.clone()));
    assert_eq!(saved, changed);
    let again = store.save(FilterPatch::from(store.load()));
    assert_eq!(again, changed);
    assert_eq!(store.load(), changed);
    assert_eq!(store.load().selected_position, "G");
}

#[test]
fn schedule_date_can_be_cleared() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir);
    store.save(FilterPatch {
        schedule_date: Some(Some("2025-12-20".into())),
        ..FilterPatch::default()
    });
    store.save(FilterPatch {
        schedule_date: Some(None),
        ..FilterPatch::default()
    });
    assert_eq!(store.load().schedule_date, None);
}

#[test]
fn corrupt_file_degrades_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("toplines-filters-v1.json");
    fs::write(&path, "{ not json").expect("write corrupt file");
    let store = FilterStore::at(&path);
    assert_eq!(store.load(), FilterPrefs::default());

    let merged = store.save(FilterPatch {
        featured_only: Some(true),
        ..FilterPatch::default()
    });
    assert!(merged.featured_only);
    assert!(store.load().featured_only);
}

#[test]
fn wrong_typed_fields_are_defaulted_individually() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("toplines-filters-v1.json");
    fs::write(
        &path,
        r#"{"version":1,"filters":{"selectedClasses":"senior","rsciOnly":true,"selectedPosition":["G"],"scheduleStatuses":["final"]}}"#,
    )
    .expect("write filters");
    let prefs = FilterStore::at(&path).load();
    assert!(prefs.selected_classes.is_empty());
    assert!(prefs.rsci_only);
    assert_eq!(prefs.selected_position, "");
    assert_eq!(prefs.schedule_statuses, vec!["final".to_string()]);
}

#[test]
fn other_versions_are_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("toplines-filters-v1.json");
    fs::write(&path, r#"{"version":2,"filters":{"rsciOnly":true}}"#).expect("write filters");
    assert_eq!(FilterStore::at(&path).load(), FilterPrefs::default());
}

#[test]
fn unwritable_location_is_silent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("file");
    fs::write(&blocker, "x").expect("write blocker");
    // Parent is a regular file, so every write fails.
    let store = FilterStore::at(blocker.join("toplines-filters-v1.json"));
    let merged = store.save(FilterPatch {
        rsci_only: Some(true),
        ..FilterPatch::default()
    });
    assert!(merged.rsci_only);
    assert_eq!(store.load(), FilterPrefs::default());
}

#[test]
fn live_filters_survive_without_storage() {
    let store = FilterStore::default();
    let mut prefs = FilterPrefs::default();
    store.save_into(
        &mut prefs,
        FilterPatch {
            rsci_only: Some(true),
            ..FilterPatch::default()
        },
    );
    store.save_into(
        &mut prefs,
        FilterPatch {
            sort_desc: Some(true),
            ..FilterPatch::default()
        },
    );
    assert!(prefs.rsci_only);
    assert!(prefs.sort_desc);
}

#[test]
fn live_filters_survive_failed_writes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("file");
    fs::write(&blocker, "x").expect("write blocker");
    let store = FilterStore::at(blocker.join("toplines-filters-v1.json"));
    let mut prefs = FilterPrefs::default();
    store.save_into(
        &mut prefs,
        FilterPatch {
            featured_only: Some(true),
            ..FilterPatch::default()
        },
    );
    store.save_into(
        &mut prefs,
        FilterPatch {
            selected_position: Some("G".to_string()),
            ..FilterPatch::default()
        },
    );
    assert!(prefs.featured_only);
    assert_eq!(prefs.selected_position, "G");
    assert_eq!(store.load(), FilterPrefs::default());
}

#[test]
fn live_save_persists_when_writable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir);
    let mut prefs = FilterPrefs::default();
    store.save_into(
        &mut prefs,
        FilterPatch {
            rsci_only: Some(true),
            ..FilterPatch::default()
        },
    );
    assert_eq!(store.load(), prefs);
}
