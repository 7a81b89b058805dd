use pymutest::state::{RunSummary, StoredMutant, load_from_path, save_to_path};

fn summary() -> RunSummary {
    RunSummary {
        total: 6,
        detected: 2,
        survived: 3,
        errors: 1,
        unknown: 0,
        timeout: 0,
        excluded: 4,
        aborted: None,
        survived_mutants: vec![StoredMutant {
            ref_id: "m1".to_string(),
            file: "app.py".to_string(),
            line: 6,
            column: 11,
            original: "+".to_string(),
            replacement: "**".to_string(),
            diff: "-     return b + 11\n+     return b ** 11\n".to_string(),
        }],
    }
}

#[test]
fn summary_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    save_to_path(&summary(), &path);
    let loaded = load_from_path(&path).expect("state should load");

    assert_eq!(loaded.total, 6);
    assert_eq!(loaded.detected, 2);
    assert_eq!(loaded.survived, 3);
    assert_eq!(loaded.errors, 1);
    assert_eq!(loaded.excluded, 4);
    assert!(loaded.aborted.is_none());
    assert_eq!(loaded.survived_mutants.len(), 1);
    assert_eq!(loaded.survived_mutants[0].ref_id, "m1");
    assert_eq!(loaded.survived_mutants[0].replacement, "**");
}

#[test]
fn aborted_reason_survives_the_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut s = summary();
    s.aborted = Some("restore failed".to_string());
    save_to_path(&s, &path);

    let loaded = load_from_path(&path).expect("state should load");
    assert_eq!(loaded.aborted.as_deref(), Some("restore failed"));
}

#[test]
fn missing_state_file_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_from_path(&dir.path().join("absent.json")).is_none());
}

#[test]
fn corrupt_state_file_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{ truncated").unwrap();
    assert!(load_from_path(&path).is_none());
}
