use std::fs;
use std::sync::Arc;

use quiz_core::model::{QuestionId, QuestionStat, StatsState};
use storage::{FileBackend, StatsStore, load_bank};

#[test]
fn file_store_round_trips_across_instances() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("quiz-stats.json");

    let mut state = StatsState::new();
    let a = QuestionId::new("1-1");
    let b = QuestionId::new("1-2");
    state.record_session(1, [&a, &b]);
    state.record_session(2, [&a]);

    StatsStore::file(&path).save(&state).expect("save");

    let reloaded = StatsStore::file(&path).load();
    assert_eq!(reloaded, state);
    assert_eq!(reloaded.get(&a), QuestionStat::from_persisted(2, Some(2)));
    assert_eq!(reloaded.get(&b), QuestionStat::from_persisted(1, Some(1)));
}

#[test]
fn missing_file_loads_empty_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = StatsStore::file(dir.path().join("absent.json"));
    assert_eq!(store.load(), StatsState::new());
}

#[test]
fn corrupt_file_loads_empty_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("quiz-stats.json");
    fs::write(&path, "{\"sessionCounter\": ").expect("write");

    let store = StatsStore::new(Arc::new(FileBackend::new(&path)));
    assert_eq!(store.load(), StatsState::new());
}

#[test]
fn bank_file_loads_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("questions.csv");
    fs::write(
        &path,
        "Set,Number,Question,Choice A,Choice B,Answer\n\
         2,1,Largest planet?,Jupiter,Mars,A\n\
         2,2,Smallest planet?,Mercury,Venus,1\n",
    )
    .expect("write");

    let bank = load_bank(&path).expect("load");
    assert_eq!(bank.len(), 2);
    assert_eq!(bank[0].id(), &QuestionId::new("2-1"));
    assert_eq!(bank[1].text(), "Smallest planet?");
}

#[test]
fn missing_bank_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(load_bank(&dir.path().join("nope.csv")).is_err());
}
