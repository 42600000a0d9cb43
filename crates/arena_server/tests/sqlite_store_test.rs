//! Tests for the SQLite match store.

use arena_server::{
    ConnectionId, Coordinator, MatchPolicy, MatchState, MatchStore, Score, SqliteMatchStore,
    StoreErrorKind,
};
use arena_tictactoe::{Mark, Position};
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use tempfile::TempDir;

/// Opens a store in a fresh temporary directory. The directory handle must
/// stay in scope to keep the database alive.
fn setup_test_store() -> (TempDir, SqliteMatchStore) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir
        .path()
        .join("arena.db")
        .to_str()
        .expect("Invalid path")
        .to_string();
    let store = SqliteMatchStore::open(db_path).expect("Failed to open store");
    (dir, store)
}

fn id(s: &str) -> ConnectionId {
    ConnectionId::new(s)
}

fn sample_state() -> MatchState {
    let mut state = MatchState::new();
    state.set_player(Mark::X, Some(id("x")));
    state.set_player(Mark::O, Some(id("o")));
    state.enqueue_spectator(id("s1"));
    state.enqueue_spectator(id("s2"));
    state.board_mut().place(Position::Center, id("x")).unwrap();
    state.board_mut().place(Position::TopLeft, id("o")).unwrap();
    *state.score_mut() = Score::new(2, 1, 5);
    state.set_turn(Some(Mark::X));
    state
}

#[test]
fn test_load_before_save_is_none() {
    let (_dir, store) = setup_test_store();
    assert!(store.load().expect("Load failed").is_none());
}

#[test]
fn test_save_then_load_round_trip() {
    let (_dir, store) = setup_test_store();
    let state = sample_state();
    store.save(&state).expect("Save failed");

    let loaded = store.load().expect("Load failed").expect("No match stored");
    assert_eq!(loaded, state);
}

#[test]
fn test_save_replaces_single_record() {
    let (_dir, store) = setup_test_store();
    store.save(&sample_state()).expect("First save failed");

    let mut next = MatchState::new();
    next.set_player(Mark::O, Some(id("late")));
    store.save(&next).expect("Second save failed");

    let loaded = store.load().expect("Load failed").expect("No match stored");
    assert_eq!(loaded, next);
    assert!(loaded.spectators().is_empty());
}

#[test]
fn test_reopen_keeps_data() {
    let (dir, store) = setup_test_store();
    store.save(&sample_state()).expect("Save failed");
    drop(store);

    let path = dir.path().join("arena.db").to_str().unwrap().to_string();
    let reopened = SqliteMatchStore::open(path).expect("Reopen failed");
    let loaded = reopened.load().expect("Load failed").expect("No match stored");
    assert_eq!(*loaded.score(), Score::new(2, 1, 5));
}

#[test]
fn test_open_unreachable_path_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir
        .path()
        .join("missing")
        .join("nested")
        .join("arena.db")
        .to_str()
        .unwrap()
        .to_string();
    let err = SqliteMatchStore::open(path).unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::Unreachable);
}

/// Overwrites the board column with text that is not a board.
fn corrupt_game_map(dir: &TempDir) {
    let path = dir.path().join("arena.db").to_str().unwrap().to_string();
    let mut conn = SqliteConnection::establish(&path).expect("Failed to connect");
    diesel::sql_query("UPDATE match_state SET game_map = '{not json'")
        .execute(&mut conn)
        .expect("Update failed");
}

#[test]
fn test_corrupt_row_is_reported_as_corrupt() {
    let (dir, store) = setup_test_store();
    store.save(&sample_state()).expect("Save failed");
    corrupt_game_map(&dir);

    let err = store.load().unwrap_err();
    assert!(err.is_corrupt());
}

#[test]
fn test_coordinator_recovers_from_corrupt_row() {
    let (dir, store) = setup_test_store();
    store.save(&sample_state()).expect("Save failed");
    corrupt_game_map(&dir);

    let coordinator = Coordinator::open(store.clone(), MatchPolicy::default()).expect("Open failed");
    assert_eq!(coordinator.snapshot().unwrap(), MatchState::new());
    assert_eq!(store.load().unwrap(), Some(MatchState::new()));
}
