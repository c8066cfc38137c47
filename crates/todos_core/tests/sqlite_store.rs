use rusqlite::Connection;
use std::sync::{Arc, Barrier};
use std::thread;
use todos_core::db::PoolConfig;
use todos_core::{RecordId, SqliteStore, StoreError, TodoStore};

#[test]
fn duplicate_list_title_is_a_constraint_violation() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.create_new_list("Groceries").unwrap();

    let err = store.create_new_list("Groceries").unwrap_err();
    assert!(err.is_constraint_violation());
    assert!(matches!(err, StoreError::DuplicateListTitle(ref title) if title == "Groceries"));
    assert_eq!(err.error_code(), "duplicate_list_title");
    assert_eq!(store.all_lists().unwrap().len(), 1);
}

#[test]
fn ids_are_serial_and_increase() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let first = store.create_new_list("A").unwrap();
    let second = store.create_new_list("B").unwrap();

    let (Some(first), Some(second)) = (first.as_serial(), second.as_serial()) else {
        panic!("sqlite ids should be serial");
    };
    assert!(second > first);
}

#[test]
fn deleting_the_newest_list_does_not_recycle_its_id() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.create_new_list("Old").unwrap();
    let newest = store.create_new_list("Newest").unwrap();
    store.delete_list(&newest).unwrap();

    let next = store.create_new_list("Next").unwrap();
    assert!(next.as_serial().unwrap() > newest.as_serial().unwrap());
}

#[test]
fn lists_and_todos_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.sqlite3");

    let (list_id, todo_id) = {
        let mut store = SqliteStore::open(&path, &PoolConfig::default()).unwrap();
        let list_id = store.create_new_list("Durable").unwrap();
        let todo_id = store.create_new_todo(&list_id, "Persist me").unwrap();
        store.update_todo_status(&list_id, &todo_id, true).unwrap();
        (list_id, todo_id)
    };

    let store = SqliteStore::open(&path, &PoolConfig::default()).unwrap();
    let todo = store.find_todo(&list_id, &todo_id).unwrap().unwrap();
    assert_eq!(todo.title, "Persist me");
    assert!(todo.completed);
}

#[test]
fn deleting_a_list_cascades_at_the_row_level() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cascade.sqlite3");
    let mut store = SqliteStore::open(&path, &PoolConfig::default()).unwrap();

    let list_id = store.create_new_list("Doomed").unwrap();
    store.create_new_todo(&list_id, "a").unwrap();
    store.create_new_todo(&list_id, "b").unwrap();
    store.delete_list(&list_id).unwrap();

    let conn = Connection::open(&path).unwrap();
    let remaining: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM todos WHERE list_id = ?1;",
            [list_id.as_serial().unwrap()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn clones_share_the_same_database() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let reader = store.clone();

    let list_id = store.create_new_list("Shared").unwrap();
    assert_eq!(reader.find_list(&list_id).unwrap().unwrap().title, "Shared");
}

#[test]
fn concurrent_openers_bootstrap_the_schema_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = Arc::new(dir.path().join("race.sqlite3"));
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|index| {
            let path = Arc::clone(&path);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut store = SqliteStore::open(path.as_path(), &PoolConfig::default()).unwrap();
                store.create_new_list(&format!("List {index}")).unwrap()
            })
        })
        .collect();

    let ids: Vec<RecordId> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let store = SqliteStore::open(path.as_path(), &PoolConfig::default()).unwrap();
    let lists = store.all_lists().unwrap();
    assert_eq!(lists.len(), 4);
    for id in ids {
        assert!(lists.iter().any(|list| list.id == id));
    }
}

#[test]
fn backend_name_is_sqlite() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert_eq!(store.backend_name(), "sqlite");
}

#[test]
fn unreachable_database_is_a_connectivity_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("todos.sqlite3");
    let config = PoolConfig {
        connection_timeout: std::time::Duration::from_millis(200),
        ..PoolConfig::default()
    };

    let err = match SqliteStore::open(&path, &config) {
        Err(err) => err,
        Ok(_) => panic!("opening inside a missing directory should fail"),
    };
    assert!(matches!(err, StoreError::Db(_)));
    assert!(!err.is_constraint_violation());
}
