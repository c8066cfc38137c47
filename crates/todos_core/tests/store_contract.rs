//! Behavior every `TodoStore` backend must share.
//!
//! Each check is written once against `&mut dyn TodoStore` and run against
//! both the SQLite store and the session store.

use todos_core::{RecordId, StoreError, TitleError, TodoStore};

macro_rules! for_each_backend {
    ($($check:ident),* $(,)?) => {
        mod sqlite {
            $(
                #[test]
                fn $check() {
                    let mut store = todos_core::SqliteStore::open_in_memory().unwrap();
                    super::$check(&mut store);
                }
            )*
        }

        mod session {
            $(
                #[test]
                fn $check() {
                    let mut session = todos_core::Session::new();
                    let mut store = todos_core::SessionStore::new(&mut session);
                    super::$check(&mut store);
                }
            )*
        }
    };
}

for_each_backend!(
    new_list_has_no_todos,
    created_todo_starts_open,
    delete_list_removes_its_todos,
    mark_all_completed_is_idempotent,
    status_round_trip_keeps_title,
    groceries_scenario,
    mark_all_on_empty_list_is_fine,
    list_ids_are_not_reused,
    missing_targets_are_no_ops,
    orphan_todo_is_a_constraint_violation,
    blank_list_titles_are_rejected,
    todos_keep_insertion_order,
    todo_lookup_is_scoped_to_its_list,
    all_lists_attaches_todos,
    rename_changes_only_the_title,
);

fn new_list_has_no_todos(store: &mut dyn TodoStore) {
    let id = store.create_new_list("Groceries").unwrap();

    let list = store.find_list(&id).unwrap().unwrap();
    assert_eq!(list.id, id);
    assert_eq!(list.title, "Groceries");
    assert!(list.todos.is_empty());
}

fn created_todo_starts_open(store: &mut dyn TodoStore) {
    let list_id = store.create_new_list("Errands").unwrap();
    let todo_id = store.create_new_todo(&list_id, "Post office").unwrap();

    let todo = store.find_todo(&list_id, &todo_id).unwrap().unwrap();
    assert_eq!(todo.id, todo_id);
    assert_eq!(todo.list_id, list_id);
    assert_eq!(todo.title, "Post office");
    assert!(!todo.completed);
}

fn delete_list_removes_its_todos(store: &mut dyn TodoStore) {
    let list_id = store.create_new_list("Trip").unwrap();
    let todo_ids: Vec<RecordId> = ["Tickets", "Passport", "Charger"]
        .iter()
        .map(|title| store.create_new_todo(&list_id, title).unwrap())
        .collect();
    let keep_id = store.create_new_list("Other").unwrap();
    let kept_todo = store.create_new_todo(&keep_id, "Stay").unwrap();

    store.delete_list(&list_id).unwrap();

    assert!(store.find_list(&list_id).unwrap().is_none());
    for todo_id in &todo_ids {
        assert!(store.find_todo(&list_id, todo_id).unwrap().is_none());
    }
    assert!(store.find_todo(&keep_id, &kept_todo).unwrap().is_some());
}

fn mark_all_completed_is_idempotent(store: &mut dyn TodoStore) {
    let list_id = store.create_new_list("Chores").unwrap();
    let first = store.create_new_todo(&list_id, "Dishes").unwrap();
    store.create_new_todo(&list_id, "Laundry").unwrap();
    store.update_todo_status(&list_id, &first, true).unwrap();

    store.mark_all_todos_completed(&list_id).unwrap();
    let once = store.find_list(&list_id).unwrap().unwrap();
    store.mark_all_todos_completed(&list_id).unwrap();
    let twice = store.find_list(&list_id).unwrap().unwrap();

    assert_eq!(once, twice);
    assert!(twice.todos.iter().all(|todo| todo.completed));
    assert!(twice.is_completed());
}

fn status_round_trip_keeps_title(store: &mut dyn TodoStore) {
    let list_id = store.create_new_list("Shopping").unwrap();
    let todo_id = store.create_new_todo(&list_id, "buy milk").unwrap();

    store.update_todo_status(&list_id, &todo_id, true).unwrap();
    let todo = store.find_todo(&list_id, &todo_id).unwrap().unwrap();
    assert!(todo.completed);
    assert_eq!(todo.title, "buy milk");

    store.update_todo_status(&list_id, &todo_id, false).unwrap();
    assert!(!store.find_todo(&list_id, &todo_id).unwrap().unwrap().completed);
}

fn groceries_scenario(store: &mut dyn TodoStore) {
    let list_id = store.create_new_list("Groceries").unwrap();
    let eggs = store.create_new_todo(&list_id, "Eggs").unwrap();
    store.create_new_todo(&list_id, "Bread").unwrap();

    store.delete_todo_from_list(&list_id, &eggs).unwrap();

    let list = store.find_list(&list_id).unwrap().unwrap();
    let todos: Vec<(&str, bool)> = list
        .todos
        .iter()
        .map(|todo| (todo.title.as_str(), todo.completed))
        .collect();
    assert_eq!(todos, vec![("Bread", false)]);
}

fn mark_all_on_empty_list_is_fine(store: &mut dyn TodoStore) {
    let list_id = store.create_new_list("Work").unwrap();

    store.mark_all_todos_completed(&list_id).unwrap();

    let list = store.find_list(&list_id).unwrap().unwrap();
    assert!(list.todos.is_empty());
    assert!(!list.is_completed());
}

fn list_ids_are_not_reused(store: &mut dyn TodoStore) {
    let first = store.create_new_list("Temp").unwrap();
    store.delete_list(&first).unwrap();
    let second = store.create_new_list("Temp").unwrap();

    assert_ne!(first, second);
    assert!(store.find_list(&first).unwrap().is_none());
}

fn missing_targets_are_no_ops(store: &mut dyn TodoStore) {
    let list_id = store.create_new_list("Real").unwrap();
    let todo_id = store.create_new_todo(&list_id, "Real todo").unwrap();
    let before = store.all_lists().unwrap();

    let missing_list = store.create_new_list("Gone").unwrap();
    store.delete_list(&missing_list).unwrap();
    let missing_todo = store.create_new_todo(&list_id, "Gone todo").unwrap();
    store.delete_todo_from_list(&list_id, &missing_todo).unwrap();

    assert!(store.find_list(&missing_list).unwrap().is_none());
    assert!(store.find_todo(&list_id, &missing_todo).unwrap().is_none());

    store.update_list_by_id(&missing_list, "Renamed").unwrap();
    store.delete_list(&missing_list).unwrap();
    store.delete_todo_from_list(&missing_list, &todo_id).unwrap();
    store.delete_todo_from_list(&list_id, &missing_todo).unwrap();
    store.update_todo_status(&list_id, &missing_todo, true).unwrap();
    store.mark_all_todos_completed(&missing_list).unwrap();

    assert_eq!(store.all_lists().unwrap(), before);
}

fn orphan_todo_is_a_constraint_violation(store: &mut dyn TodoStore) {
    let list_id = store.create_new_list("Short lived").unwrap();
    store.delete_list(&list_id).unwrap();

    let err = store.create_new_todo(&list_id, "Orphan").unwrap_err();
    assert!(err.is_constraint_violation());
    assert!(matches!(err, StoreError::MissingList(id) if id == list_id));
}

fn blank_list_titles_are_rejected(store: &mut dyn TodoStore) {
    let err = store.create_new_list("   ").unwrap_err();
    assert!(matches!(err, StoreError::Validation(TitleError::Empty)));

    let list_id = store.create_new_list("Named").unwrap();
    let err = store.update_list_by_id(&list_id, "").unwrap_err();
    assert!(matches!(err, StoreError::Validation(TitleError::Empty)));
    assert_eq!(store.find_list(&list_id).unwrap().unwrap().title, "Named");
    assert_eq!(store.all_lists().unwrap().len(), 1);
}

fn todos_keep_insertion_order(store: &mut dyn TodoStore) {
    let list_id = store.create_new_list("Ordered").unwrap();
    let titles = ["one", "two", "three", "four"];
    for title in titles {
        store.create_new_todo(&list_id, title).unwrap();
    }
    let second = store.find_list(&list_id).unwrap().unwrap().todos[1].id;
    store.update_todo_status(&list_id, &second, true).unwrap();

    let list = store.find_list(&list_id).unwrap().unwrap();
    let stored: Vec<&str> = list.todos.iter().map(|todo| todo.title.as_str()).collect();
    assert_eq!(stored, titles);
}

fn todo_lookup_is_scoped_to_its_list(store: &mut dyn TodoStore) {
    let home = store.create_new_list("Home").unwrap();
    let work = store.create_new_list("Work").unwrap();
    let todo_id = store.create_new_todo(&home, "Vacuum").unwrap();

    assert!(store.find_todo(&work, &todo_id).unwrap().is_none());

    store.update_todo_status(&work, &todo_id, true).unwrap();
    store.delete_todo_from_list(&work, &todo_id).unwrap();
    let todo = store.find_todo(&home, &todo_id).unwrap().unwrap();
    assert!(!todo.completed);
}

fn all_lists_attaches_todos(store: &mut dyn TodoStore) {
    let first = store.create_new_list("First").unwrap();
    let second = store.create_new_list("Second").unwrap();
    store.create_new_todo(&second, "a").unwrap();
    store.create_new_todo(&second, "b").unwrap();

    let lists = store.all_lists().unwrap();
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[0].id, first);
    assert!(lists[0].todos.is_empty());
    assert_eq!(lists[1].id, second);
    assert_eq!(lists[1].todos_count(), 2);
    assert!(lists[1].todos.iter().all(|todo| todo.list_id == second));
}

fn rename_changes_only_the_title(store: &mut dyn TodoStore) {
    let list_id = store.create_new_list("Draft").unwrap();
    let todo_id = store.create_new_todo(&list_id, "keep me").unwrap();

    store.update_list_by_id(&list_id, "Final").unwrap();

    let list = store.find_list(&list_id).unwrap().unwrap();
    assert_eq!(list.title, "Final");
    assert_eq!(list.todos.len(), 1);
    assert_eq!(list.todos[0].id, todo_id);
}
