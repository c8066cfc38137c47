//! Ephemeral `TodoStore` living inside one user's `Session`.
//!
//! # Responsibility
//! - Provide list/todo CRUD over the session's nested list payload.
//! - Raise the session dirty flag whenever data changes.
//!
//! # Invariants
//! - Records are resolved to positions first and mutated through those
//!   positions; callers only ever receive cloned snapshots.
//! - Ids are fresh v4 UUIDs; serial ids never match anything here.
//! - List titles need not be unique in this backend.

use crate::model::record_id::RecordId;
use crate::model::todo_list::{validate_list_title, Todo, TodoList};
use crate::repo::store::{StoreError, StoreResult, TodoStore};
use crate::session::{Session, SessionList, SessionTodo};
use log::info;
use uuid::Uuid;

const BACKEND: &str = "session";

/// Session-backed todo store.
///
/// Borrows the session mutably for its whole lifetime, so only one store can
/// touch a given session at a time.
pub struct SessionStore<'s> {
    session: &'s mut Session,
}

impl<'s> SessionStore<'s> {
    /// Wraps `session`, initializing its list collection if absent.
    ///
    /// Idempotent: wrapping an initialized session leaves it unchanged.
    pub fn new(session: &'s mut Session) -> Self {
        if session.data().lists.is_none() {
            session.data_mut().lists = Some(Vec::new());
            session.mark_modified();
        }
        Self { session }
    }

    fn lists(&self) -> &[SessionList] {
        self.session.data().lists.as_deref().unwrap_or(&[])
    }

    fn lists_mut(&mut self) -> &mut Vec<SessionList> {
        self.session.data_mut().lists.get_or_insert_with(Vec::new)
    }

    fn list_position(&self, list_id: &RecordId) -> Option<usize> {
        let token = list_id.as_token()?;
        self.lists().iter().position(|list| list.id == token)
    }

    /// Resolves the list, then the todo inside it.
    fn todo_position(&self, list_id: &RecordId, todo_id: &RecordId) -> Option<(usize, usize)> {
        let list_index = self.list_position(list_id)?;
        let token = todo_id.as_token()?;
        let todo_index = self.lists()[list_index]
            .todos
            .iter()
            .position(|todo| todo.id == token)?;
        Some((list_index, todo_index))
    }

    fn log_op(&self, op: &str, list_id: Option<&RecordId>) {
        match list_id {
            Some(id) => info!("event=store_op module=repo backend={BACKEND} op={op} list_id={id}"),
            None => info!("event=store_op module=repo backend={BACKEND} op={op}"),
        }
    }
}

impl TodoStore for SessionStore<'_> {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn all_lists(&self) -> StoreResult<Vec<TodoList>> {
        self.log_op("all_lists", None);
        Ok(self.lists().iter().map(to_todo_list).collect())
    }

    fn find_list(&self, list_id: &RecordId) -> StoreResult<Option<TodoList>> {
        self.log_op("find_list", Some(list_id));
        Ok(self
            .list_position(list_id)
            .map(|index| to_todo_list(&self.lists()[index])))
    }

    fn find_todo(&self, list_id: &RecordId, todo_id: &RecordId) -> StoreResult<Option<Todo>> {
        self.log_op("find_todo", Some(list_id));
        Ok(self
            .todo_position(list_id, todo_id)
            .map(|(list_index, todo_index)| {
                let list = &self.lists()[list_index];
                to_todo(list.id, &list.todos[todo_index])
            }))
    }

    fn create_new_list(&mut self, title: &str) -> StoreResult<RecordId> {
        validate_list_title(title)?;
        self.log_op("create_new_list", None);

        let id = Uuid::new_v4();
        self.lists_mut().push(SessionList {
            id,
            title: title.to_string(),
            todos: Vec::new(),
        });
        self.session.mark_modified();
        Ok(RecordId::Token(id))
    }

    fn update_list_by_id(&mut self, list_id: &RecordId, new_title: &str) -> StoreResult<()> {
        validate_list_title(new_title)?;
        self.log_op("update_list_by_id", Some(list_id));

        if let Some(index) = self.list_position(list_id) {
            self.lists_mut()[index].title = new_title.to_string();
            self.session.mark_modified();
        }
        Ok(())
    }

    fn delete_list(&mut self, list_id: &RecordId) -> StoreResult<()> {
        self.log_op("delete_list", Some(list_id));

        if let Some(index) = self.list_position(list_id) {
            self.lists_mut().remove(index);
            self.session.mark_modified();
        }
        Ok(())
    }

    fn create_new_todo(&mut self, list_id: &RecordId, todo_title: &str) -> StoreResult<RecordId> {
        self.log_op("create_new_todo", Some(list_id));

        let index = self
            .list_position(list_id)
            .ok_or(StoreError::MissingList(*list_id))?;
        let id = Uuid::new_v4();
        self.lists_mut()[index].todos.push(SessionTodo {
            id,
            title: todo_title.to_string(),
            completed: false,
        });
        self.session.mark_modified();
        Ok(RecordId::Token(id))
    }

    fn delete_todo_from_list(
        &mut self,
        list_id: &RecordId,
        todo_id: &RecordId,
    ) -> StoreResult<()> {
        self.log_op("delete_todo_from_list", Some(list_id));

        if let Some((list_index, _)) = self.todo_position(list_id, todo_id) {
            let token = todo_id.as_token();
            let todos = &mut self.lists_mut()[list_index].todos;
            todos.retain(|todo| Some(todo.id) != token);
            self.session.mark_modified();
        }
        Ok(())
    }

    fn update_todo_status(
        &mut self,
        list_id: &RecordId,
        todo_id: &RecordId,
        status: bool,
    ) -> StoreResult<()> {
        self.log_op("update_todo_status", Some(list_id));

        if let Some((list_index, todo_index)) = self.todo_position(list_id, todo_id) {
            self.lists_mut()[list_index].todos[todo_index].completed = status;
            self.session.mark_modified();
        }
        Ok(())
    }

    fn mark_all_todos_completed(&mut self, list_id: &RecordId) -> StoreResult<()> {
        self.log_op("mark_all_todos_completed", Some(list_id));

        if let Some(index) = self.list_position(list_id) {
            for todo in &mut self.lists_mut()[index].todos {
                todo.completed = true;
            }
            self.session.mark_modified();
        }
        Ok(())
    }
}

fn to_todo_list(list: &SessionList) -> TodoList {
    TodoList {
        id: RecordId::Token(list.id),
        title: list.title.clone(),
        todos: list
            .todos
            .iter()
            .map(|todo| to_todo(list.id, todo))
            .collect(),
    }
}

fn to_todo(list_id: Uuid, todo: &SessionTodo) -> Todo {
    Todo {
        id: RecordId::Token(todo.id),
        list_id: RecordId::Token(list_id),
        title: todo.title.clone(),
        completed: todo.completed,
    }
}

#[cfg(test)]
mod tests {
    use super::SessionStore;
    use crate::model::record_id::RecordId;
    use crate::repo::store::{StoreError, TodoStore};
    use crate::session::Session;

    #[test]
    fn construction_initializes_lists_once() {
        let mut session = Session::new();
        SessionStore::new(&mut session);
        assert!(session.is_modified());
        assert_eq!(session.data().lists, Some(Vec::new()));

        session.clear_modified();
        SessionStore::new(&mut session);
        assert!(!session.is_modified());
    }

    #[test]
    fn mutations_mark_session_modified_and_misses_do_not() {
        let mut session = Session::new();
        let list_id = {
            let mut store = SessionStore::new(&mut session);
            store.create_new_list("Work").unwrap()
        };
        assert!(session.is_modified());

        session.clear_modified();
        {
            let mut store = SessionStore::new(&mut session);
            store
                .update_list_by_id(&RecordId::new_token(), "Other")
                .unwrap();
            store.delete_list(&RecordId::Serial(1)).unwrap();
        }
        assert!(!session.is_modified());

        {
            let mut store = SessionStore::new(&mut session);
            store.update_list_by_id(&list_id, "Office").unwrap();
        }
        assert!(session.is_modified());
        assert_eq!(session.data().lists.as_ref().unwrap()[0].title, "Office");
    }

    #[test]
    fn returned_lists_are_snapshots() {
        let mut session = Session::new();
        let mut store = SessionStore::new(&mut session);
        let list_id = store.create_new_list("Work").unwrap();

        let mut snapshot = store.find_list(&list_id).unwrap().unwrap();
        snapshot.title = "Mutated".to_string();

        assert_eq!(store.find_list(&list_id).unwrap().unwrap().title, "Work");
    }

    #[test]
    fn serial_ids_never_match_and_orphan_todo_is_missing_list() {
        let mut session = Session::new();
        let mut store = SessionStore::new(&mut session);
        store.create_new_list("Work").unwrap();

        assert!(store.find_list(&RecordId::Serial(1)).unwrap().is_none());
        let err = store
            .create_new_todo(&RecordId::Serial(1), "orphan")
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingList(RecordId::Serial(1))));
    }

    #[test]
    fn todos_carry_owner_id() {
        let mut session = Session::new();
        let mut store = SessionStore::new(&mut session);
        let list_id = store.create_new_list("Work").unwrap();
        let todo_id = store.create_new_todo(&list_id, "Report").unwrap();

        let todo = store.find_todo(&list_id, &todo_id).unwrap().unwrap();
        assert_eq!(todo.list_id, list_id);
        assert_eq!(todo.id, todo_id);
    }
}
