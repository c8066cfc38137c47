//! The persistence contract shared by the durable and session backends.
//!
//! # Responsibility
//! - Define the one operation set the application layer talks to.
//! - Define the error taxonomy both backends report through.
//!
//! # Invariants
//! - Lookups that match nothing return `Ok(None)`, never an error.
//! - Mutations addressed at a missing list/todo are silent no-ops, except
//!   `create_new_todo`, which reports `StoreError::MissingList`.
//! - List titles that are empty after trimming are rejected before storage
//!   is touched.

use crate::db::DbError;
use crate::model::record_id::RecordId;
use crate::model::todo_list::{TitleError, Todo, TodoList};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by `TodoStore` implementations.
#[derive(Debug)]
pub enum StoreError {
    /// Storage unreachable or failed at the transport level.
    Db(DbError),
    /// Another list already uses this title (durable backend only).
    DuplicateListTitle(String),
    /// A todo was addressed to a list that does not exist.
    MissingList(RecordId),
    Validation(TitleError),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl StoreError {
    /// Whether the failure is a data-integrity rule rather than an outage.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::DuplicateListTitle(_) | Self::MissingList(_))
    }

    /// Stable machine-readable code used in log lines.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Db(err) => err.error_code(),
            Self::DuplicateListTitle(_) => "duplicate_list_title",
            Self::MissingList(_) => "missing_list",
            Self::Validation(_) => "invalid_title",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateListTitle(title) => write!(f, "list title already in use: `{title}`"),
            Self::MissingList(id) => write!(f, "list not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::DuplicateListTitle(_) | Self::MissingList(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(value: r2d2::Error) -> Self {
        Self::Db(DbError::Pool(value))
    }
}

impl From<TitleError> for StoreError {
    fn from(value: TitleError) -> Self {
        Self::Validation(value)
    }
}

/// Persistence interface for lists and their todos.
///
/// Implemented by [`SqliteStore`](crate::repo::sqlite_store::SqliteStore) and
/// [`SessionStore`](crate::repo::session_store::SessionStore). The trait is
/// object-safe so the backend can be picked once at startup.
pub trait TodoStore {
    /// Short backend label used in logs.
    fn backend_name(&self) -> &'static str;
    /// Every list with its todos, in insertion order.
    fn all_lists(&self) -> StoreResult<Vec<TodoList>>;
    fn find_list(&self, list_id: &RecordId) -> StoreResult<Option<TodoList>>;
    /// Resolves the list first, then the todo within it.
    fn find_todo(&self, list_id: &RecordId, todo_id: &RecordId) -> StoreResult<Option<Todo>>;
    fn create_new_list(&mut self, title: &str) -> StoreResult<RecordId>;
    fn update_list_by_id(&mut self, list_id: &RecordId, new_title: &str) -> StoreResult<()>;
    /// Removes the list and, with it, all of its todos.
    fn delete_list(&mut self, list_id: &RecordId) -> StoreResult<()>;
    /// Appends an open todo; `StoreError::MissingList` when the list is absent.
    fn create_new_todo(&mut self, list_id: &RecordId, todo_title: &str) -> StoreResult<RecordId>;
    fn delete_todo_from_list(&mut self, list_id: &RecordId, todo_id: &RecordId)
        -> StoreResult<()>;
    fn update_todo_status(
        &mut self,
        list_id: &RecordId,
        todo_id: &RecordId,
        status: bool,
    ) -> StoreResult<()>;
    fn mark_all_todos_completed(&mut self, list_id: &RecordId) -> StoreResult<()>;
}

macro_rules! forward_todo_store {
    () => {
        fn backend_name(&self) -> &'static str {
            (**self).backend_name()
        }

        fn all_lists(&self) -> StoreResult<Vec<TodoList>> {
            (**self).all_lists()
        }

        fn find_list(&self, list_id: &RecordId) -> StoreResult<Option<TodoList>> {
            (**self).find_list(list_id)
        }

        fn find_todo(&self, list_id: &RecordId, todo_id: &RecordId) -> StoreResult<Option<Todo>> {
            (**self).find_todo(list_id, todo_id)
        }

        fn create_new_list(&mut self, title: &str) -> StoreResult<RecordId> {
            (**self).create_new_list(title)
        }

        fn update_list_by_id(&mut self, list_id: &RecordId, new_title: &str) -> StoreResult<()> {
            (**self).update_list_by_id(list_id, new_title)
        }

        fn delete_list(&mut self, list_id: &RecordId) -> StoreResult<()> {
            (**self).delete_list(list_id)
        }

        fn create_new_todo(
            &mut self,
            list_id: &RecordId,
            todo_title: &str,
        ) -> StoreResult<RecordId> {
            (**self).create_new_todo(list_id, todo_title)
        }

        fn delete_todo_from_list(
            &mut self,
            list_id: &RecordId,
            todo_id: &RecordId,
        ) -> StoreResult<()> {
            (**self).delete_todo_from_list(list_id, todo_id)
        }

        fn update_todo_status(
            &mut self,
            list_id: &RecordId,
            todo_id: &RecordId,
            status: bool,
        ) -> StoreResult<()> {
            (**self).update_todo_status(list_id, todo_id, status)
        }

        fn mark_all_todos_completed(&mut self, list_id: &RecordId) -> StoreResult<()> {
            (**self).mark_all_todos_completed(list_id)
        }
    };
}

impl<S: TodoStore + ?Sized> TodoStore for Box<S> {
    forward_todo_store!();
}

impl<S: TodoStore + ?Sized> TodoStore for &mut S {
    forward_todo_store!();
}
