//! Todo use-case service.
//!
//! # Responsibility
//! - Give the application layer one entry point over any `TodoStore`.
//! - Apply user-input rules (title length, unique list titles) the stores
//!   themselves do not enforce uniformly.
//! - Turn silent store no-ops into explicit not-found results.
//!
//! # Invariants
//! - Titles reach the store trimmed and 1..=100 characters long.
//! - The service never branches on which backend it wraps.

use crate::model::record_id::RecordId;
use crate::model::todo_list::{
    normalize_title, sort_lists_completed_last, TitleError, Todo, TodoList,
};
use crate::repo::store::{StoreError, TodoStore};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    InvalidTitle(TitleError),
    DuplicateTitle(String),
    ListNotFound(RecordId),
    TodoNotFound { list_id: RecordId, todo_id: RecordId },
    Store(StoreError),
}

impl ServiceError {
    /// Message suitable for showing to the person who made the request.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidTitle(_) => "The title must be between 1 and 100 characters.".to_string(),
            Self::DuplicateTitle(_) => "The title must be unique.".to_string(),
            Self::ListNotFound(_) => "The specified list was not found.".to_string(),
            Self::TodoNotFound { .. } => "The specified todo was not found.".to_string(),
            Self::Store(_) => "Something went wrong while saving your changes.".to_string(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle(err) => write!(f, "{err}"),
            Self::DuplicateTitle(title) => write!(f, "list title already in use: `{title}`"),
            Self::ListNotFound(id) => write!(f, "list not found: {id}"),
            Self::TodoNotFound { list_id, todo_id } => {
                write!(f, "todo {todo_id} not found in list {list_id}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTitle(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TitleError> for ServiceError {
    fn from(value: TitleError) -> Self {
        Self::InvalidTitle(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateListTitle(title) => Self::DuplicateTitle(title),
            StoreError::MissingList(id) => Self::ListNotFound(id),
            StoreError::Validation(err) => Self::InvalidTitle(err),
            other => Self::Store(other),
        }
    }
}

/// Use-case service wrapping one `TodoStore`.
pub struct TodoService<S: TodoStore> {
    store: S,
}

impl<S: TodoStore> TodoService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// All lists, open ones first, otherwise in insertion order.
    pub fn lists(&self) -> ServiceResult<Vec<TodoList>> {
        let mut lists = self.store.all_lists()?;
        sort_lists_completed_last(&mut lists);
        Ok(lists)
    }

    pub fn list(&self, list_id: &RecordId) -> ServiceResult<TodoList> {
        self.store
            .find_list(list_id)?
            .ok_or(ServiceError::ListNotFound(*list_id))
    }

    pub fn todo(&self, list_id: &RecordId, todo_id: &RecordId) -> ServiceResult<Todo> {
        self.list(list_id)?;
        self.store
            .find_todo(list_id, todo_id)?
            .ok_or(ServiceError::TodoNotFound {
                list_id: *list_id,
                todo_id: *todo_id,
            })
    }

    pub fn create_list(&mut self, title: &str) -> ServiceResult<RecordId> {
        let title = normalize_title(title)?;
        self.ensure_title_available(title, None)?;
        Ok(self.store.create_new_list(title)?)
    }

    /// Renames a list. Keeping the current title is allowed.
    pub fn rename_list(&mut self, list_id: &RecordId, title: &str) -> ServiceResult<()> {
        let title = normalize_title(title)?;
        self.list(list_id)?;
        self.ensure_title_available(title, Some(list_id))?;
        Ok(self.store.update_list_by_id(list_id, title)?)
    }

    pub fn delete_list(&mut self, list_id: &RecordId) -> ServiceResult<()> {
        self.list(list_id)?;
        Ok(self.store.delete_list(list_id)?)
    }

    pub fn add_todo(&mut self, list_id: &RecordId, title: &str) -> ServiceResult<RecordId> {
        let title = normalize_title(title)?;
        Ok(self.store.create_new_todo(list_id, title)?)
    }

    pub fn delete_todo(&mut self, list_id: &RecordId, todo_id: &RecordId) -> ServiceResult<()> {
        self.todo(list_id, todo_id)?;
        Ok(self.store.delete_todo_from_list(list_id, todo_id)?)
    }

    pub fn set_todo_completed(
        &mut self,
        list_id: &RecordId,
        todo_id: &RecordId,
        completed: bool,
    ) -> ServiceResult<()> {
        self.todo(list_id, todo_id)?;
        Ok(self.store.update_todo_status(list_id, todo_id, completed)?)
    }

    pub fn complete_all(&mut self, list_id: &RecordId) -> ServiceResult<()> {
        self.list(list_id)?;
        Ok(self.store.mark_all_todos_completed(list_id)?)
    }

    fn ensure_title_available(&self, title: &str, except: Option<&RecordId>) -> ServiceResult<()> {
        let taken = self
            .store
            .all_lists()?
            .iter()
            .any(|list| list.title == title && Some(&list.id) != except);
        if taken {
            return Err(ServiceError::DuplicateTitle(title.to_string()));
        }
        Ok(())
    }
}
