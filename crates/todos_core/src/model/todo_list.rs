//! List and todo domain model.
//!
//! # Responsibility
//! - Define the records both store backends hand back to callers.
//! - Provide completion summaries and display ordering helpers.
//!
//! # Invariants
//! - A `TodoList` owns its `todos`; every `Todo::list_id` equals the owner id.
//! - `todos` keep insertion order as stored; only the ordering helpers
//!   produce a different order, and only on a caller-owned copy.
//! - Store writes reject list titles that are empty after trimming.

use crate::model::record_id::RecordId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Longest title accepted by the service layer, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// One item of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: RecordId,
    /// Back-reference to the owning list.
    pub list_id: RecordId,
    pub title: String,
    pub completed: bool,
}

/// A named, ordered container of todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    pub id: RecordId,
    pub title: String,
    /// Always present; empty for a new list.
    pub todos: Vec<Todo>,
}

impl TodoList {
    pub fn todos_count(&self) -> usize {
        self.todos.len()
    }

    /// Number of todos not yet completed.
    pub fn todos_remaining(&self) -> usize {
        self.todos.iter().filter(|todo| !todo.completed).count()
    }

    /// A list counts as done only when it has todos and none remain open.
    pub fn is_completed(&self) -> bool {
        self.todos_count() > 0 && self.todos_remaining() == 0
    }

    pub fn todo(&self, todo_id: &RecordId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == *todo_id)
    }
}

/// Sorts lists so completed ones come last, keeping insertion order otherwise.
pub fn sort_lists_completed_last(lists: &mut [TodoList]) {
    lists.sort_by_key(TodoList::is_completed);
}

/// Sorts todos so completed ones come last, keeping insertion order otherwise.
pub fn sort_todos_completed_last(todos: &mut [Todo]) {
    todos.sort_by_key(|todo| todo.completed);
}

/// Rejected list or todo title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleError {
    Empty,
    TooLong { chars: usize, max: usize },
}

impl Display for TitleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "title must not be empty"),
            Self::TooLong { chars, max } => {
                write!(f, "title must be at most {max} characters, got {chars}")
            }
        }
    }
}

impl Error for TitleError {}

/// Store-level rule for list titles: non-empty after trimming.
pub fn validate_list_title(title: &str) -> Result<(), TitleError> {
    if title.trim().is_empty() {
        return Err(TitleError::Empty);
    }
    Ok(())
}

/// Service-level rule: trimmed title of 1..=`MAX_TITLE_CHARS` characters.
///
/// Returns the trimmed title on success.
pub fn normalize_title(title: &str) -> Result<&str, TitleError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TitleError::Empty);
    }
    let chars = trimmed.chars().count();
    if chars > MAX_TITLE_CHARS {
        return Err(TitleError::TooLong {
            chars,
            max: MAX_TITLE_CHARS,
        });
    }
    Ok(trimmed)
}
