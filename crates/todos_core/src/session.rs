//! Host-side session state consumed by the session store.
//!
//! # Responsibility
//! - Hold the serialized `{ "lists": [...] }` payload of one user session.
//! - Track whether the payload changed so the host knows to persist it.
//! - Load/save the payload as JSON.
//!
//! # Invariants
//! - `modified` is only ever raised by mutations; loading never raises it.
//! - The serialized shape carries no `list_id` on todos; nesting implies it.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use uuid::Uuid;

/// A todo as stored inside a session list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTodo {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
}

/// A list as stored inside the session, with its todos nested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionList {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub todos: Vec<SessionTodo>,
}

/// Serialized session payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// `None` until a store initializes the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lists: Option<Vec<SessionList>>,
}

#[derive(Debug)]
pub enum SessionError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "session file error: {err}"),
            Self::Json(err) => write!(f, "invalid session payload: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// One user's session: payload plus a dirty flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    data: SessionData,
    modified: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: SessionData) -> Self {
        Self {
            data,
            modified: false,
        }
    }

    pub fn from_json(payload: &str) -> Result<Self, SessionError> {
        Ok(Self::from_data(serde_json::from_str(payload)?))
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string(&self.data)?)
    }

    /// Loads a session file; a missing file yields an empty session.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        match std::fs::read_to_string(path) {
            Ok(payload) => Self::from_json(&payload),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes the payload to `path`. The dirty flag is left untouched.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let payload = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(path, payload)?;
        Ok(())
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut SessionData {
        &mut self.data
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    /// Clears the dirty flag, typically after the host persisted the payload.
    pub fn clear_modified(&mut self) {
        self.modified = false;
    }
}
