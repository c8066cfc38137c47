//! Identifier shared by both store backends.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of a list or todo.
///
/// The durable backend hands out `Serial` ids from SQLite `AUTOINCREMENT`
/// columns; the session backend hands out random `Token` ids. An id of one
/// kind never matches a record stored by the other backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Serial(i64),
    Token(Uuid),
}

impl RecordId {
    /// Generates a fresh random token id.
    pub fn new_token() -> Self {
        Self::Token(Uuid::new_v4())
    }

    pub fn as_serial(&self) -> Option<i64> {
        match self {
            Self::Serial(value) => Some(*value),
            Self::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<Uuid> {
        match self {
            Self::Serial(_) => None,
            Self::Token(value) => Some(*value),
        }
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serial(value) => write!(f, "{value}"),
            Self::Token(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Serial(value)
    }
}

impl From<Uuid> for RecordId {
    fn from(value: Uuid) -> Self {
        Self::Token(value)
    }
}

/// Raised when text is neither an integer nor a UUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRecordIdError(String);

impl Display for ParseRecordIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid record id `{}`; expected an integer or a UUID",
            self.0
        )
    }
}

impl Error for ParseRecordIdError {}

impl FromStr for RecordId {
    type Err = ParseRecordIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Ok(serial) = trimmed.parse::<i64>() {
            return Ok(Self::Serial(serial));
        }
        Uuid::parse_str(trimmed)
            .map(Self::Token)
            .map_err(|_| ParseRecordIdError(trimmed.to_string()))
    }
}
