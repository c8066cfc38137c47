//! Persistence core for the todos application.
//! Lists and their todos live behind one `TodoStore` contract with a durable
//! SQLite backend and an ephemeral per-session backend.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use config::{Backend, ConfigError, Environment, StoreConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::record_id::{ParseRecordIdError, RecordId};
pub use model::todo_list::{
    sort_lists_completed_last, sort_todos_completed_last, TitleError, Todo, TodoList,
    MAX_TITLE_CHARS,
};
pub use repo::session_store::SessionStore;
pub use repo::sqlite_store::SqliteStore;
pub use repo::store::{StoreError, StoreResult, TodoStore};
pub use service::todo_service::{ServiceError, ServiceResult, TodoService};
pub use session::{Session, SessionData, SessionError, SessionList, SessionTodo};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
