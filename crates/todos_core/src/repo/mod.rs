//! Persistence contract and its two backends.
//!
//! # Responsibility
//! - Define the `TodoStore` operation set shared by every backend.
//! - Isolate SQLite query details and session payload handling from callers.
//!
//! # Invariants
//! - Both backends agree on not-found behavior (absent reads, no-op writes).
//! - Only the SQLite backend enforces unique list titles.

pub mod session_store;
pub mod sqlite_store;
pub mod store;
