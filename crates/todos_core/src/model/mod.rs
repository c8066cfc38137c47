//! Domain model shared by both store backends.
//!
//! # Responsibility
//! - Define the list/todo records returned by every `TodoStore`.
//! - Keep one identifier type so callers never branch on backend identity.
//!
//! # Invariants
//! - Every todo belongs to exactly one list.
//! - Returned records are owned snapshots, never live views of storage.

pub mod record_id;
pub mod todo_list;
