//! Use-case services sitting between callers and a `TodoStore`.
//!
//! # Responsibility
//! - Validate user input before it reaches persistence.
//! - Report missing lists/todos explicitly.
//!
//! # Invariants
//! - Services stay storage-agnostic; they only see the `TodoStore` trait.

pub mod todo_service;
