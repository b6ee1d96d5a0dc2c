//! Note persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the `NoteStore` boundary the link-graph engine talks to.
//! - Provide an in-memory fake and a SQLite-backed store.
//!
//! # Invariants
//! - Store APIs return semantic errors (`NotFound`, `DuplicateId`) in
//!   addition to backend transport errors.

pub mod memory_store;
pub mod note_store;
pub mod sqlite_store;
