//! Domain model for the note garden.
//!
//! # Responsibility
//! - Define the note record, its edge sets, and partial-update shapes.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion is a hard delete; inbound `links` may dangle afterwards.

pub mod note;
