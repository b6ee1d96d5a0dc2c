//! Link-graph engine.
//!
//! # Responsibility
//! - Parse `[[Title]]` markers, resolve them to notes (stubbing unknown
//!   titles), and maintain forward-link/backlink edges.
//!
//! # Invariants
//! - For every note `A` and every id `B` in `A.links`, `B.backlinks`
//!   contains `A.id` once a create/update of `A` completes.
//! - Deleting a note retracts only its outgoing edges; inbound `links`
//!   pointing at it are left in place and filtered on read.

pub mod parser;
pub mod resolver;
pub mod stub;
pub mod sync;
