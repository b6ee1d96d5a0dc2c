//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls and edge synchronization into note use-cases.
//! - Keep callers decoupled from storage details.

pub mod note_service;
