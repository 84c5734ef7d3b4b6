//! Pure domain logic for the palco newsletter platform.
//!
//! This crate has no database or network I/O. It provides:
//!
//! - Shared types and the domain error taxonomy.
//! - Audience segmentation rules.
//! - Campaign content assembly (personalization, tracked links,
//!   tracking pixel, unsubscribe footer).
//! - Campaign statistics computation.
//! - CSV subscriber-import parsing and validation.
//! - A generic retry helper with exponential backoff and jitter.

pub mod audience;
pub mod content;
pub mod error;
pub mod import;
pub mod retry;
pub mod roles;
pub mod stats;
pub mod types;
