//! # jotter-core
//!
//! Core types, traits, and validation for jotter.
//!
//! This crate provides the record models shared by every jotter crate, the
//! closed error enumeration, the [`NoteBackend`] collaborator trait, and the
//! pure input validation run before any request reaches the backend.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{CycleViolation, Error, ErrorKind, Result};
pub use models::*;
pub use traits::*;
