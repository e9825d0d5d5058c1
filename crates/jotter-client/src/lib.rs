//! # jotter-client
//!
//! [`NoteBackend`] implementations for jotter.
//!
//! This crate provides:
//! - [`DataApiBackend`], a reqwest client for the notes Data API
//!   (`/folders`, `/notes`, `/search`, token authentication, `has_more` pagination)
//! - Environment-driven [`DataApiConfig`]
//! - HTTP status to [`Error`] mapping
//! - An in-memory [`mock::MockBackend`] (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use jotter_client::{DataApiBackend, ItemKind, NoteBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = DataApiBackend::from_env().unwrap();
//!     let folder = backend
//!         .fetch_one(ItemKind::Folder, "0123456789abcdef0123456789abcdef", &["id", "title"])
//!         .await;
//!     println!("{:?}", folder);
//! }
//! ```

pub mod backend;
pub mod config;
pub mod status;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use jotter_core::*;

pub use backend::DataApiBackend;
pub use config::DataApiConfig;
pub use status::{to_error, ApiErrorCode};
