//! # jotter-ops
//!
//! Notebook operations for jotter.
//!
//! This crate provides:
//! - Whole-collection fetching over the paginated backend
//! - The notebook tree with bracket-aware title ordering
//! - Cycle-safe folder relocation
//! - The mutation gate that validates before every write
//! - [`NotebookService`], the entry points callers dispatch to
//!
//! Everything here is written against [`jotter_core::NoteBackend`], so the
//! same code runs over HTTP or the in-memory mock.

pub mod ancestry;
pub mod fetcher;
pub mod format;
pub mod gate;
pub mod lookup;
pub mod service;
pub mod tree;

pub use ancestry::check_relocation;
pub use fetcher::fetch_all;
pub use gate::{Destination, MutationAction, MutationGate, MutationOutcome};
pub use lookup::FolderContents;
pub use service::NotebookService;
pub use tree::{compare_titles, FolderTree};
