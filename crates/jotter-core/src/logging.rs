//! Structured logging field name constants for jotter.
//!
//! Span and event fields follow one naming scheme across crates:
//! `subsystem` ("client", "ops"), `component` ("data_api", "fetcher",
//! "ancestry", "gate", "service") and `op` identify the emitter; entity
//! fields are `kind`, `folder_id`, `note_id`, `parent_id`.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Operation failed and the caller receives an error |
//! | WARN  | Recoverable issue (slow request, refused folder move) |
//! | INFO  | Lifecycle events, completed mutations |
//! | DEBUG | Decision points, per-request details, failed enrichment lookups |
//! | TRACE | Per-item iteration (pages, ancestry hops) |

// ─── Deferred span fields ──────────────────────────────────────────────────
//
// Declared as `field::Empty` in `#[instrument]` and filled in with
// `Span::current().record(..)` once the value is known.

/// Number of records returned or processed.
pub const ITEM_COUNT: &str = "item_count";

/// Number of ancestor hops walked by a relocation check.
pub const HOP_COUNT: &str = "hop_count";
