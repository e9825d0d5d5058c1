//! Centralized default constants for jotter.
//!
//! All crates reference these constants instead of defining their own
//! magic numbers. Organized by domain area.

// =============================================================================
// DATA API
// =============================================================================

/// Default Data API endpoint (local desktop clipper service).
pub const API_URL: &str = "http://127.0.0.1:41184";

/// Request timeout for Data API calls (seconds).
pub const API_TIMEOUT_SECS: u64 = 30;

/// Timeout for the health check (seconds).
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

/// Requests slower than this are logged with `slow = true`.
pub const SLOW_REQUEST_MS: u64 = 2_000;

// =============================================================================
// PAGINATION
// =============================================================================

/// Page size used when fetching whole collections. Also the backend maximum.
pub const PAGE_LIMIT: u32 = 100;

/// Upper bound on pages followed for one collection before giving up.
pub const MAX_PAGES: u32 = 10_000;

// =============================================================================
// VALIDATION
// =============================================================================

/// Length of a record identifier (lowercase hexadecimal).
pub const ID_LEN: usize = 32;

/// Maximum title length in characters.
pub const TITLE_MAX_LEN: usize = 255;

/// Maximum number of ids accepted by a batch note read.
pub const READ_NOTES_MAX: usize = 50;

// =============================================================================
// RENDERING
// =============================================================================

/// Spaces added per depth level in the notebook tree.
pub const TREE_INDENT: usize = 2;

/// Characters of body shown in note listings.
pub const BODY_PREVIEW_CHARS: usize = 80;

// =============================================================================
// FIELD PROJECTIONS
// =============================================================================

/// Fields needed to build the notebook tree.
pub const FOLDER_FIELDS: &[&str] = &["id", "title", "parent_id"];

/// Fields needed to name a note or folder.
pub const TITLE_FIELDS: &[&str] = &["id", "title"];

/// Fields needed for one ancestry hop.
pub const PARENT_FIELDS: &[&str] = &["id", "parent_id"];

/// Fields for note listings (no body).
pub const NOTE_SUMMARY_FIELDS: &[&str] = &[
    "id",
    "title",
    "parent_id",
    "is_todo",
    "todo_completed",
    "todo_due",
    "updated_time",
];

/// Fields for the paged note listing; the body feeds the preview line.
pub const NOTE_LIST_FIELDS: &[&str] = &[
    "id",
    "title",
    "body",
    "parent_id",
    "is_todo",
    "todo_completed",
    "todo_due",
    "updated_time",
];

/// Fields for a full note read.
pub const NOTE_FIELDS: &[&str] = &[
    "id",
    "title",
    "body",
    "parent_id",
    "is_todo",
    "todo_completed",
    "todo_due",
    "created_time",
    "updated_time",
];
