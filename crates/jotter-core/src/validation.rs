//! Structural and domain validation of operation inputs.
//!
//! Everything here is pure: validation never touches the backend, so a
//! rejected request is guaranteed to have issued no network call.

use crate::defaults::{ID_LEN, PAGE_LIMIT, READ_NOTES_MAX, TITLE_MAX_LEN};
use crate::error::{Error, Result};
use crate::models::{
    CollectionFilter, FolderDraft, FolderPatch, ListNotesRequest, NoteDraft, NotePatch,
};

/// Check that `id` has the backend's identifier shape (32 lowercase hex chars).
pub fn validate_id(field: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::validation(format!("{} is required", field)));
    }
    let well_formed = id.len() == ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if !well_formed {
        return Err(Error::validation(format!(
            "{} '{}' is not a valid id (expected {} lowercase hex characters)",
            field, id, ID_LEN
        )));
    }
    Ok(())
}

/// Like [`validate_id`], but an empty string (the root) is accepted.
pub fn validate_parent_ref(field: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Ok(());
    }
    validate_id(field, id)
}

pub fn validate_title(title: &str) -> Result<()> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("title must not be empty"));
    }
    let len = trimmed.chars().count();
    if len > TITLE_MAX_LEN {
        return Err(Error::validation(format!(
            "title is {} characters long (maximum {})",
            len, TITLE_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_timestamp(field: &str, ms: i64) -> Result<()> {
    if ms < 0 {
        return Err(Error::validation(format!(
            "{} must be a non-negative epoch-millisecond timestamp",
            field
        )));
    }
    Ok(())
}

/// To-do rules that span several fields.
///
/// A due date or a completion flag cannot be combined with an explicit
/// "not a to-do".
pub fn check_todo_rules(
    is_todo: Option<bool>,
    todo_due: Option<i64>,
    todo_completed: Option<bool>,
) -> Result<()> {
    if is_todo == Some(false) {
        if todo_due.is_some_and(|due| due > 0) {
            return Err(Error::validation(
                "todo_due cannot be set on a note with is_todo = false",
            ));
        }
        if todo_completed == Some(true) {
            return Err(Error::validation(
                "todo_completed cannot be set on a note with is_todo = false",
            ));
        }
    }
    Ok(())
}

pub fn validate_folder_draft(draft: &FolderDraft) -> Result<()> {
    validate_title(&draft.title)?;
    if let Some(parent) = &draft.parent_id {
        validate_parent_ref("parent_id", parent)?;
    }
    Ok(())
}

pub fn validate_folder_patch(id: &str, patch: &FolderPatch) -> Result<()> {
    validate_id("folder id", id)?;
    if patch.is_empty() {
        return Err(Error::validation(
            "update requires at least one of: title, parent_id",
        ));
    }
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(parent) = &patch.parent_id {
        validate_parent_ref("parent_id", parent)?;
    }
    Ok(())
}

pub fn validate_note_draft(draft: &NoteDraft) -> Result<()> {
    validate_title(&draft.title)?;
    if let Some(parent) = &draft.parent_id {
        validate_parent_ref("parent_id", parent)?;
    }
    if let Some(due) = draft.todo_due {
        validate_timestamp("todo_due", due)?;
    }
    Ok(())
}

pub fn validate_note_patch(id: &str, patch: &NotePatch) -> Result<()> {
    validate_id("note id", id)?;
    if patch.is_empty() {
        return Err(Error::validation(
            "update requires at least one of: title, body, parent_id, is_todo, todo_completed, todo_due",
        ));
    }
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(parent) = &patch.parent_id {
        validate_parent_ref("parent_id", parent)?;
    }
    if let Some(due) = patch.todo_due {
        validate_timestamp("todo_due", due)?;
    }
    Ok(())
}

/// Validate a batch of ids for a multi-note read.
pub fn validate_id_batch(ids: &[String]) -> Result<()> {
    if ids.is_empty() {
        return Err(Error::validation("at least one note id is required"));
    }
    if ids.len() > READ_NOTES_MAX {
        return Err(Error::validation(format!(
            "{} ids requested (maximum {} per call)",
            ids.len(),
            READ_NOTES_MAX
        )));
    }
    ids.iter().try_for_each(|id| validate_id("note id", id))
}

pub fn validate_list_request(req: &ListNotesRequest) -> Result<()> {
    if req.page == 0 {
        return Err(Error::validation("page numbers start at 1"));
    }
    if req.page_size == 0 || req.page_size > PAGE_LIMIT {
        return Err(Error::validation(format!(
            "page size must be between 1 and {}",
            PAGE_LIMIT
        )));
    }
    match &req.filter {
        CollectionFilter::All => Ok(()),
        CollectionFilter::InFolder(folder_id) => validate_id("folder id", folder_id),
        CollectionFilter::Search(query) if query.trim().is_empty() => {
            Err(Error::validation("search query must not be empty"))
        }
        CollectionFilter::Search(_) => Ok(()),
    }
}
