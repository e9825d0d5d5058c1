//! Validated writes against the backend.
//!
//! Every mutation runs the same pipeline:
//!
//! 1. Structural validation (pure, no network).
//! 2. Domain rules (to-do field combinations).
//! 3. For folder moves only, the ancestry check (reads only).
//! 4. Exactly one write carrying only the caller-supplied fields.
//! 5. A normalized [`MutationOutcome`].
//!
//! A failure in steps 1-3 aborts before any write. Context lookups (titles,
//! folder contents) are best-effort and never block the write.

use std::fmt;

use chrono::Utc;
use serde_json::Value as JsonValue;
use tracing::{info, instrument, warn};

use jotter_core::validation::{
    check_todo_rules, validate_folder_draft, validate_folder_patch, validate_id,
    validate_note_draft, validate_note_patch,
};
use jotter_core::{
    Error, FolderDraft, FolderPatch, ItemKind, NoteBackend, NoteDraft, NotePatch, Result,
};

use crate::ancestry::check_relocation;
use crate::lookup::{folder_contents, folder_title, note_title, FolderContents};

/// What a mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAction {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MutationAction::Created => "created",
            MutationAction::Updated => "updated",
            MutationAction::Deleted => "deleted",
        })
    }
}

/// Destination folder of a create or move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Empty for the root.
    pub id: String,
    pub title: Option<String>,
}

/// Normalized result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub kind: ItemKind,
    pub action: MutationAction,
    pub id: String,
    pub title: Option<String>,
    pub destination: Option<Destination>,
    /// Fields sent with an update.
    pub fields: Vec<&'static str>,
    /// Contents of a deleted folder, when they could be counted.
    pub contents: Option<FolderContents>,
    /// Problem with the backend's response to a write it accepted.
    pub warning: Option<String>,
}

impl MutationOutcome {
    fn new(kind: ItemKind, action: MutationAction, id: impl Into<String>) -> Self {
        Self {
            kind,
            action,
            id: id.into(),
            title: None,
            destination: None,
            fields: Vec::new(),
            contents: None,
            warning: None,
        }
    }
}

/// Identity of a record as returned by a write.
#[derive(Debug, Default, PartialEq, serde::Deserialize)]
struct Written {
    id: Option<String>,
    title: Option<String>,
}

impl Written {
    /// Decode a write response; anything but a record is `UnexpectedResponse`.
    fn decode(value: JsonValue) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::UnexpectedResponse(format!(
                "expected a record, got {}",
                value
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Decode a create response, which must carry the new record's id.
    fn created(kind: ItemKind, value: JsonValue) -> Result<(String, Option<String>)> {
        let written = Self::decode(value).map_err(|e| {
            Error::UnexpectedResponse(format!(
                "{} was created but the response could not be read ({}); list {}s to locate it",
                kind, e, kind
            ))
        })?;
        match written.id {
            Some(id) => Ok((id, written.title)),
            None => Err(Error::UnexpectedResponse(format!(
                "{} was created but the response carried no id; list {}s to locate it",
                kind, kind
            ))),
        }
    }

    /// Decode an update response.
    ///
    /// The backend has already accepted the write, so a malformed response
    /// does not fail the update: it is logged and returned as a warning.
    fn updated(kind: ItemKind, id: &str, value: JsonValue) -> (Self, Option<String>) {
        let problem = match Self::decode(value) {
            Ok(written) if written.id.as_deref() == Some(id) => return (written, None),
            Ok(Written { id: None, .. }) => "carried no id".to_string(),
            Ok(Written { id: Some(other), .. }) => format!("describes {} {}", kind, other),
            Err(e) => format!("could not be read ({})", e),
        };
        let warning = format!("the update was accepted but the response {}", problem);
        warn!(kind = %kind, id, warning = %warning, "Unexpected write response");
        (Self::default(), Some(warning))
    }
}

/// A failed create names its destination folder, when one was given.
fn in_parent(err: Error, parent_id: Option<&str>) -> Error {
    match parent_id {
        Some(parent) => err.for_record(ItemKind::Folder, parent),
        None => err,
    }
}

/// Runs the mutation pipeline against one backend.
pub struct MutationGate<'a, B: ?Sized> {
    backend: &'a B,
    page_limit: u32,
}

impl<'a, B> MutationGate<'a, B>
where
    B: NoteBackend + ?Sized,
{
    pub fn new(backend: &'a B, page_limit: u32) -> Self {
        Self {
            backend,
            page_limit,
        }
    }

    async fn destination(&self, parent_id: &str) -> Destination {
        let title = if parent_id.is_empty() {
            None
        } else {
            folder_title(self.backend, parent_id).await
        };
        Destination {
            id: parent_id.to_string(),
            title,
        }
    }

    /// Create a folder. No ancestry check: a new folder has no descendants.
    #[instrument(skip(self, draft), fields(subsystem = "ops", component = "gate", op = "create_folder"))]
    pub async fn create_folder(&self, draft: &FolderDraft) -> Result<MutationOutcome> {
        validate_folder_draft(draft)?;

        let destination = match &draft.parent_id {
            Some(parent) => Some(self.destination(parent).await),
            None => None,
        };

        let response = self
            .backend
            .create(ItemKind::Folder, draft.to_body())
            .await
            .map_err(|e| in_parent(e, draft.parent_id.as_deref()))?;
        let (id, title) = Written::created(ItemKind::Folder, response)?;

        info!(folder_id = %id, "Folder created");
        let mut outcome = MutationOutcome::new(ItemKind::Folder, MutationAction::Created, id);
        outcome.title = title.or_else(|| Some(draft.title.trim().to_string()));
        outcome.destination = destination;
        Ok(outcome)
    }

    /// Rename and/or move a folder.
    ///
    /// A move to a non-empty parent must pass [`check_relocation`] first.
    #[instrument(skip(self, patch), fields(subsystem = "ops", component = "gate", op = "update_folder", folder_id = %id))]
    pub async fn update_folder(&self, id: &str, patch: &FolderPatch) -> Result<MutationOutcome> {
        validate_folder_patch(id, patch)?;

        let destination = match &patch.parent_id {
            Some(parent) => {
                if let Err(e) = check_relocation(self.backend, id, parent).await {
                    warn!(parent_id = %parent, error = %e, "Folder move refused");
                    return Err(e);
                }
                Some(self.destination(parent).await)
            }
            None => None,
        };

        let response = self
            .backend
            .update(ItemKind::Folder, id, patch.to_body())
            .await
            .map_err(|e| e.for_record(ItemKind::Folder, id))?;
        let (stored, warning) = Written::updated(ItemKind::Folder, id, response);

        info!(changed = ?patch.supplied_fields(), "Folder updated");
        let mut outcome = MutationOutcome::new(ItemKind::Folder, MutationAction::Updated, id);
        outcome.warning = warning;
        outcome.title = stored
            .title
            .or_else(|| patch.title.as_ref().map(|t| t.trim().to_string()));
        outcome.destination = destination;
        outcome.fields = patch.supplied_fields();
        Ok(outcome)
    }

    /// Delete a folder, reporting its title and contents when available.
    #[instrument(skip(self), fields(subsystem = "ops", component = "gate", op = "delete_folder", folder_id = %id))]
    pub async fn delete_folder(&self, id: &str) -> Result<MutationOutcome> {
        validate_id("folder id", id)?;

        let (title, contents) = tokio::join!(
            folder_title(self.backend, id),
            folder_contents(self.backend, id, self.page_limit)
        );

        self.backend
            .delete(ItemKind::Folder, id)
            .await
            .map_err(|e| e.for_record(ItemKind::Folder, id))?;

        info!("Folder deleted");
        let mut outcome = MutationOutcome::new(ItemKind::Folder, MutationAction::Deleted, id);
        outcome.title = title;
        outcome.contents = contents;
        Ok(outcome)
    }

    #[instrument(skip(self, draft), fields(subsystem = "ops", component = "gate", op = "create_note"))]
    pub async fn create_note(&self, draft: &NoteDraft) -> Result<MutationOutcome> {
        validate_note_draft(draft)?;
        check_todo_rules(draft.is_todo, draft.todo_due, None)?;

        let destination = match &draft.parent_id {
            Some(parent) => Some(self.destination(parent).await),
            None => None,
        };

        let response = self
            .backend
            .create(ItemKind::Note, draft.to_body())
            .await
            .map_err(|e| in_parent(e, draft.parent_id.as_deref()))?;
        let (id, title) = Written::created(ItemKind::Note, response)?;

        info!(note_id = %id, "Note created");
        let mut outcome = MutationOutcome::new(ItemKind::Note, MutationAction::Created, id);
        outcome.title = title.or_else(|| Some(draft.title.trim().to_string()));
        outcome.destination = destination;
        Ok(outcome)
    }

    /// Update the supplied fields of a note. Moving a note needs no ancestry
    /// check: notes are leaves.
    #[instrument(skip(self, patch), fields(subsystem = "ops", component = "gate", op = "update_note", note_id = %id))]
    pub async fn update_note(&self, id: &str, patch: &NotePatch) -> Result<MutationOutcome> {
        validate_note_patch(id, patch)?;
        check_todo_rules(patch.is_todo, patch.todo_due, patch.todo_completed)?;

        let destination = match &patch.parent_id {
            Some(parent) => Some(self.destination(parent).await),
            None => None,
        };

        let body = patch.to_body(Utc::now().timestamp_millis());
        let response = self
            .backend
            .update(ItemKind::Note, id, body)
            .await
            .map_err(|e| e.for_record(ItemKind::Note, id))?;
        let (stored, warning) = Written::updated(ItemKind::Note, id, response);

        info!(changed = ?patch.supplied_fields(), "Note updated");
        let mut outcome = MutationOutcome::new(ItemKind::Note, MutationAction::Updated, id);
        outcome.warning = warning;
        outcome.title = stored
            .title
            .or_else(|| patch.title.as_ref().map(|t| t.trim().to_string()));
        outcome.destination = destination;
        outcome.fields = patch.supplied_fields();
        Ok(outcome)
    }

    #[instrument(skip(self), fields(subsystem = "ops", component = "gate", op = "delete_note", note_id = %id))]
    pub async fn delete_note(&self, id: &str) -> Result<MutationOutcome> {
        validate_id("note id", id)?;

        let title = note_title(self.backend, id).await;
        self.backend
            .delete(ItemKind::Note, id)
            .await
            .map_err(|e| e.for_record(ItemKind::Note, id))?;

        info!("Note deleted");
        let mut outcome = MutationOutcome::new(ItemKind::Note, MutationAction::Deleted, id);
        outcome.title = title;
        Ok(outcome)
    }
}
