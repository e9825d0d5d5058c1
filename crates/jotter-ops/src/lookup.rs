//! Best-effort context lookups.
//!
//! These reads only enrich descriptions. Every failure is logged and
//! swallowed: the caller gets `None` and carries on.

use tracing::debug;

use jotter_core::defaults::{FOLDER_FIELDS, TITLE_FIELDS};
use jotter_core::{CollectionFilter, FolderRecord, ItemKind, NoteBackend, NoteRecord};

use crate::fetcher::fetch_all;
use crate::tree::compare_titles;

/// What a folder currently contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FolderContents {
    pub notes: usize,
    pub subfolders: usize,
}

/// Display name of a folder, if it can be read.
pub async fn folder_title<B>(backend: &B, folder_id: &str) -> Option<String>
where
    B: NoteBackend + ?Sized,
{
    record_title::<B, FolderRecord>(backend, ItemKind::Folder, folder_id)
        .await
        .map(|f| f.title)
}

/// Display name of a note, if it can be read.
pub async fn note_title<B>(backend: &B, note_id: &str) -> Option<String>
where
    B: NoteBackend + ?Sized,
{
    record_title::<B, NoteRecord>(backend, ItemKind::Note, note_id)
        .await
        .map(|n| n.title)
}

async fn record_title<B, T>(backend: &B, kind: ItemKind, id: &str) -> Option<T>
where
    B: NoteBackend + ?Sized,
    T: serde::de::DeserializeOwned,
{
    let value = match backend.fetch_one(kind, id, TITLE_FIELDS).await {
        Ok(value) => value,
        Err(e) => {
            debug!(kind = %kind, id, error = %e, "Title lookup failed");
            return None;
        }
    };
    match serde_json::from_value(value) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!(kind = %kind, id, error = %e, "Title lookup returned malformed record");
            None
        }
    }
}

/// Direct sub-folders of `folder_id`, sorted for display.
pub async fn subfolders<B>(
    backend: &B,
    folder_id: &str,
    page_limit: u32,
) -> Option<Vec<FolderRecord>>
where
    B: NoteBackend + ?Sized,
{
    let folders: Vec<FolderRecord> = match fetch_all(
        backend,
        ItemKind::Folder,
        &CollectionFilter::All,
        FOLDER_FIELDS,
        page_limit,
    )
    .await
    {
        Ok(folders) => folders,
        Err(e) => {
            debug!(folder_id, error = %e, "Sub-folder lookup failed");
            return None;
        }
    };

    let mut children: Vec<FolderRecord> = folders
        .into_iter()
        .filter(|f| f.parent_id.as_deref() == Some(folder_id))
        .collect();
    children.sort_by(|a, b| compare_titles(&a.title, &b.title));
    Some(children)
}

/// Count the notes and sub-folders directly inside `folder_id`.
pub async fn folder_contents<B>(
    backend: &B,
    folder_id: &str,
    page_limit: u32,
) -> Option<FolderContents>
where
    B: NoteBackend + ?Sized,
{
    let notes = async {
        fetch_all::<B, NoteRecord>(
            backend,
            ItemKind::Note,
            &CollectionFilter::InFolder(folder_id.to_string()),
            &["id"],
            page_limit,
        )
        .await
        .map_err(|e| debug!(folder_id, error = %e, "Note count lookup failed"))
        .ok()
    };
    let (notes, subfolders) = tokio::join!(notes, subfolders(backend, folder_id, page_limit));

    Some(FolderContents {
        notes: notes?.len(),
        subfolders: subfolders?.len(),
    })
}
