//! Notebook operations exposed to callers as rendered text.

use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use tracing::{field, instrument, Span};

use jotter_core::defaults::{
    FOLDER_FIELDS, NOTE_FIELDS, NOTE_LIST_FIELDS, NOTE_SUMMARY_FIELDS, PAGE_LIMIT,
};
use jotter_core::validation::{validate_id, validate_id_batch, validate_list_request};
use jotter_core::{
    logging, CollectionFilter, Error, FolderDraft, FolderPatch, FolderRecord, ItemKind,
    ListNotesRequest, NoteBackend, NoteDraft, NotePatch, NoteRecord, PageQuery, Result,
};

use crate::fetcher::fetch_all;
use crate::format::{render_note, render_note_batch, render_note_page, render_notebook};
use crate::gate::MutationGate;
use crate::lookup::{folder_title, subfolders};
use crate::tree::{compare_titles, FolderTree};

/// Entry points for reading and changing notebooks and notes.
///
/// Each call is independent and returns either the rendered result or a
/// classified [`Error`]; the service keeps no state between calls.
pub struct NotebookService<B> {
    backend: B,
    page_limit: u32,
}

impl<B: NoteBackend> NotebookService<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            page_limit: PAGE_LIMIT,
        }
    }

    /// Page size used when fetching whole collections.
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.clamp(1, PAGE_LIMIT);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn gate(&self) -> MutationGate<'_, B> {
        MutationGate::new(&self.backend, self.page_limit)
    }

    async fn fetch_record<T>(&self, kind: ItemKind, id: &str, fields: &[&str]) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = self
            .backend
            .fetch_one(kind, id, fields)
            .await
            .map_err(|e| e.for_record(kind, id))?;
        serde_json::from_value(value).map_err(|e| Error::from(e).for_record(kind, id))
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Render the whole notebook hierarchy, one indented line per notebook.
    #[instrument(skip(self), fields(subsystem = "ops", component = "service", op = "list_notebook_tree", item_count = field::Empty))]
    pub async fn list_notebook_tree(&self) -> Result<String> {
        let folders: Vec<FolderRecord> = fetch_all(
            &self.backend,
            ItemKind::Folder,
            &CollectionFilter::All,
            FOLDER_FIELDS,
            self.page_limit,
        )
        .await?;
        Span::current().record(logging::ITEM_COUNT, folders.len() as u64);

        let tree = FolderTree::build(folders);
        if tree.is_empty() {
            return Ok("No notebooks found.\n".to_string());
        }
        Ok(tree.render())
    }

    /// Render one notebook with its sub-notebooks and every note it holds.
    #[instrument(skip(self), fields(subsystem = "ops", component = "service", op = "read_notebook", folder_id = %id))]
    pub async fn read_notebook(&self, id: &str) -> Result<String> {
        validate_id("notebook id", id)?;

        let folder: FolderRecord = self.fetch_record(ItemKind::Folder, id, FOLDER_FIELDS).await?;

        let in_folder = CollectionFilter::InFolder(folder.id.clone());
        let notes = fetch_all::<B, NoteRecord>(
            &self.backend,
            ItemKind::Note,
            &in_folder,
            NOTE_SUMMARY_FIELDS,
            self.page_limit,
        );
        let parent_title = async {
            match &folder.parent_id {
                Some(parent) => folder_title(&self.backend, parent).await,
                None => None,
            }
        };
        let children = subfolders(&self.backend, &folder.id, self.page_limit);

        let (notes, parent_title, children) = tokio::join!(notes, parent_title, children);
        let mut notes = notes.map_err(|e| e.for_record(ItemKind::Folder, &folder.id))?;
        notes.sort_by(|a, b| compare_titles(&a.title, &b.title));

        Ok(render_notebook(
            &folder,
            parent_title.as_deref(),
            children.as_deref(),
            &notes,
        ))
    }

    /// Render one note in full.
    #[instrument(skip(self), fields(subsystem = "ops", component = "service", op = "read_note", note_id = %id))]
    pub async fn read_note(&self, id: &str) -> Result<String> {
        validate_id("note id", id)?;

        let note: NoteRecord = self.fetch_record(ItemKind::Note, id, NOTE_FIELDS).await?;
        let notebook = match &note.parent_id {
            Some(parent) => folder_title(&self.backend, parent).await,
            None => None,
        };
        Ok(render_note(&note, notebook.as_deref()))
    }

    /// Render several notes; ids that do not exist are listed, not fatal.
    ///
    /// Duplicate ids are read once, in first-seen order.
    #[instrument(skip(self, ids), fields(subsystem = "ops", component = "service", op = "read_notes", item_count = ids.len()))]
    pub async fn read_notes(&self, ids: &[String]) -> Result<String> {
        validate_id_batch(ids)?;

        let mut seen = HashSet::new();
        let unique: Vec<&str> = ids
            .iter()
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect();

        let results = join_all(
            unique
                .iter()
                .map(|id| self.fetch_record::<NoteRecord>(ItemKind::Note, id, NOTE_FIELDS)),
        )
        .await;

        let mut notes = Vec::new();
        let mut missing = Vec::new();
        for (id, result) in unique.iter().zip(results) {
            match result {
                Ok(note) => notes.push(note),
                Err(Error::NotFound { .. }) => missing.push(id.to_string()),
                Err(e) => return Err(e),
            }
        }

        let parents: Vec<&str> = {
            let mut seen = HashSet::new();
            notes
                .iter()
                .filter_map(|n| n.parent_id.as_deref())
                .filter(|p| seen.insert(*p))
                .collect()
        };
        let lookups = join_all(parents.iter().map(|p| folder_title(&self.backend, p))).await;
        let titles: HashMap<&str, String> = parents
            .iter()
            .copied()
            .zip(lookups)
            .filter_map(|(parent, title)| title.map(|t| (parent, t)))
            .collect();

        let rendered: Vec<String> = notes
            .iter()
            .map(|note| {
                let notebook = note
                    .parent_id
                    .as_deref()
                    .and_then(|p| titles.get(p))
                    .map(String::as_str);
                render_note(note, notebook)
            })
            .collect();
        Ok(render_note_batch(&rendered, &missing))
    }

    /// Render one page of notes, optionally filtered and ordered.
    #[instrument(skip(self, req), fields(subsystem = "ops", component = "service", op = "list_notes", page = req.page))]
    pub async fn list_notes(&self, req: ListNotesRequest) -> Result<String> {
        validate_list_request(&req)?;

        let mut query = PageQuery::new(req.filter.clone(), NOTE_LIST_FIELDS, req.page, req.page_size);
        query.order_by = req.order_by.map(|o| o.as_str().to_string());
        query.order_dir = req.order_dir;

        let page = self
            .backend
            .fetch_page(ItemKind::Note, &query)
            .await
            .and_then(|raw| raw.decode::<NoteRecord>())
            .map_err(|e| match &req.filter {
                CollectionFilter::InFolder(folder_id) => e.for_record(ItemKind::Folder, folder_id),
                _ => e,
            })?;
        Ok(render_note_page(&page, &req))
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    pub async fn create_note(&self, draft: NoteDraft) -> Result<String> {
        Ok(self.gate().create_note(&draft).await?.to_string())
    }

    pub async fn update_note(&self, id: &str, patch: NotePatch) -> Result<String> {
        Ok(self.gate().update_note(id, &patch).await?.to_string())
    }

    pub async fn delete_note(&self, id: &str) -> Result<String> {
        Ok(self.gate().delete_note(id).await?.to_string())
    }

    pub async fn create_folder(&self, draft: FolderDraft) -> Result<String> {
        Ok(self.gate().create_folder(&draft).await?.to_string())
    }

    /// Rename and/or move a notebook; moves are checked for cycles first.
    pub async fn update_folder(&self, id: &str, patch: FolderPatch) -> Result<String> {
        Ok(self.gate().update_folder(id, &patch).await?.to_string())
    }

    pub async fn delete_folder(&self, id: &str) -> Result<String> {
        Ok(self.gate().delete_folder(id).await?.to_string())
    }
}

