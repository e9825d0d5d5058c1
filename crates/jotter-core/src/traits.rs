//! Core traits for jotter abstractions.
//!
//! [`NoteBackend`] is the single collaborator every operation talks to. The
//! Data API client implements it over HTTP; the in-memory mock implements it
//! for tests.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::models::{ItemKind, PageQuery, RawPage};

/// CRUD access to the flat folder and note collections.
///
/// Implementations report a missing record as [`Error::NotFound`] and keep
/// "not found" distinguishable from every other failure.
///
/// [`Error::NotFound`]: crate::Error::NotFound
#[async_trait]
pub trait NoteBackend: Send + Sync {
    /// Fetch one record, projected to `fields` (empty = backend default).
    async fn fetch_one(&self, kind: ItemKind, id: &str, fields: &[&str]) -> Result<JsonValue>;

    /// Fetch one page of a collection.
    async fn fetch_page(&self, kind: ItemKind, query: &PageQuery) -> Result<RawPage>;

    /// Create a record and return it as stored.
    async fn create(&self, kind: ItemKind, body: JsonValue) -> Result<JsonValue>;

    /// Update the supplied fields of a record and return it as stored.
    async fn update(&self, kind: ItemKind, id: &str, body: JsonValue) -> Result<JsonValue>;

    /// Delete a record.
    async fn delete(&self, kind: ItemKind, id: &str) -> Result<()>;
}

#[async_trait]
impl<T: NoteBackend + ?Sized> NoteBackend for std::sync::Arc<T> {
    async fn fetch_one(&self, kind: ItemKind, id: &str, fields: &[&str]) -> Result<JsonValue> {
        (**self).fetch_one(kind, id, fields).await
    }

    async fn fetch_page(&self, kind: ItemKind, query: &PageQuery) -> Result<RawPage> {
        (**self).fetch_page(kind, query).await
    }

    async fn create(&self, kind: ItemKind, body: JsonValue) -> Result<JsonValue> {
        (**self).create(kind, body).await
    }

    async fn update(&self, kind: ItemKind, id: &str, body: JsonValue) -> Result<JsonValue> {
        (**self).update(kind, id, body).await
    }

    async fn delete(&self, kind: ItemKind, id: &str) -> Result<()> {
        (**self).delete(kind, id).await
    }
}
