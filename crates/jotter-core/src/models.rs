//! Core data models for jotter.
//!
//! Records mirror the Data API's wire shape: folders and notes are flat
//! records carrying an optional parent reference, booleans travel as `0/1`
//! integers and timestamps as epoch milliseconds where `0` means unset.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};

// =============================================================================
// RECORD KINDS
// =============================================================================

/// The two record collections exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Folder,
    Note,
}

impl ItemKind {
    /// Path segment of the collection endpoint.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ItemKind::Folder => "folders",
            ItemKind::Note => "notes",
        }
    }

    /// Value of the `type` parameter on the search endpoint.
    pub fn search_type(&self) -> &'static str {
        match self {
            ItemKind::Folder => "folder",
            ItemKind::Note => "note",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.search_type())
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// A folder (notebook). Folders form a forest through `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// `None` for root-level folders.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        serialize_with = "none_as_empty"
    )]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub created_time: i64,
    #[serde(default)]
    pub updated_time: i64,
}

impl FolderRecord {
    /// Key of the sibling group this folder belongs to (empty for roots).
    pub fn parent_key(&self) -> &str {
        self.parent_id.as_deref().unwrap_or("")
    }
}

/// A note or to-do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Containing folder; `None` means the backend's default location.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        serialize_with = "none_as_empty"
    )]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "int_as_bool")]
    pub is_todo: bool,
    /// Completion time in epoch milliseconds, `0` when open.
    #[serde(default)]
    pub todo_completed: i64,
    /// Due time in epoch milliseconds, `0` when unset.
    #[serde(default)]
    pub todo_due: i64,
    #[serde(default)]
    pub created_time: i64,
    #[serde(default)]
    pub updated_time: i64,
}

impl NoteRecord {
    pub fn is_completed(&self) -> bool {
        self.is_todo && self.todo_completed > 0
    }

    pub fn due(&self) -> Option<DateTime<Utc>> {
        millis_to_datetime(self.todo_due)
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        millis_to_datetime(self.todo_completed)
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        millis_to_datetime(self.created_time)
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        millis_to_datetime(self.updated_time)
    }
}

/// Convert an epoch-millisecond field to a timestamp; `0` and negatives are unset.
pub fn millis_to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    if ms <= 0 {
        return None;
    }
    Utc.timestamp_millis_opt(ms).single()
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn none_as_empty<S>(value: &Option<String>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

fn int_as_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrBool {
        Int(i64),
        Bool(bool),
    }

    Ok(match IntOrBool::deserialize(deserializer)? {
        IntOrBool::Int(n) => n != 0,
        IntOrBool::Bool(b) => b,
    })
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Which records of a collection a page request covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CollectionFilter {
    /// Every record of the kind.
    #[default]
    All,
    /// Notes contained in one folder.
    InFolder(String),
    /// Full-text search.
    Search(String),
}

/// Sort direction accepted by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}

impl OrderDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDir::Asc => "ASC",
            OrderDir::Desc => "DESC",
        }
    }
}

impl FromStr for OrderDir {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(OrderDir::Asc),
            "DESC" => Ok(OrderDir::Desc),
            other => Err(Error::validation(format!(
                "order direction must be ASC or DESC, got '{}'",
                other
            ))),
        }
    }
}

/// Sortable note fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteOrder {
    Title,
    CreatedTime,
    UpdatedTime,
    TodoDue,
}

impl NoteOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteOrder::Title => "title",
            NoteOrder::CreatedTime => "created_time",
            NoteOrder::UpdatedTime => "updated_time",
            NoteOrder::TodoDue => "todo_due",
        }
    }
}

impl FromStr for NoteOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "title" => Ok(NoteOrder::Title),
            "created_time" => Ok(NoteOrder::CreatedTime),
            "updated_time" => Ok(NoteOrder::UpdatedTime),
            "todo_due" => Ok(NoteOrder::TodoDue),
            other => Err(Error::validation(format!(
                "cannot order notes by '{}' (use title, created_time, updated_time or todo_due)",
                other
            ))),
        }
    }
}

/// A single page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub filter: CollectionFilter,
    /// Field projection; empty means the backend's default set.
    pub fields: Vec<String>,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    pub order_by: Option<String>,
    pub order_dir: Option<OrderDir>,
}

impl PageQuery {
    pub fn new(filter: CollectionFilter, fields: &[&str], page: u32, limit: u32) -> Self {
        Self {
            filter,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            page,
            limit,
            order_by: None,
            order_dir: None,
        }
    }
}

/// Undecoded page as returned by the backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawPage {
    pub items: Vec<JsonValue>,
    pub has_more: bool,
    pub total: Option<u64>,
}

/// Decoded page of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub total: Option<u64>,
}

impl RawPage {
    /// Decode every item; a missing required field fails the whole page.
    pub fn decode<T: serde::de::DeserializeOwned>(self) -> Result<Page<T>> {
        let items = self
            .items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<T>, _>>()?;
        Ok(Page {
            items,
            has_more: self.has_more,
            total: self.total,
        })
    }
}

/// Request for one page of the note listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListNotesRequest {
    pub filter: CollectionFilter,
    pub page: u32,
    pub page_size: u32,
    pub order_by: Option<NoteOrder>,
    pub order_dir: Option<OrderDir>,
}

impl Default for ListNotesRequest {
    fn default() -> Self {
        Self {
            filter: CollectionFilter::All,
            page: 1,
            page_size: crate::defaults::PAGE_LIMIT,
            order_by: None,
            order_dir: None,
        }
    }
}

// =============================================================================
// WRITE PAYLOADS
// =============================================================================

/// Fields for a new folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderDraft {
    pub title: String,
    pub parent_id: Option<String>,
}

impl FolderDraft {
    pub fn to_body(&self) -> JsonValue {
        let mut body = Map::new();
        body.insert("title".into(), JsonValue::from(self.title.trim()));
        if let Some(parent) = &self.parent_id {
            body.insert("parent_id".into(), JsonValue::from(parent.as_str()));
        }
        JsonValue::Object(body)
    }
}

/// Partial folder update. Only `Some` fields are sent.
///
/// `parent_id: Some("")` moves the folder to the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderPatch {
    pub title: Option<String>,
    pub parent_id: Option<String>,
}

impl FolderPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.parent_id.is_none()
    }

    /// Names of the supplied fields, in wire order.
    pub fn supplied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.parent_id.is_some() {
            fields.push("parent_id");
        }
        fields
    }

    pub fn to_body(&self) -> JsonValue {
        let mut body = Map::new();
        if let Some(title) = &self.title {
            body.insert("title".into(), JsonValue::from(title.trim()));
        }
        if let Some(parent) = &self.parent_id {
            body.insert("parent_id".into(), JsonValue::from(parent.as_str()));
        }
        JsonValue::Object(body)
    }
}

/// Fields for a new note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub body: Option<String>,
    pub parent_id: Option<String>,
    pub is_todo: Option<bool>,
    /// Due time in epoch milliseconds.
    pub todo_due: Option<i64>,
}

impl NoteDraft {
    pub fn to_body(&self) -> JsonValue {
        let mut body = Map::new();
        body.insert("title".into(), JsonValue::from(self.title.trim()));
        if let Some(text) = &self.body {
            body.insert("body".into(), JsonValue::from(text.as_str()));
        }
        if let Some(parent) = &self.parent_id {
            body.insert("parent_id".into(), JsonValue::from(parent.as_str()));
        }
        // A due date implies a to-do.
        let is_todo = self.is_todo.or(self.todo_due.map(|_| true));
        if let Some(is_todo) = is_todo {
            body.insert("is_todo".into(), JsonValue::from(i64::from(is_todo)));
        }
        if let Some(due) = self.todo_due {
            body.insert("todo_due".into(), JsonValue::from(due));
        }
        JsonValue::Object(body)
    }
}

/// Partial note update. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub parent_id: Option<String>,
    pub is_todo: Option<bool>,
    pub todo_completed: Option<bool>,
    /// Due time in epoch milliseconds; `Some(0)` clears it.
    pub todo_due: Option<i64>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self.supplied_fields().is_empty()
    }

    /// Names of the supplied fields, in wire order.
    pub fn supplied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.body.is_some() {
            fields.push("body");
        }
        if self.parent_id.is_some() {
            fields.push("parent_id");
        }
        if self.is_todo.is_some() {
            fields.push("is_todo");
        }
        if self.todo_completed.is_some() {
            fields.push("todo_completed");
        }
        if self.todo_due.is_some() {
            fields.push("todo_due");
        }
        fields
    }

    /// Build the wire body; `completed_at` stamps `todo_completed = Some(true)`.
    pub fn to_body(&self, completed_at: i64) -> JsonValue {
        let mut body = Map::new();
        if let Some(title) = &self.title {
            body.insert("title".into(), JsonValue::from(title.trim()));
        }
        if let Some(text) = &self.body {
            body.insert("body".into(), JsonValue::from(text.as_str()));
        }
        if let Some(parent) = &self.parent_id {
            body.insert("parent_id".into(), JsonValue::from(parent.as_str()));
        }
        if let Some(is_todo) = self.is_todo {
            body.insert("is_todo".into(), JsonValue::from(i64::from(is_todo)));
        }
        if let Some(done) = self.todo_completed {
            let stamp = if done { completed_at } else { 0 };
            body.insert("todo_completed".into(), JsonValue::from(stamp));
        }
        if let Some(due) = self.todo_due {
            body.insert("todo_due".into(), JsonValue::from(due));
        }
        JsonValue::Object(body)
    }
}
