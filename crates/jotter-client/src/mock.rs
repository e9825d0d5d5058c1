//! In-memory backend for deterministic testing.
//!
//! [`MockBackend`] keeps folders and notes as JSON records in insertion
//! order, honours projections, filters, ordering and pagination like the
//! Data API, and logs every call so tests can assert how many requests an
//! operation issued.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jotter_client::mock::{MockBackend, MockOp};
//!
//! let backend = MockBackend::new();
//! let inbox = backend.insert_folder("Inbox", None);
//! let archive = backend.insert_folder("Archive", Some(&inbox));
//! assert_eq!(backend.folder(&archive).unwrap().parent_id.as_deref(), Some(inbox.as_str()));
//! assert_eq!(backend.call_count(MockOp::FetchOne), 0);
//! ```

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value as JsonValue};

use jotter_core::{
    CollectionFilter, Error, FolderRecord, ItemKind, NoteBackend, NoteRecord, OrderDir, PageQuery,
    RawPage, Result,
};

/// Timestamp assigned to the first write; each write advances it by one second.
const EPOCH_MS: i64 = 1_700_000_000_000;

/// Backend operations, as recorded in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    FetchOne,
    FetchPage,
    Create,
    Update,
    Delete,
}

impl MockOp {
    pub fn is_write(&self) -> bool {
        matches!(self, MockOp::Create | MockOp::Update | MockOp::Delete)
    }
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub op: MockOp,
    pub kind: ItemKind,
    pub id: Option<String>,
    pub page: Option<u32>,
    /// Requested projection; empty for writes.
    pub fields: Vec<String>,
    pub body: Option<JsonValue>,
}

/// Failure to inject into matching calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Connection refused.
    Unavailable,
    /// Backend rejected the request with this status.
    Status(u16),
    /// The call succeeds and is applied, but every returned record lacks `id`.
    Malformed,
}

impl MockFailure {
    /// The error a failing call returns; `None` when the call still succeeds.
    fn to_error(self) -> Option<Error> {
        match self {
            MockFailure::Unavailable => Some(Error::BackendUnavailable(
                "connection refused (mock)".to_string(),
            )),
            MockFailure::Status(status) => Some(Error::Backend {
                status: Some(status),
                message: "rejected by mock".to_string(),
            }),
            MockFailure::Malformed => None,
        }
    }
}

/// Response shaping for a call that was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Intact,
    WithoutId,
}

impl Reply {
    fn shape(self, mut record: JsonValue) -> JsonValue {
        if self == Reply::WithoutId {
            if let Some(map) = record.as_object_mut() {
                map.remove("id");
            }
        }
        record
    }
}

#[derive(Debug, Clone)]
struct FailureRule {
    op: MockOp,
    kind: Option<ItemKind>,
    id: Option<String>,
    page: Option<u32>,
    failure: MockFailure,
}

impl FailureRule {
    fn matches(&self, call: &MockCall) -> bool {
        self.op == call.op
            && self.kind.map_or(true, |k| k == call.kind)
            && self.id.as_ref().map_or(true, |id| call.id.as_ref() == Some(id))
            && self.page.map_or(true, |p| call.page == Some(p))
    }
}

#[derive(Debug, Default)]
struct MockState {
    folders: Vec<JsonValue>,
    notes: Vec<JsonValue>,
    calls: Vec<MockCall>,
    failures: Vec<FailureRule>,
    clock: i64,
    page_size_cap: Option<u32>,
}

impl MockState {
    fn store(&self, kind: ItemKind) -> &Vec<JsonValue> {
        match kind {
            ItemKind::Folder => &self.folders,
            ItemKind::Note => &self.notes,
        }
    }

    fn store_mut(&mut self, kind: ItemKind) -> &mut Vec<JsonValue> {
        match kind {
            ItemKind::Folder => &mut self.folders,
            ItemKind::Note => &mut self.notes,
        }
    }

    fn position(&self, kind: ItemKind, id: &str) -> Option<usize> {
        self.store(kind).iter().position(|r| r["id"] == id)
    }

    fn tick(&mut self) -> i64 {
        self.clock += 1_000;
        EPOCH_MS + self.clock
    }

    /// Log the call, fail it if a rule says so, and pick the reply shape.
    fn record(&mut self, call: MockCall) -> Result<Reply> {
        let failure = self
            .failures
            .iter()
            .find(|rule| rule.matches(&call))
            .map(|rule| rule.failure);
        self.calls.push(call);
        match failure {
            None => Ok(Reply::Intact),
            Some(failure) => match failure.to_error() {
                Some(err) => Err(err),
                None => Ok(Reply::WithoutId),
            },
        }
    }
}

/// In-memory [`NoteBackend`].
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the page size regardless of the requested limit.
    pub fn with_page_size(self, size: u32) -> Self {
        self.state.lock().unwrap().page_size_cap = Some(size);
        self
    }

    // ------------------------------------------------------------------
    // Seeding (not logged)
    // ------------------------------------------------------------------

    /// Insert a folder directly and return its id.
    pub fn insert_folder(&self, title: &str, parent_id: Option<&str>) -> String {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        let id = new_id();
        state.folders.push(json!({
            "id": id,
            "title": title,
            "parent_id": parent_id.unwrap_or(""),
            "created_time": now,
            "updated_time": now,
        }));
        id
    }

    /// Insert a note directly and return its id.
    pub fn insert_note(&self, title: &str, parent_id: Option<&str>, body: &str) -> String {
        self.insert_note_record(json!({
            "title": title,
            "parent_id": parent_id.unwrap_or(""),
            "body": body,
        }))
    }

    /// Insert a note from raw fields (missing fields get defaults) and return its id.
    pub fn insert_note_record(&self, fields: JsonValue) -> String {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        let id = new_id();
        let mut record = note_defaults(&id, now);
        merge(&mut record, &fields);
        state.notes.push(record);
        id
    }

    /// Overwrite a folder's parent without any checks (for corrupt-data scenarios).
    pub fn set_parent_raw(&self, folder_id: &str, parent_id: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(pos) = state.position(ItemKind::Folder, folder_id) {
            state.folders[pos]["parent_id"] = JsonValue::from(parent_id);
        }
    }

    /// Insert an arbitrary raw record (for malformed-payload scenarios).
    pub fn insert_raw(&self, kind: ItemKind, record: JsonValue) {
        self.state.lock().unwrap().store_mut(kind).push(record);
    }

    // ------------------------------------------------------------------
    // Failure injection
    // ------------------------------------------------------------------

    /// Fail every call of `op`.
    pub fn fail_on(&self, op: MockOp, failure: MockFailure) {
        self.push_rule(op, None, None, None, failure);
    }

    /// Fail calls of `op` addressing record `id`.
    pub fn fail_on_id(&self, op: MockOp, id: &str, failure: MockFailure) {
        self.push_rule(op, None, Some(id.to_string()), None, failure);
    }

    /// Fail page `page` of collection `kind`.
    pub fn fail_on_page(&self, kind: ItemKind, page: u32, failure: MockFailure) {
        self.push_rule(MockOp::FetchPage, Some(kind), None, Some(page), failure);
    }

    fn push_rule(
        &self,
        op: MockOp,
        kind: Option<ItemKind>,
        id: Option<String>,
        page: Option<u32>,
        failure: MockFailure,
    ) {
        self.state.lock().unwrap().failures.push(FailureRule {
            op,
            kind,
            id,
            page,
            failure,
        });
    }

    /// Remove every injected failure.
    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    // ------------------------------------------------------------------
    // Inspection (not logged)
    // ------------------------------------------------------------------

    pub fn folder(&self, id: &str) -> Option<FolderRecord> {
        self.raw(ItemKind::Folder, id)
            .and_then(|v| serde_json::from_value(v).ok())
    }

    pub fn note(&self, id: &str) -> Option<NoteRecord> {
        self.raw(ItemKind::Note, id)
            .and_then(|v| serde_json::from_value(v).ok())
    }

    fn raw(&self, kind: ItemKind, id: &str) -> Option<JsonValue> {
        let state = self.state.lock().unwrap();
        state
            .position(kind, id)
            .map(|pos| state.store(kind)[pos].clone())
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear()
    }

    /// Number of logged calls of `op`.
    pub fn call_count(&self, op: MockOp) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.op == op)
            .count()
    }

    /// Number of logged create/update/delete calls.
    pub fn write_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.op.is_write())
            .count()
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn note_defaults(id: &str, now: i64) -> JsonValue {
    json!({
        "id": id,
        "title": "",
        "body": "",
        "parent_id": "",
        "is_todo": 0,
        "todo_completed": 0,
        "todo_due": 0,
        "created_time": now,
        "updated_time": now,
    })
}

fn folder_defaults(id: &str, now: i64) -> JsonValue {
    json!({
        "id": id,
        "title": "",
        "parent_id": "",
        "created_time": now,
        "updated_time": now,
    })
}

fn merge(record: &mut JsonValue, fields: &JsonValue) {
    if let (Some(target), Some(source)) = (record.as_object_mut(), fields.as_object()) {
        for (key, value) in source {
            if key != "id" {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

fn project(record: &JsonValue, fields: &[&str]) -> JsonValue {
    if fields.is_empty() {
        return record.clone();
    }
    let mut projected = Map::new();
    for field in fields {
        if let Some(value) = record.get(*field) {
            projected.insert(field.to_string(), value.clone());
        }
    }
    JsonValue::Object(projected)
}

fn compare_field(a: &JsonValue, b: &JsonValue, field: &str) -> Ordering {
    match (&a[field], &b[field]) {
        (JsonValue::Number(x), JsonValue::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (x, y) => x.as_str().unwrap_or("").cmp(y.as_str().unwrap_or("")),
    }
}

fn matches_search(record: &JsonValue, text: &str) -> bool {
    let needle = text.to_lowercase();
    ["title", "body"].iter().any(|field| {
        record[*field]
            .as_str()
            .is_some_and(|value| value.to_lowercase().contains(&needle))
    })
}

#[async_trait]
impl NoteBackend for MockBackend {
    async fn fetch_one(&self, kind: ItemKind, id: &str, fields: &[&str]) -> Result<JsonValue> {
        let mut state = self.state.lock().unwrap();
        let reply = state.record(MockCall {
            op: MockOp::FetchOne,
            kind,
            id: Some(id.to_string()),
            page: None,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            body: None,
        })?;
        let pos = state
            .position(kind, id)
            .ok_or_else(|| Error::not_found(kind, id))?;
        Ok(reply.shape(project(&state.store(kind)[pos], fields)))
    }

    async fn fetch_page(&self, kind: ItemKind, query: &PageQuery) -> Result<RawPage> {
        let mut state = self.state.lock().unwrap();
        let reply = state.record(MockCall {
            op: MockOp::FetchPage,
            kind,
            id: None,
            page: Some(query.page),
            fields: query.fields.clone(),
            body: None,
        })?;

        let mut matching: Vec<&JsonValue> = match &query.filter {
            CollectionFilter::All => state.store(kind).iter().collect(),
            CollectionFilter::InFolder(folder_id) => {
                if state.position(ItemKind::Folder, folder_id).is_none() {
                    return Err(Error::not_found(ItemKind::Folder, folder_id.clone()));
                }
                state
                    .store(kind)
                    .iter()
                    .filter(|r| r["parent_id"] == folder_id.as_str())
                    .collect()
            }
            CollectionFilter::Search(text) => state
                .store(kind)
                .iter()
                .filter(|r| matches_search(r, text))
                .collect(),
        };

        if let Some(order_by) = &query.order_by {
            matching.sort_by(|a, b| compare_field(a, b, order_by));
            if query.order_dir == Some(OrderDir::Desc) {
                matching.reverse();
            }
        }

        let limit = match state.page_size_cap {
            Some(cap) => query.limit.min(cap),
            None => query.limit,
        }
        .max(1) as usize;
        let start = (query.page.max(1) as usize - 1) * limit;
        let end = (start + limit).min(matching.len());
        let fields: Vec<&str> = query.fields.iter().map(String::as_str).collect();

        let items = matching
            .get(start..end)
            .unwrap_or(&[])
            .iter()
            .map(|r| reply.shape(project(r, &fields)))
            .collect();

        Ok(RawPage {
            items,
            has_more: end < matching.len(),
            total: (kind == ItemKind::Note).then_some(matching.len() as u64),
        })
    }

    async fn create(&self, kind: ItemKind, body: JsonValue) -> Result<JsonValue> {
        let mut state = self.state.lock().unwrap();
        let reply = state.record(MockCall {
            op: MockOp::Create,
            kind,
            id: None,
            page: None,
            fields: Vec::new(),
            body: Some(body.clone()),
        })?;
        let now = state.tick();
        let id = new_id();
        let mut record = match kind {
            ItemKind::Folder => folder_defaults(&id, now),
            ItemKind::Note => note_defaults(&id, now),
        };
        merge(&mut record, &body);
        state.store_mut(kind).push(record.clone());
        Ok(reply.shape(record))
    }

    async fn update(&self, kind: ItemKind, id: &str, body: JsonValue) -> Result<JsonValue> {
        let mut state = self.state.lock().unwrap();
        let reply = state.record(MockCall {
            op: MockOp::Update,
            kind,
            id: Some(id.to_string()),
            page: None,
            fields: Vec::new(),
            body: Some(body.clone()),
        })?;
        let pos = state
            .position(kind, id)
            .ok_or_else(|| Error::not_found(kind, id))?;
        let now = state.tick();
        let record = &mut state.store_mut(kind)[pos];
        merge(record, &body);
        record["updated_time"] = JsonValue::from(now);
        Ok(reply.shape(record.clone()))
    }

    async fn delete(&self, kind: ItemKind, id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.record(MockCall {
            op: MockOp::Delete,
            kind,
            id: Some(id.to_string()),
            page: None,
            fields: Vec::new(),
            body: None,
        })?;
        let pos = state
            .position(kind, id)
            .ok_or_else(|| Error::not_found(kind, id))?;
        state.store_mut(kind).remove(pos);
        Ok(())
    }
}
