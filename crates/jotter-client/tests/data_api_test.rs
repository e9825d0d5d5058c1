//! Integration tests for the Data API backend against a mock HTTP server.

use jotter_client::{
    CollectionFilter, DataApiBackend, DataApiConfig, Error, ErrorKind, ItemKind, NoteBackend,
    NoteOrder, OrderDir, PageQuery,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FOLDER_ID: &str = "0123456789abcdef0123456789abcdef";

fn backend_for(server: &MockServer, token: Option<&str>) -> DataApiBackend {
    DataApiBackend::new(DataApiConfig {
        base_url: server.uri(),
        token: token.map(str::to_string),
        timeout_seconds: 5,
        page_limit: 100,
    })
    .expect("Failed to create backend")
}

#[tokio::test]
async fn test_fetch_one_sends_projection_and_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/folders/{}", FOLDER_ID)))
        .and(query_param("fields", "id,parent_id"))
        .and(query_param("token", "secret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": FOLDER_ID, "parent_id": ""})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, Some("secret"));
    let value = backend
        .fetch_one(ItemKind::Folder, FOLDER_ID, &["id", "parent_id"])
        .await
        .expect("fetch should succeed");

    assert_eq!(value["id"], FOLDER_ID);
}

#[tokio::test]
async fn test_fetch_one_404_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/notes/{}", FOLDER_ID)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Not Found"})))
        .mount(&server)
        .await;

    let backend = backend_for(&server, None);
    let err = backend
        .fetch_one(ItemKind::Note, FOLDER_ID, &[])
        .await
        .unwrap_err();

    match err {
        Error::NotFound { kind, id } => {
            assert_eq!(kind, ItemKind::Note);
            assert_eq!(id, FOLDER_ID);
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_page_query_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/notes"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "25"))
        .and(query_param("order_by", "updated_time"))
        .and(query_param("order_dir", "DESC"))
        .and(query_param("fields", "id,title"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "a", "title": "A"}, {"id": "b", "title": "B"}],
            "has_more": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, None);
    let mut query = PageQuery::new(CollectionFilter::All, &["id", "title"], 2, 25);
    query.order_by = Some(NoteOrder::UpdatedTime.as_str().to_string());
    query.order_dir = Some(OrderDir::Desc);

    let page = backend.fetch_page(ItemKind::Note, &query).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(page.has_more);
}

#[tokio::test]
async fn test_fetch_page_notes_in_folder() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/folders/{}/notes", FOLDER_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [],
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, None);
    let query = PageQuery::new(CollectionFilter::InFolder(FOLDER_ID.into()), &[], 1, 100);
    let page = backend.fetch_page(ItemKind::Note, &query).await.unwrap();
    assert!(page.items.is_empty());
    assert!(!page.has_more);
}

#[tokio::test]
async fn test_fetch_page_missing_folder_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/folders/{}/notes", FOLDER_ID)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let backend = backend_for(&server, None);
    let query = PageQuery::new(CollectionFilter::InFolder(FOLDER_ID.into()), &[], 1, 100);
    let err = backend.fetch_page(ItemKind::Note, &query).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: ItemKind::Folder, .. }));
}

#[tokio::test]
async fn test_search_uses_search_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "groceries"))
        .and(query_param("type", "note"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "a", "title": "Groceries"}],
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, None);
    let query = PageQuery::new(CollectionFilter::Search("groceries".into()), &[], 1, 10);
    let page = backend.fetch_page(ItemKind::Note, &query).await.unwrap();
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn test_malformed_envelope_is_unexpected_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/folders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": []})))
        .mount(&server)
        .await;

    let backend = backend_for(&server, None);
    let query = PageQuery::new(CollectionFilter::All, &[], 1, 100);
    let err = backend.fetch_page(ItemKind::Folder, &query).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedResponse);
}

#[tokio::test]
async fn test_server_error_is_backend_error() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/folders/{}", FOLDER_ID)))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "database is locked"})),
        )
        .mount(&server)
        .await;

    let backend = backend_for(&server, None);
    let err = backend
        .update(ItemKind::Folder, FOLDER_ID, json!({"title": "x"}))
        .await
        .unwrap_err();

    match err {
        Error::Backend { status, message } => {
            assert_eq!(status, Some(500));
            assert!(message.contains("database is locked"));
        }
        other => panic!("Expected Backend error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_sends_only_supplied_fields() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/folders/{}", FOLDER_ID)))
        .and(body_json(json!({"title": "Renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": FOLDER_ID,
            "title": "Renamed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, None);
    let value = backend
        .update(ItemKind::Folder, FOLDER_ID, json!({"title": "Renamed"}))
        .await
        .unwrap();
    assert_eq!(value["title"], "Renamed");
}

#[tokio::test]
async fn test_create_and_delete() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": FOLDER_ID,
            "title": "New"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("/notes/{}", FOLDER_ID)))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server, None);
    let created = backend
        .create(ItemKind::Note, json!({"title": "New"}))
        .await
        .unwrap();
    assert_eq!(created["id"], FOLDER_ID);

    backend.delete(ItemKind::Note, FOLDER_ID).await.unwrap();
}

#[tokio::test]
async fn test_unreachable_backend_is_unavailable() {
    // Nothing listens on port 9 (discard) in the test environment.
    let backend = DataApiBackend::new(DataApiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_seconds: 2,
        ..Default::default()
    })
    .unwrap();

    let err = backend
        .fetch_one(ItemKind::Folder, FOLDER_ID, &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let backend = backend_for(&server, None);
    assert!(backend.health_check().await.unwrap());
}
