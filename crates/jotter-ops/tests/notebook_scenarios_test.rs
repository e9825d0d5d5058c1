//! End-to-end notebook scenarios against the in-memory backend.

use jotter_client::mock::{MockBackend, MockFailure, MockOp};
use jotter_core::{
    CollectionFilter, CycleViolation, Error, ErrorKind, FolderDraft, FolderPatch, FolderRecord,
    ItemKind, ListNotesRequest, NoteDraft, NoteOrder, NotePatch, OrderDir,
};
use jotter_ops::{check_relocation, fetch_all, FolderTree, NotebookService};

const MISSING_ID: &str = "ffffffffffffffffffffffffffffffff";

fn service(backend: &MockBackend) -> NotebookService<MockBackend> {
    NotebookService::new(backend.clone())
}

fn folder_id_from(outcome: &str) -> String {
    let start = outcome.find("notebook_id: \"").expect("outcome names the id") + 14;
    outcome[start..start + 32].to_string()
}

// =============================================================================
// TREE
// =============================================================================

#[tokio::test]
async fn test_tree_visits_every_folder_once() {
    let backend = MockBackend::new();
    let work = backend.insert_folder("Work", None);
    let home = backend.insert_folder("Home", None);
    let projects = backend.insert_folder("Projects", Some(&work));
    backend.insert_folder("Alpha", Some(&projects));
    backend.insert_folder("Garden", Some(&home));

    let folders: Vec<FolderRecord> = fetch_all(
        &backend,
        ItemKind::Folder,
        &CollectionFilter::All,
        &[],
        100,
    )
    .await
    .unwrap();
    let tree = FolderTree::build(folders.clone());

    let mut walked: Vec<&str> = tree.walk().iter().map(|(_, f)| f.id.as_str()).collect();
    let mut all: Vec<&str> = folders.iter().map(|f| f.id.as_str()).collect();
    walked.sort();
    all.sort();
    assert_eq!(walked, all);
}

#[tokio::test]
async fn test_tree_listing_is_idempotent() {
    let backend = MockBackend::new();
    let root = backend.insert_folder("Root", None);
    backend.insert_folder("[1] B", Some(&root));
    backend.insert_folder("Z", Some(&root));
    backend.insert_folder("[0] A", Some(&root));

    let service = service(&backend);
    let first = service.list_notebook_tree().await.unwrap();
    let second = service.list_notebook_tree().await.unwrap();
    assert_eq!(first, second);

    let children: Vec<&str> = first.lines().skip(1).map(str::trim_start).collect();
    assert!(children[0].starts_with("Notebook: \"[0] A\""));
    assert!(children[1].starts_with("Notebook: \"[1] B\""));
    assert!(children[2].starts_with("Notebook: \"Z\""));
}

#[tokio::test]
async fn test_empty_tree_message() {
    let backend = MockBackend::new();
    let text = service(&backend).list_notebook_tree().await.unwrap();
    assert_eq!(text, "No notebooks found.\n");
}

// =============================================================================
// PAGINATION
// =============================================================================

#[tokio::test]
async fn test_fetch_237_folders_across_three_pages() {
    let backend = MockBackend::new();
    let expected: Vec<String> = (0..237)
        .map(|i| backend.insert_folder(&format!("Folder {:03}", i), None))
        .collect();

    let folders: Vec<FolderRecord> = fetch_all(
        &backend,
        ItemKind::Folder,
        &CollectionFilter::All,
        &["id", "title", "parent_id"],
        100,
    )
    .await
    .unwrap();

    let ids: Vec<String> = folders.into_iter().map(|f| f.id).collect();
    assert_eq!(ids, expected);

    let pages: Vec<u32> = backend.calls().iter().filter_map(|c| c.page).collect();
    assert_eq!(pages, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_failed_page_is_an_error_not_a_partial_tree() {
    let backend = MockBackend::new().with_page_size(2);
    for i in 0..5 {
        backend.insert_folder(&format!("F{}", i), None);
    }
    backend.fail_on_page(ItemKind::Folder, 2, MockFailure::Unavailable);

    let err = service(&backend).list_notebook_tree().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
}

// =============================================================================
// RELOCATION
// =============================================================================

#[tokio::test]
async fn test_ancestry_walker_chain() {
    // F -> A -> B -> root
    let backend = MockBackend::new();
    let b = backend.insert_folder("B", None);
    let a = backend.insert_folder("A", Some(&b));
    let f = backend.insert_folder("F", Some(&a));
    let c = backend.insert_folder("C", None);

    let err = check_relocation(&backend, &a, &f).await.unwrap_err();
    assert!(matches!(
        err,
        Error::CircularReference(CycleViolation::Descendant { .. })
    ));

    backend.clear_calls();
    let err = check_relocation(&backend, &f, &f).await.unwrap_err();
    assert!(matches!(
        err,
        Error::CircularReference(CycleViolation::SelfParent { .. })
    ));
    assert!(backend.calls().is_empty());

    check_relocation(&backend, &f, &c).await.unwrap();
}

#[tokio::test]
async fn test_inbox_archive_cycle_is_rejected() {
    let backend = MockBackend::new();
    let service = service(&backend);

    let created = service
        .create_folder(FolderDraft {
            title: "Inbox".into(),
            parent_id: None,
        })
        .await
        .unwrap();
    let inbox = folder_id_from(&created);

    let created = service
        .create_folder(FolderDraft {
            title: "Archive".into(),
            parent_id: Some(inbox.clone()),
        })
        .await
        .unwrap();
    let archive = folder_id_from(&created);
    assert!(created.contains("in notebook \"Inbox\""));

    let writes_before = backend.write_count();
    let err = service
        .update_folder(
            &inbox,
            FolderPatch {
                title: None,
                parent_id: Some(archive.clone()),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CircularReference);
    assert_eq!(backend.write_count(), writes_before);
    assert!(backend.folder(&inbox).unwrap().parent_id.is_none());
}

#[tokio::test]
async fn test_title_only_update_keeps_parent() {
    let backend = MockBackend::new();
    let parent = backend.insert_folder("Parent", None);
    let child = backend.insert_folder("Child", Some(&parent));

    let text = service(&backend)
        .update_folder(
            &child,
            FolderPatch {
                title: Some("Renamed".into()),
                parent_id: None,
            },
        )
        .await
        .unwrap();

    assert!(text.contains("Renamed"));
    let stored = backend.folder(&child).unwrap();
    assert_eq!(stored.title, "Renamed");
    assert_eq!(stored.parent_id.as_deref(), Some(parent.as_str()));
}

#[tokio::test]
async fn test_empty_update_rejected_before_network() {
    let backend = MockBackend::new();
    let folder = backend.insert_folder("A", None);
    let note = backend.insert_note("N", Some(&folder), "");
    let service = service(&backend);

    let err = service
        .update_folder(&folder, FolderPatch::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = service
        .update_note(&note, NotePatch::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_move_to_missing_parent_is_not_found() {
    let backend = MockBackend::new();
    let folder = backend.insert_folder("A", None);

    let err = service(&backend)
        .update_folder(
            &folder,
            FolderPatch {
                title: None,
                parent_id: Some(MISSING_ID.into()),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ParentNotFound(ref id) if id == MISSING_ID));
    assert_eq!(backend.write_count(), 0);
}

// =============================================================================
// NOTES
// =============================================================================

#[tokio::test]
async fn test_read_notebook_lists_children_and_notes() {
    let backend = MockBackend::new();
    let home = backend.insert_folder("Home", None);
    let garden = backend.insert_folder("Garden", Some(&home));
    backend.insert_note("Recipes", Some(&home), "soup");
    backend.insert_note_record(serde_json::json!({
        "title": "Fix fence",
        "parent_id": home,
        "is_todo": 1
    }));

    let text = service(&backend).read_notebook(&home).await.unwrap();
    assert!(text.starts_with(&format!("Notebook: \"Home\" (notebook_id: \"{}\")", home)));
    assert!(text.contains("Location: top level"));
    assert!(text.contains(&garden));
    assert!(text.contains("[ ] Note: \"Fix fence\""));
    assert!(text.contains("Note: \"Recipes\""));
}

#[tokio::test]
async fn test_read_missing_notebook_is_not_found() {
    let backend = MockBackend::new();
    let err = service(&backend).read_notebook(MISSING_ID).await.unwrap_err();
    assert!(matches!(
        err,
        Error::NotFound {
            kind: ItemKind::Folder,
            ..
        }
    ));
}

#[tokio::test]
async fn test_read_note_survives_failed_notebook_lookup() {
    let backend = MockBackend::new();
    let folder = backend.insert_folder("Home", None);
    let note = backend.insert_note("Recipes", Some(&folder), "soup");
    backend.fail_on_id(MockOp::FetchOne, &folder, MockFailure::Status(500));

    let text = service(&backend).read_note(&note).await.unwrap();
    assert!(text.contains(&format!("Notebook ID: {}", folder)));
    assert!(text.ends_with("soup\n"));
}

#[tokio::test]
async fn test_read_notes_reports_missing_and_dedupes() {
    let backend = MockBackend::new();
    let folder = backend.insert_folder("Home", None);
    let a = backend.insert_note("A", Some(&folder), "first");
    let b = backend.insert_note("B", Some(&folder), "second");

    let ids = vec![a.clone(), MISSING_ID.to_string(), b.clone(), a.clone()];
    let text = service(&backend).read_notes(&ids).await.unwrap();

    assert_eq!(text.matches("Note: \"A\"").count(), 1);
    assert!(text.find("Note: \"A\"").unwrap() < text.find("Note: \"B\"").unwrap());
    assert!(text.contains("Not found (1):"));
    assert!(text.contains(MISSING_ID));
    assert!(text.contains("Notebook: \"Home\""));
}

#[tokio::test]
async fn test_read_notes_backend_failure_is_an_error() {
    let backend = MockBackend::new();
    let a = backend.insert_note("A", None, "");
    backend.fail_on(MockOp::FetchOne, MockFailure::Unavailable);

    let err = service(&backend).read_notes(&[a]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
}

#[tokio::test]
async fn test_read_failures_name_the_record() {
    let backend = MockBackend::new();
    let home = backend.insert_folder("Home", None);
    let note = backend.insert_note("Recipes", Some(&home), "soup");
    backend.fail_on_id(MockOp::FetchOne, &note, MockFailure::Status(500));
    backend.fail_on_page(ItemKind::Note, 1, MockFailure::Malformed);

    let err = service(&backend).read_note(&note).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Backend);
    assert!(err.to_string().contains(&note));

    let err = service(&backend).read_notebook(&home).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedResponse);
    assert!(err.to_string().contains(&home));
}

#[tokio::test]
async fn test_list_notes_search_and_order() {
    let backend = MockBackend::new();
    backend.insert_note("Buy milk", None, "groceries");
    backend.insert_note("Buy bread", None, "groceries");
    backend.insert_note("Call Sam", None, "phone");

    let text = service(&backend)
        .list_notes(ListNotesRequest {
            filter: CollectionFilter::Search("groceries".into()),
            order_by: Some(NoteOrder::Title),
            order_dir: Some(OrderDir::Asc),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(text.starts_with("Notes matching \"groceries\" (page 1, 2 shown of 2):"));
    assert!(text.find("Buy bread").unwrap() < text.find("Buy milk").unwrap());
    assert!(!text.contains("Call Sam"));
}

#[tokio::test]
async fn test_list_notes_paging_hint() {
    let backend = MockBackend::new();
    for i in 0..3 {
        backend.insert_note(&format!("N{}", i), None, "");
    }

    let text = service(&backend)
        .list_notes(ListNotesRequest {
            page_size: 2,
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(text.contains("request page 2"));
}

#[tokio::test]
async fn test_list_notes_invalid_request_issues_no_calls() {
    let backend = MockBackend::new();
    let err = service(&backend)
        .list_notes(ListNotesRequest {
            page: 0,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_note_lifecycle() {
    let backend = MockBackend::new();
    let folder = backend.insert_folder("Tasks", None);
    let service = service(&backend);

    let created = service
        .create_note(NoteDraft {
            title: "Pay rent".into(),
            parent_id: Some(folder.clone()),
            todo_due: Some(1_800_000_000_000),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(created.starts_with("Note created: \"Pay rent\""));
    assert!(created.contains("in notebook \"Tasks\""));

    let start = created.find("note_id: \"").unwrap() + 10;
    let id = created[start..start + 32].to_string();
    let stored = backend.note(&id).unwrap();
    assert!(stored.is_todo);
    assert_eq!(stored.todo_due, 1_800_000_000_000);

    let updated = service
        .update_note(
            &id,
            NotePatch {
                todo_completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.contains("changed: todo_completed"));
    let stored = backend.note(&id).unwrap();
    assert!(stored.is_completed());
    assert_eq!(stored.title, "Pay rent");

    let deleted = service.delete_note(&id).await.unwrap();
    assert!(deleted.starts_with("Note deleted: \"Pay rent\""));
    assert!(backend.note(&id).is_none());
}

#[tokio::test]
async fn test_delete_folder_description() {
    let backend = MockBackend::new();
    let folder = backend.insert_folder("Old", None);
    backend.insert_folder("Child", Some(&folder));
    backend.insert_note("N1", Some(&folder), "");
    backend.insert_note("N2", Some(&folder), "");

    let text = service(&backend).delete_folder(&folder).await.unwrap();
    assert!(text.starts_with("Notebook deleted: \"Old\""));
    assert!(text.ends_with("it contained 2 notes and 1 sub-notebook"));
    assert_eq!(backend.call_count(MockOp::Delete), 1);
}
