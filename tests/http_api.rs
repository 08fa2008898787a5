use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use diary_client::api::{ApiError, HttpNotesApi, NotesApi, Operation};
use diary_client::diary_entry::{DiaryEntry, EntryId, EntryPayload, EntryStatus};
use diary_client::diary_state::DiaryState;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Store {
    notes: Vec<DiaryEntry>,
    next_id: EntryId,
}

type Shared = Arc<Mutex<Store>>;
type Rejection = (StatusCode, Json<Value>);

fn not_found() -> Rejection {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "detail": "Note not found" })),
    )
}

async fn list_notes(State(store): State<Shared>) -> Json<Vec<DiaryEntry>> {
    Json(store.lock().unwrap().notes.clone())
}

async fn create_note(
    State(store): State<Shared>,
    Json(payload): Json<EntryPayload>,
) -> Json<DiaryEntry> {
    let mut store = store.lock().unwrap();
    store.next_id += 1;
    let note = DiaryEntry {
        id: store.next_id,
        created_at: "2025-03-03".to_string(),
        content: payload.content,
        status: payload.status,
    };
    store.notes.push(note.clone());
    Json(note)
}

async fn update_note(
    State(store): State<Shared>,
    Path(id): Path<EntryId>,
    Json(payload): Json<EntryPayload>,
) -> Result<Json<DiaryEntry>, Rejection> {
    let mut store = store.lock().unwrap();
    let note = store
        .notes
        .iter_mut()
        .find(|n| n.id == id)
        .ok_or_else(not_found)?;
    note.content = payload.content;
    note.status = payload.status;
    Ok(Json(note.clone()))
}

async fn delete_note(
    State(store): State<Shared>,
    Path(id): Path<EntryId>,
) -> Result<Json<Value>, Rejection> {
    let mut store = store.lock().unwrap();
    let before = store.notes.len();
    store.notes.retain(|n| n.id != id);
    if store.notes.len() == before {
        return Err(not_found());
    }
    Ok(Json(json!({ "message": "Note deleted", "id": id })))
}

fn notes_router() -> Router {
    Router::new()
        .route("/notes/", get(list_notes).post(create_note))
        .route("/notes/:id", put(update_note).delete(delete_note))
        .with_state(Shared::default())
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn client_for(base_url: &str) -> HttpNotesApi {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpNotesApi::with_client(base_url, http)
}

#[tokio::test]
async fn crud_against_notes_resource() {
    let api = client_for(&spawn(notes_router()).await);

    assert!(api.list().await.unwrap().is_empty());

    let first = api.create("first entry").await.unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(first.status, EntryStatus::Active);
    assert_eq!(first.content, "first entry");
    let second = api.create("second entry").await.unwrap();

    let listed: Vec<EntryId> = api.list().await.unwrap().iter().map(|n| n.id).collect();
    assert_eq!(listed, vec![first.id, second.id]);

    let updated = api
        .update(first.id, "first entry, revised", EntryStatus::Completed)
        .await
        .unwrap();
    assert_eq!(updated.content, "first entry, revised");
    assert_eq!(updated.status, EntryStatus::Completed);
    assert_eq!(updated.created_at, first.created_at);

    api.delete(second.id).await.unwrap();
    let remaining = api.list().await.unwrap();
    assert_eq!(remaining, vec![updated]);
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_tolerated() {
    let base = spawn(notes_router()).await;
    let api = client_for(&format!("{base}/"));
    api.create("hello").await.unwrap();
    assert_eq!(api.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_note_reports_backend_detail() {
    let api = client_for(&spawn(notes_router()).await);

    let err = api
        .update(99, "ghost", EntryStatus::Active)
        .await
        .unwrap_err();
    match &err {
        ApiError::Status {
            operation,
            status,
            detail,
        } => {
            assert_eq!(*operation, Operation::Update);
            assert_eq!(*status, reqwest::StatusCode::NOT_FOUND);
            assert_eq!(detail.as_deref(), Some("Note not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "Failed to update note: 404 Not Found (Note not found)"
    );

    let err = api.delete(99).await.unwrap_err();
    assert_eq!(err.operation(), Some(Operation::Delete));
}

#[tokio::test]
async fn server_errors_fail_every_operation() {
    let broken = Router::new().fallback(|| async {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    });
    let api = client_for(&spawn(broken).await);

    let err = api.list().await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch notes: 500 Internal Server Error");
    assert!(api.create("x").await.is_err());
    assert!(api.update(1, "x", EntryStatus::Active).await.is_err());
    assert!(api.delete(1).await.is_err());
}

#[tokio::test]
async fn listing_survives_a_row_with_an_unknown_status() {
    let mixed = Router::new().route(
        "/notes/",
        get(|| async {
            Json(json!([
                { "id": 1, "created_at": "2025-03-03", "content": "fine", "status": "active" },
                { "id": 2, "created_at": "2025-03-03", "content": "odd", "status": "archived" },
            ]))
        }),
    );
    let api = client_for(&spawn(mixed).await);

    let notes = api.list().await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].content, "fine");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client_for(&format!("http://{addr}"));
    let err = api.list().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Transport {
            operation: Operation::Fetch,
            ..
        }
    ));
    assert!(err.to_string().starts_with("Failed to fetch notes: "));
}

#[tokio::test]
async fn controller_reconciles_with_http_backend() {
    let api = client_for(&spawn(notes_router()).await);
    api.create("older").await.unwrap();

    let mut diary = DiaryState::new();
    assert!(diary.load(&api).await);
    assert!(diary.add_entry(&api, "newer").await);
    let contents: Vec<&str> = diary
        .get_entries()
        .iter()
        .map(|e| e.content.as_str())
        .collect();
    assert_eq!(contents, vec!["newer", "older"]);

    let newest = diary.get_entries()[0].id;
    assert!(diary.toggle_status(&api, newest).await);
    assert!(diary.get(newest).unwrap().is_completed());

    assert!(diary.delete_entry(&api, newest).await);
    assert_eq!(diary.get_entries().len(), 1);
    assert_eq!(api.list().await.unwrap().len(), 1);

    let raised = diary.take_notifications();
    assert!(raised.iter().all(|n| !n.is_error()));
}
