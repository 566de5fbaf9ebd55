use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use jot_core::client::ApiClient;
use jot_core::errors::ApiError;
use jot_core::stores::{NoteStore, UserStore};
use jot_core::types::{CreateUserRequest, Note, NoteRequest, User};

#[derive(Clone)]
struct Api {
    notes: Arc<Mutex<Vec<Note>>>,
    users: Arc<Mutex<Vec<User>>>,
    next_id: Arc<AtomicI64>,
}

fn note(id: i64, title: &str, content: &str) -> Note {
    Note {
        id,
        title: title.to_string(),
        content: content.to_string(),
        created_at: Some("2024-05-01T10:00:00".to_string()),
        updated_at: Some("2024-05-01T10:00:00".to_string()),
        user_id: Some(1),
        username: Some("alice".to_string()),
    }
}

impl Api {
    fn seeded() -> Self {
        let users = vec![User {
            id: 1,
            username: "alice".to_string(),
            roles: vec!["ROLE_USER".to_string(), "ROLE_ADMIN".to_string()],
            created_at: Some("2024-01-01T00:00:00".to_string()),
        }];
        Self {
            notes: Arc::new(Mutex::new(vec![
                note(1, "first", "alpha"),
                note(99, "stuck", "cannot delete"),
            ])),
            users: Arc::new(Mutex::new(users)),
            next_id: Arc::new(AtomicI64::new(100)),
        }
    }
}

fn error_body(error: &str, message: &str) -> Json<Value> {
    Json(json!({ "error": error, "message": message, "timestamp": 0 }))
}

type ApiFailure = (StatusCode, Json<Value>);

async fn list_notes(State(api): State<Api>) -> Json<Vec<Note>> {
    Json(api.notes.lock().clone())
}

async fn get_note(
    State(api): State<Api>,
    Path(id): Path<i64>,
) -> Result<Json<Note>, ApiFailure> {
    api.notes
        .lock()
        .iter()
        .find(|n| n.id == id)
        .cloned()
        .map(Json)
        .ok_or((
            StatusCode::NOT_FOUND,
            error_body("Not Found", "note not found"),
        ))
}

async fn create_note(
    State(api): State<Api>,
    Json(req): Json<NoteRequest>,
) -> Result<Json<Note>, ApiFailure> {
    if req.title == "boom" {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body("Error", "title rejected"),
        ));
    }
    let id = api.next_id.fetch_add(1, Ordering::SeqCst);
    let mut created = note(id, &req.title, &req.content);
    // Server-assigned field the client could not have guessed.
    created.username = Some("server".to_string());
    api.notes.lock().push(created.clone());
    Ok(Json(created))
}

async fn update_note(
    State(api): State<Api>,
    Path(id): Path<i64>,
    Json(req): Json<NoteRequest>,
) -> Result<Json<Note>, ApiFailure> {
    let mut notes = api.notes.lock();
    match notes.iter_mut().find(|n| n.id == id) {
        Some(existing) => {
            // Title taken from the request, content left as stored: the
            // client must adopt this echo, not its own input.
            existing.title = req.title;
            existing.updated_at = Some("2024-05-02T09:30:00".to_string());
            Ok(Json(existing.clone()))
        }
        None => Err((
            StatusCode::NOT_FOUND,
            error_body("Not Found", "note not found"),
        )),
    }
}

async fn delete_note(
    State(api): State<Api>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiFailure> {
    if id == 99 {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            error_body("Error", "database unavailable"),
        ));
    }
    let mut notes = api.notes.lock();
    let before = notes.len();
    notes.retain(|n| n.id != id);
    if notes.len() == before {
        return Err((
            StatusCode::NOT_FOUND,
            error_body("Not Found", "note not found"),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_users(State(api): State<Api>) -> Json<Vec<User>> {
    Json(api.users.lock().clone())
}

async fn create_user(
    State(api): State<Api>,
    Json(req): Json<CreateUserRequest>,
) -> Json<User> {
    let created = User {
        id: api.next_id.fetch_add(1, Ordering::SeqCst),
        username: req.username,
        roles: req.roles,
        created_at: Some("2024-05-02T09:30:00".to_string()),
    };
    api.users.lock().push(created.clone());
    Json(created)
}

async fn delete_user(
    State(api): State<Api>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiFailure> {
    let mut users = api.users.lock();
    let before = users.len();
    users.retain(|u| u.id != id);
    if users.len() == before {
        return Err((
            StatusCode::NOT_FOUND,
            error_body("Not Found", "user not found"),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn echo_auth(headers: HeaderMap) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({ "authorization": auth }))
}

async fn spawn_api(api: Api) -> ApiClient {
    let app = Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route(
            "/api/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", axum::routing::delete(delete_user))
        .route("/api/echo-auth", get(echo_auth))
        .with_state(api);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    ApiClient::new(format!("http://{addr}"))
}

#[tokio::test]
async fn bearer_header_follows_the_token_slot() {
    let client = spawn_api(Api::seeded()).await;

    let echoed: Value = client.get("/api/echo-auth").await.unwrap();
    assert_eq!(echoed["authorization"], Value::Null);

    client.auth_token().set("tok-123");
    let echoed: Value = client.get("/api/echo-auth").await.unwrap();
    assert_eq!(echoed["authorization"], json!("Bearer tok-123"));

    client.auth_token().clear();
    let echoed: Value = client.get("/api/echo-auth").await.unwrap();
    assert_eq!(echoed["authorization"], Value::Null);
}

#[tokio::test]
async fn fetch_all_replaces_the_collection() {
    let client = spawn_api(Api::seeded()).await;
    let store = NoteStore::new(client);

    let notes = store.fetch_all().await.unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(store.notes(), notes);
    assert!(!store.loading());
    assert!(store.error().is_none());
}

#[tokio::test]
async fn create_inserts_the_server_record_not_the_input() {
    let client = spawn_api(Api::seeded()).await;
    let store = NoteStore::new(client);
    store.fetch_all().await.unwrap();

    let created = store
        .create(&NoteRequest {
            title: "draft".to_string(),
            content: "body".to_string(),
        })
        .await
        .unwrap();

    // Server-assigned fields made it into the collection, prepended.
    assert!(created.id >= 100);
    assert_eq!(created.username.as_deref(), Some("server"));
    assert_eq!(store.notes().first(), Some(&created));

    // And the server agrees on a refetch.
    let refetched = store.fetch_all().await.unwrap();
    assert!(refetched.contains(&created));
}

#[tokio::test]
async fn failed_create_leaves_the_collection_unchanged() {
    let client = spawn_api(Api::seeded()).await;
    let store = NoteStore::new(client);
    store.fetch_all().await.unwrap();
    let before = store.notes();

    let err = store
        .create(&NoteRequest {
            title: "boom".to_string(),
            content: "body".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Server { status: 500, .. }));
    assert_eq!(store.notes(), before);
    assert_eq!(store.error().as_deref(), Some("title rejected"));
    assert!(!store.loading());
}

#[tokio::test]
async fn update_applies_the_server_echo() {
    let client = spawn_api(Api::seeded()).await;
    let store = NoteStore::new(client);
    store.fetch_all().await.unwrap();

    let updated = store
        .update(
            1,
            &NoteRequest {
                title: "X".to_string(),
                content: "this content is ignored by the server".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "X");
    // The server kept its own content; so must the local record.
    assert_eq!(updated.content, "alpha");
    let local = store.notes().into_iter().find(|n| n.id == 1).unwrap();
    assert_eq!(local, updated);
    assert!(!store.loading());
    assert!(store.error().is_none());
}

#[tokio::test]
async fn failed_remove_leaves_the_collection_intact() {
    let client = spawn_api(Api::seeded()).await;
    let store = NoteStore::new(client);
    store.fetch_all().await.unwrap();
    let before = store.notes();

    let err = store.remove(99).await.unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 500, .. }));
    assert_eq!(store.error().as_deref(), Some("database unavailable"));
    assert_eq!(store.notes(), before);
    assert!(store.notes().iter().any(|n| n.id == 99));
}

#[tokio::test]
async fn successful_remove_drops_the_record() {
    let client = spawn_api(Api::seeded()).await;
    let store = NoteStore::new(client);
    store.fetch_all().await.unwrap();

    store.remove(1).await.unwrap();
    assert!(store.notes().iter().all(|n| n.id != 1));
    assert!(store.error().is_none());
}

#[tokio::test]
async fn fetch_by_id_does_not_touch_the_collection() {
    let client = spawn_api(Api::seeded()).await;
    let store = NoteStore::new(client);

    let fetched = store.fetch_by_id(1).await.unwrap();
    assert_eq!(fetched.title, "first");
    assert!(store.notes().is_empty());

    let err = store.fetch_by_id(12345).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
    assert_eq!(store.error().as_deref(), Some("note not found"));
}

#[tokio::test]
async fn network_failure_uses_the_fallback_message() {
    // Nothing listens here.
    let client = ApiClient::new("http://127.0.0.1:9");
    let store = NoteStore::new(client);

    let err = store.fetch_all().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(store.error().as_deref(), Some("failed to load notes"));
}

#[tokio::test]
async fn user_store_appends_on_create_and_drops_on_remove() {
    let client = spawn_api(Api::seeded()).await;
    let store = UserStore::new(client);
    store.fetch_all().await.unwrap();
    assert_eq!(store.users().len(), 1);

    let created = store
        .create(&CreateUserRequest {
            username: "bob".to_string(),
            password: "hunter22".to_string(),
            roles: vec!["ROLE_USER".to_string()],
        })
        .await
        .unwrap();
    assert_eq!(store.users().last(), Some(&created));

    store.remove(created.id).await.unwrap();
    assert!(store.users().iter().all(|u| u.id != created.id));

    store.reset();
    assert!(store.users().is_empty());
    assert!(store.error().is_none());
    assert!(!store.loading());
}
