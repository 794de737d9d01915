//! Integration tests for [`HttpBackend`] against an in-process axum server.
//!
//! Verifies envelope decoding, error-body parsing, 404 → not-found mapping,
//! bearer-token propagation and client-side validation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use collab_client::{Backend, ClientError, HttpBackend};
use collab_core::case::{Reaction, Voter};
use collab_core::error::CoreError;
use collab_core::project::NewProject;

#[derive(Clone, Default)]
struct Captured {
    votes: Arc<Mutex<Vec<Value>>>,
}

fn project_json(id: i64) -> Value {
    json!({
        "id": id,
        "title": "Campus navigation app",
        "description": "Indoor routing",
        "team_name": "Pathfinders",
        "meeting_link": null,
        "status": "InWork",
        "semester": 1,
        "year": 2024,
        "tutor_id": 2,
        "tutor_name": "Pavel Smirnov"
    })
}

async fn list_projects() -> Json<Value> {
    Json(json!({
        "data": [{
            "id": 1,
            "title": "Campus navigation app",
            "team_name": "Pathfinders",
            "status": "InWork",
            "semester": 1,
            "year": 2024,
            "tutor_name": null
        }]
    }))
}

async fn get_project(Path(id): Path<i64>) -> impl IntoResponse {
    if id == 1 {
        (StatusCode::OK, Json(json!({ "data": project_json(1) })))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Project not found", "code": "NOT_FOUND" })),
        )
    }
}

async fn vote(
    State(captured): State<Captured>,
    Path(_id): Path<i64>,
    Json(body): Json<Value>,
) -> StatusCode {
    captured.votes.lock().unwrap().push(body);
    StatusCode::NO_CONTENT
}

async fn broken_milestones() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn malformed_applications() -> Json<Value> {
    Json(json!({ "data": "not a list" }))
}

async fn tutors(headers: HeaderMap) -> impl IntoResponse {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "Bearer secret");
    if authorized {
        (StatusCode::OK, Json(json!({ "data": [] })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Missing token", "code": "UNAUTHORIZED" })),
        )
    }
}

/// Start the fake API on an ephemeral port and return its base URL.
async fn spawn_server(captured: Captured) -> String {
    let app = Router::new()
        .route("/api/projects", get(list_projects))
        .route("/api/projects/{id}", get(get_project))
        .route("/api/cases/{id}/votes", post(vote))
        .route("/api/milestones", get(broken_milestones))
        .route("/api/applications", get(malformed_applications))
        .route("/api/users/tutors", get(tutors))
        .with_state(captured);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/")
}

fn backend(url: String, token: Option<&str>) -> HttpBackend {
    HttpBackend::new(url, token.map(str::to_string), Duration::from_secs(5)).unwrap()
}

// ---------------------------------------------------------------------------
// Success paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_unwraps_data_envelope() {
    let api = backend(spawn_server(Captured::default()).await, None);
    let projects = api.list_projects().await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].team_name, "Pathfinders");
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let api = backend(spawn_server(Captured::default()).await, None);
    assert!(!api.api_url().ends_with('/'));
    assert_eq!(api.get_project(1).await.unwrap().id, 1);
}

#[tokio::test]
async fn vote_sends_user_and_reaction() {
    let captured = Captured::default();
    let api = backend(spawn_server(captured.clone()).await, None);

    api.vote_case(3, &Voter::new(9, Some("Dana".to_string())), Reaction::Positive)
        .await
        .unwrap();

    let votes = captured.votes.lock().unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0]["user_id"], 9);
    assert_eq!(votes[0]["reaction"], "Positive");
}

#[tokio::test]
async fn bearer_token_is_sent() {
    let url = spawn_server(Captured::default()).await;
    assert!(backend(url.clone(), Some("secret")).list_tutors().await.is_ok());

    let err = backend(url, None).list_tutors().await.unwrap_err();
    assert_matches!(
        err,
        ClientError::Api { status: 401, ref message } if message == "Missing token"
    );
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_record_maps_to_not_found() {
    let api = backend(spawn_server(Captured::default()).await, None);
    let err = api.get_project(77).await.unwrap_err();
    assert_matches!(
        err,
        ClientError::Core(CoreError::NotFound { entity: "Project", id: 77 })
    );
    assert!(err.is_not_found());
}

#[tokio::test]
async fn non_json_error_body_is_kept_verbatim() {
    let api = backend(spawn_server(Captured::default()).await, None);
    let err = api.list_milestones().await.unwrap_err();
    assert_matches!(err, ClientError::Api { status: 500, ref message } if message == "boom");
}

#[tokio::test]
async fn malformed_payload_is_a_network_error() {
    let api = backend(spawn_server(Captured::default()).await, None);
    let err = api.list_applications().await.unwrap_err();
    assert_matches!(err, ClientError::Network(_));
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = backend(format!("http://{addr}"), None);
    let err = api.list_projects().await.unwrap_err();
    assert_matches!(err, ClientError::Network(_));
}

#[tokio::test]
async fn invalid_payload_never_reaches_the_server() {
    // No server at all: validation must fail before any connection attempt.
    let api = backend("http://127.0.0.1:9".to_string(), None);
    let input = NewProject {
        title: String::new(),
        description: String::new(),
        team_name: "Pathfinders".to_string(),
        meeting_link: None,
        semester: 1,
        year: 2024,
        tutor_id: None,
    };
    let err = api.create_project(&input).await.unwrap_err();
    assert_matches!(err, ClientError::Core(CoreError::Validation(_)));
}
