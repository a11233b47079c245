//! HTTP client against an in-process mock backend.
//!
//! The mock mirrors the real backend's quirks: `{"success": false}` bodies,
//! role-scoped 403s, HTML error pages with a 200 status, and records that
//! arrive wrapped in `data`.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gms_client::{ApiError, ClientConfig, CoverLetterApi, HttpCoverLetterApi, RoleDesk};
use gms_core::{Role, SignatureStatus, Stage};
use gms_engine::Rejection;
use serde_json::{json, Value};
use time::macros::datetime;

const TOKEN: &str = "valid-token";

/// Entry IDs with characters that are significant in a URL.
const AWKWARD_IDS: [&str; 5] = ["x?y=1", "e#1", "a/b", "e 1", "50%"];

#[derive(Clone, Default)]
struct Backend {
    rejections: Arc<Mutex<Vec<(String, String)>>>,
    signs: Arc<Mutex<Vec<String>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": "Authentication required" })),
    )
        .into_response()
}

async fn list(headers: HeaderMap, Path(role): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    match role.as_str() {
        "student-affairs" => Json(json!({
            "success": true,
            "data": [
                { "entryId": "e-1", "studentName": "Ada", "stage": "PENDING_STUDENT_AFFAIRS" },
                { "id": "e-2", "coverLetter": { "stage": "FULLY_SIGNED", "isFullySigned": true } }
            ]
        }))
        .into_response(),
        "faculty-secretary" => Json(json!({
            "success": false,
            "message": "Authentication required"
        }))
        .into_response(),
        _ => (
            StatusCode::FORBIDDEN,
            Json(json!({ "success": false, "message": "Access denied for this role" })),
        )
            .into_response(),
    }
}

async fn fetch(headers: HeaderMap, Path((_role, entry_id)): Path<(String, String)>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    match entry_id.as_str() {
        "e-1" => Json(json!({
            "success": true,
            "data": {
                "entryId": "e-1",
                "stage": "PENDING_DEPARTMENT_CHAIR",
                "departmentChairSigned": false
            }
        }))
        .into_response(),
        id if AWKWARD_IDS.contains(&id) => Json(json!({
            "success": true,
            "data": { "entryId": id, "stage": "PENDING_DEPARTMENT_CHAIR" }
        }))
        .into_response(),
        "broken" => (
            [(header::CONTENT_TYPE, "text/html")],
            "<html><body>Gateway login</body></html>",
        )
            .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Cover letter not found" })),
        )
            .into_response(),
    }
}

async fn sign(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path((role, entry_id)): Path<(String, String)>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    backend
        .signs
        .lock()
        .unwrap()
        .push(format!("{} {}", role, entry_id));
    Json(json!({
        "success": true,
        "data": {
            "entryId": entry_id,
            "stage": "PENDING_FACULTY_SECRETARY",
            "departmentChairSigned": true,
            "departmentChairSignedAt": "2025-05-02T10:30:00.000Z"
        }
    }))
    .into_response()
}

async fn reject(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path((_role, entry_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let reason = body["reason"].as_str().unwrap_or_default().to_string();
    backend.rejections.lock().unwrap().push((entry_id, reason));
    Json(json!({ "success": true, "message": "Cover letter rejected" })).into_response()
}

async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/api/{role}/cover-letters", get(list))
        .route("/api/{role}/cover-letters/{entry_id}", get(fetch))
        .route("/api/{role}/cover-letters/{entry_id}/sign", post(sign))
        .route("/api/{role}/cover-letters/{entry_id}/reject", post(reject))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), backend)
}

fn client(base_url: &str, token: Option<&str>) -> HttpCoverLetterApi {
    let mut config = ClientConfig::default();
    config.api.base_url = Some(base_url.to_string());
    config.api.token = token.map(str::to_string);
    config.api.timeout_secs = 5;
    HttpCoverLetterApi::new(&config).unwrap()
}

// ──────────────────────────────────────────────
// Reads
// ──────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn list_is_unwrapped_and_reconciled() {
    let (base, _) = spawn_backend().await;
    let desk = RoleDesk::new(client(&base, Some(TOKEN)), Role::StudentAffairs);

    let letters = desk.list().await.unwrap();
    assert_eq!(letters.len(), 2);
    assert_eq!(letters[0].letter.entry_id.as_deref(), Some("e-1"));
    assert_eq!(
        letters[0].letter.department_chair.status,
        SignatureStatus::Inferred
    );
    assert_eq!(letters[1].letter.entry_id.as_deref(), Some("e-2"));
    assert!(letters[1].letter.is_fully_signed());
}

#[tokio::test(flavor = "multi_thread")]
async fn wrong_token_is_unauthenticated() {
    let (base, _) = spawn_backend().await;
    let api = client(&base, Some("expired"));
    let err = api.list(Role::StudentAffairs).await.unwrap_err();
    assert!(err.requires_login());
}

#[tokio::test(flavor = "multi_thread")]
async fn success_false_with_200_is_unauthenticated() {
    let (base, _) = spawn_backend().await;
    let api = client(&base, Some(TOKEN));
    let err = api.list(Role::FacultySecretary).await.unwrap_err();
    assert!(err.requires_login());
}

#[tokio::test(flavor = "multi_thread")]
async fn other_role_is_forbidden() {
    let (base, _) = spawn_backend().await;
    let api = client(&base, Some(TOKEN));
    let err = api.list(Role::DepartmentChair).await.unwrap_err();
    match err {
        ApiError::Forbidden { message } => assert_eq!(message, "Access denied for this role"),
        other => panic!("expected Forbidden, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_entry_is_not_found() {
    let (base, _) = spawn_backend().await;
    let desk = RoleDesk::new(client(&base, Some(TOKEN)), Role::DepartmentChair);
    let err = desk.show("missing").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn html_with_200_is_malformed() {
    let (base, _) = spawn_backend().await;
    let desk = RoleDesk::new(client(&base, Some(TOKEN)), Role::DepartmentChair);
    let err = desk.show("broken").await.unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_backend_is_a_retryable_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let api = client(&base, Some(TOKEN));
    let err = api.list(Role::StudentAffairs).await.unwrap_err();
    assert!(err.is_retryable(), "got {:?}", err);
}

#[tokio::test(flavor = "multi_thread")]
async fn entry_ids_reach_the_backend_intact() {
    let (base, _) = spawn_backend().await;
    let api = client(&base, Some(TOKEN));
    for id in AWKWARD_IDS {
        let body = api
            .fetch(Role::DepartmentChair, id)
            .await
            .unwrap_or_else(|e| panic!("{}: {:?}", id, e));
        assert_eq!(body["data"]["entryId"], id);
    }
}

// ──────────────────────────────────────────────
// Actions
// ──────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn show_then_sign_round_trips_through_backend() {
    let (base, backend) = spawn_backend().await;
    let desk = RoleDesk::new(client(&base, Some(TOKEN)), Role::DepartmentChair);

    let shown = desk.show("e-1").await.unwrap();
    assert_eq!(shown.letter.stage, Some(Stage::PendingDepartmentChair));

    let outcome = desk
        .sign(&shown.letter, "Prof. Aydin", datetime!(2025-05-02 10:30 UTC))
        .await
        .unwrap();
    let confirmed = outcome.confirmed.expect("backend returned the record");
    assert_eq!(confirmed.letter.stage, Some(Stage::PendingFacultySecretary));
    assert!(confirmed.letter.department_chair.is_confirmed());
    assert_eq!(
        backend.signs.lock().unwrap().clone(),
        vec!["department-chair e-1".to_string()]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn sign_posts_to_the_encoded_entry() {
    let (base, backend) = spawn_backend().await;
    let desk = RoleDesk::new(client(&base, Some(TOKEN)), Role::DepartmentChair);

    let shown = desk.show("x?y=1").await.unwrap();
    assert_eq!(shown.letter.entry_id.as_deref(), Some("x?y=1"));
    desk.sign(&shown.letter, "Prof. Aydin", datetime!(2025-05-02 10:30 UTC))
        .await
        .unwrap();
    assert_eq!(
        backend.signs.lock().unwrap().clone(),
        vec!["department-chair x?y=1".to_string()]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn out_of_turn_sign_never_reaches_backend() {
    let (base, backend) = spawn_backend().await;
    let desk = RoleDesk::new(client(&base, Some(TOKEN)), Role::StudentAffairs);

    let shown = desk.show("e-1").await.unwrap();
    let err = desk
        .sign(&shown.letter, "Office", datetime!(2025-05-04 15:45 UTC))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Rejected(Rejection::WrongStage { .. })
    ));
    assert!(backend.signs.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn reject_posts_the_reason() {
    let (base, backend) = spawn_backend().await;
    let desk = RoleDesk::new(client(&base, Some(TOKEN)), Role::DepartmentChair);

    let shown = desk.show("e-1").await.unwrap();
    let returned = desk
        .reject(&shown.letter, "GPA does not match transcript")
        .await
        .unwrap();
    assert!(returned.is_none());
    assert_eq!(
        backend.rejections.lock().unwrap().clone(),
        vec![(
            "e-1".to_string(),
            "GPA does not match transcript".to_string()
        )]
    );
}
