// Runs HttpProblemService against an in-process axum backend.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use probforge_common::{
    Difficulty, HttpProblemService, ProblemId, ProblemInput, ProblemService, ServiceError, Subject,
};
use serde_json::{Value, json};
use url::Url;

#[derive(Clone, Default)]
struct Backend {
    stored: Arc<Mutex<Vec<Value>>>,
    generated_for: Arc<Mutex<Vec<String>>>,
}

async fn create(State(backend): State<Backend>, Json(body): Json<Value>) -> Json<Value> {
    let mut stored = backend.stored.lock().unwrap();
    stored.push(body);
    Json(json!({
        "id": "0b6c7a52-5d0e-4a77-9d5e-3f1f7d0f2c11",
        "created_at": "2026-10-19T00:00:00Z",
    }))
}

async fn generate(State(backend): State<Backend>, Path(id): Path<String>) -> Json<Value> {
    backend.generated_for.lock().unwrap().push(id);
    Json(json!({
        "content_text": "頂点は $(2,-4)$ である",
        "content_latex": "(2,-4)",
        "solution_text": "平方完成する。",
    }))
}

async fn spawn(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{addr}")).unwrap()
}

fn client(endpoint: Url) -> HttpProblemService {
    HttpProblemService::with_client(reqwest::Client::new(), endpoint)
}

fn sample_input() -> ProblemInput {
    ProblemInput::new(
        "放物線 $y = x^2 - 4x$ の頂点を求めよ",
        Subject::Math,
        Difficulty::new(2).unwrap(),
    )
}

#[tokio::test]
async fn create_then_generate() {
    let backend = Backend::default();
    let router = Router::new()
        .route("/problems/", post(create))
        .route("/problems/{id}/generate", post(generate))
        .with_state(backend.clone());
    let svc = client(spawn(router).await);

    let id = svc.create_problem(&sample_input()).await.unwrap();
    assert_eq!(id.as_str(), "0b6c7a52-5d0e-4a77-9d5e-3f1f7d0f2c11");
    assert_eq!(
        backend.stored.lock().unwrap().as_slice(),
        &[json!({
            "content": "放物線 $y = x^2 - 4x$ の頂点を求めよ",
            "subject": "math",
            "difficulty": 2,
        })]
    );

    let generated = svc.generate_variant(&id).await.unwrap();
    assert_eq!(generated.content, "頂点は $(2,-4)$ である");
    assert_eq!(generated.solution.as_deref(), Some("平方完成する。"));
    assert_eq!(
        backend.generated_for.lock().unwrap().as_slice(),
        &[id.as_str().to_owned()]
    );
}

#[tokio::test]
async fn create_sends_solution_and_parent() {
    let backend = Backend::default();
    let router = Router::new()
        .route("/problems/", post(create))
        .with_state(backend.clone());
    let svc = client(spawn(router).await);

    let input = sample_input()
        .with_solution("平方完成して $(x-2)^2-4$")
        .with_parent(ProblemId::new("7"));
    svc.create_problem(&input).await.unwrap();
    assert_eq!(
        backend.stored.lock().unwrap().as_slice(),
        &[json!({
            "content": "放物線 $y = x^2 - 4x$ の頂点を求めよ",
            "subject": "math",
            "difficulty": 2,
            "solution": "平方完成して $(x-2)^2-4$",
            "parent_id": "7",
        })]
    );
}

#[tokio::test]
async fn error_status_is_reported() {
    let router = Router::new().route(
        "/problems/",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable") }),
    );
    let svc = client(spawn(router).await);

    let err = svc.create_problem(&sample_input()).await.unwrap_err();
    match err {
        ServiceError::Status { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "database unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unusable_body_is_a_decode_error() {
    let router = Router::new().route(
        "/problems/{id}/generate",
        post(|| async { Json(json!({"solution_text": "no problem text"})) }),
    );
    let svc = client(spawn(router).await);

    let err = svc.generate_variant(&ProblemId::new("7")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Decode { .. }), "{err:?}");
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let svc = client(Url::parse(&format!("http://{addr}")).unwrap());
    let err = svc.create_problem(&sample_input()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Transport { .. }), "{err:?}");
}
