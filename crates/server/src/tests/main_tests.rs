use super::*;
use async_trait::async_trait;
use axum::{body, body::Body, http::Request};
use shared::domain::{Submission, ValidSubmission};
use storage::SubmissionStore;
use tower::ServiceExt;

struct UnavailableStore;

#[async_trait]
impl SubmissionStore for UnavailableStore {
    async fn create_submission(&self, _submission: &ValidSubmission) -> anyhow::Result<Submission> {
        Err(anyhow::anyhow!("disk I/O error"))
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("disk I/O error"))
    }
}

async fn test_app() -> (Router, Storage) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let app = app_with_store(Arc::new(storage.clone()), config::DEFAULT_MAX_BODY_BYTES);
    (app, storage)
}

fn app_with_store(store: Arc<dyn SubmissionStore>, max_body_bytes: usize) -> Router {
    build_router(Arc::new(AppState {
        api: ApiContext::new(store),
        max_body_bytes,
    }))
}

fn contact_request(body: impl Into<Body>) -> Request<Body> {
    Request::post(CONTACT_ROUTE)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("request")
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage) = test_app().await;
    let request = Request::get(HEALTH_ROUTE)
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn healthz_is_unavailable_when_storage_is_down() {
    let app = app_with_store(Arc::new(UnavailableStore), 1024);
    let request = Request::get(HEALTH_ROUTE)
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn valid_submission_is_created_and_stored() {
    let (app, storage) = test_app().await;
    let response = app
        .oneshot(contact_request(
            serde_json::json!({
                "name": "Jane Doe",
                "email": "jane@example.com",
                "message": "Hello",
            })
            .to_string(),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let receipt: ContactReceipt = read_json(response).await;
    let stored = storage
        .get_submission(receipt.id)
        .await
        .expect("query")
        .expect("stored");
    assert_eq!(stored.email, "jane@example.com");
    assert_eq!(storage.count_submissions().await.expect("count"), 1);
}

#[tokio::test]
async fn resubmitting_same_content_yields_distinct_ids() {
    let (app, storage) = test_app().await;
    let payload = serde_json::json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "message": "Hello",
    })
    .to_string();

    let first = app
        .clone()
        .oneshot(contact_request(payload.clone()))
        .await
        .expect("first");
    let second = app.oneshot(contact_request(payload)).await.expect("second");
    assert_eq!(first.status(), StatusCode::CREATED);
    assert_eq!(second.status(), StatusCode::CREATED);

    let first: ContactReceipt = read_json(first).await;
    let second: ContactReceipt = read_json(second).await;
    assert_ne!(first.id, second.id);
    assert_eq!(storage.count_submissions().await.expect("count"), 2);
}

#[tokio::test]
async fn invalid_email_posted_directly_is_rejected() {
    let (app, storage) = test_app().await;
    let response = app
        .oneshot(contact_request(
            serde_json::json!({ "name": "Jane", "email": "not-an-email", "message": "Hi" })
                .to_string(),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.message, "email: invalid format");
    assert_eq!(err.fields.len(), 1);
    assert_eq!(err.fields[0].field, "email");
    assert_eq!(storage.count_submissions().await.expect("count"), 0);
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let (app, storage) = test_app().await;
    let response = app
        .oneshot(contact_request("not json"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.fields[0].field, "body");
    assert_eq!(storage.count_submissions().await.expect("count"), 0);
}

#[tokio::test]
async fn non_object_json_is_a_client_error() {
    let (app, _storage) = test_app().await;
    let response = app
        .oneshot(contact_request("[\"Jane\"]"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn storage_failure_returns_server_error_without_details() {
    let app = app_with_store(Arc::new(UnavailableStore), 1024);
    let response = app
        .oneshot(contact_request(
            serde_json::json!({
                "name": "Jane Doe",
                "email": "jane@example.com",
                "message": "Hello",
            })
            .to_string(),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Internal);
    assert!(!err.message.contains("disk"));
}

#[tokio::test]
async fn oversized_body_is_rejected_before_validation() {
    let (_app, storage) = test_app().await;
    let app = app_with_store(Arc::new(storage.clone()), 64);
    let payload = serde_json::json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "message": "x".repeat(256),
    })
    .to_string();
    let response = app
        .oneshot(contact_request(payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::PayloadTooLarge);
    assert_eq!(storage.count_submissions().await.expect("count"), 0);
}

#[tokio::test]
async fn get_on_contact_route_is_not_allowed() {
    let (app, _storage) = test_app().await;
    let request = Request::get(CONTACT_ROUTE)
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
