//! Functional tests for the analyze route, with a mock inference upstream

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ui_analysis_gateway::{
    api::routes::create_router, backend::InferenceClient, config::Settings, AppState,
};

const BOUNDARY: &str = "analyze-test-boundary";

/// Build the application router against the given upstream endpoint
fn test_app(endpoint: &str, api_key: &str, timeout_secs: u64) -> Router {
    let mut settings = Settings::default();
    settings.upstream.endpoint = endpoint.to_string();
    settings.upstream.api_key = api_key.to_string();
    settings.upstream.timeout_secs = timeout_secs;

    let inference = InferenceClient::new(settings.upstream.clone()).unwrap();

    create_router(Arc::new(AppState {
        settings,
        inference,
    }))
}

/// Hand-rolled multipart/form-data body
#[derive(Default)]
struct MultipartBody {
    parts: Vec<u8>,
}

impl MultipartBody {
    fn new() -> Self {
        Self::default()
    }

    fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.parts.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.parts.extend_from_slice(data);
        self.parts.extend_from_slice(b"\r\n");
        self
    }

    fn text(mut self, name: &str, value: &str) -> Self {
        self.parts.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
        self
    }

    fn build(mut self) -> Vec<u8> {
        self.parts
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.parts
    }
}

fn multipart_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze-changes")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn full_body(feedback: &str) -> Vec<u8> {
    MultipartBody::new()
        .file("beforeImage", "before.png", "image/png", b"\x89PNG-before")
        .file("afterImage", "after.png", "image/png", b"\x89PNG-after")
        .text("feedback", feedback)
        .build()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn analysis_object() -> Value {
    json!({
        "summary_section": {
            "key_changes_narrative": "The settings page was reorganized into tabs.",
            "addressed_issues": ["Users could not find the export option"],
            "outstanding_issues": ["Mobile layout still overflows"]
        },
        "feedback_analysis_section": {
            "sentiment_summary": "Mostly negative, focused on navigation.",
            "sentiment_scores": {
                "positive_percent": 10,
                "neutral_percent": 30,
                "negative_percent": 60
            }
        }
    })
}

fn upstream_envelope(content: &str) -> Value {
    json!({
        "id": "chatcmpl-42",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// Mount a mock upstream returning the given content string and build an app
/// pointed at it
async fn app_with_upstream_content(server: &MockServer, content: &str) -> Router {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_envelope(content)))
        .mount(server)
        .await;

    test_app(
        &format!("{}/v1/chat/completions", server.uri()),
        "test-key",
        60,
    )
}

#[tokio::test]
async fn test_liveness() {
    let app = test_app("http://unused.invalid", "key", 60);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"Analysis backend is running!");
}

#[tokio::test]
async fn test_missing_both_images() {
    let app = test_app("http://unused.invalid", "key", 60);
    let body = MultipartBody::new().text("feedback", "{}").build();

    let response = app.oneshot(multipart_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(
        json["error"],
        "Missing required image files ('beforeImage', 'afterImage')"
    );
}

#[tokio::test]
async fn test_missing_one_image() {
    let app = test_app("http://unused.invalid", "key", 60);
    let body = MultipartBody::new()
        .file("beforeImage", "before.png", "image/png", b"png-bytes")
        .text("feedback", "{}")
        .build();

    let response = app.oneshot(multipart_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Missing required image files"));
}

#[tokio::test]
async fn test_json_request_fails_image_check_first() {
    let app = test_app("http://unused.invalid", "key", 60);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analyze-changes")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"some": "feedback"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Missing required image files"));
}

#[tokio::test]
async fn test_missing_feedback() {
    let app = test_app("http://unused.invalid", "key", 60);
    let body = MultipartBody::new()
        .file("beforeImage", "before.png", "image/png", b"a")
        .file("afterImage", "after.png", "image/png", b"b")
        .build();

    let response = app.oneshot(multipart_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(
        json["error"],
        "Missing feedback data (expected in form field 'feedback')"
    );
}

#[tokio::test]
async fn test_malformed_feedback_json() {
    let app = test_app("http://unused.invalid", "key", 60);

    let response = app
        .oneshot(multipart_request(full_body("{not json")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Invalid JSON format in feedback field");
}

#[tokio::test]
async fn test_empty_feedback_accepted() {
    let server = MockServer::start().await;
    let app = app_with_upstream_content(&server, &analysis_object().to_string()).await;

    let response = app
        .oneshot(multipart_request(full_body("{}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["original_feedback"], json!({}));
}

#[tokio::test]
async fn test_missing_credentials() {
    let app = test_app("", "", 60);

    let response = app
        .oneshot(multipart_request(full_body("{}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = response_json(response).await;
    assert_eq!(
        json["error"],
        "Server configuration error: Missing API credentials."
    );
}

#[tokio::test]
async fn test_success_round_trip() {
    let server = MockServer::start().await;

    // The upstream must see bearer auth and both images as data URIs
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_string_contains("data:image/png;base64,"))
        .and(body_string_contains("<UserFeedback>"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(upstream_envelope(&analysis_object().to_string())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = test_app(
        &format!("{}/v1/chat/completions", server.uri()),
        "test-key",
        60,
    );

    let feedback = json!([{"User Name": "A", "Pain Points": "slow"}]);
    let response = app
        .oneshot(multipart_request(full_body(&feedback.to_string())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["analysis"], analysis_object());
    assert_eq!(json["original_feedback"], feedback);
}

#[tokio::test]
async fn test_fenced_upstream_content() {
    let server = MockServer::start().await;
    let fenced = format!("```json\n{}\n```", analysis_object());
    let app = app_with_upstream_content(&server, &fenced).await;

    let response = app
        .oneshot(multipart_request(full_body("{}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["analysis"], analysis_object());
}

#[tokio::test]
async fn test_incomplete_upstream_structure() {
    let server = MockServer::start().await;
    let mut content = analysis_object();
    content["feedback_analysis_section"]["sentiment_scores"]
        .as_object_mut()
        .unwrap()
        .remove("negative_percent");
    let app = app_with_upstream_content(&server, &content.to_string()).await;

    let response = app
        .oneshot(multipart_request(full_body("{}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = response_json(response).await;
    assert_eq!(
        json["error"],
        "Analysis service returned incomplete data structure."
    );
}

#[tokio::test]
async fn test_prose_upstream_content() {
    let server = MockServer::start().await;
    let app = app_with_upstream_content(&server, "I could not compare the screenshots.").await;

    let response = app
        .oneshot(multipart_request(full_body("{}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Analysis service returned invalid data format.");
}

#[tokio::test]
async fn test_upstream_error_status_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let app = test_app(
        &format!("{}/v1/chat/completions", server.uri()),
        "test-key",
        60,
    );

    let response = app
        .oneshot(multipart_request(full_body("{}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = response_json(response).await;
    assert_eq!(
        json["error"],
        "Failed to get analysis from external service."
    );
}

#[tokio::test]
async fn test_upstream_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(upstream_envelope(&analysis_object().to_string()))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    // One-second client timeout against a three-second upstream
    let app = test_app(
        &format!("{}/v1/chat/completions", server.uri()),
        "test-key",
        1,
    );

    let response = app
        .oneshot(multipart_request(full_body("{}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Analysis service timed out.");
}

#[tokio::test]
async fn test_cors_allows_dev_origin() {
    let app = test_app("http://unused.invalid", "key", 60);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap()),
        Some("http://localhost:3000")
    );
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let app = test_app("http://unused.invalid", "key", 60);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("origin", "http://evil.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The request is served, but no allow-origin header is granted
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}
