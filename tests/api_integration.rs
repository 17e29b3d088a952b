//! HTTP API integration tests
//!
//! Drive the full router in-process against the memory backend.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use ara_template_service::config::Settings;
use ara_template_service::server::{create_app, AppState};

fn app_with(settings: Settings) -> Router {
    create_app(AppState::in_memory(settings))
}

fn app() -> Router {
    app_with(Settings::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_with_key(app, method, uri, body, None).await
}

async fn send_with_key(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    api_key: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    (status, value)
}

#[tokio::test]
async fn test_save_get_and_list() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/templates/welcome",
        Some(json!({"body": "Hello {{name}}, welcome to {{ place }}"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["outcome"], "created");
    assert_eq!(body["message"], "Template 'welcome' saved successfully.");

    let (status, body) = send(&app, Method::GET, "/api/v1/templates/welcome", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "welcome");
    assert_eq!(body["variables"], json!(["name", "place"]));

    let (status, body) = send(&app, Method::GET, "/api/v1/templates", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_overwrite_returns_ok() {
    let app = app();
    let uri = "/api/v1/templates/reminder";

    send(&app, Method::PUT, uri, Some(json!({"body": "v1"}))).await;
    let (status, body) = send(&app, Method::PUT, uri, Some(json!({"body": "v2"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "updated");
    assert_eq!(body["message"], "Template 'reminder' updated successfully.");

    let (_, body) = send(&app, Method::GET, uri, None).await;
    assert_eq!(body["body"], "v2");
}

#[tokio::test]
async fn test_empty_body_rejected() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/templates/empty",
        Some(json!({"body": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_BODY");
}

#[tokio::test]
async fn test_missing_template_is_404() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/v1/templates/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "TEMPLATE_NOT_FOUND");

    let (status, _) = send(&app, Method::DELETE, "/api/v1/templates/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_render_stored_template() {
    let app = app();
    send(
        &app,
        Method::PUT,
        "/api/v1/templates/order",
        Some(json!({"body": "Order {{id}} for {{name}} ships {{date}}"})),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/templates/order/render",
        Some(json!({"variables": {"id": 42, "name": "Ana", "extra": "ignored"}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"], "Order 42 for Ana ships {{date}}");
    assert_eq!(body["variables"], json!(["date", "id", "name"]));
    assert_eq!(body["missing"], json!(["date"]));
}

#[tokio::test]
async fn test_render_rejects_non_object_variables() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/render",
        Some(json!({"body": "{{a}}", "variables": ["a"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_VARIABLES");
}

#[tokio::test]
async fn test_strict_render_reports_missing() {
    let mut settings = Settings::default();
    settings.render.strict = true;
    let app = app_with(settings);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/render",
        Some(json!({"body": "Hi {{name}}", "variables": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "MISSING_VARIABLES");
}

#[tokio::test]
async fn test_ad_hoc_variables_and_render() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/variables",
        Some(json!({"body": "{{b}} {{a}} {{ b }}"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["variables"], json!(["a", "b"]));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/render",
        Some(json!({"body": "{{a}}{{b}}", "variables": {"a": "{{b}}", "b": "x"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"], "{{b}}x");
}

#[tokio::test]
async fn test_template_variables_endpoint() {
    let app = app();
    send(
        &app,
        Method::PUT,
        "/api/v1/templates/invoice",
        Some(json!({"body": "Invoice {{number}} due {{due}}"})),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/api/v1/templates/invoice/variables", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["variables"], json!(["due", "number"]));
}

#[tokio::test]
async fn test_delete_template() {
    let app = app();
    let uri = "/api/v1/templates/temp";
    send(&app, Method::PUT, uri, Some(json!({"body": "x"}))).await;

    let (status, _) = send(&app, Method::DELETE, uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_import_export() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/templates/import",
        Some(json!({"values": [
            ["Name", "Template"],
            ["welcome", "Hello {{name}}"],
            ["bye", "Bye {{name}}"]
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"created": 2, "updated": 0}));

    let (status, body) = send(&app, Method::GET, "/api/v1/templates/export", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["values"],
        json!([
            ["name", "template"],
            ["welcome", "Hello {{name}}"],
            ["bye", "Bye {{name}}"]
        ])
    );

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/templates/import",
        Some(json!({"values": [["Name", "Template"]]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh() {
    let app = app();
    let (status, _) = send(&app, Method::POST, "/api/v1/templates/refresh", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_api_key_guards_writes_only() {
    let mut settings = Settings::default();
    settings.api.key = Some("secret".to_string());
    let app = app_with(settings);
    let uri = "/api/v1/templates/guarded";

    let (status, body) = send(&app, Method::PUT, uri, Some(json!({"body": "x"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("PUT template 'guarded'"));

    let (status, _) =
        send_with_key(&app, Method::PUT, uri, Some(json!({"body": "x"})), Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/templates/import",
        Some(json!({"values": [["a", "b"]]})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("template import"));

    let (status, _) =
        send_with_key(&app, Method::PUT, uri, Some(json!({"body": "x"})), Some("secret")).await;
    assert_eq!(status, StatusCode::CREATED);

    // Reads and renders stay open
    let (status, _) = send(&app, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/templates/guarded/render",
        Some(json!({"variables": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"]["backend"], "memory");
    assert_eq!(body["store"]["connected"], true);
    assert_eq!(body["cache"]["enabled"], true);

    send(
        &app,
        Method::POST,
        "/api/v1/variables",
        Some(json!({"body": "{{x}}"})),
    )
    .await;
    let (status, body) = send(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body
        .as_str()
        .unwrap()
        .contains("ara_http_requests_total"));
}

#[tokio::test]
async fn test_render_matches_literal_placeholder_text() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/render",
        Some(json!({"body": "Hi {{ name }} and {{name}}", "variables": {"name": "Ana"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"], "Hi {{ name }} and Ana");
    assert_eq!(body["missing"], json!([" name "]));
}

#[tokio::test]
async fn test_route_names_cannot_be_templates() {
    let app = app();

    for name in ["export", "import", "refresh"] {
        let uri = format!("/api/v1/templates/{}", name);
        let (status, _) = send(&app, Method::PUT, &uri, Some(json!({"body": "x"}))).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "PUT {}", uri);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/templates/import",
            Some(json!({"values": [["ok", "fine"], [name, "x"]]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "import of {}", name);
        assert_eq!(body["error"]["code"], "INVALID_NAME");
    }

    let (_, body) = send(&app, Method::GET, "/api/v1/templates", None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let mut settings = Settings::default();
    settings.server.max_body_bytes = 64;
    let app = app_with(settings);

    let payload = json!({"body": "x".repeat(256)}).to_string();
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/v1/templates/big")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, payload.len())
        .body(Body::from(payload))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    // Small bodies still pass
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/templates/small",
        Some(json!({"body": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}
