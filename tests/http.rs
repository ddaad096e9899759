mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use hostscope::platform::Os;
use hostscope::transport::http::router;
use serde_json::Value;
use tower::ServiceExt;

use common::bare_host;

fn app() -> axum::Router {
    router(Arc::new(bare_host(Os::Linux)))
}

async fn text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn lists_tools() {
    let response = app()
        .oneshot(Request::get("/api/v1/tools").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let tools: Value = serde_json::from_str(&text(response).await).unwrap();
    assert_eq!(tools.as_array().unwrap().len(), 10);
    assert_eq!(tools[9]["alias"], "full-report");
}

#[tokio::test]
async fn renders_report_as_plain_text() {
    let response = app()
        .oneshot(
            Request::get("/api/v1/tools/storage-analysis")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
    assert!(text(response).await.starts_with("# Storage Analysis"));
}

#[tokio::test]
async fn mcp_initialize_opens_a_session() {
    let response = app()
        .oneshot(
            Request::post("/mcp")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::ACCEPT, "application/json, text/event-stream")
                .body(Body::from(
                    r#"{"jsonrpc":"2.0","id":0,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"curl","version":"8"}}}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("mcp-session-id"));
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));
}
