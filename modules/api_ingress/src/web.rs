use axum::{
    extract::{Extension, OriginalUri},
    response::{Html, Json},
};
use serde_json::{json, Value};

use crate::request_id::XRequestId;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Problem response for routes nobody registered.
pub async fn not_found(
    OriginalUri(uri): OriginalUri,
    Extension(XRequestId(rid)): Extension<XRequestId>,
) -> problem::ProblemResponse {
    let mut resp = problem::not_found(format!("No route for {}", uri.path()));
    resp.0 = resp
        .0
        .with_code("HTTP_ROUTE_NOT_FOUND")
        .with_instance(uri.path())
        .with_request_id(rid);
    resp
}

pub async fn serve_docs() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>EventReg API Docs</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#,
    )
}
