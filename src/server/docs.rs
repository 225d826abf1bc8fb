//! API documentation endpoints.

use axum::http::header;
use axum::response::{Html, IntoResponse};

const INDEX_HTML: &str = include_str!("../../api/index.html");
const OPENAPI_YAML: &str = include_str!("../../api/openapi.yaml");

/// `GET /docs`
pub async fn docs() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /openapi.yaml`
pub async fn openapi_document() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/x-yaml")], OPENAPI_YAML)
}
