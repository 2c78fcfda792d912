//! Operational HTTP endpoints.
//!
//! - `/`        : landing page
//! - `/healthz` : liveness
//! - `{telemetry_path}` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::obs::exposition::CONTENT_TYPE;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let path = &state.cfg().exporter.telemetry_path;
    Html(format!(
        "<html>\n<head><title>Chronos Exporter</title></head>\n<body>\n<h1>Chronos Exporter</h1>\n<p><a href='{path}'>Metrics</a></p>\n</body>\n</html>\n"
    ))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.exporter().collect().await;

    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
}
