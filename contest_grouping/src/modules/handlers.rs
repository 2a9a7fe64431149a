use axum::{extract::Extension, http::StatusCode, Json};
use contest_grouping_libs::{message, ContestService};
use serde_json::Value;
use std::sync::Arc;

pub async fn handle_message(
    Extension(service): Extension<Arc<ContestService>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    Json(message::dispatch(&service, body).await)
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
