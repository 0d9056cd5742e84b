//! Health / heartbeat endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health))]
pub struct HealthApi;

/// Register health-check routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// Liveness probe. Does not touch the database.
///
/// Besides `status` and `version` it reports which resource groups are
/// wired and whether a text-generation client is configured.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is healthy", body = Value)
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let resources: Vec<String> = state.config.resources.iter().map(ToString::to_string).collect();
    Json(json!({
        "status":  "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "resources": resources,
        "text_generation": state.text_generator.is_some(),
    }))
}
