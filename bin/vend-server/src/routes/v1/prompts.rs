use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;
use vend_core::parse_id;

use super::{deleted, validated};
use crate::error::ServerError;
use crate::schemas::v1::prompt::{PromptRequest, PromptResponse};
use crate::schemas::v1::{DeletedResponse, ErrorResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_prompts, create_prompt, get_prompt, update_prompt, delete_prompt),
    components(schemas(PromptRequest, PromptResponse))
)]
pub struct PromptsApi;

/// Register prompt routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/prompts", get(list_prompts).post(create_prompt))
        .route("/prompts/{id}", get(get_prompt).put(update_prompt).delete(delete_prompt))
}

#[utoipa::path(
    get,
    path = "/api/v1/prompts",
    tag = "prompts",
    responses(
        (status = 200, description = "All prompts, most recent first", body = Vec<PromptResponse>),
        (status = 500, description = "Storage error", body = ErrorResponse),
    )
)]
pub async fn list_prompts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PromptResponse>>, ServerError> {
    let prompts = state.services.prompts.list().await?;
    Ok(Json(prompts.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/prompts",
    tag = "prompts",
    request_body = PromptRequest,
    responses(
        (status = 201, description = "Prompt created", body = PromptResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 500, description = "Unknown contexto_id or storage error", body = ErrorResponse),
    )
)]
pub async fn create_prompt(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PromptResponse>), ServerError> {
    let req = validated(payload)?;
    let prompt = state.services.prompts.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(prompt.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/prompts/{id}",
    tag = "prompts",
    params(("id" = i64, Path, description = "Prompt id")),
    responses(
        (status = 200, description = "Prompt", body = PromptResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such prompt", body = ErrorResponse),
    )
)]
pub async fn get_prompt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PromptResponse>, ServerError> {
    let prompt = state.services.prompts.get(parse_id(&id)?).await?;
    Ok(Json(prompt.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/prompts/{id}",
    tag = "prompts",
    params(("id" = i64, Path, description = "Prompt id")),
    request_body = PromptRequest,
    responses(
        (status = 200, description = "Prompt updated", body = PromptResponse),
        (status = 400, description = "Malformed id or body", body = ErrorResponse),
        (status = 404, description = "No such prompt", body = ErrorResponse),
    )
)]
pub async fn update_prompt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<PromptResponse>, ServerError> {
    let id = parse_id(&id)?;
    let req = validated(payload)?;
    let prompt = state.services.prompts.update(id, req.into()).await?;
    Ok(Json(prompt.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/prompts/{id}",
    tag = "prompts",
    params(("id" = i64, Path, description = "Prompt id")),
    responses(
        (status = 200, description = "Prompt deleted", body = DeletedResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such prompt", body = ErrorResponse),
    )
)]
pub async fn delete_prompt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ServerError> {
    state.services.prompts.delete(parse_id(&id)?).await?;
    Ok(deleted("Prompt deletado com sucesso"))
}
