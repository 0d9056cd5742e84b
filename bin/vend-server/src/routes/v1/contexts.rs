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
use crate::schemas::v1::context::{ContextRequest, ContextResponse};
use crate::schemas::v1::person::PersonSummaryResponse;
use crate::schemas::v1::prompt::PromptResponse;
use crate::schemas::v1::{DeletedResponse, ErrorResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_contexts, create_context, get_context, update_context, delete_context),
    components(schemas(ContextRequest, ContextResponse, PersonSummaryResponse, PromptResponse))
)]
pub struct ContextsApi;

/// Register context routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contextos", get(list_contexts).post(create_context))
        .route("/contextos/{id}", get(get_context).put(update_context).delete(delete_context))
}

#[utoipa::path(
    get,
    path = "/api/v1/contextos",
    tag = "contextos",
    responses(
        (status = 200, description = "All contexts, most recent first", body = Vec<ContextResponse>),
        (status = 500, description = "Storage error", body = ErrorResponse),
    )
)]
pub async fn list_contexts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ContextResponse>>, ServerError> {
    let contexts = state.services.contexts.list().await?;
    Ok(Json(contexts.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/contextos",
    tag = "contextos",
    request_body = ContextRequest,
    responses(
        (status = 201, description = "Context created", body = ContextResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 500, description = "Unknown pessoa_ids entry or storage error", body = ErrorResponse),
    )
)]
pub async fn create_context(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContextRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ContextResponse>), ServerError> {
    let req = validated(payload)?;
    let context = state.services.contexts.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(context.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/contextos/{id}",
    tag = "contextos",
    params(("id" = i64, Path, description = "Context id")),
    responses(
        (status = 200, description = "Context with members and prompts", body = ContextResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such context", body = ErrorResponse),
    )
)]
pub async fn get_context(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ContextResponse>, ServerError> {
    let context = state.services.contexts.get(parse_id(&id)?).await?;
    Ok(Json(context.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/contextos/{id}",
    tag = "contextos",
    params(("id" = i64, Path, description = "Context id")),
    request_body = ContextRequest,
    responses(
        (status = 200, description = "Context updated; pessoa_ids replaces members when present", body = ContextResponse),
        (status = 400, description = "Malformed id or body", body = ErrorResponse),
        (status = 404, description = "No such context", body = ErrorResponse),
    )
)]
pub async fn update_context(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ContextRequest>, JsonRejection>,
) -> Result<Json<ContextResponse>, ServerError> {
    let id = parse_id(&id)?;
    let req = validated(payload)?;
    let context = state.services.contexts.update(id, req.into()).await?;
    Ok(Json(context.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/contextos/{id}",
    tag = "contextos",
    params(("id" = i64, Path, description = "Context id")),
    responses(
        (status = 200, description = "Context deleted with its prompts", body = DeletedResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such context", body = ErrorResponse),
    )
)]
pub async fn delete_context(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ServerError> {
    state.services.contexts.delete(parse_id(&id)?).await?;
    Ok(deleted("Contexto deletado com sucesso"))
}
