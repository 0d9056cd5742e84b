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
use crate::schemas::v1::phone::{PhoneRequest, PhoneResponse};
use crate::schemas::v1::{DeletedResponse, ErrorResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_phones, create_phone, get_phone, update_phone, delete_phone),
    components(schemas(PhoneRequest, PhoneResponse))
)]
pub struct PhonesApi;

/// Register phone routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/telefones", get(list_phones).post(create_phone))
        .route("/telefones/{id}", get(get_phone).put(update_phone).delete(delete_phone))
}

#[utoipa::path(
    get,
    path = "/api/v1/telefones",
    tag = "telefones",
    responses(
        (status = 200, description = "All phones, most recent first", body = Vec<PhoneResponse>),
        (status = 500, description = "Storage error", body = ErrorResponse),
    )
)]
pub async fn list_phones(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PhoneResponse>>, ServerError> {
    let phones = state.services.phones.list().await?;
    Ok(Json(phones.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/telefones",
    tag = "telefones",
    request_body = PhoneRequest,
    responses(
        (status = 201, description = "Phone created", body = PhoneResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 500, description = "Unknown pessoa_id or storage error", body = ErrorResponse),
    )
)]
pub async fn create_phone(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PhoneRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PhoneResponse>), ServerError> {
    let req = validated(payload)?;
    let phone = state.services.phones.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(phone.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/telefones/{id}",
    tag = "telefones",
    params(("id" = i64, Path, description = "Phone id")),
    responses(
        (status = 200, description = "Phone", body = PhoneResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such phone", body = ErrorResponse),
    )
)]
pub async fn get_phone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PhoneResponse>, ServerError> {
    let phone = state.services.phones.get(parse_id(&id)?).await?;
    Ok(Json(phone.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/telefones/{id}",
    tag = "telefones",
    params(("id" = i64, Path, description = "Phone id")),
    request_body = PhoneRequest,
    responses(
        (status = 200, description = "Phone updated", body = PhoneResponse),
        (status = 400, description = "Malformed id or body", body = ErrorResponse),
        (status = 404, description = "No such phone", body = ErrorResponse),
    )
)]
pub async fn update_phone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<PhoneRequest>, JsonRejection>,
) -> Result<Json<PhoneResponse>, ServerError> {
    let id = parse_id(&id)?;
    let req = validated(payload)?;
    let phone = state.services.phones.update(id, req.into()).await?;
    Ok(Json(phone.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/telefones/{id}",
    tag = "telefones",
    params(("id" = i64, Path, description = "Phone id")),
    responses(
        (status = 200, description = "Phone deleted", body = DeletedResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such phone", body = ErrorResponse),
    )
)]
pub async fn delete_phone(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ServerError> {
    state.services.phones.delete(parse_id(&id)?).await?;
    Ok(deleted("Telefone deletado com sucesso"))
}
