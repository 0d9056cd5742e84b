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
use crate::schemas::v1::context::ContextSummaryResponse;
use crate::schemas::v1::person::{PersonRequest, PersonResponse};
use crate::schemas::v1::phone::PhoneResponse;
use crate::schemas::v1::{DeletedResponse, ErrorResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_people, create_person, get_person, update_person, delete_person),
    components(schemas(PersonRequest, PersonResponse, PhoneResponse, ContextSummaryResponse))
)]
pub struct PeopleApi;

/// Register person routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pessoas", get(list_people).post(create_person))
        .route("/pessoas/{id}", get(get_person).put(update_person).delete(delete_person))
}

#[utoipa::path(
    get,
    path = "/api/v1/pessoas",
    tag = "pessoas",
    responses(
        (status = 200, description = "All people, most recent first", body = Vec<PersonResponse>),
        (status = 500, description = "Storage error", body = ErrorResponse),
    )
)]
pub async fn list_people(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PersonResponse>>, ServerError> {
    let people = state.services.people.list().await?;
    Ok(Json(people.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/pessoas",
    tag = "pessoas",
    request_body = PersonRequest,
    responses(
        (status = 201, description = "Person created", body = PersonResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse),
    )
)]
pub async fn create_person(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PersonRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PersonResponse>), ServerError> {
    let req = validated(payload)?;
    let person = state.services.people.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(person.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/pessoas/{id}",
    tag = "pessoas",
    params(("id" = i64, Path, description = "Person id")),
    responses(
        (status = 200, description = "Person with phones and contexts", body = PersonResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such person", body = ErrorResponse),
    )
)]
pub async fn get_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PersonResponse>, ServerError> {
    let person = state.services.people.get(parse_id(&id)?).await?;
    Ok(Json(person.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/pessoas/{id}",
    tag = "pessoas",
    params(("id" = i64, Path, description = "Person id")),
    request_body = PersonRequest,
    responses(
        (status = 200, description = "Person updated", body = PersonResponse),
        (status = 400, description = "Malformed id or body", body = ErrorResponse),
        (status = 404, description = "No such person", body = ErrorResponse),
    )
)]
pub async fn update_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<PersonRequest>, JsonRejection>,
) -> Result<Json<PersonResponse>, ServerError> {
    let id = parse_id(&id)?;
    let req = validated(payload)?;
    let person = state.services.people.update(id, req.into()).await?;
    Ok(Json(person.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/pessoas/{id}",
    tag = "pessoas",
    params(("id" = i64, Path, description = "Person id")),
    responses(
        (status = 200, description = "Person deleted with its phones", body = DeletedResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such person", body = ErrorResponse),
    )
)]
pub async fn delete_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ServerError> {
    state.services.people.delete(parse_id(&id)?).await?;
    Ok(deleted("Pessoa deletada com sucesso"))
}
