pub mod contexts;
pub mod people;
pub mod phones;
pub mod prompts;
pub mod unwired;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::{Json, Router};
use strum::IntoEnumIterator;
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

use crate::config::{Config, Resource};
use crate::error::ServerError;
use crate::schemas::v1::{DeletedResponse, ErrorResponse};
use crate::state::AppState;

/// Routes nested under `/api/v1`. Groups missing from `config.resources`
/// are mounted as [`unwired`] placeholders.
pub fn router(config: &Config) -> Router<Arc<AppState>> {
    let mut router = Router::new();
    for resource in Resource::iter() {
        let group = if config.is_wired(resource) {
            match resource {
                Resource::Pessoas => people::router(),
                Resource::Telefones => phones::router(),
                Resource::Contextos => contexts::router(),
                Resource::Prompts => prompts::router(),
            }
        } else {
            info!(%resource, "resource group not wired; answering 501");
            unwired::router(resource)
        };
        router = router.merge(group);
    }
    router
}

#[derive(OpenApi)]
#[openapi(components(schemas(DeletedResponse, ErrorResponse)))]
pub struct V1Api;

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut spec = V1Api::openapi();
    spec.merge(people::PeopleApi::openapi());
    spec.merge(phones::PhonesApi::openapi());
    spec.merge(contexts::ContextsApi::openapi());
    spec.merge(prompts::PromptsApi::openapi());
    spec
}

/// Unwrap a JSON body and run its field validation. Both failures are 400
/// and happen before any service call.
pub(crate) fn validated<T: Validate>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ServerError> {
    let Json(body) = payload?;
    body.validate()?;
    Ok(body)
}

pub(crate) fn deleted(message: &str) -> Json<DeletedResponse> {
    Json(DeletedResponse { mensagem: message.to_owned() })
}
