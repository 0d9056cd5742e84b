//! Placeholder routes for resource groups left out of `VEND_RESOURCES`.
//!
//! The five routes of the group still exist; each answers
//! 501 `{ "erro": "Método não implementado" }`.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use vend_core::CoreError;

use crate::config::Resource;
use crate::error::ServerError;
use crate::state::AppState;

pub fn router(resource: Resource) -> Router<Arc<AppState>> {
    let name: &'static str = resource.into();
    let reject = move || async move { Err::<(), ServerError>(CoreError::Unimplemented(name).into()) };
    Router::new()
        .route(&format!("/{name}"), get(reject).post(reject))
        .route(&format!("/{name}/{{id}}"), get(reject).put(reject).delete(reject))
}
