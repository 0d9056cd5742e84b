//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a `{ "erro": ... }` JSON body with an appropriate status code.
//!
//! Internal failures (timeouts, storage, external service) are logged at
//! error level here, so handlers never log them themselves.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;
use vend_core::CoreError;

/// All errors that can occur in the vend-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Propagated unchanged from the services.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The body could not be read, decoded or validated.
    #[error("{0}")]
    BadRequest(String),

    /// The body is larger than the server accepts.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// A failure outside the services, e.g. an unreadable response body.
    #[error("{0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Core(e) => match e {
                CoreError::Validation(_) | CoreError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
                CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                CoreError::Unimplemented(_) => StatusCode::NOT_IMPLEMENTED,
                CoreError::Timeout { .. } | CoreError::ExternalService(_) | CoreError::Storage(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ServerError::Core(CoreError::Unimplemented(resource)) => {
                tracing::debug!(resource, "unwired resource called");
                "Método não implementado".to_owned()
            }
            other if status.is_server_error() => {
                error!(error = %other, status = status.as_u16(), "request failed");
                other.to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "erro": message }))).into_response()
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(rejection.body_text())
        } else {
            ServerError::BadRequest(rejection.body_text())
        }
    }
}

impl From<ValidationErrors> for ServerError {
    fn from(errors: ValidationErrors) -> Self {
        ServerError::BadRequest(errors.to_string())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::time::Duration;
    use tracing_test::traced_test;

    async fn render(err: ServerError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn client_errors_map_to_4xx() {
        let (status, body) = render(CoreError::Validation("nome é obrigatório".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["erro"].as_str().unwrap_or("").contains("nome"));

        let (status, _) = render(CoreError::InvalidIdentifier("abc".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = render(CoreError::not_found("Pessoa", 3).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["erro"], "Pessoa 3 não encontrado(a)");
    }

    #[tokio::test]
    async fn unimplemented_maps_to_501() {
        let (status, body) = render(CoreError::Unimplemented("prompts").into()).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body["erro"], "Método não implementado");
    }

    #[tokio::test]
    #[traced_test]
    async fn internal_errors_are_logged_and_map_to_500() {
        let timeout = CoreError::Timeout { operation: "get_person", after: Duration::from_secs(5) };
        let (status, body) = render(timeout.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["erro"].as_str().unwrap_or("").contains("get_person"));
        assert!(logs_contain("request failed"));

        let (status, _) = render(CoreError::ExternalService("429".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, body) = render(ServerError::Internal("corpo ilegível".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["erro"], "corpo ilegível");
    }

    #[tokio::test]
    async fn oversized_body_maps_to_413() {
        let (status, body) = render(ServerError::PayloadTooLarge("grande demais".into())).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["erro"], "grande demais");
    }
}
