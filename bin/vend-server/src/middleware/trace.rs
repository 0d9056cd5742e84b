use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, HttpBody};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::BoxError;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::ServerError;
use crate::state::AppState;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Only JSON bodies of known length below this size are buffered and logged.
/// Anything else streams through untouched and the extractors' own limits apply.
const MAX_LOGGED_BODY: u64 = 1024;

/// Tag each request with a trace id (inbound UUID or a fresh v4), log the
/// request and the response inside one span and echo the id back in the
/// `x-trace-id` response header.
pub async fn trace_middleware(
    State(_state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);
    // A hyphenated UUID is always a valid header value.
    let header_value = HeaderValue::from_str(&trace_id.to_string()).ok();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let (mut parts, body) = req.into_parts();
        if let Some(v) = &header_value {
            parts.headers.insert(X_TRACE_ID, v.clone());
        }

        let request_body = log_body("request", &parts.headers, body).await;
        let mut response = match request_body {
            Ok(body) => {
                let response = next.run(Request::from_parts(parts, body)).await;
                let (parts, body) = response.into_parts();
                let response_body = log_body("response", &parts.headers, body).await;
                match response_body {
                    Ok(body) => Response::from_parts(parts, body),
                    Err(e) => {
                        warn!(error = %e, status = parts.status.as_u16(), "failed to read response body");
                        ServerError::Internal(format!("falha ao ler o corpo da resposta: {e}"))
                            .into_response()
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to read request body");
                request_body_error(e).into_response()
            }
        };

        if let Some(v) = header_value {
            response.headers_mut().insert(X_TRACE_ID, v);
        }
        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );
        response
    }
    .instrument(span)
    .await
}

fn request_body_error(e: BoxError) -> ServerError {
    if e.is::<LengthLimitError>() {
        ServerError::PayloadTooLarge("corpo da requisição maior que o Content-Length declarado".to_owned())
    } else {
        ServerError::BadRequest(format!("falha ao ler o corpo da requisição: {e}"))
    }
}

/// Log a small JSON body and hand back an equivalent one. Bodies of unknown
/// or larger size are returned as they are, without being read.
///
/// The size comes from `Content-Length` when present, otherwise from the
/// body's exact size hint. Reads are capped at that size, so a body longer
/// than it claims fails with [`LengthLimitError`].
async fn log_body(direction: &str, headers: &HeaderMap, body: Body) -> Result<Body, BoxError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let is_json = content_type.contains("application/json");
    let size = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .or_else(|| body.size_hint().exact());

    let len = match size {
        Some(0) => return Ok(body),
        Some(len) if is_json && len < MAX_LOGGED_BODY => len,
        _ => {
            debug!(direction, content_type, size = ?size, "body not logged");
            return Ok(body);
        }
    };

    // `len < MAX_LOGGED_BODY`, so the cast cannot truncate.
    let bytes = Limited::new(body, len as usize).collect().await?.to_bytes();
    if let Ok(text) = std::str::from_utf8(&bytes) {
        debug!(direction, body = text, "body");
    }
    Ok(Body::from(bytes))
}
