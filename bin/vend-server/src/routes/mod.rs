//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI document endpoint (disable with `VEND_ENABLE_SWAGGER=false`)
//! - Health / heartbeat route
//! - Resource routes under `/api/v1`

pub mod doc;
mod health;
mod v1;

use std::sync::Arc;

use axum::{middleware, Router};
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .nest("/api/v1", v1::router(&state.config));

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app
        // Outermost layers execute first on the way in.
        .layer(cors::cors_layer(&state.config))
        .layer(middleware::from_fn_with_state(state.clone(), trace::trace_middleware))
        .with_state(state)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{Config, Resource};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body, Bytes};
    use axum::http::{header, HeaderMap, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;
    use tracing_test::traced_test;
    use vend_core::service::PersonService;
    use vend_core::store::{PersonStore, DEFAULT_TIMEOUT};
    use vend_core::{CoreError, EntityId, Person, PersonDraft, Services, SqliteStore};

    async fn services() -> Services {
        let store = SqliteStore::connect("sqlite::memory:", DEFAULT_TIMEOUT)
            .await
            .expect("open in-memory store");
        Services::new(Arc::new(store))
    }

    fn app_with(config: Config, services: Services) -> Router {
        build(Arc::new(AppState { config: Arc::new(config), services, text_generator: None }))
    }

    async fn default_app() -> Router {
        app_with(Config::default(), services().await)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, json)
    }

    /// Counts calls; every operation times out.
    #[derive(Default)]
    struct TimingOutPeople {
        calls: AtomicUsize,
    }

    impl TimingOutPeople {
        fn timeout(&self, operation: &'static str) -> CoreError {
            self.calls.fetch_add(1, Ordering::SeqCst);
            CoreError::Timeout { operation, after: Duration::from_secs(5) }
        }
    }

    #[async_trait]
    impl PersonStore for TimingOutPeople {
        async fn create_person(&self, _: PersonDraft) -> Result<Person, CoreError> {
            Err(self.timeout("create_person"))
        }
        async fn get_person(&self, _: EntityId) -> Result<Person, CoreError> {
            Err(self.timeout("get_person"))
        }
        async fn list_people(&self) -> Result<Vec<Person>, CoreError> {
            Err(self.timeout("list_people"))
        }
        async fn update_person(&self, _: EntityId, _: PersonDraft) -> Result<Person, CoreError> {
            Err(self.timeout("update_person"))
        }
        async fn delete_person(&self, _: EntityId) -> Result<(), CoreError> {
            Err(self.timeout("delete_person"))
        }
    }

    #[tokio::test]
    async fn health_reports_ok_and_tags_response_with_trace_id() {
        let app = default_app().await;
        let (status, headers, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(!body["version"].as_str().unwrap_or("").is_empty());
        assert_eq!(body["text_generation"], false);
        assert!(headers.contains_key(trace::X_TRACE_ID));
    }

    #[tokio::test]
    async fn inbound_trace_id_is_echoed() {
        let app = default_app().await;
        let id = "2f1d6c3e-8a4b-4c1e-9d2a-0b5e7f3a9c11";
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(trace::X_TRACE_ID, id)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.headers()[trace::X_TRACE_ID], id);
    }

    #[tokio::test]
    async fn create_person_returns_201_with_empty_associations() {
        let app = default_app().await;
        let (status, _, body) = send(
            &app,
            Method::POST,
            "/api/v1/pessoas",
            Some(json!({ "nome": "Ana", "email": "ana@x.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["id"].as_i64().unwrap_or(0) > 0);
        assert_eq!(body["nome"], "Ana");
        assert_eq!(body["telefones"], json!([]));
        assert_eq!(body["contextos"], json!([]));
        assert!(body["created_at"].is_string());
        assert_eq!(body["created_at"], body["updated_at"]);
    }

    #[tokio::test]
    async fn bad_bodies_are_rejected_before_the_store() {
        let people = Arc::new(TimingOutPeople::default());
        let mut services = services().await;
        services.people = PersonService::new(people.clone());
        let app = app_with(Config::default(), services);

        let (status, _, body) =
            send(&app, Method::POST, "/api/v1/pessoas", Some(json!({ "nome": "Ana" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["erro"].is_string());

        let (status, _, _) = send(
            &app,
            Method::POST,
            "/api/v1/pessoas",
            Some(json!({ "nome": " ", "email": "ana@x.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) = send(
            &app,
            Method::PUT,
            "/api/v1/pessoas/1",
            Some(json!({ "nome": "Ana", "email": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(people.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let app = default_app().await;
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/pessoas")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"nome\": "))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_timeout_is_500() {
        let people = Arc::new(TimingOutPeople::default());
        let mut services = services().await;
        services.people = PersonService::new(people.clone());
        let app = app_with(Config::default(), services);

        let (status, _, body) = send(&app, Method::GET, "/api/v1/pessoas/1", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["erro"].as_str().unwrap_or("").contains("get_person"));
        assert_eq!(people.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_records_are_404() {
        let app = default_app().await;
        for uri in ["/api/v1/pessoas/999", "/api/v1/telefones/999", "/api/v1/contextos/999", "/api/v1/prompts/999"] {
            let (status, _, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert!(body["erro"].is_string());
        }
        let (status, _, _) = send(&app, Method::DELETE, "/api/v1/pessoas/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_ids_are_400_never_500() {
        let app = default_app().await;
        for id in ["abc", "-1", "1.5", "0"] {
            let (status, _, body) = send(&app, Method::GET, &format!("/api/v1/pessoas/{id}"), None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{id}");
            assert!(body["erro"].is_string());
        }
        let (status, _, _) = send(&app, Method::DELETE, "/api/v1/contextos/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unwired_resources_answer_501() {
        let config = Config { resources: vec![Resource::Pessoas], ..Config::default() };
        let app = app_with(config, services().await);

        let (status, _, body) = send(&app, Method::GET, "/api/v1/prompts", None).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body["erro"], "Método não implementado");

        let routes = [
            (Method::POST, "/api/v1/telefones"),
            (Method::GET, "/api/v1/contextos/1"),
            (Method::PUT, "/api/v1/contextos/1"),
            (Method::DELETE, "/api/v1/prompts/1"),
        ];
        for (method, uri) in routes {
            let (status, _, _) = send(&app, method, uri, Some(json!({}))).await;
            assert_eq!(status, StatusCode::NOT_IMPLEMENTED, "{uri}");
        }

        let (status, _, _) = send(&app, Method::GET, "/api/v1/pessoas", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn people_phones_and_contexts_link_up() {
        let app = default_app().await;

        let (status, _, _) = send(
            &app,
            Method::POST,
            "/api/v1/telefones",
            Some(json!({ "numero": "123", "tipo": "casa", "pessoa_id": 42 })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (_, _, ana) = send(
            &app,
            Method::POST,
            "/api/v1/pessoas",
            Some(json!({ "nome": "Ana", "email": "ana@x.com" })),
        )
        .await;
        let ana_id = ana["id"].as_i64().expect("id");

        let (status, _, phone) = send(
            &app,
            Method::POST,
            "/api/v1/telefones",
            Some(json!({ "numero": "+55 11 99999-0000", "tipo": "celular", "pessoa_id": ana_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(phone["pessoa_id"], ana_id);

        let (status, _, context) = send(
            &app,
            Method::POST,
            "/api/v1/contextos",
            Some(json!({
                "nome": "Projeto",
                "descricao": "Lançamento",
                "data_inicio": "2024-06-01T00:00:00Z",
                "data_fim": "2024-01-01T00:00:00Z",
                "pessoa_ids": [ana_id]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(context["pessoas"][0]["nome"], "Ana");
        let context_id = context["id"].as_i64().expect("id");

        let (status, _, prompt) = send(
            &app,
            Method::POST,
            "/api/v1/prompts",
            Some(json!({ "conteudo": "Resuma o projeto", "contexto_id": context_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(prompt["contexto_id"], context_id);

        let (_, _, fetched) = send(&app, Method::GET, &format!("/api/v1/pessoas/{ana_id}"), None).await;
        assert_eq!(fetched["telefones"][0]["numero"], "+55 11 99999-0000");
        assert_eq!(fetched["contextos"][0]["nome"], "Projeto");

        let (_, _, fetched) = send(&app, Method::GET, &format!("/api/v1/contextos/{context_id}"), None).await;
        assert_eq!(fetched["prompts"][0]["conteudo"], "Resuma o projeto");

        let (status, _, body) = send(&app, Method::DELETE, &format!("/api/v1/pessoas/{ana_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mensagem"], "Pessoa deletada com sucesso");

        let (_, _, phones) = send(&app, Method::GET, "/api/v1/telefones", None).await;
        assert_eq!(phones, json!([]));

        let (status, _, _) = send(&app, Method::DELETE, &format!("/api/v1/pessoas/{ana_id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_created_at() {
        let app = default_app().await;
        let (_, _, created) = send(
            &app,
            Method::POST,
            "/api/v1/pessoas",
            Some(json!({ "nome": "Ana", "email": "ana@x.com" })),
        )
        .await;
        let id = created["id"].as_i64().expect("id");

        let (status, _, updated) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/pessoas/{id}"),
            Some(json!({ "nome": "Ana Maria", "email": "ana.maria@x.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], id);
        assert_eq!(updated["nome"], "Ana Maria");
        assert_eq!(updated["created_at"], created["created_at"]);
        assert_ne!(updated["updated_at"], created["updated_at"]);
    }

    async fn create(app: &Router, uri: &str, body: Value) -> i64 {
        let (status, _, created) = send(app, Method::POST, uri, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{uri}");
        created["id"].as_i64().expect("id")
    }

    async fn post_stream<S>(app: &Router, content_length: Option<u64>, stream: S) -> StatusCode
    where
        S: futures::Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static,
    {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/pessoas")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(len) = content_length {
            builder = builder.header(header::CONTENT_LENGTH, len);
        }
        let response = app
            .clone()
            .oneshot(builder.body(Body::from_stream(stream)).expect("request"))
            .await
            .expect("response");
        response.status()
    }

    #[tokio::test]
    async fn phone_update_and_delete() {
        let app = default_app().await;
        let ana = create(&app, "/api/v1/pessoas", json!({ "nome": "Ana", "email": "ana@x.com" })).await;
        let bruno = create(&app, "/api/v1/pessoas", json!({ "nome": "Bruno", "email": "bruno@x.com" })).await;
        let id = create(
            &app,
            "/api/v1/telefones",
            json!({ "numero": "111", "tipo": "casa", "pessoa_id": ana }),
        )
        .await;

        let (status, _, updated) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/telefones/{id}"),
            Some(json!({ "numero": "222", "tipo": "celular", "pessoa_id": bruno })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], id);
        assert_eq!(updated["numero"], "222");
        assert_eq!(updated["tipo"], "celular");
        assert_eq!(updated["pessoa_id"], bruno);

        let (_, _, fetched) = send(&app, Method::GET, &format!("/api/v1/telefones/{id}"), None).await;
        assert_eq!(fetched, updated);
        let (_, _, owner) = send(&app, Method::GET, &format!("/api/v1/pessoas/{bruno}"), None).await;
        assert_eq!(owner["telefones"][0]["numero"], "222");

        let (status, _, body) = send(&app, Method::DELETE, &format!("/api/v1/telefones/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mensagem"], "Telefone deletado com sucesso");

        let (status, _, _) = send(&app, Method::GET, &format!("/api/v1/telefones/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, _) = send(&app, Method::DELETE, &format!("/api/v1/telefones/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn context_update_replaces_members_and_delete() {
        let app = default_app().await;
        let ana = create(&app, "/api/v1/pessoas", json!({ "nome": "Ana", "email": "ana@x.com" })).await;
        let bruno = create(&app, "/api/v1/pessoas", json!({ "nome": "Bruno", "email": "bruno@x.com" })).await;
        let id = create(
            &app,
            "/api/v1/contextos",
            json!({ "nome": "Projeto", "descricao": "v1", "pessoa_ids": [ana] }),
        )
        .await;

        let (status, _, updated) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/contextos/{id}"),
            Some(json!({
                "nome": "Projeto 2",
                "descricao": "v2",
                "data_inicio": "2024-06-01T00:00:00Z",
                "pessoa_ids": [bruno]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], id);
        assert_eq!(updated["nome"], "Projeto 2");
        assert_eq!(updated["descricao"], "v2");
        assert_eq!(updated["pessoas"].as_array().map(Vec::len), Some(1));
        assert_eq!(updated["pessoas"][0]["id"], bruno);

        let (_, _, fetched) = send(&app, Method::GET, &format!("/api/v1/contextos/{id}"), None).await;
        assert_eq!(fetched, updated);
        let (_, _, former) = send(&app, Method::GET, &format!("/api/v1/pessoas/{ana}"), None).await;
        assert_eq!(former["contextos"], json!([]));

        let (status, _, body) = send(&app, Method::DELETE, &format!("/api/v1/contextos/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mensagem"], "Contexto deletado com sucesso");

        let (_, _, member) = send(&app, Method::GET, &format!("/api/v1/pessoas/{bruno}"), None).await;
        assert_eq!(member["contextos"], json!([]));
        let (status, _, _) = send(&app, Method::GET, &format!("/api/v1/contextos/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn prompt_update_and_delete() {
        let app = default_app().await;
        let first = create(&app, "/api/v1/contextos", json!({ "nome": "A", "descricao": "a" })).await;
        let second = create(&app, "/api/v1/contextos", json!({ "nome": "B", "descricao": "b" })).await;
        let id = create(&app, "/api/v1/prompts", json!({ "conteudo": "Resuma", "contexto_id": first })).await;

        let (status, _, updated) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/prompts/{id}"),
            Some(json!({ "conteudo": "Liste riscos", "contexto_id": second })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], id);
        assert_eq!(updated["conteudo"], "Liste riscos");
        assert_eq!(updated["contexto_id"], second);

        let (_, _, fetched) = send(&app, Method::GET, &format!("/api/v1/prompts/{id}"), None).await;
        assert_eq!(fetched, updated);
        let (_, _, old) = send(&app, Method::GET, &format!("/api/v1/contextos/{first}"), None).await;
        assert_eq!(old["prompts"], json!([]));

        let (status, _, body) = send(&app, Method::DELETE, &format!("/api/v1/prompts/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mensagem"], "Prompt deletado com sucesso");

        let (_, _, prompts) = send(&app, Method::GET, "/api/v1/prompts", None).await;
        assert_eq!(prompts, json!([]));
    }

    #[tokio::test]
    async fn updating_missing_records_is_404() {
        let app = default_app().await;
        let ana = create(&app, "/api/v1/pessoas", json!({ "nome": "Ana", "email": "ana@x.com" })).await;
        let context = create(&app, "/api/v1/contextos", json!({ "nome": "A", "descricao": "a" })).await;

        let updates = [
            ("/api/v1/pessoas/999", json!({ "nome": "Ana", "email": "ana@x.com" })),
            ("/api/v1/telefones/999", json!({ "numero": "1", "tipo": "casa", "pessoa_id": ana })),
            ("/api/v1/contextos/999", json!({ "nome": "B", "descricao": "b", "pessoa_ids": [ana] })),
            ("/api/v1/prompts/999", json!({ "conteudo": "x", "contexto_id": context })),
        ];
        for (uri, body) in updates {
            let (status, _, body) = send(&app, Method::PUT, uri, Some(body)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert!(body["erro"].as_str().unwrap_or("").contains("999"), "{uri}");
        }

        let (_, _, person) = send(&app, Method::GET, &format!("/api/v1/pessoas/{ana}"), None).await;
        assert_eq!(person["contextos"], json!([]));
    }

    #[tokio::test]
    async fn oversized_streamed_body_is_413_without_draining_it() {
        let app = default_app().await;
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let chunks = futures::stream::iter((0..50).map(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from(vec![b' '; 1 << 20]))
        }));

        let status = post_stream(&app, None, chunks).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(pulled.load(Ordering::SeqCst) < 5, "read {} chunks", pulled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn body_longer_than_content_length_is_413() {
        let app = default_app().await;
        let chunks = futures::stream::iter([Ok(Bytes::from_static(b"{\"nome\": \"Ana\", \"email\": \"a@x.com\"}"))]);
        let status = post_stream(&app, Some(10), chunks).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    #[traced_test]
    async fn unreadable_request_body_is_400() {
        let app = default_app().await;
        let chunks = futures::stream::iter([
            Ok(Bytes::from_static(b"{\"nome\"")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ]);
        let status = post_stream(&app, Some(40), chunks).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(logs_contain("failed to read request body"));
    }

    #[tokio::test]
    async fn swagger_document_is_served_when_enabled() {
        let app = default_app().await;
        let (status, _, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/v1/pessoas"].is_object());

        let config = Config { enable_swagger: false, ..Config::default() };
        let app = app_with(config, services().await);
        let (status, _, _) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
