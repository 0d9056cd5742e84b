//! vend-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON or human-readable).
//! 3. Open the SQLite database and run pending migrations.
//! 4. Build the services and, when an API key is set, the text-generation client.
//! 5. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod error;
mod middleware;
mod routes;
mod schemas;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vend_core::textgen::{OpenAiGenerator, TextGenerator};
use vend_core::{Services, SqliteStore};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: VEND_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                EnvFilter::new("info")
            }
        },
    };

    // Dropping the guard flushes buffered records, so it lives until main returns.
    let (writer, _log_guard) = tracing_appender::non_blocking(std::io::stdout());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_target(true);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "vend-server starting");

    // ── 3. Database ────────────────────────────────────────────────────────────
    let store = SqliteStore::connect(&cfg.database_url, cfg.db_timeout).await?;
    info!(database_url = %cfg.database_url, timeout = ?store.timeout(), "database ready");

    // ── 4. Services ────────────────────────────────────────────────────────────
    let services = Services::new(Arc::new(store));
    let text_generator = build_text_generator(&cfg)?;

    let state = Arc::new(AppState {
        config: Arc::new(cfg.clone()),
        services,
        text_generator,
    });

    // ── 5. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(Arc::clone(&state));
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, resources = ?cfg.resources, swagger = cfg.enable_swagger, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("vend-server stopped");
    Ok(())
}

fn build_text_generator(cfg: &Config) -> anyhow::Result<Option<Arc<dyn TextGenerator>>> {
    let Some(api_key) = &cfg.openai_api_key else {
        info!("OPENAI_API_KEY not set; text generation disabled");
        return Ok(None);
    };
    let mut generator = OpenAiGenerator::new(api_key.clone())?;
    if let Some(model) = &cfg.openai_model {
        generator = generator.with_model(model.clone());
    }
    if let Some(base_url) = &cfg.openai_base_url {
        generator = generator.with_base_url(base_url.clone());
    }
    info!(model = generator.model(), "text generation client ready");
    Ok(Some(Arc::new(generator)))
}

/// Returns a future that resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}
