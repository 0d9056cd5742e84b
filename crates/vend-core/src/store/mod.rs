//! Storage adapter.
//!
//! One narrow trait per entity ([`PersonStore`], [`PhoneStore`],
//! [`ContextStore`], [`PromptStore`]) and exactly one conforming
//! implementation, [`SqliteStore`]. The services only ever see the traits, so
//! a test double can stand in for the database.
//!
//! Every call is bounded by the per-call timeout given to
//! [`SqliteStore::connect`]; expiry surfaces as [`CoreError::Timeout`].

mod context;
mod person;
mod phone;
mod prompt;

pub use context::ContextStore;
pub use person::PersonStore;
pub use phone::PhoneStore;
pub use prompt::PromptStore;

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::CoreError;

/// Default per-call budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed store for all four entities.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteStore {
    /// Open (or create) the database at `url` and run pending migrations.
    ///
    /// `url` is a sqlx SQLite URL, e.g. `"sqlite://vend.db?mode=rwc"` or
    /// `"sqlite::memory:"` for tests. In-memory databases are pinned to a
    /// single long-lived connection, since each new connection would open an
    /// empty database.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, CoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let mut pool_options = SqlitePoolOptions::new().acquire_timeout(timeout);
        if in_memory {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(sqlx::Error::from)?;
        debug!(in_memory, ?timeout, "sqlite store ready");
        Ok(Self { pool, timeout })
    }

    /// Per-call timeout applied to every operation.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one store operation under the per-call timeout.
    async fn timed<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, CoreError>>,
    ) -> Result<T, CoreError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout = ?self.timeout, "store call timed out");
                Err(CoreError::Timeout { operation, after: self.timeout })
            }
        }
    }
}

/// Reject blank required fields before they reach the schema's `CHECK`s.
fn require(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} é obrigatório")));
    }
    Ok(())
}
