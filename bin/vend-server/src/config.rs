//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use tracing::warn;

/// A route group under `/api/v1`.
///
/// The string form is the URL segment (`"pessoas"`, `"telefones"`, …) and is
/// what `VEND_RESOURCES` lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Resource {
    Pessoas,
    Telefones,
    Contextos,
    Prompts,
}

/// Runtime configuration for vend-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8080"`).
    pub bind_address: String,

    /// sqlx SQLite URL (default: `"sqlite://vend.db?mode=rwc"`).
    pub database_url: String,

    /// Per-call storage budget.
    pub db_timeout: Duration,

    /// `tracing` filter string, e.g. `"info"` or `"debug,sqlx=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated allowed origins. `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI at `/swagger-ui`.
    pub enable_swagger: bool,

    /// Route groups backed by the store. The rest answer 501.
    pub resources: Vec<Resource>,

    /// Enables the text-generation client when set.
    pub openai_api_key: Option<String>,

    pub openai_model: Option<String>,

    pub openai_base_url: Option<String>,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        Self {
            bind_address: env_or("VEND_BIND", "0.0.0.0:8080"),
            database_url: env_or("VEND_DATABASE_URL", "sqlite://vend.db?mode=rwc"),
            db_timeout: parse_timeout(lookup("VEND_DB_TIMEOUT_SECS")),
            log_level: env_or("VEND_LOG", "info"),
            log_json: lookup("VEND_LOG_JSON").map(|v| truthy(&v)).unwrap_or(false),
            cors_allowed_origins: non_empty("VEND_CORS_ORIGINS"),
            enable_swagger: lookup("VEND_ENABLE_SWAGGER").map(|v| truthy(&v)).unwrap_or(true),
            resources: non_empty("VEND_RESOURCES")
                .map(|v| parse_resources(&v))
                .unwrap_or_else(|| Resource::iter().collect()),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_model: non_empty("VEND_OPENAI_MODEL"),
            openai_base_url: non_empty("VEND_OPENAI_BASE_URL"),
        }
    }

    pub fn is_wired(&self, resource: Resource) -> bool {
        self.resources.contains(&resource)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

const DEFAULT_DB_TIMEOUT_SECS: u64 = 5;

/// Whole seconds, at least one. Anything else falls back to the default.
fn parse_timeout(value: Option<String>) -> Duration {
    let secs = match value.as_deref().map(str::trim) {
        None => DEFAULT_DB_TIMEOUT_SECS,
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                warn!(value = raw, default = DEFAULT_DB_TIMEOUT_SECS, "invalid VEND_DB_TIMEOUT_SECS, using default");
                DEFAULT_DB_TIMEOUT_SECS
            }
        },
    };
    Duration::from_secs(secs)
}

/// Unknown names are skipped with a warning; duplicates collapse.
fn parse_resources(raw: &str) -> Vec<Resource> {
    let mut resources = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match name.parse::<Resource>() {
            Ok(r) if !resources.contains(&r) => resources.push(r),
            Ok(_) => {}
            Err(_) => warn!(resource = name, "ignoring unknown entry in VEND_RESOURCES"),
        }
    }
    resources
}

// ── Tests ──────────────────────────────────────────────────────────────────────
