//! Shared application state injected into every Axum handler.

use std::fmt;
use std::sync::Arc;

use vend_core::textgen::TextGenerator;
use vend_core::Services;

use crate::config::Config;

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Use-case layer over the store.
    pub services: Services,
    /// Present when `OPENAI_API_KEY` is set. No route calls it yet.
    pub text_generator: Option<Arc<dyn TextGenerator>>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("services", &self.services)
            .field("text_generator", &self.text_generator.is_some())
            .finish()
    }
}
