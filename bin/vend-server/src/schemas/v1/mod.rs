pub mod context;
pub mod person;
pub mod phone;
pub mod prompt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationError;

/// Body of a successful delete.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub mensagem: String,
}

/// Body of every error reply.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub erro: String,
}

/// Required text: rejects empty and whitespace-only values.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message("campo obrigatório".into()));
    }
    Ok(())
}
