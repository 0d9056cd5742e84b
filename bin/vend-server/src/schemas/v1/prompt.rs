use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;
use vend_core::{Prompt, PromptDraft};

use super::not_blank;

/// Body of `POST /prompts` and `PUT /prompts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PromptRequest {
    #[serde(rename = "conteudo")]
    #[validate(custom(function = "not_blank"))]
    pub content: String,
    #[serde(rename = "contexto_id")]
    #[validate(range(min = 1, message = "contexto_id deve ser positivo"))]
    pub context_id: i64,
}

impl From<PromptRequest> for PromptDraft {
    fn from(req: PromptRequest) -> Self {
        PromptDraft { content: req.content, context_id: req.context_id }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PromptResponse {
    pub id: i64,
    #[serde(rename = "conteudo")]
    pub content: String,
    #[serde(rename = "contexto_id")]
    pub context_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Prompt> for PromptResponse {
    fn from(p: Prompt) -> Self {
        PromptResponse {
            id: p.id,
            content: p.content,
            context_id: p.context_id,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}
