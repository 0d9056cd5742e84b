use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;
use vend_core::{Context, ContextDraft, ContextSummary};

use super::not_blank;
use super::person::PersonSummaryResponse;
use super::prompt::PromptResponse;

/// Body of `POST /contextos` and `PUT /contextos/{id}`.
///
/// `pessoa_ids` replaces the member set when present. Left out on update, the
/// members stay as they are.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ContextRequest {
    #[serde(rename = "nome")]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    /// RFC 3339 timestamp. No ordering against `data_fim` is enforced.
    #[serde(rename = "data_inicio", default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(rename = "data_fim", default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(rename = "pessoa_ids", default)]
    pub person_ids: Option<Vec<i64>>,
}

impl From<ContextRequest> for ContextDraft {
    fn from(req: ContextRequest) -> Self {
        ContextDraft {
            name: req.name,
            description: req.description,
            start_date: req.start_date,
            end_date: req.end_date,
            person_ids: req.person_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContextResponse {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "data_inicio")]
    pub start_date: Option<String>,
    #[serde(rename = "data_fim")]
    pub end_date: Option<String>,
    #[serde(rename = "pessoas")]
    pub people: Vec<PersonSummaryResponse>,
    pub prompts: Vec<PromptResponse>,
}

impl From<Context> for ContextResponse {
    fn from(c: Context) -> Self {
        ContextResponse {
            id: c.id,
            name: c.name,
            description: c.description,
            start_date: c.start_date.map(|d| d.to_rfc3339()),
            end_date: c.end_date.map(|d| d.to_rfc3339()),
            people: c.people.into_iter().map(Into::into).collect(),
            prompts: c.prompts.into_iter().map(Into::into).collect(),
        }
    }
}

/// Context as listed inside a person.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContextSummaryResponse {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "data_inicio")]
    pub start_date: Option<String>,
    #[serde(rename = "data_fim")]
    pub end_date: Option<String>,
}

impl From<ContextSummary> for ContextSummaryResponse {
    fn from(c: ContextSummary) -> Self {
        ContextSummaryResponse {
            id: c.id,
            name: c.name,
            description: c.description,
            start_date: c.start_date.map(|d| d.to_rfc3339()),
            end_date: c.end_date.map(|d| d.to_rfc3339()),
        }
    }
}
