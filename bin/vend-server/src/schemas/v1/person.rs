use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;
use vend_core::{Person, PersonDraft, PersonSummary};

use super::context::ContextSummaryResponse;
use super::not_blank;
use super::phone::PhoneResponse;

/// Body of `POST /pessoas` and `PUT /pessoas/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PersonRequest {
    #[serde(rename = "nome")]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(email(message = "email inválido"))]
    pub email: String,
}

impl From<PersonRequest> for PersonDraft {
    fn from(req: PersonRequest) -> Self {
        PersonDraft { name: req.name, email: req.email }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonResponse {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefones")]
    pub phones: Vec<PhoneResponse>,
    #[serde(rename = "contextos")]
    pub contexts: Vec<ContextSummaryResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Person> for PersonResponse {
    fn from(p: Person) -> Self {
        PersonResponse {
            id: p.id,
            name: p.name,
            email: p.email,
            phones: p.phones.into_iter().map(Into::into).collect(),
            contexts: p.contexts.into_iter().map(Into::into).collect(),
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// Person as listed inside a context.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonSummaryResponse {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
}

impl From<PersonSummary> for PersonSummaryResponse {
    fn from(p: PersonSummary) -> Self {
        PersonSummaryResponse { id: p.id, name: p.name, email: p.email }
    }
}
