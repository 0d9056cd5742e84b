use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;
use vend_core::{Phone, PhoneDraft};

use super::not_blank;

/// Body of `POST /telefones` and `PUT /telefones/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PhoneRequest {
    #[serde(rename = "numero")]
    #[validate(custom(function = "not_blank"))]
    pub number: String,
    /// Category label, e.g. `celular`.
    #[serde(rename = "tipo")]
    #[validate(custom(function = "not_blank"))]
    pub kind: String,
    #[serde(rename = "pessoa_id")]
    #[validate(range(min = 1, message = "pessoa_id deve ser positivo"))]
    pub person_id: i64,
}

impl From<PhoneRequest> for PhoneDraft {
    fn from(req: PhoneRequest) -> Self {
        PhoneDraft { number: req.number, kind: req.kind, person_id: req.person_id }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhoneResponse {
    pub id: i64,
    #[serde(rename = "numero")]
    pub number: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "pessoa_id")]
    pub person_id: i64,
}

impl From<Phone> for PhoneResponse {
    fn from(p: Phone) -> Self {
        PhoneResponse { id: p.id, number: p.number, kind: p.kind, person_id: p.person_id }
    }
}
