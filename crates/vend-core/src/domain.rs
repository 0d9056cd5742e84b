//! Entity model.
//!
//! Four record types (people, phones, contexts and prompts) plus the
//! summaries embedded inside associations and the drafts accepted by
//! create / update. Identities and timestamps are minted by the store; a
//! draft never carries them.

use chrono::{DateTime, Utc};

use crate::error::CoreError;

/// Backend-assigned identity. Decimal integer, always positive.
pub type EntityId = i64;

/// Parse a textual identity (e.g. a URL path segment).
///
/// Only positive decimal integers are accepted; anything else is an
/// [`CoreError::InvalidIdentifier`], never a lookup.
pub fn parse_id(raw: &str) -> Result<EntityId, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::InvalidIdentifier(raw.to_owned()));
    }
    match trimmed.parse::<EntityId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CoreError::InvalidIdentifier(raw.to_owned())),
    }
}

// ── Records ──────────────────────────────────────────────────────────────────

/// A row in `people`, with its phones and linked contexts.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Person {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    #[sqlx(skip)]
    pub phones: Vec<Phone>,
    #[sqlx(skip)]
    pub contexts: Vec<ContextSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row in `phones`. Belongs to exactly one person.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Phone {
    pub id: EntityId,
    pub number: String,
    /// Category label, e.g. `"celular"` or `"comercial"`.
    pub kind: String,
    pub person_id: EntityId,
}

/// A row in `contexts`, with its members and prompts.
///
/// `start_date` and `end_date` carry no ordering invariant.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Context {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    pub people: Vec<PersonSummary>,
    #[sqlx(skip)]
    pub prompts: Vec<Prompt>,
}

/// A row in `prompts`. Belongs to exactly one context.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Prompt {
    pub id: EntityId,
    pub content: String,
    pub context_id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Person as embedded inside a [`Context`].
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PersonSummary {
    pub id: EntityId,
    pub name: String,
    pub email: String,
}

/// Context as embedded inside a [`Person`].
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ContextSummary {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

// ── Drafts ───────────────────────────────────────────────────────────────────

/// Caller-supplied fields of a [`Person`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDraft {
    pub name: String,
    pub email: String,
}

/// Caller-supplied fields of a [`Phone`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneDraft {
    pub number: String,
    pub kind: String,
    pub person_id: EntityId,
}

/// Caller-supplied fields of a [`Context`].
#[derive(Debug, Clone, PartialEq)]
pub struct ContextDraft {
    pub name: String,
    pub description: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Member set. `None` keeps the current members on update (and means
    /// "no members" on create); `Some` replaces them.
    pub person_ids: Option<Vec<EntityId>>,
}

/// Caller-supplied fields of a [`Prompt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDraft {
    pub content: String,
    pub context_id: EntityId,
}

// ── Tests ──────────────────────────────────────────────────────────────────────
