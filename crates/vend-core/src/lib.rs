//! vend-core: entity model, storage contract and use-case layer for the vend
//! REST API.
//!
//! ```text
//! handlers ──► service::{PersonService, …} ──► store::{PersonStore, …} ──► SqliteStore
//! ```
//!
//! The text-generation adapter in [`textgen`] sits beside this chain and is
//! not called from it.

pub mod domain;
pub mod error;
pub mod service;
pub mod store;
pub mod textgen;

pub use domain::{
    parse_id, Context, ContextDraft, ContextSummary, EntityId, Person, PersonDraft, PersonSummary,
    Phone, PhoneDraft, Prompt, PromptDraft,
};
pub use error::CoreError;
pub use service::Services;
pub use store::SqliteStore;
