//! Use-case layer.
//!
//! Pure delegation: one method per store operation, same arguments, no extra
//! validation and no error translation. The services hold the store behind a
//! trait object so handlers never name the concrete backend and tests can
//! inject a double.

use std::fmt;
use std::sync::Arc;

use crate::domain::{
    Context, ContextDraft, EntityId, Person, PersonDraft, Phone, PhoneDraft, Prompt, PromptDraft,
};
use crate::error::CoreError;
use crate::store::{ContextStore, PersonStore, PhoneStore, PromptStore};

#[derive(Clone)]
pub struct PersonService {
    store: Arc<dyn PersonStore>,
}

impl PersonService {
    pub fn new(store: Arc<dyn PersonStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: PersonDraft) -> Result<Person, CoreError> {
        self.store.create_person(draft).await
    }

    pub async fn get(&self, id: EntityId) -> Result<Person, CoreError> {
        self.store.get_person(id).await
    }

    pub async fn list(&self) -> Result<Vec<Person>, CoreError> {
        self.store.list_people().await
    }

    pub async fn update(&self, id: EntityId, draft: PersonDraft) -> Result<Person, CoreError> {
        self.store.update_person(id, draft).await
    }

    pub async fn delete(&self, id: EntityId) -> Result<(), CoreError> {
        self.store.delete_person(id).await
    }
}

#[derive(Clone)]
pub struct PhoneService {
    store: Arc<dyn PhoneStore>,
}

impl PhoneService {
    pub fn new(store: Arc<dyn PhoneStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: PhoneDraft) -> Result<Phone, CoreError> {
        self.store.create_phone(draft).await
    }

    pub async fn get(&self, id: EntityId) -> Result<Phone, CoreError> {
        self.store.get_phone(id).await
    }

    pub async fn list(&self) -> Result<Vec<Phone>, CoreError> {
        self.store.list_phones().await
    }

    pub async fn update(&self, id: EntityId, draft: PhoneDraft) -> Result<Phone, CoreError> {
        self.store.update_phone(id, draft).await
    }

    pub async fn delete(&self, id: EntityId) -> Result<(), CoreError> {
        self.store.delete_phone(id).await
    }
}

#[derive(Clone)]
pub struct ContextService {
    store: Arc<dyn ContextStore>,
}

impl ContextService {
    pub fn new(store: Arc<dyn ContextStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: ContextDraft) -> Result<Context, CoreError> {
        self.store.create_context(draft).await
    }

    pub async fn get(&self, id: EntityId) -> Result<Context, CoreError> {
        self.store.get_context(id).await
    }

    pub async fn list(&self) -> Result<Vec<Context>, CoreError> {
        self.store.list_contexts().await
    }

    pub async fn update(&self, id: EntityId, draft: ContextDraft) -> Result<Context, CoreError> {
        self.store.update_context(id, draft).await
    }

    pub async fn delete(&self, id: EntityId) -> Result<(), CoreError> {
        self.store.delete_context(id).await
    }
}

#[derive(Clone)]
pub struct PromptService {
    store: Arc<dyn PromptStore>,
}

impl PromptService {
    pub fn new(store: Arc<dyn PromptStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: PromptDraft) -> Result<Prompt, CoreError> {
        self.store.create_prompt(draft).await
    }

    pub async fn get(&self, id: EntityId) -> Result<Prompt, CoreError> {
        self.store.get_prompt(id).await
    }

    pub async fn list(&self) -> Result<Vec<Prompt>, CoreError> {
        self.store.list_prompts().await
    }

    pub async fn update(&self, id: EntityId, draft: PromptDraft) -> Result<Prompt, CoreError> {
        self.store.update_prompt(id, draft).await
    }

    pub async fn delete(&self, id: EntityId) -> Result<(), CoreError> {
        self.store.delete_prompt(id).await
    }
}

/// The four services, usually built over one store.
#[derive(Clone)]
pub struct Services {
    pub people: PersonService,
    pub phones: PhoneService,
    pub contexts: ContextService,
    pub prompts: PromptService,
}

impl Services {
    /// Wire every service to the same store.
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: PersonStore + PhoneStore + ContextStore + PromptStore,
    {
        Self {
            people: PersonService::new(store.clone()),
            phones: PhoneService::new(store.clone()),
            contexts: ContextService::new(store.clone()),
            prompts: PromptService::new(store),
        }
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
