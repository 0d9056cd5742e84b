use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use super::{require, SqliteStore};
use crate::domain::{EntityId, Prompt, PromptDraft};
use crate::error::CoreError;

const ENTITY: &str = "Prompt";

#[async_trait]
pub trait PromptStore: Send + Sync + 'static {
    async fn create_prompt(&self, draft: PromptDraft) -> Result<Prompt, CoreError>;
    async fn get_prompt(&self, id: EntityId) -> Result<Prompt, CoreError>;
    async fn list_prompts(&self) -> Result<Vec<Prompt>, CoreError>;
    async fn update_prompt(&self, id: EntityId, draft: PromptDraft) -> Result<Prompt, CoreError>;
    async fn delete_prompt(&self, id: EntityId) -> Result<(), CoreError>;
}

#[async_trait]
impl PromptStore for SqliteStore {
    async fn create_prompt(&self, draft: PromptDraft) -> Result<Prompt, CoreError> {
        self.timed("create_prompt", self.insert_prompt(draft)).await
    }

    async fn get_prompt(&self, id: EntityId) -> Result<Prompt, CoreError> {
        self.timed("get_prompt", async {
            let prompt: Option<Prompt> = sqlx::query_as(
                "SELECT id, content, context_id, created_at, updated_at FROM prompts WHERE id = ?1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
            prompt.ok_or_else(|| CoreError::not_found(ENTITY, id))
        })
        .await
    }

    async fn list_prompts(&self) -> Result<Vec<Prompt>, CoreError> {
        self.timed("list_prompts", async {
            let prompts: Vec<Prompt> = sqlx::query_as(
                "SELECT id, content, context_id, created_at, updated_at \
                 FROM prompts ORDER BY id DESC",
            )
            .fetch_all(&self.pool)
            .await?;
            Ok::<_, CoreError>(prompts)
        })
        .await
    }

    async fn update_prompt(&self, id: EntityId, draft: PromptDraft) -> Result<Prompt, CoreError> {
        self.timed("update_prompt", self.replace_prompt(id, draft)).await
    }

    async fn delete_prompt(&self, id: EntityId) -> Result<(), CoreError> {
        self.timed("delete_prompt", async {
            let result = sqlx::query("DELETE FROM prompts WHERE id = ?1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(CoreError::not_found(ENTITY, id));
            }
            debug!(id, "prompt deleted");
            Ok(())
        })
        .await
    }
}

impl SqliteStore {
    async fn insert_prompt(&self, draft: PromptDraft) -> Result<Prompt, CoreError> {
        require("conteudo", &draft.content)?;
        let prompt: Prompt = sqlx::query_as(
            "INSERT INTO prompts (content, context_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?3) \
             RETURNING id, content, context_id, created_at, updated_at",
        )
        .bind(&draft.content)
        .bind(draft.context_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        debug!(id = prompt.id, context_id = prompt.context_id, "prompt created");
        Ok(prompt)
    }

    async fn replace_prompt(&self, id: EntityId, draft: PromptDraft) -> Result<Prompt, CoreError> {
        require("conteudo", &draft.content)?;
        let prompt: Option<Prompt> = sqlx::query_as(
            "UPDATE prompts SET content = ?1, context_id = ?2, updated_at = ?3 WHERE id = ?4 \
             RETURNING id, content, context_id, created_at, updated_at",
        )
        .bind(&draft.content)
        .bind(draft.context_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        prompt.ok_or_else(|| CoreError::not_found(ENTITY, id))
    }
}
