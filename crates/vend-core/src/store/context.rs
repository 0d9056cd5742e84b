use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use sqlx::SqliteConnection;
use tracing::debug;

use super::{require, SqliteStore};
use crate::domain::{Context, ContextDraft, EntityId, PersonSummary, Prompt};
use crate::error::CoreError;

const ENTITY: &str = "Contexto";

/// Storage contract for contexts.
///
/// A context owns its member set: [`ContextDraft::person_ids`] replaces the
/// rows in `context_people` in the same transaction as the field update.
#[async_trait]
pub trait ContextStore: Send + Sync + 'static {
    async fn create_context(&self, draft: ContextDraft) -> Result<Context, CoreError>;
    async fn get_context(&self, id: EntityId) -> Result<Context, CoreError>;
    async fn list_contexts(&self) -> Result<Vec<Context>, CoreError>;
    async fn update_context(&self, id: EntityId, draft: ContextDraft) -> Result<Context, CoreError>;
    async fn delete_context(&self, id: EntityId) -> Result<(), CoreError>;
}

#[derive(sqlx::FromRow)]
struct Member {
    context_id: EntityId,
    #[sqlx(flatten)]
    person: PersonSummary,
}

#[async_trait]
impl ContextStore for SqliteStore {
    async fn create_context(&self, draft: ContextDraft) -> Result<Context, CoreError> {
        self.timed("create_context", self.insert_context(draft)).await
    }

    async fn get_context(&self, id: EntityId) -> Result<Context, CoreError> {
        self.timed("get_context", self.select_context(id)).await
    }

    async fn list_contexts(&self) -> Result<Vec<Context>, CoreError> {
        self.timed("list_contexts", self.select_contexts()).await
    }

    async fn update_context(&self, id: EntityId, draft: ContextDraft) -> Result<Context, CoreError> {
        self.timed("update_context", self.replace_context(id, draft)).await
    }

    async fn delete_context(&self, id: EntityId) -> Result<(), CoreError> {
        self.timed("delete_context", async {
            let result = sqlx::query("DELETE FROM contexts WHERE id = ?1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(CoreError::not_found(ENTITY, id));
            }
            debug!(id, "context deleted");
            Ok(())
        })
        .await
    }
}

impl SqliteStore {
    async fn insert_context(&self, draft: ContextDraft) -> Result<Context, CoreError> {
        require("nome", &draft.name)?;
        let mut tx = self.pool.begin().await?;
        let context: Context = sqlx::query_as(
            "INSERT INTO contexts (name, description, start_date, end_date) \
             VALUES (?1, ?2, ?3, ?4) \
             RETURNING id, name, description, start_date, end_date",
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .fetch_one(&mut *tx)
        .await?;
        let id = context.id;
        if let Some(person_ids) = &draft.person_ids {
            link_members(&mut *tx, id, person_ids).await?;
        }
        let mut contexts = vec![context];
        attach_links(&mut *tx, &mut contexts, Some(id)).await?;
        tx.commit().await?;
        debug!(id, "context created");
        Ok(contexts.remove(0))
    }

    async fn select_context(&self, id: EntityId) -> Result<Context, CoreError> {
        let mut conn = self.pool.acquire().await?;
        let context: Option<Context> = sqlx::query_as(
            "SELECT id, name, description, start_date, end_date FROM contexts WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        let mut contexts = vec![context.ok_or_else(|| CoreError::not_found(ENTITY, id))?];
        attach_links(&mut *conn, &mut contexts, Some(id)).await?;
        Ok(contexts.remove(0))
    }

    async fn select_contexts(&self) -> Result<Vec<Context>, CoreError> {
        let mut conn = self.pool.acquire().await?;
        let mut contexts: Vec<Context> = sqlx::query_as(
            "SELECT id, name, description, start_date, end_date FROM contexts ORDER BY id DESC",
        )
        .fetch_all(&mut *conn)
        .await?;
        attach_links(&mut *conn, &mut contexts, None).await?;
        Ok(contexts)
    }

    async fn replace_context(&self, id: EntityId, draft: ContextDraft) -> Result<Context, CoreError> {
        require("nome", &draft.name)?;
        let mut tx = self.pool.begin().await?;
        let context: Option<Context> = sqlx::query_as(
            "UPDATE contexts SET name = ?1, description = ?2, start_date = ?3, end_date = ?4 \
             WHERE id = ?5 \
             RETURNING id, name, description, start_date, end_date",
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let mut contexts = vec![context.ok_or_else(|| CoreError::not_found(ENTITY, id))?];
        if let Some(person_ids) = &draft.person_ids {
            sqlx::query("DELETE FROM context_people WHERE context_id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            link_members(&mut *tx, id, person_ids).await?;
        }
        attach_links(&mut *tx, &mut contexts, Some(id)).await?;
        tx.commit().await?;
        debug!(id, "context updated");
        Ok(contexts.remove(0))
    }
}

/// Insert one `context_people` row per distinct person id.
async fn link_members(
    conn: &mut SqliteConnection,
    context_id: EntityId,
    person_ids: &[EntityId],
) -> Result<(), sqlx::Error> {
    let unique: BTreeSet<EntityId> = person_ids.iter().copied().collect();
    for person_id in unique {
        sqlx::query("INSERT INTO context_people (context_id, person_id) VALUES (?1, ?2)")
            .bind(context_id)
            .bind(person_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Fill `people` and `prompts` on each context. `only` narrows the queries
/// to a single context.
async fn attach_links(
    conn: &mut SqliteConnection,
    contexts: &mut [Context],
    only: Option<EntityId>,
) -> Result<(), sqlx::Error> {
    let (members, prompts): (Vec<Member>, Vec<Prompt>) = match only {
        Some(id) => (
            sqlx::query_as(
                "SELECT cp.context_id, p.id, p.name, p.email \
                 FROM context_people cp JOIN people p ON p.id = cp.person_id \
                 WHERE cp.context_id = ?1 ORDER BY p.id",
            )
            .bind(id)
            .fetch_all(&mut *conn)
            .await?,
            sqlx::query_as(
                "SELECT id, content, context_id, created_at, updated_at \
                 FROM prompts WHERE context_id = ?1 ORDER BY id",
            )
            .bind(id)
            .fetch_all(&mut *conn)
            .await?,
        ),
        None => (
            sqlx::query_as(
                "SELECT cp.context_id, p.id, p.name, p.email \
                 FROM context_people cp JOIN people p ON p.id = cp.person_id \
                 ORDER BY p.id",
            )
            .fetch_all(&mut *conn)
            .await?,
            sqlx::query_as(
                "SELECT id, content, context_id, created_at, updated_at FROM prompts ORDER BY id",
            )
            .fetch_all(&mut *conn)
            .await?,
        ),
    };

    let mut people_by_context: HashMap<EntityId, Vec<PersonSummary>> = HashMap::new();
    for member in members {
        people_by_context.entry(member.context_id).or_default().push(member.person);
    }
    let mut prompts_by_context: HashMap<EntityId, Vec<Prompt>> = HashMap::new();
    for prompt in prompts {
        prompts_by_context.entry(prompt.context_id).or_default().push(prompt);
    }

    for context in contexts.iter_mut() {
        context.people = people_by_context.remove(&context.id).unwrap_or_default();
        context.prompts = prompts_by_context.remove(&context.id).unwrap_or_default();
    }
    Ok(())
}
