use async_trait::async_trait;
use tracing::debug;

use super::{require, SqliteStore};
use crate::domain::{EntityId, Phone, PhoneDraft};
use crate::error::CoreError;

const ENTITY: &str = "Telefone";

#[async_trait]
pub trait PhoneStore: Send + Sync + 'static {
    async fn create_phone(&self, draft: PhoneDraft) -> Result<Phone, CoreError>;
    async fn get_phone(&self, id: EntityId) -> Result<Phone, CoreError>;
    async fn list_phones(&self) -> Result<Vec<Phone>, CoreError>;
    async fn update_phone(&self, id: EntityId, draft: PhoneDraft) -> Result<Phone, CoreError>;
    async fn delete_phone(&self, id: EntityId) -> Result<(), CoreError>;
}

#[async_trait]
impl PhoneStore for SqliteStore {
    async fn create_phone(&self, draft: PhoneDraft) -> Result<Phone, CoreError> {
        self.timed("create_phone", self.insert_phone(draft)).await
    }

    async fn get_phone(&self, id: EntityId) -> Result<Phone, CoreError> {
        self.timed("get_phone", async {
            let phone: Option<Phone> =
                sqlx::query_as("SELECT id, number, kind, person_id FROM phones WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
            phone.ok_or_else(|| CoreError::not_found(ENTITY, id))
        })
        .await
    }

    async fn list_phones(&self) -> Result<Vec<Phone>, CoreError> {
        self.timed("list_phones", async {
            let phones: Vec<Phone> =
                sqlx::query_as("SELECT id, number, kind, person_id FROM phones ORDER BY id DESC")
                    .fetch_all(&self.pool)
                    .await?;
            Ok::<_, CoreError>(phones)
        })
        .await
    }

    async fn update_phone(&self, id: EntityId, draft: PhoneDraft) -> Result<Phone, CoreError> {
        self.timed("update_phone", self.replace_phone(id, draft)).await
    }

    async fn delete_phone(&self, id: EntityId) -> Result<(), CoreError> {
        self.timed("delete_phone", async {
            let result = sqlx::query("DELETE FROM phones WHERE id = ?1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(CoreError::not_found(ENTITY, id));
            }
            debug!(id, "phone deleted");
            Ok(())
        })
        .await
    }
}

impl SqliteStore {
    async fn insert_phone(&self, draft: PhoneDraft) -> Result<Phone, CoreError> {
        require("numero", &draft.number)?;
        require("tipo", &draft.kind)?;
        let phone: Phone = sqlx::query_as(
            "INSERT INTO phones (number, kind, person_id) VALUES (?1, ?2, ?3) \
             RETURNING id, number, kind, person_id",
        )
        .bind(&draft.number)
        .bind(&draft.kind)
        .bind(draft.person_id)
        .fetch_one(&self.pool)
        .await?;
        debug!(id = phone.id, person_id = phone.person_id, "phone created");
        Ok(phone)
    }

    async fn replace_phone(&self, id: EntityId, draft: PhoneDraft) -> Result<Phone, CoreError> {
        require("numero", &draft.number)?;
        require("tipo", &draft.kind)?;
        let phone: Option<Phone> = sqlx::query_as(
            "UPDATE phones SET number = ?1, kind = ?2, person_id = ?3 WHERE id = ?4 \
             RETURNING id, number, kind, person_id",
        )
        .bind(&draft.number)
        .bind(&draft.kind)
        .bind(draft.person_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        phone.ok_or_else(|| CoreError::not_found(ENTITY, id))
    }
}
