use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use super::{require, SqliteStore};
use crate::domain::{ContextSummary, EntityId, Person, PersonDraft, Phone};
use crate::error::CoreError;

const ENTITY: &str = "Pessoa";

#[async_trait]
pub trait PersonStore: Send + Sync + 'static {
    async fn create_person(&self, draft: PersonDraft) -> Result<Person, CoreError>;
    async fn get_person(&self, id: EntityId) -> Result<Person, CoreError>;
    async fn list_people(&self) -> Result<Vec<Person>, CoreError>;
    async fn update_person(&self, id: EntityId, draft: PersonDraft) -> Result<Person, CoreError>;
    async fn delete_person(&self, id: EntityId) -> Result<(), CoreError>;
}

#[derive(sqlx::FromRow)]
struct LinkedContext {
    person_id: EntityId,
    #[sqlx(flatten)]
    context: ContextSummary,
}

#[async_trait]
impl PersonStore for SqliteStore {
    async fn create_person(&self, draft: PersonDraft) -> Result<Person, CoreError> {
        self.timed("create_person", self.insert_person(draft)).await
    }

    async fn get_person(&self, id: EntityId) -> Result<Person, CoreError> {
        self.timed("get_person", self.select_person(id)).await
    }

    async fn list_people(&self) -> Result<Vec<Person>, CoreError> {
        self.timed("list_people", self.select_people()).await
    }

    async fn update_person(&self, id: EntityId, draft: PersonDraft) -> Result<Person, CoreError> {
        self.timed("update_person", self.replace_person(id, draft)).await
    }

    async fn delete_person(&self, id: EntityId) -> Result<(), CoreError> {
        self.timed("delete_person", self.remove_person(id)).await
    }
}

impl SqliteStore {
    async fn insert_person(&self, draft: PersonDraft) -> Result<Person, CoreError> {
        require("nome", &draft.name)?;
        require("email", &draft.email)?;
        let now = Utc::now();
        let person: Person = sqlx::query_as(
            "INSERT INTO people (name, email, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?3) \
             RETURNING id, name, email, created_at, updated_at",
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        debug!(id = person.id, "person created");
        Ok(person)
    }

    async fn select_person(&self, id: EntityId) -> Result<Person, CoreError> {
        let mut conn = self.pool.acquire().await?;
        let person: Option<Person> = sqlx::query_as(
            "SELECT id, name, email, created_at, updated_at FROM people WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        let mut people = vec![person.ok_or_else(|| CoreError::not_found(ENTITY, id))?];
        attach_links(&mut *conn, &mut people, Some(id)).await?;
        Ok(people.remove(0))
    }

    async fn select_people(&self) -> Result<Vec<Person>, CoreError> {
        let mut conn = self.pool.acquire().await?;
        let mut people: Vec<Person> = sqlx::query_as(
            "SELECT id, name, email, created_at, updated_at FROM people ORDER BY id DESC",
        )
        .fetch_all(&mut *conn)
        .await?;
        attach_links(&mut *conn, &mut people, None).await?;
        Ok(people)
    }

    async fn replace_person(&self, id: EntityId, draft: PersonDraft) -> Result<Person, CoreError> {
        require("nome", &draft.name)?;
        require("email", &draft.email)?;
        let mut tx = self.pool.begin().await?;
        let person: Option<Person> = sqlx::query_as(
            "UPDATE people SET name = ?1, email = ?2, updated_at = ?3 WHERE id = ?4 \
             RETURNING id, name, email, created_at, updated_at",
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let mut people = vec![person.ok_or_else(|| CoreError::not_found(ENTITY, id))?];
        attach_links(&mut *tx, &mut people, Some(id)).await?;
        tx.commit().await?;
        debug!(id, "person updated");
        Ok(people.remove(0))
    }

    async fn remove_person(&self, id: EntityId) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM people WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(ENTITY, id));
        }
        debug!(id, "person deleted");
        Ok(())
    }
}

/// Fill `phones` and `contexts` on each person. `only` narrows the queries to
/// a single person.
async fn attach_links(
    conn: &mut SqliteConnection,
    people: &mut [Person],
    only: Option<EntityId>,
) -> Result<(), sqlx::Error> {
    let (phones, links): (Vec<Phone>, Vec<LinkedContext>) = match only {
        Some(id) => (
            sqlx::query_as(
                "SELECT id, number, kind, person_id FROM phones WHERE person_id = ?1 ORDER BY id",
            )
            .bind(id)
            .fetch_all(&mut *conn)
            .await?,
            sqlx::query_as(
                "SELECT cp.person_id, c.id, c.name, c.description, c.start_date, c.end_date \
                 FROM context_people cp JOIN contexts c ON c.id = cp.context_id \
                 WHERE cp.person_id = ?1 ORDER BY c.id",
            )
            .bind(id)
            .fetch_all(&mut *conn)
            .await?,
        ),
        None => (
            sqlx::query_as("SELECT id, number, kind, person_id FROM phones ORDER BY id")
                .fetch_all(&mut *conn)
                .await?,
            sqlx::query_as(
                "SELECT cp.person_id, c.id, c.name, c.description, c.start_date, c.end_date \
                 FROM context_people cp JOIN contexts c ON c.id = cp.context_id \
                 ORDER BY c.id",
            )
            .fetch_all(&mut *conn)
            .await?,
        ),
    };

    let mut phones_by_person: HashMap<EntityId, Vec<Phone>> = HashMap::new();
    for phone in phones {
        phones_by_person.entry(phone.person_id).or_default().push(phone);
    }
    let mut contexts_by_person: HashMap<EntityId, Vec<ContextSummary>> = HashMap::new();
    for link in links {
        contexts_by_person.entry(link.person_id).or_default().push(link.context);
    }

    for person in people.iter_mut() {
        person.phones = phones_by_person.remove(&person.id).unwrap_or_default();
        person.contexts = contexts_by_person.remove(&person.id).unwrap_or_default();
    }
    Ok(())
}
