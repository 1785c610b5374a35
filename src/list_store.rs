use crate::errors::AppError;
use crate::models::ProspectList;
use sqlx::PgPool;
use uuid::Uuid;

/// Minimal storage for prospect lists.
///
/// Lists are simple groupings over lead ids; the only hard contract is that
/// soft-deleting a lead prunes its id from every list (see
/// `LeadStore::soft_delete`).
pub struct ListStore {
    pool: PgPool,
}

impl ListStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<ProspectList, AppError> {
        let list = sqlx::query_as::<_, ProspectList>(
            "INSERT INTO prospect_lists (name, description) VALUES ($1, $2) \
             RETURNING id, name, description, prospect_ids, created_at",
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(list)
    }

    pub async fn all(&self) -> Result<Vec<ProspectList>, AppError> {
        let lists = sqlx::query_as::<_, ProspectList>(
            "SELECT id, name, description, prospect_ids, created_at FROM prospect_lists \
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(lists)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM prospect_lists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("List {} not found", id)));
        }

        Ok(())
    }

    /// Adds a lead id to a list; adding an id twice is a no-op.
    pub async fn add_lead(&self, list_id: Uuid, lead_id: Uuid) -> Result<ProspectList, AppError> {
        let list = sqlx::query_as::<_, ProspectList>(
            "UPDATE prospect_lists SET prospect_ids = \
                 CASE WHEN $2 = ANY(prospect_ids) THEN prospect_ids \
                      ELSE array_append(prospect_ids, $2) END \
             WHERE id = $1 \
             RETURNING id, name, description, prospect_ids, created_at",
        )
        .bind(list_id)
        .bind(lead_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("List {} not found", list_id)))?;

        Ok(list)
    }

    pub async fn remove_lead(
        &self,
        list_id: Uuid,
        lead_id: Uuid,
    ) -> Result<ProspectList, AppError> {
        let list = sqlx::query_as::<_, ProspectList>(
            "UPDATE prospect_lists SET prospect_ids = array_remove(prospect_ids, $2) \
             WHERE id = $1 \
             RETURNING id, name, description, prospect_ids, created_at",
        )
        .bind(list_id)
        .bind(lead_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("List {} not found", list_id)))?;

        Ok(list)
    }
}
