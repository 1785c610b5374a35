use crate::errors::AppError;
use crate::models::{
    BulkWriteOutcome, ExistingLeadSummary, Lead, LeadEnrichment, LeadListParams, LeadRow,
    LeadScoring, StagedUpsert, UpdateLeadRequest,
};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

const LEAD_COLUMNS: &str = "id, url, name, email, phone, country, niche, lead_type, signals, \
                            social_media, status, scoring, enrichment, is_deleted, notes, created_at";

/// Database storage for leads.
///
/// Uses sequential runtime queries over a shared pool; url uniqueness is
/// enforced by the store's UNIQUE constraint, not application logic.
pub struct LeadStore {
    pool: PgPool,
}

impl LeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Batched lookup of existing leads for the save pipeline.
    ///
    /// One query for the whole batch; fetches only the slim projection the
    /// conflict report needs.
    pub async fn find_by_urls(
        &self,
        urls: &[String],
    ) -> Result<Vec<ExistingLeadSummary>, AppError> {
        let existing = sqlx::query_as::<_, ExistingLeadSummary>(
            "SELECT id, url, name, is_deleted FROM leads WHERE url = ANY($1)",
        )
        .bind(urls)
        .fetch_all(&self.pool)
        .await?;

        Ok(existing)
    }

    /// Applies staged upserts as an unordered bulk write.
    ///
    /// Each row is its own `INSERT .. ON CONFLICT (url) DO UPDATE` statement
    /// with no wrapping transaction, so one bad row does not block the others
    /// (availability over atomicity). `status` is set only on insert and
    /// `created_at` keeps its original value on conflict; `is_deleted` is
    /// always reset to false, which is what revives a soft-deleted lead.
    ///
    /// Returns a `BulkWriteOutcome` reflecting what the write actually did:
    /// `xmax = 0` is true exactly when the row was freshly inserted, and every
    /// failed row is counted so the service layer can surface the failure.
    pub async fn bulk_upsert(&self, staged: &[StagedUpsert]) -> BulkWriteOutcome {
        let mut outcome = BulkWriteOutcome::default();

        for op in staged {
            let result = sqlx::query_scalar::<_, bool>(
                "INSERT INTO leads \
                     (url, name, email, phone, country, niche, lead_type, signals, social_media, \
                      status, is_deleted) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'new', FALSE) \
                 ON CONFLICT (url) DO UPDATE SET \
                     name = EXCLUDED.name, \
                     email = EXCLUDED.email, \
                     phone = EXCLUDED.phone, \
                     country = EXCLUDED.country, \
                     niche = EXCLUDED.niche, \
                     lead_type = EXCLUDED.lead_type, \
                     signals = EXCLUDED.signals, \
                     social_media = EXCLUDED.social_media, \
                     is_deleted = FALSE \
                 RETURNING (xmax = 0) AS inserted",
            )
            .bind(&op.url)
            .bind(&op.name)
            .bind(&op.email)
            .bind(&op.phone)
            .bind(&op.country)
            .bind(&op.niche)
            .bind(&op.lead_type)
            .bind(Json(&op.signals))
            .bind(Json(&op.social_media))
            .fetch_one(&self.pool)
            .await;

            match result {
                Ok(true) => outcome.created += 1,
                Ok(false) => outcome.updated += 1,
                Err(e) => {
                    tracing::error!("Upsert failed for url {}: {}", op.url, e);
                    outcome.failed += 1;
                    outcome.last_error = Some(e.to_string());
                }
            }
        }

        outcome
    }

    /// Fetches a lead by id, soft-deleted or not.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {} FROM leads WHERE id = $1",
            LEAD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Lead::from))
    }

    /// Lists leads with read-time filters. Soft-deleted leads are excluded
    /// unless `include_deleted` is set.
    pub async fn list(&self, params: &LeadListParams) -> Result<Vec<Lead>, AppError> {
        let include_deleted = params.include_deleted.unwrap_or(false);

        let rows = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {} FROM leads \
             WHERE ($1::bool OR NOT is_deleted) \
               AND ($2::text IS NULL OR status = $2) \
               AND ($3::text IS NULL OR scoring->>'bucket' = $3) \
             ORDER BY created_at DESC",
            LEAD_COLUMNS
        ))
        .bind(include_deleted)
        .bind(&params.status)
        .bind(&params.bucket)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Lead::from).collect())
    }

    /// Applies a user edit to the user-editable fields only.
    ///
    /// Editing a soft-deleted lead is permitted. A url change that collides
    /// with another lead maps to `BadRequest` rather than a generic 500.
    pub async fn update_profile(
        &self,
        id: Uuid,
        req: &UpdateLeadRequest,
    ) -> Result<Lead, AppError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "UPDATE leads SET \
                 name = COALESCE($2, name), \
                 url = COALESCE($3, url), \
                 country = COALESCE($4, country), \
                 niche = COALESCE($5, niche), \
                 lead_type = COALESCE($6, lead_type), \
                 status = COALESCE($7, status), \
                 notes = COALESCE($8, notes) \
             WHERE id = $1 \
             RETURNING {}",
            LEAD_COLUMNS
        ))
        .bind(id)
        .bind(&req.name)
        .bind(req.url.as_deref().map(str::trim))
        .bind(&req.country)
        .bind(&req.niche)
        .bind(&req.lead_type)
        .bind(req.status.map(|s| s.as_str()))
        .bind(&req.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .map(|dbe| dbe.is_unique_violation())
                .unwrap_or(false)
            {
                AppError::BadRequest("url is already taken by another lead".to_string())
            } else {
                AppError::DatabaseError(e)
            }
        })?
        .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", id)))?;

        Ok(Lead::from(row))
    }

    /// Persists a scoring run: `enrichment` and `scoring` are replaced
    /// wholesale in a single statement. No other column is touched.
    pub async fn update_analysis(
        &self,
        id: Uuid,
        enrichment: &LeadEnrichment,
        scoring: &LeadScoring,
    ) -> Result<Lead, AppError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "UPDATE leads SET enrichment = $2, scoring = $3 WHERE id = $1 RETURNING {}",
            LEAD_COLUMNS
        ))
        .bind(id)
        .bind(Json(enrichment))
        .bind(Json(scoring))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", id)))?;

        Ok(Lead::from(row))
    }

    /// Soft-deletes a lead and pulls its id from every prospect list.
    ///
    /// Both writes happen in one transaction so list membership can never
    /// point at a lead the caller believes deleted. The row itself is
    /// retained.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE leads SET is_deleted = TRUE WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Lead {} not found", id)));
        }

        sqlx::query(
            "UPDATE prospect_lists SET prospect_ids = array_remove(prospect_ids, $1) \
             WHERE $1 = ANY(prospect_ids)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Soft-deleted lead {} and pruned list membership", id);
        Ok(())
    }
}
