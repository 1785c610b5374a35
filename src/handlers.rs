use crate::discovery;
use crate::errors::AppError;
use crate::gateway_client::GeminiClient;
use crate::lead_service;
use crate::lead_store::LeadStore;
use crate::list_store::ListStore;
use crate::models::*;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Client for the Gemini gateway (discovery + analysis).
    pub gateway: GeminiClient,
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "leadscout-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /api/v1/leads/discover
///
/// Runs one gateway search for prospective partners. Nothing is persisted;
/// the response flags the results as non-deterministic so the client can warn
/// that a re-run may differ.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `req` - JSON body with `country`, `niche` and optional `max_results`.
///
/// # Returns
///
/// * `Result<Json<DiscoverResponse>, AppError>` - Normalized candidates or an error.
pub async fn discover_leads(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DiscoverRequest>,
) -> Result<Json<DiscoverResponse>, AppError> {
    tracing::info!(
        "POST /leads/discover - country: {}, niche: {}, max_results: {:?}",
        req.country,
        req.niche,
        req.max_results
    );

    let max_results = req.max_results.unwrap_or(discovery::DEFAULT_MAX_RESULTS);
    if max_results < 1 || max_results > discovery::MAX_RESULTS_LIMIT {
        return Err(AppError::BadRequest(format!(
            "max_results must be between 1 and {}",
            discovery::MAX_RESULTS_LIMIT
        )));
    }

    let candidates =
        discovery::discover_partners(&state.gateway, &req.country, &req.niche, max_results).await?;

    Ok(Json(DiscoverResponse {
        candidates,
        deterministic: false,
    }))
}

/// POST /api/v1/leads/save
///
/// Runs the save/dedup pipeline on a candidate batch. Conflicting candidates
/// are reported (not written) so the client can confirm and re-save the
/// narrowed set with `overwrite=true`.
pub async fn save_leads(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveLeadsRequest>,
) -> Result<Json<SaveReport>, AppError> {
    tracing::info!(
        "POST /leads/save - {} candidates, overwrite={}",
        req.leads.len(),
        req.overwrite
    );

    let store = LeadStore::new(state.db.clone());
    let report = lead_service::save_leads(&store, &req).await?;

    tracing::info!(
        "Save report: created={}, updated={}, conflicts={}",
        report.created,
        report.updated,
        report.conflicts.len()
    );

    Ok(Json(report))
}

/// POST /api/v1/leads/{id}/analyze
///
/// Scores one lead against the rubric and persists the result. All-or-nothing:
/// a gateway or validation failure leaves the lead untouched.
pub async fn analyze_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Lead>, AppError> {
    tracing::info!("POST /leads/{}/analyze", id);

    let store = LeadStore::new(state.db.clone());
    let lead = lead_service::analyze_lead(&store, &state.gateway, id).await?;

    Ok(Json(lead))
}

/// GET /api/v1/leads
///
/// Lists leads with optional read-time filters: `status`, `bucket`,
/// `include_deleted` (default false).
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeadListParams>,
) -> Result<Json<Vec<Lead>>, AppError> {
    if let Some(ref status) = params.status {
        if LeadStatus::parse(status).is_none() {
            return Err(AppError::BadRequest(format!(
                "status must be one of new, contacted, interested, pending_contact (got '{}')",
                status
            )));
        }
    }
    if let Some(ref bucket) = params.bucket {
        if ScoreBucket::parse(bucket).is_none() {
            return Err(AppError::BadRequest(format!(
                "bucket must be one of A, B, C, Nurture (got '{}')",
                bucket
            )));
        }
    }

    let store = LeadStore::new(state.db.clone());
    let leads = store.list(&params).await?;

    Ok(Json(leads))
}

/// GET /api/v1/leads/{id}
///
/// Fetches one lead by id, retrievable regardless of its soft-delete state.
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Lead>, AppError> {
    let store = LeadStore::new(state.db.clone());
    let lead = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", id)))?;

    Ok(Json(lead))
}

/// PATCH /api/v1/leads/{id}
///
/// Applies a user edit to the user-editable fields (name, url, country,
/// niche, type, status, notes). Pipelines own everything else; concurrent
/// edits are last-write-wins by design.
pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLeadRequest>,
) -> Result<Json<Lead>, AppError> {
    if let Some(ref url) = req.url {
        if url.trim().is_empty() {
            return Err(AppError::BadRequest("url must not be empty".to_string()));
        }
    }
    if let Some(ref name) = req.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("name must not be empty".to_string()));
        }
    }

    let store = LeadStore::new(state.db.clone());
    let lead = store.update_profile(id, &req).await?;

    Ok(Json(lead))
}

/// DELETE /api/v1/leads/{id}
///
/// Soft delete: flags the lead and pulls its id from every prospect list. The
/// record itself is retained and can be revived by a save with
/// `overwrite=true`.
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    tracing::info!("DELETE /leads/{}", id);

    let store = LeadStore::new(state.db.clone());
    store.soft_delete(id).await?;

    Ok(Json(json!({ "deleted": true, "id": id })))
}

/// GET /api/v1/lists
pub async fn get_lists(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProspectList>>, AppError> {
    let store = ListStore::new(state.db.clone());
    Ok(Json(store.all().await?))
}

/// POST /api/v1/lists
pub async fn create_list(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateListRequest>,
) -> Result<(StatusCode, Json<ProspectList>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }

    let store = ListStore::new(state.db.clone());
    let list = store
        .create(req.name.trim(), req.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(list)))
}

/// DELETE /api/v1/lists/{id}
pub async fn delete_list(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = ListStore::new(state.db.clone());
    store.delete(id).await?;

    Ok(Json(json!({ "deleted": true, "id": id })))
}

/// POST /api/v1/lists/{id}/leads/{lead_id}
///
/// Adds an existing lead to a list; idempotent for repeated adds.
pub async fn add_list_lead(
    State(state): State<Arc<AppState>>,
    Path((id, lead_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProspectList>, AppError> {
    let leads = LeadStore::new(state.db.clone());
    if leads.find_by_id(lead_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Lead {} not found", lead_id)));
    }

    let store = ListStore::new(state.db.clone());
    let list = store.add_lead(id, lead_id).await?;

    Ok(Json(list))
}

/// DELETE /api/v1/lists/{id}/leads/{lead_id}
pub async fn remove_list_lead(
    State(state): State<Arc<AppState>>,
    Path((id, lead_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProspectList>, AppError> {
    let store = ListStore::new(state.db.clone());
    let list = store.remove_lead(id, lead_id).await?;

    Ok(Json(list))
}
