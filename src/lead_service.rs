/// Core lead pipelines shared by the HTTP handlers.
///
/// Save/dedup workflow:
/// 1. Collect distinct trimmed urls from the incoming batch
/// 2. One batched lookup of existing leads by url
/// 3. Partition candidates into staged upserts vs. conflicts
/// 4. Unordered bulk write, counting inserts and updates separately
///
/// Scoring workflow:
/// 1. Fetch the lead
/// 2. Per-lead gateway analysis call (no batching)
/// 3. Deterministic score/bucket from the four sub-scores
/// 4. Replace `enrichment` + `scoring` wholesale
use crate::errors::{AppError, ResultExt};
use crate::gateway_client::GeminiClient;
use crate::lead_store::LeadStore;
use crate::models::{
    BulkWriteOutcome, CandidateLead, ConflictExisting, ConflictIncoming, ConflictRecord,
    EnrichmentScores, ExistingLeadSummary, Lead, LeadProfile, LeadScoring, SaveLeadsRequest,
    SaveReport, ScoreBucket, StagedUpsert,
};
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

/// Fallback country when neither the candidate nor the batch provides one.
pub const DEFAULT_COUNTRY: &str = "Unknown";
/// Fallback niche when neither the candidate nor the batch provides one.
pub const DEFAULT_NICHE: &str = "General";

/// Partitions a candidate batch against the existing-lead snapshot.
///
/// Pure function so the dedup semantics are testable without a database:
/// - a candidate with an empty trimmed url is silently skipped (safety net)
/// - an existing match with `overwrite=false` becomes a `ConflictRecord`,
///   regardless of the match's soft-delete state
/// - everything else is staged, with country/niche resolved per candidate:
///   candidate field, then batch parameter, then the literal default
/// - duplicate urls within the batch collapse to the last occurrence, since
///   the bulk write cannot touch one row twice in a single pass
pub fn partition_batch(
    candidates: &[CandidateLead],
    existing: &[ExistingLeadSummary],
    overwrite: bool,
    batch_country: Option<&str>,
    batch_niche: Option<&str>,
) -> (Vec<StagedUpsert>, Vec<ConflictRecord>) {
    let by_url: HashMap<&str, &ExistingLeadSummary> =
        existing.iter().map(|e| (e.url.as_str(), e)).collect();

    let mut staged: Vec<StagedUpsert> = Vec::new();
    let mut staged_index: HashMap<String, usize> = HashMap::new();
    let mut conflicts: Vec<ConflictRecord> = Vec::new();

    for candidate in candidates {
        let url = candidate.url.trim();
        if url.is_empty() {
            tracing::warn!("Skipping candidate without url: {}", candidate.name);
            continue;
        }

        if let Some(found) = by_url.get(url) {
            if !overwrite {
                conflicts.push(ConflictRecord {
                    url: url.to_string(),
                    existing: ConflictExisting {
                        id: found.id,
                        name: found.name.clone(),
                        is_deleted: found.is_deleted,
                    },
                    incoming: ConflictIncoming {
                        name: candidate.name.clone(),
                    },
                });
                continue;
            }
        }

        let op = StagedUpsert {
            url: url.to_string(),
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            phone: candidate.phone.clone(),
            country: candidate
                .country
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .or(batch_country)
                .unwrap_or(DEFAULT_COUNTRY)
                .to_string(),
            niche: candidate
                .niche
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .or(batch_niche)
                .unwrap_or(DEFAULT_NICHE)
                .to_string(),
            lead_type: candidate.lead_type.clone(),
            signals: candidate.signals.clone(),
            social_media: candidate.social_media.clone(),
        };

        match staged_index.get(url) {
            Some(&i) => staged[i] = op,
            None => {
                staged_index.insert(url.to_string(), staged.len());
                staged.push(op);
            }
        }
    }

    (staged, conflicts)
}

/// Turns a bulk-write outcome with failures into a typed error.
///
/// Any failed row fails the save: the message carries the applied counts so
/// the caller can distinguish a partial write (successful rows stay persisted,
/// the write is unordered) from a total one. Re-saving the batch is an upsert,
/// so retrying after a failure is safe.
pub fn save_failure(outcome: &BulkWriteOutcome) -> Option<AppError> {
    if outcome.failed == 0 {
        return None;
    }

    let staged = outcome.created + outcome.updated + outcome.failed;
    Some(AppError::SaveFailed(format!(
        "{} of {} staged rows failed to persist (created {}, updated {}): {}",
        outcome.failed,
        staged,
        outcome.created,
        outcome.updated,
        outcome.last_error.as_deref().unwrap_or("unknown error"),
    )))
}

/// Runs the save/dedup pipeline for one batch.
///
/// The reported counts come from the bulk write itself; the conflict list
/// contains every candidate skipped because of an existing non-overwritten
/// match, so a caller can confirm and re-save the narrowed set with
/// `overwrite=true`. Any persistence failure in the bulk write surfaces as
/// `SaveFailed`, never as an unqualified success.
pub async fn save_leads(store: &LeadStore, req: &SaveLeadsRequest) -> Result<SaveReport, AppError> {
    if req.leads.is_empty() {
        return Err(AppError::BadRequest(
            "leads batch must not be empty".to_string(),
        ));
    }

    // Step 1: distinct trimmed urls for the batched lookup
    let mut urls: Vec<String> = Vec::new();
    for lead in &req.leads {
        let url = lead.url.trim();
        if !url.is_empty() && !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }

    // Step 2: single batched lookup, slim projection only
    let existing = store
        .find_by_urls(&urls)
        .await
        .context("existing-lead lookup before save")?;

    // Step 3: partition into staged upserts vs. conflicts
    let (staged, conflicts) = partition_batch(
        &req.leads,
        &existing,
        req.overwrite,
        req.country.as_deref(),
        req.niche.as_deref(),
    );

    tracing::info!(
        "Save batch: {} candidates, {} staged, {} conflicts (overwrite={})",
        req.leads.len(),
        staged.len(),
        conflicts.len(),
        req.overwrite
    );

    // Step 4: unordered bulk write
    let outcome = if staged.is_empty() {
        BulkWriteOutcome::default()
    } else {
        store.bulk_upsert(&staged).await
    };

    if let Some(err) = save_failure(&outcome) {
        return Err(err);
    }

    Ok(SaveReport {
        created: outcome.created,
        updated: outcome.updated,
        conflicts,
    })
}

/// Normalizes the four 1-10 sub-scores into a 0-100 score.
///
/// `round(sum / 40 * 100)` clamped to [0, 100]. Non-finite inputs coerce to 0
/// as a second line of defense; gateway shape validation should already have
/// rejected them. Deterministic: identical sub-scores always yield an
/// identical score.
pub fn compute_score(scores: &EnrichmentScores) -> i32 {
    let coerce = |v: f64| if v.is_finite() { v } else { 0.0 };
    let sum = coerce(scores.engagement)
        + coerce(scores.vertical_affinity)
        + coerce(scores.elearning_interest)
        + coerce(scores.innovation_signals);

    let score = (sum / 40.0 * 100.0).round() as i64;
    score.clamp(0, 100) as i32
}

/// Maps a normalized score to its bucket. Thresholds are inclusive lower
/// bounds evaluated in order.
pub fn bucket_for(score: i32) -> ScoreBucket {
    if score >= 80 {
        ScoreBucket::A
    } else if score >= 60 {
        ScoreBucket::B
    } else if score >= 40 {
        ScoreBucket::C
    } else {
        ScoreBucket::Nurture
    }
}

/// Builds the scoring record for a set of sub-scores, stamped with now.
pub fn build_scoring(scores: &EnrichmentScores) -> LeadScoring {
    let score = compute_score(scores);
    LeadScoring {
        score,
        bucket: bucket_for(score),
        last_updated: Utc::now(),
    }
}

/// Runs the scoring pipeline for one persisted lead.
///
/// Soft-deleted leads may be analyzed; deletion only affects listing defaults
/// and list membership. On any gateway or validation failure nothing is
/// persisted; on success `enrichment` and `scoring` are replaced wholesale.
pub async fn analyze_lead(
    store: &LeadStore,
    gateway: &GeminiClient,
    id: Uuid,
) -> Result<Lead, AppError> {
    // Step 1: fetch the lead
    let lead = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", id)))?;

    if lead.is_deleted {
        tracing::info!("Analyzing soft-deleted lead {}", id);
    }

    // Step 2: per-lead gateway analysis
    let profile = LeadProfile {
        name: lead.name.clone(),
        url: lead.url.clone(),
        country: lead.country.clone(),
        niche: lead.niche.clone(),
        signals: lead.signals.clone(),
    };
    let enrichment = gateway.analyze_lead(&profile).await?;

    // Step 3: deterministic score + bucket
    let scoring = build_scoring(&enrichment.scores);
    tracing::info!(
        "Lead {} scored {} -> bucket {}",
        id,
        scoring.score,
        scoring.bucket.as_str()
    );

    // Step 4: persist full replacement
    store
        .update_analysis(id, &enrichment, &scoring)
        .await
        .context("persisting analysis result")
}
