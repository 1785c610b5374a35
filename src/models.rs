use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

// ============ Domain Enums ============

/// Workflow status of a lead. Set to `New` on first insert only; an
/// upsert-on-conflict never resets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Interested,
    PendingContact,
}

impl LeadStatus {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Interested => "interested",
            LeadStatus::PendingContact => "pending_contact",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(LeadStatus::New),
            "contacted" => Some(LeadStatus::Contacted),
            "interested" => Some(LeadStatus::Interested),
            "pending_contact" => Some(LeadStatus::PendingContact),
            _ => None,
        }
    }
}

/// Score bucket derived from the normalized 0-100 score.
/// Thresholds are inclusive lower bounds: >=80 A, >=60 B, >=40 C, else Nurture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBucket {
    A,
    B,
    C,
    Nurture,
}

impl ScoreBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBucket::A => "A",
            ScoreBucket::B => "B",
            ScoreBucket::C => "C",
            ScoreBucket::Nurture => "Nurture",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(ScoreBucket::A),
            "B" => Some(ScoreBucket::B),
            "C" => Some(ScoreBucket::C),
            "Nurture" => Some(ScoreBucket::Nurture),
            _ => None,
        }
    }
}

/// Narrative recommendation returned by the analysis rubric. The gateway prompt
/// constrains the model to these three values; anything else fails analysis
/// validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalRecommendation {
    Descartar,
    Revisar,
    #[serde(rename = "Contacto prioritario")]
    ContactoPrioritario,
}

// ============ Domain Models ============

/// A social media presence attached to a lead. Entries are independent; no
/// uniqueness constraint within a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialMediaProfile {
    pub network: String,
    #[serde(default)]
    pub followers: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// The four 1-10 rubric sub-scores from the analysis gateway call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnrichmentScores {
    pub engagement: f64,
    pub vertical_affinity: f64,
    pub elearning_interest: f64,
    pub innovation_signals: f64,
}

/// Full analysis payload persisted onto a lead. Replaced wholesale on every
/// scoring run, never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadEnrichment {
    pub analysis_summary: String,
    pub scores: EnrichmentScores,
    #[serde(default)]
    pub detected_verticals: Vec<String>,
    pub final_recommendation: FinalRecommendation,
}

/// Deterministic scoring derived from `LeadEnrichment::scores`. The two are
/// never set independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadScoring {
    /// Normalized score in 0..=100.
    pub score: i32,
    pub bucket: ScoreBucket,
    pub last_updated: DateTime<Utc>,
}

/// The unit of record: one prospective partner organization, keyed uniquely by
/// exact `url` string.
#[derive(Debug, Clone, Serialize)]
pub struct Lead {
    pub id: Uuid,
    /// Dedup key. Exact string equality after trimming; never normalized.
    pub url: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub niche: Option<String>,
    /// Organization type (free form). Serialized as `type` for API compatibility.
    #[serde(rename = "type")]
    pub lead_type: Option<String>,
    /// Reasons the lead matched the search. Always a sequence, never null.
    pub signals: Vec<String>,
    pub social_media: Vec<SocialMediaProfile>,
    pub status: LeadStatus,
    /// Absent until the scoring pipeline has run at least once.
    pub scoring: Option<LeadScoring>,
    pub enrichment: Option<LeadEnrichment>,
    /// Soft-delete flag. A deleted lead still occupies its url slot and can be
    /// revived by a save with `overwrite=true`.
    pub is_deleted: bool,
    /// User-editable only; pipelines never touch it.
    pub notes: Option<String>,
    /// Set once on insert; upsert-on-conflict never changes it.
    pub created_at: DateTime<Utc>,
}

/// Raw database row for a lead; JSONB columns decoded via `sqlx::types::Json`.
#[derive(Debug, FromRow)]
pub struct LeadRow {
    pub id: Uuid,
    pub url: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub niche: Option<String>,
    pub lead_type: Option<String>,
    pub signals: Json<Vec<String>>,
    pub social_media: Json<Vec<SocialMediaProfile>>,
    pub status: String,
    pub scoring: Option<Json<LeadScoring>>,
    pub enrichment: Option<Json<LeadEnrichment>>,
    pub is_deleted: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<LeadRow> for Lead {
    fn from(row: LeadRow) -> Self {
        Lead {
            id: row.id,
            url: row.url,
            name: row.name,
            email: row.email,
            phone: row.phone,
            country: row.country,
            niche: row.niche,
            lead_type: row.lead_type,
            signals: row.signals.0,
            social_media: row.social_media.0,
            // Unknown status strings (manual DB edits) degrade to `new` rather
            // than failing the read.
            status: LeadStatus::parse(&row.status).unwrap_or(LeadStatus::New),
            scoring: row.scoring.map(|j| j.0),
            enrichment: row.enrichment.map(|j| j.0),
            is_deleted: row.is_deleted,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

/// Slim projection used by the save pipeline's batched existing-url lookup.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExistingLeadSummary {
    pub id: Uuid,
    pub url: String,
    pub name: String,
    pub is_deleted: bool,
}

/// A prospect list: a named grouping over lead ids. Membership is pruned when
/// a lead is soft-deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProspectList {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub prospect_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

// ============ Gateway Models ============

/// A candidate organization as the discovery gateway returns it, before
/// normalization. `url` may be missing; such candidates are discarded because
/// the save pipeline can only deduplicate on `url`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCandidate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub niche: Option<String>,
    #[serde(default, rename = "type")]
    pub lead_type: Option<String>,
    #[serde(default)]
    pub social_media: Option<Vec<SocialMediaProfile>>,
    #[serde(default)]
    pub signals: Option<Vec<String>>,
}

/// A normalized discovery candidate: non-empty url, signals always a sequence.
/// Ephemeral until explicitly saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateLead {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub niche: Option<String>,
    #[serde(default, rename = "type")]
    pub lead_type: Option<String>,
    #[serde(default)]
    pub social_media: Vec<SocialMediaProfile>,
    #[serde(default)]
    pub signals: Vec<String>,
}

/// Profile fields handed to the analysis gateway call.
#[derive(Debug, Clone, Serialize)]
pub struct LeadProfile {
    pub name: String,
    pub url: String,
    pub country: Option<String>,
    pub niche: Option<String>,
    pub signals: Vec<String>,
}

// ============ API Request/Response Models ============

/// Request payload for lead discovery.
#[derive(Debug, Deserialize)]
pub struct DiscoverRequest {
    pub country: String,
    pub niche: String,
    /// Defaults to 5; the HTTP boundary rejects values outside 1..=30.
    pub max_results: Option<u32>,
}

/// Response payload for lead discovery. `deterministic` is always false: the
/// gateway may return different candidates for identical inputs.
#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub candidates: Vec<CandidateLead>,
    pub deterministic: bool,
}

/// Request payload for the save/dedup pipeline.
#[derive(Debug, Deserialize)]
pub struct SaveLeadsRequest {
    pub leads: Vec<CandidateLead>,
    /// Batch-level fallback when a candidate has no country of its own.
    #[serde(default)]
    pub country: Option<String>,
    /// Batch-level fallback when a candidate has no niche of its own.
    #[serde(default)]
    pub niche: Option<String>,
    #[serde(default)]
    pub overwrite: bool,
}

/// Existing-lead side of a save conflict.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictExisting {
    pub id: Uuid,
    pub name: String,
    pub is_deleted: bool,
}

/// Incoming-candidate side of a save conflict.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictIncoming {
    pub name: String,
}

/// One candidate skipped because a lead with the same url already exists and
/// `overwrite` was false. Returned so the user can confirm and re-save the
/// narrowed set with `overwrite=true`.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictRecord {
    pub url: String,
    pub existing: ConflictExisting,
    pub incoming: ConflictIncoming,
}

/// Outcome of a save batch. Counts reflect what the bulk write actually did,
/// not how many candidates were processed.
#[derive(Debug, Serialize)]
pub struct SaveReport {
    pub created: u64,
    pub updated: u64,
    pub conflicts: Vec<ConflictRecord>,
}

/// A candidate with its country/niche fallbacks resolved, staged for the bulk
/// upsert.
#[derive(Debug, Clone)]
pub struct StagedUpsert {
    pub url: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: String,
    pub niche: String,
    pub lead_type: Option<String>,
    pub signals: Vec<String>,
    pub social_media: Vec<SocialMediaProfile>,
}

/// Result of a save bulk write. `failed` rows were logged and skipped by the
/// unordered write; the service layer turns any failure into a typed error
/// rather than reporting unqualified success.
#[derive(Debug, Default)]
pub struct BulkWriteOutcome {
    pub created: u64,
    pub updated: u64,
    pub failed: u64,
    /// Last row error seen, for the failure message.
    pub last_error: Option<String>,
}

/// User-editable lead fields for PATCH. Pipelines own everything else.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLeadRequest {
    pub name: Option<String>,
    pub url: Option<String>,
    pub country: Option<String>,
    pub niche: Option<String>,
    #[serde(rename = "type")]
    pub lead_type: Option<String>,
    pub status: Option<LeadStatus>,
    pub notes: Option<String>,
}

/// Query filters for listing leads. Filtering happens at read time; buckets are
/// never denormalized into lists.
#[derive(Debug, Default, Deserialize)]
pub struct LeadListParams {
    pub status: Option<String>,
    pub bucket: Option<String>,
    #[serde(default)]
    pub include_deleted: Option<bool>,
}

/// Request payload for creating a prospect list.
#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}
