/// Discovery pipeline: one gateway search per request, followed by
/// normalization of the candidate list.
///
/// No persistence happens here; results are ephemeral until explicitly saved.
/// Re-running with identical inputs may yield different candidates, which the
/// HTTP layer communicates to the client.
use crate::errors::AppError;
use crate::gateway_client::GeminiClient;
use crate::models::{CandidateLead, RawCandidate};
use regex::Regex;

/// Used when the request leaves `max_results` unspecified.
pub const DEFAULT_MAX_RESULTS: u32 = 5;
/// Upper bound enforced at the HTTP boundary.
pub const MAX_RESULTS_LIMIT: u32 = 30;

/// Runs a single discovery search and normalizes the results.
///
/// # Arguments
///
/// * `gateway` - The Gemini client.
/// * `country` / `niche` - Non-empty search parameters.
/// * `max_results` - Result cap; the caller has already validated the range.
pub async fn discover_partners(
    gateway: &GeminiClient,
    country: &str,
    niche: &str,
    max_results: u32,
) -> Result<Vec<CandidateLead>, AppError> {
    if country.trim().is_empty() {
        return Err(AppError::BadRequest("country must not be empty".to_string()));
    }
    if niche.trim().is_empty() {
        return Err(AppError::BadRequest("niche must not be empty".to_string()));
    }

    let raw = gateway
        .discover_partners(country.trim(), niche.trim(), max_results)
        .await?;

    let candidates = normalize_candidates(raw);
    tracing::info!(
        "Discovery produced {} usable candidates for {}/{}",
        candidates.len(),
        country,
        niche
    );

    Ok(candidates)
}

/// Normalizes raw gateway candidates into `CandidateLead`s.
///
/// Candidates without a non-empty trimmed url are discarded: url is the only
/// field the save pipeline can deduplicate on. `signals` and `social_media`
/// are coerced to sequences, and emails that fail validation are dropped to
/// `None` rather than persisted.
pub fn normalize_candidates(raw: Vec<RawCandidate>) -> Vec<CandidateLead> {
    raw.into_iter()
        .filter_map(|candidate| {
            let url = candidate
                .url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())?
                .to_string();

            // Model sometimes omits the name; the url is the best stand-in.
            let name = candidate
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| url.clone());

            let email = candidate
                .email
                .map(|e| e.trim().to_string())
                .filter(|e| is_valid_email(e));

            Some(CandidateLead {
                name,
                url,
                email,
                phone: candidate.phone.filter(|p| !p.trim().is_empty()),
                country: candidate.country.filter(|c| !c.trim().is_empty()),
                niche: candidate.niche.filter(|n| !n.trim().is_empty()),
                lead_type: candidate.lead_type.filter(|t| !t.trim().is_empty()),
                social_media: candidate.social_media.unwrap_or_default(),
                signals: candidate.signals.unwrap_or_default(),
            })
        })
        .collect()
}

/// Validate email address
///
/// Checks for:
/// - Basic email format (contains @ and .)
/// - Fake/placeholder patterns the model fabricates (repeated digits like 9999)
/// - Minimum length requirements
/// - Valid domain structure
pub fn is_valid_email(email: &str) -> bool {
    // Basic checks
    if email.len() < 5 || !email.contains('@') || !email.contains('.') {
        return false;
    }

    // Detect fabricated placeholder patterns (repeated digits)
    let fake_patterns = ["999999", "111111", "000000", "123456789"];

    for pattern in &fake_patterns {
        if email.contains(pattern) {
            tracing::warn!(
                "Dropping fabricated email (pattern '{}'): {}",
                pattern,
                email
            );
            return false;
        }
    }

    // RFC 5322 simplified email regex
    // Matches: local@domain.tld
    let email_regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    if !email_regex.is_match(email) {
        tracing::warn!("Dropping malformed email: {}", email);
        return false;
    }

    true
}
