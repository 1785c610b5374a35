use crate::errors::AppError;
use crate::models::{LeadEnrichment, LeadProfile, RawCandidate};
use serde_json::{json, Value};
use std::time::Duration;

/// Client for the Gemini generateContent API.
///
/// Discovery uses the web-search tool and asks for a strict JSON array of
/// candidate organizations; analysis uses JSON response mode and a fixed
/// four-axis rubric. Both calls are non-deterministic and rate limited
/// upstream; HTTP 429 (or a RESOURCE_EXHAUSTED error body) maps to
/// `AppError::QuotaExceeded` so callers can surface a retry-after hint.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Creates a new `GeminiClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the Gemini API (injectable so tests can
    ///   point at a mock server).
    /// * `api_key` - The API key for authentication.
    /// * `model` - The model name, e.g. `gemini-2.0-flash`.
    pub fn new(base_url: String, api_key: String, model: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| {
                AppError::DiscoveryFailed(format!("Failed to create Gemini client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
            model,
        })
    }

    /// Searches the web for prospective partner organizations in a country/niche.
    ///
    /// Returns the gateway's raw candidate list; callers are responsible for
    /// discarding candidates without a usable url and normalizing `signals`.
    pub async fn discover_partners(
        &self,
        country: &str,
        niche: &str,
        max_results: u32,
    ) -> Result<Vec<RawCandidate>, AppError> {
        let prompt = format!(
            "Search the web for up to {max_results} organizations in {country} operating in the \
             \"{niche}\" niche that would make strong B2B partners for an e-learning platform. \
             Respond ONLY with a JSON array, no prose. Each element must have the fields: \
             \"name\" (string), \"url\" (string, the organization's website, or null if unknown), \
             \"email\" (string or null), \"phone\" (string or null), \"country\" (string), \
             \"niche\" (string), \"type\" (string, e.g. \"academy\", \"consultancy\"), \
             \"social_media\" (array of {{\"network\", \"followers\", \"url\"}}), \
             \"signals\" (array of strings: concrete reasons this organization matched)."
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "tools": [{ "google_search": {} }]
        });

        tracing::info!(
            "Gemini discovery: country={}, niche={}, max_results={}",
            country,
            niche,
            max_results
        );

        let response = self.generate_content(&body, "discovery").await?;

        let text = extract_response_text(&response).ok_or_else(|| {
            AppError::DiscoveryFailed("Gemini discovery response contained no text".to_string())
        })?;

        let candidates: Vec<RawCandidate> = serde_json::from_str(strip_code_fences(&text))
            .map_err(|e| {
                AppError::DiscoveryFailed(format!("Failed to parse discovery payload: {}", e))
            })?;

        tracing::info!("Gemini discovery returned {} raw candidates", candidates.len());
        Ok(candidates)
    }

    /// Scores a single lead against the rubric.
    ///
    /// Validates the response shape before returning: a non-empty
    /// `analysis_summary` and all four numeric sub-scores must be present, or
    /// the whole call fails with `AnalysisIncomplete` so nothing partial is
    /// ever persisted.
    pub async fn analyze_lead(&self, profile: &LeadProfile) -> Result<LeadEnrichment, AppError> {
        let prompt = format!(
            "Evaluate the following organization as a prospective e-learning partner and respond \
             ONLY with a JSON object.\n\nOrganization:\n{}\n\nThe object must contain: \
             \"analysis_summary\" (string, 2-4 sentences), \
             \"scores\" (object with integer values 1-10 for \"engagement\", \
             \"vertical_affinity\", \"elearning_interest\", \"innovation_signals\"), \
             \"detected_verticals\" (array of strings), \
             \"final_recommendation\" (exactly one of \"Descartar\", \"Revisar\", \
             \"Contacto prioritario\").",
            serde_json::to_string_pretty(profile)
                .map_err(|e| AppError::InternalError(format!("Failed to encode profile: {}", e)))?
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        tracing::info!("Gemini analysis for lead url={}", profile.url);

        let response = self.generate_content(&body, "analysis").await?;

        let text = extract_response_text(&response).ok_or_else(|| {
            AppError::AnalysisIncomplete("Gemini analysis response contained no text".to_string())
        })?;

        let payload: Value = serde_json::from_str(strip_code_fences(&text)).map_err(|e| {
            AppError::AnalysisIncomplete(format!("Failed to parse analysis payload: {}", e))
        })?;

        validate_analysis_shape(&payload)?;

        let enrichment: LeadEnrichment = serde_json::from_value(payload).map_err(|e| {
            AppError::AnalysisIncomplete(format!("Analysis payload failed validation: {}", e))
        })?;

        Ok(enrichment)
    }

    /// Low-level generateContent call shared by discovery and analysis.
    async fn generate_content(&self, body: &Value, operation: &str) -> Result<Value, AppError> {
        // Build URL with proper parameter encoding; key stays out of logs.
        let url = reqwest::Url::parse_with_params(
            &format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ),
            &[("key", self.api_key.as_str())],
        )
        .map_err(|e| AppError::DiscoveryFailed(format!("Failed to build URL: {}", e)))?;

        tracing::debug!(
            "Gemini {} request: {}/v1beta/models/{}:generateContent?key=[REDACTED]",
            operation,
            self.base_url,
            self.model
        );

        let response = self.client.post(url).json(body).send().await.map_err(|e| {
            AppError::DiscoveryFailed(format!("Gemini {} request failed: {}", operation, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if status.as_u16() == 429 || error_text.contains("RESOURCE_EXHAUSTED") {
                return Err(AppError::QuotaExceeded(format!(
                    "Gemini {} quota exhausted: {}",
                    operation, error_text
                )));
            }

            tracing::error!("Gemini {} returned {}: {}", operation, status, error_text);
            return Err(AppError::DiscoveryFailed(format!(
                "Gemini returned status {}: {}",
                status, error_text
            )));
        }

        let data = response.json().await.map_err(|e| {
            AppError::DiscoveryFailed(format!("Failed to parse Gemini response: {}", e))
        })?;

        Ok(data)
    }
}

/// Pulls the concatenated text parts out of a generateContent response.
fn extract_response_text(response: &Value) -> Option<String> {
    let parts = response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Strips a surrounding markdown code fence, which the model sometimes emits
/// even when told not to.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Shape check for the analysis payload: non-empty summary plus all four
/// sub-scores present as numbers. Anything else is `AnalysisIncomplete`.
fn validate_analysis_shape(payload: &Value) -> Result<(), AppError> {
    let summary_ok = payload
        .get("analysis_summary")
        .and_then(|v| v.as_str())
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false);

    if !summary_ok {
        return Err(AppError::AnalysisIncomplete(
            "Missing or empty analysis_summary".to_string(),
        ));
    }

    let scores = payload
        .get("scores")
        .ok_or_else(|| AppError::AnalysisIncomplete("Missing scores object".to_string()))?;

    for axis in [
        "engagement",
        "vertical_affinity",
        "elearning_interest",
        "innovation_signals",
    ] {
        let is_number = scores.get(axis).map(|v| v.is_number()).unwrap_or(false);
        if !is_number {
            return Err(AppError::AnalysisIncomplete(format!(
                "Missing or non-numeric sub-score: {}",
                axis
            )));
        }
    }

    Ok(())
}
