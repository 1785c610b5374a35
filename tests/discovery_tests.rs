/// Unit tests for discovery normalization: url filtering, signals coercion,
/// and email validation of LLM-provided contact fields.
use leadscout_api::discovery::{is_valid_email, normalize_candidates};
use leadscout_api::models::RawCandidate;

fn raw(name: Option<&str>, url: Option<&str>) -> RawCandidate {
    RawCandidate {
        name: name.map(str::to_string),
        url: url.map(str::to_string),
        email: None,
        phone: None,
        country: None,
        niche: None,
        lead_type: None,
        social_media: None,
        signals: None,
    }
}

#[cfg(test)]
mod normalization_tests {
    use super::*;

    #[test]
    fn test_candidates_without_url_are_discarded() {
        let input = vec![
            raw(Some("HasUrl"), Some("https://a.com")),
            raw(Some("NoUrl"), None),
            raw(Some("EmptyUrl"), Some("")),
            raw(Some("Whitespace"), Some("   ")),
        ];

        let out = normalize_candidates(input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "HasUrl");
    }

    #[test]
    fn test_urls_are_trimmed() {
        let out = normalize_candidates(vec![raw(Some("A"), Some("  https://a.com "))]);
        assert_eq!(out[0].url, "https://a.com");
    }

    #[test]
    fn test_signals_always_a_sequence() {
        let mut with_signals = raw(Some("A"), Some("https://a.com"));
        with_signals.signals = Some(vec!["local press coverage".to_string()]);
        let without_signals = raw(Some("B"), Some("https://b.com"));

        let out = normalize_candidates(vec![with_signals, without_signals]);
        assert_eq!(out[0].signals, vec!["local press coverage".to_string()]);
        assert!(out[1].signals.is_empty());
    }

    #[test]
    fn test_missing_name_falls_back_to_url() {
        let out = normalize_candidates(vec![raw(None, Some("https://a.com"))]);
        assert_eq!(out[0].name, "https://a.com");
    }

    #[test]
    fn test_invalid_email_dropped_to_none() {
        let mut c = raw(Some("A"), Some("https://a.com"));
        c.email = Some("contact999999@a.com".to_string());
        let mut d = raw(Some("B"), Some("https://b.com"));
        d.email = Some("hello@b.com".to_string());

        let out = normalize_candidates(vec![c, d]);
        assert_eq!(out[0].email, None);
        assert_eq!(out[1].email.as_deref(), Some("hello@b.com"));
    }

    #[test]
    fn test_blank_optional_fields_dropped_to_none() {
        let mut c = raw(Some("A"), Some("https://a.com"));
        c.phone = Some("".to_string());
        c.country = Some("  ".to_string());

        let out = normalize_candidates(vec![c]);
        assert_eq!(out[0].phone, None);
        assert_eq!(out[0].country, None);
    }
}

#[cfg(test)]
mod email_validation_tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("test.user@example.com"));
        assert!(is_valid_email("user+tag@example.co.uk"));
        assert!(is_valid_email("user_name@example-domain.com"));
    }

    #[test]
    fn test_invalid_emails_basic() {
        // Missing @ or .
        assert!(!is_valid_email("userexample.com"));
        assert!(!is_valid_email("user@examplecom"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));

        // Too short
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_fabricated_placeholder_emails_rejected() {
        // The model occasionally invents contact addresses with repeated
        // digits; those must never reach the store.
        assert!(!is_valid_email("info999999@gmail.com"));
        assert!(!is_valid_email("1111111111@example.com"));
        assert!(!is_valid_email("000000@example.com"));
        assert!(!is_valid_email("test123456789@example.com"));
    }

    #[test]
    fn test_malformed_emails_rejected() {
        assert!(!is_valid_email("user @example.com"));
        assert!(!is_valid_email("user@exam ple.com"));
    }
}
