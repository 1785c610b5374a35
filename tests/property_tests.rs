/// Property-based tests for the deterministic pipeline stages: score
/// normalization bounds, bucket thresholds, candidate normalization
/// totality, and partition conservation.
use proptest::prelude::*;

use leadscout_api::discovery::{is_valid_email, normalize_candidates};
use leadscout_api::lead_service::{bucket_for, compute_score, partition_batch};
use leadscout_api::models::{CandidateLead, EnrichmentScores, RawCandidate, ScoreBucket};

fn sub_score() -> impl Strategy<Value = f64> {
    prop_oneof![
        1.0f64..=10.0,
        -100.0f64..=100.0,
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

proptest! {
    #[test]
    fn test_score_always_within_bounds(
        e in sub_score(),
        v in sub_score(),
        l in sub_score(),
        i in sub_score(),
    ) {
        let score = compute_score(&EnrichmentScores {
            engagement: e,
            vertical_affinity: v,
            elearning_interest: l,
            innovation_signals: i,
        });
        prop_assert!((0..=100).contains(&score));
    }

    #[test]
    fn test_bucket_matches_threshold_table(score in 0i32..=100) {
        let expected = if score >= 80 {
            ScoreBucket::A
        } else if score >= 60 {
            ScoreBucket::B
        } else if score >= 40 {
            ScoreBucket::C
        } else {
            ScoreBucket::Nurture
        };
        prop_assert_eq!(bucket_for(score), expected);
    }

    #[test]
    fn test_in_range_scores_are_monotonic(
        a in 1.0f64..=10.0,
        b in 1.0f64..=10.0,
        v in 1.0f64..=10.0,
        l in 1.0f64..=10.0,
        i in 1.0f64..=10.0,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let low = compute_score(&EnrichmentScores {
            engagement: lo,
            vertical_affinity: v,
            elearning_interest: l,
            innovation_signals: i,
        });
        let high = compute_score(&EnrichmentScores {
            engagement: hi,
            vertical_affinity: v,
            elearning_interest: l,
            innovation_signals: i,
        });
        prop_assert!(low <= high);
    }
}

fn arb_raw_candidate() -> impl Strategy<Value = RawCandidate> {
    (
        proptest::option::of(".{0,20}"),
        proptest::option::of(".{0,40}"),
        proptest::option::of(".{0,30}"),
        proptest::option::of(proptest::collection::vec(".{0,20}", 0..4)),
    )
        .prop_map(|(name, url, email, signals)| RawCandidate {
            name,
            url,
            email,
            phone: None,
            country: None,
            niche: None,
            lead_type: None,
            social_media: None,
            signals,
        })
}

proptest! {
    #[test]
    fn test_normalization_is_total_and_urls_non_empty(
        raw in proptest::collection::vec(arb_raw_candidate(), 0..10)
    ) {
        let out = normalize_candidates(raw.clone());

        // Never grows the batch, and every survivor carries a usable url.
        prop_assert!(out.len() <= raw.len());
        for c in &out {
            prop_assert!(!c.url.trim().is_empty());
            prop_assert_eq!(c.url.trim(), c.url.as_str());
            prop_assert!(!c.name.is_empty());
        }
    }

    #[test]
    fn test_fake_digit_runs_never_validate(run in "(999999|111111|000000|123456789)") {
        let email = format!("user{}@example.com", run);
        prop_assert!(!is_valid_email(&email));
    }
}

fn arb_candidate_lead() -> impl Strategy<Value = CandidateLead> {
    ("[a-z]{1,10}", proptest::option::of("https://[a-z]{1,12}\\.com"))
        .prop_map(|(name, url)| CandidateLead {
            name,
            url: url.unwrap_or_default(),
            email: None,
            phone: None,
            country: None,
            niche: None,
            lead_type: None,
            social_media: vec![],
            signals: vec![],
        })
}

proptest! {
    #[test]
    fn test_partition_conserves_candidates(
        batch in proptest::collection::vec(arb_candidate_lead(), 0..12),
        overwrite in any::<bool>(),
    ) {
        let (staged, conflicts) = partition_batch(&batch, &[], overwrite, None, None);

        // Without an existing snapshot there is nothing to conflict with.
        prop_assert!(conflicts.is_empty());

        // Every candidate with a usable url lands in staged, under its
        // trimmed url; staged urls are unique.
        let mut staged_urls: Vec<_> = staged.iter().map(|s| s.url.as_str()).collect();
        for c in &batch {
            let url = c.url.trim();
            if !url.is_empty() {
                prop_assert!(staged_urls.contains(&url));
            }
        }
        staged_urls.sort_unstable();
        staged_urls.dedup();
        prop_assert_eq!(staged_urls.len(), staged.len());
    }

    #[test]
    fn test_staged_rows_always_carry_country_and_niche(
        batch in proptest::collection::vec(arb_candidate_lead(), 0..12),
        country in proptest::option::of("[A-Z][a-z]{1,8}"),
        niche in proptest::option::of("[a-z]{1,8}"),
    ) {
        let (staged, _) =
            partition_batch(&batch, &[], false, country.as_deref(), niche.as_deref());
        for s in &staged {
            prop_assert!(!s.country.is_empty());
            prop_assert!(!s.niche.is_empty());
        }
    }
}
