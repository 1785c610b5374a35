/// Unit tests for the scoring pipeline's deterministic normalization:
/// score = round(sum/40*100) clamped to [0,100], bucketed by inclusive
/// lower bounds.
use leadscout_api::lead_service::{bucket_for, build_scoring, compute_score};
use leadscout_api::models::{EnrichmentScores, ScoreBucket};

fn scores(e: f64, v: f64, l: f64, i: f64) -> EnrichmentScores {
    EnrichmentScores {
        engagement: e,
        vertical_affinity: v,
        elearning_interest: l,
        innovation_signals: i,
    }
}

#[cfg(test)]
mod score_formula_tests {
    use super::*;

    #[test]
    fn test_all_eights_is_eighty() {
        // sum=32 -> 32/40*100 = 80
        assert_eq!(compute_score(&scores(8.0, 8.0, 8.0, 8.0)), 80);
    }

    #[test]
    fn test_mixed_subscores() {
        // 9+8+7+6 = 30 -> 75
        assert_eq!(compute_score(&scores(9.0, 8.0, 7.0, 6.0)), 75);
        // sum=23 -> 57.5 -> 58
        assert_eq!(compute_score(&scores(6.0, 6.0, 6.0, 5.0)), 58);
        // sum=15 -> 37.5 -> 38
        assert_eq!(compute_score(&scores(4.0, 4.0, 4.0, 3.0)), 38);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(compute_score(&scores(10.0, 10.0, 10.0, 10.0)), 100);
        assert_eq!(compute_score(&scores(1.0, 1.0, 1.0, 1.0)), 10);
        assert_eq!(compute_score(&scores(0.0, 0.0, 0.0, 0.0)), 0);
    }

    #[test]
    fn test_out_of_range_subscores_clamped() {
        // Defense in depth: shape validation rejects these upstream, but the
        // normalization itself must still stay in bounds.
        assert_eq!(compute_score(&scores(15.0, 15.0, 15.0, 15.0)), 100);
        assert_eq!(compute_score(&scores(-5.0, -5.0, -5.0, -5.0)), 0);
    }

    #[test]
    fn test_non_finite_coerced_to_zero() {
        assert_eq!(compute_score(&scores(f64::NAN, 8.0, 8.0, 8.0)), 60);
        assert_eq!(compute_score(&scores(f64::INFINITY, 0.0, 0.0, 0.0)), 0);
    }

    #[test]
    fn test_determinism() {
        let s = scores(7.0, 3.0, 9.0, 2.0);
        assert_eq!(compute_score(&s), compute_score(&s));
    }
}

#[cfg(test)]
mod bucket_tests {
    use super::*;

    #[test]
    fn test_thresholds_are_inclusive_lower_bounds() {
        assert_eq!(bucket_for(100), ScoreBucket::A);
        assert_eq!(bucket_for(80), ScoreBucket::A);
        assert_eq!(bucket_for(79), ScoreBucket::B);
        assert_eq!(bucket_for(60), ScoreBucket::B);
        assert_eq!(bucket_for(59), ScoreBucket::C);
        assert_eq!(bucket_for(40), ScoreBucket::C);
        assert_eq!(bucket_for(39), ScoreBucket::Nurture);
        assert_eq!(bucket_for(0), ScoreBucket::Nurture);
    }

    #[test]
    fn test_spec_examples() {
        // e=v=l=i=8 -> 80 -> A
        let s = compute_score(&scores(8.0, 8.0, 8.0, 8.0));
        assert_eq!(s, 80);
        assert_eq!(bucket_for(s), ScoreBucket::A);

        // sum 23 -> 58 -> C
        let s = compute_score(&scores(6.0, 6.0, 6.0, 5.0));
        assert_eq!(s, 58);
        assert_eq!(bucket_for(s), ScoreBucket::C);

        // sum 15 -> 38 -> Nurture
        let s = compute_score(&scores(4.0, 4.0, 4.0, 3.0));
        assert_eq!(s, 38);
        assert_eq!(bucket_for(s), ScoreBucket::Nurture);

        // 9,8,7,6 -> 75 -> B
        let s = compute_score(&scores(9.0, 8.0, 7.0, 6.0));
        assert_eq!(s, 75);
        assert_eq!(bucket_for(s), ScoreBucket::B);
    }
}

#[cfg(test)]
mod build_scoring_tests {
    use super::*;

    #[test]
    fn test_scoring_record_is_consistent() {
        let s = scores(9.0, 8.0, 7.0, 6.0);
        let scoring = build_scoring(&s);

        assert_eq!(scoring.score, compute_score(&s));
        assert_eq!(scoring.bucket, bucket_for(scoring.score));
        assert_eq!(scoring.score, 75);
        assert_eq!(scoring.bucket, ScoreBucket::B);
    }

    #[test]
    fn test_score_and_bucket_never_disagree() {
        for raw in 0..=40 {
            let each = raw as f64 / 4.0;
            let scoring = build_scoring(&scores(each, each, each, each));
            assert_eq!(scoring.bucket, bucket_for(scoring.score));
        }
    }
}
