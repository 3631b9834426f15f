//! Overall accessibility score arithmetic
//!
//! The audit tool reports a category score as a fraction in `[0, 1]` (or
//! null). Analyses persist it as a percentage rounded to two decimals.

/// Convert a category fraction into the persisted 0–100 score
///
/// Absent (null) category scores map to `0.0`.
pub fn overall_score(category_score: Option<f64>) -> f64 {
    let fraction = category_score.filter(|s| s.is_finite()).unwrap_or(0.0);
    round2(fraction * 100.0)
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a score with exactly two decimals, as returned to clients
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_to_percentage() {
        assert_eq!(overall_score(Some(0.873)), 87.3);
        assert_eq!(format_score(overall_score(Some(0.873))), "87.30");
    }

    #[test]
    fn test_missing_score_is_zero() {
        assert_eq!(overall_score(None), 0.0);
        assert_eq!(format_score(overall_score(None)), "0.00");
    }

    #[test]
    fn test_full_and_zero_scores() {
        assert_eq!(format_score(overall_score(Some(1.0))), "100.00");
        assert_eq!(format_score(overall_score(Some(0.0))), "0.00");
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        assert_eq!(overall_score(Some(0.91236)), 91.24);
        assert_eq!(overall_score(Some(0.5)), 50.0);
    }

    #[test]
    fn test_non_finite_score_is_zero() {
        assert_eq!(overall_score(Some(f64::NAN)), 0.0);
    }
}
