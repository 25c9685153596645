//! Rating normalization.
//!
//! Maps free-form rating text onto `[0, 1]`. Two notations are recognized,
//! tried in order after cleaning:
//! 1. numbers: a bare number (denominator inferred) or the first
//!    `numerator/denominator` found anywhere in the text
//! 2. letter grades: `F-` .. `A+`, see [`crate::grades`]
//!
//! Anything else is a classification failure the caller counts and skips.
//! Empty scores mean "unrated" and must be filtered before calling.

use crate::grades::grade_score;
use once_cell::sync::Lazy;
use records::{FinderError, Result};
use regex::Regex;

static BARE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("valid regex"));

// Searched, not anchored: trailing decoration such as "(RECOMMENDED)" or "*" is ignored
static FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)/(\d+(?:\.\d+)?)").expect("valid regex"));

// Order matters: "STARS" before "STAR", "OUT OF" before "OF"
const REPLACEMENTS: [(&str, &str); 7] = [
    ("STARS", ""),
    ("STAR", ""),
    ("OUT OF", "/"),
    ("OF", "/"),
    ("\\", "/"),
    ("-MINUS", "-"),
    ("-PLUS", "+"),
];

/// Normalize a raw rating to `[0, 1]`
pub fn normalize(raw: &str) -> Result<f32> {
    let cleaned = clean(raw);

    if BARE_NUMBER.is_match(&cleaned) {
        let value: f64 = cleaned
            .parse()
            .map_err(|_| FinderError::unclassified_rating(raw))?;
        let denominator =
            infer_denominator(value).ok_or_else(|| FinderError::unclassified_rating(raw))?;
        return Ok((value / denominator) as f32);
    }

    if let Some(caps) = FRACTION.captures(&cleaned) {
        let numerator: f64 = caps[1]
            .parse()
            .map_err(|_| FinderError::unclassified_rating(raw))?;
        let denominator: f64 = caps[2]
            .parse()
            .map_err(|_| FinderError::unclassified_rating(raw))?;
        let value = numerator / denominator;
        if !(0.0..=1.0).contains(&value) {
            return Err(FinderError::unclassified_rating(raw));
        }
        return Ok(value as f32);
    }

    grade_score(&cleaned).ok_or_else(|| FinderError::unclassified_rating(raw))
}

/// Upper-case, strip decorative words and remove all whitespace
pub fn clean(raw: &str) -> String {
    let mut cleaned = raw.to_uppercase();
    for (from, to) in REPLACEMENTS {
        cleaned = cleaned.replace(from, to);
    }
    cleaned.retain(|c| !c.is_whitespace());
    cleaned
}

/// Scale a bare number is assumed to be on
fn infer_denominator(value: f64) -> Option<f64> {
    if value < 5.0 {
        Some(5.0)
    } else if value <= 10.0 {
        Some(10.0)
    } else if value <= 100.0 {
        Some(100.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grades::grade_step;
    use records::ErrorKind;

    const EPS: f32 = 1e-5;

    fn assert_close(raw: &str, expected: f32) {
        let actual = normalize(raw).unwrap_or_else(|e| panic!("'{raw}' failed: {e}"));
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected} for '{raw}', got {actual}"
        );
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean("3.5 out of 4 stars"), "3.5/4");
        assert_eq!(clean("2 of 5"), "2/5");
        assert_eq!(clean("7\\10"), "7/10");
        assert_eq!(clean("b-minus"), "B-");
        assert_eq!(clean("c-plus"), "C+");
        assert_eq!(clean(" 4 \t/ 5\n"), "4/5");
    }

    #[test]
    fn test_explicit_fractions_are_exact() {
        assert_close("5/5", 1.0);
        assert_close("3.2/10", 0.32);
        assert_close("4.5/10", 0.45);
        assert_close("10.0/10.0", 1.0);
        assert_close("100 / 100", 1.0);
        assert_close("0.0/20", 0.0);
        // No inference on explicit fractions
        assert_close("3/4", 0.75);
    }

    #[test]
    fn test_decorated_fractions() {
        assert_close("3.5 out of 4 stars", 0.875);
        assert_close("2 Stars of 4", 0.5);
        assert_close("8\\10", 0.8);
    }

    #[test]
    fn test_fraction_inside_decorated_text() {
        assert_close("3/4 (Recommended)", 0.75);
        assert_close("8/10*", 0.8);
        assert_close("3.5/5 stars!", 0.7);
        // Range check still applies to a found fraction
        assert!(normalize("7/5 (wow)").is_err());
    }

    #[test]
    fn test_bare_number_denominator_inference() {
        for tenth in 0..50 {
            let x = tenth as f32 / 10.0;
            assert_close(&format!("{x}"), x / 5.0);
        }
        for x in 5..=10 {
            assert_close(&x.to_string(), x as f32 / 10.0);
        }
        for x in [11, 42, 73, 99, 100] {
            assert_close(&x.to_string(), x as f32 / 100.0);
        }
        assert_close("4.5", 0.9);
        assert_close("3 stars", 0.6);
        assert_close("7.5", 0.75);
    }

    #[test]
    fn test_letter_grades() {
        assert_close("A", 13.0 / 14.0);
        assert_close("b+", 11.0 / 14.0);
        assert_close("c", 0.5);
        assert_close("-F", 0.0);
        assert_close("A-minus", 12.0 / 14.0);
        assert_close("B - ", 9.0 / 14.0);
    }

    #[test]
    fn test_grade_sign_symmetry() {
        let suffix = normalize("B+").unwrap();
        let prefix = normalize("+B").unwrap();
        let plain = normalize("B").unwrap();

        assert_eq!(suffix, prefix);
        assert!(suffix > plain);
        assert!((suffix - plain - grade_step()).abs() < EPS);
        assert_eq!(normalize("B-").unwrap(), normalize("-B").unwrap());
    }

    #[test]
    fn test_unrecognized_input_fails_classification() {
        for raw in ["banana", "", "A++", "3/", "/5", "-2", "five"] {
            let err = normalize(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Parse, "'{raw}' should not classify");
        }
    }

    #[test]
    fn test_results_stay_in_unit_interval() {
        // Would be above one or undefined
        for raw in ["150", "6/5", "3/0", "0/0"] {
            assert!(normalize(raw).is_err(), "'{raw}' should be rejected");
        }
    }
}
