//! Decoding of individual report cells into typed values.
//!
//! Generated reports mix plain numbers, `min-max` ranges, placeholder
//! markers for absent values, and ellipsis rows marking truncation.

use crate::models::report::Bounds;
use thiserror::Error;

/// A non-empty cell that is not a number, a range, or a recognized
/// placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cell '{text}' is not a number, range, or placeholder")]
pub struct UnparsableCell {
    pub text: String,
}

/// Placeholders the solver prints for values it did not compute.
const PLACEHOLDERS: &[&str] = &["", "-", "–", "—", "n/a", "na", "none", "x"];

/// Ellipsis rows marking a truncated section body.
const TRUNCATION_MARKERS: &[&str] = &["...", "…", ". . ."];

/// Decode one report cell.
///
/// - a single integer or decimal yields `Bounds` with `min == max`
/// - a `min-max` range (hyphen or en dash separated) yields both bounds
/// - an empty cell, dash, or placeholder yields `None`
///
/// Anything else is an [`UnparsableCell`]; the caller records a warning
/// and skips the row.
pub fn parse_cell(text: &str) -> Result<Option<Bounds>, UnparsableCell> {
    let trimmed = text.trim();
    let lowered = trimmed.to_lowercase();
    if PLACEHOLDERS.contains(&lowered.as_str()) {
        return Ok(None);
    }

    if let Ok(value) = trimmed.parse::<f64>() {
        return Ok(Some(Bounds::scalar(value)));
    }

    if let Some((lhs, rhs)) = split_range(trimmed) {
        if let (Ok(a), Ok(b)) = (lhs.trim().parse::<f64>(), rhs.trim().parse::<f64>()) {
            return Ok(Some(Bounds {
                min: a.min(b),
                max: a.max(b),
            }));
        }
    }

    Err(UnparsableCell {
        text: trimmed.to_string(),
    })
}

/// Decode a cell expected to hold a single value, not a range.
pub fn parse_scalar_cell(text: &str) -> Result<Option<f64>, UnparsableCell> {
    match parse_cell(text)? {
        None => Ok(None),
        Some(bounds) if bounds.is_scalar() => Ok(Some(bounds.min)),
        Some(_) => Err(UnparsableCell {
            text: text.trim().to_string(),
        }),
    }
}

/// Whether a row is an ellipsis-only truncation marker.
pub fn is_truncation_marker(cells: &[String]) -> bool {
    let joined = cells.join(" ");
    let joined = joined.trim();
    !joined.is_empty() && TRUNCATION_MARKERS.contains(&joined)
}

fn split_range(text: &str) -> Option<(&str, &str)> {
    // Hours and gaps are never negative, so any interior separator is a
    // range, not a sign.
    for (idx, c) in text.char_indices().skip(1) {
        if c == '-' || c == '–' {
            return Some((&text[..idx], &text[idx + c.len_utf8()..]));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_integer() {
        assert_eq!(parse_cell("24").unwrap(), Some(Bounds::scalar(24.0)));
    }

    #[test]
    fn test_single_decimal() {
        assert_eq!(parse_cell(" 23.5 ").unwrap(), Some(Bounds::scalar(23.5)));
    }

    #[test]
    fn test_range() {
        assert_eq!(
            parse_cell("18-24").unwrap(),
            Some(Bounds {
                min: 18.0,
                max: 24.0
            })
        );
    }

    #[test]
    fn test_range_with_spaces_and_en_dash() {
        assert_eq!(
            parse_cell("18 – 24").unwrap(),
            Some(Bounds {
                min: 18.0,
                max: 24.0
            })
        );
    }

    #[test]
    fn test_placeholders_decode_to_none() {
        for text in ["", "  ", "-", "—", "n/a", "N/A", "x", "X"] {
            assert_eq!(parse_cell(text).unwrap(), None, "placeholder {text:?}");
        }
    }

    #[test]
    fn test_garbage_is_unparsable() {
        let err = parse_cell("abc").unwrap_err();
        assert_eq!(err.text, "abc");
        assert!(parse_cell("12-abc").is_err());
    }

    #[test]
    fn test_scalar_cell_rejects_range() {
        assert_eq!(parse_scalar_cell("30").unwrap(), Some(30.0));
        assert_eq!(parse_scalar_cell("-").unwrap(), None);
        assert!(parse_scalar_cell("18-24").is_err());
    }

    #[test]
    fn test_truncation_markers() {
        assert!(is_truncation_marker(&["...".to_string()]));
        assert!(is_truncation_marker(&["…".to_string(), String::new()]));
        assert!(!is_truncation_marker(&["12".to_string()]));
        assert!(!is_truncation_marker(&[String::new()]));
    }

    proptest! {
        #[test]
        fn prop_formatted_ranges_parse_back(a in 0u32..500, b in 0u32..500) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let parsed = parse_cell(&format!("{lo}-{hi}")).unwrap().unwrap();
            prop_assert_eq!(parsed.min, f64::from(lo));
            prop_assert_eq!(parsed.max, f64::from(hi));
        }

        #[test]
        fn prop_single_numbers_are_scalar(n in 0u32..10_000) {
            let parsed = parse_cell(&n.to_string()).unwrap().unwrap();
            prop_assert!(parsed.is_scalar());
            prop_assert_eq!(parsed.min, f64::from(n));
        }

        #[test]
        fn prop_never_panics(s in "\\PC{0,12}") {
            let _ = parse_cell(&s);
        }
    }
}
