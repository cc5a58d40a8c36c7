//! Small pattern probes over raw listing text.
//!
//! These never fail: unexpected input yields the documented sentinel
//! (`0` for [`extract_year`], `false` for [`has_digit`]).

use crate::data::Value;
use regex::Regex;
use std::sync::OnceLock;

/// Earliest year accepted by [`extract_year`].
pub const MIN_YEAR: u32 = 1970;
/// Latest year accepted by [`extract_year`].
pub const MAX_YEAR: u32 = 2018;

fn four_digits() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("[0-9]{4}").expect("static pattern"))
}

/// Largest year in `MIN_YEAR..=MAX_YEAR` mentioned in `text`, or `0`.
///
/// Four-digit groups are matched left to right without overlap, so
/// `"12345"` only yields `1234`.
///
/// ```
/// use listing_features::text::patterns::extract_year;
///
/// assert_eq!(extract_year("Released in 1999 and again 2021"), 1999);
/// assert_eq!(extract_year("no year here"), 0);
/// ```
#[must_use]
pub fn extract_year(text: &str) -> u32 {
    four_digits()
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .filter(|year| (MIN_YEAR..=MAX_YEAR).contains(year))
        .max()
        .unwrap_or(0)
}

/// Whether `text` contains an ASCII digit `0-9`.
///
/// Fractions, superscripts and digits of other scripts do not count.
#[must_use]
pub fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// [`has_digit`] over a cell value; non-text cells are `false`.
#[must_use]
pub fn value_has_digit(value: &Value) -> bool {
    value.as_text().is_some_and(has_digit)
}

/// [`extract_year`] over a cell value; non-text cells are `0`.
#[must_use]
pub fn value_year(value: &Value) -> u32 {
    value.as_text().map_or(0, extract_year)
}
