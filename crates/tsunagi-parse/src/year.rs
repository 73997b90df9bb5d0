//! Release-year extraction from titles and date strings.

use std::sync::LazyLock;

use regex::Regex;

/// Standalone 1900–2099 year.
static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());

/// All distinct years mentioned in a text, ascending.
pub fn extract_years(text: &str) -> Vec<i32> {
    let mut years: Vec<i32> = RE_YEAR
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// Year component of an ISO-like date string ("2020-07-01" → 2020).
pub fn year_of_date_str(date: &str) -> Option<i32> {
    let head = date.get(..4)?;
    if head.chars().all(|c| c.is_ascii_digit()) {
        head.parse().ok()
    } else {
        None
    }
}
