//! Document numbering.
//!
//! Numbers restart every period: `RTR-YYYYMM-NNN` and `TRF-YYYYMM-NNNN` per
//! month, `TFB-YYYY-NNNNN` per year. The next number is found by scanning the
//! existing collection for the current period's prefix, taking the largest
//! numeric suffix and adding one. The scan is not locked, so two writers working
//! from the same snapshot will pick the same number.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::HashSet;

/// Largest numeric suffix among `numbers` that start with `prefix`, plus one.
///
/// Entries whose suffix is not purely numeric are ignored.
pub fn next_sequence<'a, I>(numbers: I, prefix: &str) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    numbers
        .into_iter()
        .filter_map(|n| n.strip_prefix(prefix))
        .filter(|suffix| !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

fn month_prefix(code: &str, date: NaiveDate) -> String {
    format!("{code}-{:04}{:02}-", date.year(), date.month())
}

/// Next transfer-plan number for the month of `date`, e.g. `RTR-202501-001`.
pub fn next_plan_number<'a, I>(existing: I, date: NaiveDate) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = month_prefix("RTR", date);
    let seq = next_sequence(existing, &prefix);
    format!("{prefix}{seq:03}")
}

/// Next goods-transfer number for the month of `date`, e.g. `TRF-202501-0001`.
pub fn next_transfer_number<'a, I>(existing: I, date: NaiveDate) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = month_prefix("TRF", date);
    let seq = next_sequence(existing, &prefix);
    format!("{prefix}{seq:04}")
}

/// Next goods-transfer document number for the year of `date`, e.g. `TFB-2025-00001`.
pub fn next_document_number<'a, I>(existing: I, date: NaiveDate) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = format!("TFB-{:04}-", date.year());
    let seq = next_sequence(existing, &prefix);
    format!("{prefix}{seq:05}")
}

/// Timestamp-derived record id (Unix milliseconds), bumped until it is not in `taken`.
pub fn unique_id<'a, I>(now: DateTime<Utc>, taken: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: HashSet<&str> = taken.into_iter().collect();
    let mut millis = now.timestamp_millis();
    while taken.contains(millis.to_string().as_str()) {
        millis += 1;
    }
    millis.to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn jan_2025() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_first_number_of_month() {
        assert_eq!(next_plan_number([], jan_2025()), "RTR-202501-001");
        assert_eq!(next_transfer_number([], jan_2025()), "TRF-202501-0001");
        assert_eq!(next_document_number([], jan_2025()), "TFB-2025-00001");
    }

    #[test]
    fn test_increments_max_of_current_month_only() {
        let existing = ["RTR-202412-009", "RTR-202501-002", "RTR-202501-007", "RTR-202501-003"];
        assert_eq!(next_plan_number(existing, jan_2025()), "RTR-202501-008");
    }

    #[test]
    fn test_ignores_malformed_suffixes() {
        let existing = ["RTR-202501-00x", "RTR-202501-", "RTR-202501-004-copy", "RTR-202501-004"];
        assert_eq!(next_plan_number(existing, jan_2025()), "RTR-202501-005");
    }

    #[test]
    fn test_suffix_grows_past_padding() {
        assert_eq!(next_plan_number(["RTR-202501-999"], jan_2025()), "RTR-202501-1000");
    }

    #[test]
    fn test_document_number_is_yearly() {
        let existing = ["TFB-2025-00041", "TFB-2024-00900"];
        let december = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert_eq!(next_document_number(existing, december), "TFB-2025-00042");
    }

    #[test]
    fn test_unique_id_skips_taken_ids() {
        let now = DateTime::from_timestamp_millis(1_736_900_000_000).unwrap();
        assert_eq!(unique_id(now, []), "1736900000000");
        assert_eq!(
            unique_id(now, ["1736900000000", "1736900000001"]),
            "1736900000002"
        );
    }

    #[test]
    fn test_sequential_numbers_strictly_increase() {
        let mut issued: Vec<String> = Vec::new();
        for _ in 0..12 {
            let next = next_plan_number(issued.iter().map(String::as_str), jan_2025());
            issued.push(next);
        }
        let suffixes: Vec<u32> = issued
            .iter()
            .map(|n| n.rsplit('-').next().unwrap().parse().unwrap())
            .collect();
        assert!(suffixes.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(suffixes, (1..=12).collect::<Vec<u32>>());
    }
}
