use chrono::{Datelike, NaiveDate};

/// First day of the date's month. Total: falls back to the input itself,
/// which is unreachable for any date chrono can represent.
pub fn truncate_to_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Inclusive count of calendar months shared by two closed month ranges.
/// Endpoints are expected to be month-truncated already. A malformed range
/// (start after end) or an empty intersection counts as 0, never an error.
pub fn months_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> i64 {
    if a_start > a_end || b_start > b_end {
        return 0;
    }

    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    if start > end {
        return 0;
    }

    let years = i64::from(end.year()) - i64::from(start.year());
    let months = i64::from(end.month()) - i64::from(start.month());
    years * 12 + months + 1
}

/// Parses a `MM-YYYY` month string into the first day of that month.
pub fn parse_month(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("01-{s}"), "%d-%m-%Y").ok()
}

/// Renders a month-truncated date back to `MM-YYYY`.
pub fn format_month(date: NaiveDate) -> String {
    date.format("%m-%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn test_truncate_to_month() {
        let d = NaiveDate::from_ymd_opt(2025, 7, 19).unwrap();
        assert_eq!(truncate_to_month(d), month(7, 2025));
        // already truncated input is a no-op
        assert_eq!(truncate_to_month(month(1, 2020)), month(1, 2020));
    }

    #[test]
    fn test_overlap_same_month_is_one() {
        let m = month(2, 2025);
        assert_eq!(months_overlap(m, m, m, m), 1);
    }

    #[test]
    fn test_overlap_partial() {
        // subscription Jan..Mar vs period Feb..Feb -> 1 month
        assert_eq!(
            months_overlap(month(1, 2025), month(3, 2025), month(2, 2025), month(2, 2025)),
            1
        );
        // subscription Jan..Mar vs period Jan..Dec -> 3 months
        assert_eq!(
            months_overlap(month(1, 2025), month(3, 2025), month(1, 2025), month(12, 2025)),
            3
        );
    }

    #[test]
    fn test_overlap_disjoint_is_zero() {
        assert_eq!(
            months_overlap(month(1, 2025), month(3, 2025), month(4, 2025), month(12, 2025)),
            0
        );
        assert_eq!(
            months_overlap(month(4, 2025), month(12, 2025), month(1, 2025), month(3, 2025)),
            0
        );
    }

    #[test]
    fn test_overlap_malformed_range_is_zero() {
        assert_eq!(
            months_overlap(month(5, 2025), month(1, 2025), month(1, 2025), month(12, 2025)),
            0
        );
        assert_eq!(
            months_overlap(month(1, 2025), month(12, 2025), month(5, 2025), month(1, 2025)),
            0
        );
    }

    #[test]
    fn test_overlap_symmetric_in_range_order() {
        let (a1, a2) = (month(3, 2024), month(8, 2025));
        let (b1, b2) = (month(11, 2024), month(2, 2026));
        assert_eq!(
            months_overlap(a1, a2, b1, b2),
            months_overlap(b1, b2, a1, a2)
        );
    }

    #[test]
    fn test_overlap_spanning_years() {
        // Jan 2020 .. Dec 2030 inclusive = 11 years * 12 months
        assert_eq!(
            months_overlap(
                month(1, 2020),
                month(12, 2030),
                month(1, 2020),
                month(12, 2030)
            ),
            132
        );
        // year boundary: Nov 2024 .. Feb 2025 -> 4 months
        assert_eq!(
            months_overlap(
                month(11, 2024),
                month(2, 2025),
                month(1, 2020),
                month(12, 2030)
            ),
            4
        );
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("07-2025"), Some(month(7, 2025)));
        assert_eq!(parse_month("12-1999"), Some(month(12, 1999)));
        assert_eq!(parse_month("2025-07"), None);
        assert_eq!(parse_month("13-2025"), None);
        assert_eq!(parse_month("garbage"), None);
    }

    #[test]
    fn test_format_month_round_trip() {
        assert_eq!(format_month(month(7, 2025)), "07-2025");
        assert_eq!(parse_month(&format_month(month(12, 2030))), Some(month(12, 2030)));
    }
}
