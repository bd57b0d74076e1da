//! Calendar-year extraction from the catalog's `year` field.
//!
//! The export mixes ISO timestamps (`1880-01-01T00:00:00.000`), bare years,
//! float-formatted years (`1985.0`) and pre-1000 years (`860-01-01...`), so
//! the year is read from leading digits instead of a date parser.

/// Up to 4 leading ASCII digits, stopping at the first non-digit.
pub fn parse_year(raw: &str) -> Option<i32> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .take(4)
        .collect();

    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_formats() {
        assert_eq!(parse_year("860-01-01T00:00:00"), Some(860));
        assert_eq!(parse_year("1880-01-01T00:00:00.000"), Some(1880));
        assert_eq!(parse_year("1985.0"), Some(1985));
        assert_eq!(parse_year(" 1970-01-01 00:00:00 "), Some(1970));
        assert_eq!(parse_year("2101"), Some(2101));
    }

    #[test]
    fn test_parse_year_stops_after_four_digits() {
        assert_eq!(parse_year("198512"), Some(1985));
    }

    #[test]
    fn test_parse_year_rejects_missing() {
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("   "), None);
        assert_eq!(parse_year("unknown"), None);
        assert_eq!(parse_year("-1880"), None);
    }
}
