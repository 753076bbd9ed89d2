//! Flexible date parsing for bulk-imported rows.
//!
//! Photographed ledgers yield dates in whatever shape the handwriting
//! had, so parsing is deliberately forgiving: a list of explicit
//! day-first formats is tried in order, then a last-ditch split on the
//! common separators.

use time::{Date, Month, macros::format_description};

/// Parse a day-first date string in one of the shapes bulk imports
/// produce.
///
/// Tries `D/M/Y`, `D-M-Y`, `D.M.Y` and `D M Y` (four-digit years) in
/// that order, then falls back to splitting on `-`, `.` or `/` and
/// reading the parts as day, month, year, promoting two-digit years by
/// adding 2000. Returns `None` only if every strategy fails.
pub fn parse_flexible_date(text: &str) -> Option<Date> {
    let trimmed = text.trim();

    let formats = [
        format_description!("[day padding:none]/[month padding:none]/[year]"),
        format_description!("[day padding:none]-[month padding:none]-[year]"),
        format_description!("[day padding:none].[month padding:none].[year]"),
        format_description!("[day padding:none] [month padding:none] [year]"),
    ];

    for format in formats {
        if let Ok(date) = Date::parse(trimmed, format) {
            return Some(date);
        }
    }

    parse_from_parts(trimmed)
}

fn parse_from_parts(text: &str) -> Option<Date> {
    let normalized = text.replace(['-', '.'], "/");
    let mut parts = normalized.split('/');

    let day: u8 = parts.next()?.trim().parse().ok()?;
    let month_number: u8 = parts.next()?.trim().parse().ok()?;
    let mut year: i32 = parts.next()?.trim().parse().ok()?;

    if parts.next().is_some() {
        return None;
    }

    if year < 100 {
        year += 2000;
    }

    let month = Month::try_from(month_number).ok()?;

    Date::from_calendar_date(year, month, day).ok()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::parse_flexible_date;

    #[test]
    fn parses_each_explicit_format() {
        let want = date!(2025 - 06 - 05);

        for text in ["5/6/2025", "5-6-2025", "5.6.2025", "5 6 2025"] {
            assert_eq!(parse_flexible_date(text), Some(want), "failed on {text:?}");
        }
    }

    #[test]
    fn parses_padded_days_and_months() {
        assert_eq!(parse_flexible_date("05/06/2025"), Some(date!(2025 - 06 - 05)));
    }

    #[test]
    fn fallback_promotes_two_digit_years() {
        assert_eq!(parse_flexible_date("5/6/25"), Some(date!(2025 - 06 - 05)));
        assert_eq!(parse_flexible_date("5-6-25"), Some(date!(2025 - 06 - 05)));
        assert_eq!(parse_flexible_date("5.6.25"), Some(date!(2025 - 06 - 05)));
    }

    #[test]
    fn fallback_handles_mixed_separators() {
        assert_eq!(parse_flexible_date("5-6.2025"), Some(date!(2025 - 06 - 05)));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(parse_flexible_date(" 5/6/2025 "), Some(date!(2025 - 06 - 05)));
    }

    #[test]
    fn rejects_garbage() {
        for text in ["", "soon", "5/6", "5/6/7/8", "32/1/2025", "1/13/2025"] {
            assert_eq!(parse_flexible_date(text), None, "should reject {text:?}");
        }
    }
}
