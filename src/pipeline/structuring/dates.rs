//! Visit date detection and normalisation.
//!
//! Three date shapes are searched in a fixed priority order. The first
//! substring found for a shape is parsed against an ordered list of
//! templates and the first template that parses wins.
//!
//! Known limitations:
//! - Numeric dates are ambiguous (`03/04/2025`). Day-first templates are
//!   tried before month-first ones, so `03/04/2025` reads as 3 April.
//!   Month-first only applies when day-first cannot parse (`04/13/2025`).
//!   This will be wrong for month-first locales whenever both readings are
//!   valid.
//! - ISO dates are not a recognised shape. `2025-04-01` contains the numeric
//!   shape `25-04-01`, which reads as 25 April 2001.
//! - Two-digit years use chrono's pivot: `00`-`69` become 20xx and `70`-`99`
//!   become 19xx. Python's `strptime` pivots one year earlier, so `69` is
//!   2069 here and 1969 there.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Searched in this order; position in the text does not matter.
static DATE_SHAPES: LazyLock<Vec<(DateShape, Regex)>> = LazyLock::new(|| {
    vec![
        (
            DateShape::Numeric,
            Regex::new(r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}").unwrap(),
        ),
        (
            DateShape::DayMonthName,
            Regex::new(
                r"(?i)\d{1,2}\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{2,4}",
            )
            .unwrap(),
        ),
        (
            DateShape::MonthNameDay,
            Regex::new(
                r"(?i)(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{1,2},?\s+\d{2,4}",
            )
            .unwrap(),
        ),
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateShape {
    /// `D/M/Y` or `D-M-Y`, 1-2 digit day and month, 2 or 4 digit year.
    Numeric,
    /// `1 April 2025`, `01 Apr 25`.
    DayMonthName,
    /// `April 1, 2025`, `Apr 01 25`.
    MonthNameDay,
}

/// A chrono format plus the exact year width it accepts.
///
/// chrono's `%Y` happily reads `25` as year 25, so 4-digit templates are only
/// tried when the candidate really ends in four digits.
struct DateTemplate {
    format: &'static str,
    year_digits: usize,
}

const fn template(format: &'static str, year_digits: usize) -> DateTemplate {
    DateTemplate { format, year_digits }
}

/// Day-first numeric, named month, then month-first numeric as a fallback.
/// `%b` only takes the three-letter abbreviation; `%B` takes the full name.
const DATE_TEMPLATES: &[DateTemplate] = &[
    template("%d/%m/%Y", 4),
    template("%d-%m-%Y", 4),
    template("%d/%m/%y", 2),
    template("%d-%m-%y", 2),
    template("%d %b %Y", 4),
    template("%d %B %Y", 4),
    template("%d %b %y", 2),
    template("%d %B %y", 2),
    template("%b %d %Y", 4),
    template("%B %d %Y", 4),
    template("%b %d %y", 2),
    template("%B %d %y", 2),
    template("%m/%d/%Y", 4),
    template("%m-%d-%Y", 4),
    template("%m/%d/%y", 2),
    template("%m-%d-%y", 2),
];

/// Find the first date-shaped substring and parse it.
///
/// Returns `None` when no shape is present or when no template parses the
/// candidate(s). A shape whose candidate fails to parse does not stop the
/// search: the next shape is tried.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    for (shape, regex) in DATE_SHAPES.iter() {
        let Some(found) = regex.find(text) else {
            continue;
        };
        let candidate = found.as_str();
        match parse_candidate(candidate) {
            Some(date) => {
                tracing::debug!(?shape, candidate, %date, "Visit date recognised");
                return Some(date);
            }
            None => {
                tracing::debug!(?shape, candidate, "Date-shaped text did not parse");
            }
        }
    }
    tracing::warn!("Could not extract or parse a date from OCR text");
    None
}

/// Try every template, in order, against one candidate substring.
pub fn parse_candidate(candidate: &str) -> Option<NaiveDate> {
    let normalized = normalize_candidate(candidate);
    let year_digits = trailing_digits(&normalized);
    DATE_TEMPLATES
        .iter()
        .filter(|t| t.year_digits == year_digits)
        .find_map(|t| NaiveDate::parse_from_str(&normalized, t.format).ok())
}

/// Drop the optional comma of `April 1, 2025` and collapse whitespace runs.
fn normalize_candidate(candidate: &str) -> String {
    candidate
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn trailing_digits(s: &str) -> usize {
    s.chars().rev().take_while(|c| c.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn numeric_day_first() {
        assert_eq!(extract_date("Date: 01/04/2025"), ymd(2025, 4, 1));
    }

    #[test]
    fn numeric_dash_separator() {
        assert_eq!(extract_date("Visit 15-08-2024 OPD"), ymd(2024, 8, 15));
    }

    #[test]
    fn numeric_two_digit_year() {
        assert_eq!(extract_date("Date: 5/6/24"), ymd(2024, 6, 5));
        assert_eq!(extract_date("Date: 05-06-99"), ymd(1999, 6, 5));
    }

    #[test]
    fn month_first_fallback_when_day_first_invalid() {
        assert_eq!(extract_date("Date: 04/13/2025"), ymd(2025, 4, 13));
        assert_eq!(extract_date("Date: 12-31-23"), ymd(2023, 12, 31));
    }

    #[test]
    fn ambiguous_numeric_prefers_day_first() {
        assert_eq!(extract_date("03/04/2025"), ymd(2025, 4, 3));
    }

    #[test]
    fn day_month_name_year() {
        assert_eq!(extract_date("Seen on 1 April 2025"), ymd(2025, 4, 1));
        assert_eq!(extract_date("Seen on 09 Sep 2023"), ymd(2023, 9, 9));
        assert_eq!(extract_date("Seen on 9 sep 23"), ymd(2023, 9, 9));
    }

    #[test]
    fn month_name_day_year() {
        assert_eq!(extract_date("Date: April 1, 2025"), ymd(2025, 4, 1));
        assert_eq!(extract_date("Date: Dec 25 2024"), ymd(2024, 12, 25));
        assert_eq!(extract_date("Date: march 3,  2022"), ymd(2022, 3, 3));
    }

    #[test]
    fn full_month_names_in_any_case() {
        assert_eq!(extract_date("Seen on 1 APRIL 2025"), ymd(2025, 4, 1));
        assert_eq!(extract_date("Seen on 1 april 2025"), ymd(2025, 4, 1));
        assert_eq!(extract_date("Date: APRIL 1, 2025"), ymd(2025, 4, 1));
        assert_eq!(extract_date("Seen on 1 SEPTEMBER 2024"), ymd(2024, 9, 1));
        assert_eq!(extract_date("Seen on 14 November 24"), ymd(2024, 11, 14));
        assert_eq!(extract_date("Date: February 29 24"), ymd(2024, 2, 29));
    }

    #[test]
    fn two_digit_year_pivot() {
        assert_eq!(extract_date("Date: 05-06-69"), ymd(2069, 6, 5));
        assert_eq!(extract_date("Date: 05-06-70"), ymd(1970, 6, 5));
    }

    #[test]
    fn iso_date_is_read_as_numeric_shape() {
        // Known limitation: only "25-04-01" is seen.
        assert_eq!(extract_date("Date: 2025-04-01"), ymd(2001, 4, 25));
    }

    #[test]
    fn numeric_shape_wins_over_earlier_named_date() {
        let text = "Admitted 2 March 2024\nFollow-up 10/04/2024";
        assert_eq!(extract_date(text), ymd(2024, 4, 10));
    }

    #[test]
    fn unparseable_numeric_falls_through_to_named_shape() {
        // 3-digit year matches the numeric shape but no template.
        let text = "Ref 12/10/202\nDate: 7 Jan 2025";
        assert_eq!(extract_date(text), ymd(2025, 1, 7));
    }

    #[test]
    fn impossible_date_is_absent() {
        assert_eq!(extract_date("Date: 31/31/2025"), None);
        assert_eq!(extract_date("Date: 30 Feb 2024"), None);
    }

    #[test]
    fn no_date_is_absent() {
        assert_eq!(extract_date("Patient Name: John Doe\nRx: rest"), None);
        assert_eq!(extract_date(""), None);
    }

    #[test]
    fn two_digit_year_never_becomes_year_25() {
        let date = parse_candidate("01/04/25").unwrap();
        assert_eq!(date.format("%Y").to_string(), "2025");
    }

    #[test]
    fn normalize_strips_comma_and_spacing() {
        assert_eq!(normalize_candidate("April  1,\t2025"), "April 1 2025");
    }
}
