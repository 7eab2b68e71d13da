//! Calendar dates as they appear in requests, responses and the database.

use time::{
    Date, Duration, Month, OffsetDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::Error;

/// Dates are written as, e.g., "2025-01-31".
pub const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse a user supplied date.
///
/// Accepts either a plain date ("2025-01-31") or an RFC 3339 timestamp
/// ("2025-01-31T09:30:00Z"), in which case the date part is kept as written.
///
/// # Errors
/// Returns [Error::InvalidField] naming `field` if `text` is neither.
pub fn parse_date(field: &'static str, text: &str) -> Result<Date, Error> {
    let text = text.trim();

    Date::parse(text, DATE_FORMAT)
        .or_else(|_| OffsetDateTime::parse(text, &Rfc3339).map(|timestamp| timestamp.date()))
        .map_err(|_| Error::InvalidField {
            field,
            reason: format!("'{text}' is not a date in the format YYYY-MM-DD"),
        })
}

/// Format a date as "YYYY-MM-DD".
pub fn format_date(date: Date) -> String {
    // The format only has numeric components, so formatting cannot fail.
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// The first day of the month that `date` falls in.
pub fn first_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

/// Move `date` by `months` calendar months.
///
/// The day is clamped to the end of the target month, e.g. 31 January plus
/// one month is 28 (or 29) February. Returns `None` if the result is outside
/// the supported range of years.
pub fn add_months(date: Date, months: i32) -> Option<Date> {
    let month_index = date.year() * 12 + i32::from(u8::from(date.month())) - 1 + months;
    let year = month_index.div_euclid(12);
    let month = Month::try_from(u8::try_from(month_index.rem_euclid(12) + 1).ok()?).ok()?;

    // Every month has at least 28 days.
    (date.day().min(28)..=date.day())
        .rev()
        .find_map(|day| Date::from_calendar_date(year, month, day).ok())
}

/// Serialize a [Date] as "YYYY-MM-DD".
pub mod date_format {
    use serde::Serializer;
    use time::Date;

    /// Serialize `date` as "YYYY-MM-DD".
    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_date(*date))
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::{add_months, first_of_month, format_date, parse_date};
    use crate::Error;

    #[test]
    fn parses_plain_dates() {
        assert_eq!(parse_date("date", "2025-01-31"), Ok(date!(2025 - 01 - 31)));
    }

    #[test]
    fn keeps_the_written_date_of_timestamps() {
        assert_eq!(
            parse_date("date", "2025-01-31T23:30:00+13:00"),
            Ok(date!(2025 - 01 - 31))
        );
    }

    #[test]
    fn rejects_garbage() {
        let result = parse_date("deadline", "next tuesday");

        assert!(
            matches!(result, Err(Error::InvalidField { field: "deadline", .. })),
            "got {result:?}"
        );
    }

    #[test]
    fn formats_with_leading_zeros() {
        assert_eq!(format_date(date!(2025 - 02 - 03)), "2025-02-03");
    }

    #[test]
    fn first_of_month_keeps_month() {
        assert_eq!(first_of_month(date!(2025 - 03 - 17)), date!(2025 - 03 - 01));
        assert_eq!(first_of_month(date!(2025 - 03 - 01)), date!(2025 - 03 - 01));
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        assert_eq!(add_months(date!(2025 - 01 - 31), 1), Some(date!(2025 - 02 - 28)));
        assert_eq!(add_months(date!(2024 - 01 - 31), 1), Some(date!(2024 - 02 - 29)));
        assert_eq!(add_months(date!(2025 - 05 - 15), 12), Some(date!(2026 - 05 - 15)));
    }

    #[test]
    fn add_months_crosses_years_backwards() {
        assert_eq!(add_months(date!(2025 - 01 - 10), -1), Some(date!(2024 - 12 - 10)));
        assert_eq!(add_months(date!(2025 - 03 - 31), -13), Some(date!(2024 - 02 - 29)));
    }
}
