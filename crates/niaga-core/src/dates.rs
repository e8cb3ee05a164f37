//! # Dates
//!
//! Transaction and due date resolution.
//!
//! ```text
//! transaction_date = supplied ?? now
//! due_date         = supplied ?? transaction_date + due_days
//! ```
//!
//! Supplied values are stored as given. A due date before the transaction
//! date is accepted; [`ResolvedDates::is_inverted`] lets the caller log it.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// Both dates of a sale header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDates {
    pub transaction_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

impl ResolvedDates {
    /// True when an override put the due date before the transaction date.
    pub fn is_inverted(&self) -> bool {
        self.due_date < self.transaction_date
    }
}

/// `transaction_date + due_days`, failing instead of panicking at the edges
/// of the representable range.
pub fn default_due_date(transaction_date: DateTime<Utc>, due_days: i64) -> ValidationResult<DateTime<Utc>> {
    Duration::try_days(due_days)
        .and_then(|d| transaction_date.checked_add_signed(d))
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "due_date".to_string(),
            reason: "out of range".to_string(),
        })
}

/// Applies defaults to the optional overrides.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use niaga_core::dates::resolve_dates;
///
/// let now = Utc::now();
/// let dates = resolve_dates(now, None, None, 7).unwrap();
/// assert_eq!(dates.transaction_date, now);
/// assert_eq!(dates.due_date, now + Duration::days(7));
/// ```
pub fn resolve_dates(
    now: DateTime<Utc>,
    transaction_date: Option<DateTime<Utc>>,
    due_date: Option<DateTime<Utc>>,
    due_days: i64,
) -> ValidationResult<ResolvedDates> {
    let transaction_date = transaction_date.unwrap_or(now);
    let due_date = match due_date {
        Some(d) => d,
        None => default_due_date(transaction_date, due_days)?,
    };

    Ok(ResolvedDates {
        transaction_date,
        due_date,
    })
}

/// Parses a date field of the manual invoice form.
///
/// Accepts RFC 3339 (`2025-01-15T09:30:00+08:00`) or a plain calendar date
/// (`2025-01-15`, midnight in `offset`). Absent and blank both mean "not
/// supplied".
pub fn parse_date_input(
    field: &str,
    value: Option<&str>,
    offset: FixedOffset,
) -> ValidationResult<Option<DateTime<Utc>>> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(v) => v,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "expected YYYY-MM-DD or an RFC 3339 timestamp".to_string(),
    };

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(offset)
        .single()
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .ok_or_else(invalid)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn wita() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    #[test]
    fn test_defaults() {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 3, 0, 0).unwrap();
        let dates = resolve_dates(now, None, None, 7).unwrap();
        assert_eq!(dates.transaction_date, now);
        assert_eq!(dates.due_date, Utc.with_ymd_and_hms(2025, 1, 22, 3, 0, 0).unwrap());
        assert!(!dates.is_inverted());
    }

    #[test]
    fn test_due_follows_supplied_transaction_date() {
        let now = Utc::now();
        let tx = Utc.with_ymd_and_hms(2024, 12, 30, 0, 0, 0).unwrap();
        let dates = resolve_dates(now, Some(tx), None, 7).unwrap();
        assert_eq!(dates.due_date, Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_inverted_override_is_kept() {
        let tx = Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap();
        let due = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let dates = resolve_dates(Utc::now(), Some(tx), Some(due), 7).unwrap();
        assert_eq!(dates.due_date, due);
        assert!(dates.is_inverted());
    }

    #[test]
    fn test_parse_plain_date_at_business_midnight() {
        let parsed = parse_date_input("transaction_date", Some("2025-01-15"), wita())
            .unwrap()
            .unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 14, 16, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339() {
        let parsed = parse_date_input("due_date", Some("2025-01-15T09:30:00Z"), wita())
            .unwrap()
            .unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_blank_and_invalid() {
        assert_eq!(parse_date_input("due_date", None, wita()).unwrap(), None);
        assert_eq!(parse_date_input("due_date", Some("  "), wita()).unwrap(), None);
        assert!(parse_date_input("due_date", Some("15/01/2025"), wita()).is_err());
        assert!(parse_date_input("due_date", Some("2025-02-30"), wita()).is_err());
    }
}
