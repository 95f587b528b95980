//! Civil date utilities for the posting path.
//!
//! Journal entries, documents, and period boundaries are all keyed on civil
//! dates (`NaiveDate`), not instants — "today" depends on the company's
//! configured time zone, not the server's. This crate is the single place
//! that converts between a company's local calendar day and UTC instants.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError {
    #[error("'{0}' is not a valid IANA time zone name")]
    UnknownTimeZone(String),
    #[error("'{0}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("civil date {0} is ambiguous or nonexistent in time zone {1}")]
    AmbiguousLocalTime(NaiveDate, String),
}

/// A company's configured civil time zone, used to normalize "today" and
/// to convert user date input to/from UTC instants for comparisons against
/// period boundaries.
#[derive(Debug, Clone, Copy)]
pub struct CompanyClock {
    tz: Tz,
}

impl CompanyClock {
    pub fn new(tz_name: &str) -> Result<Self, ClockError> {
        let tz: Tz = tz_name
            .parse()
            .map_err(|_| ClockError::UnknownTimeZone(tz_name.to_string()))?;
        Ok(Self { tz })
    }

    pub fn utc() -> Self {
        Self { tz: chrono_tz::UTC }
    }

    /// The company's current civil date, i.e. "today" in its own time zone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    /// Parse a user-supplied date string (`YYYY-MM-DD`) into a `NaiveDate`.
    /// Does not perform any time zone conversion — dates are civil dates,
    /// not instants, until they need to be compared against a UTC value.
    pub fn parse_date(raw: &str) -> Result<NaiveDate, ClockError> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| ClockError::InvalidDate(raw.to_string()))
    }

    /// Truncate a civil date to its "start of day" instant in the company's
    /// time zone, expressed in UTC. Used for period-boundary comparisons
    /// that need an absolute instant (e.g. "is this row before the close").
    pub fn start_of_day_utc(&self, date: NaiveDate) -> Result<DateTime<Utc>, ClockError> {
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
            ClockError::AmbiguousLocalTime(date, self.tz.to_string())
        })?;

        match self.tz.from_local_datetime(&midnight) {
            chrono::LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
            chrono::LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
            chrono::LocalResult::None => {
                Err(ClockError::AmbiguousLocalTime(date, self.tz.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn today_reflects_company_time_zone_not_utc() {
        // 2026-01-01T02:00:00Z is still 2025-12-31 in US/Pacific.
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 2, 0, 0).unwrap();
        let clock = CompanyClock::new("America/Los_Angeles").unwrap();
        assert_eq!(
            clock.today(now),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
    }

    #[test]
    fn parse_date_rejects_malformed_input() {
        assert!(CompanyClock::parse_date("2026-13-40").is_err());
        assert!(CompanyClock::parse_date("not-a-date").is_err());
        assert_eq!(
            CompanyClock::parse_date("2026-07-26").unwrap(),
            NaiveDate::from_ymd_opt(2026, 7, 26).unwrap()
        );
    }

    #[test]
    fn unknown_time_zone_is_rejected() {
        assert!(CompanyClock::new("Not/A_Zone").is_err());
    }

    #[test]
    fn start_of_day_round_trips_through_utc_for_a_fixed_offset_zone() {
        let clock = CompanyClock::new("America/New_York").unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 7, 15).unwrap();
        let instant = clock.start_of_day_utc(date).unwrap();
        assert_eq!(clock.today(instant), date);
    }
}
