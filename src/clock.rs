//! Wall-clock source in the target time zone.

use chrono::Utc;
use chrono_tz::Tz;

use crate::error::BellError;
use crate::schedule::types::ClockSample;

/// Something that can tell the current time in the target zone.
pub trait Clock: Send + Sync {
    fn now(&self) -> ClockSample;

    /// Name of the zone the samples are taken in.
    fn zone_name(&self) -> String;
}

/// The system clock converted to a fixed IANA time zone.
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Resolve an IANA zone name such as `"America/New_York"`.
    pub fn from_name(name: &str) -> Result<Self, BellError> {
        parse_timezone(name).map(Self::new)
    }

    /// Current time formatted for display, e.g. `2024-06-05 09:30:12 EDT`.
    pub fn display_now(&self) -> String {
        Utc::now()
            .with_timezone(&self.tz)
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> ClockSample {
        ClockSample::from_datetime(&Utc::now().with_timezone(&self.tz))
    }

    fn zone_name(&self) -> String {
        self.tz.name().to_string()
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz, BellError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| BellError::InvalidTimezone(name.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Weekday};
    use chrono_tz::America::New_York;

    use super::*;

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("America/New_York").is_ok());
        assert!(parse_timezone("Europe/London").is_ok());
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(BellError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_sample_uses_local_date_not_utc() {
        // 02:30 UTC on a Saturday is still Friday evening in New York.
        let utc = Utc.with_ymd_and_hms(2024, 6, 8, 2, 30, 0).unwrap();
        let sample = ClockSample::from_datetime(&utc.with_timezone(&New_York));
        assert_eq!(sample.date, NaiveDate::from_ymd_opt(2024, 6, 7).unwrap());
        assert_eq!(sample.weekday, Weekday::Fri);
        assert_eq!((sample.hour, sample.minute), (22, 30));
    }

    #[test]
    fn test_sample_across_dst_change() {
        // 2024-03-10 is the US spring-forward day; 13:30 UTC is 09:30 EDT.
        let utc = Utc.with_ymd_and_hms(2024, 3, 10, 13, 30, 0).unwrap();
        let sample = ClockSample::from_datetime(&utc.with_timezone(&New_York));
        assert_eq!((sample.hour, sample.minute), (9, 30));
        // A day earlier the same wall time was 14:30 UTC.
        let utc = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap();
        let sample = ClockSample::from_datetime(&utc.with_timezone(&New_York));
        assert_eq!((sample.hour, sample.minute), (9, 30));
    }

    #[test]
    fn test_system_clock_zone_name() {
        let clock = SystemClock::from_name("America/New_York").unwrap();
        assert_eq!(clock.zone_name(), "America/New_York");
    }
}
