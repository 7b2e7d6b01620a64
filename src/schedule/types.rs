//! Schedule types – times of day, event slots, clock samples, and evaluation results.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Weekday};
use regex::Regex;
use serde::Serialize;

/// Calendar day in the target time zone. One fire per slot per key.
pub type DateKey = NaiveDate;

fn hhmm_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+):(\d+)$").expect("valid HH:MM pattern"))
}

/// A wall-clock time of day with minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    /// Build a time of day, returning `None` when out of range.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Parse an `"HH:MM"` string.
    ///
    /// Anything other than two all-digit tokens separated by `:` yields `None`,
    /// as does an hour or minute outside the clock (e.g. `"25:99"`).
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = hhmm_pattern().captures(raw.trim())?;
        let hour = caps[1].parse().ok()?;
        let minute = caps[2].parse().ok()?;
        Self::new(hour, minute)
    }

    /// Minutes since midnight.
    pub fn minutes_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// The two named daily events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventName {
    Open,
    Close,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Open => "open",
            EventName::Close => "close",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "open" => Some(EventName::Open),
            "close" => Some(EventName::Close),
            _ => None,
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured daily trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSlot {
    pub name: EventName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configured: Option<TimeOfDay>,
    /// Day this slot last fired. Written only by the fire decision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fired: Option<DateKey>,
}

impl EventSlot {
    pub fn new(name: EventName, configured: Option<TimeOfDay>) -> Self {
        Self {
            name,
            configured,
            last_fired: None,
        }
    }

    pub fn fired_on(&self, key: DateKey) -> bool {
        self.last_fired == Some(key)
    }
}

/// How a clock sample is matched against a slot's configured minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MatchPolicy {
    /// Fire only during the configured minute. A sampling gap that skips the
    /// minute means no fire that day.
    ExactMinute,
    /// Fire during the configured minute or up to `minutes` later the same day,
    /// if the slot has not fired yet.
    Grace { minutes: u32 },
}

impl MatchPolicy {
    pub const DEFAULT_GRACE_MINUTES: u32 = 5;

    pub fn matches(&self, configured: TimeOfDay, now_minutes: u32) -> bool {
        let target = configured.minutes_of_day();
        match self {
            MatchPolicy::ExactMinute => now_minutes == target,
            MatchPolicy::Grace { minutes } => {
                now_minutes >= target && now_minutes - target <= *minutes
            }
        }
    }
}

impl Default for MatchPolicy {
    fn default() -> Self {
        MatchPolicy::Grace {
            minutes: Self::DEFAULT_GRACE_MINUTES,
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::ExactMinute => f.write_str("exact minute"),
            MatchPolicy::Grace { minutes } => write!(f, "{} min grace", minutes),
        }
    }
}

/// A wall-clock reading in the target time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSample {
    pub date: NaiveDate,
    pub hour: u32,
    pub minute: u32,
    pub weekday: Weekday,
}

impl ClockSample {
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self {
            date: dt.date_naive(),
            hour: dt.hour(),
            minute: dt.minute(),
            weekday: dt.weekday(),
        }
    }

    /// Build a sample from a date and time, deriving the weekday.
    #[cfg(test)]
    pub fn at(date: NaiveDate, hour: u32, minute: u32) -> Self {
        Self {
            date,
            hour,
            minute,
            weekday: date.weekday(),
        }
    }

    pub fn date_key(&self) -> DateKey {
        self.date
    }

    pub fn minutes_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday, Weekday::Sat | Weekday::Sun)
    }
}

/// All scheduler state, owned by one task for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerState {
    pub armed: bool,
    pub weekdays_only: bool,
    pub slots: [EventSlot; 2],
    pub policy: MatchPolicy,
}

impl SchedulerState {
    /// Disarmed state with the given times.
    pub fn new(open: Option<TimeOfDay>, close: Option<TimeOfDay>, weekdays_only: bool) -> Self {
        Self {
            armed: false,
            weekdays_only,
            slots: [
                EventSlot::new(EventName::Open, open),
                EventSlot::new(EventName::Close, close),
            ],
            policy: MatchPolicy::default(),
        }
    }

    #[cfg(test)]
    pub fn slot(&self, name: EventName) -> &EventSlot {
        match name {
            EventName::Open => &self.slots[0],
            EventName::Close => &self.slots[1],
        }
    }

    pub fn slot_mut(&mut self, name: EventName) -> &mut EventSlot {
        match name {
            EventName::Open => &mut self.slots[0],
            EventName::Close => &mut self.slots[1],
        }
    }

    /// Configured slots in order, skipping unset ones.
    pub fn configured(&self) -> impl Iterator<Item = (EventName, TimeOfDay)> + '_ {
        self.slots
            .iter()
            .filter_map(|s| s.configured.map(|t| (s.name, t)))
    }
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self::new(None, None, true)
    }
}

/// Display class for a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Idle,
    Paused,
    Waiting,
    Alert,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Idle => "idle",
            Severity::Paused => "paused",
            Severity::Waiting => "waiting",
            Severity::Alert => "alert",
        }
    }
}

/// Outcome status of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "events", rename_all = "camelCase")]
pub enum Status {
    Disarmed,
    WeekendPaused,
    Armed,
    Firing(Vec<EventName>),
}

impl Status {
    pub fn severity(&self) -> Severity {
        match self {
            Status::Disarmed => Severity::Idle,
            Status::WeekendPaused => Severity::Paused,
            Status::Armed => Severity::Waiting,
            Status::Firing(_) => Severity::Alert,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Status::Disarmed => "Alarm disarmed.".to_string(),
            Status::WeekendPaused => "Weekend: alarm paused.".to_string(),
            Status::Armed => "Armed and waiting.".to_string(),
            Status::Firing(events) => {
                let names: Vec<&str> = events.iter().map(|e| e.as_str()).collect();
                format!("Ringing: {} bell!", names.join(" + "))
            }
        }
    }
}

/// Result of a single `evaluate` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub fires: Vec<EventName>,
    pub status: Status,
    pub next_event: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_times() {
        assert_eq!(TimeOfDay::parse("09:30"), TimeOfDay::new(9, 30));
        assert_eq!(TimeOfDay::parse("9:05"), TimeOfDay::new(9, 5));
        assert_eq!(TimeOfDay::parse(" 16:00 "), TimeOfDay::new(16, 0));
        assert_eq!(TimeOfDay::parse("00:00"), TimeOfDay::new(0, 0));
        assert_eq!(TimeOfDay::parse("23:59"), TimeOfDay::new(23, 59));
    }

    #[test]
    fn test_parse_malformed_is_absent() {
        for raw in ["", "abc", "9", "9:", ":30", "09:30:00", "-1:30", "9 :30", "ab:cd"] {
            assert_eq!(TimeOfDay::parse(raw), None, "input {:?}", raw);
        }
    }

    #[test]
    fn test_parse_out_of_range_is_absent() {
        assert_eq!(TimeOfDay::parse("25:99"), None);
        assert_eq!(TimeOfDay::parse("24:00"), None);
        assert_eq!(TimeOfDay::parse("12:60"), None);
        assert_eq!(TimeOfDay::parse("99999999999:00"), None);
    }

    #[test]
    fn test_time_display_is_zero_padded() {
        assert_eq!(TimeOfDay::new(9, 5).unwrap().to_string(), "09:05");
    }

    #[test]
    fn test_grace_policy_window() {
        let t = TimeOfDay::new(9, 30).unwrap();
        let grace = MatchPolicy::Grace { minutes: 5 };
        assert!(!grace.matches(t, 9 * 60 + 29));
        assert!(grace.matches(t, 9 * 60 + 30));
        assert!(grace.matches(t, 9 * 60 + 35));
        assert!(!grace.matches(t, 9 * 60 + 36));

        let zero = MatchPolicy::Grace { minutes: 0 };
        assert!(zero.matches(t, 9 * 60 + 30));
        assert!(!zero.matches(t, 9 * 60 + 31));
    }

    #[test]
    fn test_exact_policy() {
        let t = TimeOfDay::new(16, 0).unwrap();
        assert!(MatchPolicy::ExactMinute.matches(t, 16 * 60));
        assert!(!MatchPolicy::ExactMinute.matches(t, 16 * 60 + 1));
    }

    #[test]
    fn test_clock_sample_weekend() {
        // 2024-06-01 was a Saturday.
        let sat = ClockSample::at(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), 10, 0);
        assert_eq!(sat.weekday, Weekday::Sat);
        assert!(sat.is_weekend());
        let mon = ClockSample::at(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), 10, 0);
        assert!(!mon.is_weekend());
    }

    #[test]
    fn test_status_severity_and_message() {
        assert_eq!(Status::Disarmed.severity(), Severity::Idle);
        assert_eq!(Status::WeekendPaused.severity(), Severity::Paused);
        assert_eq!(Status::Armed.severity(), Severity::Waiting);
        let firing = Status::Firing(vec![EventName::Open, EventName::Close]);
        assert_eq!(firing.severity(), Severity::Alert);
        assert_eq!(firing.message(), "Ringing: open + close bell!");
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let mut state = SchedulerState::new(TimeOfDay::new(9, 30), None, true);
        state.slot_mut(EventName::Open).last_fired = NaiveDate::from_ymd_opt(2024, 6, 5);
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["weekdaysOnly"], true);
        assert_eq!(value["policy"]["kind"], "grace");
        assert_eq!(value["slots"][0]["configured"]["hour"], 9);
        assert_eq!(value["slots"][0]["lastFired"], "2024-06-05");
        assert!(value["slots"][1].get("configured").is_none());
    }

    #[test]
    fn test_event_name_lookup() {
        assert_eq!(EventName::from_name("OPEN"), Some(EventName::Open));
        assert_eq!(EventName::from_name("close"), Some(EventName::Close));
        assert_eq!(EventName::from_name("lunch"), None);
    }
}
