//! Configuration schema.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::clock::parse_timezone;
use crate::error::BellError;
use crate::schedule::presets::find_preset;
use crate::schedule::types::{MatchPolicy, SchedulerState, TimeOfDay};

fn default_timezone() -> String {
    "America/New_York".to_string()
}

/// Timing behaviour of the alarm loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleConfig {
    /// Only ring during the exact configured minute.
    pub exact_minute: bool,
    /// Minutes after the configured time during which a missed bell still rings.
    pub grace_minutes: u32,
    /// Seconds between clock samples.
    pub tick_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            exact_minute: false,
            grace_minutes: MatchPolicy::DEFAULT_GRACE_MINUTES,
            tick_secs: 1,
        }
    }
}

/// How the bell is played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SoundConfig {
    /// Shell command to run instead of the terminal bell. `{event}` expands to
    /// `open` or `close`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Seconds before the sound command is killed.
    pub timeout: u64,
    /// How many `BEL` characters the terminal bell writes.
    pub bell_repeats: u32,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            command: None,
            timeout: 30,
            bell_repeats: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayConfig {
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Root configuration, stored as JSON at `~/.market-bell/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// IANA zone the bell times are expressed in.
    pub timezone: String,
    /// `"HH:MM"`; `null` or anything unparsable leaves the open bell unset.
    pub open: Option<String>,
    pub close: Option<String>,
    /// Preset name; when set it takes precedence over `open`/`close`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    pub weekdays_only: bool,
    pub armed_on_start: bool,
    pub schedule: ScheduleConfig,
    pub sound: SoundConfig,
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            open: Some("09:30".to_string()),
            close: Some("16:00".to_string()),
            preset: None,
            weekdays_only: true,
            armed_on_start: false,
            schedule: ScheduleConfig::default(),
            sound: SoundConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    pub fn tz(&self) -> Result<Tz, BellError> {
        parse_timezone(&self.timezone)
    }

    pub fn match_policy(&self) -> MatchPolicy {
        if self.schedule.exact_minute {
            MatchPolicy::ExactMinute
        } else {
            MatchPolicy::Grace {
                minutes: self.schedule.grace_minutes,
            }
        }
    }

    /// Bell times after applying the preset, if any.
    pub fn bell_times(&self) -> Result<(Option<TimeOfDay>, Option<TimeOfDay>), BellError> {
        if let Some(name) = &self.preset {
            let preset = find_preset(name).ok_or_else(|| BellError::UnknownPreset(name.clone()))?;
            return Ok((preset.open(), preset.close()));
        }
        Ok((
            self.open.as_deref().and_then(TimeOfDay::parse),
            self.close.as_deref().and_then(TimeOfDay::parse),
        ))
    }

    /// Scheduler state to start the service with.
    pub fn initial_state(&self) -> Result<SchedulerState, BellError> {
        let (open, close) = self.bell_times()?;
        let mut state = SchedulerState::new(open, close, self.weekdays_only);
        state.policy = self.match_policy();
        state.armed = self.armed_on_start;
        Ok(state)
    }
}
