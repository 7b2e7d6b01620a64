//! The daily-fire decision.
//!
//! [`evaluate`] is a plain step function over an owned [`SchedulerState`]; it
//! never touches a real clock or plays sound, so callers can drive it with
//! synthetic samples.

use crate::schedule::types::{
    ClockSample, Evaluation, EventName, SchedulerState, Status, TimeOfDay,
};

/// Evaluate one clock sample against the scheduler state.
///
/// Records a fire by stamping the slot's `last_fired` with today's key in the
/// same branch that reports it, so a slot fires at most once per calendar day.
pub fn evaluate(now: &ClockSample, state: &mut SchedulerState) -> Evaluation {
    if !state.armed {
        return Evaluation {
            fires: Vec::new(),
            status: Status::Disarmed,
            next_event: "not armed".to_string(),
        };
    }

    if state.weekdays_only && now.is_weekend() {
        return Evaluation {
            fires: Vec::new(),
            status: Status::WeekendPaused,
            next_event: weekend_description(state),
        };
    }

    let today = now.date_key();
    let now_minutes = now.minutes_of_day();
    let policy = state.policy;
    let mut fires: Vec<EventName> = Vec::new();

    for slot in state.slots.iter_mut() {
        let Some(configured) = slot.configured else {
            continue;
        };
        if slot.fired_on(today) || !policy.matches(configured, now_minutes) {
            continue;
        }
        slot.last_fired = Some(today);
        fires.push(slot.name);
    }

    let status = if fires.is_empty() {
        Status::Armed
    } else {
        Status::Firing(fires.clone())
    };

    Evaluation {
        fires,
        status,
        next_event: next_event_description(now, state),
    }
}

/// Describe the next configured event relative to `now`.
///
/// Picks the earliest slot at or after the current minute today, otherwise
/// wraps to the earliest slot tomorrow. Slots are compared by minute of day;
/// ties keep slot order.
pub fn next_event_description(now: &ClockSample, state: &SchedulerState) -> String {
    let now_minutes = now.minutes_of_day();

    let today = state
        .configured()
        .filter(|(_, t)| t.minutes_of_day() >= now_minutes)
        .min_by_key(|(_, t)| t.minutes_of_day());
    if let Some((name, time)) = today {
        return format!("{} at {} today", name, time);
    }

    match earliest(state) {
        Some((name, time)) => format!("{} at {} tomorrow", name, time),
        None => "no valid times set".to_string(),
    }
}

fn weekend_description(state: &SchedulerState) -> String {
    match earliest(state) {
        Some((name, time)) => format!("resumes Monday at {} ({})", time, name),
        None => "resumes Monday".to_string(),
    }
}

fn earliest(state: &SchedulerState) -> Option<(EventName, TimeOfDay)> {
    state.configured().min_by_key(|(_, t)| t.minutes_of_day())
}
