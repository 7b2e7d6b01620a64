//! Alarm service: owns the scheduler state and drives the evaluation cadence.
//!
//! All ticks and control commands are handled by one task, one at a time, so
//! an evaluation never overlaps another or a reconfiguration.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::control::{Control, HELP};
use crate::error::BellError;
use crate::notify::base::NotificationSink;
use crate::schedule::presets::{find_preset, PRESETS};
use crate::schedule::scheduler::evaluate;
use crate::schedule::types::{
    EventName, EventSlot, Evaluation, MatchPolicy, SchedulerState, Status, TimeOfDay,
};
use crate::status::StatusSink;
use crate::utils::helpers::on_off;

/// Serializable view of the service for `status --json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSnapshot {
    pub zone: String,
    pub armed: bool,
    pub weekdays_only: bool,
    pub policy: MatchPolicy,
    pub slots: Vec<EventSlot>,
    pub status: Status,
    pub next_event: String,
}

pub struct AlarmService {
    state: SchedulerState,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn NotificationSink>,
    status: Arc<dyn StatusSink>,
    tick_every: Duration,
    /// Last status and next-event text handed to the status sink.
    shown: Option<(Status, String)>,
    ringing: Vec<JoinHandle<()>>,
}

impl AlarmService {
    pub fn new(
        state: SchedulerState,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn NotificationSink>,
        status: Arc<dyn StatusSink>,
        tick_every: Duration,
    ) -> Self {
        Self {
            state,
            clock,
            notifier,
            status,
            tick_every: tick_every.max(Duration::from_millis(100)),
            shown: None,
            ringing: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    /// Sample the clock once, ring for every fired slot and refresh the display.
    pub async fn tick(&mut self) -> Evaluation {
        let now = self.clock.now();
        let eval = evaluate(&now, &mut self.state);

        for &event in &eval.fires {
            info!("Ringing {} bell ({})", event, now.date_key());
            let handle = self.ring(event);
            self.ringing.push(handle);
        }
        self.ringing.retain(|h| !h.is_finished());

        self.publish(&eval);
        eval
    }

    /// Play the bell without blocking the cadence. Failures are logged only.
    fn ring(&self, event: EventName) -> JoinHandle<()> {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.play(event).await {
                warn!("Bell '{}' failed for {}: {}", notifier.name(), event, e);
            }
        })
    }

    /// Wait for bells that are still playing.
    pub async fn settle(&mut self) {
        for handle in self.ringing.drain(..) {
            if let Err(e) = handle.await {
                warn!("Bell task ended abnormally: {}", e);
            }
        }
    }

    fn publish(&mut self, eval: &Evaluation) {
        let changed = match &self.shown {
            Some((status, next)) => *status != eval.status || *next != eval.next_event,
            None => true,
        };
        if !changed {
            return;
        }
        self.status
            .show_status(&eval.status.message(), eval.status.severity());
        self.status.show_next(&eval.next_event);
        self.shown = Some((eval.status.clone(), eval.next_event.clone()));
    }

    /// Apply one control command and return the text to show the user.
    pub async fn apply(&mut self, control: Control) -> Result<String, BellError> {
        match control {
            Control::Arm => {
                self.state.armed = true;
                info!("Alarm armed");
                self.tick().await;
                Ok("Armed.".to_string())
            }
            Control::Disarm => {
                self.state.armed = false;
                info!("Alarm disarmed");
                self.tick().await;
                Ok("Disarmed.".to_string())
            }
            Control::SetTime(name, raw) => {
                self.ensure_disarmed()?;
                let parsed = TimeOfDay::parse(&raw);
                self.state.slot_mut(name).configured = parsed;
                Ok(match parsed {
                    Some(t) => format!("{} bell set to {}.", name, t),
                    None => format!("{} bell unset: '{}' is not a valid HH:MM time.", name, raw),
                })
            }
            Control::ClearTime(name) => {
                self.ensure_disarmed()?;
                self.state.slot_mut(name).configured = None;
                Ok(format!("{} bell cleared.", name))
            }
            Control::Preset(name) => {
                self.ensure_disarmed()?;
                let preset = find_preset(&name).ok_or(BellError::UnknownPreset(name))?;
                self.state.slot_mut(EventName::Open).configured = preset.open();
                self.state.slot_mut(EventName::Close).configured = preset.close();
                debug!("Applied preset {}", preset.name);
                Ok(format!("Preset '{}': {}.", preset.name, preset.description))
            }
            Control::WeekdaysOnly(flag) => {
                self.state.weekdays_only = flag;
                self.tick().await;
                Ok(format!("Weekdays only: {}.", on_off(flag)))
            }
            Control::Status => Ok(self.describe()),
            Control::Help => Ok(format!("{}\n\nPresets: {}", HELP, preset_names())),
            Control::Quit => Ok("Goodbye!".to_string()),
        }
    }

    fn ensure_disarmed(&self) -> Result<(), BellError> {
        if self.state.armed {
            Err(BellError::ReconfigureWhileArmed)
        } else {
            Ok(())
        }
    }

    /// Current state, evaluated against the clock without firing.
    pub fn snapshot(&self) -> ServiceSnapshot {
        // Evaluate a throwaway copy so fire markers are left untouched.
        let mut probe = self.state.clone();
        let eval = evaluate(&self.clock.now(), &mut probe);
        let status = match eval.status {
            Status::Firing(_) => Status::Armed,
            other => other,
        };
        ServiceSnapshot {
            zone: self.clock.zone_name(),
            armed: self.state.armed,
            weekdays_only: self.state.weekdays_only,
            policy: self.state.policy,
            slots: self.state.slots.to_vec(),
            status,
            next_event: eval.next_event,
        }
    }

    /// Like [`snapshot`](Self::snapshot), but the next event is worked out as
    /// if the alarm were armed. Armed state and status are reported as they are.
    pub fn preview(&self) -> ServiceSnapshot {
        let mut snap = self.snapshot();
        let mut armed = self.state.clone();
        armed.armed = true;
        snap.next_event = evaluate(&self.clock.now(), &mut armed).next_event;
        snap
    }

    /// Human-readable state summary.
    pub fn describe(&self) -> String {
        self.render(&self.snapshot())
    }

    pub fn render(&self, snap: &ServiceSnapshot) -> String {
        let now = self.clock.now();
        let mut lines = vec![
            format!(
                "Now: {} {:02}:{:02} ({}, {})",
                now.date, now.hour, now.minute, now.weekday, snap.zone
            ),
            format!("Armed: {}", on_off(snap.armed)),
            format!("Weekdays only: {}", on_off(snap.weekdays_only)),
            format!("Matching: {}", snap.policy),
        ];
        for slot in &snap.slots {
            let time = slot
                .configured
                .map(|t| t.to_string())
                .unwrap_or_else(|| "unset".to_string());
            let fired = slot
                .last_fired
                .map(|d| format!(" (last rang {})", d))
                .unwrap_or_default();
            lines.push(format!("{:<6} {}{}", format!("{}:", slot.name), time, fired));
        }
        lines.push(format!("Next: {}", snap.next_event));
        lines.join("\n")
    }

    /// Run until `quit`, or until `shutdown` flips to `true`.
    ///
    /// A closed control channel (stdin at EOF) keeps the cadence running.
    pub async fn run(
        &mut self,
        mut controls: UnboundedReceiver<Control>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut interval = tokio::time::interval(self.tick_every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut controls_open = true;

        info!(
            "Alarm service started ({}, tick every {:?})",
            self.clock.zone_name(),
            self.tick_every
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                control = controls.recv(), if controls_open => match control {
                    Some(Control::Quit) => {
                        self.status.show_reply("Goodbye!");
                        break;
                    }
                    Some(control) => match self.apply(control).await {
                        Ok(reply) => self.status.show_reply(&reply),
                        Err(e) => self.status.show_reply(&format!("Error: {}", e)),
                    },
                    None => {
                        debug!("Control channel closed");
                        controls_open = false;
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown requested");
                        break;
                    }
                }
            }
        }

        self.settle().await;
        info!("Alarm service stopped");
    }
}

fn preset_names() -> String {
    PRESETS.iter().map(|p| p.name).collect::<Vec<_>>().join(", ")
}

/// A watch channel that flips to `true` on Ctrl-C.
pub fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            // Keep the sender alive so the receiver does not read a closed channel.
            std::future::pending::<()>().await;
        }
        let _ = tx.send(true);
    });
    rx
}
