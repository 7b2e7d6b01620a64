//! Status display.

use std::io::Write as _;

use crate::schedule::types::Severity;

/// Receives status text for display. Purely observational.
pub trait StatusSink: Send + Sync {
    fn show_status(&self, message: &str, severity: Severity);
    fn show_next(&self, next_event: &str);

    /// Response to an interactive command.
    fn show_reply(&self, text: &str);
}

/// Writes status lines to stdout.
pub struct TerminalStatus {
    color: bool,
}

impl TerminalStatus {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, severity: Severity) -> String {
        if !self.color {
            return format!("[{}] {}", severity.as_str(), text);
        }
        let code = match severity {
            Severity::Idle => "90",
            Severity::Paused => "33",
            Severity::Waiting => "32",
            Severity::Alert => "1;31",
        };
        format!("\x1b[{}m[{}]\x1b[0m {}", code, severity.as_str(), text)
    }
}

impl StatusSink for TerminalStatus {
    fn show_status(&self, message: &str, severity: Severity) {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", self.paint(message, severity)).ok();
    }

    fn show_next(&self, next_event: &str) {
        let mut out = std::io::stdout().lock();
        writeln!(out, "  Next: {}", next_event).ok();
    }

    fn show_reply(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", text).ok();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Collects everything shown.
    #[derive(Clone, Default)]
    pub struct RecordingStatus {
        pub statuses: Arc<Mutex<Vec<(String, Severity)>>>,
        pub nexts: Arc<Mutex<Vec<String>>>,
        pub replies: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingStatus {
        pub fn statuses(&self) -> Vec<(String, Severity)> {
            self.statuses.lock().unwrap().clone()
        }

        pub fn nexts(&self) -> Vec<String> {
            self.nexts.lock().unwrap().clone()
        }

        pub fn replies(&self) -> Vec<String> {
            self.replies.lock().unwrap().clone()
        }
    }

    impl StatusSink for RecordingStatus {
        fn show_status(&self, message: &str, severity: Severity) {
            self.statuses
                .lock()
                .unwrap()
                .push((message.to_string(), severity));
        }

        fn show_next(&self, next_event: &str) {
            self.nexts.lock().unwrap().push(next_event.to_string());
        }

        fn show_reply(&self, text: &str) {
            self.replies.lock().unwrap().push(text.to_string());
        }
    }

    #[test]
    fn test_plain_paint() {
        let status = TerminalStatus::new(false);
        assert_eq!(
            status.paint("Armed and waiting.", Severity::Waiting),
            "[waiting] Armed and waiting."
        );
    }

    #[test]
    fn test_color_paint_resets() {
        let status = TerminalStatus::new(true);
        let painted = status.paint("Ringing", Severity::Alert);
        assert!(painted.starts_with("\x1b[1;31m"));
        assert!(painted.contains("\x1b[0m"));
    }
}
