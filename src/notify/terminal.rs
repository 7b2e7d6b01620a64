//! Terminal bell notification.

use std::io::Write as _;

use anyhow::Result;
use async_trait::async_trait;

use super::base::NotificationSink;
use crate::schedule::types::EventName;

/// Rings the terminal bell (`BEL`) and prints a banner line.
pub struct TerminalBell {
    repeats: u32,
}

impl TerminalBell {
    pub fn new(repeats: u32) -> Self {
        Self {
            repeats: repeats.max(1),
        }
    }

    fn banner(event: EventName) -> String {
        match event {
            EventName::Open => "\u{1F514} Opening bell".to_string(),
            EventName::Close => "\u{1F514} Closing bell".to_string(),
        }
    }
}

impl Default for TerminalBell {
    fn default() -> Self {
        Self::new(3)
    }
}

#[async_trait]
impl NotificationSink for TerminalBell {
    fn name(&self) -> &str {
        "terminal"
    }

    async fn play(&self, event: EventName) -> Result<()> {
        let mut out = std::io::stdout().lock();
        write!(out, "{}", "\x07".repeat(self.repeats as usize))?;
        writeln!(out, "{}", Self::banner(event))?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeats_at_least_once() {
        assert_eq!(TerminalBell::new(0).repeats, 1);
        assert_eq!(TerminalBell::default().repeats, 3);
    }

    #[test]
    fn test_banner_names_event() {
        assert!(TerminalBell::banner(EventName::Open).contains("Opening"));
        assert!(TerminalBell::banner(EventName::Close).contains("Closing"));
    }
}
