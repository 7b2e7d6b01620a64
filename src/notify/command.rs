//! Plays a sound by running an external command.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::base::NotificationSink;
use crate::schedule::types::EventName;

/// Runs a shell command such as `paplay /usr/share/sounds/bell.oga`.
///
/// The placeholder `{event}` in the command is replaced with `open` or
/// `close`, and `MARKET_BELL_EVENT` is set in the child environment.
pub struct CommandSound {
    command: String,
    timeout: u64,
}

impl CommandSound {
    pub fn new(command: &str, timeout: u64) -> Self {
        Self {
            command: command.to_string(),
            timeout: timeout.max(1),
        }
    }

    fn render(&self, event: EventName) -> String {
        self.command.replace("{event}", event.as_str())
    }
}

#[async_trait]
impl NotificationSink for CommandSound {
    fn name(&self) -> &str {
        "command"
    }

    async fn play(&self, event: EventName) -> Result<()> {
        let command = self.render(event);
        debug!("Running sound command: {}", command);

        let result = tokio::time::timeout(Duration::from_secs(self.timeout), async {
            Command::new("sh")
                .arg("-c")
                .arg(&command)
                .env("MARKET_BELL_EVENT", event.as_str())
                .kill_on_drop(true)
                .output()
                .await
        })
        .await;

        let output = match result {
            Ok(output) => output?,
            Err(_) => bail!("sound command timed out after {} seconds", self.timeout),
        };

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("sound command exited with {}: {}", code, stderr.trim());
        }
        Ok(())
    }
}
