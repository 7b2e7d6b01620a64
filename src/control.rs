//! Interactive control commands read from stdin.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::BellError;
use crate::schedule::types::EventName;
use crate::status::StatusSink;

pub const HELP: &str = "\
Commands:
  arm                      start ringing at the configured times
  disarm                   stop ringing
  open <HH:MM|off>         set or clear the open bell (disarmed only)
  close <HH:MM|off>        set or clear the close bell (disarmed only)
  preset <name>            load a preset schedule (disarmed only)
  weekdays <on|off>        pause on Saturday and Sunday
  status                   show the current state
  help                     show this help
  quit                     exit";

/// A single control request for the alarm service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Arm,
    Disarm,
    /// Raw `HH:MM` text; malformed text leaves the slot unconfigured.
    SetTime(EventName, String),
    ClearTime(EventName),
    Preset(String),
    WeekdaysOnly(bool),
    Status,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Control>, BellError> {
    let mut parts = line.split_whitespace();
    let Some(keyword) = parts.next() else {
        return Ok(None);
    };
    let keyword = keyword.to_ascii_lowercase();
    let arg = parts.next();

    let control = match keyword.as_str() {
        "arm" => Control::Arm,
        "disarm" => Control::Disarm,
        "open" | "close" => {
            let name = EventName::from_name(&keyword)
                .ok_or_else(|| BellError::UnknownCommand(keyword.clone()))?;
            match arg {
                None => return Err(missing(&keyword, "expected HH:MM or 'off'")),
                Some(a) if a.eq_ignore_ascii_case("off") => Control::ClearTime(name),
                Some(a) => Control::SetTime(name, a.to_string()),
            }
        }
        "preset" => match arg {
            Some(a) => Control::Preset(a.to_string()),
            None => return Err(missing(&keyword, "expected a preset name")),
        },
        "weekdays" => match arg.map(|a| a.to_ascii_lowercase()).as_deref() {
            Some("on") | Some("true") | Some("yes") => Control::WeekdaysOnly(true),
            Some("off") | Some("false") | Some("no") => Control::WeekdaysOnly(false),
            _ => return Err(missing(&keyword, "expected 'on' or 'off'")),
        },
        "status" => Control::Status,
        "help" | "?" => Control::Help,
        "quit" | "exit" => Control::Quit,
        _ => return Err(BellError::UnknownCommand(keyword)),
    };
    Ok(Some(control))
}

/// Forward parsed stdin lines to the alarm service until EOF or `quit`.
///
/// Parse errors are reported through `status` and never reach the service.
pub fn spawn_stdin_reader(
    tx: UnboundedSender<Control>,
    status: Arc<dyn StatusSink>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("stdin closed; no more control commands");
                    break;
                }
                Err(e) => {
                    status.show_reply(&format!("Error reading input: {}", e));
                    break;
                }
            };
            match parse_line(&line) {
                Ok(Some(control)) => {
                    let quit = control == Control::Quit;
                    if tx.send(control).is_err() || quit {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => status.show_reply(&format!("Error: {}", e)),
            }
        }
    })
}

fn missing(command: &str, reason: &str) -> BellError {
    BellError::InvalidArgument {
        command: command.to_string(),
        reason: reason.to_string(),
    }
}
