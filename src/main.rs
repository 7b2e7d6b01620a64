//! market-bell - rings at the market open and close, once per day.

mod clock;
mod config;
mod control;
mod error;
mod notify;
mod schedule;
mod service;
mod status;
mod utils;

use std::io::{self, Write as _};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;

use crate::clock::SystemClock;
use crate::config::loader::{get_config_path, load_config, save_config};
use crate::config::schema::Config;
use crate::control::spawn_stdin_reader;
use crate::notify::base::NotificationSink;
use crate::notify::command::CommandSound;
use crate::notify::terminal::TerminalBell;
use crate::schedule::presets::PRESETS;
use crate::service::{shutdown_signal, AlarmService};
use crate::status::{StatusSink, TerminalStatus};

const VERSION: &str = "0.1.0";
const LOGO: &str = "\u{1F514}"; // bell emoji

#[derive(Parser)]
#[command(name = "market-bell", about = "market-bell - daily open/close alarm", version = VERSION)]
struct Cli {
    /// Config file (default: ~/.market-bell/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file.
    Init,
    /// Run the alarm in the foreground and read commands from stdin.
    Run(RunArgs),
    /// Show the configured schedule and the next bell.
    Status {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// List built-in schedule presets.
    Presets,
}

#[derive(Args, Default)]
struct RunArgs {
    /// Open bell time (HH:MM).
    #[arg(long)]
    open: Option<String>,
    /// Close bell time (HH:MM).
    #[arg(long)]
    close: Option<String>,
    /// Preset schedule; overrides --open/--close.
    #[arg(short, long)]
    preset: Option<String>,
    /// IANA time zone, e.g. America/New_York.
    #[arg(long)]
    tz: Option<String>,
    /// Pause on Saturday and Sunday.
    #[arg(long, conflicts_with = "every_day")]
    weekdays_only: bool,
    /// Ring on weekends too.
    #[arg(long)]
    every_day: bool,
    /// Start armed.
    #[arg(short, long)]
    armed: bool,
    /// Ring only during the exact configured minute.
    #[arg(long, conflicts_with = "grace")]
    exact: bool,
    /// Minutes after the configured time a missed bell may still ring.
    #[arg(long)]
    grace: Option<u32>,
    /// Shell command that plays the bell; `{event}` expands to open/close.
    #[arg(long)]
    sound_command: Option<String>,
    /// Disable colored status output.
    #[arg(long)]
    no_color: bool,
}

impl RunArgs {
    fn apply_to(&self, config: &mut Config) {
        if let Some(open) = &self.open {
            config.open = Some(open.clone());
            config.preset = None;
        }
        if let Some(close) = &self.close {
            config.close = Some(close.clone());
            config.preset = None;
        }
        if let Some(preset) = &self.preset {
            config.preset = Some(preset.clone());
        }
        if let Some(tz) = &self.tz {
            config.timezone = tz.clone();
        }
        if self.weekdays_only {
            config.weekdays_only = true;
        }
        if self.every_day {
            config.weekdays_only = false;
        }
        if self.armed {
            config.armed_on_start = true;
        }
        if self.exact {
            config.schedule.exact_minute = true;
        }
        if let Some(grace) = self.grace {
            config.schedule.exact_minute = false;
            config.schedule.grace_minutes = grace;
        }
        if let Some(cmd) = &self.sound_command {
            config.sound.command = Some(cmd.clone());
        }
        if self.no_color {
            config.display.color = false;
        }
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = cli.config;
    let result = match cli.command {
        Commands::Init => cmd_init(config_path),
        Commands::Run(args) => cmd_run(config_path, args),
        Commands::Status { json } => cmd_status(config_path, json),
        Commands::Presets => {
            cmd_presets();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Init
// ============================================================================

fn cmd_init(path: Option<PathBuf>) -> Result<()> {
    let config_path = path.unwrap_or_else(get_config_path);

    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        print!("Overwrite? [y/N] ");
        io::stdout().flush().ok();
        let mut input = String::new();
        io::stdin().read_line(&mut input).ok();
        if !input.trim().eq_ignore_ascii_case("y") {
            return Ok(());
        }
    }

    let written = save_config(&Config::default(), Some(&config_path))?;
    println!("  Created config at {}", written.display());
    println!("\n{} market-bell is ready!", LOGO);
    println!("\nNext steps:");
    println!("  1. Adjust open/close times or pick a preset in the config");
    println!("  2. Run: market-bell run --armed");
    Ok(())
}

// ============================================================================
// Run
// ============================================================================

fn cmd_run(path: Option<PathBuf>, args: RunArgs) -> Result<()> {
    let mut config = load_config(path.as_deref());
    args.apply_to(&mut config);

    let tz = config.tz()?;
    let state = config.initial_state()?;
    let clock = Arc::new(SystemClock::new(tz));

    let notifier: Arc<dyn NotificationSink> = match &config.sound.command {
        Some(cmd) => Arc::new(CommandSound::new(cmd, config.sound.timeout)),
        None => Arc::new(TerminalBell::new(config.sound.bell_repeats)),
    };
    let status: Arc<dyn StatusSink> = Arc::new(TerminalStatus::new(config.display.color));

    println!("{} market-bell ({})", LOGO, clock.display_now());
    println!("  Type `help` for commands, `arm` to start.\n");

    let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    runtime.block_on(async {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let reader = spawn_stdin_reader(control_tx, Arc::clone(&status));

        let mut service = AlarmService::new(
            state,
            clock,
            notifier,
            status,
            Duration::from_secs(config.schedule.tick_secs),
        );
        service.run(control_rx, shutdown_signal()).await;
        reader.abort();
    });
    // The stdin reader may still be parked in a blocking read.
    runtime.shutdown_timeout(Duration::from_millis(200));
    info!("Exited");
    Ok(())
}

// ============================================================================
// Status
// ============================================================================

fn cmd_status(path: Option<PathBuf>, json: bool) -> Result<()> {
    let config_path = path.clone().unwrap_or_else(get_config_path);
    let config = load_config(path.as_deref());
    let service = status_service(&config)?;
    // Next bell as it would be once armed; no alarm is running here.
    let snapshot = service.preview();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("{} market-bell Status\n", LOGO);
    println!(
        "Config: {} [{}]",
        config_path.display(),
        if config_path.exists() { "ok" } else { "defaults" }
    );
    if let Some(preset) = &config.preset {
        println!("Preset: {}", preset);
    }
    println!("{}", service.render(&snapshot));
    Ok(())
}

/// A service over the configured state that is only inspected, never run.
fn status_service(config: &Config) -> Result<AlarmService> {
    let clock = SystemClock::from_name(&config.timezone)?;
    Ok(AlarmService::new(
        config.initial_state()?,
        Arc::new(clock),
        Arc::new(TerminalBell::default()),
        Arc::new(TerminalStatus::new(false)),
        Duration::from_secs(config.schedule.tick_secs),
    ))
}

// ============================================================================
// Presets
// ============================================================================

fn cmd_presets() {
    println!("Schedule Presets\n");
    println!("{:<14} {:<7} {:<7} {}", "Name", "Open", "Close", "Description");
    println!("{}", "-".repeat(70));
    for preset in PRESETS {
        let open = preset.open().map(|t| t.to_string()).unwrap_or_else(|| "-".to_string());
        let close = preset.close().map(|t| t.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<14} {:<7} {:<7} {}",
            preset.name, open, close, preset.description
        );
    }
}
