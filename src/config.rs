//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::{engine::ReconcileMode, state::TimeSpec};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "countdown-timer")]
#[command(about = "A no-nonsense countdown timer with an HTTP control surface")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Initial hours on the countdown
    #[arg(long, default_value = "0")]
    pub hours: u64,

    /// Initial minutes on the countdown
    #[arg(long, default_value = "0")]
    pub minutes: u64,

    /// Initial seconds on the countdown
    #[arg(long, default_value = "0")]
    pub seconds: u64,

    /// Clock mechanism: a pushing interval worker or a polling frame loop
    #[arg(long, value_enum, default_value = "push")]
    pub mode: ReconcileMode,

    /// Interval between pushed timestamps in milliseconds
    #[arg(long, default_value = "100")]
    pub tick_ms: u64,

    /// Frame length of the polling loop in milliseconds
    #[arg(long, default_value = "16")]
    pub frame_ms: u64,

    /// Start counting down immediately if the initial time is valid
    #[arg(long)]
    pub autostart: bool,

    /// Do not print the countdown to the console
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Time spec given on the command line
    pub fn initial_time_spec(&self) -> TimeSpec {
        TimeSpec::new(self.hours, self.minutes, self.seconds)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }
}
