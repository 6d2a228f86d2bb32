//! Courier — deliver message files to a listening Unix domain socket.
//!
//! # Usage
//!
//! ```text
//! courier --socket-full-path <sock> --message-full-path <file> [--interval <secs>]
//! courier --socket-full-path <sock> --watch-folder <dir> [--settle-ms <ms>]
//! ```
//!
//! Both modes may be combined. The process stops on SIGINT or SIGTERM.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use courier_core::{RelayConfig, DEFAULT_INTERVAL_SECS, DEFAULT_SETTLE_MS};
use courier_daemon::{init_tracing, start_blocking, LogFormat};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "courier",
    version,
    about = "Deliver message files to a Unix domain socket on a timer or as they appear",
    long_about = None,
)]
struct Cli {
    /// Full path to the socket file of the listening consumer.
    #[arg(long, alias = "socketFullPath", value_name = "PATH")]
    socket_full_path: Option<PathBuf>,

    /// Full path to the message to send at intervals.
    #[arg(long, alias = "messageFullPath", value_name = "PATH")]
    message_full_path: Option<PathBuf>,

    /// Seconds between interval sends; zero or less disables interval mode.
    #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS, allow_negative_numbers = true)]
    interval: i64,

    /// Folder to watch for new messages to send.
    #[arg(long, alias = "watchFolder", value_name = "DIR")]
    watch_folder: Option<PathBuf>,

    /// Milliseconds to wait after a file appears in the watch folder before sending it.
    #[arg(long, default_value_t = DEFAULT_SETTLE_MS)]
    settle_ms: u64,

    /// Default log level when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log output format: text or json.
    #[arg(long, default_value_t = LogFormatArg::default())]
    log_format: LogFormatArg,
}

impl Cli {
    fn into_config(self) -> RelayConfig {
        RelayConfig {
            socket: self.socket_full_path,
            message: self.message_full_path,
            interval_secs: self.interval,
            watch_dir: self.watch_folder,
            settle: Duration::from_millis(self.settle_ms),
        }
    }
}

// ---------------------------------------------------------------------------
// Log format argument — parsed from CLI strings, converts to daemon type
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `LogFormat` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
struct LogFormatArg(LogFormat);

impl FromStr for LogFormatArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self(LogFormat::Text)),
            "json" => Ok(Self(LogFormat::Json)),
            other => Err(format!("unknown log format '{other}'; expected: text, json")),
        }
    }
}

impl fmt::Display for LogFormatArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        arg.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format.into());

    let plan = match cli.into_config().validate() {
        Ok(plan) => plan,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            return Err(err).context("invalid configuration");
        }
    };

    let summary = start_blocking(plan).context("relay exited with error")?;
    tracing::debug!(?summary, "relay finished");
    Ok(())
}
