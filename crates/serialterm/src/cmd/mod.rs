use clap::{Args, Subcommand};
use std::path::PathBuf;

use serialterm_transport::PortSettings;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod config;
pub mod monitor;
pub mod replay;
pub mod version;
mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a serial port and print received lines with timestamps.
    Monitor(MonitorArgs),
    /// Feed a captured byte file through the line framer.
    Replay(ReplayArgs),
    /// Validate connection settings and print the resulting config.
    Config(ConfigArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Monitor(args) => monitor::run(args, format),
        Command::Replay(args) => replay::run(args, format),
        Command::Config(args) => config::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Line settings shared by every command that opens a port.
///
/// Values stay raw strings here; validation happens in the session so that
/// the CLI and library reject the same inputs with the same errors.
#[derive(Args, Debug, Clone)]
pub struct LineArgs {
    /// Baud rate.
    #[arg(long, short = 'b', env = "SERIALTERM_BAUD", default_value = "9600")]
    pub baud: String,
    /// Data bits (5-8).
    #[arg(long, env = "SERIALTERM_DATA_BITS", default_value = "8")]
    pub data_bits: String,
    /// Parity: none, odd, even, mark or space.
    #[arg(long, env = "SERIALTERM_PARITY", default_value = "none")]
    pub parity: String,
    /// Stop bits: 1, 1.5 or 2.
    #[arg(long, env = "SERIALTERM_STOP_BITS", default_value = "1")]
    pub stop_bits: String,
}

impl LineArgs {
    pub fn settings(&self, port: impl Into<String>) -> PortSettings {
        PortSettings {
            port: port.into(),
            baud_rate: self.baud.clone(),
            data_bits: self.data_bits.clone(),
            parity: self.parity.clone(),
            stop_bits: self.stop_bits.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Serial device (e.g. /dev/ttyUSB0, COM3).
    pub port: String,
    #[command(flatten)]
    pub line: LineArgs,
    /// Text to send once the port is open. A line feed is appended.
    #[arg(long, value_name = "TEXT")]
    pub send: Option<String>,
    /// Exit after receiving N lines.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Captured byte stream to replay.
    pub file: PathBuf,
    /// Bytes delivered per chunk.
    #[arg(long, default_value = "64")]
    pub chunk_size: usize,
    /// Pause between chunks, in milliseconds.
    #[arg(long, default_value = "0")]
    pub delay_ms: u64,
    /// Exit after receiving N lines.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Serial device the settings are for.
    pub port: String,
    #[command(flatten)]
    pub line: LineArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
