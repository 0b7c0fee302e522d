use std::io::{IsTerminal, Stdout, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serialterm_session::{DisplayEvent, DisplaySink, EventKind};
use serialterm_transport::ConnectionConfig;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct LineOutput<'a> {
    kind: &'static str,
    time: String,
    timestamp: String,
    text: &'a str,
}

impl<'a> LineOutput<'a> {
    fn new(event: &DisplayEvent, text: &'a str) -> Self {
        let line = event.line();
        Self {
            kind: match event.kind() {
                EventKind::Received => "received",
                EventKind::Status => "status",
            },
            time: line.clock(),
            timestamp: line.captured_at().to_rfc3339(),
            text,
        }
    }
}

/// Display backed by the process stdout.
///
/// `pretty` and `table` print the `[HH:MM:SS] text` rendering; `json` prints
/// one object per line. Once a write fails (closed pipe) the display counts
/// as torn down.
pub struct StdoutDisplay {
    format: OutputFormat,
    out: Stdout,
    torn_down: bool,
}

impl StdoutDisplay {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            out: std::io::stdout(),
            torn_down: false,
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        if self.torn_down {
            return;
        }
        if let Err(err) = self.out.write_all(bytes) {
            tracing::debug!(error = %err, "stdout closed");
            self.torn_down = true;
        }
    }
}

impl DisplaySink for StdoutDisplay {
    fn append_text(&mut self, text: &str) {
        self.write(text.as_bytes());
    }

    fn scroll_to_end(&mut self) {
        if !self.torn_down && self.out.flush().is_err() {
            self.torn_down = true;
        }
    }

    fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn present(&mut self, event: &DisplayEvent) {
        match self.format {
            OutputFormat::Json => {
                let text = event.line().line().text();
                let mut json = serde_json::to_string(&LineOutput::new(event, &text))
                    .unwrap_or_else(|_| "{}".to_string());
                json.push('\n');
                self.write(json.as_bytes());
            }
            OutputFormat::Table | OutputFormat::Pretty => {
                self.write(event.render().as_bytes());
            }
        }
        self.scroll_to_end();
    }
}

#[derive(Serialize)]
struct ConfigOutput<'a> {
    port: &'a str,
    baud_rate: u32,
    data_bits: u8,
    parity: &'static str,
    stop_bits: &'static str,
    frame: String,
}

pub fn print_config(config: &ConnectionConfig, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ConfigOutput {
                port: config.port(),
                baud_rate: config.baud_rate(),
                data_bits: config.data_bits().as_u8(),
                parity: config.parity().name(),
                stop_bits: config.stop_bits().name(),
                frame: config.frame_summary(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "BAUD", "DATA BITS", "PARITY", "STOP BITS"])
                .add_row(vec![
                    config.port().to_string(),
                    config.baud_rate().to_string(),
                    config.data_bits().to_string(),
                    config.parity().name().to_string(),
                    config.stop_bits().name().to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{config}"),
    }
}
