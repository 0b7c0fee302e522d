use serialterm_transport::SerialTransport;

use crate::cmd::watch::{watch, WatchOptions};
use crate::cmd::MonitorArgs;
use crate::exit::CliResult;
use crate::output::OutputFormat;

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let settings = args.line.settings(&args.port);
    tracing::info!(port = %args.port, baud = %args.line.baud, "monitoring");

    watch(
        SerialTransport::new(),
        &settings,
        WatchOptions {
            count: args.count,
            send: args.send.as_deref(),
            end_is_error: true,
        },
        format,
    )
}
