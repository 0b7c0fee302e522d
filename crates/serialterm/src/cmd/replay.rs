use std::time::Duration;

use serialterm_transport::{PortSettings, ReplayOptions, ReplayTransport};

use crate::cmd::watch::{watch, WatchOptions};
use crate::cmd::ReplayArgs;
use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub fn run(args: ReplayArgs, format: OutputFormat) -> CliResult<i32> {
    if args.chunk_size == 0 {
        return Err(CliError::new(USAGE, "--chunk-size must be at least 1"));
    }

    let transport = ReplayTransport::with_options(ReplayOptions {
        chunk_size: args.chunk_size,
        delay: (args.delay_ms > 0).then(|| Duration::from_millis(args.delay_ms)),
    });
    let settings = PortSettings::new(args.file.to_string_lossy());

    watch(
        transport,
        &settings,
        WatchOptions {
            count: args.count,
            send: None,
            end_is_error: false,
        },
        format,
    )
}
