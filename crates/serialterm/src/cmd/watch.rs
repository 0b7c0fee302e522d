use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serialterm_session::{channel, DisplayPump, DisplaySink, EventKind, Pumped, Session};
use serialterm_transport::{PortSettings, Transport};
use tracing::{debug, warn};

use crate::exit::{session_error, CliError, CliResult, INTERNAL, SUCCESS, TRANSPORT_ERROR};
use crate::output::{OutputFormat, StdoutDisplay};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct WatchOptions<'a> {
    pub count: Option<usize>,
    pub send: Option<&'a str>,
    /// Whether the transport going quiet on its own is a failure (a device
    /// vanishing) or the normal end (a replay reaching EOF).
    pub end_is_error: bool,
}

/// Open a session on `transport` and print lines until interrupted, the
/// line limit is hit, or the transport stops delivering.
pub fn watch<T: Transport>(
    transport: T,
    settings: &PortSettings,
    options: WatchOptions<'_>,
    format: OutputFormat,
) -> CliResult<i32> {
    let (sink, rx) = channel();
    let session = Session::new(transport, sink);
    let mut pump = DisplayPump::new(rx, StdoutDisplay::new(format));

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)).map_err(|err| {
            CliError::new(INTERNAL, format!("failed to install Ctrl-C handler: {err}"))
        })?;
    }

    session
        .open(settings)
        .map_err(|err| session_error("open failed", err))?;

    if let Some(text) = options.send {
        let mut payload = text.as_bytes().to_vec();
        payload.push(b'\n');
        session
            .write(&payload)
            .map_err(|err| session_error("send failed", err))?;
    }

    let mut received = 0usize;
    let mut limit_reached = false;
    let mut went_quiet = false;

    while running.load(Ordering::SeqCst) {
        match pump.pump_one(POLL_INTERVAL) {
            Pumped::Presented(EventKind::Received) => {
                received += 1;
                if options.count.is_some_and(|count| received >= count) {
                    limit_reached = true;
                    break;
                }
            }
            Pumped::Idle if !session.is_transport_open() => {
                debug!(received, "transport stopped delivering");
                went_quiet = true;
                break;
            }
            Pumped::Closed => break,
            _ => {}
        }
        if pump.display().is_torn_down() {
            debug!("output closed; stopping");
            break;
        }
    }

    let closed = session.shutdown();
    drop(session);
    if !limit_reached {
        pump.run();
    }
    if let Err(err) = closed {
        warn!(error = %err, "close failed");
        return Err(session_error("close failed", err));
    }

    if went_quiet && options.end_is_error {
        return Err(CliError::new(
            TRANSPORT_ERROR,
            format!("{} stopped delivering data", settings.port),
        ));
    }
    Ok(SUCCESS)
}
