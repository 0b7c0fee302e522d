use std::io::{ErrorKind, Read};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::error::{Result, TransportError};
use crate::traits::ByteHandler;

/// Background thread that pumps a `Read` source into a [`ByteHandler`].
///
/// Read failures and handler panics are logged and swallowed here: a broken
/// ingestion path ends the reader, it never takes the owning process down.
pub(crate) struct ReaderThread {
    port: String,
    stop: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ReaderConfig {
    pub chunk_size: usize,
    /// Pause after each delivered chunk.
    pub pacing: Option<Duration>,
}

impl ReaderThread {
    pub(crate) fn spawn<R>(
        port: &str,
        mut source: R,
        config: ReaderConfig,
        mut handler: ByteHandler,
    ) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let alive = Arc::new(AtomicBool::new(true));

        let thread_stop = Arc::clone(&stop);
        let thread_alive = Arc::clone(&alive);
        let thread_port = port.to_string();
        let chunk_size = config.chunk_size.max(1);

        let join = std::thread::Builder::new()
            .name(format!("serialterm-rx {port}"))
            .spawn(move || {
                let mut chunk = vec![0u8; chunk_size];
                while !thread_stop.load(Ordering::SeqCst) {
                    let read = match source.read(&mut chunk) {
                        Ok(0) => {
                            debug!(port = %thread_port, "end of stream");
                            break;
                        }
                        Ok(n) => n,
                        Err(err)
                            if matches!(
                                err.kind(),
                                ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                            ) =>
                        {
                            continue
                        }
                        Err(err) => {
                            warn!(port = %thread_port, error = %err, "read failed; stopping reader");
                            break;
                        }
                    };

                    // A late chunk racing close() is dropped.
                    if thread_stop.load(Ordering::SeqCst) {
                        trace!(port = %thread_port, bytes = read, "dropping chunk after close");
                        break;
                    }

                    if catch_unwind(AssertUnwindSafe(|| handler(&chunk[..read]))).is_err() {
                        warn!(port = %thread_port, "byte handler panicked; chunk discarded");
                    }

                    if let Some(delay) = config.pacing {
                        std::thread::sleep(delay);
                    }
                }
                thread_alive.store(false, Ordering::SeqCst);
            })
            .map_err(|err| TransportError::from_io(port, err))?;

        debug!(port, "reader started");
        Ok(Self {
            port: port.to_string(),
            stop,
            alive,
            join: Some(join),
        })
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.join.is_some() && self.alive.load(Ordering::SeqCst)
    }

    /// Signal the thread and wait for it. Returns once the handler is dropped.
    pub(crate) fn stop(&mut self) -> Result<()> {
        self.stop.store(true, Ordering::SeqCst);
        let Some(join) = self.join.take() else {
            return Ok(());
        };
        join.join().map_err(|_| TransportError::Unknown {
            port: self.port.clone(),
            message: "reader thread panicked".to_string(),
        })?;
        debug!(port = %self.port, "reader stopped");
        Ok(())
    }
}

impl Drop for ReaderThread {
    fn drop(&mut self) {
        if self.join.is_some() {
            if let Err(err) = self.stop() {
                warn!(port = %self.port, error = %err, "reader shutdown failed");
            }
        }
    }
}
