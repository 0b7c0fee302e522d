use std::fs::File;
use std::time::Duration;

use tracing::info;

use crate::config::ConnectionConfig;
use crate::error::{Result, TransportError};
use crate::reader::{ReaderConfig, ReaderThread};
use crate::traits::{ByteHandler, Transport, TransportHandle};

/// Tunables for [`ReplayTransport`].
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Bytes per delivered chunk. Small values exercise line reassembly.
    pub chunk_size: usize,
    /// Pause between chunks, to mimic a slow line.
    pub delay: Option<Duration>,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            chunk_size: 64,
            delay: None,
        }
    }
}

/// Plays a captured byte stream from a file as if it arrived on a port.
///
/// The connection's port identifier is the file path. Line settings are
/// accepted and ignored. Writes are discarded.
#[derive(Debug, Clone, Default)]
pub struct ReplayTransport {
    options: ReplayOptions,
}

impl ReplayTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ReplayOptions) -> Self {
        Self { options }
    }
}

impl Transport for ReplayTransport {
    type Handle = ReplayHandle;

    fn open(&self, config: &ConnectionConfig, on_bytes: ByteHandler) -> Result<ReplayHandle> {
        let path = config.port();
        let file = File::open(path).map_err(|err| TransportError::from_io(path, err))?;
        let reader = ReaderThread::spawn(
            path,
            file,
            ReaderConfig {
                chunk_size: self.options.chunk_size,
                pacing: self.options.delay,
            },
            on_bytes,
        )?;

        info!(path, chunk_size = self.options.chunk_size, "replay started");
        Ok(ReplayHandle {
            path: path.to_string(),
            reader,
            closed: false,
        })
    }

    fn name(&self) -> &'static str {
        "replay"
    }
}

/// A replay in progress.
pub struct ReplayHandle {
    path: String,
    reader: ReaderThread,
    closed: bool,
}

impl TransportHandle for ReplayHandle {
    fn port(&self) -> &str {
        &self.path
    }

    /// False once the whole file has been delivered.
    fn is_open(&self) -> bool {
        !self.closed && self.reader.is_alive()
    }

    fn write(&mut self, _data: &[u8]) -> Result<()> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.reader.stop()
    }
}

impl std::fmt::Debug for ReplayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayHandle")
            .field("path", &self.path)
            .field("closed", &self.closed)
            .finish()
    }
}
