use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serialterm_frame::LineBuffer;
use serialterm_transport::{
    ByteHandler, ConnectionConfig, PortSettings, Transport, TransportHandle,
};
use tracing::{debug, info, warn};

use crate::delivery::DeliverySink;
use crate::error::{Result, SessionError};
use crate::state::ConnectionState;

/// Owns one transport connection at a time and the line buffer fed by it.
///
/// `open` and `close` may be called from any thread, concurrently with byte
/// delivery on the transport's reader thread. Received lines go to the
/// [`DeliverySink`] the session was built with.
pub struct Session<T: Transport> {
    transport: T,
    buffer: Arc<LineBuffer>,
    sink: DeliverySink,
    inner: Mutex<Inner<T::Handle>>,
    shut_down: AtomicBool,
}

struct Inner<H> {
    state: ConnectionState,
    handle: Option<H>,
    config: Option<ConnectionConfig>,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, sink: DeliverySink) -> Self {
        Self {
            transport,
            buffer: Arc::new(LineBuffer::new()),
            sink,
            inner: Mutex::new(Inner {
                state: ConnectionState::Disconnected,
                handle: None,
                config: None,
            }),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.lock().state
    }

    /// Config of the open connection, if any.
    pub fn config(&self) -> Option<ConnectionConfig> {
        self.lock().config.clone()
    }

    /// Whether the transport is still delivering bytes. A connected session
    /// whose device went away reports `false` here until it is closed.
    pub fn is_transport_open(&self) -> bool {
        self.lock()
            .handle
            .as_ref()
            .is_some_and(TransportHandle::is_open)
    }

    /// Bytes received since the last complete line.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.pending_len()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Validate `settings` and open the transport.
    ///
    /// Fails with [`SessionError::Config`] before any transport call when the
    /// settings are invalid. On any failure the session stays disconnected.
    pub fn open(&self, settings: &PortSettings) -> Result<()> {
        let inner = self.lock_for_open()?;
        let config = settings.validate()?;
        self.open_locked(inner, config)
    }

    /// Open with an already validated config.
    pub fn open_config(&self, config: ConnectionConfig) -> Result<()> {
        let inner = self.lock_for_open()?;
        self.open_locked(inner, config)
    }

    /// Release the transport and drop any partial line.
    ///
    /// Always leaves the session disconnected. A failure to release the
    /// transport is reported as [`SessionError::Close`] after the transition.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.lock();
        let Some(mut handle) = inner.handle.take() else {
            inner.state = ConnectionState::Disconnected;
            return Ok(());
        };

        let port = handle.port().to_string();
        // Joins the reader: no chunk can be appended after this point.
        let released = handle.close();
        drop(handle);

        let discarded = self.buffer.reset();
        inner.state = ConnectionState::Disconnected;
        inner.config = None;
        // Posted under the lock so a following open's notice queues after it.
        self.sink.notice(format!("closed {port}"));
        drop(inner);

        if discarded > 0 {
            debug!(port = %port, discarded, "dropped unterminated line on close");
        }

        match released {
            Ok(()) => {
                info!(port = %port, "connection closed");
                Ok(())
            }
            Err(source) => {
                warn!(port = %port, error = %source, "transport release failed");
                Err(SessionError::Close { port, source })
            }
        }
    }

    /// Send bytes to the device.
    pub fn write(&self, data: &[u8]) -> Result<()> {
        let mut inner = self.lock();
        if !inner.state.is_connected() {
            return Err(SessionError::NotConnected);
        }
        let handle = inner.handle.as_mut().ok_or(SessionError::NotConnected)?;
        handle.write(data)?;
        Ok(())
    }

    /// Shutdown hook for the owning shell.
    ///
    /// Closes the connection exactly once; later calls return `Ok(())` and
    /// later `open` calls fail with [`SessionError::ShutDown`]. Also run on drop.
    pub fn shutdown(&self) -> Result<()> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!("session shutdown");
        self.close()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    fn lock_for_open(&self) -> Result<MutexGuard<'_, Inner<T::Handle>>> {
        let inner = self.lock();
        // Checked under the lock: a shutdown either sees this open's handle
        // when its close takes the lock, or this check sees the flag.
        if self.is_shut_down() {
            return Err(SessionError::ShutDown);
        }
        if inner.state.is_connected() {
            let port = inner
                .config
                .as_ref()
                .map(|config| config.port().to_string())
                .unwrap_or_default();
            return Err(SessionError::AlreadyConnected(port));
        }
        Ok(inner)
    }

    fn open_locked(
        &self,
        mut inner: MutexGuard<'_, Inner<T::Handle>>,
        config: ConnectionConfig,
    ) -> Result<()> {
        // No residue from a previous session may prefix the first line.
        self.buffer.reset();

        let notice = Arc::new(OpenNotice::new(format!("opened {config}")));
        let buffer = Arc::clone(&self.buffer);
        let sink = self.sink.clone();
        let reader_notice = Arc::clone(&notice);
        let on_bytes: ByteHandler = Box::new(move |chunk| {
            // The reader may start before open() returns.
            reader_notice.post(&sink);
            for line in buffer.append(chunk) {
                sink.deliver(line);
            }
        });

        let handle = match self.transport.open(&config, on_bytes) {
            Ok(handle) => handle,
            Err(err) => {
                warn!(port = config.port(), error = %err, "open failed");
                return Err(err.into());
            }
        };

        inner.state = ConnectionState::Connected;
        inner.handle = Some(handle);
        inner.config = Some(config.clone());
        notice.post(&self.sink);
        drop(inner);

        info!(%config, transport = self.transport.name(), "connection opened");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T::Handle>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The "opened" notice, posted by whichever comes first: the reader with
/// its first chunk or `open` once the transport is up. Posting happens under
/// the lock, so nothing the reader delivers can overtake it.
struct OpenNotice {
    text: Mutex<Option<String>>,
}

impl OpenNotice {
    fn new(text: String) -> Self {
        Self {
            text: Mutex::new(Some(text)),
        }
    }

    fn post(&self, sink: &DeliverySink) {
        let mut pending = self.text.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(text) = pending.take() {
            sink.notice(text);
        }
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "close during drop failed");
        }
    }
}

impl<T: Transport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("Session")
            .field("transport", &self.transport.name())
            .field("state", &inner.state)
            .field("config", &inner.config)
            .field("pending", &self.buffer.pending_len())
            .finish()
    }
}
