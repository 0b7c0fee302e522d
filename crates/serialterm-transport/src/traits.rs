use crate::config::ConnectionConfig;
use crate::error::Result;

/// Callback invoked with each chunk of received bytes.
///
/// Runs on a transport-owned reader thread, in the order the bytes were
/// produced. It must not block on anything slower than a mutex.
pub type ByteHandler = Box<dyn FnMut(&[u8]) + Send + 'static>;

/// Something that can be opened with a [`ConnectionConfig`] and then feeds
/// received bytes to a [`ByteHandler`] until it is closed.
pub trait Transport: Send + Sync {
    type Handle: TransportHandle;

    /// Acquire the device and start delivering bytes to `on_bytes`.
    fn open(&self, config: &ConnectionConfig, on_bytes: ByteHandler) -> Result<Self::Handle>;

    /// Transport name for diagnostics.
    fn name(&self) -> &'static str;
}

/// An acquired transport. Owned exclusively by whoever opened it.
pub trait TransportHandle: Send {
    /// Port identifier this handle was opened on.
    fn port(&self) -> &str;

    /// Whether bytes can still arrive (the reader is running).
    fn is_open(&self) -> bool;

    /// Write bytes to the device.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Stop delivery and release the device.
    ///
    /// Once this returns the byte handler has been dropped and will not be
    /// invoked again. Calling it twice is a no-op.
    fn close(&mut self) -> Result<()>;
}
