use std::io::Write;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::{ConnectionConfig, DataBits, Parity, StopBits};
use crate::error::{Result, TransportError};
use crate::reader::{ReaderConfig, ReaderThread};
use crate::traits::{ByteHandler, Transport, TransportHandle};

/// Tunables for [`SerialTransport`].
#[derive(Debug, Clone)]
pub struct SerialOptions {
    /// Port timeout, applied once at open. Bounds a single read (and so how
    /// long close() waits for the reader thread) as well as a single write.
    /// The reader and writer share one OS handle on some platforms, so it is
    /// never changed afterwards.
    pub timeout: Duration,
    /// Maximum bytes handed to the callback per read.
    pub chunk_size: usize,
}

impl Default for SerialOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(100),
            chunk_size: 1024,
        }
    }
}

/// Serial port transport backed by the `serialport` crate.
#[derive(Debug, Clone, Default)]
pub struct SerialTransport {
    options: SerialOptions,
}

impl SerialTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SerialOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SerialOptions {
        &self.options
    }
}

impl Transport for SerialTransport {
    type Handle = SerialHandle;

    fn open(&self, config: &ConnectionConfig, on_bytes: ByteHandler) -> Result<SerialHandle> {
        let port_name = config.port();
        let parity = to_serialport_parity(port_name, config.parity())?;
        let stop_bits = to_serialport_stop_bits(port_name, config.stop_bits())?;

        let port = serialport::new(port_name, config.baud_rate())
            .data_bits(to_serialport_data_bits(config.data_bits()))
            .parity(parity)
            .stop_bits(stop_bits)
            .timeout(self.options.timeout)
            .open()
            .map_err(|err| map_serial_error(port_name, err))?;

        let reader_port = port
            .try_clone()
            .map_err(|err| map_serial_error(port_name, err))?;

        let reader = ReaderThread::spawn(
            port_name,
            reader_port,
            ReaderConfig {
                chunk_size: self.options.chunk_size,
                pacing: None,
            },
            on_bytes,
        )?;

        info!(%config, "serial port opened");
        Ok(SerialHandle {
            port_name: port_name.to_string(),
            port: Some(port),
            reader,
        })
    }

    fn name(&self) -> &'static str {
        "serial"
    }
}

/// An open serial port plus its reader thread.
pub struct SerialHandle {
    port_name: String,
    port: Option<Box<dyn serialport::SerialPort>>,
    reader: ReaderThread,
}

impl TransportHandle for SerialHandle {
    fn port(&self) -> &str {
        &self.port_name
    }

    fn is_open(&self) -> bool {
        self.port.is_some() && self.reader.is_alive()
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(TransportError::Closed)?;
        write_flushed(&self.port_name, port, data)
    }

    fn close(&mut self) -> Result<()> {
        // Stop the reader first so no chunk is delivered after close returns.
        let stopped = self.reader.stop();
        if self.port.take().is_some() {
            debug!(port = %self.port_name, "serial port released");
        }
        stopped
    }
}

impl std::fmt::Debug for SerialHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialHandle")
            .field("port", &self.port_name)
            .field("open", &self.port.is_some())
            .finish()
    }
}

fn write_flushed<W: Write + ?Sized>(port_name: &str, port: &mut W, data: &[u8]) -> Result<()> {
    port.write_all(data)
        .and_then(|()| port.flush())
        .map_err(|err| TransportError::from_io(port_name, err))
}

/// Map a driver error onto the transport taxonomy.
pub fn map_serial_error(port: &str, err: serialport::Error) -> TransportError {
    match err.kind() {
        serialport::ErrorKind::NoDevice => TransportError::Io {
            port: port.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, err.description),
        },
        serialport::ErrorKind::InvalidInput => TransportError::InvalidParameters {
            port: port.to_string(),
            message: err.description,
        },
        serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
            TransportError::PermissionDenied {
                port: port.to_string(),
                message: err.description,
            }
        }
        serialport::ErrorKind::Io(kind) => TransportError::Io {
            port: port.to_string(),
            source: std::io::Error::new(kind, err.description),
        },
        serialport::ErrorKind::Unknown => TransportError::Unknown {
            port: port.to_string(),
            message: err.description,
        },
    }
}

fn to_serialport_data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Five => serialport::DataBits::Five,
        DataBits::Six => serialport::DataBits::Six,
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn to_serialport_parity(port: &str, parity: Parity) -> Result<serialport::Parity> {
    match parity {
        Parity::None => Ok(serialport::Parity::None),
        Parity::Odd => Ok(serialport::Parity::Odd),
        Parity::Even => Ok(serialport::Parity::Even),
        Parity::Mark | Parity::Space => Err(TransportError::InvalidParameters {
            port: port.to_string(),
            message: format!("{parity} parity is not supported by this driver"),
        }),
    }
}

fn to_serialport_stop_bits(port: &str, stop_bits: StopBits) -> Result<serialport::StopBits> {
    match stop_bits {
        StopBits::One => Ok(serialport::StopBits::One),
        StopBits::Two => Ok(serialport::StopBits::Two),
        StopBits::OnePointFive => Err(TransportError::InvalidParameters {
            port: port.to_string(),
            message: "1.5 stop bits are not supported by this driver".to_string(),
        }),
    }
}
