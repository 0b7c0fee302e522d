//! Serial transport abstraction.
//!
//! Provides the pieces a session needs to talk to a byte-oriented device:
//! - Validated connection settings ([`ConnectionConfig`])
//! - The [`Transport`] / [`TransportHandle`] collaborator traits
//! - A `serialport`-backed [`SerialTransport`]
//! - A file-backed [`ReplayTransport`] for captured streams
//!
//! This is the lowest layer of serialterm. Received bytes are pushed to a
//! [`ByteHandler`] from a transport-owned reader thread.

pub mod config;
pub mod error;
mod reader;
pub mod replay;
pub mod serial;
pub mod traits;

pub use config::{
    ConnectionConfig, DataBits, Parity, PortSettings, StopBits, COMMON_BAUD_RATES,
    DEFAULT_BAUD_RATE,
};
pub use error::{ConfigError, Result, TransportError};
pub use replay::{ReplayHandle, ReplayOptions, ReplayTransport};
pub use serial::{SerialHandle, SerialOptions, SerialTransport};
pub use traits::{ByteHandler, Transport, TransportHandle};
