/// Errors raised while acquiring, using, or releasing a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The port exists but this process may not open it (or it is held elsewhere).
    #[error("permission denied opening {port}: {message}")]
    PermissionDenied { port: String, message: String },

    /// The device rejected the requested line settings.
    #[error("invalid parameters for {port}: {message}")]
    InvalidParameters { port: String, message: String },

    /// An I/O error occurred while talking to the device.
    #[error("I/O failure on {port}: {source}")]
    Io {
        port: String,
        source: std::io::Error,
    },

    /// Anything the underlying driver could not classify.
    #[error("transport failure on {port}: {message}")]
    Unknown { port: String, message: String },

    /// The transport has already been released.
    #[error("transport closed")]
    Closed,
}

impl TransportError {
    /// Classify a plain I/O error raised for `port`.
    pub fn from_io(port: impl Into<String>, err: std::io::Error) -> Self {
        let port = port.into();
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                port,
                message: err.to_string(),
            },
            std::io::ErrorKind::InvalidInput => Self::InvalidParameters {
                port,
                message: err.to_string(),
            },
            _ => Self::Io { port, source: err },
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors raised while validating connection settings.
///
/// These are always produced before any transport resource is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("no port selected")]
    MissingPort,

    #[error("invalid baud rate '{0}' (expected a positive integer)")]
    InvalidBaudRate(String),

    #[error("invalid data bits '{0}' (expected 5, 6, 7 or 8)")]
    InvalidDataBits(String),

    #[error("invalid parity '{0}' (expected none, odd, even, mark or space)")]
    InvalidParity(String),

    #[error("invalid stop bits '{0}' (expected 1, 1.5 or 2)")]
    InvalidStopBits(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_permission_denied_is_classified() {
        let err = TransportError::from_io(
            "/dev/ttyS0",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, TransportError::PermissionDenied { ref port, .. } if port == "/dev/ttyS0"));
    }

    #[test]
    fn io_other_stays_io() {
        let err = TransportError::from_io("COM3", std::io::Error::other("device unplugged"));
        assert!(matches!(err, TransportError::Io { .. }));
        assert_eq!(err.to_string(), "I/O failure on COM3: device unplugged");
    }
}
