use std::fmt;
use std::io;

use serialterm_session::SessionError;
use serialterm_transport::{ConfigError, TransportError};

// Exit codes follow the sysexits-style layout used across our CLIs.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn config_error(context: &str, err: ConfigError) -> CliError {
    CliError::new(USAGE, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io { source, port } => io_error(&format!("{context} ({port})"), source),
        TransportError::PermissionDenied { .. } => {
            CliError::new(PERMISSION_DENIED, format!("{context}: {err}"))
        }
        TransportError::InvalidParameters { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        TransportError::Closed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Config(err) => config_error(context, err),
        SessionError::Transport(err) => transport_error(context, err),
        SessionError::Close { .. } => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
        SessionError::AlreadyConnected(_) | SessionError::NotConnected => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_settings_are_usage_errors() {
        let err = session_error(
            "open failed",
            SessionError::Config(ConfigError::InvalidBaudRate("fast".to_string())),
        );
        assert_eq!(err.code, USAGE);
        assert!(err.message.contains("fast"));
    }

    #[test]
    fn permission_denied_keeps_its_code() {
        let err = session_error(
            "open failed",
            SessionError::Transport(TransportError::PermissionDenied {
                port: "/dev/ttyS0".to_string(),
                message: "busy".to_string(),
            }),
        );
        assert_eq!(err.code, PERMISSION_DENIED);
    }

    #[test]
    fn missing_device_is_a_transport_error() {
        let err = transport_error(
            "open failed",
            TransportError::Io {
                port: "/dev/ttyUSB9".to_string(),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(err.message.contains("/dev/ttyUSB9"));
    }
}
