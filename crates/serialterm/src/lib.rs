//! Timestamped line monitor for serial ports.
//!
//! serialterm opens a serial port, reassembles the incoming byte stream into
//! newline-delimited lines, and hands each line to a display with the time it
//! was received.
//!
//! # Crate Structure
//!
//! - [`transport`]: Connection settings and the serial/replay transports
//! - [`frame`]: Line framing and the thread-safe line buffer
//! - [`session`]: Connection state machine and display delivery (behind `session` feature)

/// Re-export transport types.
pub mod transport {
    pub use serialterm_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use serialterm_frame::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use serialterm_session::*;
}
