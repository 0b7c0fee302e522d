//! Newline framing for byte streams.
//!
//! Bytes arrive in arbitrary chunks; lines come out exactly once:
//! - `\n` terminates a line
//! - a single `\r` directly before the `\n` is stripped
//! - bytes after the last terminator wait for the next chunk
//!
//! [`LineBuffer`] is the thread-safe accumulator used by sessions.
//! [`LineCodec`] (feature `async`) applies the same rules to tokio streams.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod buffer;
pub mod codec;
pub mod timestamp;

#[cfg(feature = "async")]
pub use async_codec::LineCodec;
pub use buffer::LineBuffer;
pub use codec::{next_line, Line, CARRIAGE_RETURN, LINE_FEED};
pub use timestamp::{TimestampedLine, CLOCK_FORMAT};
