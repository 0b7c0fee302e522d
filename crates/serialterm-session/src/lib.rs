//! Connection management for line-oriented serial sessions.
//!
//! A [`Session`] owns one transport connection at a time, feeds received
//! bytes through a [`serialterm_frame::LineBuffer`], and hands each complete
//! line, timestamped, to a [`DeliverySink`]. A [`DisplayPump`] on the display
//! context drains those events in order into a [`DisplaySink`].

pub mod delivery;
pub mod display;
pub mod error;
pub mod session;
pub mod state;

pub use delivery::{
    channel, DeliveryQueue, DeliverySink, DisplayEvent, DisplayPump, EventKind, Pumped,
};
pub use display::{DisplaySink, TextDisplay};
pub use error::{Result, SessionError};
pub use session::Session;
pub use state::ConnectionState;
