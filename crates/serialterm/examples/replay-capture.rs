//! Replays a capture file through a session and prints what a display sees.
//!
//! Run with:
//!   cargo run --example replay-capture -- path/to/capture.log

use std::time::Duration;

use serialterm::session::{channel, DisplayPump, Session, TextDisplay};
use serialterm::transport::{PortSettings, ReplayOptions, ReplayTransport};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: replay-capture <FILE>")?;

    let (sink, rx) = channel();
    let session = Session::new(
        ReplayTransport::with_options(ReplayOptions {
            chunk_size: 7,
            delay: Some(Duration::from_millis(1)),
        }),
        sink,
    );
    session.open(&PortSettings::new(path))?;

    while session.is_transport_open() {
        std::thread::sleep(Duration::from_millis(10));
    }
    session.shutdown()?;
    drop(session);

    let mut pump = DisplayPump::new(rx, TextDisplay::new());
    pump.run();
    print!("{}", pump.display().text());
    Ok(())
}
