//! Ordered hand-off of lines from reader threads to the display context.
//!
//! Producers ([`DeliverySink`]) never block and never wait for the display.
//! The single consumer ([`DisplayPump`]) runs wherever the display may be
//! mutated and presents events in exactly the order they were submitted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use serialterm_frame::{Line, TimestampedLine};
use tracing::trace;

use crate::display::DisplaySink;

/// Where an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A line received from the device.
    Received,
    /// A session notice (port opened, port closed).
    Status,
}

/// One entry headed for the display.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    Received(TimestampedLine),
    Status(TimestampedLine),
}

impl DisplayEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DisplayEvent::Received(_) => EventKind::Received,
            DisplayEvent::Status(_) => EventKind::Status,
        }
    }

    pub fn line(&self) -> &TimestampedLine {
        match self {
            DisplayEvent::Received(line) | DisplayEvent::Status(line) => line,
        }
    }

    /// `[HH:MM:SS] <text>\r\n`.
    pub fn render(&self) -> String {
        self.line().render()
    }
}

/// Create a connected producer/consumer pair.
pub fn channel() -> (DeliverySink, DeliveryQueue) {
    let (tx, rx) = mpsc::channel();
    let posted = Arc::new(AtomicU64::new(0));
    (
        DeliverySink {
            tx,
            posted: Arc::clone(&posted),
        },
        DeliveryQueue { rx, posted },
    )
}

/// Producer side. Cheap to clone; safe to use from any thread.
#[derive(Debug, Clone)]
pub struct DeliverySink {
    tx: Sender<DisplayEvent>,
    posted: Arc<AtomicU64>,
}

/// Consumer end of [`channel`], handed to a [`DisplayPump`].
#[derive(Debug)]
pub struct DeliveryQueue {
    rx: Receiver<DisplayEvent>,
    posted: Arc<AtomicU64>,
}

impl DeliverySink {
    /// Timestamp `line` now and queue it.
    pub fn deliver(&self, line: Line) {
        self.post(DisplayEvent::Received(TimestampedLine::now(line)));
    }

    /// Queue a session notice.
    pub fn notice(&self, text: impl Into<String>) {
        self.post(DisplayEvent::Status(TimestampedLine::now(Line::from(
            text.into(),
        ))));
    }

    // Fire-and-forget: with no consumer left the event is dropped.
    fn post(&self, event: DisplayEvent) {
        match self.tx.send(event) {
            Ok(()) => {
                self.posted.fetch_add(1, Ordering::SeqCst);
            }
            Err(_) => trace!("display consumer gone; dropping event"),
        }
    }
}

/// Result of a single [`DisplayPump::pump_one`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pumped {
    /// An event was shown.
    Presented(EventKind),
    /// An event arrived but the display is torn down.
    Dropped,
    /// Nothing arrived within the timeout.
    Idle,
    /// Every producer is gone and the queue is empty.
    Closed,
}

/// Consumer side, owned by the display context.
pub struct DisplayPump<D> {
    queue: DeliveryQueue,
    display: D,
    taken: u64,
    dropped: u64,
}

impl<D: DisplaySink> DisplayPump<D> {
    pub fn new(queue: DeliveryQueue, display: D) -> Self {
        Self {
            queue,
            display,
            taken: 0,
            dropped: 0,
        }
    }

    /// Present the events queued when the call starts, without blocking.
    /// Events posted meanwhile wait for the next call, so a fast producer
    /// cannot keep this loop running. Returns the number of events shown.
    pub fn pump(&mut self) -> usize {
        let queued = self.queue.posted.load(Ordering::SeqCst);
        let mut presented = 0;
        while self.taken < queued {
            let Ok(event) = self.queue.rx.try_recv() else {
                break;
            };
            self.taken += 1;
            if self.present(event) {
                presented += 1;
            }
        }
        presented
    }

    /// Wait up to `timeout` for the next event and present it.
    pub fn pump_one(&mut self, timeout: Duration) -> Pumped {
        match self.queue.rx.recv_timeout(timeout) {
            Ok(event) => {
                self.taken += 1;
                let kind = event.kind();
                if self.present(event) {
                    Pumped::Presented(kind)
                } else {
                    Pumped::Dropped
                }
            }
            Err(RecvTimeoutError::Timeout) => Pumped::Idle,
            Err(RecvTimeoutError::Disconnected) => Pumped::Closed,
        }
    }

    /// Present events until every producer has been dropped.
    pub fn run(&mut self) -> usize {
        let mut presented = 0;
        while let Ok(event) = self.queue.rx.recv() {
            self.taken += 1;
            if self.present(event) {
                presented += 1;
            }
        }
        presented
    }

    /// Events discarded because the display was torn down.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn into_display(self) -> D {
        self.display
    }

    fn present(&mut self, event: DisplayEvent) -> bool {
        if self.display.is_torn_down() {
            self.dropped += 1;
            trace!(kind = ?event.kind(), "display torn down; dropping event");
            return false;
        }
        self.display.present(&event);
        true
    }
}

impl<D> std::fmt::Debug for DisplayPump<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayPump")
            .field("dropped", &self.dropped)
            .finish()
    }
}
