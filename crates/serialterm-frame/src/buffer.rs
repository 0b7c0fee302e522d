use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::BytesMut;
use tracing::{debug, trace};

use crate::codec::{next_line, Line};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;

/// Reassembles arbitrarily chunked bytes into complete lines.
///
/// Holds the bytes received since the last terminator. `append` and `reset`
/// take the same lock for their whole duration, so a reset either fully
/// precedes or fully follows any append and line boundaries never interleave.
/// Safe to share between a reader thread and a control thread via `Arc`.
pub struct LineBuffer {
    raw: Mutex<BytesMut>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: Mutex::new(BytesMut::with_capacity(capacity)),
        }
    }

    /// Append a chunk and return every line it completes, in arrival order.
    ///
    /// Bytes after the last terminator are kept for the next call.
    pub fn append(&self, chunk: &[u8]) -> Vec<Line> {
        if chunk.is_empty() {
            return Vec::new();
        }

        let mut raw = self.lock();
        raw.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(line) = next_line(&mut raw) {
            lines.push(line);
        }

        trace!(
            chunk = chunk.len(),
            lines = lines.len(),
            pending = raw.len(),
            "chunk appended"
        );
        lines
    }

    /// Discard any unterminated residue. Returns the number of bytes dropped.
    ///
    /// The residue is not delivered: a final line without a terminator is
    /// lost when the connection closes.
    pub fn reset(&self) -> usize {
        let mut raw = self.lock();
        let discarded = raw.len();
        raw.clear();
        if discarded > 0 {
            debug!(discarded, "discarded unterminated residue");
        }
        discarded
    }

    /// Bytes currently waiting for a terminator.
    pub fn pending_len(&self) -> usize {
        self.lock().len()
    }

    // The guarded bytes are valid after any panic, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, BytesMut> {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LineBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineBuffer")
            .field("pending", &self.pending_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};

    use super::*;

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.text().into_owned()).collect()
    }

    #[test]
    fn crlf_line_in_one_chunk() {
        let buffer = LineBuffer::new();
        assert_eq!(buffer.append(b"hello\r\n"), ["hello"]);
        assert_eq!(buffer.pending_len(), 0);
    }

    #[test]
    fn line_completed_by_second_chunk() {
        let buffer = LineBuffer::new();
        assert!(buffer.append(b"foo").is_empty());
        assert_eq!(buffer.pending_len(), 3);
        assert_eq!(buffer.append(b"bar\n"), ["foobar"]);
        assert_eq!(buffer.pending_len(), 0);
    }

    #[test]
    fn blank_line_between_lines_and_residue_kept() {
        let buffer = LineBuffer::new();
        assert_eq!(buffer.append(b"AB\n\nCD"), ["AB", ""]);
        assert_eq!(buffer.pending_len(), 2);
        assert_eq!(buffer.append(b"\n"), ["CD"]);
    }

    #[test]
    fn carriage_return_and_line_feed_split_across_chunks() {
        let buffer = LineBuffer::new();
        assert!(buffer.append(b"value=42\r").is_empty());
        assert_eq!(buffer.append(b"\n"), ["value=42"]);
    }

    #[test]
    fn empty_chunk_is_a_no_op() {
        let buffer = LineBuffer::new();
        buffer.append(b"abc");
        assert!(buffer.append(b"").is_empty());
        assert_eq!(buffer.pending_len(), 3);
    }

    #[test]
    fn chunk_of_only_terminators_yields_that_many_empty_lines() {
        let buffer = LineBuffer::new();
        let lines = buffer.append(b"\n\n\r\n\n");
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(Line::is_empty));
    }

    #[test]
    fn inner_carriage_return_is_preserved() {
        let buffer = LineBuffer::new();
        let lines = buffer.append(b"a\rb\r\n");
        assert_eq!(lines[0].as_bytes(), b"a\rb");
    }

    #[test]
    fn reset_drops_residue_and_is_idempotent() {
        let buffer = LineBuffer::new();
        buffer.append(b"partial");
        assert_eq!(buffer.reset(), 7);
        assert_eq!(buffer.reset(), 0);
        assert_eq!(buffer.pending_len(), 0);

        // Nothing of "partial" leaks into the next line.
        assert_eq!(buffer.append(b"fresh\n"), ["fresh"]);
    }

    #[test]
    fn every_three_way_split_yields_the_same_lines() {
        let stream: &[u8] = b"$GPGGA,1*47\r\n\nOK\r\nERR\rX\nlast\r\ntail";
        let expected = vec!["$GPGGA,1*47", "", "OK", "ERR\rX", "last"];
        let terminators = stream.iter().filter(|b| **b == b'\n').count();
        assert_eq!(terminators, expected.len());

        for i in 0..=stream.len() {
            for j in i..=stream.len() {
                let buffer = LineBuffer::new();
                let mut lines = buffer.append(&stream[..i]);
                lines.extend(buffer.append(&stream[i..j]));
                lines.extend(buffer.append(&stream[j..]));

                assert_eq!(texts(&lines), expected, "split at {i},{j}");
                assert_eq!(buffer.pending_len(), b"tail".len());
            }
        }
    }

    #[test]
    fn byte_at_a_time_matches_single_chunk() {
        let stream = b"one\r\ntwo\nthree\r\n\r\n";
        let whole = LineBuffer::new().append(stream);

        let buffer = LineBuffer::new();
        let trickled: Vec<Line> = stream
            .iter()
            .flat_map(|b| buffer.append(std::slice::from_ref(b)))
            .collect();

        assert_eq!(whole, trickled);
        assert_eq!(texts(&trickled), ["one", "two", "three", ""]);
    }

    #[test]
    fn concurrent_producers_never_interleave_lines() {
        const PRODUCERS: usize = 8;
        const LINES_PER_PRODUCER: usize = 500;

        let buffer = Arc::new(LineBuffer::new());
        let barrier = Arc::new(Barrier::new(PRODUCERS));

        let handles: Vec<_> = (0..PRODUCERS)
            .map(|producer| {
                let buffer = Arc::clone(&buffer);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    let mut out = Vec::new();
                    for seq in 0..LINES_PER_PRODUCER {
                        // Each chunk carries whole lines only.
                        let chunk = format!("p{producer}:{seq}:payload\r\n");
                        out.extend(buffer.append(chunk.as_bytes()));
                    }
                    out
                })
            })
            .collect();

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.join().unwrap());
        }

        assert_eq!(all.len(), PRODUCERS * LINES_PER_PRODUCER);
        for line in &all {
            let text = line.text();
            let parts: Vec<&str> = text.split(':').collect();
            assert_eq!(parts.len(), 3, "corrupted line {text:?}");
            assert!(parts[0].starts_with('p'));
            assert!(parts[1].parse::<usize>().is_ok());
            assert_eq!(parts[2], "payload");
        }
        assert_eq!(buffer.pending_len(), 0);
    }

    #[test]
    fn reset_racing_append_only_cuts_at_chunk_boundaries() {
        const LINES: usize = 2_000;

        let buffer = Arc::new(LineBuffer::new());
        let done = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let resetter = {
            let buffer = Arc::clone(&buffer);
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                while !done.load(std::sync::atomic::Ordering::SeqCst) {
                    buffer.reset();
                    std::thread::yield_now();
                }
            })
        };

        let mut lines = Vec::new();
        for i in 0..LINES {
            // Each line arrives as two chunks; a reset between them drops the head.
            lines.extend(buffer.append(format!("L{i}|").as_bytes()));
            lines.extend(buffer.append(format!("{i}\n").as_bytes()));
        }
        done.store(true, std::sync::atomic::Ordering::SeqCst);
        resetter.join().unwrap();

        assert_eq!(lines.len(), LINES);
        for (i, line) in lines.iter().enumerate() {
            let text = line.text();
            let full = format!("L{i}|{i}");
            let tail = i.to_string();
            assert!(
                text == full || text == tail,
                "line {i} is neither whole nor a clean tail: {text:?}"
            );
        }
    }
}
