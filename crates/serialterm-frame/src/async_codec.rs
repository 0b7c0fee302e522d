use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::debug;

use crate::codec::{next_line, Line};

/// `tokio_util` decoder with the same line rules as [`crate::LineBuffer`].
///
/// At end of stream an unterminated residue is dropped, not yielded.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl LineCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for LineCodec {
    type Item = Line;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Line>, Self::Error> {
        Ok(next_line(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Line>, Self::Error> {
        if let Some(line) = next_line(src) {
            return Ok(Some(line));
        }
        if !src.is_empty() {
            debug!(discarded = src.len(), "dropping unterminated residue at end of stream");
            src.clear();
        }
        Ok(None)
    }
}
