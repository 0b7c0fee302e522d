use std::borrow::Cow;
use std::fmt;

use bytes::{Bytes, BytesMut};

/// Line separator.
pub const LINE_FEED: u8 = b'\n';

/// Stripped when it immediately precedes [`LINE_FEED`].
pub const CARRIAGE_RETURN: u8 = b'\r';

/// One complete line, without its terminator.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Line {
    bytes: Bytes,
}

impl Line {
    /// Wrap bytes that are already terminator-free.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Text view. Invalid UTF-8 sequences are replaced with U+FFFD.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line({:?})", self.text())
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Self::new(Bytes::copy_from_slice(text.as_bytes()))
    }
}

impl From<String> for Line {
    fn from(text: String) -> Self {
        Self::new(Bytes::from(text))
    }
}

impl PartialEq<str> for Line {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for Line {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

/// Split the next complete line off the front of `buf`.
///
/// Returns `None`, leaving `buf` untouched, when it holds no [`LINE_FEED`].
/// Otherwise the bytes up to and including the first terminator are
/// consumed; the returned line excludes the terminator and one carriage
/// return directly before it. Carriage returns anywhere else are kept.
pub fn next_line(buf: &mut BytesMut) -> Option<Line> {
    let idx = buf.iter().position(|b| *b == LINE_FEED)?;

    let mut line = buf.split_to(idx + 1);
    line.truncate(idx);
    if line.last() == Some(&CARRIAGE_RETURN) {
        line.truncate(idx - 1);
    }

    Some(Line {
        bytes: line.freeze(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_terminator_leaves_buffer_alone() {
        let mut buf = BytesMut::from(&b"partial\r"[..]);
        assert!(next_line(&mut buf).is_none());
        assert_eq!(&buf[..], b"partial\r");
    }

    #[test]
    fn strips_lf_and_single_preceding_cr() {
        let mut buf = BytesMut::from(&b"hello\r\nworld\n"[..]);
        assert_eq!(next_line(&mut buf).unwrap(), "hello");
        assert_eq!(next_line(&mut buf).unwrap(), "world");
        assert!(next_line(&mut buf).is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn only_one_carriage_return_is_stripped() {
        let mut buf = BytesMut::from(&b"a\r\r\n"[..]);
        assert_eq!(next_line(&mut buf).unwrap().as_bytes(), b"a\r");
    }

    #[test]
    fn inner_carriage_returns_are_kept() {
        let mut buf = BytesMut::from(&b"progress 10%\rprogress 20%\n"[..]);
        assert_eq!(
            next_line(&mut buf).unwrap().as_bytes(),
            b"progress 10%\rprogress 20%"
        );
    }

    #[test]
    fn leading_terminator_yields_empty_line() {
        let mut buf = BytesMut::from(&b"\nrest"[..]);
        let line = next_line(&mut buf).unwrap();
        assert!(line.is_empty());
        assert_eq!(&buf[..], b"rest");
    }

    #[test]
    fn bare_crlf_yields_empty_line() {
        let mut buf = BytesMut::from(&b"\r\n"[..]);
        assert!(next_line(&mut buf).unwrap().is_empty());
    }

    #[test]
    fn invalid_utf8_is_replaced_in_text_view() {
        let line = Line::new(Bytes::from_static(b"temp \xff 21C"));
        assert_eq!(line.text(), "temp \u{fffd} 21C");
        assert_eq!(line.len(), 8);
    }
}
