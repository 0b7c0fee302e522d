use chrono::{DateTime, Local};

use crate::codec::Line;

/// `strftime` pattern for the display clock.
pub const CLOCK_FORMAT: &str = "%H:%M:%S";

/// A line paired with the local wall-clock time it was extracted at.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampedLine {
    line: Line,
    captured_at: DateTime<Local>,
}

impl TimestampedLine {
    /// Stamp `line` with the current local time.
    pub fn now(line: Line) -> Self {
        Self::at(line, Local::now())
    }

    pub fn at(line: Line, captured_at: DateTime<Local>) -> Self {
        Self { line, captured_at }
    }

    pub fn line(&self) -> &Line {
        &self.line
    }

    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }

    /// `HH:MM:SS` of the capture time.
    pub fn clock(&self) -> String {
        self.captured_at.format(CLOCK_FORMAT).to_string()
    }

    /// Display form: `[HH:MM:SS] <line>` followed by CR LF.
    pub fn render(&self) -> String {
        format!("[{}] {}\r\n", self.clock(), self.line.text())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, 9, h, m, s)
            .single()
            .expect("unambiguous local time")
    }

    #[test]
    fn renders_clock_prefix_and_crlf() {
        let stamped = TimestampedLine::at(Line::from("temp=21.5"), fixed(7, 5, 3));
        assert_eq!(stamped.clock(), "07:05:03");
        assert_eq!(stamped.render(), "[07:05:03] temp=21.5\r\n");
    }

    #[test]
    fn empty_line_still_gets_a_prefix() {
        let stamped = TimestampedLine::at(Line::default(), fixed(23, 59, 59));
        assert_eq!(stamped.render(), "[23:59:59] \r\n");
    }

    #[test]
    fn now_uses_current_time() {
        let before = Local::now();
        let stamped = TimestampedLine::now(Line::from("x"));
        let after = Local::now();
        assert!(stamped.captured_at() >= before && stamped.captured_at() <= after);
        assert_eq!(stamped.line(), &Line::from("x"));
    }
}
