use crate::delivery::DisplayEvent;

/// The display collaborator: an append-only text surface that lives on a
/// single context and may be torn down at any time.
pub trait DisplaySink {
    fn append_text(&mut self, text: &str);

    /// Move the view/cursor to the end of the text.
    fn scroll_to_end(&mut self);

    fn is_torn_down(&self) -> bool;

    /// Show one event. The default appends the rendered line and scrolls.
    fn present(&mut self, event: &DisplayEvent) {
        self.append_text(&event.render());
        self.scroll_to_end();
    }
}

/// In-memory display: accumulated text plus a cursor.
#[derive(Debug, Default, Clone)]
pub struct TextDisplay {
    text: String,
    cursor: usize,
    torn_down: bool,
}

impl TextDisplay {
    /// Length of the `[HH:MM:SS] ` prefix on every rendered line.
    pub const CLOCK_PREFIX_LEN: usize = 11;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Rendered lines without their CR LF.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text
            .split_terminator('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn tear_down(&mut self) {
        self.torn_down = true;
    }
}

impl DisplaySink for TextDisplay {
    fn append_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn scroll_to_end(&mut self) {
        self.cursor = self.text.len();
    }

    fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}
