use crate::display::RowStore;
use ratatui::prelude::{Line, Text};
use std::num::NonZeroUsize;

/// Log lines shown in the log pane, oldest first.
pub struct LineHistory {
    lines: RowStore<Line<'static>>,
}

impl LineHistory {
    const MAX_HISTORY: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(max) => max,
        None => unreachable!(),
    };

    pub fn new() -> Self {
        Self {
            lines: RowStore::new(Self::MAX_HISTORY),
        }
    }

    pub fn push(&mut self, text: Text<'static>) {
        self.lines.extend(text.lines);
    }

    /// The last `count` lines.
    #[must_use]
    pub fn tail(&self, count: usize) -> Text<'static> {
        let skip = self.lines.len().saturating_sub(count);
        Text::from(self.lines.iter().skip(skip).cloned().collect::<Vec<_>>())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Default for LineHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_only_recent_lines() {
        let mut history = LineHistory::new();
        for i in 0..1005 {
            history.push(Text::raw(format!("line {i}")));
        }
        assert_eq!(history.tail(2).to_string(), "line 1003\nline 1004");
        assert_eq!(history.tail(usize::MAX).lines.len(), 1000);
    }

    #[test]
    fn multi_line_text_is_split_into_lines() {
        let mut history = LineHistory::new();
        history.push(Text::raw("a\nb"));
        history.push(Text::raw("c"));
        assert_eq!(history.tail(2).to_string(), "b\nc");
    }
}
