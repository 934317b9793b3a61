use std::{
    io::{self, Write},
    sync::{LazyLock, Mutex, MutexGuard, PoisonError},
};

use crate::REDRAW;
use crate::logger::line_history::LineHistory;
use ansi_to_tui::IntoText;
use ratatui::text::Text;
use tracing_subscriber::fmt::MakeWriter;

mod line_history;

static LOGGER: LazyLock<Mutex<LineHistory>> = LazyLock::new(|| Mutex::new(LineHistory::new()));

/// Log pane contents. A panic while logging does not lose the history.
pub(crate) fn history() -> MutexGuard<'static, LineHistory> {
    LOGGER.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A writer that forwards all text written into the log pane
#[derive(Debug, Clone, Copy)]
pub struct TuiLoggerWriter;

impl Write for TuiLoggerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let line = String::from_utf8_lossy(buf);
        let line = line.strip_suffix('\n').unwrap_or(&line);
        let text = line
            .into_text()
            .unwrap_or_else(|_| Text::raw(line.to_owned()));
        history().push(text);
        REDRAW.notify_one();

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for TuiLoggerWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        *self
    }
}
