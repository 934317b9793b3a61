//! `TextFeed` terminal viewer made using ratatui
//!
//! Periodically fetches a remote text resource and shows it either as a
//! bounded list of rows or as a single panel pinned to its latest line.

use crate::feed::{Feed, FetchOutcome, TextFeed};
use crate::logger::history;
use anyhow::Context;
use ratatui::DefaultTerminal;
use ratatui::crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind,
};
use ratatui::crossterm::{ExecutableCommand, event};
use ratatui::layout::Constraint;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use std::thread;
use std::time::Duration;
use tokio::select;
use tokio::sync::{Notify, mpsc};
use tokio::time::{self, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

static REDRAW: Notify = Notify::const_new();

pub mod config;
pub mod display;
pub mod feed;
pub(crate) mod logger;

pub use logger::TuiLoggerWriter;

#[derive(Debug)]
enum AppEvent {
    UiEvent(Event),
    Fetched(FetchOutcome),
}

/// Commands typed into the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Load,
    Pause,
    Resume,
    Clear,
    Quit,
}

impl Command {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "load" | "reload" => Some(Self::Load),
            "pause" => Some(Self::Pause),
            "resume" => Some(Self::Resume),
            "clear" => Some(Self::Clear),
            "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// The main application struct
pub struct TextFeedApp {
    feed: TextFeed,
    event_rx: mpsc::Receiver<Event>,
    refresh: Interval,
    paused: bool,
    input: Input,
    cursor_position: Position,
    token: CancellationToken,
}

impl TextFeedApp {
    /// Creates a new app and spawns a terminal event thread. The feed is
    /// loaded once every `refresh`.
    #[must_use]
    pub fn new(feed: TextFeed, refresh: Duration, token: CancellationToken) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let event_token = token.child_token();
        thread::spawn(move || {
            while !event_token.is_cancelled() {
                match event::poll(Duration::from_millis(100)) {
                    Ok(false) => continue,
                    Ok(true) => {}
                    Err(err) => {
                        error!("failed to poll terminal events: {err}");
                        break;
                    }
                }
                let event = match event::read() {
                    Ok(event) => event,
                    Err(err) => {
                        error!("failed to read terminal event: {err}");
                        break;
                    }
                };
                if tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        let mut refresh = time::interval(refresh);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            feed,
            event_rx: rx,
            refresh,
            paused: false,
            input: Input::new(String::new()),
            cursor_position: Position::default(),
            token,
        }
    }

    fn draw(&mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        terminal.draw(|frame| {
            frame.render_widget(&mut *self, frame.area());
            frame.set_cursor_position(self.cursor_position);
        })?;
        Ok(())
    }

    fn submit_command(&mut self) {
        let value = self.input.value_and_reset();
        if value.trim().is_empty() {
            return;
        }

        match Command::parse(&value) {
            Some(Command::Load) => self.feed.load(),
            Some(Command::Pause) => {
                self.paused = true;
                info!("periodic loading paused");
            }
            Some(Command::Resume) => {
                self.paused = false;
                self.refresh.reset();
                info!("periodic loading resumed");
            }
            Some(Command::Clear) => history().clear(),
            Some(Command::Quit) => self.token.cancel(),
            None => warn!("unknown command: {}", value.trim()),
        }
    }

    fn handle_key(&mut self, event: KeyEvent) {
        if !event.is_press() {
            return;
        }

        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            self.token.cancel();
            return;
        }

        match event.code {
            KeyCode::Enter => self.submit_command(),
            KeyCode::Up => self.feed.display_mut().scroll_up(),
            KeyCode::Down if event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.feed.display_mut().follow();
            }
            KeyCode::Down => self.feed.display_mut().scroll_down(),
            _ => {
                self.input.handle_event(&Event::Key(event));
            }
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent) {
        let display = self.feed.display_mut();
        match event.kind {
            MouseEventKind::ScrollDown if event.modifiers.contains(KeyModifiers::CONTROL) => {
                display.follow();
            }
            MouseEventKind::ScrollDown => display.scroll_down(),
            MouseEventKind::ScrollUp => display.scroll_up(),
            _ => (),
        }
    }

    fn handle_paste(&mut self, paste: &str) {
        let mut value = self.input.value_and_reset();
        value.push_str(paste);

        replace_with::replace_with(
            &mut self.input,
            || Input::new(String::new()),
            |input| input.with_value(value),
        );
    }

    /// Runs the app until it is cancelled
    pub async fn run(&mut self, mut terminal: DefaultTerminal) -> anyhow::Result<()> {
        terminal
            .backend_mut()
            .execute(EnableMouseCapture)
            .context("failed to enable mouse capture")?;
        terminal
            .backend_mut()
            .execute(EnableBracketedPaste)
            .context("failed to enable bracketed paste")?;

        info!(url = %self.feed.url(), "watching {}", self.feed.source().name);
        let outcomes = self.feed.outcomes();

        while !self.token.is_cancelled() {
            self.draw(&mut terminal)?;

            let event = select! {
                biased;
                () = self.token.cancelled() => break,
                event = self.event_rx.recv() => {
                    if let Some(event) = event { AppEvent::UiEvent(event) } else {
                        self.token.cancel();
                        break;
                    }
                }
                Ok(outcome) = outcomes.recv_async() => AppEvent::Fetched(outcome),
                _ = self.refresh.tick(), if !self.paused => {
                    self.feed.load();
                    continue;
                }
                () = REDRAW.notified() => {
                    continue;
                }
            };

            match event {
                AppEvent::UiEvent(Event::Key(event)) => self.handle_key(event),
                AppEvent::UiEvent(Event::Mouse(event)) => self.handle_mouse(event),
                AppEvent::UiEvent(Event::Paste(paste)) => self.handle_paste(&paste),
                AppEvent::UiEvent(_) => (),
                AppEvent::Fetched(outcome) => {
                    self.feed.complete(outcome);
                }
            }
        }

        terminal
            .backend_mut()
            .execute(DisableBracketedPaste)
            .context("failed to disable bracketed paste")?;
        terminal
            .backend_mut()
            .execute(DisableMouseCapture)
            .context("failed to disable mouse capture")?;
        Ok(())
    }

    fn title(&self) -> String {
        let mut title = format!(" {} · {}", self.feed.source().name, self.feed.status());
        if self.feed.failures() > 0 {
            title.push_str(&format!(" ({} failed)", self.feed.failures()));
        }
        if self.paused {
            title.push_str(" · paused");
        }
        title.push(' ');
        title
    }
}

/// Column of the input cursor, after the `> ` prompt.
fn prompt_cursor_x(cursor: usize) -> u16 {
    u16::try_from(cursor).unwrap_or(u16::MAX).saturating_add(2)
}

impl Widget for &mut TextFeedApp {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let feed_height = match self.feed.display().target_height() {
            Some(height) => Constraint::Length(height.saturating_add(2)),
            None => Constraint::Fill(2),
        };
        let [feed_area, log_area, input_area] =
            Layout::vertical([feed_height, Constraint::Fill(1), Constraint::Length(1)])
                .areas(area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title())
            .title_bottom(Line::from(self.feed.url()).right_aligned());
        let inner = block.inner(feed_area);
        block.render(feed_area, buf);
        self.feed.display_mut().render(inner, buf);

        let logs = Block::default().borders(Borders::TOP).title(" log ");
        let log_inner = logs.inner(log_area);
        logs.render(log_area, buf);
        Paragraph::new(history().tail(usize::from(log_inner.height))).render(log_inner, buf);

        self.cursor_position = Position {
            x: prompt_cursor_x(self.input.cursor()),
            y: input_area.y,
        };
        Span::raw(format!("> {}", self.input.value())).render(input_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse(" load "), Some(Command::Load));
        assert_eq!(Command::parse("reload"), Some(Command::Load));
        assert_eq!(Command::parse("pause"), Some(Command::Pause));
        assert_eq!(Command::parse("resume"), Some(Command::Resume));
        assert_eq!(Command::parse("clear"), Some(Command::Clear));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
        assert_eq!(Command::parse("fetch"), None);
    }

    #[test]
    fn cursor_column_saturates_on_long_input() {
        assert_eq!(prompt_cursor_x(0), 2);
        assert_eq!(prompt_cursor_x(usize::from(u16::MAX) - 2), u16::MAX);
        assert_eq!(prompt_cursor_x(1 << 20), u16::MAX);
    }
}
