//! Bounded, auto-scrolling text display.
//!
//! Row mode stacks one [`Entry`] per applied payload and evicts the oldest
//! once `max_visible_rows` is exceeded. Panel mode keeps a single [`Panel`]
//! whose content is replaced on every update and which stays scrolled to the
//! bottom.

use ansi_to_tui::IntoText;
use ratatui::layout::{Constraint, Layout, Size};
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use std::num::NonZeroUsize;
use tracing::trace;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

mod normalize;
mod scroll;
mod store;

pub use normalize::{Normalized, PLACEHOLDER, normalize};
pub use scroll::{DEFAULT_MAX_HEIGHT, Overflow, PanelScroll, PanelStyle};
pub use store::RowStore;

/// Display settings, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Fixed height in lines, `0` for automatic.
    pub height: u16,
    /// Row mode capacity.
    pub max_visible_rows: NonZeroUsize,
    /// Show only the latest payload in a single scrolling panel.
    pub show_as_scroll_panel: bool,
}

/// A rendered text block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry(Text<'static>);

impl Entry {
    /// Renders normalized text, interpreting ANSI color sequences when they
    /// parse.
    #[must_use]
    pub fn new(normalized: &Normalized) -> Self {
        let text = normalized
            .text
            .into_text()
            .unwrap_or_else(|_| Text::raw(normalized.text.clone()));
        Self(text)
    }

    /// Rendered text.
    #[must_use]
    pub const fn text(&self) -> &Text<'static> {
        &self.0
    }

    /// Number of lines.
    #[must_use]
    pub fn height(&self) -> usize {
        self.0.height()
    }
}

/// The single block shown in panel mode.
#[derive(Debug, Clone)]
pub struct Panel {
    entry: Entry,
    style: PanelStyle,
    scroll: PanelScroll,
}

impl Panel {
    fn new(entry: Entry, style: PanelStyle) -> Self {
        let scroll = PanelScroll::new(entry.height(), usize::from(style.max_height));
        Self {
            entry,
            style,
            scroll,
        }
    }

    fn update(&mut self, entry: Entry, style: PanelStyle) {
        self.entry = entry;
        self.style = style;
        self.scroll.pin_to_bottom(self.scroll_height());
        trace!(lines = self.scroll_height(), "replaced panel content");
    }

    /// Current content.
    #[must_use]
    pub const fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Styling from the last update.
    #[must_use]
    pub const fn style(&self) -> PanelStyle {
        self.style
    }

    /// Current scroll position.
    #[must_use]
    pub const fn scroll(&self) -> PanelScroll {
        self.scroll
    }

    /// Full content height in lines.
    #[must_use]
    pub fn scroll_height(&self) -> usize {
        self.entry.height()
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let content_height = self.scroll_height();
        let area = Rect {
            height: area.height.min(self.style.max_height),
            ..area
        };
        let viewport = usize::from(area.height);
        self.scroll.set_viewport(viewport);
        let offset = self.scroll.visible_offset(content_height, viewport);

        let text_area = if self.style.shows_scrollbar(content_height, viewport) {
            let [text_area, bar_area] =
                Layout::horizontal([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
            let mut state = ScrollbarState::new(content_height.saturating_sub(viewport))
                .position(offset)
                .viewport_content_length(viewport);
            Scrollbar::new(ScrollbarOrientation::VerticalRight).render(bar_area, buf, &mut state);
            text_area
        } else {
            area
        };

        Paragraph::new(self.entry.text().clone())
            .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0))
            .render(text_area, buf);
    }
}

#[derive(Debug)]
enum Rows {
    Stacked(RowStore<Entry>),
    Panel(Option<Panel>),
}

/// Capacity-bounded text display.
#[derive(Debug)]
pub struct TextDisplay {
    config: DisplayConfig,
    rows: Rows,
    target_height: Option<u16>,
    scroll_view_state: ScrollViewState,
    scroll_bottom: bool,
}

impl TextDisplay {
    /// Creates an empty display.
    #[must_use]
    pub fn new(config: DisplayConfig) -> Self {
        let rows = if config.show_as_scroll_panel {
            Rows::Panel(None)
        } else {
            Rows::Stacked(RowStore::new(config.max_visible_rows))
        };

        Self {
            config,
            rows,
            target_height: None,
            scroll_view_state: ScrollViewState::new(),
            scroll_bottom: true,
        }
    }

    /// Settings this display was built with.
    #[must_use]
    pub const fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Applies one payload: append or replace, restyle, then scroll to the
    /// latest content.
    pub fn append(&mut self, normalized: &Normalized) {
        let entry = Entry::new(normalized);

        match &mut self.rows {
            Rows::Stacked(rows) => {
                let evicted = rows.push(entry);
                trace!(rows = rows.len(), evicted, "appended row");
                self.scroll_bottom = true;
            }
            Rows::Panel(slot) => {
                let style = PanelStyle::new(normalized.was_empty, self.config.height);
                match slot.as_mut() {
                    Some(panel) => panel.update(entry, style),
                    None => *slot = Some(Panel::new(entry, style)),
                }
            }
        }
    }

    /// Rendered blocks, oldest first. Panel mode yields at most one.
    #[must_use]
    pub fn entries(&self) -> Box<dyn Iterator<Item = &Entry> + '_> {
        match &self.rows {
            Rows::Stacked(rows) => Box::new(rows.iter()),
            Rows::Panel(panel) => Box::new(panel.iter().map(Panel::entry)),
        }
    }

    /// Number of rendered blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.rows {
            Rows::Stacked(rows) => rows.len(),
            Rows::Panel(panel) => usize::from(panel.is_some()),
        }
    }

    /// Returns true until the first payload is applied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The panel, once created.
    #[must_use]
    pub fn panel(&self) -> Option<&Panel> {
        match &self.rows {
            Rows::Panel(panel) => panel.as_ref(),
            Rows::Stacked(_) => None,
        }
    }

    fn panel_mut(&mut self) -> Option<&mut Panel> {
        match &mut self.rows {
            Rows::Panel(panel) => panel.as_mut(),
            Rows::Stacked(_) => None,
        }
    }

    /// Fixes the height of the display region.
    pub const fn set_target_height(&mut self, height: u16) {
        self.target_height = Some(height);
    }

    /// Fixed height of the display region, if one was set.
    #[must_use]
    pub const fn target_height(&self) -> Option<u16> {
        self.target_height
    }

    /// Scrolls up one line. In row mode this also stops following new
    /// rows until [`follow`](Self::follow) or the next append.
    pub fn scroll_up(&mut self) {
        if let Some(panel) = self.panel_mut() {
            let height = panel.scroll_height();
            panel.scroll.scroll_up(height);
        } else {
            self.scroll_bottom = false;
            self.scroll_view_state.scroll_up();
        }
    }

    /// Scrolls down one line.
    pub fn scroll_down(&mut self) {
        if let Some(panel) = self.panel_mut() {
            let height = panel.scroll_height();
            panel.scroll.scroll_down(height);
        } else {
            self.scroll_view_state.scroll_down();
        }
    }

    /// Jumps back to the latest content and keeps following it.
    pub fn follow(&mut self) {
        if let Some(panel) = self.panel_mut() {
            let height = panel.scroll_height();
            panel.scroll.pin_to_bottom(height);
        } else {
            self.scroll_bottom = true;
        }
    }

    fn render_rows(&mut self, area: Rect, buf: &mut Buffer) {
        let Rows::Stacked(rows) = &self.rows else {
            return;
        };

        let width = area.width.saturating_sub(1);
        let total: usize = rows.iter().map(Entry::height).sum();
        let content_size = Size::new(width, u16::try_from(total).unwrap_or(u16::MAX));
        let mut scroll_view = ScrollView::new(content_size)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y = 0_u16;
        for entry in rows.iter() {
            let height = u16::try_from(entry.height()).unwrap_or(u16::MAX);
            scroll_view.render_widget(entry.text(), Rect::new(0, y, width, height));
            y = y.saturating_add(height);
        }

        if self.scroll_view_state.offset().y.saturating_add(area.height) > content_size.height {
            self.scroll_bottom = true;
        }

        // Rendering clamps the offset to the last page of the current content.
        if self.scroll_bottom {
            self.scroll_view_state.set_offset(Position::new(0, u16::MAX));
        }

        scroll_view.render(area, buf, &mut self.scroll_view_state);
    }
}

impl Widget for &mut TextDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        if let Some(panel) = self.panel_mut() {
            panel.render(area, buf);
        } else {
            self.render_rows(area, buf);
        }
    }
}
