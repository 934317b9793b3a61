/// Panel max height used when no fixed height is configured.
pub const DEFAULT_MAX_HEIGHT: u16 = 100;

/// How the panel handles content taller than its max height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Vertical scrollbar is always shown.
    Scroll,
    /// Scrollbar is shown only when the content overflows.
    Auto,
}

impl Overflow {
    /// Non-empty payloads scroll; empty ones fall back to `Auto`.
    #[must_use]
    pub const fn for_payload(was_empty: bool) -> Self {
        if was_empty { Self::Auto } else { Self::Scroll }
    }
}

/// Styling applied to the panel after every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelStyle {
    /// Overflow behavior.
    pub overflow: Overflow,
    /// Maximum number of content lines shown at once.
    pub max_height: u16,
}

impl PanelStyle {
    /// Style for a payload under the given configured height.
    #[must_use]
    pub const fn new(was_empty: bool, height: u16) -> Self {
        Self {
            overflow: Overflow::for_payload(was_empty),
            max_height: if height > 0 { height } else { DEFAULT_MAX_HEIGHT },
        }
    }

    /// Whether a scrollbar is drawn for content of `content_height` lines in
    /// a viewport of `viewport` lines.
    #[must_use]
    pub const fn shows_scrollbar(self, content_height: usize, viewport: usize) -> bool {
        match self.overflow {
            Overflow::Scroll => true,
            Overflow::Auto => content_height > viewport,
        }
    }
}

/// Vertical scroll position of the panel, in lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelScroll {
    top: usize,
    viewport: usize,
}

impl PanelScroll {
    /// Starts pinned to the end of `scroll_height` lines, assuming a
    /// viewport of `viewport` lines until the first draw.
    #[must_use]
    pub const fn new(scroll_height: usize, viewport: usize) -> Self {
        Self {
            top: scroll_height,
            viewport,
        }
    }

    /// Jumps to the end of `scroll_height` lines of content.
    pub const fn pin_to_bottom(&mut self, scroll_height: usize) {
        self.top = scroll_height;
    }

    /// Moves one line up from the currently visible offset.
    pub fn scroll_up(&mut self, content_height: usize) {
        self.top = self
            .visible_offset(content_height, self.viewport)
            .saturating_sub(1);
    }

    /// Moves one line down. Clamped to the last page when drawn.
    pub fn scroll_down(&mut self, content_height: usize) {
        self.top = self
            .visible_offset(content_height, self.viewport)
            .saturating_add(1);
    }

    /// Records the viewport height of the last draw.
    pub const fn set_viewport(&mut self, viewport: usize) {
        self.viewport = viewport;
    }

    /// Requested offset, which may exceed the last page.
    #[must_use]
    pub const fn top(&self) -> usize {
        self.top
    }

    /// Offset actually shown: clamped so the last page fills the viewport.
    #[must_use]
    pub fn visible_offset(&self, content_height: usize, viewport: usize) -> usize {
        self.top.min(content_height.saturating_sub(viewport))
    }
}
