//! Windowed rendering over the display list: given a scroll offset, a
//! viewport and a uniform estimated row height, only rows inside the
//! visible range plus an overscan margin are materialized. The window is
//! always one contiguous index range within `[0, count)`.

use std::ops::Range;

/// A row materialized by the window, positioned at its cumulative offset
/// from the top of the full (virtual) list.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct WindowRow {
    pub index: usize,
    /// Distance in rows from the top of the virtual list.
    pub top: usize,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ListWindow {
    count: usize,
    row_height: usize,
    overscan: usize,
    viewport_height: usize,
    scroll_offset: usize,
}

impl ListWindow {
    pub fn new(row_height: usize, overscan: usize) -> Self {
        Self {
            count: 0,
            row_height: row_height.max(1),
            overscan,
            viewport_height: 0,
            scroll_offset: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn row_height(&self) -> usize {
        self.row_height
    }

    /// Height of the whole virtual list; keeps scrollbar proportions
    /// honest even though only a window of rows exists.
    pub fn total_height(&self) -> usize {
        self.count * self.row_height
    }

    /// Called whenever the display list identity changes. Shrinking the
    /// list while scrolled past its new end clamps the offset instead of
    /// leaving the window out of range.
    pub fn set_count(&mut self, count: usize) {
        self.count = count;
        self.clamp_scroll();
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
        self.clamp_scroll();
    }

    pub fn set_scroll_offset(&mut self, offset: usize) {
        self.scroll_offset = offset;
        self.clamp_scroll();
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let offset = self.scroll_offset as isize + delta;
        self.scroll_offset = offset.max(0) as usize;
        self.clamp_scroll();
    }

    pub fn scroll_to_row(&mut self, index: usize) {
        if self.count == 0 {
            self.scroll_offset = 0;
            return;
        }
        let index = index.min(self.count - 1);
        let row_top = index * self.row_height;
        let row_bottom = row_top + self.row_height;

        if row_top < self.scroll_offset {
            self.scroll_offset = row_top;
        } else if row_bottom > self.scroll_offset + self.viewport_height {
            self.scroll_offset = row_bottom.saturating_sub(self.viewport_height);
        }
        self.clamp_scroll();
    }

    fn max_scroll_offset(&self) -> usize {
        self.total_height().saturating_sub(self.viewport_height)
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
    }

    /// The contiguous `[start, end)` index range to materialize: the rows
    /// intersecting the viewport, widened by `overscan` rows on each side
    /// and clamped to the list bounds.
    pub fn visible_range(&self) -> Range<usize> {
        if self.count == 0 || self.viewport_height == 0 {
            return 0..0;
        }

        let first_visible = self.scroll_offset / self.row_height;
        let last_offset = self.scroll_offset + self.viewport_height - 1;
        let last_visible = (last_offset / self.row_height).min(self.count - 1);

        let start = first_visible.saturating_sub(self.overscan);
        let end = (last_visible + 1 + self.overscan).min(self.count);
        start..end
    }

    /// Materialized rows with their absolute offsets in the virtual list.
    pub fn rows(&self) -> Vec<WindowRow> {
        self.visible_range()
            .map(|index| WindowRow {
                index,
                top: index * self.row_height,
            })
            .collect()
    }

    /// Viewport-relative vertical position of a row, in rows. Negative
    /// when the row sits partially above the viewport (overscan).
    pub fn row_screen_top(&self, index: usize) -> isize {
        (index * self.row_height) as isize - self.scroll_offset as isize
    }
}
