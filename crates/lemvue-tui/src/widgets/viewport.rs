//! Selection plus scroll offset for a row list.
//!
//! The offset is the first visible row. Moving the selection drags the
//! offset along so the selected row stays on screen; the visible height is
//! learned at render time.

use std::cell::Cell;

use lemvue_core::Viewport;
use ratatui::widgets::ListState;

#[derive(Debug, Default)]
pub struct ListViewport {
    selected: usize,
    offset: usize,
    len: usize,
    height: Cell<usize>,
}

impl ListViewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// New row count. Selection and offset are clamped to it.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.selected = self.selected.min(len.saturating_sub(1));
        self.offset = self.offset.min(self.selected);
    }

    /// Record the number of rows that fit; called from `render`.
    pub fn set_height(&self, height: usize) {
        self.height.set(height);
    }

    pub fn move_by(&mut self, delta: isize) {
        if self.len == 0 {
            return;
        }
        let last = self.len - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
        self.follow_selection();
    }

    pub fn first(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    pub fn last(&mut self) {
        self.selected = self.len.saturating_sub(1);
        self.follow_selection();
    }

    /// Rows per page, at least one.
    pub fn page(&self) -> isize {
        isize::try_from(self.height.get().max(1)).unwrap_or(isize::MAX)
    }

    /// Snapshot for ratatui's `List`.
    pub fn state(&self) -> ListState {
        let mut state = ListState::default().with_offset(self.offset);
        if self.len > 0 {
            state.select(Some(self.selected));
        }
        state
    }

    fn follow_selection(&mut self) {
        let height = self.height.get().max(1);
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected + 1 - height;
        }
    }
}

impl Viewport for ListViewport {
    fn offset(&self) -> usize {
        self.offset
    }

    fn scroll_to(&mut self, offset: usize) {
        let offset = offset.min(self.len.saturating_sub(1));
        self.offset = offset;
        self.selected = offset;
    }
}
