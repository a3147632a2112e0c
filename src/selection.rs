//! Operator selection: the pinned identity set, the displayed window and the
//! pager that cuts that window out of the filtered rows.

use crate::core::ActorId;
use crate::reconcile::FakeRow;
use serde::Serialize;
use std::collections::BTreeSet;

/// Pinned identities plus the rows currently on screen.
///
/// Pins are independent of the window: replacing the window never drops a
/// pin, and only `unpin`/`clear_pins` remove one.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    pinned: BTreeSet<ActorId>,
    window: Vec<FakeRow>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the id was not pinned yet.
    pub fn pin(&mut self, id: ActorId) -> bool {
        self.pinned.insert(id)
    }

    /// Returns `true` if the id was pinned.
    pub fn unpin(&mut self, id: ActorId) -> bool {
        self.pinned.remove(&id)
    }

    pub fn is_pinned(&self, id: ActorId) -> bool {
        self.pinned.contains(&id)
    }

    /// Owned copy, ordered by identity.
    pub fn pinned_ids(&self) -> Vec<ActorId> {
        self.pinned.iter().copied().collect()
    }

    pub fn has_pinned(&self) -> bool {
        !self.pinned.is_empty()
    }

    pub fn pinned_count(&self) -> usize {
        self.pinned.len()
    }

    pub fn set_data(&mut self, rows: Vec<FakeRow>) {
        self.window = rows;
    }

    pub fn window(&self) -> &[FakeRow] {
        &self.window
    }

    /// Applies `value` to every row of the current window and returns how
    /// many rows it touched.
    pub fn set_pinned_for_all_rows(&mut self, value: bool) -> usize {
        let ids: Vec<ActorId> = self.window.iter().map(|row| row.id).collect();
        self.set_pinned_for_ids(&ids, value)
    }

    pub fn set_pinned_for_ids(&mut self, ids: &[ActorId], value: bool) -> usize {
        for &id in ids {
            if value {
                self.pinned.insert(id);
            } else {
                self.pinned.remove(&id);
            }
        }
        ids.len()
    }

    pub fn clear_pins(&mut self) {
        self.pinned.clear();
    }

    pub fn display_rows(&self) -> Vec<DisplayRow> {
        self.window
            .iter()
            .map(|row| DisplayRow::render(row, self.is_pinned(row.id)))
            .collect()
    }
}

/// Page window over a row list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pager {
    page_size: usize,
    current: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// At least one page, even for an empty list.
    pub fn pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    pub fn set_page(&mut self, page: usize, total: usize) {
        self.current = page.min(self.pages(total) - 1);
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }

    pub fn clamp(&mut self, total: usize) {
        self.set_page(self.current, total);
    }

    pub fn next(&mut self, total: usize) {
        self.set_page(self.current + 1, total);
    }

    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Clamps the current page to `rows`, then returns that page's slice.
    pub fn window<'a>(&mut self, rows: &'a [FakeRow]) -> &'a [FakeRow] {
        self.clamp(rows.len());
        let start = (self.current * self.page_size).min(rows.len());
        let end = (start + self.page_size).min(rows.len());
        &rows[start..end]
    }
}

/// One window row as the operator sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub id: ActorId,
    pub pinned: bool,
    pub badge: &'static str,
    pub name: String,
    pub class: String,
    pub level: i64,
    pub state: String,
}

impl DisplayRow {
    pub fn render(row: &FakeRow, pinned: bool) -> Self {
        let badge = if row.online { "ONLINE" } else { "OFFLINE" };
        let state = if row.state_label.trim().is_empty() {
            badge.to_string()
        } else {
            row.state_label.clone()
        };
        Self {
            id: row.id,
            pinned,
            badge,
            name: row.name.clone(),
            class: row.class_display(),
            level: row.level,
            state,
        }
    }
}
