use crate::core::ActorId;
use crate::reconcile::{FakeRow, RowCounts, filter_rows};
use crate::selection::{DisplayRow, Pager, SelectionModel};
use serde::Serialize;
use tokio::sync::oneshot;

/// Everything that may change what the operator sees. Applied one at a time
/// by the display consumer.
#[derive(Debug)]
pub enum Update {
    Snapshot(Vec<FakeRow>),
    Status(String),
    Search(String),
    Page(usize),
    Pin(ActorId),
    Unpin(ActorId),
    SelectPage,
    SelectFiltered,
    ClearSelection,
    /// Identities returned by a create command.
    PinCreated(Vec<ActorId>),
    PinnedQuery(oneshot::Sender<Vec<ActorId>>),
}

/// Published copy of the console state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsoleView {
    pub rows: Vec<DisplayRow>,
    pub counts: RowCounts,
    pub filtered: usize,
    pub page: usize,
    pub pages: usize,
    pub search: String,
    pub pinned: Vec<ActorId>,
    pub commands_enabled: bool,
    pub status: Option<String>,
    /// Number of snapshots applied so far.
    pub generation: u64,
}

/// State owned by the display consumer.
#[derive(Debug, Clone)]
pub struct ConsoleState {
    rows: Vec<FakeRow>,
    filtered: Vec<FakeRow>,
    search: String,
    pager: Pager,
    selection: SelectionModel,
    counts: RowCounts,
    status: Option<String>,
    generation: u64,
}

impl ConsoleState {
    pub fn new(page_size: usize) -> Self {
        Self {
            rows: Vec::new(),
            filtered: Vec::new(),
            search: String::new(),
            pager: Pager::new(page_size),
            selection: SelectionModel::new(),
            counts: RowCounts::default(),
            status: None,
            generation: 0,
        }
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Spawn, despawn and delete need at least one pinned target.
    pub fn commands_enabled(&self) -> bool {
        self.selection.has_pinned()
    }

    pub fn apply(&mut self, update: Update) {
        match update {
            Update::Snapshot(rows) => {
                self.counts = RowCounts::of(&rows);
                self.rows = rows;
                self.generation += 1;
                self.rebuild();
            }
            Update::Status(message) => self.status = Some(message),
            Update::Search(text) => {
                if text != self.search {
                    self.search = text;
                    self.pager.reset();
                    self.rebuild();
                }
            }
            Update::Page(page) => {
                self.pager.set_page(page, self.filtered.len());
                self.rebuild();
            }
            Update::Pin(id) => {
                self.selection.pin(id);
            }
            Update::Unpin(id) => {
                self.selection.unpin(id);
            }
            Update::SelectPage => {
                let count = self.selection.set_pinned_for_all_rows(true);
                self.status = Some(format!("Selected page ({}).", count));
            }
            Update::SelectFiltered => {
                let ids: Vec<ActorId> = self.filtered.iter().map(|row| row.id).collect();
                let count = self.selection.set_pinned_for_ids(&ids, true);
                self.status = Some(format!("Selected filtered ({}).", count));
            }
            Update::ClearSelection => {
                self.selection.clear_pins();
                self.status = Some("Selection cleared.".to_string());
            }
            Update::PinCreated(ids) => {
                self.selection.set_pinned_for_ids(&ids, true);
            }
            Update::PinnedQuery(reply) => {
                let _ = reply.send(self.selection.pinned_ids());
            }
        }
    }

    fn rebuild(&mut self) {
        self.filtered = filter_rows(&self.rows, Some(self.search.as_str()));
        let window = self.pager.window(&self.filtered).to_vec();
        self.selection.set_data(window);
    }

    pub fn view(&self) -> ConsoleView {
        ConsoleView {
            rows: self.selection.display_rows(),
            counts: self.counts,
            filtered: self.filtered.len(),
            page: self.pager.current(),
            pages: self.pager.pages(self.filtered.len()),
            search: self.search.clone(),
            pinned: self.selection.pinned_ids(),
            commands_enabled: self.commands_enabled(),
            status: self.status.clone(),
            generation: self.generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ClassProfile, Position};

    fn rows(count: i64) -> Vec<FakeRow> {
        (1..=count)
            .map(|id| FakeRow {
                id: ActorId(id),
                name: format!("Bot{}", id),
                class_profile: Some(ClassProfile::new(
                    0,
                    if id % 2 == 0 { "CLERIC" } else { "WARRIOR" },
                )),
                level: 1,
                position: Position::default(),
                online: id <= 2,
                state_label: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_snapshot_updates_counts_and_window() {
        let mut state = ConsoleState::new(10);
        state.apply(Update::Snapshot(rows(15)));
        let view = state.view();
        assert_eq!(view.counts, RowCounts { online: 2, offline: 13 });
        assert_eq!(view.rows.len(), 10);
        assert_eq!(view.pages, 2);
        assert_eq!(view.generation, 1);
        assert!(!view.commands_enabled);
    }

    #[test]
    fn test_search_resets_page() {
        let mut state = ConsoleState::new(5);
        state.apply(Update::Snapshot(rows(15)));
        state.apply(Update::Page(2));
        assert_eq!(state.view().page, 2);

        state.apply(Update::Search("cleric".into()));
        let view = state.view();
        assert_eq!(view.page, 0);
        assert_eq!(view.filtered, 7);
    }

    #[test]
    fn test_select_filtered_pins_beyond_page() {
        let mut state = ConsoleState::new(5);
        state.apply(Update::Snapshot(rows(15)));
        state.apply(Update::Search("warrior".into()));
        state.apply(Update::SelectFiltered);

        let view = state.view();
        assert_eq!(view.pinned.len(), 8);
        assert_eq!(view.status.as_deref(), Some("Selected filtered (8)."));
        assert!(view.commands_enabled);
    }

    #[test]
    fn test_pins_survive_snapshots() {
        let mut state = ConsoleState::new(5);
        state.apply(Update::Snapshot(rows(15)));
        state.apply(Update::SelectPage);
        assert_eq!(state.view().status.as_deref(), Some("Selected page (5)."));

        state.apply(Update::Snapshot(Vec::new()));
        assert_eq!(state.view().pinned.len(), 5);

        state.apply(Update::ClearSelection);
        assert!(state.view().pinned.is_empty());
        assert!(!state.commands_enabled());
    }

    #[test]
    fn test_page_clamps_after_shrinking_snapshot() {
        let mut state = ConsoleState::new(5);
        state.apply(Update::Snapshot(rows(15)));
        state.apply(Update::Page(2));
        state.apply(Update::Snapshot(rows(4)));
        let view = state.view();
        assert_eq!(view.page, 0);
        assert_eq!(view.rows.len(), 4);
    }
}
