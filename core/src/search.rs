//! User search with a debounced query and an editable history.

use crate::debounce::{DebounceGate, Ticket};
use crate::error::Error;
use crate::models::{HistoryEntry, Peer};
use crate::optimistic::{OptimisticList, Removal};

pub const NO_USERS_FOUND: &str = "No users found";

#[derive(Debug)]
pub struct SearchView {
    query: String,
    gate: DebounceGate<String>,
    in_flight: Option<String>,
    results: Vec<Peer>,
    searched: bool,
    history: OptimisticList<HistoryEntry>,
}

impl SearchView {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            gate: DebounceGate::new(),
            in_flight: None,
            results: Vec::new(),
            searched: false,
            history: OptimisticList::default(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Record a keystroke. The returned ticket settles after the debounce
    /// delay unless another keystroke supersedes it.
    pub fn set_query(&mut self, query: impl Into<String>) -> Ticket {
        self.query = query.into();
        self.gate.push(self.query.trim().to_string())
    }

    /// The query to send, if `ticket` is still current and non-blank.
    /// A blank settled query clears the results instead.
    pub fn settle(&mut self, ticket: Ticket) -> Option<String> {
        let query = self.gate.settle(ticket)?;
        if query.is_empty() {
            self.in_flight = None;
            self.results.clear();
            self.searched = false;
            return None;
        }
        self.in_flight = Some(query.clone());
        Some(query)
    }

    /// Apply results for `query`. Responses for a query that is no longer
    /// in flight are dropped.
    pub fn show_results(&mut self, query: &str, users: Vec<Peer>) -> bool {
        if self.in_flight.as_deref() != Some(query) {
            log::debug!("Dropping stale search results for {:?}", query);
            return false;
        }
        self.in_flight = None;
        self.results = users;
        self.searched = true;
        true
    }

    /// Keep the previous results.
    pub fn results_failed(&mut self, query: &str, error: &Error) {
        log::warn!("Search for {:?} failed: {}", query, error);
        if self.in_flight.as_deref() == Some(query) {
            self.in_flight = None;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn results(&self) -> &[Peer] {
        &self.results
    }

    pub fn empty_label(&self) -> Option<&'static str> {
        (self.searched && self.results.is_empty() && !self.is_loading()).then_some(NO_USERS_FOUND)
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.items()
    }

    pub fn history_loaded(&mut self, entries: Vec<HistoryEntry>) {
        self.history.replace(entries);
    }

    pub fn history_failed(&mut self, error: &Error) {
        log::warn!("Failed to load search history: {}", error);
    }

    /// Remove a history entry before the remote delete is confirmed.
    pub fn remove_history(&mut self, history_id: &str) -> Option<Removal<HistoryEntry>> {
        self.history.remove(history_id)
    }

    /// The remote delete failed: put the entry back where it was.
    pub fn restore_history(&mut self, removal: Removal<HistoryEntry>, error: &Error) {
        log::warn!(
            "Failed to delete search history item {}: {}",
            removal.item.id,
            error
        );
        self.history.rollback(removal);
    }

    /// Leaving the screen: a pending keystroke never fires.
    pub fn teardown(&mut self) {
        self.gate.teardown();
        self.in_flight = None;
    }
}

impl Default for SearchView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            user: Peer::new(format!("user-{id}"), id),
            created_at: None,
        }
    }

    #[test]
    fn test_only_last_keystroke_is_sent() {
        let mut search = SearchView::new();
        let t1 = search.set_query("a");
        let t2 = search.set_query("al");
        let t3 = search.set_query("ali ");

        assert_eq!(search.settle(t1), None);
        assert_eq!(search.settle(t2), None);
        assert_eq!(search.settle(t3), Some("ali".to_string()));
        assert!(search.is_loading());
        assert_eq!(search.query(), "ali ");
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let mut search = SearchView::new();
        let t = search.set_query("bo");
        search.settle(t);
        let t = search.set_query("bob");
        search.settle(t);

        assert!(!search.show_results("bo", vec![Peer::new("1", "bo")]));
        assert!(search.show_results("bob", vec![Peer::new("2", "bob")]));
        assert_eq!(search.results().len(), 1);
        assert_eq!(search.results()[0].id, "2");
    }

    #[test]
    fn test_empty_label_after_no_results() {
        let mut search = SearchView::new();
        assert_eq!(search.empty_label(), None);

        let t = search.set_query("zz");
        search.settle(t);
        assert_eq!(search.empty_label(), None);
        search.show_results("zz", vec![]);
        assert_eq!(search.empty_label(), Some(NO_USERS_FOUND));

        let t = search.set_query("   ");
        assert_eq!(search.settle(t), None);
        assert_eq!(search.empty_label(), None);
    }

    #[test]
    fn test_failed_search_keeps_previous_results() {
        let mut search = SearchView::new();
        let t = search.set_query("ann");
        search.settle(t);
        search.show_results("ann", vec![Peer::new("1", "ann")]);

        let t = search.set_query("anna");
        search.settle(t);
        search.results_failed("anna", &Error::Api { status: 502 });
        assert!(!search.is_loading());
        assert_eq!(search.results()[0].display_name, "ann");
    }

    #[test]
    fn test_history_delete_rolls_back_on_failure() {
        let mut search = SearchView::new();
        search.history_loaded(vec![entry("h0"), entry("h1"), entry("h2")]);

        let removal = search.remove_history("h1").unwrap();
        let ids: Vec<_> = search.history().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["h0", "h2"]);

        search.restore_history(removal, &Error::Http("timeout".into()));
        let ids: Vec<_> = search.history().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["h0", "h1", "h2"]);
    }

    #[test]
    fn test_teardown_drops_pending_keystroke() {
        let mut search = SearchView::new();
        let t = search.set_query("late");
        search.teardown();
        assert_eq!(search.settle(t), None);
    }

    #[test]
    fn test_search_works_again_after_reentry() {
        let mut search = SearchView::new();
        let t = search.set_query("ann");
        assert_eq!(search.settle(t), Some("ann".to_string()));

        search.teardown();

        let t = search.set_query("bob");
        assert_eq!(search.settle(t), Some("bob".to_string()));
        assert!(search.show_results("bob", vec![Peer::new("2", "bob")]));
        assert_eq!(search.results()[0].id, "2");
    }
}
