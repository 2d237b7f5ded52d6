//! Peer list ordered by most recent message, with presence.

use crate::error::Error;
use crate::models::Peer;
use std::cmp::Reverse;
use std::collections::HashSet;

/// Ids of peers currently online.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceSet {
    online: HashSet<String>,
}

impl PresenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_online(&mut self, peer_id: &str, online: bool) {
        if online {
            self.online.insert(peer_id.to_string());
        } else {
            self.online.remove(peer_id);
        }
    }

    pub fn is_online(&self, peer_id: &str) -> bool {
        self.online.contains(peer_id)
    }

    pub fn len(&self) -> usize {
        self.online.len()
    }

    pub fn is_empty(&self) -> bool {
        self.online.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PresenceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            online: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Most recent first. Stable, so equal timestamps keep their input order;
/// peers that never exchanged a message go last.
pub fn sort_by_recent(peers: &mut [Peer]) {
    peers.sort_by_key(|peer| Reverse(peer.last_message_at));
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeerRow<'a> {
    pub peer: &'a Peer,
    pub online: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    PeerSelected(String),
}

#[derive(Debug, Clone, PartialEq)]
enum ListState {
    Loading { previous: Vec<Peer> },
    Ready(Vec<Peer>),
}

/// Conversation list state.
///
/// Peers may be handed in by the caller or fetched by the list itself on
/// mount; both go through [`ConversationListView::replace_peers`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationListView {
    state: ListState,
    selected: Option<String>,
}

impl ConversationListView {
    /// A fresh list shows a progress indicator until peers arrive.
    pub fn new() -> Self {
        Self {
            state: ListState::Loading {
                previous: Vec::new(),
            },
            selected: None,
        }
    }

    pub fn with_peers(peers: Vec<Peer>) -> Self {
        let mut view = Self::new();
        view.replace_peers(peers);
        view
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ListState::Loading { .. })
    }

    pub fn begin_loading(&mut self) {
        if let ListState::Ready(peers) = &mut self.state {
            let previous = std::mem::take(peers);
            self.state = ListState::Loading { previous };
        }
    }

    pub fn replace_peers(&mut self, peers: Vec<Peer>) {
        self.state = ListState::Ready(peers);
    }

    /// Keep whatever was shown before the failed fetch.
    pub fn fetch_failed(&mut self, error: &Error) {
        log::warn!("Failed to fetch peers: {}", error);
        if let ListState::Loading { previous } = &mut self.state {
            let previous = std::mem::take(previous);
            self.state = ListState::Ready(previous);
        }
    }

    pub fn peers(&self) -> &[Peer] {
        match &self.state {
            ListState::Loading { previous } => previous,
            ListState::Ready(peers) => peers,
        }
    }

    pub fn peer(&self, peer_id: &str) -> Option<&Peer> {
        self.peers().iter().find(|p| p.id == peer_id)
    }

    /// Rows in display order. Empty while loading.
    pub fn rows<'a>(&'a self, presence: &PresenceSet) -> Vec<PeerRow<'a>> {
        let ListState::Ready(peers) = &self.state else {
            return Vec::new();
        };

        let mut ordered: Vec<&Peer> = peers.iter().collect();
        ordered.sort_by_key(|peer| Reverse(peer.last_message_at));
        ordered
            .into_iter()
            .map(|peer| PeerRow {
                peer,
                online: peer.online || presence.is_online(&peer.id),
            })
            .collect()
    }

    pub fn select(&mut self, peer_id: &str) -> Option<ListEvent> {
        if self.peer(peer_id).is_none() {
            return None;
        }
        self.selected = Some(peer_id.to_string());
        Some(ListEvent::PeerSelected(peer_id.to_string()))
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Bump a peer's preview after a message was sent or received.
    pub fn touch(&mut self, peer_id: &str, preview: &str, at: chrono::DateTime<chrono::Utc>) {
        let peers = match &mut self.state {
            ListState::Loading { previous } => previous,
            ListState::Ready(peers) => peers,
        };
        if let Some(peer) = peers.iter_mut().find(|p| p.id == peer_id) {
            peer.last_message_preview = preview.to_string();
            peer.last_message_at = Some(at);
        }
    }

    /// Add a peer the list does not know yet, e.g. one opened from search.
    /// Returns false if the peer is already listed.
    pub fn insert(&mut self, peer: Peer) -> bool {
        if self.peer(&peer.id).is_some() {
            return false;
        }
        match &mut self.state {
            ListState::Loading { previous } => previous.push(peer),
            ListState::Ready(peers) => peers.push(peer),
        }
        true
    }
}

impl Default for ConversationListView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn peer(id: &str, minute: Option<u32>) -> Peer {
        let p = Peer::new(id, id.to_uppercase());
        match minute {
            Some(m) => p.with_last_message("hey", Utc.with_ymd_and_hms(2024, 1, 1, 8, m, 0).unwrap()),
            None => p,
        }
    }

    fn ids(rows: &[PeerRow<'_>]) -> Vec<String> {
        rows.iter().map(|r| r.peer.id.clone()).collect()
    }

    #[test]
    fn test_rows_sorted_most_recent_first() {
        let view = ConversationListView::with_peers(vec![
            peer("p1", Some(1)),
            peer("p2", Some(2)),
            peer("p3", Some(3)),
        ]);
        assert_eq!(ids(&view.rows(&PresenceSet::new())), ["p3", "p2", "p1"]);
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let view = ConversationListView::with_peers(vec![
            peer("a", Some(5)),
            peer("b", None),
            peer("c", Some(5)),
            peer("d", Some(9)),
            peer("e", None),
        ]);
        assert_eq!(ids(&view.rows(&PresenceSet::new())), ["d", "a", "c", "b", "e"]);

        let mut raw = view.peers().to_vec();
        sort_by_recent(&mut raw);
        let sorted: Vec<_> = raw.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(sorted, ["d", "a", "c", "b", "e"]);
    }

    #[test]
    fn test_presence_marks_rows() {
        let view = ConversationListView::with_peers(vec![peer("a", Some(1)), peer("b", Some(2))]);
        let presence: PresenceSet = ["a"].into_iter().collect();
        let rows = view.rows(&presence);
        assert!(!rows[0].online);
        assert!(rows[1].online);
    }

    #[test]
    fn test_loading_and_failed_fetch_keep_previous_peers() {
        let mut view = ConversationListView::new();
        assert!(view.is_loading());
        assert!(view.rows(&PresenceSet::new()).is_empty());

        view.replace_peers(vec![peer("a", Some(1))]);
        view.begin_loading();
        assert!(view.is_loading());
        assert!(view.rows(&PresenceSet::new()).is_empty());

        view.fetch_failed(&Error::Api { status: 500 });
        assert!(!view.is_loading());
        assert_eq!(ids(&view.rows(&PresenceSet::new())), ["a"]);
    }

    #[test]
    fn test_select_emits_event_for_known_peer() {
        let mut view = ConversationListView::with_peers(vec![peer("a", None)]);
        assert_eq!(view.select("a"), Some(ListEvent::PeerSelected("a".into())));
        assert_eq!(view.selected(), Some("a"));
        assert_eq!(view.select("ghost"), None);
        assert_eq!(view.selected(), Some("a"));
    }

    #[test]
    fn test_touch_reorders() {
        let mut view = ConversationListView::with_peers(vec![peer("a", Some(1)), peer("b", Some(2))]);
        view.touch("a", "new!", Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
        let rows = view.rows(&PresenceSet::new());
        assert_eq!(ids(&rows), ["a", "b"]);
        assert_eq!(rows[0].peer.last_message_preview, "new!");
    }

    #[test]
    fn test_insert_unknown_peer_once() {
        let mut view = ConversationListView::with_peers(vec![peer("a", Some(1))]);
        assert!(view.insert(peer("b", None)));
        assert!(!view.insert(peer("b", None)));
        assert_eq!(view.peers().len(), 2);
        assert!(view.select("b").is_some());
    }
}
