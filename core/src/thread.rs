//! Message thread for one peer, plus the per-message detail drawer.

use crate::attachment::AttachmentPreview;
use crate::models::{ConversationIndex, Message, MessageStatus};
use crate::time_format::{format_date_time, relative_age};
use chrono::{DateTime, Utc};

pub const NO_PEER_SELECTED: &str = "Select a user to start chatting";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Sent by the current user.
    Right,
    Left,
}

/// Delivery icon shown under the current user's own messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Pending,
    Saved,
    Delivered,
    Read,
}

impl From<MessageStatus> for StatusIcon {
    fn from(status: MessageStatus) -> Self {
        match status {
            MessageStatus::Pending => Self::Pending,
            MessageStatus::Saved => Self::Saved,
            MessageStatus::Delivered => Self::Delivered,
            MessageStatus::Read => Self::Read,
        }
    }
}

impl StatusIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Pending => "\u{1F552}",
            Self::Saved => "\u{2713}",
            Self::Delivered => "\u{2713}\u{2713}",
            Self::Read => "\u{2713}\u{2713}",
        }
    }

    /// Read receipts are drawn in the accent colour.
    pub fn is_highlighted(self) -> bool {
        self == Self::Read
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageRow {
    /// Position in the conversation, stable for the life of the render.
    pub index: usize,
    pub message_id: Option<String>,
    pub side: Side,
    pub text: String,
    pub attachment: Option<AttachmentPreview>,
    pub status_icon: Option<StatusIcon>,
    pub sent_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThreadView {
    NoPeerSelected,
    /// Possibly empty; an empty conversation has no placeholder.
    Conversation(Vec<MessageRow>),
}

impl ThreadView {
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::NoPeerSelected => Some(NO_PEER_SELECTED),
            Self::Conversation(_) => None,
        }
    }
}

pub struct MessageThreadView;

impl MessageThreadView {
    pub fn render(
        current_user_id: &str,
        selected_peer: Option<&str>,
        conversations: &ConversationIndex,
        now: DateTime<Utc>,
    ) -> ThreadView {
        let Some(peer_id) = selected_peer else {
            return ThreadView::NoPeerSelected;
        };

        let rows = conversations
            .messages(peer_id)
            .iter()
            .enumerate()
            .map(|(index, message)| Self::row(index, current_user_id, message, now))
            .collect();

        ThreadView::Conversation(rows)
    }

    fn row(index: usize, current_user_id: &str, message: &Message, now: DateTime<Utc>) -> MessageRow {
        let own = message.sender_id == current_user_id;

        MessageRow {
            index,
            message_id: message.id.clone(),
            side: if own { Side::Right } else { Side::Left },
            text: message.text.clone(),
            attachment: message.attachment.as_ref().map(AttachmentPreview::from_attachment),
            status_icon: own.then(|| message.status().into()),
            sent_label: relative_age(message.sent_at, now),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    Sent,
    Delivered,
    Read,
}

impl DetailField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Sent => "Sent",
            Self::Delivered => "Delivered",
            Self::Read => "Read",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailEntry {
    pub field: DetailField,
    pub at: DateTime<Utc>,
}

impl DetailEntry {
    pub fn formatted(&self) -> String {
        format_date_time(self.at)
    }
}

pub struct MessageDetail;

impl MessageDetail {
    /// Present timestamps only, in Sent, Delivered, Read order.
    pub fn for_message(message: &Message) -> Vec<DetailEntry> {
        [
            (DetailField::Sent, Some(message.sent_at)),
            (DetailField::Delivered, message.delivered_at),
            (DetailField::Read, message.read_at),
        ]
        .into_iter()
        .filter_map(|(field, at)| at.map(|at| DetailEntry { field, at }))
        .collect()
    }
}

/// Which message, if any, the detail drawer shows.
///
/// Messages are addressed by their position in the open conversation since
/// locally composed ones may not have a server id yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailDrawer {
    selected: Option<usize>,
}

impl DetailDrawer {
    pub fn open(&mut self, index: usize) {
        self.selected = Some(index);
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Entries for the selected message of `peer_id`'s conversation.
    pub fn entries(&self, conversations: &ConversationIndex, peer_id: &str) -> Option<Vec<DetailEntry>> {
        let index = self.selected?;
        conversations
            .messages(peer_id)
            .get(index)
            .map(MessageDetail::for_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attachment;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 10, 18, minute, 0).unwrap()
    }

    fn index() -> ConversationIndex {
        let mut index = ConversationIndex::new();
        index.append_message("bob", Message::new("me", "hi bob", at(0)).with_id("1").saved());
        index.append_message(
            "bob",
            Message::new("bob", "look", at(1))
                .with_id("2")
                .with_attachment(Attachment::new("https://cdn/x/beach.JPG")),
        );
        index.append_message(
            "bob",
            Message::new("me", "nice", at(2))
                .with_id("3")
                .delivered_at(at(3))
                .read_at(at(4)),
        );
        index.append_message("carol", Message::new("carol", "other thread", at(5)));
        index
    }

    #[test]
    fn test_no_peer_selected_shows_placeholder() {
        let view = MessageThreadView::render("me", None, &index(), at(10));
        assert_eq!(view, ThreadView::NoPeerSelected);
        assert_eq!(view.placeholder(), Some(NO_PEER_SELECTED));
    }

    #[test]
    fn test_empty_conversation_has_no_placeholder() {
        let view = MessageThreadView::render("me", Some("dave"), &index(), at(10));
        assert_eq!(view, ThreadView::Conversation(vec![]));
        assert_eq!(view.placeholder(), None);
    }

    #[test]
    fn test_rows_for_selected_peer_only() {
        let ThreadView::Conversation(rows) = MessageThreadView::render("me", Some("bob"), &index(), at(10)) else {
            panic!("expected a conversation");
        };
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.iter().map(|r| r.text.as_str()).collect::<Vec<_>>(), ["hi bob", "look", "nice"]);

        assert_eq!(rows[0].side, Side::Right);
        assert_eq!(rows[0].status_icon, Some(StatusIcon::Saved));

        assert_eq!(rows[1].side, Side::Left);
        assert_eq!(rows[1].status_icon, None);
        let preview = rows[1].attachment.as_ref().unwrap();
        assert_eq!(preview.kind, crate::attachment::AttachmentKind::Image);
        assert_eq!(preview.size_label, "N/A");

        assert_eq!(rows[2].status_icon, Some(StatusIcon::Read));
        assert!(rows[2].status_icon.unwrap().is_highlighted());
        assert_eq!(rows[2].sent_label, "8m");
    }

    #[test]
    fn test_detail_omits_absent_fields() {
        let idx = index();
        let sent_only = MessageDetail::for_message(&idx.messages("bob")[0]);
        assert_eq!(sent_only.len(), 1);
        assert_eq!(sent_only[0].field, DetailField::Sent);

        let full = MessageDetail::for_message(&idx.messages("bob")[2]);
        let fields: Vec<_> = full.iter().map(|e| e.field).collect();
        assert_eq!(fields, [DetailField::Sent, DetailField::Delivered, DetailField::Read]);
        assert_eq!(full[2].at, at(4));
    }

    #[test]
    fn test_drawer_open_close_resets_selection() {
        let idx = index();
        let mut drawer = DetailDrawer::default();
        assert!(drawer.entries(&idx, "bob").is_none());

        drawer.open(2);
        assert!(drawer.is_open());
        assert_eq!(drawer.entries(&idx, "bob").unwrap().len(), 3);
        assert!(drawer.entries(&idx, "carol").is_none());

        drawer.close();
        assert!(!drawer.is_open());
        assert_eq!(drawer.selected(), None);
    }
}
