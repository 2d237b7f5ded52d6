//! Data models for Murmur

use crate::time_format::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Peers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "username")]
    pub display_name: String,
    #[serde(default, alias = "profilePicture")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub online: bool,
    #[serde(default, alias = "lastMessage")]
    pub last_message_preview: String,
    #[serde(default, with = "lenient::option")]
    pub last_message_at: Option<DateTime<Utc>>,
}

impl Peer {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            avatar_url: None,
            online: false,
            last_message_preview: String::new(),
            last_message_at: None,
        }
    }

    pub fn with_last_message(mut self, preview: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.last_message_preview = preview.into();
        self.last_message_at = Some(at);
        self
    }

    /// First letter of the display name, used for avatar placeholders.
    pub fn initial(&self) -> String {
        self.display_name
            .chars()
            .next()
            .unwrap_or('?')
            .to_uppercase()
            .to_string()
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Delivery state of a message.
///
/// Ordered `Pending < Saved < Delivered < Read`; a message only ever moves
/// forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Pending,
    Saved,
    Delivered,
    Read,
}

impl MessageStatus {
    /// Highest-precedence field wins: read > delivered > saved > pending.
    pub fn derive(
        read_at: Option<DateTime<Utc>>,
        delivered_at: Option<DateTime<Utc>>,
        saved_locally: bool,
    ) -> Self {
        if read_at.is_some() {
            Self::Read
        } else if delivered_at.is_some() {
            Self::Delivered
        } else if saved_locally {
            Self::Saved
        } else {
            Self::Pending
        }
    }
}

impl Default for MessageStatus {
    fn default() -> Self {
        Self::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(alias = "fileUrl")]
    pub url: String,
    #[serde(default, alias = "fileName")]
    pub name: Option<String>,
    #[serde(default, alias = "fileSize")]
    pub size_bytes: Option<u64>,
}

impl Attachment {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
            size_bytes: None,
        }
    }
}

/// A message as received from the collaborator.
///
/// `status` is derived once, when the message is built or deserialized, and
/// afterwards only advanced by [`Message::apply_receipt`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WireMessage")]
pub struct Message {
    pub id: Option<String>,
    pub sender_id: String,
    pub text: String,
    #[serde(with = "lenient")]
    pub sent_at: DateTime<Utc>,
    #[serde(with = "lenient::option")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(with = "lenient::option")]
    pub read_at: Option<DateTime<Utc>>,
    pub saved_locally: bool,
    pub attachment: Option<Attachment>,
    status: MessageStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    #[serde(default, alias = "_id")]
    id: Option<String>,
    #[serde(alias = "sender")]
    sender_id: String,
    #[serde(default, alias = "content")]
    text: String,
    #[serde(with = "lenient", alias = "createdAt")]
    sent_at: DateTime<Utc>,
    #[serde(default, with = "lenient::option")]
    delivered_at: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient::option")]
    read_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "saved")]
    saved_locally: bool,
    #[serde(default)]
    attachment: Option<Attachment>,
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        let mut message = Message::new(wire.sender_id, wire.text, wire.sent_at);
        message.id = wire.id;
        message.delivered_at = wire.delivered_at;
        message.read_at = wire.read_at;
        message.saved_locally = wire.saved_locally;
        message.attachment = wire.attachment;
        message.refresh_status();
        message
    }
}

impl Message {
    pub fn new(sender_id: impl Into<String>, text: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            sender_id: sender_id.into(),
            text: text.into(),
            sent_at,
            delivered_at: None,
            read_at: None,
            saved_locally: false,
            attachment: None,
            status: MessageStatus::Pending,
        }
    }

    /// A locally composed message that has not reached the server yet.
    pub fn pending(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        let mut message = Self::new(sender_id, text, Utc::now());
        message.id = Some(uuid::Uuid::new_v4().to_string());
        message
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn saved(mut self) -> Self {
        self.saved_locally = true;
        self.refresh_status();
        self
    }

    pub fn delivered_at(mut self, at: DateTime<Utc>) -> Self {
        self.delivered_at = Some(at);
        self.refresh_status();
        self
    }

    pub fn read_at(mut self, at: DateTime<Utc>) -> Self {
        self.read_at = Some(at);
        self.refresh_status();
        self
    }

    pub fn status(&self) -> MessageStatus {
        self.status
    }

    /// Merge receipt timestamps. The status never moves backward.
    pub fn apply_receipt(&mut self, receipt: &ReceiptUpdate) {
        if receipt.delivered_at.is_some() {
            self.delivered_at = receipt.delivered_at;
        }
        if receipt.read_at.is_some() {
            self.read_at = receipt.read_at;
        }
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        let derived = MessageStatus::derive(self.read_at, self.delivered_at, self.saved_locally);
        self.status = self.status.max(derived);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptUpdate {
    pub peer_id: String,
    pub message_id: String,
    #[serde(default, with = "lenient::option")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient::option")]
    pub read_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Conversations
// ============================================================================

/// Messages per peer id, each in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationIndex {
    conversations: HashMap<String, Vec<Message>>,
}

impl ConversationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self, peer_id: &str) -> &[Message] {
        self.conversations
            .get(peer_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn replace(&mut self, peer_id: impl Into<String>, messages: Vec<Message>) {
        self.conversations.insert(peer_id.into(), messages);
    }

    pub fn append_message(&mut self, peer_id: impl Into<String>, message: Message) {
        self.conversations
            .entry(peer_id.into())
            .or_default()
            .push(message);
    }

    /// Swap a locally composed message for the server's copy, matched by id.
    pub fn confirm(&mut self, peer_id: &str, local_id: &str, confirmed: Message) -> bool {
        let Some(messages) = self.conversations.get_mut(peer_id) else {
            return false;
        };
        match messages
            .iter_mut()
            .find(|m| m.id.as_deref() == Some(local_id))
        {
            Some(slot) => {
                *slot = confirmed;
                true
            }
            None => false,
        }
    }

    /// Returns false when the message is unknown.
    pub fn apply_receipt(&mut self, receipt: &ReceiptUpdate) -> bool {
        let Some(messages) = self.conversations.get_mut(&receipt.peer_id) else {
            return false;
        };
        match messages
            .iter_mut()
            .find(|m| m.id.as_deref() == Some(receipt.message_id.as_str()))
        {
            Some(message) => {
                message.apply_receipt(receipt);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.conversations.clear();
    }
}

// ============================================================================
// Search
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "searchedUser")]
    pub user: Peer,
    #[serde(default, with = "lenient::option")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub users: Vec<Peer>,
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Like,
    Comment,
    Follow,
    FollowRequest,
    Mention,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default, alias = "sender")]
    pub actor: Option<Peer>,
    #[serde(default)]
    pub message: String,
    #[serde(default, with = "lenient::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl Notification {
    /// Follow-request id to answer, if this notification is one.
    pub fn follow_request_id(&self) -> Option<&str> {
        match self.kind {
            NotificationKind::FollowRequest => {
                Some(self.request_id.as_deref().unwrap_or(self.id.as_str()))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowDecision {
    Accepted,
    Rejected,
}

// ============================================================================
// Profile
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
}

impl ThemePreference {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl Default for ThemePreference {
    fn default() -> Self {
        Self::Light
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub theme: ThemePreference,
}

// ============================================================================
// API envelopes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: T,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiAck {
    #[serde(default = "default_success")]
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap()
    }

    #[test]
    fn test_status_precedence() {
        let both = Message::new("me", "hi", at(0))
            .saved()
            .delivered_at(at(1))
            .read_at(at(2));
        assert_eq!(both.status(), MessageStatus::Read);

        let saved = Message::new("me", "hi", at(0)).saved();
        assert_eq!(saved.status(), MessageStatus::Saved);

        let plain = Message::new("me", "hi", at(0));
        assert_eq!(plain.status(), MessageStatus::Pending);
    }

    #[test]
    fn test_status_derived_on_deserialize() {
        let msg: Message = serde_json::from_str(
            r#"{
                "_id": "m1",
                "senderId": "u1",
                "text": "hello",
                "sentAt": "2024-05-01T10:00:00Z",
                "deliveredAt": "2024-05-01T10:00:05Z",
                "readAt": "2024-05-01T10:03:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(msg.id.as_deref(), Some("m1"));
        assert_eq!(msg.status(), MessageStatus::Read);
    }

    #[test]
    fn test_receipt_never_downgrades() {
        let mut msg = Message::new("me", "hi", at(0)).with_id("m1").read_at(at(3));
        msg.apply_receipt(&ReceiptUpdate {
            peer_id: "p".into(),
            message_id: "m1".into(),
            delivered_at: Some(at(4)),
            read_at: None,
        });
        assert_eq!(msg.status(), MessageStatus::Read);
        assert_eq!(msg.read_at, Some(at(3)));
    }

    #[test]
    fn test_conversation_index_receipts_and_confirm() {
        let mut index = ConversationIndex::new();
        let local = Message::pending("me", "on my way");
        let local_id = local.id.clone().unwrap();
        index.append_message("p1", local);

        let confirmed = Message::new("me", "on my way", at(5)).with_id("srv-1").saved();
        assert!(index.confirm("p1", &local_id, confirmed));
        assert_eq!(index.messages("p1")[0].status(), MessageStatus::Saved);

        let receipt = ReceiptUpdate {
            peer_id: "p1".into(),
            message_id: "srv-1".into(),
            delivered_at: Some(at(6)),
            read_at: None,
        };
        assert!(index.apply_receipt(&receipt));
        assert_eq!(index.messages("p1")[0].status(), MessageStatus::Delivered);

        assert!(index.messages("nobody").is_empty());
        assert!(!index.apply_receipt(&ReceiptUpdate {
            peer_id: "nobody".into(),
            ..receipt
        }));
    }

    #[test]
    fn test_peer_wire_format() {
        let peer: Peer = serde_json::from_str(
            r#"{"_id":"u7","username":"ana","lastMessageAt":"2024-05-01 10:02:00"}"#,
        )
        .unwrap();
        assert_eq!(peer.id, "u7");
        assert_eq!(peer.display_name, "ana");
        assert_eq!(peer.last_message_at, Some(at(2)));
        assert!(!peer.online);
        assert_eq!(peer.initial(), "A");
    }

    #[test]
    fn test_follow_request_id() {
        let n: Notification = serde_json::from_str(
            r#"{"id":"n1","type":"follow_request","requestId":"r9"}"#,
        )
        .unwrap();
        assert_eq!(n.follow_request_id(), Some("r9"));

        let like: Notification =
            serde_json::from_str(r#"{"id":"n2","type":"like"}"#).unwrap();
        assert_eq!(like.follow_request_id(), None);

        let unknown: Notification =
            serde_json::from_str(r#"{"id":"n3","type":"repost"}"#).unwrap();
        assert_eq!(unknown.kind, NotificationKind::Other);
    }

    #[test]
    fn test_theme_wire_and_toggle() {
        assert_eq!(serde_json::to_string(&ThemePreference::Dark).unwrap(), "\"dark\"");
        assert_eq!(ThemePreference::Light.toggled(), ThemePreference::Dark);
        assert_eq!(
            serde_json::to_string(&FollowDecision::Accepted).unwrap(),
            "\"accepted\""
        );
    }
}
