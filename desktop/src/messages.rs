//! Application messages (events)

use crate::state::Screen;
use murmur_core::{
    AttachmentAction, FollowDecision, HistoryEntry, Message as ChatMessage, Notification, Peer,
    RealtimeEvent, Removal, Ticket, UserProfile,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Collaborator failures carried through iced messages, which must be `Clone`.
pub type Failure = Arc<murmur_core::Error>;

#[derive(Debug, Clone)]
pub enum Message {
    // Navigation
    NavigateTo(Screen),
    GoBack,

    // Setup
    ServerHostChanged(String),
    ServerPortChanged(String),
    UseTlsChanged(bool),
    AccessTokenChanged(String),
    UserIdChanged(String),
    DisplayNameChanged(String),
    SaveSetup,
    ProfileChanged(Option<UserProfile>),

    // Conversations
    LoadPeers,
    PeersLoaded(Result<Vec<Peer>, Failure>),
    SelectPeer(String),
    MessagesLoaded(String, Result<Vec<ChatMessage>, Failure>),

    // Messaging
    MessageInputChanged(String),
    SendMessage,
    MessageSent {
        peer_id: String,
        local_id: String,
        result: Result<ChatMessage, Failure>,
    },

    // Message gestures
    MessagePressed(usize),
    MessageReleased(usize),
    LongPressElapsed,
    CloseDrawer,

    // Attachments
    AttachmentClicked(AttachmentAction),
    MediaLoaded(String, Result<Vec<u8>, Failure>),
    CloseFullView,
    DownloadFinished(Result<Option<PathBuf>, String>),

    // Search
    SearchQueryChanged(String),
    SearchSettled(Ticket),
    SearchResultsLoaded(String, Result<Vec<Peer>, Failure>),
    SearchHistoryLoaded(Result<Vec<HistoryEntry>, Failure>),
    DeleteHistoryEntry(String),
    HistoryEntryDeleted(Removal<HistoryEntry>, Result<(), Failure>),
    OpenSearchResult(Peer),
    FollowUser(String),
    FollowFinished(String, Result<(), Failure>),

    // Notifications
    NotificationsLoaded(Result<Vec<Notification>, Failure>),
    RespondToRequest {
        notification_id: String,
        request_id: String,
        decision: FollowDecision,
    },
    RequestAnswered(Removal<Notification>, Result<(), Failure>),

    // Settings
    ToggleTheme,
    NotificationsChanged(bool),
    SignOut,

    // Realtime
    Realtime(RealtimeEvent),

    // Misc
    Noop,
}
