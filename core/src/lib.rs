//! Murmur Core Library
//!
//! Shared library for the Murmur social client.
//! Provides: data models, the remote API client, local settings storage,
//! and the view models the desktop client renders.

pub mod attachment;
pub mod conversation_list;
pub mod debounce;
pub mod error;
pub mod gesture;
pub mod models;
pub mod network;
pub mod notifications;
pub mod optimistic;
pub mod search;
pub mod settings;
pub mod storage;
pub mod thread;
pub mod time_format;

pub use attachment::{AttachmentAction, AttachmentKind, AttachmentPreview};
pub use conversation_list::{ConversationListView, ListEvent, PeerRow, PresenceSet};
pub use debounce::{DebounceGate, Debouncer, Ticket};
pub use error::*;
pub use gesture::{DoubleClick, LongPress};
pub use models::*;
pub use network::{spawn_best_effort, ApiClient, RealtimeClient, RealtimeEvent};
pub use notifications::{NotificationCounter, NotificationsView};
pub use optimistic::{Keyed, OptimisticList, Removal};
pub use search::SearchView;
pub use settings::SettingsContext;
pub use storage::LocalStore;
pub use thread::{DetailDrawer, MessageDetail, MessageRow, MessageThreadView, Side, StatusIcon, ThreadView};

/// Client configuration
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub server_host: String,
    pub server_port: u16,
    pub use_tls: bool,
    pub access_token: Option<String>,
}

impl ClientConfig {
    pub fn new(host: &str, port: u16, use_tls: bool) -> Self {
        Self {
            server_host: host.to_string(),
            server_port: port,
            use_tls,
            access_token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn http_url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.server_host, self.server_port)
    }

    pub fn ws_url(&self) -> String {
        let scheme = if self.use_tls { "wss" } else { "ws" };
        format!("{}://{}:{}/ws", scheme, self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let config = ClientConfig::new("localhost", 3000, false).with_token(Some("  ".into()));
        assert_eq!(config.http_url(), "http://localhost:3000");
        assert_eq!(config.ws_url(), "ws://localhost:3000/ws");
        assert_eq!(config.access_token, None);
    }
}
