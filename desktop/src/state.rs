//! Application state management

use crate::config::AppConfig;
use iced::widget::image;
use murmur_core::{
    ConversationIndex, ConversationListView, DetailDrawer, DoubleClick, LongPress,
    MessageThreadView, NotificationCounter, NotificationsView, PresenceSet, SearchView,
    ThemePreference, ThreadView, UserProfile,
};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Home,
    Search,
    Notifications,
    Settings,
}

#[derive(Debug, Clone)]
pub enum MediaState {
    Loading,
    Ready(image::Handle),
    Failed,
}

pub struct AppState {
    // Paths
    pub data_dir: PathBuf,
    pub config: AppConfig,

    // Navigation
    pub current_screen: Screen,

    // Current user, mirrored from the settings context
    pub profile: Option<UserProfile>,

    // Setup form
    pub setup_user_id: String,
    pub setup_display_name: String,

    // Conversations
    pub peers: ConversationListView,
    pub presence: PresenceSet,
    pub conversations: ConversationIndex,
    pub selected_peer: Option<String>,
    pub message_input: String,

    // Message gestures and detail drawer
    pub drawer: DetailDrawer,
    pub long_press: LongPress<usize>,
    pub double_click: DoubleClick<usize>,

    // Attachments
    pub media: HashMap<String, MediaState>,
    pub full_view: Option<String>,

    // Search
    pub search: SearchView,

    // Notifications
    pub notifications: NotificationsView,
    pub unread: NotificationCounter,
}

impl AppState {
    pub fn new(data_dir: PathBuf, config: AppConfig, profile: Option<UserProfile>) -> Self {
        let current_screen = if profile.is_some() && config.has_server() {
            Screen::Home
        } else {
            Screen::Setup
        };
        let (setup_user_id, setup_display_name) = profile
            .as_ref()
            .map(|p| (p.id.clone(), p.display_name.clone()))
            .unwrap_or_default();
        let long_press = LongPress::new(config.long_press());
        let double_click = DoubleClick::new(config.double_click());

        Self {
            data_dir,
            config,
            current_screen,
            profile,
            setup_user_id,
            setup_display_name,
            peers: ConversationListView::new(),
            presence: PresenceSet::new(),
            conversations: ConversationIndex::new(),
            selected_peer: None,
            message_input: String::new(),
            drawer: DetailDrawer::default(),
            long_press,
            double_click,
            media: HashMap::new(),
            full_view: None,
            search: SearchView::new(),
            notifications: NotificationsView::new(),
            unread: NotificationCounter::new(),
        }
    }

    pub fn current_user_id(&self) -> Option<&str> {
        self.profile.as_ref().map(|p| p.id.as_str())
    }

    /// Profile preference first, then the configured default.
    pub fn theme_preference(&self) -> ThemePreference {
        match &self.profile {
            Some(profile) => profile.theme,
            None if self.config.ui.theme == "dark" => ThemePreference::Dark,
            None => ThemePreference::Light,
        }
    }

    pub fn thread(&self) -> ThreadView {
        MessageThreadView::render(
            self.current_user_id().unwrap_or_default(),
            self.selected_peer.as_deref(),
            &self.conversations,
            chrono::Utc::now(),
        )
    }

    /// Drop everything tied to the signed-in user.
    pub fn clear_session(&mut self) {
        self.profile = None;
        self.peers = ConversationListView::new();
        self.presence = PresenceSet::new();
        self.conversations.clear();
        self.selected_peer = None;
        self.message_input.clear();
        self.drawer.close();
        self.media.clear();
        self.full_view = None;
        self.search = SearchView::new();
        self.notifications = NotificationsView::new();
        self.unread.reset();
        self.current_screen = Screen::Setup;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::Message as ChatMessage;

    fn profile() -> UserProfile {
        UserProfile {
            id: "me".into(),
            display_name: "Me".into(),
            avatar_url: None,
            theme: ThemePreference::Dark,
        }
    }

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.host = "localhost".into();
        config
    }

    #[test]
    fn test_initial_screen() {
        let state = AppState::new(PathBuf::from("."), configured(), Some(profile()));
        assert_eq!(state.current_screen, Screen::Home);

        let state = AppState::new(PathBuf::from("."), AppConfig::default(), Some(profile()));
        assert_eq!(state.current_screen, Screen::Setup);

        let state = AppState::new(PathBuf::from("."), configured(), None);
        assert_eq!(state.current_screen, Screen::Setup);
    }

    #[test]
    fn test_theme_preference_falls_back_to_config() {
        let mut state = AppState::new(PathBuf::from("."), configured(), None);
        assert_eq!(state.theme_preference(), ThemePreference::Light);
        state.config.ui.theme = "dark".into();
        assert_eq!(state.theme_preference(), ThemePreference::Dark);

        state.profile = Some(UserProfile {
            theme: ThemePreference::Light,
            ..profile()
        });
        assert_eq!(state.theme_preference(), ThemePreference::Light);
    }

    #[test]
    fn test_clear_session_resets_everything() {
        let mut state = AppState::new(PathBuf::from("."), configured(), Some(profile()));
        state.selected_peer = Some("bob".into());
        state
            .conversations
            .append_message("bob", ChatMessage::pending("me", "hi"));
        state.drawer.open(0);
        state.unread.increment();

        state.clear_session();
        assert_eq!(state.current_screen, Screen::Setup);
        assert!(state.conversations.messages("bob").is_empty());
        assert!(!state.drawer.is_open());
        assert_eq!(state.unread.get(), 0);
        assert_eq!(state.thread(), ThreadView::NoPeerSelected);
    }

    #[test]
    fn test_selected_peer_without_messages_renders_empty_thread() {
        let mut state = AppState::new(PathBuf::from("."), configured(), Some(profile()));
        state.selected_peer = Some("bob".into());

        let thread = state.thread();
        assert_eq!(thread.placeholder(), None);
        assert_eq!(thread, ThreadView::Conversation(Vec::new()));
    }
}
