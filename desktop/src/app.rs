//! Main application module for Murmur Desktop

use crate::config::AppConfig;
use crate::messages::{Failure, Message};
use crate::screens::{
    home::HomeScreen, notifications::NotificationsScreen, search::SearchScreen,
    settings::SettingsScreen, setup::SetupScreen,
};
use crate::state::{AppState, MediaState, Screen};
use crate::theme::Palette;

use futures::SinkExt;
use iced::widget::{container, image};
use iced::{executor, Application, Command, Element, Length, Subscription};
use murmur_core::{
    spawn_best_effort, ApiClient, AttachmentAction, AttachmentKind, ClientConfig, ListEvent,
    Message as ChatMessage, Notification, RealtimeClient, RealtimeEvent, SettingsContext,
    ThemePreference, UserProfile,
};
use std::any::TypeId;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

pub struct Flags {
    pub data_dir: PathBuf,
    pub config: AppConfig,
    pub settings: Arc<SettingsContext>,
}

pub struct MurmurApp {
    state: AppState,
    settings: Arc<SettingsContext>,
    api: Option<Arc<ApiClient>>,
}

impl Application for MurmurApp {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = iced::Theme;
    type Flags = Flags;

    fn new(flags: Self::Flags) -> (Self, Command<Self::Message>) {
        let api = if flags.config.has_server() {
            connect_api(&flags.config.client_config())
        } else {
            None
        };

        let profile = flags.settings.current();
        let state = AppState::new(flags.data_dir, flags.config, profile);

        let mut app = Self {
            state,
            settings: flags.settings,
            api,
        };

        let command = if app.state.current_screen == Screen::Home {
            app.load_peers()
        } else {
            Command::none()
        };

        (app, command)
    }

    fn title(&self) -> String {
        let unread = self.state.unread.get();
        match self.state.current_screen {
            Screen::Setup => "Murmur - Setup".to_string(),
            Screen::Search => "Murmur - Search".to_string(),
            Screen::Notifications => "Murmur - Notifications".to_string(),
            Screen::Settings => "Murmur - Settings".to_string(),
            Screen::Home if unread > 0 => format!("Murmur ({})", unread),
            Screen::Home => "Murmur".to_string(),
        }
    }

    fn update(&mut self, message: Self::Message) -> Command<Self::Message> {
        match message {
            // ============= Navigation =============
            Message::NavigateTo(screen) => self.navigate(screen),

            Message::GoBack => {
                if self.state.full_view.is_some() {
                    self.state.full_view = None;
                } else if self.state.drawer.is_open() {
                    self.state.drawer.close();
                } else if !matches!(self.state.current_screen, Screen::Setup | Screen::Home) {
                    return self.navigate(Screen::Home);
                }
                Command::none()
            }

            // ============= Setup =============
            Message::ServerHostChanged(host) => {
                self.state.config.server.host = host;
                Command::none()
            }

            Message::ServerPortChanged(port) => {
                if let Ok(p) = port.parse() {
                    self.state.config.server.port = p;
                }
                Command::none()
            }

            Message::UseTlsChanged(use_tls) => {
                self.state.config.server.use_tls = use_tls;
                Command::none()
            }

            Message::AccessTokenChanged(token) => {
                self.state.config.server.access_token = (!token.is_empty()).then_some(token);
                Command::none()
            }

            Message::UserIdChanged(user_id) => {
                self.state.setup_user_id = user_id;
                Command::none()
            }

            Message::DisplayNameChanged(name) => {
                self.state.setup_display_name = name;
                Command::none()
            }

            Message::SaveSetup => {
                let user_id = self.state.setup_user_id.trim().to_string();
                if user_id.is_empty() || !self.state.config.has_server() {
                    return Command::none();
                }

                if let Err(e) = self.state.config.save(&self.state.data_dir) {
                    tracing::error!("Failed to save config: {}", e);
                }
                self.api = connect_api(&self.state.config.client_config());

                let display_name = match self.state.setup_display_name.trim() {
                    "" => user_id.clone(),
                    name => name.to_string(),
                };
                let profile = UserProfile {
                    id: user_id,
                    display_name,
                    avatar_url: None,
                    theme: self.state.theme_preference(),
                };
                if let Err(e) = self.settings.set_profile(profile.clone()) {
                    tracing::error!("Failed to save profile: {}", e);
                    return Command::none();
                }

                self.state.profile = Some(profile);
                self.state.current_screen = Screen::Home;
                self.load_peers()
            }

            Message::ProfileChanged(profile) => {
                if profile.is_none() && self.state.current_screen != Screen::Setup {
                    self.state.clear_session();
                }
                self.state.profile = profile;
                Command::none()
            }

            // ============= Conversations =============
            Message::LoadPeers => self.load_peers(),

            Message::PeersLoaded(result) => {
                match result {
                    Ok(peers) => {
                        tracing::debug!("Loaded {} peers", peers.len());
                        self.state.peers.replace_peers(peers);
                    }
                    Err(e) => self.state.peers.fetch_failed(&e),
                }
                Command::none()
            }

            Message::SelectPeer(peer_id) => {
                let Some(ListEvent::PeerSelected(peer_id)) = self.state.peers.select(&peer_id)
                else {
                    return Command::none();
                };
                self.state.selected_peer = Some(peer_id.clone());
                self.state.drawer.close();
                self.state.long_press.release();

                let request = peer_id.clone();
                self.with_api(
                    move |api| async move { api.get_messages(&request).await },
                    move |result| Message::MessagesLoaded(peer_id, result),
                )
            }

            Message::MessagesLoaded(peer_id, result) => match result {
                Ok(messages) => {
                    let urls: Vec<String> = messages
                        .iter()
                        .filter_map(image_url)
                        .filter(|url| !self.state.media.contains_key(url))
                        .collect();
                    let media: Vec<Command<Message>> =
                        urls.into_iter().map(|url| self.load_media(url)).collect();
                    self.state.conversations.replace(peer_id, messages);
                    Command::batch(media)
                }
                Err(e) => {
                    tracing::warn!("Failed to load messages for {}: {}", peer_id, e);
                    Command::none()
                }
            },

            // ============= Messaging =============
            Message::MessageInputChanged(text) => {
                self.state.message_input = text;
                Command::none()
            }

            Message::SendMessage => {
                let text = self.state.message_input.trim().to_string();
                let (Some(peer_id), Some(user_id)) = (
                    self.state.selected_peer.clone(),
                    self.state.current_user_id().map(str::to_string),
                ) else {
                    return Command::none();
                };
                if text.is_empty() {
                    return Command::none();
                }

                let pending = ChatMessage::pending(user_id, text.clone());
                let local_id = pending.id.clone().unwrap_or_default();
                self.state.peers.touch(&peer_id, &text, pending.sent_at);
                self.state.conversations.append_message(peer_id.clone(), pending);
                self.state.message_input.clear();

                let request = peer_id.clone();
                self.with_api(
                    move |api| async move { api.send_message(&request, &text).await },
                    move |result| Message::MessageSent {
                        peer_id,
                        local_id,
                        result,
                    },
                )
            }

            Message::MessageSent {
                peer_id,
                local_id,
                result,
            } => {
                match result {
                    Ok(confirmed) => {
                        if !self.state.conversations.confirm(&peer_id, &local_id, confirmed) {
                            tracing::debug!("Sent message {} no longer in view", local_id);
                        }
                    }
                    // Stays pending in the thread.
                    Err(e) => tracing::warn!("Failed to send message to {}: {}", peer_id, e),
                }
                Command::none()
            }

            // ============= Message gestures =============
            Message::MessagePressed(index) => {
                let now = Instant::now();
                if self.state.double_click.click(index, now) {
                    self.state.long_press.release();
                    self.state.drawer.open(index);
                    return Command::none();
                }

                self.state.long_press.press(index, now);
                let threshold = self.state.long_press.threshold();
                Command::perform(tokio::time::sleep(threshold), |_| Message::LongPressElapsed)
            }

            Message::MessageReleased(_) => {
                self.state.long_press.release();
                Command::none()
            }

            Message::LongPressElapsed => {
                if let Some(index) = self.state.long_press.poll(Instant::now()) {
                    self.state.drawer.open(index);
                }
                Command::none()
            }

            Message::CloseDrawer => {
                self.state.drawer.close();
                Command::none()
            }

            // ============= Attachments =============
            Message::AttachmentClicked(AttachmentAction::OpenFullView { url }) => {
                self.state.full_view = Some(url.clone());
                match self.state.media.get(&url) {
                    Some(MediaState::Ready(_)) | Some(MediaState::Loading) => Command::none(),
                    Some(MediaState::Failed) | None => self.load_media(url),
                }
            }

            Message::AttachmentClicked(AttachmentAction::Download { url, file_name }) => {
                let Some(api) = self.api.clone() else {
                    return Command::none();
                };

                Command::perform(
                    save_attachment(api, url, file_name),
                    Message::DownloadFinished,
                )
            }

            Message::MediaLoaded(url, result) => {
                let media = match result {
                    Ok(bytes) => MediaState::Ready(image::Handle::from_memory(bytes)),
                    Err(e) => {
                        tracing::warn!("Failed to load image {}: {}", url, e);
                        MediaState::Failed
                    }
                };
                self.state.media.insert(url, media);
                Command::none()
            }

            Message::CloseFullView => {
                self.state.full_view = None;
                Command::none()
            }

            Message::DownloadFinished(result) => {
                match result {
                    Ok(Some(path)) => tracing::info!("Attachment saved to {:?}", path),
                    Ok(None) => tracing::debug!("Download cancelled"),
                    Err(e) => tracing::warn!("Download failed: {}", e),
                }
                Command::none()
            }

            // ============= Search =============
            Message::SearchQueryChanged(query) => {
                let ticket = self.state.search.set_query(query);
                let delay = self.state.config.search_debounce();
                Command::perform(tokio::time::sleep(delay), move |_| {
                    Message::SearchSettled(ticket)
                })
            }

            Message::SearchSettled(ticket) => {
                let Some(query) = self.state.search.settle(ticket) else {
                    return Command::none();
                };
                let request = query.clone();
                self.with_api(
                    move |api| async move { api.get_search_results(&request).await },
                    move |result| Message::SearchResultsLoaded(query, result),
                )
            }

            Message::SearchResultsLoaded(query, result) => {
                match result {
                    Ok(users) => {
                        self.state.search.show_results(&query, users);
                    }
                    Err(e) => self.state.search.results_failed(&query, &e),
                }
                Command::none()
            }

            Message::SearchHistoryLoaded(result) => {
                match result {
                    Ok(entries) => self.state.search.history_loaded(entries),
                    Err(e) => self.state.search.history_failed(&e),
                }
                Command::none()
            }

            Message::DeleteHistoryEntry(history_id) => {
                let Some(removal) = self.state.search.remove_history(&history_id) else {
                    return Command::none();
                };
                self.with_api(
                    move |api| async move { api.delete_search_history_item(&history_id).await },
                    move |result| Message::HistoryEntryDeleted(removal, result),
                )
            }

            Message::HistoryEntryDeleted(removal, result) => {
                if let Err(e) = result {
                    self.state.search.restore_history(removal, &e);
                }
                Command::none()
            }

            Message::OpenSearchResult(peer) => {
                let record = match self.api.clone() {
                    Some(api) => {
                        let user_id = peer.id.clone();
                        Command::perform(
                            async move {
                                spawn_best_effort("search history update", async move {
                                    api.add_to_search_history(&user_id).await
                                });
                            },
                            |_| Message::Noop,
                        )
                    }
                    None => Command::none(),
                };

                let peer_id = peer.id.clone();
                self.state.peers.insert(peer);
                let navigate = self.navigate(Screen::Home);
                let select = self.update(Message::SelectPeer(peer_id));
                Command::batch([record, navigate, select])
            }

            Message::FollowUser(target) => {
                let current = match self.settings.current_user_id() {
                    Ok(id) => id,
                    Err(e) => {
                        tracing::warn!("Cannot follow {}: {}", target, e);
                        return Command::none();
                    }
                };
                let request = target.clone();
                self.with_api(
                    move |api| async move { api.follow_user(&current, &request).await },
                    move |result| Message::FollowFinished(target, result),
                )
            }

            Message::FollowFinished(target, result) => match result {
                Ok(()) => {
                    tracing::info!("Now following {}", target);
                    self.load_peers()
                }
                Err(e) => {
                    tracing::warn!("Failed to follow {}: {}", target, e);
                    Command::none()
                }
            },

            // ============= Notifications =============
            Message::NotificationsLoaded(result) => {
                match result {
                    Ok(items) => self.state.notifications.replace(items),
                    Err(e) => self.state.notifications.fetch_failed(&e),
                }
                Command::none()
            }

            Message::RespondToRequest {
                notification_id,
                request_id,
                decision,
            } => {
                let Some(removal) = self.state.notifications.resolve_request(&notification_id)
                else {
                    return Command::none();
                };
                self.with_api(
                    move |api| async move {
                        api.respond_to_follow_request(&request_id, decision).await
                    },
                    move |result| Message::RequestAnswered(removal, result),
                )
            }

            Message::RequestAnswered(removal, result) => {
                match result {
                    Ok(()) => tracing::debug!("Answered follow request {}", removal.item.id),
                    Err(e) => self.state.notifications.restore(removal, &e),
                }
                Command::none()
            }

            // ============= Settings =============
            Message::ToggleTheme => {
                let theme = match self.settings.toggle_theme() {
                    Ok(theme) => {
                        self.state.profile = self.settings.current();
                        theme
                    }
                    Err(e) => {
                        tracing::debug!("No profile to store the theme on: {}", e);
                        self.state.theme_preference().toggled()
                    }
                };
                self.state.config.ui.theme = theme.as_str().to_string();
                if let Err(e) = self.state.config.save(&self.state.data_dir) {
                    tracing::error!("Failed to save config: {}", e);
                }
                Command::none()
            }

            Message::NotificationsChanged(enabled) => {
                self.state.config.notifications.enabled = enabled;
                if let Err(e) = self.state.config.save(&self.state.data_dir) {
                    tracing::error!("Failed to save config: {}", e);
                }
                Command::none()
            }

            Message::SignOut => {
                if let Err(e) = self.settings.sign_out() {
                    tracing::error!("Failed to clear profile: {}", e);
                }
                self.state.clear_session();
                Command::none()
            }

            // ============= Realtime =============
            Message::Realtime(event) => self.handle_realtime(event),

            Message::Noop => Command::none(),
        }
    }

    fn view(&self) -> Element<Self::Message> {
        let palette = Palette::for_preference(self.state.theme_preference());
        let content: Element<Self::Message> = match self.state.current_screen {
            Screen::Setup => SetupScreen::view(&self.state),
            Screen::Home => HomeScreen::view(&self.state, &palette),
            Screen::Search => SearchScreen::view(&self.state, &palette),
            Screen::Notifications => NotificationsScreen::view(&self.state, &palette),
            Screen::Settings => SettingsScreen::view(&self.state),
        };

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Self::Message> {
        let mut subscriptions = vec![
            profile_updates(self.settings.clone()),
            iced::keyboard::on_key_press(|key, _modifiers| match key {
                iced::keyboard::Key::Named(iced::keyboard::key::Named::Escape) => {
                    Some(Message::GoBack)
                }
                _ => None,
            }),
        ];

        if self.state.profile.is_some() && self.state.config.has_server() {
            subscriptions.push(realtime(self.state.config.client_config()));
        }

        Subscription::batch(subscriptions)
    }

    fn theme(&self) -> iced::Theme {
        match self.state.theme_preference() {
            ThemePreference::Dark => iced::Theme::Dark,
            ThemePreference::Light => iced::Theme::Light,
        }
    }
}

impl MurmurApp {
    fn navigate(&mut self, screen: Screen) -> Command<Message> {
        if self.state.current_screen == Screen::Search && screen != Screen::Search {
            self.state.search.teardown();
        }
        if screen != Screen::Home {
            self.state.drawer.close();
            self.state.full_view = None;
        }
        self.state.current_screen = screen;

        match screen {
            Screen::Search => self.with_api(
                |api| async move { api.get_search_history().await },
                Message::SearchHistoryLoaded,
            ),
            Screen::Notifications => {
                self.state.unread.reset();
                self.with_api(
                    |api| async move { api.get_notifications().await },
                    Message::NotificationsLoaded,
                )
            }
            Screen::Setup | Screen::Home | Screen::Settings => Command::none(),
        }
    }

    fn load_peers(&mut self) -> Command<Message> {
        if self.api.is_none() {
            return Command::none();
        }
        self.state.peers.begin_loading();
        self.with_api(
            |api| async move { api.get_following_users().await },
            Message::PeersLoaded,
        )
    }

    fn load_media(&mut self, url: String) -> Command<Message> {
        self.state.media.insert(url.clone(), MediaState::Loading);
        let request = url.clone();
        self.with_api(
            move |api| async move { api.fetch_bytes(&request).await },
            move |result| Message::MediaLoaded(url, result),
        )
    }

    /// Run one collaborator call. Failures come back as `Failure` and are
    /// never retried.
    fn with_api<T, Fut>(
        &self,
        call: impl FnOnce(Arc<ApiClient>) -> Fut,
        to_message: impl FnOnce(Result<T, Failure>) -> Message + Send + 'static,
    ) -> Command<Message>
    where
        T: Send + 'static,
        Fut: Future<Output = murmur_core::Result<T>> + Send + 'static,
    {
        let Some(api) = self.api.clone() else {
            tracing::debug!("No server configured, skipping request");
            return Command::none();
        };
        let request = call(api);
        Command::perform(async move { request.await.map_err(Arc::new) }, to_message)
    }

    fn handle_realtime(&mut self, event: RealtimeEvent) -> Command<Message> {
        match event {
            RealtimeEvent::Connected => tracing::info!("Realtime feed connected"),
            RealtimeEvent::Disconnected => tracing::warn!("Realtime feed disconnected"),
            RealtimeEvent::Presence { user_id, online } => {
                self.state.presence.set_online(&user_id, online);
            }
            RealtimeEvent::Message { peer_id, message } => {
                let incoming = self.state.current_user_id() != Some(message.sender_id.as_str());
                if incoming {
                    self.show_message_notification(&peer_id, &message);
                }
                self.state.peers.touch(&peer_id, &message.text, message.sent_at);
                let media = image_url(&message)
                    .filter(|url| !self.state.media.contains_key(url))
                    .map(|url| self.load_media(url));
                self.state.conversations.append_message(peer_id, message);
                return media.unwrap_or_else(Command::none);
            }
            RealtimeEvent::Receipt(receipt) => {
                if !self.state.conversations.apply_receipt(&receipt) {
                    tracing::debug!("Receipt for unknown message {}", receipt.message_id);
                }
            }
            RealtimeEvent::Notification(notification) => {
                self.show_notification(&notification);
                if self.state.current_screen != Screen::Notifications {
                    let unread = self.state.unread.increment();
                    tracing::debug!("{} unread notifications", unread);
                }
                self.state.notifications.prepend(notification);
            }
        }
        Command::none()
    }

    fn show_message_notification(&self, peer_id: &str, message: &ChatMessage) {
        if !self.state.config.notifications.enabled {
            return;
        }
        let sender = self
            .state
            .peers
            .peer(peer_id)
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| peer_id.to_string());
        let body = if self.state.config.notifications.preview {
            message.text.clone()
        } else {
            "New message".to_string()
        };
        show_desktop_notification(&format!("Message from {}", sender), &body);
    }

    fn show_notification(&self, notification: &Notification) {
        if !self.state.config.notifications.enabled {
            return;
        }
        let summary = notification
            .actor
            .as_ref()
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| "Murmur".to_string());
        let body = if self.state.config.notifications.preview {
            notification.message.clone()
        } else {
            "New notification".to_string()
        };
        show_desktop_notification(&summary, &body);
    }
}

fn connect_api(config: &ClientConfig) -> Option<Arc<ApiClient>> {
    match ApiClient::new(config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::error!("Invalid server configuration: {}", e);
            None
        }
    }
}

fn image_url(message: &ChatMessage) -> Option<String> {
    let attachment = message.attachment.as_ref()?;
    (AttachmentKind::classify(&attachment.url) == AttachmentKind::Image)
        .then(|| attachment.url.clone())
}

/// Ask where to save, then download. `None` when the dialog was cancelled.
async fn save_attachment(
    api: Arc<ApiClient>,
    url: String,
    file_name: String,
) -> Result<Option<PathBuf>, String> {
    let Some(handle) = rfd::AsyncFileDialog::new()
        .set_title("Save attachment")
        .set_file_name(file_name.as_str())
        .save_file()
        .await
    else {
        return Ok(None);
    };
    let path = handle.path().to_path_buf();
    let data = api.fetch_bytes(&url).await.map_err(|e| e.to_string())?;
    tokio::fs::write(&path, data)
        .await
        .map_err(|e| e.to_string())?;
    Ok(Some(path))
}

fn show_desktop_notification(summary: &str, body: &str) {
    if let Err(e) = notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .show()
    {
        tracing::debug!("Desktop notification failed: {}", e);
    }
}

/// Mirrors the settings context into the app.
fn profile_updates(settings: Arc<SettingsContext>) -> Subscription<Message> {
    struct ProfileWatch;

    iced::subscription::channel(TypeId::of::<ProfileWatch>(), 16, move |mut output| async move {
        let mut updates = settings.subscribe();
        loop {
            if updates.changed().await.is_err() {
                futures::future::pending::<()>().await;
            }
            let profile = updates.borrow_and_update().clone();
            let _ = output.send(Message::ProfileChanged(profile)).await;
        }
    })
}

/// Realtime feed for one server. Reconnects after a fixed delay.
fn realtime(config: ClientConfig) -> Subscription<Message> {
    struct Realtime;

    let id = (TypeId::of::<Realtime>(), config.ws_url());
    iced::subscription::channel(id, 100, move |mut output| async move {
        loop {
            match RealtimeClient::connect(&config).await {
                Ok((_client, mut events)) => {
                    while let Some(event) = events.recv().await {
                        let _ = output.send(Message::Realtime(event)).await;
                    }
                }
                Err(e) => tracing::warn!("Realtime connection failed: {}", e),
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_core::Attachment;

    #[test]
    fn test_image_url_only_for_images() {
        let photo = ChatMessage::pending("me", "")
            .with_attachment(Attachment::new("https://cdn.example.com/a.JPG?w=200"));
        assert_eq!(
            image_url(&photo).as_deref(),
            Some("https://cdn.example.com/a.JPG?w=200")
        );

        let report = ChatMessage::pending("me", "").with_attachment(Attachment::new("/files/r.pdf"));
        assert_eq!(image_url(&report), None);
        assert_eq!(image_url(&ChatMessage::pending("me", "hi")), None);
    }
}
