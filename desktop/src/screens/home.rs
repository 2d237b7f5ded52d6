//! Home screen: conversation list beside the open thread

use crate::messages::Message;
use crate::screens::chat::ChatScreen;
use crate::state::{AppState, Screen};
use crate::theme::{Filled, Palette};
use iced::widget::{button, column, container, row, scrollable, text, Column, Space};
use iced::{Alignment, Element, Length};
use murmur_core::{time_format::relative_age, PeerRow};

pub struct HomeScreen;

impl HomeScreen {
    pub fn view(state: &AppState, palette: &Palette) -> Element<'static, Message> {
        if let Some(url) = state.full_view.as_deref() {
            return ChatScreen::full_view(state, palette, url);
        }

        let sidebar = column![Self::header(state, palette), Self::conversation_list(state, palette)]
            .width(320)
            .height(Length::Fill);

        let content = row![
            container(sidebar)
                .height(Length::Fill)
                .style(Filled::new(palette.surface, 0.0).with_text(palette.text).into_style()),
            ChatScreen::view(state, palette),
        ];

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn header(state: &AppState, palette: &Palette) -> Element<'static, Message> {
        let title = text("Chats").size(24);

        let unread = state.unread.get();
        let notifications_label = if unread > 0 {
            format!("Alerts ({})", unread)
        } else {
            "Alerts".to_string()
        };
        let notifications_btn = button(
            text(notifications_label)
                .size(14)
                .style(iced::theme::Text::Color(if unread > 0 {
                    palette.badge
                } else {
                    palette.text
                })),
        )
        .padding(8)
        .style(iced::theme::Button::Text)
        .on_press(Message::NavigateTo(Screen::Notifications));

        let search_btn = button(text("Search").size(14))
            .padding(8)
            .style(iced::theme::Button::Text)
            .on_press(Message::NavigateTo(Screen::Search));

        let settings_btn = button(text("Settings").size(14))
            .padding(8)
            .style(iced::theme::Button::Text)
            .on_press(Message::NavigateTo(Screen::Settings));

        column![
            row![
                title,
                Space::with_width(Length::Fill),
                button(text("Refresh").size(12))
                    .padding(6)
                    .style(iced::theme::Button::Text)
                    .on_press(Message::LoadPeers),
            ]
            .align_items(Alignment::Center),
            row![search_btn, notifications_btn, settings_btn].spacing(4),
        ]
        .spacing(8)
        .padding(16)
        .into()
    }

    fn conversation_list(state: &AppState, palette: &Palette) -> Element<'static, Message> {
        if state.peers.is_loading() {
            return container(
                text("Loading...")
                    .size(14)
                    .style(iced::theme::Text::Color(palette.text_secondary)),
            )
            .width(Length::Fill)
            .padding(24)
            .center_x()
            .into();
        }

        let rows = state.peers.rows(&state.presence);
        if rows.is_empty() {
            return container(
                column![
                    text("No conversations yet").size(16),
                    Space::with_height(10),
                    button(text("Find people").size(14))
                        .padding(10)
                        .on_press(Message::NavigateTo(Screen::Search)),
                ]
                .align_items(Alignment::Center),
            )
            .width(Length::Fill)
            .padding(24)
            .center_x()
            .into();
        }

        let now = chrono::Utc::now();
        let selected = state.selected_peer.as_deref();
        let list: Vec<Element<'static, Message>> = rows
            .into_iter()
            .map(|row| Self::peer_item(row, selected, palette, now))
            .collect();

        scrollable(Column::with_children(list).spacing(1).width(Length::Fill))
            .height(Length::Fill)
            .into()
    }

    fn peer_item(
        peer_row: PeerRow<'_>,
        selected: Option<&str>,
        palette: &Palette,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Element<'static, Message> {
        let peer = peer_row.peer;

        let avatar = container(
            text(peer.initial())
                .size(18)
                .horizontal_alignment(iced::alignment::Horizontal::Center)
                .vertical_alignment(iced::alignment::Vertical::Center),
        )
        .width(44)
        .height(44)
        .center_x()
        .center_y()
        .style(Filled::new(palette.incoming_bubble, 22.0).into_style());

        let dot_color = if peer_row.online {
            palette.online
        } else {
            palette.text_secondary
        };
        let presence_dot = container(Space::new(10, 10))
            .style(Filled::new(dot_color, 5.0).into_style());

        let preview: String = if peer.last_message_preview.chars().count() > 40 {
            let cut: String = peer.last_message_preview.chars().take(37).collect();
            format!("{}...", cut)
        } else {
            peer.last_message_preview.clone()
        };

        let text_column = column![
            row![text(peer.display_name.clone()).size(15), presence_dot]
                .spacing(6)
                .align_items(Alignment::Center),
            text(preview)
                .size(12)
                .style(iced::theme::Text::Color(palette.text_secondary)),
        ]
        .spacing(4);

        let age = peer
            .last_message_at
            .map(|at| relative_age(at, now))
            .unwrap_or_default();

        let content = row![
            avatar,
            Space::with_width(12),
            text_column,
            Space::with_width(Length::Fill),
            text(age)
                .size(11)
                .style(iced::theme::Text::Color(palette.text_secondary)),
        ]
        .align_items(Alignment::Center);

        let style = if selected == Some(peer.id.as_str()) {
            iced::theme::Button::Primary
        } else {
            iced::theme::Button::Text
        };

        button(content)
            .padding(10)
            .width(Length::Fill)
            .style(style)
            .on_press(Message::SelectPeer(peer.id.clone()))
            .into()
    }
}
