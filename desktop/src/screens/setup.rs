//! Setup screen: server connection and current user

use crate::messages::Message;
use crate::state::AppState;
use iced::widget::{button, checkbox, column, container, row, text, text_input, Space};
use iced::{Alignment, Element, Length};

pub struct SetupScreen;

impl SetupScreen {
    pub fn view(state: &AppState) -> Element<'static, Message> {
        let title = text("Murmur").size(48);
        let subtitle = text("Messages from the people you follow").size(16);

        let server_section = column![
            text("Server").size(14),
            row![
                text_input("Server address", &state.config.server.host)
                    .on_input(Message::ServerHostChanged)
                    .padding(12)
                    .width(Length::FillPortion(3)),
                text_input("Port", &state.config.server.port.to_string())
                    .on_input(Message::ServerPortChanged)
                    .padding(12)
                    .width(Length::FillPortion(1)),
            ]
            .spacing(10),
            checkbox("Use HTTPS/TLS", state.config.server.use_tls)
                .on_toggle(Message::UseTlsChanged),
            text_input(
                "Access token (optional)",
                state.config.server.access_token.as_deref().unwrap_or_default(),
            )
            .on_input(Message::AccessTokenChanged)
            .padding(12)
            .secure(true),
        ]
        .spacing(8);

        let user_section = column![
            text("You").size(14),
            text_input("User ID", &state.setup_user_id)
                .on_input(Message::UserIdChanged)
                .padding(12),
            text_input("Display name", &state.setup_display_name)
                .on_input(Message::DisplayNameChanged)
                .on_submit(Message::SaveSetup)
                .padding(12),
        ]
        .spacing(8);

        let ready = state.config.has_server() && !state.setup_user_id.trim().is_empty();
        let continue_btn = button(
            text("Continue").horizontal_alignment(iced::alignment::Horizontal::Center),
        )
        .width(Length::Fill)
        .padding(14)
        .on_press_maybe(ready.then_some(Message::SaveSetup));

        let form = column![
            server_section,
            Space::with_height(20),
            user_section,
            Space::with_height(20),
            continue_btn,
        ]
        .spacing(10)
        .max_width(400);

        let content = column![
            Space::with_height(Length::FillPortion(1)),
            title,
            subtitle,
            Space::with_height(40),
            form,
            Space::with_height(Length::FillPortion(1)),
        ]
        .align_items(Alignment::Center)
        .spacing(10)
        .padding(40);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x()
            .center_y()
            .into()
    }
}
