//! Settings screen for Murmur Desktop

use crate::messages::Message;
use crate::state::{AppState, Screen};
use iced::widget::{button, checkbox, column, container, row, text, Space};
use iced::{Alignment, Element, Length};
use murmur_core::ThemePreference;

pub struct SettingsScreen;

impl SettingsScreen {
    pub fn view(state: &AppState) -> Element<'static, Message> {
        let header = row![
            button(text("<").size(20))
                .padding([8, 14])
                .on_press(Message::NavigateTo(Screen::Home)),
            Space::with_width(16),
            text("Settings").size(24),
        ]
        .padding(16)
        .align_items(Alignment::Center);

        let account_section = if let Some(profile) = state.profile.as_ref() {
            column![
                text("Account").size(18),
                Space::with_height(12),
                row![
                    text("Name:").size(14),
                    Space::with_width(8),
                    text(profile.display_name.clone()).size(14),
                ],
                row![
                    text("User ID:").size(14),
                    Space::with_width(8),
                    text(profile.id.clone()).size(14),
                ],
                Space::with_height(20),
            ]
            .spacing(8)
        } else {
            column![]
        };

        let theme = state.theme_preference();
        let toggle_label = match theme {
            ThemePreference::Light => "Switch to dark mode",
            ThemePreference::Dark => "Switch to light mode",
        };
        let appearance_section = column![
            text("Appearance").size(18),
            Space::with_height(12),
            row![
                text(format!("Theme: {}", theme.as_str())).size(14),
                Space::with_width(12),
                button(text(toggle_label).size(14))
                    .padding([8, 14])
                    .on_press(Message::ToggleTheme),
            ]
            .align_items(Alignment::Center),
            Space::with_height(20),
        ]
        .spacing(8);

        let notifications_section = column![
            text("Notifications").size(18),
            Space::with_height(12),
            checkbox("Desktop notifications", state.config.notifications.enabled)
                .on_toggle(Message::NotificationsChanged),
            Space::with_height(20),
        ]
        .spacing(8);

        let server_section = column![
            text("Server").size(18),
            Space::with_height(12),
            row![
                text("Address:").size(14),
                Space::with_width(8),
                text(format!(
                    "{}:{}",
                    state.config.server.host, state.config.server.port
                ))
                .size(14),
            ],
            row![
                text("TLS:").size(14),
                Space::with_width(8),
                text(if state.config.server.use_tls {
                    "Enabled"
                } else {
                    "Disabled"
                })
                .size(14),
            ],
            Space::with_height(20),
        ]
        .spacing(8);

        let about_section = column![
            text("About").size(18),
            Space::with_height(12),
            row![
                text("Version:").size(14),
                Space::with_width(8),
                text(env!("CARGO_PKG_VERSION")).size(14),
            ],
            Space::with_height(20),
        ]
        .spacing(8);

        let sign_out_section = column![
            Space::with_height(20),
            button(
                text("Sign Out")
                    .size(14)
                    .horizontal_alignment(iced::alignment::Horizontal::Center),
            )
            .width(Length::Fixed(200.0))
            .padding(12)
            .on_press(Message::SignOut),
        ]
        .align_items(Alignment::Center);

        let content = column![
            header,
            container(
                column![
                    account_section,
                    appearance_section,
                    notifications_section,
                    server_section,
                    about_section,
                    sign_out_section,
                ]
                .padding(20)
                .max_width(600),
            )
            .width(Length::Fill)
            .center_x(),
        ];

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}
