//! Notifications list with follow-request actions

use crate::messages::Message;
use crate::state::{AppState, Screen};
use crate::theme::Palette;
use iced::widget::{button, column, container, row, scrollable, text, Column, Space};
use iced::{Alignment, Element, Length};
use murmur_core::{time_format::relative_age, FollowDecision, Notification, NotificationKind};

pub struct NotificationsScreen;

impl NotificationsScreen {
    pub fn view(state: &AppState, palette: &Palette) -> Element<'static, Message> {
        let header = row![
            button(text("<").size(20))
                .padding([8, 14])
                .on_press(Message::NavigateTo(Screen::Home)),
            Space::with_width(12),
            text("Notifications").size(24),
        ]
        .padding(16)
        .align_items(Alignment::Center);

        let body: Element<'static, Message> = if let Some(label) = state.notifications.empty_label() {
            container(
                text(label)
                    .size(14)
                    .style(iced::theme::Text::Color(palette.text_secondary)),
            )
            .width(Length::Fill)
            .padding(40)
            .center_x()
            .into()
        } else {
            let now = chrono::Utc::now();
            let items: Vec<Element<'static, Message>> = state
                .notifications
                .items()
                .iter()
                .map(|n| Self::item(n, palette, now))
                .collect();
            scrollable(Column::with_children(items).spacing(8).padding([0, 16]))
                .height(Length::Fill)
                .into()
        };

        container(column![header, body].width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn item(
        notification: &Notification,
        palette: &Palette,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Element<'static, Message> {
        let actor = notification
            .actor
            .as_ref()
            .map(|p| p.display_name.clone())
            .unwrap_or_default();
        let summary = match notification.kind {
            NotificationKind::Like => "liked your post",
            NotificationKind::Comment => "commented on your post",
            NotificationKind::Follow => "started following you",
            NotificationKind::FollowRequest => "wants to follow you",
            NotificationKind::Mention => "mentioned you",
            NotificationKind::Other => "",
        };
        let headline = format!("{} {}", actor, summary).trim().to_string();

        let mut details = column![text(headline).size(15)].spacing(2);
        if !notification.message.is_empty() {
            details = details.push(
                text(notification.message.clone())
                    .size(13)
                    .style(iced::theme::Text::Color(palette.text_secondary)),
            );
        }
        if let Some(at) = notification.created_at {
            details = details.push(
                text(relative_age(at, now))
                    .size(11)
                    .style(iced::theme::Text::Color(palette.text_secondary)),
            );
        }

        let mut content = row![details, Space::with_width(Length::Fill)]
            .spacing(8)
            .align_items(Alignment::Center);

        if let Some(request_id) = notification.follow_request_id() {
            let respond = |decision| Message::RespondToRequest {
                notification_id: notification.id.clone(),
                request_id: request_id.to_string(),
                decision,
            };
            content = content
                .push(
                    button(text("Accept").size(12))
                        .padding([6, 12])
                        .on_press(respond(FollowDecision::Accepted)),
                )
                .push(
                    button(text("Reject").size(12))
                        .padding([6, 12])
                        .style(iced::theme::Button::Secondary)
                        .on_press(respond(FollowDecision::Rejected)),
                );
        }

        container(content).padding(8).width(Length::Fill).into()
    }
}
