//! Message thread for the selected peer

use crate::messages::Message;
use crate::state::{AppState, MediaState};
use crate::theme::{Filled, Palette};
use iced::widget::{
    button, column, container, image, mouse_area, row, scrollable, text, text_input, Column,
    Space,
};
use iced::{Alignment, Element, Length};
use murmur_core::{AttachmentKind, AttachmentPreview, MessageRow, Side, ThreadView};

pub struct ChatScreen;

impl ChatScreen {
    pub fn view(state: &AppState, palette: &Palette) -> Element<'static, Message> {
        let thread = state.thread();
        if let Some(label) = thread.placeholder() {
            return container(
                text(label)
                    .size(18)
                    .style(iced::theme::Text::Color(palette.text_secondary)),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x()
            .center_y()
            .into();
        }
        let rows = match thread {
            ThreadView::Conversation(rows) => rows,
            ThreadView::NoPeerSelected => Vec::new(),
        };

        let header = Self::header(state, palette);
        let messages = Self::messages_view(state, palette, rows);
        let input = Self::input_area(state);

        let thread = column![header, messages, input]
            .width(Length::Fill)
            .height(Length::Fill);

        let content: Element<'static, Message> = match Self::detail_drawer(state, palette) {
            Some(drawer) => row![thread, drawer].into(),
            None => thread.into(),
        };

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn header(state: &AppState, palette: &Palette) -> Element<'static, Message> {
        let peer_id = state.selected_peer.clone().unwrap_or_default();
        let peer = state.peers.peer(&peer_id);
        let name = peer
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| peer_id.clone());
        let initial = peer.map(|p| p.initial()).unwrap_or_else(|| "?".to_string());
        let online = peer.map(|p| p.online).unwrap_or(false) || state.presence.is_online(&peer_id);

        let avatar = container(
            text(initial)
                .size(16)
                .horizontal_alignment(iced::alignment::Horizontal::Center)
                .vertical_alignment(iced::alignment::Vertical::Center),
        )
        .width(40)
        .height(40)
        .center_x()
        .center_y()
        .style(Filled::new(palette.surface, 20.0).into_style());

        let presence = if online {
            text("online").size(12).style(iced::theme::Text::Color(palette.online))
        } else {
            text("offline")
                .size(12)
                .style(iced::theme::Text::Color(palette.text_secondary))
        };

        row![
            avatar,
            Space::with_width(12),
            column![text(name).size(16), presence].spacing(2),
        ]
        .padding(12)
        .align_items(Alignment::Center)
        .into()
    }

    fn messages_view(
        state: &AppState,
        palette: &Palette,
        rows: Vec<MessageRow>,
    ) -> Element<'static, Message> {
        let messages: Vec<Element<'static, Message>> = rows
            .into_iter()
            .map(|row| Self::message_row(state, palette, row))
            .collect();

        scrollable(
            Column::with_children(messages)
                .spacing(8)
                .padding(16)
                .width(Length::Fill),
        )
        .height(Length::Fill)
        .into()
    }

    fn message_row(
        state: &AppState,
        palette: &Palette,
        row_data: MessageRow,
    ) -> Element<'static, Message> {
        let outgoing = row_data.side == Side::Right;
        let (bubble_color, text_color) = if outgoing {
            (palette.outgoing_bubble, palette.outgoing_text)
        } else {
            (palette.incoming_bubble, palette.text)
        };

        let mut body = Column::new().spacing(6);
        if let Some(preview) = row_data.attachment.as_ref() {
            body = body.push(Self::attachment(state, palette, preview));
        }
        if !row_data.text.is_empty() {
            body = body.push(text(row_data.text.clone()).size(14));
        }

        let mut meta = row![text(row_data.sent_label.clone()).size(10)]
            .spacing(4)
            .align_items(Alignment::Center);
        if let Some(icon) = row_data.status_icon {
            let color = if icon.is_highlighted() {
                palette.read_receipt
            } else {
                text_color
            };
            meta = meta.push(text(icon.glyph()).size(10).style(iced::theme::Text::Color(color)));
        }

        let bubble = container(column![body, meta].spacing(4))
            .padding([8, 12])
            .max_width(480)
            .style(Filled::new(bubble_color, 12.0).with_text(text_color).into_style());

        let bubble = mouse_area(bubble)
            .on_press(Message::MessagePressed(row_data.index))
            .on_release(Message::MessageReleased(row_data.index));

        if outgoing {
            row![Space::with_width(Length::Fill), bubble].into()
        } else {
            row![bubble, Space::with_width(Length::Fill)].into()
        }
    }

    fn attachment(
        state: &AppState,
        palette: &Palette,
        preview: &AttachmentPreview,
    ) -> Element<'static, Message> {
        match preview.kind {
            AttachmentKind::Image => {
                let content: Element<'static, Message> = match state.media.get(&preview.url) {
                    Some(MediaState::Ready(handle)) => image(handle.clone()).width(240).into(),
                    Some(MediaState::Failed) => text(format!("Image unavailable: {}", preview.name))
                        .size(12)
                        .into(),
                    Some(MediaState::Loading) | None => text("Loading image...").size(12).into(),
                };
                button(content)
                    .padding(0)
                    .style(iced::theme::Button::Text)
                    .on_press_maybe(preview.action().map(Message::AttachmentClicked))
                    .into()
            }
            AttachmentKind::Video => column![
                text("Video").size(12),
                text(preview.name.clone()).size(14),
            ]
            .spacing(2)
            .into(),
            AttachmentKind::Pdf | AttachmentKind::GenericFile => {
                let label = if preview.kind == AttachmentKind::Pdf { "PDF" } else { "File" };
                let content = row![
                    text(label)
                        .size(12)
                        .style(iced::theme::Text::Color(palette.primary)),
                    column![
                        text(preview.name.clone()).size(14),
                        text(preview.size_label.clone()).size(11),
                    ]
                    .spacing(2),
                ]
                .spacing(10)
                .align_items(Alignment::Center);

                button(content)
                    .padding(8)
                    .style(iced::theme::Button::Secondary)
                    .on_press_maybe(preview.action().map(Message::AttachmentClicked))
                    .into()
            }
        }
    }

    fn input_area(state: &AppState) -> Element<'static, Message> {
        let input = text_input("Type a message...", &state.message_input)
            .on_input(Message::MessageInputChanged)
            .on_submit(Message::SendMessage)
            .padding(12)
            .width(Length::Fill);

        let can_send = !state.message_input.trim().is_empty();
        let send_btn = button(text("Send").size(14))
            .padding([12, 20])
            .on_press_maybe(can_send.then_some(Message::SendMessage));

        row![input, send_btn]
            .spacing(8)
            .padding(12)
            .align_items(Alignment::Center)
            .into()
    }

    fn detail_drawer(state: &AppState, palette: &Palette) -> Option<Element<'static, Message>> {
        let peer_id = state.selected_peer.as_deref()?;
        let entries = state.drawer.entries(&state.conversations, peer_id)?;

        let mut details = Column::new().spacing(12);
        for entry in entries {
            details = details.push(
                column![
                    text(entry.field.label())
                        .size(12)
                        .style(iced::theme::Text::Color(palette.text_secondary)),
                    text(entry.formatted()).size(14),
                ]
                .spacing(2),
            );
        }

        let header = row![
            text("Message info").size(16),
            Space::with_width(Length::Fill),
            button(text("Close").size(12))
                .padding([4, 10])
                .on_press(Message::CloseDrawer),
        ]
        .align_items(Alignment::Center);

        Some(
            container(column![header, details].spacing(16))
                .width(260)
                .height(Length::Fill)
                .padding(16)
                .style(Filled::new(palette.surface, 0.0).with_text(palette.text).into_style())
                .into(),
        )
    }

    /// Full-size image over the whole window.
    pub fn full_view(state: &AppState, palette: &Palette, url: &str) -> Element<'static, Message> {
        let content: Element<'static, Message> = match state.media.get(url) {
            Some(MediaState::Ready(handle)) => image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            Some(MediaState::Failed) => text("Image unavailable").size(16).into(),
            Some(MediaState::Loading) | None => text("Loading image...").size(16).into(),
        };

        let close_btn = button(text("Close").size(14))
            .padding([8, 16])
            .on_press(Message::CloseFullView);

        container(
            column![
                row![Space::with_width(Length::Fill), close_btn],
                container(content)
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .center_x()
                    .center_y(),
            ]
            .spacing(12),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(24)
        .style(Filled::new(palette.background, 0.0).with_text(palette.text).into_style())
        .into()
    }
}
