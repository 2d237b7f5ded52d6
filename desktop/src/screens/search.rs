//! User search with recent-search history

use crate::messages::Message;
use crate::state::{AppState, Screen};
use crate::theme::Palette;
use iced::widget::{button, column, container, row, scrollable, text, text_input, Column, Space};
use iced::{Alignment, Element, Length};
use murmur_core::{HistoryEntry, Peer};

pub struct SearchScreen;

impl SearchScreen {
    pub fn view(state: &AppState, palette: &Palette) -> Element<'static, Message> {
        let back_btn = button(text("<").size(20))
            .padding([8, 14])
            .on_press(Message::NavigateTo(Screen::Home));

        let input = text_input("Search people...", state.search.query())
            .on_input(Message::SearchQueryChanged)
            .padding(12)
            .width(Length::Fill);

        let header = row![back_btn, input]
            .spacing(8)
            .padding(16)
            .align_items(Alignment::Center);

        let body = if state.search.query().trim().is_empty() {
            Self::history(state, palette)
        } else {
            Self::results(state, palette)
        };

        container(column![header, body].width(Length::Fill).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn results(state: &AppState, palette: &Palette) -> Element<'static, Message> {
        if state.search.is_loading() {
            return Self::centered("Searching...", palette);
        }
        if let Some(label) = state.search.empty_label() {
            return Self::centered(label, palette);
        }

        let items: Vec<Element<'static, Message>> = state
            .search
            .results()
            .iter()
            .map(|peer| Self::result_item(peer, palette))
            .collect();

        scrollable(Column::with_children(items).spacing(4).padding([0, 16]))
            .height(Length::Fill)
            .into()
    }

    fn result_item(peer: &Peer, palette: &Palette) -> Element<'static, Message> {
        row![
            button(
                column![
                    text(peer.display_name.clone()).size(16),
                    text(peer.id.clone())
                        .size(12)
                        .style(iced::theme::Text::Color(palette.text_secondary)),
                ]
                .spacing(2),
            )
            .padding(10)
            .width(Length::Fill)
            .style(iced::theme::Button::Text)
            .on_press(Message::OpenSearchResult(peer.clone())),
            button(text("Follow").size(12))
                .padding([6, 12])
                .on_press(Message::FollowUser(peer.id.clone())),
        ]
        .spacing(8)
        .align_items(Alignment::Center)
        .into()
    }

    fn history(state: &AppState, palette: &Palette) -> Element<'static, Message> {
        let entries = state.search.history();
        if entries.is_empty() {
            return Self::centered("No recent searches", palette);
        }

        let items: Vec<Element<'static, Message>> = entries
            .iter()
            .map(|entry| Self::history_item(entry, palette))
            .collect();

        column![
            container(
                text("Recent")
                    .size(14)
                    .style(iced::theme::Text::Color(palette.text_secondary)),
            )
            .padding([0, 16]),
            scrollable(Column::with_children(items).spacing(4).padding([0, 16]))
                .height(Length::Fill),
        ]
        .spacing(8)
        .into()
    }

    fn history_item(entry: &HistoryEntry, palette: &Palette) -> Element<'static, Message> {
        row![
            button(text(entry.user.display_name.clone()).size(15))
                .padding(10)
                .width(Length::Fill)
                .style(iced::theme::Button::Text)
                .on_press(Message::OpenSearchResult(entry.user.clone())),
            button(
                text("Remove")
                    .size(12)
                    .style(iced::theme::Text::Color(palette.badge)),
            )
            .padding([6, 12])
            .style(iced::theme::Button::Text)
            .on_press(Message::DeleteHistoryEntry(entry.id.clone())),
        ]
        .align_items(Alignment::Center)
        .into()
    }

    fn centered(label: &str, palette: &Palette) -> Element<'static, Message> {
        container(
            column![
                Space::with_height(40),
                text(label.to_string())
                    .size(14)
                    .style(iced::theme::Text::Color(palette.text_secondary)),
            ]
            .align_items(Alignment::Center),
        )
        .width(Length::Fill)
        .center_x()
        .into()
    }
}
