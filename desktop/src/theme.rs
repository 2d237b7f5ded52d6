//! Theme definitions for Murmur Desktop

use iced::widget::container;
use iced::{Background, Border, Color};
use murmur_core::ThemePreference;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub surface: Color,
    pub primary: Color,
    pub text: Color,
    pub text_secondary: Color,
    pub outgoing_bubble: Color,
    pub outgoing_text: Color,
    pub incoming_bubble: Color,
    pub read_receipt: Color,
    pub online: Color,
    pub badge: Color,
}

impl Palette {
    pub fn for_preference(preference: ThemePreference) -> Self {
        match preference {
            ThemePreference::Dark => Self::dark(),
            ThemePreference::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color::from_rgb(0.11, 0.11, 0.12),      // #1c1c1e
            surface: Color::from_rgb(0.17, 0.17, 0.18),         // #2c2c2e
            primary: Color::from_rgb(0.0, 0.48, 1.0),           // #007aff
            text: Color::from_rgb(1.0, 1.0, 1.0),
            text_secondary: Color::from_rgb(0.6, 0.6, 0.6),
            outgoing_bubble: Color::from_rgb(0.0, 0.48, 1.0),
            outgoing_text: Color::WHITE,
            incoming_bubble: Color::from_rgb(0.22, 0.22, 0.23), // #38383a
            read_receipt: Color::from_rgb(0.39, 0.82, 1.0),     // #64d2ff
            online: Color::from_rgb(0.2, 0.78, 0.35),           // #34c759
            badge: Color::from_rgb(1.0, 0.27, 0.23),            // #ff453a
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::from_rgb(0.95, 0.95, 0.97),      // #f2f2f7
            surface: Color::from_rgb(1.0, 1.0, 1.0),
            primary: Color::from_rgb(0.0, 0.48, 1.0),
            text: Color::from_rgb(0.0, 0.0, 0.0),
            text_secondary: Color::from_rgb(0.4, 0.4, 0.4),
            outgoing_bubble: Color::from_rgb(0.0, 0.48, 1.0),
            outgoing_text: Color::WHITE,
            incoming_bubble: Color::from_rgb(0.9, 0.9, 0.92),
            read_receipt: Color::from_rgb(0.0, 0.6, 0.85),
            online: Color::from_rgb(0.2, 0.78, 0.35),
            badge: Color::from_rgb(1.0, 0.23, 0.19),
        }
    }
}

/// Rounded filled box: message bubbles, badges, presence dots, drawer.
pub struct Filled {
    pub background: Color,
    pub text: Option<Color>,
    pub radius: f32,
}

impl Filled {
    pub fn new(background: Color, radius: f32) -> Self {
        Self {
            background,
            text: None,
            radius,
        }
    }

    pub fn with_text(mut self, color: Color) -> Self {
        self.text = Some(color);
        self
    }

    pub fn into_style(self) -> iced::theme::Container {
        iced::theme::Container::Custom(Box::new(self))
    }
}

impl container::StyleSheet for Filled {
    type Style = iced::Theme;

    fn appearance(&self, _style: &Self::Style) -> container::Appearance {
        container::Appearance {
            background: Some(Background::Color(self.background)),
            text_color: self.text,
            border: Border {
                radius: self.radius.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
