//! Murmur Desktop Client
//!
//! Conversations, search and notifications for the Murmur social network.
//! Built with iced GUI framework.

mod app;
mod config;
mod messages;
mod screens;
mod state;
mod theme;

use iced::{Application, Settings, Size};
use murmur_core::{LocalStore, SettingsContext};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize logging; core's `log` records are bridged in by the subscriber.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "murmur_desktop=info,murmur_core=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Murmur Desktop v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("murmur");
    std::fs::create_dir_all(&data_dir)?;

    tracing::info!("Data directory: {:?}", data_dir);

    let config = config::AppConfig::load(&data_dir).unwrap_or_else(|e| {
        tracing::warn!("Ignoring unreadable config: {}", e);
        config::AppConfig::default()
    });

    let store = LocalStore::open(&data_dir)?;
    let settings = Arc::new(SettingsContext::load(Arc::new(store))?);

    let flags = app::Flags {
        data_dir,
        config,
        settings,
    };

    app::MurmurApp::run(Settings {
        window: iced::window::Settings {
            size: Size::new(1200.0, 800.0),
            min_size: Some(Size::new(800.0, 600.0)),
            position: iced::window::Position::Centered,
            ..Default::default()
        },
        default_font: iced::Font::DEFAULT,
        default_text_size: iced::Pixels(14.0),
        antialiasing: true,
        ..Settings::with_flags(flags)
    })?;

    Ok(())
}
