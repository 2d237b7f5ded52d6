pub mod chat;
pub mod home;
pub mod notifications;
pub mod search;
pub mod settings;
pub mod setup;
