//! Current-user settings, injected into views instead of read from globals.

use crate::error::{Error, Result};
use crate::models::{ThemePreference, UserProfile};
use crate::storage::LocalStore;
use std::sync::Arc;
use tokio::sync::watch;

/// Owns the current user profile (including the theme preference).
///
/// Writes go through to the [`LocalStore`] synchronously, then are published
/// on the watch channel returned by [`SettingsContext::subscribe`].
pub struct SettingsContext {
    store: Arc<LocalStore>,
    tx: watch::Sender<Option<UserProfile>>,
}

impl SettingsContext {
    pub fn load(store: Arc<LocalStore>) -> Result<Self> {
        let profile = store.load_profile()?;
        let (tx, _) = watch::channel(profile);
        Ok(Self { store, tx })
    }

    pub fn current(&self) -> Option<UserProfile> {
        self.tx.borrow().clone()
    }

    pub fn current_user_id(&self) -> Result<String> {
        self.tx
            .borrow()
            .as_ref()
            .map(|p| p.id.clone())
            .ok_or(Error::NoCurrentUser)
    }

    pub fn theme(&self) -> Option<ThemePreference> {
        self.tx.borrow().as_ref().map(|p| p.theme)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserProfile>> {
        self.tx.subscribe()
    }

    pub fn set_profile(&self, profile: UserProfile) -> Result<()> {
        self.store.save_profile(&profile)?;
        log::info!("Current user set to {}", profile.id);
        self.tx.send_replace(Some(profile));
        Ok(())
    }

    pub fn toggle_theme(&self) -> Result<ThemePreference> {
        let mut profile = self.current().ok_or(Error::NoCurrentUser)?;
        profile.theme = profile.theme.toggled();
        let theme = profile.theme;
        self.set_profile(profile)?;
        Ok(theme)
    }

    pub fn sign_out(&self) -> Result<()> {
        self.store.clear_profile()?;
        self.tx.send_replace(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> SettingsContext {
        SettingsContext::load(Arc::new(LocalStore::in_memory().unwrap())).unwrap()
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: "u1".into(),
            display_name: "Ada".into(),
            avatar_url: None,
            theme: ThemePreference::Light,
        }
    }

    #[test]
    fn test_toggle_requires_user() {
        let ctx = context();
        assert!(matches!(ctx.toggle_theme(), Err(Error::NoCurrentUser)));
        assert!(matches!(ctx.current_user_id(), Err(Error::NoCurrentUser)));
    }

    #[test]
    fn test_toggle_writes_through_and_publishes() {
        let store = Arc::new(LocalStore::in_memory().unwrap());
        let ctx = SettingsContext::load(store.clone()).unwrap();
        ctx.set_profile(profile()).unwrap();

        let mut rx = ctx.subscribe();
        assert_eq!(ctx.toggle_theme().unwrap(), ThemePreference::Dark);

        assert!(rx.has_changed().unwrap());
        let published = rx.borrow_and_update().clone().unwrap();
        assert_eq!(published.theme, ThemePreference::Dark);
        assert_eq!(store.load_profile().unwrap().unwrap().theme, ThemePreference::Dark);

        let reloaded = SettingsContext::load(store).unwrap();
        assert_eq!(reloaded.theme(), Some(ThemePreference::Dark));
    }

    #[test]
    fn test_sign_out_clears_profile() {
        let ctx = context();
        ctx.set_profile(profile()).unwrap();
        assert_eq!(ctx.current_user_id().unwrap(), "u1");

        ctx.sign_out().unwrap();
        assert_eq!(ctx.current(), None);
    }
}
