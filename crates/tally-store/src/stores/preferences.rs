//! # Preferences Store
//!
//! Observable singleton for user preferences (currency, date format,
//! theme, language). Auto-persists like the collection stores.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use tally_core::types::{DateFormat, Theme, UserPreferences};

use crate::local::LocalStore;
use crate::stores::spawn_persist;

/// Partial preferences update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PreferencesPatch {
    pub currency: Option<String>,
    pub date_format: Option<DateFormat>,
    pub theme: Option<Theme>,
    pub language: Option<String>,
}

/// Observable store for the preferences singleton.
pub struct PreferencesStore {
    tx: watch::Sender<UserPreferences>,
    local: LocalStore,
    persist: JoinHandle<()>,
}

impl PreferencesStore {
    /// Creates the store, seeding from the local store.
    pub async fn new(local: LocalStore) -> Self {
        let initial = local.load().await.preferences;
        let (tx, _) = watch::channel(initial);

        let persist_local = local.clone();
        let persist = spawn_persist(
            "preferences",
            tx.subscribe(),
            move |preferences: UserPreferences| {
                let local = persist_local.clone();
                async move { local.save_preferences(&preferences).await }
            },
        );

        PreferencesStore { tx, local, persist }
    }

    /// Re-reads preferences from the local store.
    pub async fn init(&self) {
        let preferences = self.local.load().await.preferences;
        self.tx.send_replace(preferences);
    }

    /// Current preferences snapshot.
    pub fn snapshot(&self) -> UserPreferences {
        self.tx.borrow().clone()
    }

    /// Subscribes to preference changes.
    pub fn subscribe(&self) -> watch::Receiver<UserPreferences> {
        self.tx.subscribe()
    }

    /// Replaces the whole preferences value.
    pub fn set(&self, preferences: UserPreferences) {
        self.tx.send_replace(preferences);
    }

    /// Applies a partial update.
    pub fn update(&self, patch: PreferencesPatch) {
        self.tx.send_modify(|prefs| {
            if let Some(currency) = patch.currency {
                prefs.currency = currency;
            }
            if let Some(date_format) = patch.date_format {
                prefs.date_format = date_format;
            }
            if let Some(theme) = patch.theme {
                prefs.theme = theme;
            }
            if let Some(language) = patch.language {
                prefs.language = language;
            }
        });
    }

    /// Sets the display currency.
    pub fn set_currency(&self, currency: impl Into<String>) {
        let currency = currency.into();
        self.tx.send_modify(|prefs| prefs.currency = currency);
    }

    /// Sets the date display format.
    pub fn set_date_format(&self, date_format: DateFormat) {
        self.tx.send_modify(|prefs| prefs.date_format = date_format);
    }

    /// Sets the UI theme.
    pub fn set_theme(&self, theme: Theme) {
        self.tx.send_modify(|prefs| prefs.theme = theme);
    }

    /// Sets the UI language.
    pub fn set_language(&self, language: impl Into<String>) {
        let language = language.into();
        self.tx.send_modify(|prefs| prefs.language = language);
    }

    /// Restores the default preferences.
    pub fn reset_to_defaults(&self) {
        self.tx.send_replace(UserPreferences::default());
    }
}

impl Drop for PreferencesStore {
    fn drop(&mut self) {
        self.persist.abort();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use std::time::Duration;

    async fn store() -> PreferencesStore {
        PreferencesStore::new(LocalStore::open(StoreConfig::in_memory()).await).await
    }

    #[tokio::test]
    async fn test_defaults() {
        let store = store().await;
        assert_eq!(store.snapshot(), UserPreferences::default());
    }

    #[tokio::test]
    async fn test_setters_and_patch() {
        let store = store().await;
        store.set_currency("EUR");
        store.set_theme(Theme::Light);
        store.update(PreferencesPatch {
            language: Some("de".to_string()),
            ..PreferencesPatch::default()
        });

        let prefs = store.snapshot();
        assert_eq!(prefs.currency, "EUR");
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(prefs.language, "de");
        // Untouched field keeps its default.
        assert_eq!(prefs.date_format, DateFormat::MonthDayYear);
    }

    #[tokio::test]
    async fn test_reset() {
        let store = store().await;
        store.set_currency("JPY");
        store.reset_to_defaults();
        assert_eq!(store.snapshot(), UserPreferences::default());
    }

    #[tokio::test]
    async fn test_auto_persist() {
        let local = LocalStore::open(StoreConfig::in_memory()).await;
        let store = PreferencesStore::new(local.clone()).await;
        store.set_currency("GBP");

        for _ in 0..100 {
            if local.load().await.preferences.currency == "GBP" {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("preferences were never persisted");
    }
}
