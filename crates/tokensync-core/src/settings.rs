use std::sync::Mutex;

use crate::error::SettingsError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySettings {
    pub server_url: String,
    pub admin_key: Option<String>,
    pub proxy_url: String,
    /// Set when a stored admin key exists but could not be read. A store must
    /// leave that key in place instead of treating `admin_key: None` as a
    /// request to forget it.
    pub keep_stored_admin_key: bool,
}

impl RegistrySettings {
    #[must_use]
    pub fn new(server_url: &str, admin_key: Option<&str>, proxy_url: &str) -> Self {
        Self {
            server_url: server_url.to_string(),
            admin_key: admin_key.map(str::to_string),
            proxy_url: proxy_url.to_string(),
            keep_stored_admin_key: false,
        }
        .normalized()
    }

    /// Trims every field, strips trailing slashes from the server URL and
    /// drops an empty admin key.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            server_url: self.server_url.trim().trim_end_matches('/').to_string(),
            admin_key: self
                .admin_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            proxy_url: self.proxy_url.trim().to_string(),
            keep_stored_admin_key: self.keep_stored_admin_key,
        }
    }

    #[must_use]
    pub fn import_url(&self) -> String {
        format!(
            "{}{}",
            self.server_url.trim_end_matches('/'),
            crate::constants::registry::IMPORT_PATH
        )
    }
}

/// Whatever subset of the settings a store currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSettings {
    pub server_url: Option<String>,
    pub admin_key: Option<String>,
    pub proxy_url: Option<String>,
    /// The store knows of an admin key but failed to read it.
    pub admin_key_unreadable: bool,
}

impl StoredSettings {
    /// Layers `overrides` on top of the stored values; an override that is
    /// present wins even when empty, so a field can be cleared.
    #[must_use]
    pub fn merge(&self, overrides: &StoredSettings) -> RegistrySettings {
        let pick = |over: &Option<String>, stored: &Option<String>| {
            over.clone().or_else(|| stored.clone()).unwrap_or_default()
        };
        RegistrySettings {
            server_url: pick(&overrides.server_url, &self.server_url),
            admin_key: overrides
                .admin_key
                .clone()
                .or_else(|| self.admin_key.clone()),
            proxy_url: pick(&overrides.proxy_url, &self.proxy_url),
            keep_stored_admin_key: overrides.admin_key.is_none() && self.admin_key_unreadable,
        }
        .normalized()
    }
}

impl From<&RegistrySettings> for StoredSettings {
    fn from(settings: &RegistrySettings) -> Self {
        Self {
            server_url: Some(settings.server_url.clone()),
            admin_key: settings.admin_key.clone(),
            proxy_url: Some(settings.proxy_url.clone()),
            admin_key_unreadable: false,
        }
    }
}

/// Persistence for settings across activations. Last write wins.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<StoredSettings, SettingsError>;
    fn save(&self, settings: &RegistrySettings) -> Result<(), SettingsError>;
    fn clear(&self) -> Result<(), SettingsError>;
}

#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    inner: Mutex<StoredSettings>,
    writes: Mutex<usize>,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn with(settings: StoredSettings) -> Self {
        Self {
            inner: Mutex::new(settings),
            writes: Mutex::new(0),
        }
    }

    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.lock().map(|count| *count).unwrap_or_default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<StoredSettings, SettingsError> {
        self.inner
            .lock()
            .map(|settings| settings.clone())
            .map_err(|_| SettingsError::Unavailable("settings lock poisoned".to_string()))
    }

    fn save(&self, settings: &RegistrySettings) -> Result<(), SettingsError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| SettingsError::Unavailable("settings lock poisoned".to_string()))?;
        let kept_key = inner.admin_key.take();
        *inner = StoredSettings::from(settings);
        if settings.keep_stored_admin_key {
            inner.admin_key = kept_key;
        }
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), SettingsError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| SettingsError::Unavailable("settings lock poisoned".to_string()))?;
        *inner = StoredSettings::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_trailing_slash_and_empty_key() {
        let settings = RegistrySettings::new(" https://x.test/ ", Some("  "), " https://p.test ");
        assert_eq!(settings.server_url, "https://x.test");
        assert_eq!(settings.admin_key, None);
        assert_eq!(settings.proxy_url, "https://p.test");
        assert_eq!(settings.import_url(), "https://x.test/api/tokens/import");
    }

    #[test]
    fn overrides_win_over_stored_values() {
        let stored = StoredSettings {
            server_url: Some("https://old.test".to_string()),
            admin_key: Some("secret".to_string()),
            proxy_url: Some("https://p.test".to_string()),
            admin_key_unreadable: false,
        };
        let merged = stored.merge(&StoredSettings {
            server_url: Some("https://new.test/".to_string()),
            admin_key: Some(String::new()),
            ..StoredSettings::default()
        });
        assert_eq!(merged.server_url, "https://new.test");
        assert_eq!(merged.admin_key, None);
        assert_eq!(merged.proxy_url, "https://p.test");
    }

    #[test]
    fn memory_store_counts_writes() {
        let store = MemorySettingsStore::default();
        assert_eq!(store.load().expect("load"), StoredSettings::default());
        store
            .save(&RegistrySettings::new("https://x.test", None, "https://p.test"))
            .expect("save");
        assert_eq!(store.writes(), 1);
        assert_eq!(
            store.load().expect("load").server_url.as_deref(),
            Some("https://x.test")
        );
        store.clear().expect("clear");
        assert_eq!(store.load().expect("load"), StoredSettings::default());
    }

    #[test]
    fn unreadable_key_is_kept_unless_overridden() {
        let stored = StoredSettings {
            server_url: Some("https://x.test".to_string()),
            proxy_url: Some("https://p.test".to_string()),
            admin_key_unreadable: true,
            ..StoredSettings::default()
        };
        let merged = stored.merge(&StoredSettings::default());
        assert_eq!(merged.admin_key, None);
        assert!(merged.keep_stored_admin_key);

        let cleared = stored.merge(&StoredSettings {
            admin_key: Some(String::new()),
            ..StoredSettings::default()
        });
        assert_eq!(cleared.admin_key, None);
        assert!(!cleared.keep_stored_admin_key);
    }

    #[test]
    fn memory_store_keeps_key_it_was_told_to_keep() {
        let store = MemorySettingsStore::with(StoredSettings {
            admin_key: Some("secret".to_string()),
            ..StoredSettings::default()
        });
        let mut settings = RegistrySettings::new("https://x.test", None, "https://p.test");
        settings.keep_stored_admin_key = true;
        store.save(&settings).expect("save");
        assert_eq!(store.load().expect("load").admin_key.as_deref(), Some("secret"));

        store
            .save(&RegistrySettings::new("https://x.test", None, "https://p.test"))
            .expect("save");
        assert_eq!(store.load().expect("load").admin_key, None);
    }
}
