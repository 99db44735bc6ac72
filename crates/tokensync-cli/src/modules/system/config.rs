use std::fs;
use std::path::{Path, PathBuf};

use tokensync_core::{RegistrySettings, SettingsError, SettingsStore, StoredSettings};
use tracing::{debug, warn};

use super::keychain::{delete_admin_key, load_admin_key, store_admin_key};
use super::types::CliConfig;
use crate::cli_args::{ConfigArgs, ConfigCommand};

pub(crate) fn handle_config_command(
    args: ConfigArgs,
    store: &FileSettingsStore,
) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let settings = store.load()?;
            println!(
                "serverUrl: {}",
                settings.server_url.as_deref().unwrap_or("(not set)")
            );
            println!(
                "proxyUrl:  {}",
                settings.proxy_url.as_deref().unwrap_or("(not set)")
            );
            println!(
                "adminKey:  {}",
                settings
                    .admin_key
                    .as_deref()
                    .map(mask_secret)
                    .unwrap_or_else(|| "(not set)".to_string())
            );
        }
        ConfigCommand::Clear => {
            store.clear()?;
            println!("Settings cleared");
        }
    }
    Ok(())
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 8 {
        return "********".to_string();
    }
    format!("********{visible}")
}

pub(crate) fn config_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("HOME is not set"))?;
    Ok(Path::new(&home).join(".tokensync").join("config.json"))
}

pub(crate) fn load_config(path: &Path) -> anyhow::Result<CliConfig> {
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let contents = fs::read_to_string(path)?;
    let config = serde_json::from_str(&contents)?;
    Ok(config)
}

pub(crate) fn save_config(path: &Path, config: &CliConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

pub(crate) fn ensure_secure_addr(addr: &str, allow_insecure: bool) -> anyhow::Result<()> {
    if addr.starts_with("http://") && !allow_insecure {
        anyhow::bail!("refusing to use http:// without --insecure");
    }
    Ok(())
}

/// Settings kept in `config.json`; the admin key goes to the OS keychain and
/// the file only records that one was stored.
pub(crate) struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read(&self) -> Result<CliConfig, SettingsError> {
        load_config(&self.path).map_err(|err| SettingsError::Corrupt(err.to_string()))
    }

    fn write(&self, config: &CliConfig) -> Result<(), SettingsError> {
        save_config(&self.path, config).map_err(|err| SettingsError::Unavailable(err.to_string()))
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Result<StoredSettings, SettingsError> {
        let config = self.read()?;
        let (admin_key, admin_key_unreadable) = if config.admin_key_stored {
            match load_admin_key() {
                Ok(admin_key) => (admin_key, false),
                Err(err) => {
                    warn!(error = %err, "admin key unavailable; continuing without it");
                    (None, true)
                }
            }
        } else {
            (None, false)
        };
        debug!(path = %self.path.display(), "loaded settings");
        Ok(StoredSettings {
            server_url: config.server_url,
            admin_key,
            proxy_url: config.proxy_url,
            admin_key_unreadable,
        })
    }

    fn save(&self, settings: &RegistrySettings) -> Result<(), SettingsError> {
        let previous = self.read().unwrap_or_default();
        let admin_key_stored = match settings.admin_key.as_deref() {
            Some(admin_key) => match store_admin_key(admin_key) {
                Ok(()) => true,
                Err(err) => {
                    warn!(error = %err, "admin key not persisted");
                    previous.admin_key_stored
                }
            },
            None if settings.keep_stored_admin_key => previous.admin_key_stored,
            None => {
                if previous.admin_key_stored {
                    delete_admin_key()
                        .unwrap_or_else(|err| warn!(error = %err, "admin key not removed"));
                }
                false
            }
        };
        self.write(&CliConfig {
            server_url: Some(settings.server_url.clone()),
            proxy_url: Some(settings.proxy_url.clone()),
            admin_key_stored,
        })?;
        debug!(path = %self.path.display(), "saved settings");
        Ok(())
    }

    fn clear(&self) -> Result<(), SettingsError> {
        let previous = self.read().unwrap_or_default();
        if previous.admin_key_stored {
            delete_admin_key().unwrap_or_else(|err| warn!(error = %err, "admin key not removed"));
        }
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|err| SettingsError::Unavailable(err.to_string()))?;
        }
        Ok(())
    }
}
