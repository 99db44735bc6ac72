pub(crate) mod args;
mod config;
mod keychain;
pub(crate) mod types;

pub(crate) use config::{
    config_path, ensure_secure_addr, handle_config_command, FileSettingsStore,
};
#[cfg(test)]
pub(crate) use keychain::{clear_keyring_mock, fail_keyring_reads, lock_keyring_tests_async};
