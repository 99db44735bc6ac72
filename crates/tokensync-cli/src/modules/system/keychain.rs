#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(test)]
use std::sync::{Mutex, OnceLock};
#[cfg(test)]
use tokio::sync::Mutex as TokioMutex;
use tracing::debug;
#[cfg(not(test))]
use tracing::warn;

const ADMIN_KEY_ENTRY: &str = "admin-key";

#[cfg(test)]
fn keyring_store() -> &'static Mutex<HashMap<String, String>> {
    static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
    STORE.get_or_init(|| Mutex::new(HashMap::new()))
}

#[cfg(test)]
static KEYRING_READS_FAIL: AtomicBool = AtomicBool::new(false);

#[cfg(test)]
static KEYRING_TEST_LOCK: OnceLock<TokioMutex<()>> = OnceLock::new();

#[cfg(test)]
pub(crate) fn lock_keyring_tests_sync() -> tokio::sync::MutexGuard<'static, ()> {
    KEYRING_TEST_LOCK
        .get_or_init(|| TokioMutex::new(()))
        .blocking_lock()
}

#[cfg(test)]
pub(crate) async fn lock_keyring_tests_async() -> tokio::sync::MutexGuard<'static, ()> {
    KEYRING_TEST_LOCK
        .get_or_init(|| TokioMutex::new(()))
        .lock()
        .await
}

#[cfg(not(test))]
fn keyring_entry(key: &str) -> anyhow::Result<keyring::Entry> {
    keyring::Entry::new("tokensync", key)
        .map_err(|err| anyhow::anyhow!("failed to access keyring: {err}"))
}

#[cfg(not(test))]
fn keyring_set(key: &str, value: &str) -> anyhow::Result<()> {
    let entry = keyring_entry(key)?;
    entry
        .set_password(value)
        .map_err(|err| anyhow::anyhow!("failed to store {key}: {err}"))
}

#[cfg(not(test))]
fn keyring_get(key: &str) -> anyhow::Result<Option<String>> {
    let entry = keyring_entry(key)?;
    match entry.get_password() {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(anyhow::anyhow!("failed to load {key} from keychain: {err}")),
    }
}

#[cfg(not(test))]
fn keyring_delete(key: &str) -> anyhow::Result<()> {
    let entry = keyring_entry(key)?;
    match entry.delete_password() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(err) => {
            warn!("failed to delete {key}: {err}");
            Ok(())
        }
    }
}

#[cfg(test)]
fn keyring_set(key: &str, value: &str) -> anyhow::Result<()> {
    let mut store = keyring_store()
        .lock()
        .map_err(|_| anyhow::anyhow!("failed to lock keyring store"))?;
    store.insert(key.to_string(), value.to_string());
    Ok(())
}

#[cfg(test)]
fn keyring_get(key: &str) -> anyhow::Result<Option<String>> {
    if KEYRING_READS_FAIL.load(Ordering::SeqCst) {
        anyhow::bail!("failed to load {key} from keychain: keychain locked");
    }
    let store = keyring_store()
        .lock()
        .map_err(|_| anyhow::anyhow!("failed to lock keyring store"))?;
    Ok(store.get(key).cloned())
}

#[cfg(test)]
fn keyring_delete(key: &str) -> anyhow::Result<()> {
    let mut store = keyring_store()
        .lock()
        .map_err(|_| anyhow::anyhow!("failed to lock keyring store"))?;
    store.remove(key);
    Ok(())
}

#[cfg(test)]
pub(crate) fn clear_keyring_mock() {
    KEYRING_READS_FAIL.store(false, Ordering::SeqCst);
    if let Ok(mut map) = keyring_store().lock() {
        map.clear();
    }
}

/// Makes every keychain read fail until switched back off.
#[cfg(test)]
pub(crate) fn fail_keyring_reads(fail: bool) {
    KEYRING_READS_FAIL.store(fail, Ordering::SeqCst);
}

pub(crate) fn store_admin_key(admin_key: &str) -> anyhow::Result<()> {
    keyring_set(ADMIN_KEY_ENTRY, admin_key)?;
    debug!("stored admin key in keyring");
    Ok(())
}

pub(crate) fn load_admin_key() -> anyhow::Result<Option<String>> {
    keyring_get(ADMIN_KEY_ENTRY)
}

pub(crate) fn delete_admin_key() -> anyhow::Result<()> {
    keyring_delete(ADMIN_KEY_ENTRY)
}
