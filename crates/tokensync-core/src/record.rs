use serde::{Deserialize, Serialize};

use crate::claims::{decode_claims, extract_identity};
use crate::constants::placeholders;
use crate::constants::registry::{DEFAULT_VIDEO_CONCURRENCY, UNBOUNDED_CONCURRENCY};
use crate::credentials::{AccessArtifact, SessionCredential};
use crate::error::{SyncError, ValidationReason};
use crate::settings::RegistrySettings;

/// One account as the registry import endpoint expects it. Field names are
/// part of the wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub email: String,
    pub access_token: String,
    pub session_token: String,
    #[serde(rename = "proxyUrl")]
    pub proxy_url: String,
    pub is_active: bool,
    pub image_enabled: bool,
    pub video_enabled: bool,
    pub image_concurrency: i64,
    pub video_concurrency: i64,
}

impl TokenRecord {
    #[must_use]
    pub fn new(email: String, access_token: String, session_token: String, proxy_url: String) -> Self {
        Self {
            email,
            access_token,
            session_token,
            proxy_url,
            is_active: true,
            image_enabled: true,
            video_enabled: true,
            image_concurrency: UNBOUNDED_CONCURRENCY,
            video_concurrency: DEFAULT_VIDEO_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPayload {
    pub tokens: Vec<TokenRecord>,
}

impl SyncPayload {
    #[must_use]
    pub fn single(record: TokenRecord) -> Self {
        Self {
            tokens: vec![record],
        }
    }
}

fn is_placeholder(value: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| value.starts_with(prefix))
}

fn ready_access_token(access: &AccessArtifact) -> Option<&str> {
    access
        .value()
        .filter(|value| !value.trim().is_empty())
        .filter(|value| !is_placeholder(value, placeholders::ACCESS_PREFIXES))
}

fn ready_session_token(session: &SessionCredential) -> Option<&str> {
    session
        .value()
        .filter(|value| !value.trim().is_empty())
        .filter(|value| !is_placeholder(value, placeholders::SESSION_PREFIXES))
}

/// Validates settings and artifacts in a fixed order and assembles the record.
/// The first violated rule is reported.
pub fn build_record(
    settings: &RegistrySettings,
    session: &SessionCredential,
    access: &AccessArtifact,
) -> Result<TokenRecord, SyncError> {
    let settings = settings.normalized();
    if settings.server_url.is_empty() {
        return Err(ValidationReason::MissingServerUrl.into());
    }
    if settings.proxy_url.is_empty() {
        return Err(ValidationReason::MissingProxyUrl.into());
    }
    let access_token = ready_access_token(access).ok_or(ValidationReason::AccessTokenNotReady)?;
    let session_token =
        ready_session_token(session).ok_or(ValidationReason::SessionCookieNotReady)?;
    let email = decode_claims(access_token)
        .ok()
        .as_ref()
        .and_then(extract_identity)
        .ok_or(SyncError::IdentityNotDerivable)?;
    Ok(TokenRecord::new(
        email,
        access_token.to_string(),
        session_token.to_string(),
        settings.proxy_url,
    ))
}
