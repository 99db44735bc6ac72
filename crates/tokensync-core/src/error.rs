use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    SessionCookie,
    AccessToken,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionCookie => f.write_str("session cookie"),
            Self::AccessToken => f.write_str("access token"),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    #[error("Server URL is required.")]
    MissingServerUrl,
    #[error("Proxy URL is required.")]
    MissingProxyUrl,
    #[error("Access Token not ready.")]
    AccessTokenNotReady,
    #[error("Session Cookie not ready.")]
    SessionCookieNotReady,
    #[error("Refusing to use http:// without --insecure.")]
    InsecureServerUrl,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected at least 2 dot-separated segments, found {0}")]
    MalformedToken(usize),
    #[error("payload segment is not valid base64: {0}")]
    InvalidEncoding(String),
    #[error("payload segment is not valid UTF-8")]
    InvalidUtf8,
    #[error("payload segment is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("payload segment is not a JSON object")]
    NotAnObject,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("settings storage unavailable: {0}")]
    Unavailable(String),
    #[error("settings are corrupt: {0}")]
    Corrupt(String),
}

/// Every way a sync attempt can end other than success. The `Display` output
/// is the status line shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("{}", missing_credential_message(.0))]
    MissingCredential(CredentialKind),
    #[error("Failed to fetch {kind}: {message}")]
    HostFetchError {
        kind: CredentialKind,
        message: String,
    },
    #[error("403 Forbidden. Please refresh page.")]
    SessionExpired,
    #[error("Failed to parse token: {0}")]
    DecodeFailure(#[from] DecodeError),
    #[error("Could not extract email from token.")]
    IdentityNotDerivable,
    #[error("{0}")]
    ValidationFailure(ValidationReason),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("{}", remote_rejected_message(.status, .message))]
    RemoteRejected { status: Option<u16>, message: String },
    #[error("A sync is already in progress.")]
    SyncInProgress,
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl From<ValidationReason> for SyncError {
    fn from(reason: ValidationReason) -> Self {
        Self::ValidationFailure(reason)
    }
}

fn missing_credential_message(kind: &CredentialKind) -> &'static str {
    match kind {
        CredentialKind::SessionCookie => "Session cookie not found.",
        CredentialKind::AccessToken => "accessToken not found in response.",
    }
}

fn remote_rejected_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Error {code}: {message}"),
        None => format!("Upload failed: {message}"),
    }
}
