use async_trait::async_trait;

use crate::constants::placeholders;
use crate::error::{CredentialKind, SyncError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCredential {
    Present(String),
    Absent,
    FetchError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessArtifact {
    Present(String),
    Absent,
    /// The session endpoint answered 403; the host session has expired.
    Forbidden,
    FetchError(String),
}

impl SessionCredential {
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }

    /// Text shown in place of the value while it is unusable.
    #[must_use]
    pub fn display_value(&self) -> &str {
        match self {
            Self::Present(value) => value,
            Self::Absent => placeholders::SESSION_NOT_FOUND,
            Self::FetchError(_) => placeholders::SESSION_FETCH_ERROR,
        }
    }

    pub fn require(&self) -> Result<&str, SyncError> {
        match self {
            Self::Present(value) => Ok(value),
            Self::Absent => Err(SyncError::MissingCredential(CredentialKind::SessionCookie)),
            Self::FetchError(message) => Err(SyncError::HostFetchError {
                kind: CredentialKind::SessionCookie,
                message: message.clone(),
            }),
        }
    }
}

impl AccessArtifact {
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn display_value(&self) -> String {
        match self {
            Self::Present(value) => value.clone(),
            Self::Absent => placeholders::ACCESS_NOT_FOUND.to_string(),
            Self::Forbidden => "Failed to fetch session: 403".to_string(),
            Self::FetchError(message) => format!("Error: {message}"),
        }
    }

    pub fn require(&self) -> Result<&str, SyncError> {
        match self {
            Self::Present(value) => Ok(value),
            Self::Absent => Err(SyncError::MissingCredential(CredentialKind::AccessToken)),
            Self::Forbidden => Err(SyncError::SessionExpired),
            Self::FetchError(message) => Err(SyncError::HostFetchError {
                kind: CredentialKind::AccessToken,
                message: message.clone(),
            }),
        }
    }
}

/// Where the two credential artifacts come from. Implementations convert
/// every fault into a state value instead of returning errors.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn session_credential(&self) -> SessionCredential;

    /// `session` is the credential returned by `session_credential` for the
    /// same activation; live hosts forward it with the session-info request.
    async fn access_artifact(&self, session: &SessionCredential) -> AccessArtifact;
}

#[derive(Debug, Clone)]
pub struct StaticCredentialSource {
    pub session: SessionCredential,
    pub access: AccessArtifact,
}

impl StaticCredentialSource {
    #[must_use]
    pub fn new(session: SessionCredential, access: AccessArtifact) -> Self {
        Self { session, access }
    }

    #[must_use]
    pub fn present(session_token: &str, access_token: &str) -> Self {
        Self::new(
            SessionCredential::Present(session_token.to_string()),
            AccessArtifact::Present(access_token.to_string()),
        )
    }
}

#[async_trait]
impl CredentialSource for StaticCredentialSource {
    async fn session_credential(&self) -> SessionCredential {
        self.session.clone()
    }

    async fn access_artifact(&self, _session: &SessionCredential) -> AccessArtifact {
        self.access.clone()
    }
}

/// Both artifacts collected for one activation.
#[derive(Debug, Clone)]
pub struct CollectedCredentials {
    pub session: SessionCredential,
    pub access: AccessArtifact,
}

impl CollectedCredentials {
    pub async fn collect(source: &dyn CredentialSource) -> Self {
        let session = source.session_credential().await;
        let access = source.access_artifact(&session).await;
        Self { session, access }
    }

    /// Problems worth reporting before any sync is attempted, session first.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<SyncError> {
        [self.session.require().err(), self.access.require().err()]
            .into_iter()
            .flatten()
            .collect()
    }
}
