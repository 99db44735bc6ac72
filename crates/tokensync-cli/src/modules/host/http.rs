use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::StatusCode;
use tokensync_core::constants::host::{SESSION_COOKIE_NAME, SESSION_INFO_PATH};
use tokensync_core::{AccessArtifact, CredentialSource, SessionCredential};
use tracing::{debug, warn};

use super::cookies::read_cookie;
use super::types::SessionInfoResponse;

/// Credentials read from the real host: the cookie jar for the session
/// cookie, the session endpoint for the access token. Either may be pinned
/// from the command line instead.
pub(crate) struct LiveHost {
    pub client: reqwest::Client,
    pub host: String,
    pub cookies_file: Option<PathBuf>,
    pub session_override: Option<String>,
    pub access_override: Option<String>,
}

impl LiveHost {
    fn host_name(&self) -> anyhow::Result<String> {
        let url = reqwest::Url::parse(&self.host)?;
        url.host_str()
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| anyhow::anyhow!("host URL has no host name: {}", self.host))
    }

    fn read_session_cookie(&self) -> anyhow::Result<Option<String>> {
        let path = self.cookies_file.as_deref().ok_or_else(|| {
            anyhow::anyhow!("no cookie jar configured (use --cookies-file or --session-token)")
        })?;
        read_cookie(path, &self.host_name()?, SESSION_COOKIE_NAME)
    }
}

#[async_trait]
impl CredentialSource for LiveHost {
    async fn session_credential(&self) -> SessionCredential {
        if let Some(value) = self.session_override.clone() {
            return SessionCredential::Present(value);
        }
        match self.read_session_cookie() {
            Ok(Some(value)) => {
                debug!(len = value.len(), "session cookie found");
                SessionCredential::Present(value)
            }
            Ok(None) => {
                warn!(host = %self.host, "session cookie not found; log in to the host first");
                SessionCredential::Absent
            }
            Err(err) => {
                warn!(error = %err, "failed to read session cookie");
                SessionCredential::FetchError(err.to_string())
            }
        }
    }

    async fn access_artifact(&self, session: &SessionCredential) -> AccessArtifact {
        if let Some(value) = self.access_override.clone() {
            return AccessArtifact::Present(value);
        }
        fetch_access_artifact(&self.client, &self.host, session.value()).await
    }
}

fn session_info_url(host: &str) -> String {
    format!("{}{}", host.trim_end_matches('/'), SESSION_INFO_PATH)
}

pub(crate) async fn fetch_access_artifact(
    client: &reqwest::Client,
    host: &str,
    session_token: Option<&str>,
) -> AccessArtifact {
    let url = session_info_url(host);
    let mut builder = client.get(&url);
    if let Some(token) = session_token {
        builder = builder.header(COOKIE, format!("{SESSION_COOKIE_NAME}={token}"));
    }

    debug!(url = %url, with_cookie = session_token.is_some(), "http request");
    let start = std::time::Instant::now();
    let response = match builder.send().await {
        Ok(response) => response,
        Err(err) => {
            warn!(url = %url, error = %err, "session info request failed");
            return AccessArtifact::FetchError(err.to_string());
        }
    };
    let status = response.status();
    debug!(
        url = %url,
        status = %status,
        elapsed_ms = start.elapsed().as_millis(),
        "http response"
    );

    if status == StatusCode::FORBIDDEN {
        warn!(url = %url, "session info forbidden; host session expired");
        return AccessArtifact::Forbidden;
    }
    if !status.is_success() {
        return AccessArtifact::FetchError(format!("HTTP {}", status.as_u16()));
    }

    let info = match response.json::<SessionInfoResponse>().await {
        Ok(info) => info,
        Err(err) => {
            warn!(url = %url, error = %err, "session info body unreadable");
            return AccessArtifact::FetchError(err.to_string());
        }
    };
    debug!(expires = ?info.expires, "session info received");
    match info.access_token.filter(|token| !token.trim().is_empty()) {
        Some(token) => AccessArtifact::Present(token),
        None => AccessArtifact::Absent,
    }
}
