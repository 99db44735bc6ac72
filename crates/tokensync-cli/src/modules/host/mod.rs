pub(crate) mod args;
mod cookies;
mod http;
pub(crate) mod types;

#[cfg(test)]
pub(crate) use http::fetch_access_artifact;
pub(crate) use http::LiveHost;

use tokensync_core::{CredentialSource, StaticCredentialSource};

use crate::modules::system::ensure_secure_addr;
use args::HostArgs;

/// Both artifacts pinned on the command line means the host is never
/// contacted.
pub(crate) fn resolve_credential_source(
    args: &HostArgs,
    client: &reqwest::Client,
    allow_insecure: bool,
) -> anyhow::Result<Box<dyn CredentialSource>> {
    if let (Some(session), Some(access)) = (&args.session_token, &args.access_token) {
        return Ok(Box::new(StaticCredentialSource::present(session, access)));
    }
    ensure_secure_addr(&args.host, allow_insecure)?;
    Ok(Box::new(LiveHost {
        client: client.clone(),
        host: args.host.clone(),
        cookies_file: args.cookies_file.clone(),
        session_override: args.session_token.clone(),
        access_override: args.access_token.clone(),
    }))
}
