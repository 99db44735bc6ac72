use reqwest::header::CONTENT_TYPE;
use tokensync_core::{
    ImportSummary, RegistrySettings, SyncError, SyncOutcome, SyncPayload, TokenRecord,
};
use tracing::{debug, info, warn};

use super::types::ImportResponse;

/// Posts a single-record payload to the registry import endpoint and
/// classifies the response. No retries.
pub(crate) async fn synchronize(
    client: &reqwest::Client,
    settings: &RegistrySettings,
    record: TokenRecord,
) -> SyncOutcome {
    let url = settings.import_url();
    let payload = SyncPayload::single(record);
    let mut builder = client
        .post(&url)
        .header(CONTENT_TYPE, "application/json")
        .json(&payload);
    if let Some(admin_key) = settings.admin_key.as_deref().filter(|key| !key.is_empty()) {
        builder = builder.bearer_auth(admin_key);
    }

    debug!(
        url = %url,
        tokens = payload.tokens.len(),
        authorized = settings.admin_key.is_some(),
        "http request"
    );
    let start = std::time::Instant::now();
    let response = builder.send().await.map_err(|err| {
        warn!(url = %url, error = %err, "registry unreachable");
        SyncError::NetworkError(err.to_string())
    })?;
    let status = response.status();
    debug!(
        url = %url,
        status = %status,
        elapsed_ms = start.elapsed().as_millis(),
        "http response"
    );

    if !status.is_success() {
        return Err(SyncError::RemoteRejected {
            status: Some(status.as_u16()),
            message: status
                .canonical_reason()
                .map_or_else(|| status.to_string(), str::to_string),
        });
    }

    let body: ImportResponse = response
        .json()
        .await
        .map_err(|err| SyncError::NetworkError(err.to_string()))?;
    if !body.success {
        let message = body
            .message
            .unwrap_or_else(|| "registry reported failure".to_string());
        return Err(SyncError::RemoteRejected {
            status: None,
            message,
        });
    }

    info!(added = body.added, updated = body.updated, "registry import accepted");
    Ok(ImportSummary {
        added: body.added,
        updated: body.updated,
    })
}
