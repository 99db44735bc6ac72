use serde_json::json;
use tokensync_core::{
    build_record, decode_claims, extract_identity, identity_from_token, CollectedCredentials,
    CredentialSource, SettingsStore, StatusMessage, StoredSettings, SyncError, SyncGuard,
    SyncOutcome, ValidationReason,
};
use tracing::{info, warn};

use crate::cli_args::{DecodeArgs, ShowArgs, SyncArgs};
use crate::modules::registry::synchronize;

pub(crate) struct SyncContext<'a> {
    pub client: &'a reqwest::Client,
    pub source: &'a dyn CredentialSource,
    pub store: &'a dyn SettingsStore,
    pub allow_insecure: bool,
}

pub(crate) struct SyncAttempt {
    /// Credential problems noticed while collecting, reported even when the
    /// attempt fails for another reason.
    pub diagnostics: Vec<SyncError>,
    pub outcome: SyncOutcome,
}

/// Collect, validate, persist settings, upload. One attempt at a time per
/// guard.
pub(crate) struct Synchronizer<'a> {
    ctx: &'a SyncContext<'a>,
    guard: SyncGuard,
}

impl<'a> Synchronizer<'a> {
    pub(crate) fn new(ctx: &'a SyncContext<'a>, guard: SyncGuard) -> Self {
        Self { ctx, guard }
    }

    pub(crate) async fn run(&self, overrides: &StoredSettings) -> SyncAttempt {
        let mut diagnostics = Vec::new();
        let outcome = self.attempt(overrides, &mut diagnostics).await;
        match &outcome {
            Ok(summary) => info!(
                added = summary.added,
                updated = summary.updated,
                "sync finished"
            ),
            Err(err) => warn!(error = %err, "sync failed"),
        }
        SyncAttempt {
            diagnostics,
            outcome,
        }
    }

    async fn attempt(
        &self,
        overrides: &StoredSettings,
        diagnostics: &mut Vec<SyncError>,
    ) -> SyncOutcome {
        let _permit = self.guard.try_begin()?;

        let settings = self.ctx.store.load()?.merge(overrides);
        let collected = CollectedCredentials::collect(self.ctx.source).await;
        for problem in collected.diagnostics() {
            warn!(problem = %problem, "credential not ready");
            diagnostics.push(problem);
        }

        let record = build_record(&settings, &collected.session, &collected.access)?;
        if settings.server_url.starts_with("http://") && !self.ctx.allow_insecure {
            return Err(ValidationReason::InsecureServerUrl.into());
        }
        self.ctx.store.save(&settings)?;

        info!(email = %record.email, url = %settings.import_url(), "uploading token record");
        eprintln!("{}", StatusMessage::normal("Uploading..."));
        synchronize(self.ctx.client, &settings, record).await
    }
}

pub(crate) async fn handle_sync(args: SyncArgs, ctx: &SyncContext<'_>) -> anyhow::Result<()> {
    let overrides = StoredSettings {
        server_url: args.server_url,
        admin_key: args.admin_key,
        proxy_url: args.proxy_url,
        ..StoredSettings::default()
    };
    let attempt = Synchronizer::new(ctx, SyncGuard::new()).run(&overrides).await;
    for problem in &attempt.diagnostics {
        eprintln!("{}", StatusMessage::from(problem));
    }
    let summary = attempt.outcome?;
    println!("{}", summary.status());
    Ok(())
}

pub(crate) async fn handle_show(args: ShowArgs, ctx: &SyncContext<'_>) -> anyhow::Result<()> {
    let collected = CollectedCredentials::collect(ctx.source).await;
    let email = collected.access.value().and_then(identity_from_token);
    let diagnostics: Vec<String> = collected
        .diagnostics()
        .iter()
        .map(ToString::to_string)
        .collect();

    if args.json {
        let body = json!({
            "session_token": collected.session.value(),
            "access_token": collected.access.value(),
            "email": email,
            "diagnostics": diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("Session cookie: {}", collected.session.display_value());
    println!("Access token:   {}", collected.access.display_value());
    println!(
        "Email:          {}",
        email.as_deref().unwrap_or("(not derivable)")
    );
    for line in diagnostics {
        eprintln!("{line}");
    }
    Ok(())
}

pub(crate) async fn handle_decode(args: DecodeArgs, ctx: &SyncContext<'_>) -> anyhow::Result<()> {
    let token = match args.token {
        Some(token) => token,
        None => {
            let collected = CollectedCredentials::collect(ctx.source).await;
            collected.access.require()?.to_string()
        }
    };
    let claims = decode_claims(&token).map_err(SyncError::from)?;
    println!("{}", serde_json::to_string_pretty(&claims)?);
    match extract_identity(&claims) {
        Some(email) => println!("email: {email}"),
        None => eprintln!("{}", SyncError::IdentityNotDerivable),
    }
    Ok(())
}
