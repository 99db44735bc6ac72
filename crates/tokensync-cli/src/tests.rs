use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use mockito::{Matcher, Server};
use serde_json::json;
use std::io::Write;
use tokensync_core::{
    AccessArtifact, CredentialKind, CredentialSource, ImportSummary, MemorySettingsStore,
    RegistrySettings, SessionCredential, SettingsStore, StaticCredentialSource, StoredSettings,
    SyncError, SyncGuard, TokenRecord, ValidationReason,
};

use crate::modules::host::{fetch_access_artifact, LiveHost};
use crate::modules::registry::synchronize;
use crate::modules::sync::{SyncContext, Synchronizer};

fn access_token_for(email: &str) -> String {
    let body = URL_SAFE_NO_PAD.encode(
        json!({
            "https://api.openai.com/profile": { "email": email },
            "exp": 1_900_000_000
        })
        .to_string(),
    );
    format!("eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{body}.signature")
}

fn record(access_token: &str) -> TokenRecord {
    TokenRecord::new(
        "u@example.com".to_string(),
        access_token.to_string(),
        "abc123".to_string(),
        "https://p.test".to_string(),
    )
}

fn stored(server_url: &str) -> StoredSettings {
    StoredSettings {
        server_url: Some(server_url.to_string()),
        proxy_url: Some("https://p.test".to_string()),
        ..StoredSettings::default()
    }
}

#[tokio::test]
async fn synchronize_posts_payload_with_bearer_key() {
    let mut server = Server::new_async().await;
    let token = access_token_for("u@example.com");
    let mock = server
        .mock("POST", "/api/tokens/import")
        .match_header("authorization", "Bearer admin-key")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "tokens": [{
                "email": "u@example.com",
                "access_token": token,
                "session_token": "abc123",
                "proxyUrl": "https://p.test",
                "is_active": true,
                "image_enabled": true,
                "video_enabled": true,
                "image_concurrency": -1,
                "video_concurrency": 3
            }]
        })))
        .with_status(200)
        .with_body(json!({ "success": true, "added": 1, "updated": 0 }).to_string())
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let settings = RegistrySettings::new(&server.url(), Some("admin-key"), "https://p.test");
    let outcome = synchronize(&client, &settings, record(&token)).await;

    assert_eq!(
        outcome,
        Ok(ImportSummary {
            added: 1,
            updated: 0
        })
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn synchronize_omits_authorization_without_key() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/tokens/import")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(json!({ "success": true, "added": 0, "updated": 1 }).to_string())
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let settings = RegistrySettings::new(&format!("{}/", server.url()), Some(""), "https://p.test");
    let outcome = synchronize(&client, &settings, record("at")).await;

    assert_eq!(
        outcome,
        Ok(ImportSummary {
            added: 0,
            updated: 1
        })
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn synchronize_classifies_http_errors() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/tokens/import")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let settings = RegistrySettings::new(&server.url(), None, "https://p.test");
    let outcome = synchronize(&client, &settings, record("at")).await;

    assert_eq!(
        outcome,
        Err(SyncError::RemoteRejected {
            status: Some(500),
            message: "Internal Server Error".to_string(),
        })
    );
    let status = tokensync_core::outcome_status(&outcome);
    assert_eq!(status.text, "Error 500: Internal Server Error");
}

#[tokio::test]
async fn synchronize_nonstandard_status_keeps_code_as_text() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/tokens/import")
        .with_status(599)
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let settings = RegistrySettings::new(&server.url(), None, "https://p.test");
    let outcome = synchronize(&client, &settings, record("at")).await;

    match outcome {
        Err(SyncError::RemoteRejected {
            status: Some(599),
            ref message,
        }) => assert!(message.starts_with("599")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn synchronize_reports_registry_refusal() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/tokens/import")
        .with_status(200)
        .with_body(json!({ "success": false, "message": "invalid proxy" }).to_string())
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let settings = RegistrySettings::new(&server.url(), None, "https://p.test");
    let outcome = synchronize(&client, &settings, record("at")).await;

    assert_eq!(
        outcome,
        Err(SyncError::RemoteRejected {
            status: None,
            message: "invalid proxy".to_string(),
        })
    );
}

#[tokio::test]
async fn synchronize_unreachable_registry_is_network_error() {
    let client = reqwest::Client::new();
    let settings = RegistrySettings::new("http://127.0.0.1:1", None, "https://p.test");
    let outcome = synchronize(&client, &settings, record("at")).await;
    assert!(matches!(outcome, Err(SyncError::NetworkError(_))));
}

#[tokio::test]
async fn synchronize_unreadable_success_body_is_network_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/tokens/import")
        .with_status(200)
        .with_body("<html>ok</html>")
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let settings = RegistrySettings::new(&server.url(), None, "https://p.test");
    let outcome = synchronize(&client, &settings, record("at")).await;
    assert!(matches!(outcome, Err(SyncError::NetworkError(_))));
}

#[tokio::test]
async fn session_info_states() {
    let mut server = Server::new_async().await;
    let token = access_token_for("u@example.com");
    let ok = server
        .mock("GET", "/api/auth/session")
        .match_header("cookie", "__Secure-next-auth.session-token=abc123")
        .with_status(200)
        .with_body(json!({ "accessToken": token, "expires": "2030-01-01T00:00:00Z" }).to_string())
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let artifact = fetch_access_artifact(&client, &server.url(), Some("abc123")).await;
    assert_eq!(artifact, AccessArtifact::Present(token));
    ok.assert_async().await;

    server.reset_async().await;
    server
        .mock("GET", "/api/auth/session")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let artifact = fetch_access_artifact(&client, &server.url(), None).await;
    assert_eq!(artifact, AccessArtifact::Absent);

    server.reset_async().await;
    server
        .mock("GET", "/api/auth/session")
        .with_status(403)
        .create_async()
        .await;
    let artifact = fetch_access_artifact(&client, &server.url(), Some("abc123")).await;
    assert_eq!(artifact, AccessArtifact::Forbidden);
    assert_eq!(artifact.require(), Err(SyncError::SessionExpired));

    server.reset_async().await;
    server
        .mock("GET", "/api/auth/session")
        .with_status(502)
        .create_async()
        .await;
    let artifact = fetch_access_artifact(&client, &server.url(), Some("abc123")).await;
    assert_eq!(artifact, AccessArtifact::FetchError("HTTP 502".to_string()));
    assert_eq!(artifact.display_value(), "Error: HTTP 502");
    assert_eq!(
        artifact.require().err().map(|err| err.to_string()).as_deref(),
        Some("Failed to fetch access token: HTTP 502")
    );
}

#[tokio::test]
async fn live_host_reads_cookie_jar_and_forwards_cookie() {
    let mut server = Server::new_async().await;
    let token = access_token_for("u@example.com");
    let mock = server
        .mock("GET", "/api/auth/session")
        .match_header("cookie", "__Secure-next-auth.session-token=jar-value")
        .with_status(200)
        .with_body(json!({ "accessToken": token }).to_string())
        .create_async()
        .await;

    let mut jar = tempfile::NamedTempFile::new().expect("jar");
    writeln!(jar, "# Netscape HTTP Cookie File").expect("write");
    writeln!(
        jar,
        "#HttpOnly_127.0.0.1\tFALSE\t/\tFALSE\t0\t__Secure-next-auth.session-token\tjar-value"
    )
    .expect("write");

    let host = LiveHost {
        client: reqwest::Client::new(),
        host: server.url(),
        cookies_file: Some(jar.path().to_path_buf()),
        session_override: None,
        access_override: None,
    };
    let session = host.session_credential().await;
    assert_eq!(session, SessionCredential::Present("jar-value".to_string()));
    let access = host.access_artifact(&session).await;
    assert_eq!(access, AccessArtifact::Present(token));
    mock.assert_async().await;
}

#[tokio::test]
async fn live_host_without_jar_is_fetch_error() {
    let host = LiveHost {
        client: reqwest::Client::new(),
        host: "https://chatgpt.com".to_string(),
        cookies_file: None,
        session_override: None,
        access_override: Some("pinned".to_string()),
    };
    let session = host.session_credential().await;
    assert!(matches!(session, SessionCredential::FetchError(_)));
    assert!(matches!(
        session.require(),
        Err(SyncError::HostFetchError {
            kind: CredentialKind::SessionCookie,
            ..
        })
    ));
    assert_eq!(
        host.access_artifact(&session).await,
        AccessArtifact::Present("pinned".to_string())
    );
}

#[tokio::test]
async fn pipeline_uploads_and_persists_settings_once() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/tokens/import")
        .with_status(200)
        .with_body(json!({ "success": true, "added": 1, "updated": 0 }).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let source = StaticCredentialSource::present("abc123", &access_token_for("u@example.com"));
    let store = MemorySettingsStore::with(stored(&server.url()));
    let ctx = SyncContext {
        client: &client,
        source: &source,
        store: &store,
        allow_insecure: true,
    };

    let attempt = Synchronizer::new(&ctx, SyncGuard::new())
        .run(&StoredSettings::default())
        .await;

    assert!(attempt.diagnostics.is_empty());
    assert_eq!(
        attempt.outcome,
        Ok(ImportSummary {
            added: 1,
            updated: 0
        })
    );
    assert_eq!(store.writes(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn pipeline_validation_failure_sends_nothing_and_keeps_settings() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/tokens/import")
        .expect(0)
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let source = StaticCredentialSource::new(
        SessionCredential::Absent,
        AccessArtifact::Present(access_token_for("u@example.com")),
    );
    let store = MemorySettingsStore::default();
    let ctx = SyncContext {
        client: &client,
        source: &source,
        store: &store,
        allow_insecure: true,
    };
    let overrides = stored(&server.url());

    let attempt = Synchronizer::new(&ctx, SyncGuard::new())
        .run(&overrides)
        .await;

    assert_eq!(
        attempt.diagnostics,
        vec![SyncError::MissingCredential(CredentialKind::SessionCookie)]
    );
    assert_eq!(
        attempt.outcome,
        Err(ValidationReason::SessionCookieNotReady.into())
    );
    assert_eq!(store.writes(), 0);
    assert_eq!(store.load().expect("load"), StoredSettings::default());
    mock.assert_async().await;
}

#[tokio::test]
async fn pipeline_refuses_plain_http_without_insecure() {
    let client = reqwest::Client::new();
    let source = StaticCredentialSource::present("abc123", &access_token_for("u@example.com"));
    let store = MemorySettingsStore::with(stored("http://registry.local"));
    let ctx = SyncContext {
        client: &client,
        source: &source,
        store: &store,
        allow_insecure: false,
    };

    let attempt = Synchronizer::new(&ctx, SyncGuard::new())
        .run(&StoredSettings::default())
        .await;

    assert_eq!(
        attempt.outcome,
        Err(ValidationReason::InsecureServerUrl.into())
    );
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn pipeline_rejects_reentrant_trigger() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/tokens/import")
        .expect(0)
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let source = StaticCredentialSource::present("abc123", &access_token_for("u@example.com"));
    let store = MemorySettingsStore::with(stored(&server.url()));
    let ctx = SyncContext {
        client: &client,
        source: &source,
        store: &store,
        allow_insecure: true,
    };
    let guard = SyncGuard::new();
    let held = guard.try_begin().expect("first trigger");

    let attempt = Synchronizer::new(&ctx, guard.clone())
        .run(&StoredSettings::default())
        .await;

    assert_eq!(attempt.outcome, Err(SyncError::SyncInProgress));
    assert_eq!(store.writes(), 0);
    drop(held);
    assert!(!guard.is_busy());
    mock.assert_async().await;
}

#[tokio::test]
async fn resubmitting_reports_each_response() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/tokens/import")
        .with_status(200)
        .with_body(json!({ "success": true, "added": 0, "updated": 1 }).to_string())
        .expect(2)
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let source = StaticCredentialSource::present("abc123", &access_token_for("u@example.com"));
    let store = MemorySettingsStore::with(stored(&server.url()));
    let ctx = SyncContext {
        client: &client,
        source: &source,
        store: &store,
        allow_insecure: true,
    };
    let sync = Synchronizer::new(&ctx, SyncGuard::new());

    let first = sync.run(&StoredSettings::default()).await;
    let second = sync.run(&StoredSettings::default()).await;

    let expected = Ok(ImportSummary {
        added: 0,
        updated: 1,
    });
    assert_eq!(first.outcome, expected);
    assert_eq!(second.outcome, expected);
    assert_eq!(store.writes(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn file_store_keeps_admin_key_out_of_config() {
    let _guard = crate::modules::system::lock_keyring_tests_async().await;
    crate::modules::system::clear_keyring_mock();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    let store = crate::modules::system::FileSettingsStore::new(path.clone());

    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/tokens/import")
        .match_header("authorization", "Bearer stored-key")
        .with_status(200)
        .with_body(json!({ "success": true, "added": 1, "updated": 0 }).to_string())
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let source = StaticCredentialSource::present("abc123", &access_token_for("u@example.com"));
    let ctx = SyncContext {
        client: &client,
        source: &source,
        store: &store,
        allow_insecure: true,
    };
    let overrides = StoredSettings {
        admin_key: Some("stored-key".to_string()),
        ..stored(&server.url())
    };
    let attempt = Synchronizer::new(&ctx, SyncGuard::new())
        .run(&overrides)
        .await;
    assert!(attempt.outcome.is_ok());

    let raw = std::fs::read_to_string(&path).expect("config");
    assert!(!raw.contains("stored-key"));
    let reloaded = store.load().expect("load");
    assert_eq!(reloaded.admin_key.as_deref(), Some("stored-key"));
}

#[tokio::test]
async fn sync_survives_unreadable_keychain_and_keeps_admin_key() {
    let _guard = crate::modules::system::lock_keyring_tests_async().await;
    crate::modules::system::clear_keyring_mock();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    let store = crate::modules::system::FileSettingsStore::new(path.clone());

    let mut server = Server::new_async().await;
    store
        .save(&RegistrySettings::new(
            &server.url(),
            Some("stored-key"),
            "https://p.test",
        ))
        .expect("seed settings");
    let mock = server
        .mock("POST", "/api/tokens/import")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(json!({ "success": true, "added": 0, "updated": 1 }).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let source = StaticCredentialSource::present("abc123", &access_token_for("u@example.com"));
    let ctx = SyncContext {
        client: &client,
        source: &source,
        store: &store,
        allow_insecure: true,
    };
    crate::modules::system::fail_keyring_reads(true);
    let attempt = Synchronizer::new(&ctx, SyncGuard::new())
        .run(&StoredSettings::default())
        .await;
    crate::modules::system::fail_keyring_reads(false);

    assert_eq!(
        attempt.outcome,
        Ok(ImportSummary {
            added: 0,
            updated: 1,
        })
    );
    mock.assert_async().await;
    let raw = std::fs::read_to_string(&path).expect("config");
    assert!(raw.contains("\"adminKeyStored\": true"));
    assert_eq!(
        store.load().expect("load").admin_key.as_deref(),
        Some("stored-key")
    );
}
