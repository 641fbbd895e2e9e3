//! Credential resolution for the provider
//!
//! Exactly one credential is produced per configure, in priority order:
//! explicit env bearer token, explicit env API key, the configured
//! `api_key` attribute, then the device-flow refresh grant using a
//! refresh token from the local credential store. There is no
//! interactive device-code flow; a missing stored refresh token is
//! fatal.

use crate::api::{ApiError, Client};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;
use url::Url;

pub const TOKEN_ENV: &str = "STARTRAIL_TOKEN";
pub const API_KEY_ENV: &str = "STARTRAIL_API_KEY";

const KEYRING_SERVICE: &str = "startrail";
pub const REFRESH_TOKEN_ENTRY: &str = "refresh_token";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unable to authenticate, got error: {0}")]
    Api(#[from] ApiError),

    #[error("Unable to authenticate, got status code: {0}")]
    Discovery(u16),

    #[error("Device flow is not enabled for the tenant. Please pass an 'api_key' instead")]
    DeviceFlowDisabled,

    #[error("No stored refresh token found. Log in with the Startrail CLI or pass an 'api_key'")]
    MissingRefreshToken,

    #[error("Refresh token exchange returned status {status}: {body}")]
    TokenExchange { status: u16, body: String },

    #[error("Credential store error: {0}")]
    Store(String),
}

/// The one credential attached to every client call after configure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Bearer(String),
    ApiKey(String),
}

impl Credential {
    pub fn authorization_header(&self) -> String {
        match self {
            Credential::Bearer(token) => format!("Bearer {}", token),
            Credential::ApiKey(key) => format!("apiKey {}", key),
        }
    }
}

/// Storage for the device-flow refresh token. The keyring implementation
/// is used in the provider; the in-memory one exists for tests.
pub trait CredentialStore: Send + Sync {
    fn get(&self, entry: &str) -> Result<Option<String>, AuthError>;
    fn set(&self, entry: &str, value: &str) -> Result<(), AuthError>;
}

/// OS keychain store scoped to the fixed `startrail` service name.
#[derive(Default)]
pub struct KeyringStore;

impl KeyringStore {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, entry: &str) -> Result<Option<String>, AuthError> {
        match keyring::Entry::new(KEYRING_SERVICE, entry).and_then(|e| e.get_password()) {
            Ok(password) => Ok(Some(password)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AuthError::Store(e.to_string())),
        }
    }

    fn set(&self, entry: &str, value: &str) -> Result<(), AuthError> {
        keyring::Entry::new(KEYRING_SERVICE, entry)
            .and_then(|e| e.set_password(value))
            .map_err(|e| AuthError::Store(e.to_string()))
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_refresh_token(token: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap()
            .insert(REFRESH_TOKEN_ENTRY.to_string(), token.to_string());
        store
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, entry: &str) -> Result<Option<String>, AuthError> {
        Ok(self.entries.lock().unwrap().get(entry).cloned())
    }

    fn set(&self, entry: &str, value: &str) -> Result<(), AuthError> {
        self.entries
            .lock()
            .unwrap()
            .insert(entry.to_string(), value.to_string());
        Ok(())
    }
}

/// Resolves the credential for this provider instance.
pub async fn resolve_credential(
    endpoint: &Url,
    api_key: Option<&str>,
    store: &dyn CredentialStore,
) -> Result<Credential, AuthError> {
    if let Some(token) = non_empty_env(TOKEN_ENV) {
        tracing::debug!("using bearer token from {}", TOKEN_ENV);
        return Ok(Credential::Bearer(token));
    }
    if let Some(key) = non_empty_env(API_KEY_ENV) {
        tracing::debug!("using API key from {}", API_KEY_ENV);
        return Ok(Credential::ApiKey(key));
    }
    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        tracing::debug!("using API key from provider configuration");
        return Ok(Credential::ApiKey(key.to_string()));
    }

    device_flow_credential(endpoint, store).await
}

/// Exchanges the stored refresh token for an access token. Discovery and
/// the token grant are each attempted once; any rotated refresh token is
/// written back best-effort.
async fn device_flow_credential(
    endpoint: &Url,
    store: &dyn CredentialStore,
) -> Result<Credential, AuthError> {
    let client = Client::new(endpoint, String::new(), false)?;

    let discovery = client.well_known_auth().await?;
    if discovery.status != 200 {
        return Err(AuthError::Discovery(discovery.status));
    }
    if !discovery.auth.device.enabled {
        return Err(AuthError::DeviceFlowDisabled);
    }

    let refresh_token = store
        .get(REFRESH_TOKEN_ENTRY)?
        .ok_or(AuthError::MissingRefreshToken)?;

    let reply = client
        .refresh_access_token(&discovery.auth.device, &refresh_token)
        .await?;
    let token = match (reply.status, reply.token) {
        (200, Some(token)) => token,
        (status, _) => {
            return Err(AuthError::TokenExchange {
                status,
                body: reply.body,
            })
        }
    };

    if let Some(rotated) = token.refresh_token.as_deref() {
        if rotated != refresh_token {
            if let Err(e) = store.set(REFRESH_TOKEN_ENTRY, rotated) {
                tracing::warn!("failed to store rotated refresh token: {}", e);
            }
        }
    }

    Ok(Credential::Bearer(token.access_token))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var(TOKEN_ENV);
        std::env::remove_var(API_KEY_ENV);
    }

    #[test]
    fn authorization_header_formats_both_credential_kinds() {
        assert_eq!(
            Credential::Bearer("abc".to_string()).authorization_header(),
            "Bearer abc"
        );
        assert_eq!(
            Credential::ApiKey("xyz".to_string()).authorization_header(),
            "apiKey xyz"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    async fn env_token_takes_precedence_over_everything() {
        clear_env();
        std::env::set_var(TOKEN_ENV, "env-bearer");
        std::env::set_var(API_KEY_ENV, "env-key");

        let endpoint: Url = "https://startrail.example".parse().unwrap();
        let credential =
            resolve_credential(&endpoint, Some("configured-key"), &MemoryStore::new())
                .await
                .unwrap();

        assert_eq!(credential, Credential::Bearer("env-bearer".to_string()));
        clear_env();
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    async fn env_api_key_beats_the_configured_attribute() {
        clear_env();
        std::env::set_var(API_KEY_ENV, "env-key");

        let endpoint: Url = "https://startrail.example".parse().unwrap();
        let credential =
            resolve_credential(&endpoint, Some("configured-key"), &MemoryStore::new())
                .await
                .unwrap();

        assert_eq!(credential, Credential::ApiKey("env-key".to_string()));
        clear_env();
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    async fn configured_api_key_is_used_when_no_env_is_set() {
        clear_env();

        let endpoint: Url = "https://startrail.example".parse().unwrap();
        let credential =
            resolve_credential(&endpoint, Some("configured-key"), &MemoryStore::new())
                .await
                .unwrap();

        assert_eq!(credential, Credential::ApiKey("configured-key".to_string()));
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    async fn empty_strings_do_not_count_as_credentials() {
        clear_env();
        std::env::set_var(TOKEN_ENV, "");
        std::env::set_var(API_KEY_ENV, "");

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/.well-known/auth")
            .with_body(r#"{"device": {"enabled": false}}"#)
            .create_async()
            .await;

        let endpoint: Url = server.url().parse().unwrap();
        let result = resolve_credential(&endpoint, Some(""), &MemoryStore::new()).await;

        // Everything was empty, so resolution fell through to device
        // flow and hit the disabled tenant.
        assert!(matches!(result, Err(AuthError::DeviceFlowDisabled)));
        clear_env();
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    async fn disabled_device_flow_directs_the_user_to_an_api_key() {
        clear_env();

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/.well-known/auth")
            .with_body(r#"{"device": {"enabled": false}}"#)
            .create_async()
            .await;

        let endpoint: Url = server.url().parse().unwrap();
        let err = resolve_credential(&endpoint, None, &MemoryStore::new())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Device flow is not enabled for the tenant. Please pass an 'api_key' instead"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    async fn failed_discovery_is_fatal() {
        clear_env();

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/.well-known/auth")
            .with_status(500)
            .create_async()
            .await;

        let endpoint: Url = server.url().parse().unwrap();
        let err = resolve_credential(&endpoint, None, &MemoryStore::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Discovery(500)));
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    async fn missing_refresh_token_is_fatal() {
        clear_env();

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/.well-known/auth")
            .with_body(r#"{"device": {"enabled": true, "client_id": "cli", "token_url": "https://auth/token"}}"#)
            .create_async()
            .await;

        let endpoint: Url = server.url().parse().unwrap();
        let err = resolve_credential(&endpoint, None, &MemoryStore::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::MissingRefreshToken));
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    async fn device_flow_exchanges_and_rotates_the_refresh_token() {
        clear_env();

        let mut server = mockito::Server::new_async().await;
        let token_url = format!("{}/token", server.url());
        let _well_known = server
            .mock("GET", "/.well-known/auth")
            .with_body(format!(
                r#"{{"device": {{"enabled": true, "client_id": "cli", "token_url": "{}"}}}}"#,
                token_url
            ))
            .create_async()
            .await;
        let _token = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::UrlEncoded(
                "refresh_token".into(),
                "old-refresh".into(),
            ))
            .with_body(
                r#"{"access_token": "fresh", "refresh_token": "rotated", "token_type": "Bearer", "expires_in": 300}"#,
            )
            .create_async()
            .await;

        let store = MemoryStore::with_refresh_token("old-refresh");
        let endpoint: Url = server.url().parse().unwrap();
        let credential = resolve_credential(&endpoint, None, &store).await.unwrap();

        assert_eq!(credential, Credential::Bearer("fresh".to_string()));
        assert_eq!(
            store.get(REFRESH_TOKEN_ENTRY).unwrap(),
            Some("rotated".to_string())
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    async fn rejected_refresh_grant_is_fatal() {
        clear_env();

        let mut server = mockito::Server::new_async().await;
        let token_url = format!("{}/token", server.url());
        let _well_known = server
            .mock("GET", "/.well-known/auth")
            .with_body(format!(
                r#"{{"device": {{"enabled": true, "client_id": "cli", "token_url": "{}"}}}}"#,
                token_url
            ))
            .create_async()
            .await;
        let _token = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant"}"#)
            .create_async()
            .await;

        let store = MemoryStore::with_refresh_token("stale");
        let endpoint: Url = server.url().parse().unwrap();
        let err = resolve_credential(&endpoint, None, &store).await.unwrap_err();

        match err {
            AuthError::TokenExchange { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("Expected TokenExchange, got {:?}", other),
        }
        // The stale token stays in place for the operator to inspect.
        assert_eq!(
            store.get(REFRESH_TOKEN_ENTRY).unwrap(),
            Some("stale".to_string())
        );
    }
}
