//! Device-flow discovery types served from `/.well-known/auth`

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WellKnownAuth {
    #[serde(default)]
    pub device: Device,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub authorization_url: String,
    #[serde(default)]
    pub device_code_url: String,
    #[serde(default)]
    pub token_url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Token endpoint reply for a `refresh_token` grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}
