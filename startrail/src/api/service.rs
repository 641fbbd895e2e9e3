//! Wire model for service documents
//!
//! Mirrors the control plane's JSON representation. Services are keyed
//! by (tenant, environment, name); `logging` and `sources` are maps from
//! source name to per-source configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One ingress endpoint configuration attached to a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Access {
    #[serde(default)]
    pub auth: bool,
    pub endpoint: String,
    #[serde(default)]
    pub internal: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Logging {
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// Free-form labels block. The server distinguishes a missing block
/// from one with an empty label map, so `labels` stays nullable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub access: Vec<Access>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    pub environment: String,
    #[serde(default)]
    pub logging: HashMap<String, Logging>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    pub name: String,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub sources: HashMap<String, Source>,
    pub tenant: String,

    // Server bookkeeping, never sent back.
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_date: Option<String>,
}

/// Response envelope wrapping every service endpoint reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceEnvelope {
    #[serde(default)]
    pub response: Option<Service>,
    #[serde(default)]
    pub diagnostics: Vec<super::diagnostics::Diagnostic>,
}
