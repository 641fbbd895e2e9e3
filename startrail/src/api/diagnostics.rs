//! Remote diagnostics and their translation into provider diagnostics

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tfbridge::Diagnostics;

/// Diagnostic entry as returned by the control plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub detail: String,
}

/// Closed set of severities the control plane may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            _ => Err(format!("unknown severity '{}'", s)),
        }
    }
}

/// Appends remote diagnostics to the provider's, mapping errors to
/// blocking entries and warnings to non-blocking ones. A severity
/// outside the closed set is reported as an error rather than dropped.
pub fn append_remote_diagnostics(diagnostics: &mut Diagnostics, remote: &[Diagnostic]) {
    for entry in remote {
        let detail = Some(entry.detail.clone()).filter(|d| !d.is_empty());
        match entry.severity.parse::<Severity>() {
            Ok(Severity::Error) => diagnostics.add_error(entry.summary.clone(), detail),
            Ok(Severity::Warning) => diagnostics.add_warning(entry.summary.clone(), detail),
            Err(_) => diagnostics.add_error(
                format!("Unknown diagnostic severity: {}", entry.severity),
                Some(format!("{}: {}", entry.summary, entry.detail)),
            ),
        }
    }
}
