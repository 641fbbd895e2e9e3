//! Control plane API: client, wire model, and diagnostics translation

pub mod client;
pub mod diagnostics;
pub mod service;
pub mod wellknown;

pub use client::{ApiError, Client, ServiceResponse, TokenReply, WellKnownResponse, USER_AGENT};
pub use diagnostics::{append_remote_diagnostics, Diagnostic, Severity};
pub use service::{Access, Logging, Metadata, Service, ServiceEnvelope, Source};
pub use wellknown::{Device, TokenResponse, WellKnownAuth};
