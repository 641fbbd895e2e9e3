//! tfbridge - Terraform Plugin Framework for Rust
//!
//! A framework for building Terraform providers in Rust, implementing the
//! Terraform Plugin Protocol v6.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod provider;
pub mod request;

// Helper modules
pub mod import;
pub mod plan_modifier;
pub mod validator;

// Framework implementation modules
pub mod grpc;
pub mod proto;
pub mod server;

// Re-exports for convenience
pub use context::Context;
pub use error::{Result, TfbridgeError};
pub use plan_modifier::{
    PlanModifier, PlanModifyRequest, PlanModifyResponse, RequiresReplaceIfChanged,
    UseStateForUnknown,
};
pub use provider::{DataSource, Provider, Resource};
pub use schema::{
    Attribute, AttributeBuilder, AttributeType, DataSourceSchema, ProviderSchema, ResourceSchema,
    SchemaBuilder,
};
pub use server::{serve, serve_default, ServerConfig};
pub use types::{Config, Diagnostic, Diagnostics, Dynamic, State};
pub use validator::{StringPatternValidator, Validator};
