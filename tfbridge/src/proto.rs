//! Protocol buffer types for the Terraform Plugin Protocol v6
//!
//! The code is generated at build time by tonic_build from
//! `proto/tfplugin6.proto` and included here.
//!
//! # Type Naming
//!
//! - Top-level messages become structs (e.g. `DynamicValue`, `Schema`)
//! - RPC methods have nested `Request` and `Response` types in snake_case
//!   modules (e.g. `get_provider_schema::Request`, `read_resource::Response`)
//! - Nested messages are in sub-modules (e.g. `diagnostic::Severity`)
//! - The gRPC service trait is `provider_server::Provider`
//!
//! Some protobuf types share names with framework types (`DynamicValue`,
//! `Diagnostic`). Always use the `proto::tfplugin6::` prefix to disambiguate.

pub mod tfplugin6 {
    include!(concat!(env!("OUT_DIR"), "/tfplugin6.rs"));
}
