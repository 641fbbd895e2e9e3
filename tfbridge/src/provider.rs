//! Provider, resource and data source traits
//!
//! Providers are factories: each RPC that touches a resource or data
//! source asks the provider for a fresh instance, so implementations
//! hold no per-operation locks. Schemas are returned by value and are
//! expected to be cheap clones of statically built definitions.

use crate::request::{
    ConfigureRequest, ConfigureResponse, CreateRequest, CreateResponse, DeleteRequest,
    DeleteResponse, ImportRequest, ImportResponse, ReadDataSourceRequest, ReadDataSourceResponse,
    ReadRequest, ReadResponse, UpdateRequest, UpdateResponse,
};
use crate::types::Diagnostics;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub use crate::schema::{DataSourceSchema, ProviderSchema, ResourceSchema};

#[async_trait]
pub trait Provider: Send + Sync {
    /// Called once by Terraform before any resource or data source
    /// operation. Configuration errors are reported via diagnostics,
    /// not by panicking or exiting.
    async fn configure(&mut self, request: ConfigureRequest) -> ConfigureResponse;

    /// Schema of the provider block itself.
    async fn provider_schema(&self) -> ProviderSchema;

    /// Create a resource instance by type name.
    async fn create_resource(&self, name: &str) -> Result<Box<dyn Resource>>;

    /// Create a data source instance by type name.
    async fn create_data_source(&self, name: &str) -> Result<Box<dyn DataSource>>;

    async fn resource_schemas(&self) -> HashMap<String, ResourceSchema>;

    async fn data_source_schemas(&self) -> HashMap<String, DataSourceSchema>;
}

#[async_trait]
pub trait Resource: Send + Sync {
    async fn create(&self, request: CreateRequest) -> CreateResponse;

    async fn read(&self, request: ReadRequest) -> ReadResponse;

    async fn update(&self, request: UpdateRequest) -> UpdateResponse;

    async fn delete(&self, request: DeleteRequest) -> DeleteResponse;

    /// Resources opt in to `terraform import` by overriding this.
    async fn import(&self, _request: ImportRequest) -> ImportResponse {
        let mut diagnostics = Diagnostics::new();
        diagnostics.add_error(
            "Import is not supported for this resource",
            None::<String>,
        );
        ImportResponse {
            state: None,
            diagnostics,
        }
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    async fn read(&self, request: ReadDataSourceRequest) -> ReadDataSourceResponse;
}
