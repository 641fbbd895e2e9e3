pub mod api;
pub mod auth;
pub mod data_sources;
pub mod mapping;
pub mod provider_data;
pub mod resources;

use async_trait::async_trait;
use provider_data::StartrailProviderData;
use std::collections::HashMap;
use tfbridge::provider::{DataSourceSchema, ProviderSchema, ResourceSchema};
use tfbridge::request::{ConfigureRequest, ConfigureResponse};
use tfbridge::{
    AttributeBuilder, DataSource, Diagnostics, Provider, Resource, SchemaBuilder,
};
use url::Url;

pub const ENDPOINT_ENV: &str = "STARTRAIL_ENDPOINT";

const DEFAULT_TENANT: &str = "default";

/// The Startrail provider. Configure resolves the endpoint and
/// credential once; everything built there is read-only afterwards and
/// threaded into resources and data sources through
/// [`StartrailProviderData`].
pub struct StartrailProvider {
    data: Option<StartrailProviderData>,
}

impl Default for StartrailProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl StartrailProvider {
    pub fn new() -> Self {
        Self { data: None }
    }

    async fn configure_data(
        &self,
        request: &ConfigureRequest,
        diagnostics: &mut Diagnostics,
    ) -> Option<StartrailProviderData> {
        let endpoint = request
            .config
            .get_string("endpoint")
            .filter(|e| !e.is_empty())
            .or_else(|| std::env::var(ENDPOINT_ENV).ok().filter(|e| !e.is_empty()));

        let Some(endpoint) = endpoint else {
            diagnostics.add_error(
                format!(
                    "endpoint is required (set in provider config or {} env var)",
                    ENDPOINT_ENV
                ),
                None::<String>,
            );
            return None;
        };

        let endpoint = match Url::parse(&endpoint) {
            Ok(url) => url,
            Err(e) => {
                diagnostics.add_error(
                    "Invalid endpoint",
                    Some(format!("The endpoint is not a valid URL, got error: {}", e)),
                );
                return None;
            }
        };

        let api_key = request.config.get_string("api_key");
        let credential = match auth::resolve_credential(
            &endpoint,
            api_key.as_deref(),
            &auth::KeyringStore::new(),
        )
        .await
        {
            Ok(credential) => credential,
            Err(e) => {
                diagnostics.add_error("Client Error", Some(e.to_string()));
                return None;
            }
        };

        let tenant = request
            .config
            .get_string("tenant")
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TENANT.to_string());
        let environment = request
            .config
            .get_string("environment")
            .unwrap_or_default();
        let debug = request.config.get_bool("debug").unwrap_or(false);

        let client =
            match api::Client::new(&endpoint, credential.authorization_header(), debug) {
                Ok(client) => client,
                Err(e) => {
                    diagnostics.add_error(
                        "Client Error",
                        Some(format!("Failed to create API client: {}", e)),
                    );
                    return None;
                }
            };

        tracing::debug!(%endpoint, tenant = %tenant, "provider configured");
        Some(StartrailProviderData::new(client, tenant, environment))
    }

    fn data(&self) -> tfbridge::Result<StartrailProviderData> {
        self.data
            .clone()
            .ok_or(tfbridge::TfbridgeError::ProviderNotConfigured)
    }
}

#[async_trait]
impl Provider for StartrailProvider {
    async fn configure(&mut self, request: ConfigureRequest) -> ConfigureResponse {
        let mut diagnostics = Diagnostics::new();
        self.data = self.configure_data(&request, &mut diagnostics).await;
        ConfigureResponse { diagnostics }
    }

    async fn provider_schema(&self) -> ProviderSchema {
        SchemaBuilder::new()
            .attribute(
                "endpoint",
                AttributeBuilder::string("endpoint")
                    .optional()
                    .description("The upstream endpoint to use for API requests."),
            )
            .attribute(
                "api_key",
                AttributeBuilder::string("api_key")
                    .optional()
                    .sensitive()
                    .description("The API key to use for API requests."),
            )
            .attribute(
                "tenant",
                AttributeBuilder::string("tenant")
                    .optional()
                    .description("The tenant to use for API requests."),
            )
            .attribute(
                "environment",
                AttributeBuilder::string("environment")
                    .optional()
                    .description("The default environment for resources that leave theirs empty."),
            )
            .attribute(
                "debug",
                AttributeBuilder::bool("debug")
                    .optional()
                    .description("Enable request and response body logging."),
            )
            .build_provider(0)
    }

    async fn create_resource(&self, name: &str) -> tfbridge::Result<Box<dyn Resource>> {
        let data = self.data()?;
        match name {
            "startrail_service" => Ok(Box::new(resources::ServiceResource::new(data))),
            _ => Err(tfbridge::TfbridgeError::ResourceNotFound(name.to_string())),
        }
    }

    async fn create_data_source(&self, name: &str) -> tfbridge::Result<Box<dyn DataSource>> {
        let data = self.data()?;
        match name {
            "startrail_service" => Ok(Box::new(data_sources::ServiceDataSource::new(data))),
            _ => Err(tfbridge::TfbridgeError::DataSourceNotFound(name.to_string())),
        }
    }

    async fn resource_schemas(&self) -> HashMap<String, ResourceSchema> {
        static SCHEMAS: std::sync::OnceLock<HashMap<String, ResourceSchema>> =
            std::sync::OnceLock::new();

        SCHEMAS
            .get_or_init(|| {
                let mut schemas = HashMap::new();
                schemas.insert(
                    "startrail_service".to_string(),
                    resources::ServiceResource::schema_static(),
                );
                schemas
            })
            .clone()
    }

    async fn data_source_schemas(&self) -> HashMap<String, DataSourceSchema> {
        static SCHEMAS: std::sync::OnceLock<HashMap<String, DataSourceSchema>> =
            std::sync::OnceLock::new();

        SCHEMAS
            .get_or_init(|| {
                let mut schemas = HashMap::new();
                schemas.insert(
                    "startrail_service".to_string(),
                    data_sources::ServiceDataSource::schema_static(),
                );
                schemas
            })
            .clone()
    }
}
