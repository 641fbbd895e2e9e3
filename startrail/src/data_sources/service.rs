//! The `startrail_service` data source

use crate::mapping;
use crate::provider_data::StartrailProviderData;
use crate::resources::service::translate_reply;
use async_trait::async_trait;
use tfbridge::provider::DataSourceSchema;
use tfbridge::request::{ReadDataSourceRequest, ReadDataSourceResponse};
use tfbridge::{AttributeBuilder, DataSource, Diagnostics, Dynamic, SchemaBuilder, State};

pub struct ServiceDataSource {
    data: StartrailProviderData,
}

impl ServiceDataSource {
    pub fn new(data: StartrailProviderData) -> Self {
        Self { data }
    }

    pub fn schema_static() -> DataSourceSchema {
        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .computed()
                    .description("Service identifier"),
            )
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .required()
                    .description("Service name"),
            )
            .attribute(
                "environment",
                AttributeBuilder::string("environment")
                    .required()
                    .description("Service environment; empty falls back to the provider default"),
            )
            .build_data_source(0)
    }
}

#[async_trait]
impl DataSource for ServiceDataSource {
    async fn read(&self, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = Diagnostics::new();

        let Some(name) = request.config.get_string("name").filter(|n| !n.is_empty()) else {
            diagnostics.add_error("name is required", None::<String>);
            return ReadDataSourceResponse {
                state: None,
                diagnostics,
            };
        };
        let environment = match request.config.get_string("environment") {
            Some(environment) if !environment.is_empty() => environment,
            _ => self.data.environment.clone(),
        };

        let reply = match self
            .data
            .client
            .get_service(&self.data.tenant, &environment, &name)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                diagnostics.add_error(
                    "Client Error",
                    Some(format!("Unable to read service, got error: {}", e)),
                );
                return ReadDataSourceResponse {
                    state: None,
                    diagnostics,
                };
            }
        };

        translate_reply(&reply, &mut diagnostics);
        if diagnostics.has_errors() {
            return ReadDataSourceResponse {
                state: None,
                diagnostics,
            };
        }

        let Some(service) = reply.envelope.response else {
            diagnostics.add_error(
                "Client Error",
                Some("Service reply carried no service document".to_string()),
            );
            return ReadDataSourceResponse {
                state: None,
                diagnostics,
            };
        };

        // Project to the data source schema; the full document stays in
        // the resource's domain.
        let mut state = State::new();
        state.values.insert(
            "id".to_string(),
            Dynamic::String(mapping::service_id(
                &service.tenant,
                &service.environment,
                &service.name,
            )),
        );
        state
            .values
            .insert("name".to_string(), Dynamic::String(service.name.clone()));
        state.values.insert(
            "environment".to_string(),
            Dynamic::String(service.environment.clone()),
        );

        ReadDataSourceResponse {
            state: Some(state),
            diagnostics,
        }
    }
}
