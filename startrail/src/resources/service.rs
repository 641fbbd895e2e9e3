//! The `startrail_service` managed resource

use crate::api::{append_remote_diagnostics, ServiceResponse};
use crate::mapping;
use crate::provider_data::StartrailProviderData;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfbridge::provider::ResourceSchema;
use tfbridge::request::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, ImportRequest, ImportResponse,
    ReadRequest, ReadResponse, UpdateRequest, UpdateResponse,
};
use tfbridge::{
    AttributeBuilder, AttributeType, Diagnostics, Dynamic, RequiresReplaceIfChanged, Resource,
    SchemaBuilder, State, StringPatternValidator, UseStateForUnknown,
};

pub struct ServiceResource {
    data: StartrailProviderData,
}

impl ServiceResource {
    pub fn new(data: StartrailProviderData) -> Self {
        Self { data }
    }

    pub fn schema_static() -> ResourceSchema {
        let mut access_fields = HashMap::new();
        access_fields.insert("auth".to_string(), AttributeType::Bool);
        access_fields.insert("endpoint".to_string(), AttributeType::String);
        access_fields.insert("internal".to_string(), AttributeType::Bool);

        let mut labelled_fields = HashMap::new();
        labelled_fields.insert(
            "labels".to_string(),
            AttributeType::Map(Box::new(AttributeType::String)),
        );
        labelled_fields.insert("source".to_string(), AttributeType::String);

        let mut metadata_fields = HashMap::new();
        metadata_fields.insert(
            "labels".to_string(),
            AttributeType::Map(Box::new(AttributeType::String)),
        );

        SchemaBuilder::new()
            .attribute(
                "id",
                AttributeBuilder::string("id")
                    .computed()
                    .description("Service identifier")
                    .plan_modifier(Arc::new(UseStateForUnknown)),
            )
            .attribute(
                "name",
                AttributeBuilder::string("name")
                    .required()
                    .description("Service name")
                    .validator(Arc::new(name_validator()))
                    .plan_modifier(Arc::new(RequiresReplaceIfChanged)),
            )
            .attribute(
                "environment",
                AttributeBuilder::string("environment")
                    .required()
                    .description("Service environment")
                    .validator(Arc::new(environment_validator()))
                    .plan_modifier(Arc::new(RequiresReplaceIfChanged)),
            )
            .attribute(
                "description",
                AttributeBuilder::string("description")
                    .optional()
                    .computed()
                    .description("Service description"),
            )
            .attribute(
                "remarks",
                AttributeBuilder::string("remarks")
                    .optional()
                    .computed()
                    .description("Service remarks"),
            )
            .attribute(
                "disabled",
                AttributeBuilder::bool("disabled")
                    .computed()
                    .description("Service disabled"),
            )
            .attribute(
                "access",
                AttributeBuilder::list("access", AttributeType::Object(access_fields))
                    .optional()
                    .description("Ingress endpoints attached to the service"),
            )
            .attribute(
                "logging",
                AttributeBuilder::list("logging", AttributeType::Object(labelled_fields.clone()))
                    .optional()
                    .description(
                        "Logging configuration per source; duplicate sources resolve last-wins",
                    ),
            )
            .attribute(
                "source",
                AttributeBuilder::list("source", AttributeType::Object(labelled_fields))
                    .optional()
                    .description(
                        "Source configuration per source name; duplicate sources resolve last-wins",
                    ),
            )
            .attribute(
                "metadata",
                AttributeBuilder::object("metadata", metadata_fields)
                    .optional()
                    .description("Free-form labels applied to the service"),
            )
            .build_resource(0)
    }

    /// Create and Update both replace the whole document through the
    /// remote Create call.
    async fn post(
        &self,
        planned: &HashMap<String, Dynamic>,
        diagnostics: &mut Diagnostics,
    ) -> Option<State> {
        let service =
            match mapping::to_domain(planned, &self.data.tenant, &self.data.environment) {
                Ok(service) => service,
                Err(e) => {
                    diagnostics.add_error("Invalid service configuration", Some(e.to_string()));
                    return None;
                }
            };

        let reply = match self.data.client.create_service(&service).await {
            Ok(reply) => reply,
            Err(e) => {
                diagnostics.add_error(
                    "Client Error",
                    Some(format!("Unable to update service, got error: {}", e)),
                );
                return None;
            }
        };

        translate_reply(&reply, diagnostics);
        if diagnostics.has_errors() {
            return None;
        }

        match reply.envelope.response {
            Some(created) => Some(mapping::to_state(&created)),
            None => {
                diagnostics.add_error(
                    "Client Error",
                    Some("Service reply carried no service document".to_string()),
                );
                None
            }
        }
    }

    fn environment_of(&self, state: &State) -> String {
        match state.get_string("environment") {
            Some(environment) if !environment.is_empty() => environment,
            _ => self.data.environment.clone(),
        }
    }
}

#[async_trait]
impl Resource for ServiceResource {
    async fn create(&self, request: CreateRequest) -> CreateResponse {
        let mut diagnostics = Diagnostics::new();
        let state = self.post(&request.planned_state.values, &mut diagnostics).await;

        CreateResponse {
            state: state.unwrap_or(request.planned_state),
            diagnostics,
        }
    }

    async fn read(&self, request: ReadRequest) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();

        let Some(name) = request.current_state.get_string("name") else {
            diagnostics.add_error("Client Error", Some("State carries no service name".to_string()));
            return ReadResponse {
                state: Some(request.current_state),
                diagnostics,
            };
        };
        let environment = self.environment_of(&request.current_state);

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
                return ReadResponse {
                    state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        translate_reply(&reply, &mut diagnostics);
        if diagnostics.has_errors() {
            return ReadResponse {
                state: Some(request.current_state),
                diagnostics,
            };
        }

        let state = match reply.envelope.response {
            Some(service) => Some(mapping::to_state(&service)),
            None => {
                diagnostics.add_error(
                    "Client Error",
                    Some("Service reply carried no service document".to_string()),
                );
                Some(request.current_state)
            }
        };

        ReadResponse { state, diagnostics }
    }

    async fn update(&self, request: UpdateRequest) -> UpdateResponse {
        let mut diagnostics = Diagnostics::new();
        let state = self.post(&request.planned_state.values, &mut diagnostics).await;

        UpdateResponse {
            state: state.unwrap_or(request.current_state),
            diagnostics,
        }
    }

    async fn delete(&self, request: DeleteRequest) -> DeleteResponse {
        let mut diagnostics = Diagnostics::new();

        let Some(name) = request.current_state.get_string("name") else {
            diagnostics.add_error("Client Error", Some("State carries no service name".to_string()));
            return DeleteResponse { diagnostics };
        };
        let environment = self.environment_of(&request.current_state);

        match self
            .data
            .client
            .delete_service(&self.data.tenant, &environment, &name)
            .await
        {
            Ok(reply) => translate_reply(&reply, &mut diagnostics),
            Err(e) => diagnostics.add_error(
                "Client Error",
                Some(format!("Unable to delete service, got error: {}", e)),
            ),
        }

        DeleteResponse { diagnostics }
    }

    /// `terraform import startrail_service.x tenant/environment/name`.
    /// The triple is decomposed so the follow-up Read can address the
    /// service; the remaining attributes are refreshed by that Read.
    async fn import(&self, request: ImportRequest) -> ImportResponse {
        let mut diagnostics = Diagnostics::new();

        let segments: Vec<&str> = request.id.split('/').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            diagnostics.add_error(
                "Invalid import id",
                Some(format!(
                    "Expected 'tenant/environment/name', got '{}'",
                    request.id
                )),
            );
            return ImportResponse {
                state: None,
                diagnostics,
            };
        }

        let mut state = tfbridge::import::import_state_passthrough_id("id", &request.id);
        state.values.insert(
            "environment".to_string(),
            Dynamic::String(segments[1].to_string()),
        );
        state
            .values
            .insert("name".to_string(), Dynamic::String(segments[2].to_string()));

        ImportResponse {
            state: Some(state),
            diagnostics,
        }
    }
}

fn name_validator() -> StringPatternValidator {
    StringPatternValidator {
        pattern: regex::Regex::new("^[a-z0-9-]+$").expect("static pattern"),
        description: "lowercase alphanumeric with dashes".to_string(),
    }
}

fn environment_validator() -> StringPatternValidator {
    StringPatternValidator {
        pattern: regex::Regex::new("^[a-z0-9-]+$").expect("static pattern"),
        description: "lowercase alphanumeric with dashes".to_string(),
    }
}

/// Remote diagnostics are translated first; a non-200 status is fatal on
/// top of whatever the diagnostics said.
pub(crate) fn translate_reply(reply: &ServiceResponse, diagnostics: &mut Diagnostics) {
    append_remote_diagnostics(diagnostics, &reply.envelope.diagnostics);
    if reply.status != 200 {
        diagnostics.add_error(
            "Client Error",
            Some(format!(
                "Service endpoint returned status {}: {}",
                reply.status, reply.body
            )),
        );
    }
}
