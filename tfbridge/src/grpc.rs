//! gRPC service implementation of the Terraform Plugin Protocol
//!
//! This module maps the protocol RPCs onto the factory-based provider
//! traits. Resources and data sources are created on demand per RPC, so
//! no locks are held across operations; only `ConfigureProvider` takes
//! the write half of the provider lock.

use crate::context::Context;
use crate::plan_modifier::PlanModifyRequest;
use crate::proto::tfplugin6::{provider_server::Provider as ProtoProvider, *};
use crate::provider::Provider;
use crate::request::{
    ConfigureRequest, CreateRequest, DeleteRequest, ImportRequest, ReadDataSourceRequest,
    ReadRequest, UpdateRequest,
};
use crate::schema::{Attribute, AttributeType};
use crate::types::{Config, Diagnostics as TfbridgeDiagnostics, Dynamic, State};
use rmp_serde::{decode, encode};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Request, Response, Status};

// msgpack nil, sent as the planned state of a destroy
const MSGPACK_NIL: u8 = 0xc0;

pub struct ProviderService<P: Provider> {
    provider: Arc<RwLock<P>>,
}

impl<P: Provider + 'static> ProviderService<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(RwLock::new(provider)),
        }
    }
}

#[tonic::async_trait]
impl<P: Provider + 'static> ProtoProvider for ProviderService<P> {
    async fn get_metadata(
        &self,
        _request: Request<get_metadata::Request>,
    ) -> std::result::Result<Response<get_metadata::Response>, Status> {
        let provider = self.provider.read().await;

        let resources = provider
            .resource_schemas()
            .await
            .into_keys()
            .map(|type_name| get_metadata::ResourceMetadata { type_name })
            .collect();
        let data_sources = provider
            .data_source_schemas()
            .await
            .into_keys()
            .map(|type_name| get_metadata::DataSourceMetadata { type_name })
            .collect();

        Ok(Response::new(get_metadata::Response {
            server_capabilities: Some(server_capabilities()),
            diagnostics: vec![],
            data_sources,
            resources,
        }))
    }

    async fn get_provider_schema(
        &self,
        _request: Request<get_provider_schema::Request>,
    ) -> std::result::Result<Response<get_provider_schema::Response>, Status> {
        let provider = self.provider.read().await;
        let provider_schema = provider.provider_schema().await;
        let resource_schemas = provider.resource_schemas().await;
        let data_source_schemas = provider.data_source_schemas().await;

        let resources = resource_schemas
            .into_iter()
            .map(|(name, schema)| (name, to_proto_schema(schema.version, &schema.attributes)))
            .collect();
        let data_sources = data_source_schemas
            .into_iter()
            .map(|(name, schema)| (name, to_proto_schema(schema.version, &schema.attributes)))
            .collect();

        Ok(Response::new(get_provider_schema::Response {
            provider: Some(to_proto_schema(
                provider_schema.version,
                &provider_schema.attributes,
            )),
            resource_schemas: resources,
            data_source_schemas: data_sources,
            diagnostics: vec![],
            provider_meta: None,
            server_capabilities: Some(server_capabilities()),
        }))
    }

    async fn validate_provider_config(
        &self,
        request: Request<validate_provider_config::Request>,
    ) -> std::result::Result<Response<validate_provider_config::Response>, Status> {
        let req = request.into_inner();

        let config = match decode_dynamic_value(&req.config) {
            Ok(config) => config,
            Err(e) => {
                // Unknown values during planning can make the config
                // undecodable; validation happens again at apply time.
                tracing::debug!("skipping provider config validation: {}", e);
                return Ok(Response::new(validate_provider_config::Response {
                    diagnostics: vec![],
                }));
            }
        };

        let provider = self.provider.read().await;
        let schema = provider.provider_schema().await;
        let diagnostics = validate_config_against_schema(&config, &schema.attributes);

        Ok(Response::new(validate_provider_config::Response {
            diagnostics,
        }))
    }

    async fn validate_resource_config(
        &self,
        request: Request<validate_resource_config::Request>,
    ) -> std::result::Result<Response<validate_resource_config::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let provider = self.provider.read().await;
        let schemas = provider.resource_schemas().await;
        let schema = match schemas.get(&type_name) {
            Some(s) => s,
            None => {
                return Ok(Response::new(validate_resource_config::Response {
                    diagnostics: vec![error_diagnostic(
                        format!("Unknown resource type: {}", type_name),
                        String::new(),
                        None,
                    )],
                }))
            }
        };

        let config = match decode_dynamic_value(&req.config) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("skipping resource config validation: {}", e);
                return Ok(Response::new(validate_resource_config::Response {
                    diagnostics: vec![],
                }));
            }
        };

        let diagnostics = validate_config_against_schema(&config, &schema.attributes);

        Ok(Response::new(validate_resource_config::Response {
            diagnostics,
        }))
    }

    async fn validate_data_resource_config(
        &self,
        request: Request<validate_data_resource_config::Request>,
    ) -> std::result::Result<Response<validate_data_resource_config::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let provider = self.provider.read().await;
        let schemas = provider.data_source_schemas().await;
        let schema = match schemas.get(&type_name) {
            Some(s) => s,
            None => {
                return Ok(Response::new(validate_data_resource_config::Response {
                    diagnostics: vec![error_diagnostic(
                        format!("Unknown data source type: {}", type_name),
                        String::new(),
                        None,
                    )],
                }))
            }
        };

        let config = match decode_dynamic_value(&req.config) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("skipping data source config validation: {}", e);
                return Ok(Response::new(validate_data_resource_config::Response {
                    diagnostics: vec![],
                }));
            }
        };

        let diagnostics = validate_config_against_schema(&config, &schema.attributes);

        Ok(Response::new(validate_data_resource_config::Response {
            diagnostics,
        }))
    }

    async fn upgrade_resource_state(
        &self,
        request: Request<upgrade_resource_state::Request>,
    ) -> std::result::Result<Response<upgrade_resource_state::Response>, Status> {
        let req = request.into_inner();

        // No schema migrations yet; pass the stored JSON state through
        let upgraded_state = req.raw_state.as_ref().map(|raw| DynamicValue {
            msgpack: vec![],
            json: raw.json.clone(),
        });

        Ok(Response::new(upgrade_resource_state::Response {
            upgraded_state,
            diagnostics: vec![],
        }))
    }

    async fn configure_provider(
        &self,
        request: Request<configure_provider::Request>,
    ) -> std::result::Result<Response<configure_provider::Response>, Status> {
        let req = request.into_inner();
        let config = decode_dynamic_value(&req.config)?;

        tracing::debug!(
            terraform_version = %req.terraform_version,
            keys = ?config.values.keys().collect::<Vec<_>>(),
            "configuring provider"
        );

        let configure_req = ConfigureRequest {
            context: Context::new(),
            config,
        };

        let mut provider = self.provider.write().await;
        let response = provider.configure(configure_req).await;

        Ok(Response::new(configure_provider::Response {
            diagnostics: to_proto_diagnostics(&response.diagnostics),
        }))
    }

    async fn read_resource(
        &self,
        request: Request<read_resource::Request>,
    ) -> std::result::Result<Response<read_resource::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let provider = self.provider.read().await;
        let resource = provider
            .create_resource(&type_name)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;

        let current_state = decode_dynamic_value(&req.current_state)?;

        let read_req = ReadRequest {
            context: Context::new(),
            current_state: State {
                values: current_state.values,
            },
        };

        let read_resp = resource.read(read_req).await;

        // None means the remote object is gone; encode nil so Terraform
        // removes it from state.
        let new_state = match read_resp.state {
            Some(state) => Some(encode_state(&state)?),
            None => Some(DynamicValue {
                msgpack: vec![MSGPACK_NIL],
                json: vec![],
            }),
        };

        Ok(Response::new(read_resource::Response {
            new_state,
            diagnostics: to_proto_diagnostics(&read_resp.diagnostics),
            private: vec![],
        }))
    }

    async fn plan_resource_change(
        &self,
        request: Request<plan_resource_change::Request>,
    ) -> std::result::Result<Response<plan_resource_change::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let provider = self.provider.read().await;
        let resource_schemas = provider.resource_schemas().await;
        let resource_schema = resource_schemas
            .get(&type_name)
            .ok_or_else(|| Status::not_found(format!("Unknown resource type: {}", type_name)))?;

        let prior_state = decode_dynamic_value(&req.prior_state)?.values;
        let config = decode_dynamic_value(&req.config)?.values;
        let proposed_new_state = decode_dynamic_value(&req.proposed_new_state)?.values;

        let is_delete = !prior_state.is_empty() && proposed_new_state.is_empty();

        let mut planned_state = if is_delete {
            HashMap::new()
        } else {
            proposed_new_state
        };

        // Computed attributes with no configured value become unknown so
        // Terraform shows them as "(known after apply)".
        if !is_delete {
            for (attr_name, attr_schema) in &resource_schema.attributes {
                if !attr_schema.computed {
                    continue;
                }
                let config_value = config.get(attr_name.as_str()).unwrap_or(&Dynamic::Null);
                let planned_value = planned_state.get(attr_name.as_str()).unwrap_or(&Dynamic::Null);
                if config_value.is_null() && planned_value.is_null() {
                    planned_state.insert(attr_name.clone(), Dynamic::Unknown);
                }
            }
        }

        let mut requires_replace = Vec::new();
        let mut all_diagnostics = TfbridgeDiagnostics::new();

        // Apply plan modifiers for each attribute. Destroy plans skip
        // them; the planned state is nil by definition.
        if !is_delete {
            for (attr_name, attr_schema) in &resource_schema.attributes {
                if attr_schema.plan_modifiers.is_empty() {
                    continue;
                }

                let state_value = prior_state
                    .get(attr_name.as_str())
                    .cloned()
                    .unwrap_or(Dynamic::Null);
                let config_value = config
                    .get(attr_name.as_str())
                    .cloned()
                    .unwrap_or(Dynamic::Null);
                let mut current_plan_value = planned_state
                    .get(attr_name.as_str())
                    .cloned()
                    .unwrap_or(Dynamic::Null);

                for modifier in &attr_schema.plan_modifiers {
                    let response = modifier.modify_plan(PlanModifyRequest {
                        state: state_value.clone(),
                        plan: current_plan_value.clone(),
                        config: config_value.clone(),
                        attribute_path: attr_name.clone(),
                    });

                    current_plan_value = response.plan_value;

                    if response.requires_replace {
                        requires_replace.push(attribute_path(attr_name));
                    }

                    all_diagnostics.append(response.diagnostics);
                }

                match current_plan_value {
                    Dynamic::Null => {
                        planned_state.remove(attr_name.as_str());
                    }
                    value => {
                        planned_state.insert(attr_name.clone(), value);
                    }
                }
            }
        }

        // For a destroy the planned state is nil, not an empty object
        let encoded_planned_state = if is_delete {
            DynamicValue {
                msgpack: vec![MSGPACK_NIL],
                json: vec![],
            }
        } else {
            encode_dynamic_values(&planned_state)?
        };

        Ok(Response::new(plan_resource_change::Response {
            planned_state: Some(encoded_planned_state),
            requires_replace,
            planned_private: vec![],
            diagnostics: to_proto_diagnostics(&all_diagnostics),
            legacy_type_system: false,
        }))
    }

    async fn apply_resource_change(
        &self,
        request: Request<apply_resource_change::Request>,
    ) -> std::result::Result<Response<apply_resource_change::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let provider = self.provider.read().await;
        let resource = provider
            .create_resource(&type_name)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;

        let prior_state = decode_dynamic_value(&req.prior_state)?.values;
        let config = decode_dynamic_value(&req.config)?.values;
        let planned_state = decode_dynamic_value(&req.planned_state)?.values;

        let context = Context::new();

        let is_create = prior_state.is_empty() && !planned_state.is_empty();
        let is_delete = !prior_state.is_empty() && planned_state.is_empty();
        let is_update = !prior_state.is_empty() && !planned_state.is_empty();

        let (new_state, diagnostics) = if is_create {
            let create_resp = resource
                .create(CreateRequest {
                    context,
                    config: Config { values: config },
                    planned_state: State {
                        values: planned_state.clone(),
                    },
                })
                .await;
            (create_resp.state, create_resp.diagnostics)
        } else if is_delete {
            let delete_resp = resource
                .delete(DeleteRequest {
                    context,
                    current_state: State {
                        values: prior_state.clone(),
                    },
                })
                .await;
            (State::new(), delete_resp.diagnostics)
        } else if is_update {
            let update_resp = resource
                .update(UpdateRequest {
                    context,
                    config: Config { values: config },
                    planned_state: State {
                        values: planned_state.clone(),
                    },
                    current_state: State {
                        values: prior_state.clone(),
                    },
                })
                .await;
            (update_resp.state, update_resp.diagnostics)
        } else {
            (
                State {
                    values: planned_state.clone(),
                },
                TfbridgeDiagnostics::new(),
            )
        };

        if diagnostics.has_errors() {
            // Failed creates report the planned state so Terraform can
            // retry; other failures keep the prior state.
            let state_to_return = if is_create {
                &planned_state
            } else {
                &prior_state
            };

            return Ok(Response::new(apply_resource_change::Response {
                new_state: Some(encode_dynamic_values(state_to_return)?),
                private: vec![],
                diagnostics: to_proto_diagnostics(&diagnostics),
                legacy_type_system: false,
            }));
        }

        let new_state_value = if is_delete {
            Some(DynamicValue {
                msgpack: vec![MSGPACK_NIL],
                json: vec![],
            })
        } else {
            Some(encode_state(&new_state)?)
        };

        Ok(Response::new(apply_resource_change::Response {
            new_state: new_state_value,
            private: vec![],
            diagnostics: to_proto_diagnostics(&diagnostics),
            legacy_type_system: false,
        }))
    }

    async fn import_resource_state(
        &self,
        request: Request<import_resource_state::Request>,
    ) -> std::result::Result<Response<import_resource_state::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;

        let provider = self.provider.read().await;
        let resource = provider
            .create_resource(&type_name)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;

        let import_resp = resource
            .import(ImportRequest {
                context: Context::new(),
                id: req.id,
            })
            .await;

        let imported_resources = match import_resp.state {
            Some(state) => vec![import_resource_state::ImportedResource {
                type_name,
                state: Some(encode_state(&state)?),
                private: vec![],
            }],
            None => vec![],
        };

        Ok(Response::new(import_resource_state::Response {
            imported_resources,
            diagnostics: to_proto_diagnostics(&import_resp.diagnostics),
        }))
    }

    async fn read_data_source(
        &self,
        request: Request<read_data_source::Request>,
    ) -> std::result::Result<Response<read_data_source::Response>, Status> {
        let req = request.into_inner();
        let type_name = req.type_name;
        let config = decode_dynamic_value(&req.config)?;

        tracing::debug!(type_name = %type_name, "reading data source");

        let provider = self.provider.read().await;
        let data_source = provider
            .create_data_source(&type_name)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;

        let read_resp = data_source
            .read(ReadDataSourceRequest {
                context: Context::new(),
                config,
            })
            .await;

        let state = match read_resp.state {
            Some(state) => Some(encode_state(&state)?),
            None => None,
        };

        Ok(Response::new(read_data_source::Response {
            state,
            diagnostics: to_proto_diagnostics(&read_resp.diagnostics),
        }))
    }

    async fn stop_provider(
        &self,
        _request: Request<stop_provider::Request>,
    ) -> std::result::Result<Response<stop_provider::Response>, Status> {
        Ok(Response::new(stop_provider::Response {
            error: String::new(),
        }))
    }
}

// Helper functions

fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        plan_destroy: false,
        get_provider_schema_optional: false,
        move_resource_state: false,
    }
}

fn to_proto_schema(version: i64, attributes: &HashMap<String, Attribute>) -> Schema {
    Schema {
        version,
        block: Some(schema::Block {
            version,
            attributes: attributes
                .values()
                .map(|attr| schema::Attribute {
                    name: attr.name.clone(),
                    r#type: attribute_type_to_bytes(&attr.r#type),
                    nested_type: None,
                    description: attr.description.clone(),
                    required: attr.required,
                    optional: attr.optional,
                    computed: attr.computed,
                    sensitive: attr.sensitive,
                    description_kind: StringKind::Plain as i32,
                    deprecated: false,
                    write_only: false,
                })
                .collect(),
            block_types: vec![],
            description: String::new(),
            description_kind: StringKind::Plain as i32,
            deprecated: false,
        }),
    }
}

fn attribute_type_to_bytes(attr_type: &AttributeType) -> Vec<u8> {
    match attr_type {
        AttributeType::String => "\"string\"".as_bytes().to_vec(),
        AttributeType::Number => "\"number\"".as_bytes().to_vec(),
        AttributeType::Bool => "\"bool\"".as_bytes().to_vec(),
        AttributeType::List(elem) => {
            let elem_type = attribute_type_to_bytes(elem);
            format!("[\"list\", {}]", String::from_utf8_lossy(&elem_type)).into_bytes()
        }
        AttributeType::Set(elem) => {
            let elem_type = attribute_type_to_bytes(elem);
            format!("[\"set\", {}]", String::from_utf8_lossy(&elem_type)).into_bytes()
        }
        AttributeType::Map(elem) => {
            let elem_type = attribute_type_to_bytes(elem);
            format!("[\"map\", {}]", String::from_utf8_lossy(&elem_type)).into_bytes()
        }
        AttributeType::Object(attrs) => {
            let attrs_json: Vec<String> = attrs
                .iter()
                .map(|(name, attr_type)| {
                    format!(
                        "\"{}\": {}",
                        name,
                        String::from_utf8_lossy(&attribute_type_to_bytes(attr_type))
                    )
                })
                .collect();
            format!("[\"object\", {{{}}}]", attrs_json.join(", ")).into_bytes()
        }
    }
}

#[allow(clippy::result_large_err)]
fn decode_dynamic_value(value: &Option<DynamicValue>) -> std::result::Result<Config, Status> {
    let value = match value {
        Some(v) => v,
        None => return Ok(Config::new()),
    };

    if !value.msgpack.is_empty() {
        // A nil top level value means absent state or config
        match decode::from_slice::<Option<HashMap<String, Dynamic>>>(&value.msgpack) {
            Ok(None) => Ok(Config::new()),
            Ok(Some(values)) => Ok(Config { values }),
            Err(e) => Err(Status::invalid_argument(format!(
                "Failed to decode msgpack: {}",
                e
            ))),
        }
    } else if !value.json.is_empty() {
        let values: HashMap<String, Dynamic> = serde_json::from_slice(&value.json)
            .map_err(|e| Status::invalid_argument(format!("Failed to decode json: {}", e)))?;
        Ok(Config { values })
    } else {
        Ok(Config::new())
    }
}

#[allow(clippy::result_large_err)]
fn encode_state(state: &State) -> std::result::Result<DynamicValue, Status> {
    let msgpack = encode::to_vec_named(&state.values)
        .map_err(|e| Status::internal(format!("Failed to encode msgpack: {}", e)))?;

    Ok(DynamicValue {
        msgpack,
        json: vec![],
    })
}

#[allow(clippy::result_large_err)]
fn encode_dynamic_values(
    values: &HashMap<String, Dynamic>,
) -> std::result::Result<DynamicValue, Status> {
    let msgpack = encode::to_vec_named(values)
        .map_err(|e| Status::internal(format!("Failed to encode msgpack: {}", e)))?;

    Ok(DynamicValue {
        msgpack,
        json: vec![],
    })
}

/// Required fields, attribute types, unknown fields and schema validators,
/// in that order. Unknown values skip type and validator checks.
fn validate_config_against_schema(
    config: &Config,
    attributes: &HashMap<String, Attribute>,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (attr_name, attr) in attributes {
        if attr.required {
            let missing = match config.values.get(attr_name.as_str()) {
                None | Some(Dynamic::Null) => true,
                Some(_) => false,
            };
            if missing {
                diagnostics.push(error_diagnostic(
                    format!("Missing required field: {}", attr_name),
                    format!("The field '{}' is required but was not provided", attr_name),
                    Some(attribute_path(attr_name)),
                ));
            }
        }
    }

    for (field_name, value) in &config.values {
        let attr = match attributes.get(field_name) {
            Some(attr) => attr,
            None => {
                diagnostics.push(error_diagnostic(
                    format!("Unknown field: {}", field_name),
                    format!("The field '{}' is not defined in the schema", field_name),
                    Some(attribute_path(field_name)),
                ));
                continue;
            }
        };

        if value.is_unknown() {
            continue;
        }

        if !validate_dynamic_type(value, &attr.r#type) {
            diagnostics.push(error_diagnostic(
                format!("Type mismatch for field: {}", field_name),
                format!(
                    "Field '{}' expects type {:?} but got {}",
                    field_name,
                    attr.r#type,
                    dynamic_type_name(value)
                ),
                Some(attribute_path(field_name)),
            ));
            continue;
        }

        if value.is_null() {
            continue;
        }

        let mut validator_diags = TfbridgeDiagnostics::new();
        for validator in &attr.validators {
            validator.validate(value, field_name, &mut validator_diags);
        }
        diagnostics.extend(to_proto_diagnostics(&validator_diags));
    }

    diagnostics
}

fn validate_dynamic_type(value: &Dynamic, expected_type: &AttributeType) -> bool {
    match (value, expected_type) {
        // Null and unknown are acceptable for any type
        (Dynamic::Null, _) => true,
        (Dynamic::Unknown, _) => true,
        (Dynamic::String(_), AttributeType::String) => true,
        (Dynamic::Number(_), AttributeType::Number) => true,
        (Dynamic::Bool(_), AttributeType::Bool) => true,
        (Dynamic::List(list), AttributeType::List(elem_type)) => list
            .iter()
            .all(|elem| validate_dynamic_type(elem, elem_type)),
        (Dynamic::List(list), AttributeType::Set(elem_type)) => list
            .iter()
            .all(|elem| validate_dynamic_type(elem, elem_type)),
        (Dynamic::Map(map), AttributeType::Map(elem_type)) => map
            .values()
            .all(|elem| validate_dynamic_type(elem, elem_type)),
        (Dynamic::Map(map), AttributeType::Object(attrs)) => {
            for (field_name, field_type) in attrs {
                if let Some(value) = map.get(field_name) {
                    if !validate_dynamic_type(value, field_type) {
                        return false;
                    }
                }
            }
            true
        }
        _ => false,
    }
}

fn dynamic_type_name(value: &Dynamic) -> &'static str {
    match value {
        Dynamic::Null => "null",
        Dynamic::Bool(_) => "bool",
        Dynamic::Number(_) => "number",
        Dynamic::String(_) => "string",
        Dynamic::List(_) => "list",
        Dynamic::Map(_) => "map",
        Dynamic::Unknown => "unknown",
    }
}

fn attribute_path(name: &str) -> AttributePath {
    AttributePath {
        steps: vec![attribute_path::Step {
            selector: Some(attribute_path::step::Selector::AttributeName(
                name.to_string(),
            )),
        }],
    }
}

fn error_diagnostic(summary: String, detail: String, attribute: Option<AttributePath>) -> Diagnostic {
    Diagnostic {
        severity: diagnostic::Severity::Error as i32,
        summary,
        detail,
        attribute,
    }
}

fn to_proto_diagnostics(diags: &TfbridgeDiagnostics) -> Vec<Diagnostic> {
    diags
        .errors
        .iter()
        .map(|e| Diagnostic {
            severity: diagnostic::Severity::Error as i32,
            summary: e.summary.clone(),
            detail: e.detail.clone().unwrap_or_default(),
            attribute: None,
        })
        .chain(diags.warnings.iter().map(|w| Diagnostic {
            severity: diagnostic::Severity::Warning as i32,
            summary: w.summary.clone(),
            detail: w.detail.clone().unwrap_or_default(),
            attribute: None,
        }))
        .collect()
}
