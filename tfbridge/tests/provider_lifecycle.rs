//! Lifecycle tests driving a provider through the gRPC service layer
//!
//! Uses an in-memory registry provider so every plan/apply pair can be
//! checked against the backing store, the way Terraform would exercise
//! a real provider process.

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use async_trait::async_trait;
use rmp_serde::{decode, encode};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task;
use tonic::Request;

use tfbridge::grpc::ProviderService;
use tfbridge::proto::tfplugin6::provider_server::Provider as ProtoProvider;
use tfbridge::proto::tfplugin6::{
    apply_resource_change, configure_provider, import_resource_state, plan_resource_change,
    read_data_source, read_resource, DynamicValue,
};
use tfbridge::request::{
    ConfigureRequest, ConfigureResponse, CreateRequest, CreateResponse, DeleteRequest,
    DeleteResponse, ImportRequest, ImportResponse, ReadDataSourceRequest, ReadDataSourceResponse,
    ReadRequest, ReadResponse, UpdateRequest, UpdateResponse,
};
use tfbridge::{
    AttributeBuilder, DataSource, DataSourceSchema, Diagnostics, Dynamic, Provider, ProviderSchema,
    RequiresReplaceIfChanged, Resource, ResourceSchema, Result, SchemaBuilder, State,
    UseStateForUnknown,
};

const MSGPACK_NIL: u8 = 0xc0;

// Entries live in a store shared by the provider, its resources, and
// its data sources, so tests can observe side effects directly.
type Store = Arc<RwLock<HashMap<String, HashMap<String, Dynamic>>>>;

struct RegistryProvider {
    store: Store,
    endpoint: RwLock<Option<String>>,
}

impl RegistryProvider {
    fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            endpoint: RwLock::new(None),
        }
    }
}

fn entry_schema() -> ResourceSchema {
    SchemaBuilder::new()
        .attribute(
            "name",
            AttributeBuilder::string("name")
                .required()
                .plan_modifier(Arc::new(RequiresReplaceIfChanged)),
        )
        .attribute("value", AttributeBuilder::string("value").optional())
        .attribute(
            "id",
            AttributeBuilder::string("id")
                .computed()
                .plan_modifier(Arc::new(UseStateForUnknown)),
        )
        .build_resource(0)
}

fn entry_data_source_schema() -> DataSourceSchema {
    SchemaBuilder::new()
        .attribute("name", AttributeBuilder::string("name").required())
        .attribute("value", AttributeBuilder::string("value").computed())
        .attribute("id", AttributeBuilder::string("id").computed())
        .build_data_source(0)
}

#[async_trait]
impl Provider for RegistryProvider {
    async fn configure(&mut self, request: ConfigureRequest) -> ConfigureResponse {
        let mut endpoint = self.endpoint.write().await;
        *endpoint = request.config.get_string("endpoint");
        ConfigureResponse {
            diagnostics: Diagnostics::new(),
        }
    }

    async fn provider_schema(&self) -> ProviderSchema {
        SchemaBuilder::new()
            .attribute("endpoint", AttributeBuilder::string("endpoint").optional())
            .build_provider(0)
    }

    async fn create_resource(&self, name: &str) -> Result<Box<dyn Resource>> {
        match name {
            "registry_entry" => Ok(Box::new(EntryResource {
                store: self.store.clone(),
            })),
            _ => Err(format!("Unknown resource type: {}", name).into()),
        }
    }

    async fn create_data_source(&self, name: &str) -> Result<Box<dyn DataSource>> {
        match name {
            "registry_entry" => Ok(Box::new(EntryDataSource {
                store: self.store.clone(),
            })),
            _ => Err(format!("Unknown data source type: {}", name).into()),
        }
    }

    async fn resource_schemas(&self) -> HashMap<String, ResourceSchema> {
        let mut schemas = HashMap::new();
        schemas.insert("registry_entry".to_string(), entry_schema());
        schemas
    }

    async fn data_source_schemas(&self) -> HashMap<String, DataSourceSchema> {
        let mut schemas = HashMap::new();
        schemas.insert("registry_entry".to_string(), entry_data_source_schema());
        schemas
    }
}

struct EntryResource {
    store: Store,
}

fn entry_state(name: &str, values: &HashMap<String, Dynamic>) -> State {
    let mut state = State::new();
    state
        .values
        .insert("name".to_string(), Dynamic::String(name.to_string()));
    if let Some(value) = values.get("value") {
        state.values.insert("value".to_string(), value.clone());
    }
    state.values.insert(
        "id".to_string(),
        Dynamic::String(format!("entry-{}", name)),
    );
    state
}

#[async_trait]
impl Resource for EntryResource {
    async fn create(&self, request: CreateRequest) -> CreateResponse {
        let mut diagnostics = Diagnostics::new();
        let Some(name) = request.config.get_string("name") else {
            diagnostics.add_error("name is required", None::<String>);
            return CreateResponse {
                state: State::new(),
                diagnostics,
            };
        };

        let mut store = self.store.write().await;
        store.insert(name.clone(), request.config.values.clone());

        CreateResponse {
            state: entry_state(&name, &request.config.values),
            diagnostics,
        }
    }

    async fn read(&self, request: ReadRequest) -> ReadResponse {
        let name = match request.current_state.get_string("name") {
            Some(name) => name,
            None => {
                return ReadResponse {
                    state: None,
                    diagnostics: Diagnostics::new(),
                }
            }
        };

        let store = self.store.read().await;
        ReadResponse {
            state: store.get(&name).map(|values| entry_state(&name, values)),
            diagnostics: Diagnostics::new(),
        }
    }

    async fn update(&self, request: UpdateRequest) -> UpdateResponse {
        let mut diagnostics = Diagnostics::new();
        let Some(name) = request.config.get_string("name") else {
            diagnostics.add_error("name is required", None::<String>);
            return UpdateResponse {
                state: request.current_state,
                diagnostics,
            };
        };

        let mut store = self.store.write().await;
        store.insert(name.clone(), request.config.values.clone());

        UpdateResponse {
            state: entry_state(&name, &request.config.values),
            diagnostics,
        }
    }

    async fn delete(&self, request: DeleteRequest) -> DeleteResponse {
        if let Some(name) = request.current_state.get_string("name") {
            let mut store = self.store.write().await;
            store.remove(&name);
        }
        DeleteResponse {
            diagnostics: Diagnostics::new(),
        }
    }

    async fn import(&self, request: ImportRequest) -> ImportResponse {
        let mut diagnostics = Diagnostics::new();
        let Some(name) = request.id.strip_prefix("entry-") else {
            diagnostics.add_error(
                "Invalid import ID",
                Some(format!("Expected 'entry-<name>', got '{}'", request.id)),
            );
            return ImportResponse {
                state: None,
                diagnostics,
            };
        };

        let store = self.store.read().await;
        ImportResponse {
            state: store.get(name).map(|values| entry_state(name, values)),
            diagnostics,
        }
    }
}

struct EntryDataSource {
    store: Store,
}

#[async_trait]
impl DataSource for EntryDataSource {
    async fn read(&self, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = Diagnostics::new();
        let Some(name) = request.config.get_string("name") else {
            diagnostics.add_error("name is required", None::<String>);
            return ReadDataSourceResponse {
                state: None,
                diagnostics,
            };
        };

        let store = self.store.read().await;
        match store.get(&name) {
            Some(values) => ReadDataSourceResponse {
                state: Some(entry_state(&name, values)),
                diagnostics,
            },
            None => {
                diagnostics.add_error(
                    format!("Entry '{}' not found", name),
                    None::<String>,
                );
                ReadDataSourceResponse {
                    state: None,
                    diagnostics,
                }
            }
        }
    }
}

fn encode_map(values: &HashMap<String, Dynamic>) -> DynamicValue {
    DynamicValue {
        msgpack: encode::to_vec_named(values).unwrap(),
        json: vec![],
    }
}

fn nil_value() -> DynamicValue {
    DynamicValue {
        msgpack: vec![MSGPACK_NIL],
        json: vec![],
    }
}

fn decode_state(value: &DynamicValue) -> HashMap<String, Dynamic> {
    decode::from_slice(&value.msgpack).unwrap()
}

fn service() -> ProviderService<RegistryProvider> {
    ProviderService::new(RegistryProvider::new())
}

#[tokio::test]
async fn test_full_resource_lifecycle_through_grpc() {
    let service = service();

    let mut config = HashMap::new();
    config.insert("name".to_string(), Dynamic::String("web".to_string()));
    config.insert("value".to_string(), Dynamic::String("v1".to_string()));

    // Plan the create: computed id must come back unknown.
    let plan = service
        .plan_resource_change(Request::new(plan_resource_change::Request {
            type_name: "registry_entry".to_string(),
            prior_state: Some(nil_value()),
            proposed_new_state: Some(encode_map(&config)),
            config: Some(encode_map(&config)),
            prior_private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    let planned = decode_state(plan.planned_state.as_ref().unwrap());
    assert_eq!(planned.get("id"), Some(&Dynamic::Unknown));
    assert!(plan.requires_replace.is_empty());

    // Apply the create.
    let apply = service
        .apply_resource_change(Request::new(apply_resource_change::Request {
            type_name: "registry_entry".to_string(),
            prior_state: Some(nil_value()),
            planned_state: plan.planned_state.clone(),
            config: Some(encode_map(&config)),
            planned_private: vec![],
            provider_meta: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(apply.diagnostics.is_empty());
    let created = decode_state(apply.new_state.as_ref().unwrap());
    assert_eq!(
        created.get("id"),
        Some(&Dynamic::String("entry-web".to_string()))
    );

    // Refresh sees the stored entry.
    let read = service
        .read_resource(Request::new(read_resource::Request {
            type_name: "registry_entry".to_string(),
            current_state: apply.new_state.clone(),
            private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    let refreshed = decode_state(read.new_state.as_ref().unwrap());
    assert_eq!(
        refreshed.get("value"),
        Some(&Dynamic::String("v1".to_string()))
    );

    // Plan an in-place update: id is carried over from state, and a
    // value change does not force replacement.
    let mut new_config = config.clone();
    new_config.insert("value".to_string(), Dynamic::String("v2".to_string()));
    let mut proposed = created.clone();
    proposed.insert("value".to_string(), Dynamic::String("v2".to_string()));

    let update_plan = service
        .plan_resource_change(Request::new(plan_resource_change::Request {
            type_name: "registry_entry".to_string(),
            prior_state: apply.new_state.clone(),
            proposed_new_state: Some(encode_map(&proposed)),
            config: Some(encode_map(&new_config)),
            prior_private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    let update_planned = decode_state(update_plan.planned_state.as_ref().unwrap());
    assert_eq!(
        update_planned.get("id"),
        Some(&Dynamic::String("entry-web".to_string()))
    );
    assert!(update_plan.requires_replace.is_empty());

    let update_apply = service
        .apply_resource_change(Request::new(apply_resource_change::Request {
            type_name: "registry_entry".to_string(),
            prior_state: apply.new_state.clone(),
            planned_state: update_plan.planned_state.clone(),
            config: Some(encode_map(&new_config)),
            planned_private: vec![],
            provider_meta: None,
        }))
        .await
        .unwrap()
        .into_inner();

    let updated = decode_state(update_apply.new_state.as_ref().unwrap());
    assert_eq!(
        updated.get("value"),
        Some(&Dynamic::String("v2".to_string()))
    );

    // Destroy: planned state is nil, and the apply clears the store.
    let destroy_plan = service
        .plan_resource_change(Request::new(plan_resource_change::Request {
            type_name: "registry_entry".to_string(),
            prior_state: update_apply.new_state.clone(),
            proposed_new_state: Some(nil_value()),
            config: Some(nil_value()),
            prior_private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(
        destroy_plan.planned_state.as_ref().unwrap().msgpack,
        vec![MSGPACK_NIL]
    );

    let destroy = service
        .apply_resource_change(Request::new(apply_resource_change::Request {
            type_name: "registry_entry".to_string(),
            prior_state: update_apply.new_state.clone(),
            planned_state: Some(nil_value()),
            config: Some(nil_value()),
            planned_private: vec![],
            provider_meta: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(destroy.diagnostics.is_empty());
    assert_eq!(destroy.new_state.as_ref().unwrap().msgpack, vec![MSGPACK_NIL]);

    // A refresh after destroy finds nothing.
    let read_gone = service
        .read_resource(Request::new(read_resource::Request {
            type_name: "registry_entry".to_string(),
            current_state: Some(encode_map(&updated)),
            private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(
        read_gone.new_state.as_ref().unwrap().msgpack,
        vec![MSGPACK_NIL]
    );
}

#[tokio::test]
async fn test_configure_provider_accepts_endpoint() {
    let service = service();

    let mut config = HashMap::new();
    config.insert(
        "endpoint".to_string(),
        Dynamic::String("https://registry.local".to_string()),
    );

    let resp = service
        .configure_provider(Request::new(configure_provider::Request {
            terraform_version: "1.9.0".to_string(),
            config: Some(encode_map(&config)),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(resp.diagnostics.is_empty());
}

#[tokio::test]
async fn test_concurrent_applies_share_provider_state() {
    let service = Arc::new(service());
    let mut handles = vec![];

    for i in 0..8 {
        let service = service.clone();
        handles.push(task::spawn(async move {
            let mut config = HashMap::new();
            config.insert("name".to_string(), Dynamic::String(format!("entry{}", i)));

            service
                .apply_resource_change(Request::new(apply_resource_change::Request {
                    type_name: "registry_entry".to_string(),
                    prior_state: Some(nil_value()),
                    planned_state: Some(encode_map(&config)),
                    config: Some(encode_map(&config)),
                    planned_private: vec![],
                    provider_meta: None,
                }))
                .await
                .unwrap()
                .into_inner()
        }));
    }

    for handle in handles {
        let resp = handle.await.unwrap();
        assert!(resp.diagnostics.is_empty());
    }

    // Every create landed in the shared store, so each one reads back.
    for i in 0..8 {
        let mut config = HashMap::new();
        config.insert("name".to_string(), Dynamic::String(format!("entry{}", i)));

        let resp = service
            .read_data_source(Request::new(read_data_source::Request {
                type_name: "registry_entry".to_string(),
                config: Some(encode_map(&config)),
                provider_meta: None,
                client_capabilities: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(resp.diagnostics.is_empty());
    }
}

#[tokio::test]
async fn test_import_recovers_state_from_store() {
    let provider = RegistryProvider::new();
    {
        let mut store = provider.store.write().await;
        let mut values = HashMap::new();
        values.insert("name".to_string(), Dynamic::String("legacy".to_string()));
        values.insert("value".to_string(), Dynamic::String("imported".to_string()));
        store.insert("legacy".to_string(), values);
    }
    let service = ProviderService::new(provider);

    let resp = service
        .import_resource_state(Request::new(import_resource_state::Request {
            type_name: "registry_entry".to_string(),
            id: "entry-legacy".to_string(),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(resp.diagnostics.is_empty());
    assert_eq!(resp.imported_resources.len(), 1);
    let state = decode_state(resp.imported_resources[0].state.as_ref().unwrap());
    assert_eq!(
        state.get("value"),
        Some(&Dynamic::String("imported".to_string()))
    );
    assert_eq!(
        state.get("id"),
        Some(&Dynamic::String("entry-legacy".to_string()))
    );
}

#[tokio::test]
async fn test_import_with_malformed_id_reports_error() {
    let service = service();

    let resp = service
        .import_resource_state(Request::new(import_resource_state::Request {
            type_name: "registry_entry".to_string(),
            id: "not-an-entry-id".to_string(),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(resp.imported_resources.is_empty());
    assert_eq!(resp.diagnostics.len(), 1);
    assert!(resp.diagnostics[0].summary.contains("Invalid import ID"));
}

#[tokio::test]
async fn test_data_source_read_reports_missing_entry() {
    let service = service();

    let mut config = HashMap::new();
    config.insert("name".to_string(), Dynamic::String("ghost".to_string()));

    let resp = service
        .read_data_source(Request::new(read_data_source::Request {
            type_name: "registry_entry".to_string(),
            config: Some(encode_map(&config)),
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(resp.diagnostics.len(), 1);
    assert!(resp.diagnostics[0].summary.contains("ghost"));
}
