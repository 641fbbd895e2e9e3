//! Attribute/domain mapping for services
//!
//! The provider schema models `logging` and `source` as ordered lists of
//! blocks, while the control plane keys them by source name. This module
//! owns the conversion in both directions, the composite id synthesis,
//! and the provider-default environment fallback, so the lifecycle code
//! never touches wire shapes directly.

use crate::api::{Access, Logging, Metadata, Service, Source};
use std::collections::HashMap;
use tfbridge::{Dynamic, State};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("'{0}' is required")]
    MissingAttribute(&'static str),

    #[error("'{attribute}' must be {expected}")]
    WrongType {
        attribute: String,
        expected: &'static str,
    },

    #[error("access endpoint '{endpoint}' is not a valid URL: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

/// Composite identifier, recomputed from every response and never
/// trusted from prior state.
pub fn service_id(tenant: &str, environment: &str, name: &str) -> String {
    format!("{}/{}/{}", tenant, environment, name)
}

/// Builds the wire document from planned attribute values.
///
/// An empty or absent `environment` falls back to `default_environment`
/// before the identifier is formed or any remote call is made. Duplicate
/// `source` values in the `logging`/`source` lists resolve last-wins.
pub fn to_domain(
    values: &HashMap<String, Dynamic>,
    tenant: &str,
    default_environment: &str,
) -> Result<Service, MappingError> {
    let name = required_string(values, "name")?;

    let environment = match optional_string(values, "environment")? {
        Some(e) if !e.is_empty() => e,
        _ => default_environment.to_string(),
    };

    let mut access = Vec::new();
    for entry in list_entries(values, "access")? {
        let fields = object_fields(entry, "access")?;
        let endpoint = required_string(fields, "endpoint").map_err(|_| {
            MappingError::MissingAttribute("access.endpoint")
        })?;
        if let Err(e) = Url::parse(&endpoint) {
            return Err(MappingError::InvalidEndpoint {
                endpoint,
                reason: e.to_string(),
            });
        }
        access.push(Access {
            auth: optional_bool(fields, "auth").unwrap_or(false),
            endpoint,
            internal: optional_bool(fields, "internal").unwrap_or(false),
        });
    }

    let mut logging = HashMap::new();
    for entry in list_entries(values, "logging")? {
        let fields = object_fields(entry, "logging")?;
        let source = required_string(fields, "source")
            .map_err(|_| MappingError::MissingAttribute("logging.source"))?;
        let labels = labels_of(fields, "logging.labels")?.unwrap_or_default();
        logging.insert(source, Logging { labels });
    }

    let mut sources = HashMap::new();
    for entry in list_entries(values, "source")? {
        let fields = object_fields(entry, "source")?;
        let source = required_string(fields, "source")
            .map_err(|_| MappingError::MissingAttribute("source.source"))?;
        let labels = labels_of(fields, "source.labels")?.unwrap_or_default();
        sources.insert(source, Source { labels });
    }

    let metadata = match values.get("metadata") {
        Some(Dynamic::Map(fields)) => Some(Metadata {
            labels: labels_of(fields, "metadata.labels")?,
        }),
        Some(Dynamic::Null) | Some(Dynamic::Unknown) | None => None,
        Some(_) => {
            return Err(MappingError::WrongType {
                attribute: "metadata".to_string(),
                expected: "an object",
            })
        }
    };

    Ok(Service {
        access,
        description: optional_string(values, "description")?.unwrap_or_default(),
        disabled: optional_bool(values, "disabled"),
        environment,
        logging,
        metadata,
        name,
        remarks: optional_string(values, "remarks")?.unwrap_or_default(),
        sources,
        tenant: tenant.to_string(),
        ..Default::default()
    })
}

/// Translates a service document back into resource state.
///
/// `logging`/`source` list order follows the wire map's iteration order
/// and is not stable across calls; Terraform sees the entries as sets of
/// equal content either way.
pub fn to_state(service: &Service) -> State {
    let mut state = State::new();

    state.values.insert(
        "id".to_string(),
        Dynamic::String(service_id(
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
    state.values.insert(
        "description".to_string(),
        Dynamic::String(service.description.clone()),
    );
    state.values.insert(
        "remarks".to_string(),
        Dynamic::String(service.remarks.clone()),
    );
    state.values.insert(
        "disabled".to_string(),
        Dynamic::Bool(service.disabled.unwrap_or(false)),
    );

    let access = service
        .access
        .iter()
        .map(|a| {
            let mut fields = HashMap::new();
            fields.insert("auth".to_string(), Dynamic::Bool(a.auth));
            fields.insert("endpoint".to_string(), Dynamic::String(a.endpoint.clone()));
            fields.insert("internal".to_string(), Dynamic::Bool(a.internal));
            Dynamic::Map(fields)
        })
        .collect::<Vec<_>>();
    state
        .values
        .insert("access".to_string(), non_empty_list(access));

    let logging = service
        .logging
        .iter()
        .map(|(source, config)| named_labels_entry(source, &config.labels))
        .collect::<Vec<_>>();
    state
        .values
        .insert("logging".to_string(), non_empty_list(logging));

    let sources = service
        .sources
        .iter()
        .map(|(source, config)| named_labels_entry(source, &config.labels))
        .collect::<Vec<_>>();
    state
        .values
        .insert("source".to_string(), non_empty_list(sources));

    // Absent metadata and metadata with an empty label map are distinct
    // states on the wire; keep them distinct here too.
    let metadata = match &service.metadata {
        Some(metadata) => {
            let mut fields = HashMap::new();
            fields.insert(
                "labels".to_string(),
                match &metadata.labels {
                    Some(labels) => Dynamic::Map(string_map_to_dynamic(labels)),
                    None => Dynamic::Null,
                },
            );
            Dynamic::Map(fields)
        }
        None => Dynamic::Null,
    };
    state.values.insert("metadata".to_string(), metadata);

    state
}

fn named_labels_entry(source: &str, labels: &HashMap<String, String>) -> Dynamic {
    let mut fields = HashMap::new();
    fields.insert(
        "labels".to_string(),
        Dynamic::Map(string_map_to_dynamic(labels)),
    );
    fields.insert("source".to_string(), Dynamic::String(source.to_string()));
    Dynamic::Map(fields)
}

fn string_map_to_dynamic(labels: &HashMap<String, String>) -> HashMap<String, Dynamic> {
    labels
        .iter()
        .map(|(k, v)| (k.clone(), Dynamic::String(v.clone())))
        .collect()
}

fn non_empty_list(items: Vec<Dynamic>) -> Dynamic {
    if items.is_empty() {
        Dynamic::Null
    } else {
        Dynamic::List(items)
    }
}

fn required_string(
    values: &HashMap<String, Dynamic>,
    key: &'static str,
) -> Result<String, MappingError> {
    optional_string(values, key)?
        .filter(|s| !s.is_empty())
        .ok_or(MappingError::MissingAttribute(key))
}

fn optional_string(
    values: &HashMap<String, Dynamic>,
    key: &str,
) -> Result<Option<String>, MappingError> {
    match values.get(key) {
        Some(Dynamic::String(s)) => Ok(Some(s.clone())),
        Some(Dynamic::Null) | Some(Dynamic::Unknown) | None => Ok(None),
        Some(_) => Err(MappingError::WrongType {
            attribute: key.to_string(),
            expected: "a string",
        }),
    }
}

fn optional_bool(values: &HashMap<String, Dynamic>, key: &str) -> Option<bool> {
    values.get(key).and_then(|v| v.as_bool())
}

fn list_entries<'a>(
    values: &'a HashMap<String, Dynamic>,
    key: &str,
) -> Result<&'a [Dynamic], MappingError> {
    match values.get(key) {
        Some(Dynamic::List(items)) => Ok(items),
        Some(Dynamic::Null) | Some(Dynamic::Unknown) | None => Ok(&[]),
        Some(_) => Err(MappingError::WrongType {
            attribute: key.to_string(),
            expected: "a list of objects",
        }),
    }
}

fn object_fields<'a>(
    entry: &'a Dynamic,
    list: &str,
) -> Result<&'a HashMap<String, Dynamic>, MappingError> {
    entry.as_map().ok_or_else(|| MappingError::WrongType {
        attribute: list.to_string(),
        expected: "a list of objects",
    })
}

fn labels_of(
    fields: &HashMap<String, Dynamic>,
    attribute: &str,
) -> Result<Option<HashMap<String, String>>, MappingError> {
    match fields.get("labels") {
        Some(Dynamic::Map(entries)) => {
            let mut labels = HashMap::new();
            for (key, value) in entries {
                let value = value.as_string().ok_or_else(|| MappingError::WrongType {
                    attribute: attribute.to_string(),
                    expected: "a map of strings",
                })?;
                labels.insert(key.clone(), value.to_string());
            }
            Ok(Some(labels))
        }
        Some(Dynamic::Null) | Some(Dynamic::Unknown) | None => Ok(None),
        Some(_) => Err(MappingError::WrongType {
            attribute: attribute.to_string(),
            expected: "a map of strings",
        }),
    }
}
