//! Schema definitions for providers, resources and data sources
//!
//! Schemas describe the attributes Terraform may set or read. Providers
//! build them once with `SchemaBuilder` and return them from the schema
//! methods on the provider trait; the gRPC layer converts them to the
//! wire representation.

use crate::plan_modifier::PlanModifier;
use crate::validator::Validator;
use std::collections::HashMap;
use std::sync::Arc;

/// AttributeType defines the type system for Terraform attributes
/// This must match Terraform's type system exactly
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),               // Ordered, allows duplicates
    Set(Box<AttributeType>),                // Unordered, no duplicates
    Map(Box<AttributeType>),                // String keys only
    Object(HashMap<String, AttributeType>), // Fixed structure
}

/// Attribute represents a single configuration attribute
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub validators: Vec<Arc<dyn Validator>>,
    pub plan_modifiers: Vec<Arc<dyn PlanModifier>>,
}

// Manual Debug implementation since validators/modifiers don't implement Debug
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("description", &self.description)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .field(
                "plan_modifiers",
                &format!("{} plan modifiers", self.plan_modifiers.len()),
            )
            .finish()
    }
}

/// Builder for a single attribute
///
/// Constructors fix the type, the remaining methods set flags:
///
/// ```ignore
/// AttributeBuilder::string("name")
///     .required()
///     .description("Service name")
/// ```
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    fn new(name: &str, r#type: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
            },
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, AttributeType::Number)
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn list(name: &str, element_type: AttributeType) -> Self {
        Self::new(name, AttributeType::List(Box::new(element_type)))
    }

    pub fn set(name: &str, element_type: AttributeType) -> Self {
        Self::new(name, AttributeType::Set(Box::new(element_type)))
    }

    pub fn map(name: &str, element_type: AttributeType) -> Self {
        Self::new(name, AttributeType::Map(Box::new(element_type)))
    }

    pub fn object(name: &str, attributes: HashMap<String, AttributeType>) -> Self {
        Self::new(name, AttributeType::Object(attributes))
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.attribute.description = description.into();
        self
    }

    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.attribute.validators.push(validator);
        self
    }

    pub fn plan_modifier(mut self, modifier: Arc<dyn PlanModifier>) -> Self {
        self.attribute.plan_modifiers.push(modifier);
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// Schema for a managed resource
/// Version is used for state migration
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub version: i64,
    pub attributes: HashMap<String, Attribute>,
}

/// Schema for a data source
#[derive(Debug, Clone)]
pub struct DataSourceSchema {
    pub version: i64,
    pub attributes: HashMap<String, Attribute>,
}

/// Schema for the provider configuration block
#[derive(Debug, Clone)]
pub struct ProviderSchema {
    pub version: i64,
    pub attributes: HashMap<String, Attribute>,
}

/// Builder for complete schemas
#[derive(Default)]
pub struct SchemaBuilder {
    attributes: HashMap<String, Attribute>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: &str, builder: AttributeBuilder) -> Self {
        self.attributes.insert(name.to_string(), builder.build());
        self
    }

    pub fn build_resource(self, version: i64) -> ResourceSchema {
        ResourceSchema {
            version,
            attributes: self.attributes,
        }
    }

    pub fn build_data_source(self, version: i64) -> DataSourceSchema {
        DataSourceSchema {
            version,
            attributes: self.attributes,
        }
    }

    pub fn build_provider(self, version: i64) -> ProviderSchema {
        ProviderSchema {
            version,
            attributes: self.attributes,
        }
    }
}
