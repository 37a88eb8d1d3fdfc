//! Model and query file formats read by the command line.
//!
//! Model file:
//!
//! ```json
//! {
//!   "entityTypes": [
//!     {
//!       "name": "Animal",
//!       "properties": [{ "name": "Name", "type": "string" }],
//!       "discriminator": { "property": "Discriminator", "type": "string", "value": "Animal" }
//!     },
//!     { "name": "Dog", "base": "Animal", "discriminatorValue": "Dog" }
//!   ]
//! }
//! ```
//!
//! Query file:
//!
//! ```json
//! {
//!   "entity": "Dog",
//!   "filters": [{ "path": ["Name"], "op": "==", "value": "Rex" }],
//!   "parameters": {}
//! }
//! ```

use serde::Deserialize;

use crate::{
    model::{EntityTypeBuilder, Model, ModelError, Property},
    value::{ValueType, from_json},
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelFile {
    pub entity_types: Vec<EntityTypeFile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTypeFile {
    pub name: String,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyFile>,
    #[serde(default)]
    pub discriminator: Option<DiscriminatorFile>,
    #[serde(default)]
    pub discriminator_value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyFile {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    /// Fields of an `object` property
    #[serde(default)]
    pub properties: Vec<PropertyFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscriminatorFile {
    pub property: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryFile {
    pub entity: String,
    #[serde(default)]
    pub filters: Vec<ConditionFile>,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

/// One comparison between a property path and either a constant or a
/// parameter. A condition with neither compares against `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionFile {
    pub path: Vec<String>,
    pub op: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub parameter: Option<String>,
}

impl ModelFile {
    pub fn into_model(self) -> Result<Model, ModelError> {
        self.entity_types
            .into_iter()
            .fold(Model::builder(), |builder, entity| builder.entity(entity.into_builder()))
            .build()
    }
}

impl EntityTypeFile {
    fn into_builder(self) -> EntityTypeBuilder {
        let mut builder = EntityTypeBuilder::new(self.name);
        if let Some(base) = self.base {
            builder = builder.base(base);
        }
        for property in self.properties {
            builder = builder.property_def(property.into_property());
        }
        if let Some(discriminator) = self.discriminator {
            builder = builder.discriminator(
                discriminator.property,
                discriminator.value_type,
                from_json(discriminator.value),
            );
        }
        if let Some(value) = self.discriminator_value {
            builder = builder.discriminator_value(from_json(value));
        }
        builder
    }
}

impl PropertyFile {
    fn into_property(self) -> Property {
        match self.value_type {
            ValueType::Object => Property::object(
                self.name,
                self.properties.into_iter().map(PropertyFile::into_property).collect(),
            ),
            value_type => Property::new(self.name, value_type),
        }
    }
}
