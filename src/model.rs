//! Entity metadata catalog.
//!
//! Entity types form single-inheritance hierarchies. A hierarchy that is
//! flattened into one container declares a discriminator property on its root
//! type, and every type in it carries the discriminator value stored in
//! documents of exactly that type.
//!
//! Models are assembled with [`ModelBuilder`], which validates the metadata
//! once. Everything downstream assumes a built [`Model`] is consistent.
//!
//! ```
//! use docql::model::{EntityTypeBuilder, Model};
//! use docql::ValueType;
//!
//! let model = Model::builder()
//!     .entity(
//!         EntityTypeBuilder::new("Animal")
//!             .property("Name", ValueType::String)
//!             .discriminator("Discriminator", ValueType::String, "Animal"),
//!     )
//!     .entity(EntityTypeBuilder::new("Dog").base("Animal").discriminator_value("Dog"))
//!     .build()
//!     .unwrap();
//!
//! let animal = model.entity_type("Animal").unwrap();
//! let dog = model.entity_type("Dog").unwrap();
//! assert!(animal.is_assignable_from(dog));
//! assert!(!dog.is_assignable_from(animal));
//! ```

use std::{collections::HashMap, sync::Arc};

use thiserror::Error;
use tracing::debug;

use crate::value::{Value, ValueType};

/// Errors raised while building or querying entity metadata.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("entity type '{0}' is declared more than once")]
    DuplicateEntityType(String),

    #[error("entity type '{entity}' derives from unknown type '{base}'")]
    UnknownBaseType { entity: String, base: String },

    #[error("inheritance cycle through entity type '{0}'")]
    InheritanceCycle(String),

    #[error("property '{property}' is declared more than once on '{entity}'")]
    DuplicateProperty { entity: String, property: String },

    #[error("'{entity}' has no property '{property}'")]
    UnknownProperty { entity: String, property: String },

    /// A path tried to step through a property that is not an embedded object.
    #[error("property '{property}' of type {value_type} has no fields")]
    NotAnObject {
        property: String,
        value_type: ValueType,
    },

    #[error(
        "discriminator value for '{entity}' is {actual}, but property '{property}' is declared as {expected}"
    )]
    DiscriminatorValueType {
        entity: String,
        property: String,
        expected: ValueType,
        actual: &'static str,
    },

    #[error("entity type '{0}' is part of a discriminated hierarchy but has no discriminator value")]
    MissingDiscriminatorValue(String),

    #[error("entity type '{0}' has a discriminator value but its hierarchy has no discriminator property")]
    DiscriminatorWithoutProperty(String),

    #[error("entity type '{entity}' redeclares the discriminator inherited from '{base}'")]
    ConflictingDiscriminator { entity: String, base: String },

    #[error("entity types '{first}' and '{second}' share a discriminator value")]
    DuplicateDiscriminatorValue { first: String, second: String },
}

/// A property definition: a named, typed field of a document.
///
/// Object-typed properties describe embedded documents and carry their own
/// field definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: String,
    value_type: ValueType,
    properties: Vec<Arc<Property>>,
}

impl Property {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Property {
            name: name.into(),
            value_type,
            properties: Vec::new(),
        }
    }

    /// An embedded-object property with the given fields.
    pub fn object(name: impl Into<String>, fields: Vec<Property>) -> Self {
        Property {
            name: name.into(),
            value_type: ValueType::Object,
            properties: fields.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Fields of an embedded object; empty for scalar properties.
    pub fn properties(&self) -> &[Arc<Property>] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Arc<Property>> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// An entity type within a model.
///
/// Equality is by name; names are unique within a [`Model`].
#[derive(Debug)]
pub struct EntityType {
    name: String,
    base: Option<Arc<EntityType>>,
    properties: Vec<Arc<Property>>,
    discriminator_property: Option<Arc<Property>>,
    discriminator_value: Option<Value>,
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for EntityType {}

impl EntityType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> Option<&Arc<EntityType>> {
        self.base.as_ref()
    }

    /// Properties declared directly on this type.
    pub fn declared_properties(&self) -> &[Arc<Property>] {
        &self.properties
    }

    /// Look up a declared or inherited property.
    pub fn property(&self, name: &str) -> Option<&Arc<Property>> {
        self.properties
            .iter()
            .find(|p| p.name() == name)
            .or_else(|| self.base.as_ref().and_then(|b| b.property(name)))
    }

    /// The discriminator property, inherited from the hierarchy root.
    pub fn discriminator_property(&self) -> Option<&Arc<Property>> {
        self.discriminator_property.as_ref()
    }

    /// The value stored in the discriminator of documents of exactly this type.
    pub fn discriminator_value(&self) -> Option<&Value> {
        self.discriminator_value.as_ref()
    }

    /// The topmost ancestor of this type (itself when it has no base).
    pub fn root(&self) -> &EntityType {
        let mut current = self;
        while let Some(base) = &current.base {
            current = base;
        }
        current
    }

    /// True when `other` is this type or one of its subtypes.
    pub fn is_assignable_from(&self, other: &EntityType) -> bool {
        let mut current = Some(other);
        while let Some(ty) = current {
            if ty == self {
                return true;
            }
            current = ty.base.as_deref();
        }
        false
    }

    /// Resolve a property path, one name per step, into property definitions.
    ///
    /// The first name is looked up on this type, every following name on the
    /// embedded object reached so far.
    pub fn resolve_path<S: AsRef<str>>(&self, path: &[S]) -> Result<Vec<Arc<Property>>, ModelError> {
        let mut resolved: Vec<Arc<Property>> = Vec::with_capacity(path.len());

        for name in path {
            let name = name.as_ref();
            let next = match resolved.last() {
                None => self.property(name).ok_or_else(|| ModelError::UnknownProperty {
                    entity: self.name.clone(),
                    property: name.to_string(),
                })?,
                Some(parent) => {
                    if parent.value_type() != ValueType::Object {
                        return Err(ModelError::NotAnObject {
                            property: parent.name().to_string(),
                            value_type: parent.value_type(),
                        });
                    }
                    parent.property(name).ok_or_else(|| ModelError::UnknownProperty {
                        entity: format!("{}.{}", self.name, parent.name()),
                        property: name.to_string(),
                    })?
                }
            };
            resolved.push(Arc::clone(next));
        }

        Ok(resolved)
    }
}

/// Declaration of one entity type, consumed by [`ModelBuilder`].
#[derive(Debug, Clone)]
pub struct EntityTypeBuilder {
    name: String,
    base: Option<String>,
    properties: Vec<Property>,
    discriminator: Option<(Property, Value)>,
    discriminator_value: Option<Value>,
}

impl EntityTypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        EntityTypeBuilder {
            name: name.into(),
            base: None,
            properties: Vec::new(),
            discriminator: None,
            discriminator_value: None,
        }
    }

    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn property(self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.property_def(Property::new(name, value_type))
    }

    pub fn property_def(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Declare the discriminator of a hierarchy rooted at this type, together
    /// with the value for this type itself.
    pub fn discriminator(
        mut self,
        property: impl Into<String>,
        value_type: ValueType,
        value: impl Into<Value>,
    ) -> Self {
        self.discriminator = Some((Property::new(property, value_type), value.into()));
        self
    }

    /// Discriminator value of a type deriving from a discriminated base.
    pub fn discriminator_value(mut self, value: impl Into<Value>) -> Self {
        self.discriminator_value = Some(value.into());
        self
    }
}

/// A validated set of entity types.
#[derive(Debug, Default)]
pub struct Model {
    entity_types: Vec<Arc<EntityType>>,
    index: HashMap<String, usize>,
}

impl Model {
    pub fn builder() -> ModelBuilder {
        ModelBuilder::default()
    }

    pub fn entity_type(&self, name: &str) -> Option<&Arc<EntityType>> {
        self.index.get(name).map(|&i| &self.entity_types[i])
    }

    /// Entity types in declaration order.
    pub fn entity_types(&self) -> impl Iterator<Item = &Arc<EntityType>> {
        self.entity_types.iter()
    }

    /// Types assignable to `ty`: the type itself and all of its subtypes.
    pub fn derived_types<'a>(&'a self, ty: &'a EntityType) -> impl Iterator<Item = &'a Arc<EntityType>> {
        self.entity_types
            .iter()
            .filter(move |candidate| ty.is_assignable_from(candidate))
    }
}

#[derive(Debug, Default)]
pub struct ModelBuilder {
    entities: Vec<EntityTypeBuilder>,
}

impl ModelBuilder {
    pub fn entity(mut self, entity: EntityTypeBuilder) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn build(self) -> Result<Model, ModelError> {
        let mut declared: HashMap<&str, &EntityTypeBuilder> = HashMap::new();
        for entity in &self.entities {
            if declared.insert(entity.name.as_str(), entity).is_some() {
                return Err(ModelError::DuplicateEntityType(entity.name.clone()));
            }
        }

        let mut built: HashMap<String, Arc<EntityType>> = HashMap::new();
        let mut visiting: Vec<String> = Vec::new();
        for entity in &self.entities {
            build_entity(entity, &declared, &mut built, &mut visiting)?;
        }

        let mut model = Model::default();
        for entity in &self.entities {
            if let Some(ty) = built.remove(&entity.name) {
                model.index.insert(entity.name.clone(), model.entity_types.len());
                model.entity_types.push(ty);
            }
        }

        check_discriminator_values(&model.entity_types)?;

        debug!(entity_types = model.entity_types.len(), "built model");
        Ok(model)
    }
}

fn build_entity(
    entity: &EntityTypeBuilder,
    declared: &HashMap<&str, &EntityTypeBuilder>,
    built: &mut HashMap<String, Arc<EntityType>>,
    visiting: &mut Vec<String>,
) -> Result<Arc<EntityType>, ModelError> {
    if let Some(ty) = built.get(&entity.name) {
        return Ok(Arc::clone(ty));
    }
    if visiting.contains(&entity.name) {
        return Err(ModelError::InheritanceCycle(entity.name.clone()));
    }
    visiting.push(entity.name.clone());

    let base = match &entity.base {
        Some(base_name) => {
            let base = declared
                .get(base_name.as_str())
                .ok_or_else(|| ModelError::UnknownBaseType {
                    entity: entity.name.clone(),
                    base: base_name.clone(),
                })?;
            Some(build_entity(base, declared, built, visiting)?)
        }
        None => None,
    };

    let mut properties: Vec<Arc<Property>> = Vec::new();
    let mut declare = |property: Property| -> Result<Arc<Property>, ModelError> {
        let inherited = base.as_ref().is_some_and(|b| b.property(property.name()).is_some());
        if inherited || properties.iter().any(|p| p.name() == property.name()) {
            return Err(ModelError::DuplicateProperty {
                entity: entity.name.clone(),
                property: property.name().to_string(),
            });
        }
        let property = Arc::new(property);
        properties.push(Arc::clone(&property));
        Ok(property)
    };

    for property in &entity.properties {
        declare(property.clone())?;
    }

    let inherited_discriminator = base.as_ref().and_then(|b| b.discriminator_property.clone());
    let (discriminator_property, discriminator_value) = match (&entity.discriminator, inherited_discriminator) {
        (Some(_), Some(_)) => {
            let root = base.as_ref().map(|b| b.root().name.clone()).unwrap_or_default();
            return Err(ModelError::ConflictingDiscriminator {
                entity: entity.name.clone(),
                base: root,
            });
        }
        (Some((property, value)), None) => (Some(declare(property.clone())?), Some(value.clone())),
        (None, inherited) => (inherited, entity.discriminator_value.clone()),
    };

    // Stored in the property's declared representation, so values compare
    // equal exactly when documents would.
    let discriminator_value = match (&discriminator_property, discriminator_value) {
        (Some(property), Some(value)) => {
            if !value.conforms_to(property.value_type()) {
                return Err(ModelError::DiscriminatorValueType {
                    entity: entity.name.clone(),
                    property: property.name().to_string(),
                    expected: property.value_type(),
                    actual: value.type_name(),
                });
            }
            Some(value.widen_to(property.value_type()))
        }
        (Some(_), None) => return Err(ModelError::MissingDiscriminatorValue(entity.name.clone())),
        (None, Some(_)) => return Err(ModelError::DiscriminatorWithoutProperty(entity.name.clone())),
        (None, None) => None,
    };

    let ty = Arc::new(EntityType {
        name: entity.name.clone(),
        base,
        properties,
        discriminator_property,
        discriminator_value,
    });

    visiting.pop();
    built.insert(entity.name.clone(), Arc::clone(&ty));
    Ok(ty)
}

fn check_discriminator_values(entity_types: &[Arc<EntityType>]) -> Result<(), ModelError> {
    for (i, first) in entity_types.iter().enumerate() {
        let Some(value) = first.discriminator_value() else {
            continue;
        };
        for second in &entity_types[i + 1..] {
            if second.root() == first.root() && second.discriminator_value() == Some(value) {
                return Err(ModelError::DuplicateDiscriminatorValue {
                    first: first.name.clone(),
                    second: second.name.clone(),
                });
            }
        }
    }
    Ok(())
}
