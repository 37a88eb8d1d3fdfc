use std::sync::Arc;

use crate::model::{EntityType, Property};

/// Alias the document root is bound under (`c`, for "container").
pub const DEFAULT_ROOT_ALIAS: &str = "c";

/// A step-wise reference into a document.
///
/// The set of path nodes is closed: a path is either the document root or a
/// key access stepping from another path.
///
/// # Examples
/// ```text
/// c                   // Root
/// c["Name"]           // Key(Name, Root)
/// c["Owner"]["City"]  // Key(City, Key(Owner, Root))
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum PathExpr {
    /// Reference to the query's document root
    Root(RootReference),

    /// Property access on a parent path
    Key(KeyAccess),
}

impl PathExpr {
    /// Wrap `parent` in a key access for `property`.
    pub fn key(property: Arc<Property>, parent: PathExpr) -> Self {
        PathExpr::Key(KeyAccess {
            property,
            parent: Box::new(parent),
        })
    }

    /// The root reference this path starts from.
    pub fn root(&self) -> &RootReference {
        let mut current = self;
        loop {
            match current {
                PathExpr::Root(root) => return root,
                PathExpr::Key(access) => current = &access.parent,
            }
        }
    }

    /// Property names from the root outwards.
    pub fn property_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = self;
        while let PathExpr::Key(access) = current {
            names.push(access.property.name());
            current = &access.parent;
        }
        names.reverse();
        names
    }
}

/// The document root, typed as an entity type and bound under an alias.
#[derive(Debug, Clone, PartialEq)]
pub struct RootReference {
    entity_type: Arc<EntityType>,
    alias: String,
}

impl RootReference {
    pub fn new(entity_type: Arc<EntityType>, alias: impl Into<String>) -> Self {
        RootReference {
            entity_type,
            alias: alias.into(),
        }
    }

    pub fn entity_type(&self) -> &Arc<EntityType> {
        &self.entity_type
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }
}

/// A single property step from a parent path.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyAccess {
    property: Arc<Property>,
    parent: Box<PathExpr>,
}

impl KeyAccess {
    pub fn property(&self) -> &Arc<Property> {
        &self.property
    }

    pub fn parent(&self) -> &PathExpr {
        &self.parent
    }
}
