use std::sync::Arc;

use crate::model::EntityType;

/// The full matched document, interpreted as an entity type and bound under
/// the alias of the source it projects from.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    entity_type: Arc<EntityType>,
    alias: String,
}

impl Projection {
    pub fn new(entity_type: Arc<EntityType>, alias: impl Into<String>) -> Self {
        Projection {
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
