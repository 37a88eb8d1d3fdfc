use std::{
    ops::Deref,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use tracing::{debug, trace};

use crate::{
    ast::{DEFAULT_ROOT_ALIAS, Expr, PathExpr, Projection, RootReference},
    model::{EntityType, Property},
};

static NEXT_QUERY_SOURCE: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one logical query source.
///
/// Two handles are equal only if one was copied from the other; handles
/// created independently never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuerySource(u64);

impl QuerySource {
    pub fn new() -> Self {
        QuerySource(NEXT_QUERY_SOURCE.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for QuerySource {
    fn default() -> Self {
        Self::new()
    }
}

/// A front-end reference to the items of a query source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySourceReference {
    source: QuerySource,
}

impl QuerySourceReference {
    pub fn new(source: QuerySource) -> Self {
        QuerySourceReference { source }
    }

    pub fn referenced_source(&self) -> QuerySource {
        self.source
    }
}

/// Select from one source, with a filter and a projection.
///
/// Built once per query source. The projection and the root reference are
/// fixed at construction; the filter changes only through
/// [`add_to_filter`](Self::add_to_filter), which conjoins.
///
/// # Examples
///
/// ```
/// use docql::model::{EntityTypeBuilder, Model};
/// use docql::{debug_sql, QuerySource, QuerySourceReference, SelectExpression, ValueType};
///
/// let model = Model::builder()
///     .entity(
///         EntityTypeBuilder::new("Animal")
///             .property("Name", ValueType::String)
///             .discriminator("Discriminator", ValueType::String, "Animal"),
///     )
///     .entity(EntityTypeBuilder::new("Dog").base("Animal").discriminator_value("Dog"))
///     .build()
///     .unwrap();
///
/// let dog = model.entity_type("Dog").unwrap();
/// let source = QuerySource::new();
/// let select = SelectExpression::new(dog.clone(), source);
///
/// let name = dog.resolve_path(&["Name"]).unwrap();
/// let path = select.bind_property_path(Some(&QuerySourceReference::new(source)), &name);
/// assert!(path.is_some());
///
/// assert_eq!(
///     debug_sql(&select),
///     "SELECT c\nFROM root c\nWHERE (c[\"Discriminator\"] = \"Dog\")"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SelectExpression {
    projection: Projection,
    from: PathExpr,
    filter: Option<Expr>,
    entity_type: Arc<EntityType>,
    source: QuerySource,
}

impl SelectExpression {
    /// Select every document of `entity_type` for `source`.
    ///
    /// The initial filter is the discriminator predicate of `entity_type`, or
    /// no filter when the type is not part of a discriminated hierarchy.
    pub fn new(entity_type: Arc<EntityType>, source: QuerySource) -> Self {
        let projection = Projection::new(Arc::clone(&entity_type), DEFAULT_ROOT_ALIAS);
        let from = PathExpr::Root(RootReference::new(Arc::clone(&entity_type), DEFAULT_ROOT_ALIAS));

        let mut select = SelectExpression {
            projection,
            from,
            filter: None,
            entity_type,
            source,
        };
        select.filter = select.discriminator_predicate(&select.entity_type);

        debug!(
            entity_type = select.entity_type.name(),
            ?source,
            discriminated = select.filter.is_some(),
            "created select expression"
        );
        select
    }

    /// Equality test on the stored discriminator that narrows results to
    /// documents of exactly `candidate`.
    ///
    /// Returns `None` when `candidate` is neither this select's entity type
    /// nor one of its subtypes, or when it has no discriminator.
    pub fn discriminator_predicate(&self, candidate: &EntityType) -> Option<Expr> {
        if !self.entity_type.is_assignable_from(candidate) {
            trace!(
                entity_type = self.entity_type.name(),
                candidate = candidate.name(),
                "candidate outside hierarchy branch"
            );
            return None;
        }

        let property = candidate.discriminator_property()?;
        let value = candidate.discriminator_value()?;

        Some(Expr::eq(
            Expr::Path(PathExpr::key(Arc::clone(property), self.from.clone())),
            Expr::typed_constant(value.clone(), property),
        ))
    }

    /// Turn a property access on `reference` into a key-access chain rooted
    /// at this select's root.
    ///
    /// Returns `None` when `reference` is absent or points at another query
    /// source. An empty `properties` list yields the root itself.
    pub fn bind_property_path(
        &self,
        reference: Option<&QuerySourceReference>,
        properties: &[Arc<Property>],
    ) -> Option<PathExpr> {
        let reference = reference?;
        if reference.referenced_source() != self.source {
            trace!(
                expected = ?self.source,
                actual = ?reference.referenced_source(),
                "reference belongs to another query source"
            );
            return None;
        }

        Some(
            properties
                .iter()
                .fold(self.from.clone(), |current, property| {
                    PathExpr::key(Arc::clone(property), current)
                }),
        )
    }

    /// Narrow the filter by conjunction with `predicate`.
    pub fn add_to_filter(&mut self, predicate: Expr) {
        self.filter = Some(match self.filter.take() {
            Some(existing) => Expr::and(existing, predicate),
            None => predicate,
        });
        debug!(entity_type = self.entity_type.name(), "added predicate to filter");
    }

    /// Close the build phase.
    pub fn seal(self) -> SealedSelect {
        SealedSelect(Arc::new(self))
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn from_expression(&self) -> &PathExpr {
        &self.from
    }

    pub fn root_reference(&self) -> &RootReference {
        self.from.root()
    }

    pub fn filter(&self) -> Option<&Expr> {
        self.filter.as_ref()
    }

    pub fn entity_type(&self) -> &Arc<EntityType> {
        &self.entity_type
    }

    pub fn query_source(&self) -> QuerySource {
        self.source
    }
}

/// A finished select, shared read-only between consumers.
#[derive(Debug, Clone)]
pub struct SealedSelect(Arc<SelectExpression>);

impl Deref for SealedSelect {
    type Target = SelectExpression;

    fn deref(&self) -> &SelectExpression {
        &self.0
    }
}
