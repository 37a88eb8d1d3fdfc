//! # Query tree
//!
//! The intermediate tree a document-store query is built in before it is
//! handed to a [`SqlGenerator`](crate::generator::SqlGenerator).
//!
//! - **[path]** - Paths into a document: the root reference and key accesses
//! - **[projection]** - The entity type and alias a result is read as
//! - **[operators]** - Binary operators (comparison, arithmetic, logical)
//! - **[expressions]** - Predicate and scalar expressions used in filters
//! - **[select]** - The select node tying one query source to all of the above
//!
//! ## Lifecycle
//!
//! A front-end creates one [`SelectExpression`] per query source. The select
//! starts out filtered by its entity type's discriminator, so documents of
//! sibling types stored in the same container never match:
//!
//! ```text
//! SELECT c
//! FROM root c
//! WHERE (c["Discriminator"] = "Dog")
//! ```
//!
//! The front-end then binds property accesses to paths with
//! [`SelectExpression::bind_property_path`] and narrows the result with
//! [`SelectExpression::add_to_filter`]. Once done it seals the select and
//! passes it to a generator.
pub mod expressions;
pub mod operators;
pub mod path;
pub mod projection;
pub mod select;

pub use expressions::Expr;
pub use operators::BinOp;
pub use path::{DEFAULT_ROOT_ALIAS, KeyAccess, PathExpr, RootReference};
pub use projection::Projection;
pub use select::{QuerySource, QuerySourceReference, SealedSelect, SelectExpression};
