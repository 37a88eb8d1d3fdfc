pub mod ast;
pub mod cli;
pub mod evaluator;
pub mod generator;
pub mod model;
pub mod output;
pub mod value;

pub use ast::{
    BinOp, DEFAULT_ROOT_ALIAS, Expr, KeyAccess, PathExpr, Projection, QuerySource,
    QuerySourceReference, RootReference, SealedSelect, SelectExpression,
};
pub use evaluator::{EvalError, Evaluator};
pub use generator::{
    CosmosSqlGenerator, GenerateError, ParameterValues, SqlGenerator, SqlParameter, SqlQuery,
    debug_sql,
};
pub use model::{EntityType, EntityTypeBuilder, Model, ModelError, Property};
pub use output::{to_json, to_json_pretty};
pub use value::{Value, ValueType};
