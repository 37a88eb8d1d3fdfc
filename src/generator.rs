//! Query text generation.
//!
//! A [`SqlGenerator`] walks a finished [`SelectExpression`] and produces the
//! query text together with the parameter values it references.
//! [`CosmosSqlGenerator`] emits the SQL dialect of JSON document containers:
//!
//! ```text
//! SELECT c
//! FROM root c
//! WHERE ((c["Discriminator"] = "Dog") AND (c["Age"] > @minAge))
//! ```

use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::{
    ast::{Expr, PathExpr, SelectExpression},
    output::{quote, to_json},
    value::Value,
};

static PARAMETER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid parameter name pattern"));

/// Parameter values supplied by the caller, by name without the `@` prefix.
pub type ParameterValues = HashMap<String, Value>;

/// A parameter bound into a generated query.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlParameter {
    /// Name including the `@` prefix, as it appears in the query text
    pub name: String,
    pub value: Value,
}

/// Generated query text and its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub query: String,
    pub parameters: Vec<SqlParameter>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerateError {
    #[error("invalid parameter name '{0}'")]
    InvalidParameterName(String),

    #[error("constant {0} has no representation in query text")]
    NonFiniteNumber(f64),
}

/// Turns a finished select into query text.
///
/// Implementations only read the tree.
pub trait SqlGenerator {
    fn generate(
        &self,
        select: &SelectExpression,
        parameter_values: &ParameterValues,
    ) -> Result<SqlQuery, GenerateError>;
}

/// Generator for the SQL dialect of JSON document containers.
#[derive(Debug, Default, Clone, Copy)]
pub struct CosmosSqlGenerator;

impl CosmosSqlGenerator {
    pub fn new() -> Self {
        CosmosSqlGenerator
    }
}

impl SqlGenerator for CosmosSqlGenerator {
    fn generate(
        &self,
        select: &SelectExpression,
        parameter_values: &ParameterValues,
    ) -> Result<SqlQuery, GenerateError> {
        let mut writer = SqlWriter {
            parameter_values,
            parameters: Vec::new(),
        };

        let mut query = format!(
            "SELECT {}\nFROM root {}",
            select.projection().alias(),
            select.root_reference().alias()
        );
        if let Some(filter) = select.filter() {
            query.push_str("\nWHERE ");
            query.push_str(&writer.expr(filter)?);
        }

        debug!(
            entity_type = select.entity_type().name(),
            parameters = writer.parameters.len(),
            "generated query"
        );
        Ok(SqlQuery {
            query,
            parameters: writer.parameters,
        })
    }
}

struct SqlWriter<'a> {
    parameter_values: &'a ParameterValues,
    parameters: Vec<SqlParameter>,
}

impl SqlWriter<'_> {
    fn expr(&mut self, expr: &Expr) -> Result<String, GenerateError> {
        match expr {
            Expr::Path(path) => Ok(path_sql(path)),
            Expr::Constant { value, .. } => constant_sql(value),
            Expr::Parameter(name) => self.parameter(name),
            Expr::BinaryOp { op, left, right } => {
                let left = self.expr(left)?;
                let right = self.expr(right)?;
                Ok(format!("({} {} {})", left, op.as_sql(), right))
            }
            Expr::Not(inner) => Ok(format!("NOT ({})", self.expr(inner)?)),
        }
    }

    fn parameter(&mut self, name: &str) -> Result<String, GenerateError> {
        let name = name.strip_prefix('@').unwrap_or(name);
        if !PARAMETER_NAME.is_match(name) {
            return Err(GenerateError::InvalidParameterName(name.to_string()));
        }

        let sql_name = format!("@{}", name);
        let already_bound = self.parameters.iter().any(|p| p.name == sql_name);
        if !already_bound && let Some(value) = self.parameter_values.get(name) {
            self.parameters.push(SqlParameter {
                name: sql_name.clone(),
                value: value.clone(),
            });
        }
        Ok(sql_name)
    }
}

fn path_sql(path: &PathExpr) -> String {
    match path {
        PathExpr::Root(root) => root.alias().to_string(),
        PathExpr::Key(access) => format!(
            "{}[{}]",
            path_sql(access.parent()),
            quote(access.property().name())
        ),
    }
}

fn constant_sql(value: &Value) -> Result<String, GenerateError> {
    check_finite(value)?;
    Ok(to_json(value))
}

fn check_finite(value: &Value) -> Result<(), GenerateError> {
    match value {
        Value::Float(n) if !n.is_finite() => Err(GenerateError::NonFiniteNumber(*n)),
        Value::Array(items) => items.iter().try_for_each(check_finite),
        Value::Object(fields) => fields.values().try_for_each(check_finite),
        _ => Ok(()),
    }
}

/// Render `select` for diagnostics, with no parameter values bound.
///
/// Not meant for execution; production callers invoke a generator with their
/// own parameter values.
pub fn debug_sql(select: &SelectExpression) -> String {
    match CosmosSqlGenerator::new().generate(select, &ParameterValues::new()) {
        Ok(sql) => sql.query,
        Err(e) => format!("<invalid query: {}>", e),
    }
}
