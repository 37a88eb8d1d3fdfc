//! Build a sealed select from a query file.

use tracing::debug;

use super::{CliError, files::QueryFile};
use crate::{
    ast::{BinOp, Expr, QuerySource, QuerySourceReference, SealedSelect, SelectExpression},
    generator::ParameterValues,
    model::Model,
    value::{Value, from_json},
};

/// A finished select plus the parameter values its filters reference.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    pub select: SealedSelect,
    pub parameters: ParameterValues,
}

/// Act as a minimal front-end: one select for the queried entity, each
/// condition bound to a path and conjoined into the filter.
pub fn prepare(model: &Model, query: QueryFile) -> Result<PreparedQuery, CliError> {
    let entity = model
        .entity_type(&query.entity)
        .ok_or_else(|| CliError::UnknownEntity(query.entity.clone()))?;

    let source = QuerySource::new();
    let reference = QuerySourceReference::new(source);
    let mut select = SelectExpression::new(entity.clone(), source);

    for condition in query.filters {
        let op = BinOp::from_comparison(&condition.op)
            .ok_or_else(|| CliError::InvalidCondition(format!("unknown operator '{}'", condition.op)))?;

        let properties = entity.resolve_path(&condition.path)?;
        let path = select
            .bind_property_path(Some(&reference), &properties)
            .ok_or_else(|| CliError::InvalidCondition("path does not belong to this query".to_string()))?;

        let operand = match (condition.value, condition.parameter) {
            (Some(_), Some(_)) => {
                return Err(CliError::InvalidCondition(format!(
                    "condition on '{}' has both a value and a parameter",
                    condition.path.join(".")
                )));
            }
            (None, Some(name)) => Expr::parameter(name),
            (value, None) => {
                let value = value.map(from_json).unwrap_or(Value::Null);
                match properties.last() {
                    Some(property) if value != Value::Null => {
                        if !value.conforms_to(property.value_type()) {
                            return Err(CliError::InvalidCondition(format!(
                                "'{}' is declared as {} but compared with {}",
                                property.name(),
                                property.value_type(),
                                value.type_name()
                            )));
                        }
                        Expr::typed_constant(value, property)
                    }
                    _ => Expr::constant(value),
                }
            }
        };

        select.add_to_filter(Expr::binary(op, path.into(), operand));
    }

    let parameters: ParameterValues = query
        .parameters
        .into_iter()
        .map(|(name, value)| {
            let name = name.strip_prefix('@').map(str::to_string).unwrap_or(name);
            (name, from_json(value))
        })
        .collect();

    debug!(entity_type = entity.name(), parameters = parameters.len(), "prepared query");
    Ok(PreparedQuery {
        select: select.seal(),
        parameters,
    })
}
