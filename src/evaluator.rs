use std::cmp::Ordering;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, PathExpr, SelectExpression},
    generator::ParameterValues,
    value::Value,
};

/// In-memory evaluation of filter expressions against documents.
///
/// Follows document-store semantics: a missing field reads as `null`, an
/// ordering comparison between values that cannot be ordered is false rather
/// than an error, and only a boolean `true` selects a document.
pub struct Evaluator<'a> {
    parameters: &'a ParameterValues,
}

/// Errors that can occur during evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Type mismatch or invalid operation for the given type
    #[error("Type error: {0}")]
    TypeError(String),

    /// Reference to a parameter with no supplied value
    #[error("Unbound parameter: @{0}")]
    UnboundParameter(String),

    #[error("Division by zero")]
    DivisionByZero,
}

impl<'a> Evaluator<'a> {
    pub fn new(parameters: &'a ParameterValues) -> Self {
        Evaluator { parameters }
    }

    /// Whether `document` is selected by `select`.
    ///
    /// A select without a filter matches every document.
    pub fn matches(&self, select: &SelectExpression, document: &Value) -> Result<bool, EvalError> {
        match select.filter() {
            Some(filter) => Ok(self.eval(filter, document)?.as_bool()),
            None => Ok(true),
        }
    }

    /// Evaluate `expr` with the root bound to `document`.
    pub fn eval(&self, expr: &Expr, document: &Value) -> Result<Value, EvalError> {
        match expr {
            Expr::Path(path) => Ok(resolve_path(path, document).cloned().unwrap_or(Value::Null)),
            Expr::Constant { value, .. } => Ok(value.clone()),
            Expr::Parameter(name) => {
                let name = name.strip_prefix('@').unwrap_or(name);
                self.parameters
                    .get(name)
                    .cloned()
                    .ok_or_else(|| EvalError::UnboundParameter(name.to_string()))
            }
            Expr::Not(inner) => match self.eval(inner, document)? {
                Value::Boolean(b) => Ok(Value::Boolean(!b)),
                _ => Ok(Value::Null),
            },
            Expr::BinaryOp { op, left, right } => match op {
                BinOp::And => {
                    if !self.eval(left, document)?.as_bool() {
                        return Ok(Value::Boolean(false));
                    }
                    Ok(Value::Boolean(self.eval(right, document)?.as_bool()))
                }
                BinOp::Or => {
                    if self.eval(left, document)?.as_bool() {
                        return Ok(Value::Boolean(true));
                    }
                    Ok(Value::Boolean(self.eval(right, document)?.as_bool()))
                }
                BinOp::NullCoalesce => {
                    let left_val = self.eval(left, document)?;
                    if left_val == Value::Null {
                        self.eval(right, document)
                    } else {
                        Ok(left_val)
                    }
                }
                _ => {
                    let left_val = self.eval(left, document)?;
                    let right_val = self.eval(right, document)?;
                    apply_binop(*op, &left_val, &right_val)
                }
            },
        }
    }
}

/// Follow `path` into `document`. `None` when a step is missing or lands on
/// something other than an object.
fn resolve_path<'d>(path: &PathExpr, document: &'d Value) -> Option<&'d Value> {
    match path {
        PathExpr::Root(_) => Some(document),
        PathExpr::Key(access) => resolve_path(access.parent(), document)?.field(access.property().name()),
    }
}

fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Equal => Ok(Value::Boolean(values_equal(left, right))),
        BinOp::NotEqual => Ok(Value::Boolean(!values_equal(left, right))),
        BinOp::LessThan => Ok(Value::Boolean(compare(left, right) == Some(Ordering::Less))),
        BinOp::GreaterThan => Ok(Value::Boolean(compare(left, right) == Some(Ordering::Greater))),
        BinOp::LessEqual => Ok(Value::Boolean(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ))),
        BinOp::GreaterEqual => Ok(Value::Boolean(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ))),
        BinOp::Add => match (left, right) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            _ => arithmetic(op, left, right),
        },
        BinOp::Subtract | BinOp::Multiply | BinOp::Divide | BinOp::Modulo => arithmetic(op, left, right),
        BinOp::And | BinOp::Or | BinOp::NullCoalesce => {
            unreachable!("short-circuit operators handled in eval")
        }
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    if let Some((a, b)) = float_pair(left, right) {
        return a == b;
    }
    match (left.as_decimal(), right.as_decimal()) {
        (Some(a), Some(b)) => a == b,
        _ => left == right,
    }
}

/// Order two values of the same kind; numbers compare across representations.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    if let Some((a, b)) = float_pair(left, right) {
        return a.partial_cmp(&b);
    }
    if let (Some(a), Some(b)) = (left.as_decimal(), right.as_decimal()) {
        return Some(a.cmp(&b));
    }
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Both operands as `f64` when at least one of them is a float. Decimals
/// cannot hold the full float range.
fn float_pair(left: &Value, right: &Value) -> Option<(f64, f64)> {
    if !matches!(left, Value::Float(_)) && !matches!(right, Value::Float(_)) {
        return None;
    }
    Some((as_f64(left)?, as_f64(right)?))
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(n) => Some(*n as f64),
        Value::Float(n) => Some(*n),
        Value::Decimal(d) => d.to_f64(),
        _ => None,
    }
}

/// Integer-preserving arithmetic: integer operands stay integers when the
/// exact result is whole, mixed operands go through decimals.
fn arithmetic(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let verb = match op {
        BinOp::Add => "add",
        BinOp::Subtract => "subtract",
        BinOp::Multiply => "multiply",
        BinOp::Divide => "divide",
        _ => "compute modulo of",
    };
    let type_error = || {
        EvalError::TypeError(format!(
            "Cannot {} {} and {}",
            verb,
            left.type_name(),
            right.type_name()
        ))
    };

    if let (Value::Float(a), Value::Float(b)) = (left, right) {
        return Ok(Value::Float(match op {
            BinOp::Add => a + b,
            BinOp::Subtract => a - b,
            BinOp::Multiply => a * b,
            BinOp::Divide => a / b,
            _ => a % b,
        }));
    }

    let (a, b) = match (left.as_decimal(), right.as_decimal()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(type_error()),
    };
    if matches!(op, BinOp::Divide | BinOp::Modulo) && b.is_zero() {
        return Err(EvalError::DivisionByZero);
    }

    let result = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Subtract => a.checked_sub(b),
        BinOp::Multiply => a.checked_mul(b),
        BinOp::Divide => a.checked_div(b),
        _ => a.checked_rem(b),
    }
    .ok_or_else(|| EvalError::TypeError(format!("Numeric overflow: cannot {} {} and {}", verb, a, b)))?;

    Ok(number_like(left, right, result))
}

fn number_like(left: &Value, right: &Value, result: Decimal) -> Value {
    if matches!(left, Value::Decimal(_)) || matches!(right, Value::Decimal(_)) {
        return Value::Decimal(result);
    }
    if result.is_integer()
        && let Some(r) = result.to_i64()
    {
        return Value::Integer(r);
    }
    result.to_f64().map(Value::Float).unwrap_or(Value::Null)
}
