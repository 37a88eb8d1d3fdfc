use crate::{
    ast::{BinOp, PathExpr},
    model::Property,
    value::{Value, ValueType},
};

/// Predicate and scalar expression tree used for filters.
///
/// Front-ends build these from the paths returned by property binding and
/// hand them to [`SelectExpression::add_to_filter`](crate::SelectExpression::add_to_filter).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Path into the document
    ///
    /// # Example
    /// ```text
    /// c["Name"]
    /// ```
    Path(PathExpr),

    /// Literal constant, typed as the property it is compared against.
    ///
    /// `ty` is `None` only for `null` constants.
    ///
    /// # Example
    /// ```text
    /// "Dog"
    /// ```
    Constant { value: Value, ty: Option<ValueType> },

    /// Named parameter, bound by the generator (`@name`)
    Parameter(String),

    /// Binary operation (arithmetic, comparison, logical)
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Logical negation
    Not(Box<Expr>),
}

impl Expr {
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::binary(BinOp::And, left, right)
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::binary(BinOp::Or, left, right)
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Expr::binary(BinOp::Equal, left, right)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    /// A constant typed after its own value.
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = value.natural_type();
        Expr::Constant { value, ty }
    }

    /// A constant typed as `property` declares it.
    pub fn typed_constant(value: impl Into<Value>, property: &Property) -> Self {
        Expr::Constant {
            value: value.into(),
            ty: Some(property.value_type()),
        }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Expr::Parameter(name.into())
    }

    /// Flatten nested `AND` nodes into their operands, left to right.
    pub fn conjuncts(&self) -> Vec<&Expr> {
        match self {
            Expr::BinaryOp {
                op: BinOp::And,
                left,
                right,
            } => {
                let mut parts = left.conjuncts();
                parts.extend(right.conjuncts());
                parts
            }
            other => vec![other],
        }
    }
}

impl From<PathExpr> for Expr {
    fn from(path: PathExpr) -> Self {
        Expr::Path(path)
    }
}
