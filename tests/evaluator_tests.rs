use docql::model::{EntityTypeBuilder, Model};
use docql::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

fn model() -> Model {
    Model::builder()
        .entity(
            EntityTypeBuilder::new("Animal")
                .property("Name", ValueType::String)
                .property("Age", ValueType::Integer)
                .discriminator("Discriminator", ValueType::String, "Animal"),
        )
        .entity(EntityTypeBuilder::new("Dog").base("Animal").discriminator_value("Dog"))
        .entity(EntityTypeBuilder::new("Cat").base("Animal").discriminator_value("Cat"))
        .build()
        .unwrap()
}

fn json_object(pairs: Vec<(&str, Value)>) -> Value {
    let mut map = HashMap::new();
    for (k, v) in pairs {
        map.insert(k.to_string(), v);
    }
    Value::Object(map)
}

fn animal(kind: &str, name: &str, age: i64) -> Value {
    json_object(vec![
        ("Discriminator", Value::String(kind.into())),
        ("Name", Value::String(name.into())),
        ("Age", Value::Integer(age)),
    ])
}

fn select_for(model: &Model, name: &str) -> (SelectExpression, QuerySourceReference) {
    let source = QuerySource::new();
    let ty = model.entity_type(name).unwrap().clone();
    (SelectExpression::new(ty, source), QuerySourceReference::new(source))
}

fn field(select: &SelectExpression, reference: &QuerySourceReference, name: &str) -> Expr {
    let properties = select.entity_type().resolve_path(&[name]).unwrap();
    select.bind_property_path(Some(reference), &properties).unwrap().into()
}

fn eval(expr: &Expr, doc: &Value) -> Result<Value, EvalError> {
    Evaluator::new(&ParameterValues::new()).eval(expr, doc)
}

fn arith(op: BinOp, left: Value, right: Value) -> Result<Value, EvalError> {
    eval(&Expr::binary(op, Expr::constant(left), Expr::constant(right)), &Value::Null)
}

// ============================================================================
// Discriminator semantics
// ============================================================================

#[test]
fn test_discriminator_matches_only_its_type() {
    let model = model();
    let (select, _) = select_for(&model, "Dog");
    let params = ParameterValues::new();
    let evaluator = Evaluator::new(&params);

    assert!(evaluator.matches(&select, &animal("Dog", "Rex", 3)).unwrap());
    assert!(!evaluator.matches(&select, &animal("Cat", "Tom", 3)).unwrap());
    assert!(!evaluator.matches(&select, &animal("Animal", "Generic", 3)).unwrap());
    assert!(!evaluator.matches(&select, &json_object(vec![("Name", Value::from("Rex"))])).unwrap());
}

#[test]
fn test_select_without_filter_matches_everything() {
    let model = Model::builder()
        .entity(EntityTypeBuilder::new("Note").property("Text", ValueType::String))
        .build()
        .unwrap();
    let (select, _) = select_for(&model, "Note");
    let params = ParameterValues::new();
    let evaluator = Evaluator::new(&params);

    assert!(evaluator.matches(&select, &Value::Null).unwrap());
    assert!(evaluator.matches(&select, &animal("Cat", "Tom", 1)).unwrap());
}

#[test]
fn test_added_predicates_narrow_results() {
    let model = model();
    let (mut select, reference) = select_for(&model, "Dog");
    let documents = vec![
        animal("Dog", "Rex", 2),
        animal("Dog", "Fido", 7),
        animal("Cat", "Tom", 9),
    ];
    let params = ParameterValues::new();
    let evaluator = Evaluator::new(&params);
    let count = |select: &SelectExpression| {
        documents
            .iter()
            .filter(|doc| evaluator.matches(select, doc).unwrap())
            .count()
    };

    assert_eq!(count(&select), 2);
    let age = field(&select, &reference, "Age");
    select.add_to_filter(Expr::binary(BinOp::GreaterThan, age, Expr::constant(5i64)));
    assert_eq!(count(&select), 1);
}

// ============================================================================
// Paths and parameters
// ============================================================================

#[test]
fn test_missing_field_reads_as_null() {
    let model = model();
    let (select, reference) = select_for(&model, "Dog");
    let name = field(&select, &reference, "Name");

    assert_eq!(eval(&name, &json_object(vec![])).unwrap(), Value::Null);
    assert_eq!(eval(&name, &Value::Integer(1)).unwrap(), Value::Null);
}

#[test]
fn test_root_path_is_document() {
    let model = model();
    let (select, _) = select_for(&model, "Dog");
    let doc = animal("Dog", "Rex", 3);

    let root: Expr = select.from_expression().clone().into();
    assert_eq!(eval(&root, &doc).unwrap(), doc);
}

#[test]
fn test_parameter_values() {
    let model = model();
    let (select, reference) = select_for(&model, "Dog");
    let age = field(&select, &reference, "Age");
    let predicate = Expr::binary(BinOp::GreaterEqual, age, Expr::parameter("minAge"));

    let values: ParameterValues = [("minAge".to_string(), Value::Integer(3))].into_iter().collect();
    let evaluator = Evaluator::new(&values);
    assert_eq!(evaluator.eval(&predicate, &animal("Dog", "Rex", 3)).unwrap(), Value::Boolean(true));
    assert_eq!(evaluator.eval(&predicate, &animal("Dog", "Rex", 2)).unwrap(), Value::Boolean(false));
}

#[test]
fn test_unbound_parameter() {
    let result = eval(&Expr::parameter("@missing"), &Value::Null);
    assert_eq!(result, Err(EvalError::UnboundParameter("missing".to_string())));
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_numbers_compare_across_representations() {
    let decimal = Value::Decimal(Decimal::from_str("3.0").unwrap());

    assert_eq!(arith(BinOp::Equal, Value::Integer(3), Value::Float(3.0)).unwrap(), Value::Boolean(true));
    assert_eq!(arith(BinOp::Equal, Value::Integer(3), decimal.clone()).unwrap(), Value::Boolean(true));
    assert_eq!(arith(BinOp::LessThan, Value::Float(2.5), Value::Integer(3)).unwrap(), Value::Boolean(true));
    assert_eq!(arith(BinOp::GreaterEqual, decimal, Value::Float(3.0)).unwrap(), Value::Boolean(true));
}

#[test]
fn test_floats_outside_decimal_range() {
    assert_eq!(arith(BinOp::Equal, Value::Float(1e-30), Value::Integer(0)).unwrap(), Value::Boolean(false));
    assert_eq!(arith(BinOp::LessThan, Value::Integer(5), Value::Float(1e30)).unwrap(), Value::Boolean(true));
    assert_eq!(arith(BinOp::GreaterThan, Value::Float(1e30), Value::Integer(5)).unwrap(), Value::Boolean(true));
    assert_eq!(arith(BinOp::NotEqual, Value::Float(1e-30), Value::Float(0.0)).unwrap(), Value::Boolean(true));
}

#[test]
fn test_widened_discriminator_matches_stored_numbers() {
    let model = Model::builder()
        .entity(EntityTypeBuilder::new("Shape").discriminator("Kind", ValueType::Float, 0.5))
        .entity(EntityTypeBuilder::new("Circle").base("Shape").discriminator_value(1i64))
        .entity(EntityTypeBuilder::new("Square").base("Shape").discriminator_value(2.0))
        .build()
        .unwrap();
    let (select, _) = select_for(&model, "Circle");
    let params = ParameterValues::new();
    let evaluator = Evaluator::new(&params);
    let shape = |kind: Value| json_object(vec![("Kind", kind)]);

    assert!(evaluator.matches(&select, &shape(Value::Integer(1))).unwrap());
    assert!(evaluator.matches(&select, &shape(Value::Float(1.0))).unwrap());
    assert!(!evaluator.matches(&select, &shape(Value::Float(2.0))).unwrap());
    assert!(!evaluator.matches(&select, &shape(Value::Float(0.5))).unwrap());
}

#[test]
fn test_incomparable_values_are_not_ordered() {
    assert_eq!(arith(BinOp::LessThan, Value::from("a"), Value::Integer(1)).unwrap(), Value::Boolean(false));
    assert_eq!(arith(BinOp::GreaterEqual, Value::Null, Value::Integer(1)).unwrap(), Value::Boolean(false));
    assert_eq!(arith(BinOp::NotEqual, Value::from("a"), Value::Integer(1)).unwrap(), Value::Boolean(true));
}

#[test]
fn test_string_ordering() {
    assert_eq!(arith(BinOp::LessThan, Value::from("apple"), Value::from("banana")).unwrap(), Value::Boolean(true));
}

#[test]
fn test_logical_operators_short_circuit() {
    let unbound = Expr::parameter("never");
    let false_and = Expr::and(Expr::constant(false), unbound.clone());
    let true_or = Expr::or(Expr::constant(true), unbound);

    assert_eq!(eval(&false_and, &Value::Null).unwrap(), Value::Boolean(false));
    assert_eq!(eval(&true_or, &Value::Null).unwrap(), Value::Boolean(true));
    assert_eq!(eval(&Expr::not(Expr::constant(false)), &Value::Null).unwrap(), Value::Boolean(true));
}

#[test]
fn test_only_true_selects() {
    let model = Model::builder()
        .entity(EntityTypeBuilder::new("Flag").property("On", ValueType::Boolean))
        .build()
        .unwrap();
    let (mut select, reference) = select_for(&model, "Flag");
    let on = field(&select, &reference, "On");
    select.add_to_filter(Expr::not(on));
    let params = ParameterValues::new();
    let evaluator = Evaluator::new(&params);

    assert!(evaluator.matches(&select, &json_object(vec![("On", Value::Boolean(false))])).unwrap());
    assert!(!evaluator.matches(&select, &json_object(vec![("On", Value::Boolean(true))])).unwrap());
    assert!(!evaluator.matches(&select, &json_object(vec![("On", Value::Integer(0))])).unwrap());
    assert!(!evaluator.matches(&select, &json_object(vec![])).unwrap());
}

#[test]
fn test_null_coalesce() {
    assert_eq!(arith(BinOp::NullCoalesce, Value::Null, Value::Integer(1)).unwrap(), Value::Integer(1));
    assert_eq!(arith(BinOp::NullCoalesce, Value::Integer(2), Value::Integer(1)).unwrap(), Value::Integer(2));
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_integer_arithmetic_preserves_integers() {
    assert_eq!(arith(BinOp::Add, Value::Integer(2), Value::Integer(3)).unwrap(), Value::Integer(5));
    assert_eq!(arith(BinOp::Divide, Value::Integer(6), Value::Integer(3)).unwrap(), Value::Integer(2));
    assert_eq!(arith(BinOp::Divide, Value::Integer(7), Value::Integer(2)).unwrap(), Value::Float(3.5));
    assert_eq!(arith(BinOp::Multiply, Value::Integer(4), Value::Float(0.5)).unwrap(), Value::Integer(2));
    assert_eq!(arith(BinOp::Modulo, Value::Integer(7), Value::Integer(4)).unwrap(), Value::Integer(3));
}

#[test]
fn test_decimal_arithmetic_stays_decimal() {
    let a = Value::Decimal(Decimal::from_str("0.1").unwrap());
    let b = Value::Decimal(Decimal::from_str("0.2").unwrap());

    assert_eq!(
        arith(BinOp::Add, a, b).unwrap(),
        Value::Decimal(Decimal::from_str("0.3").unwrap())
    );
}

#[test]
fn test_string_concatenation() {
    assert_eq!(arith(BinOp::Add, Value::from("Re"), Value::from("x")).unwrap(), Value::from("Rex"));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(arith(BinOp::Divide, Value::Integer(1), Value::Integer(0)), Err(EvalError::DivisionByZero));
    assert_eq!(arith(BinOp::Modulo, Value::Integer(1), Value::Integer(0)), Err(EvalError::DivisionByZero));
}

#[test]
fn test_arithmetic_type_error() {
    match arith(BinOp::Subtract, Value::from("a"), Value::Integer(1)) {
        Err(EvalError::TypeError(msg)) => assert!(msg.contains("string")),
        other => panic!("expected type error, got {:?}", other),
    }
}
