use docql::model::{EntityTypeBuilder, Model, Property};
use docql::*;
use std::sync::Arc;

fn dog_model() -> Model {
    Model::builder()
        .entity(
            EntityTypeBuilder::new("Animal")
                .property("Name", ValueType::String)
                .property_def(Property::object(
                    "Owner",
                    vec![
                        Property::new("Name", ValueType::String),
                        Property::new("City", ValueType::String),
                    ],
                ))
                .discriminator("Discriminator", ValueType::String, "Animal"),
        )
        .entity(EntityTypeBuilder::new("Dog").base("Animal").discriminator_value("Dog"))
        .build()
        .unwrap()
}

fn dog_select(model: &Model) -> (SelectExpression, QuerySourceReference) {
    let source = QuerySource::new();
    let dog = model.entity_type("Dog").unwrap().clone();
    (SelectExpression::new(dog, source), QuerySourceReference::new(source))
}

fn path(model: &Model, names: &[&str]) -> Vec<Arc<Property>> {
    model.entity_type("Dog").unwrap().resolve_path(names).unwrap()
}

// ============================================================================
// Non-matching references
// ============================================================================

#[test]
fn test_absent_reference_binds_nothing() {
    let model = dog_model();
    let (select, _) = dog_select(&model);

    assert_eq!(select.bind_property_path(None, &path(&model, &["Name"])), None);
    assert_eq!(select.bind_property_path(None, &[]), None);
}

#[test]
fn test_reference_to_other_source_binds_nothing() {
    let model = dog_model();
    let (select, _) = dog_select(&model);
    let other = QuerySourceReference::new(QuerySource::new());

    assert_eq!(select.bind_property_path(Some(&other), &path(&model, &["Name"])), None);
    assert_eq!(select.bind_property_path(Some(&other), &path(&model, &["Owner", "City"])), None);
    assert_eq!(select.bind_property_path(Some(&other), &[]), None);
}

#[test]
fn test_references_route_to_their_own_select() {
    let model = dog_model();
    let (first, first_ref) = dog_select(&model);
    let (second, second_ref) = dog_select(&model);
    let name = path(&model, &["Name"]);

    assert!(first.bind_property_path(Some(&first_ref), &name).is_some());
    assert!(first.bind_property_path(Some(&second_ref), &name).is_none());
    assert!(second.bind_property_path(Some(&second_ref), &name).is_some());
    assert!(second.bind_property_path(Some(&first_ref), &name).is_none());
}

// ============================================================================
// Path construction
// ============================================================================

#[test]
fn test_empty_path_is_root() {
    let model = dog_model();
    let (select, reference) = dog_select(&model);

    let bound = select.bind_property_path(Some(&reference), &[]).unwrap();
    assert_eq!(&bound, select.from_expression());
}

#[test]
fn test_single_property() {
    let model = dog_model();
    let (select, reference) = dog_select(&model);
    let name = path(&model, &["Name"]);

    let bound = select.bind_property_path(Some(&reference), &name).unwrap();
    assert_eq!(bound, PathExpr::key(name[0].clone(), select.from_expression().clone()));

    let sql = debug_sql(&{
        let mut s = select.clone();
        s.add_to_filter(Expr::eq(bound.into(), Expr::constant("Rex")));
        s
    });
    assert!(sql.ends_with("(c[\"Name\"] = \"Rex\"))"));
}

#[test]
fn test_chain_follows_input_order() {
    let model = dog_model();
    let (select, reference) = dog_select(&model);
    let owner_city = path(&model, &["Owner", "City"]);

    let bound = select.bind_property_path(Some(&reference), &owner_city).unwrap();

    let inner = PathExpr::key(owner_city[0].clone(), select.from_expression().clone());
    let expected = PathExpr::key(owner_city[1].clone(), inner);
    assert_eq!(bound, expected);
    assert_eq!(bound.property_names(), vec!["Owner", "City"]);
    assert_eq!(bound.root(), select.root_reference());
}

#[test]
fn test_outermost_node_is_last_property() {
    let model = dog_model();
    let (select, reference) = dog_select(&model);
    let owner_name = path(&model, &["Owner", "Name"]);

    match select.bind_property_path(Some(&reference), &owner_name) {
        Some(PathExpr::Key(access)) => {
            assert_eq!(access.property().name(), "Name");
            match access.parent() {
                PathExpr::Key(parent) => {
                    assert_eq!(parent.property().name(), "Owner");
                    assert!(matches!(parent.parent(), PathExpr::Root(_)));
                }
                other => panic!("expected key access, got {:?}", other),
            }
        }
        other => panic!("expected key access, got {:?}", other),
    }
}

#[test]
fn test_binding_is_repeatable_and_pure() {
    let model = dog_model();
    let (select, reference) = dog_select(&model);
    let owner_city = path(&model, &["Owner", "City"]);
    let before = select.clone();

    let first = select.bind_property_path(Some(&reference), &owner_city);
    let second = select.bind_property_path(Some(&reference), &owner_city);

    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(select, before);
}

#[test]
fn test_binding_after_filter_changes() {
    let model = dog_model();
    let (mut select, reference) = dog_select(&model);
    let name = path(&model, &["Name"]);
    let before = select.bind_property_path(Some(&reference), &name);

    select.add_to_filter(Expr::constant(true));

    assert_eq!(select.bind_property_path(Some(&reference), &name), before);
}
