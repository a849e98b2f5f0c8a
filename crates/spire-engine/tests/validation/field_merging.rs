use crate::common::pets_schema;
use crate::common::validation_errors;

#[test]
fn identical_fields_merge() {
    let schema = pets_schema();
    let query = r#"
        {
          a: foo(x: 1)
          a: foo(x: 1)
          dog { name }
          dog { name barks }
        }
    "#;
    assert_eq!(validation_errors(&schema, query), Vec::<String>::new());
}

#[test]
fn different_arguments_conflict() {
    let schema = pets_schema();
    assert_eq!(
        validation_errors(&schema, "{ a: foo(x: 1) a: foo(x: 2) }"),
        ["fields conflict on `a`: `foo(x: 1)` and `foo(x: 2)` are different"]
    );
    assert_eq!(
        validation_errors(&schema, "{ a: foo(x: 1) a: foo }"),
        ["fields conflict on `a`: `foo(x: 1)` and `foo` are different"]
    );
}

#[test]
fn different_fields_conflict() {
    let schema = pets_schema();
    assert_eq!(
        validation_errors(&schema, "{ dog { name: nickname name } }"),
        ["fields conflict on `name`: `nickname` and `name` are different"]
    );
}

#[test]
fn conflicts_through_fragments() {
    let schema = pets_schema();
    let query = r#"
        {
          dog {
            ...nameFragment
            name: barks
          }
        }

        fragment nameFragment on Dog { name }
    "#;
    assert_eq!(
        validation_errors(&schema, query),
        ["fields conflict on `name`: `name` and `barks` are different"]
    );
}

#[test]
fn conflicts_in_merged_sub_selections() {
    let schema = pets_schema();
    // Reported once, for the field selected second
    assert_eq!(
        validation_errors(&schema, "{ dog { x: name } dog { x: nickname } }"),
        ["fields conflict on `x`: `name` and `nickname` are different"]
    );
}

#[test]
fn disjoint_object_types_may_differ() {
    let schema = pets_schema();
    let query = r#"
        {
          catOrDog {
            ... on Dog { sound: barks }
            ... on Cat { sound: meows }
          }
        }
    "#;
    assert_eq!(validation_errors(&schema, query), Vec::<String>::new());

    // Response shapes are not compared either
    let query = r#"
        {
          catOrDog {
            ... on Dog { x: name }
            ... on Cat { x: meows }
          }
        }
    "#;
    assert_eq!(validation_errors(&schema, query), Vec::<String>::new());

    // `Pet` may be a `Dog` at runtime
    let query = r#"
        {
          pet {
            ... on Dog { sound: nickname }
            ... on Pet { sound: name }
          }
        }
    "#;
    assert_eq!(
        validation_errors(&schema, query),
        ["fields conflict on `sound`: `nickname` and `name` are different"]
    );
}
