use crate::common::pets_schema;
use crate::common::validation_errors;

#[test]
fn fragment_cycles() {
    let schema = pets_schema();
    let query = r#"
        { dog { ...a } }

        fragment a on Dog { name ...b }
        fragment b on Dog { barks ...a }
    "#;
    assert_eq!(
        validation_errors(&schema, query),
        [
            "`a` fragment cannot reference itself",
            "`b` fragment cannot reference itself",
        ]
    );

    let query = r#"
        { dog { ...selfReferencing } }

        fragment selfReferencing on Dog { owner { pets { ...selfReferencing } } }
    "#;
    assert_eq!(
        validation_errors(&schema, query),
        ["`selfReferencing` fragment cannot reference itself"]
    );
}

#[test]
fn unused_fragment() {
    let schema = pets_schema();
    let query = r#"
        { dog { name } }

        fragment unused on Dog { name }
    "#;
    assert_eq!(
        validation_errors(&schema, query),
        ["fragment `unused` must be used in an operation"]
    );

    // Used through another fragment
    let query = r#"
        { dog { ...outer } }

        fragment outer on Dog { ...inner }
        fragment inner on Dog { name }
    "#;
    assert_eq!(validation_errors(&schema, query), Vec::<String>::new());
}

#[test]
fn undefined_fragment() {
    let schema = pets_schema();
    assert_eq!(
        validation_errors(&schema, "{ dog { ...missing } }"),
        ["cannot find fragment `missing` in this document"]
    );
}

#[test]
fn impossible_spreads() {
    let schema = pets_schema();
    assert_eq!(
        validation_errors(&schema, "{ dog { ... on Cat { meows } } }"),
        ["inline fragment with type condition `Cat` cannot be applied to `Dog`"]
    );

    let query = r#"
        { dog { ...catFields } }

        fragment catFields on Cat { meows }
    "#;
    assert_eq!(
        validation_errors(&schema, query),
        ["fragment `catFields` with type condition `Cat` cannot be applied to `Dog`"]
    );

    // Abstract types overlap with their possible types
    let query = r#"
        {
          pet { ... on CatOrDog { __typename } }
          catOrDog { ... on Pet { name } }
        }
    "#;
    assert_eq!(validation_errors(&schema, query), Vec::<String>::new());
}

#[test]
fn invalid_type_conditions() {
    let schema = pets_schema();
    let query = r#"
        { dog { ...onScalar } }

        fragment onScalar on String { length }
    "#;
    assert_eq!(
        validation_errors(&schema, query),
        ["fragments can only be applied to object, interface, or union types, `String` is a scalar type"]
    );
    assert_eq!(
        validation_errors(&schema, "{ dog { ... on Unicorn { horn } } }"),
        ["cannot find type `Unicorn` in the schema"]
    );
}
