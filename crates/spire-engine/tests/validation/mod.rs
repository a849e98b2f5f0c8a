mod directives;
mod field_merging;
mod fragments;
mod operations;

use crate::common::parse;
use crate::common::pets_schema;
use crate::common::validation_errors;
use expect_test::expect;
use spire_engine::name;
use spire_engine::validate_selection_set;
use unindent::unindent;

#[test]
fn valid_document() {
    let schema = pets_schema();
    let query = r#"
        query Pets {
          dog {
            name
            ...dogFields
            ... on Pet { name }
          }
          catOrDog {
            __typename
            ... on Cat { meows }
            ... on Dog { barks }
          }
          foo(x: 3)
        }

        fragment dogFields on Dog {
          barks
          doesKnowCommand(command: SIT)
        }
    "#;
    assert_eq!(validation_errors(&schema, query), Vec::<String>::new());
}

#[test]
fn undefined_fields() {
    let schema = pets_schema();
    assert_eq!(
        validation_errors(&schema, "{ doesNotExist }"),
        ["cannot query field `doesNotExist` on type `Query`"]
    );
    assert_eq!(
        validation_errors(&schema, "{ catOrDog { name } }"),
        ["cannot query field `name` on type `CatOrDog`"]
    );
    // Interfaces only have the fields they define
    assert_eq!(
        validation_errors(&schema, "{ pet { name barks } }"),
        ["cannot query field `barks` on type `Pet`"]
    );
}

#[test]
fn field_arguments() {
    let schema = pets_schema();
    assert_eq!(
        validation_errors(&schema, "{ dog { doesKnowCommand } }"),
        ["the required argument `Dog.doesKnowCommand(command:)` is not provided"]
    );
    assert_eq!(
        validation_errors(&schema, "{ foo(x: 1, x: 2) }"),
        ["the argument `x` is provided multiple times"]
    );
    assert_eq!(
        validation_errors(&schema, "{ foo(y: 1) }"),
        ["the argument `y` is not supported by `Query.foo`"]
    );
    assert_eq!(
        validation_errors(&schema, r#"{ foo(x: "one") }"#),
        ["invalid value for argument `Query.foo(x:)`: expected a value of type `Int`, found `\"one\"`"]
    );
    assert_eq!(
        validation_errors(&schema, "{ dog { doesKnowCommand(command: JUMP) } }"),
        ["invalid value for argument `Dog.doesKnowCommand(command:)`: \
          expected a value of type `DogCommand!`, found `JUMP`"]
    );
    assert_eq!(
        validation_errors(&schema, "{ foo(x: 3000000000) }"),
        ["invalid value for argument `Query.foo(x:)`: \
          Int cannot represent non 32-bit signed integer value: 3000000000"]
    );
}

#[test]
fn leaf_and_composite_selections() {
    let schema = pets_schema();
    assert_eq!(
        validation_errors(&schema, "{ hello { length } dog }"),
        [
            "field `hello` of type `String` is a leaf and cannot have a selection set",
            "field `dog` of type `Dog` must have a selection of subfields",
        ]
    );
    assert_eq!(
        validation_errors(&schema, "{ __typename(x: 1) }"),
        ["the argument `x` is not supported by `Query.__typename`"]
    );
}

#[test]
fn reports_every_error_in_document_order() {
    let schema = pets_schema();
    let query = r#"
        {
          dog { name owner }
          unknown
          foo(y: 1)
        }
    "#;
    assert_eq!(
        validation_errors(&schema, query),
        [
            "field `owner` of type `Human` must have a selection of subfields",
            "cannot query field `unknown` on type `Query`",
            "the argument `y` is not supported by `Query.foo`",
        ]
    );
}

#[test]
fn graphql_errors_have_locations() {
    let schema = pets_schema();
    let document = parse("{ doesNotExist }");
    let errors = spire_engine::validate(&schema, &document).unwrap_err();
    let json = serde_json::to_string_pretty(&errors.to_graphql_errors()).unwrap();
    expect![[r#"
        [
          {
            "message": "cannot query field `doesNotExist` on type `Query`",
            "locations": [
              {
                "line": 1,
                "column": 3
              }
            ]
          }
        ]"#]]
    .assert_eq(&json);
}

#[test]
fn locations_in_multiline_documents() {
    let schema = pets_schema();
    let query = unindent(
        "
        query {
          dog {
            nam
          }
          foo(x: true)
        }
        ",
    );
    let errors = spire_engine::validate(&schema, &parse(&query)).unwrap_err();
    let json = serde_json::to_string(&errors.to_graphql_errors()).unwrap();
    expect![[r#"[{"message":"cannot query field `nam` on type `Dog`","locations":[{"line":3,"column":5}]},{"message":"invalid value for argument `Query.foo(x:)`: expected a value of type `Int`, found `true`","locations":[{"line":5,"column":10}]}]"#]]
    .assert_eq(&json);
}

#[test]
fn pretty_diagnostics() {
    let schema = pets_schema();
    let document = parse("{ doesNotExist }");
    let errors = spire_engine::validate(&schema, &document).unwrap_err();
    let report = errors.to_string();
    assert!(report.contains("cannot query field `doesNotExist` on type `Query`"));
    assert!(report.contains("field `doesNotExist` selected here"));
}

#[test]
fn standalone_selection_set() {
    let schema = pets_schema();

    let document = parse("{ dog { ...f } } fragment f on Dog { name barks }");
    let selection_set = &document.fragments["f"].selection_set;
    validate_selection_set(&schema, &document, &name!("Dog"), selection_set).unwrap();

    let document = parse("{ name unknown }");
    let selection_set = &document.operations[0].selection_set;
    let errors = validate_selection_set(&schema, &document, &name!("Dog"), selection_set)
        .unwrap_err()
        .iter()
        .map(|error| error.to_string())
        .collect::<Vec<_>>();
    assert_eq!(errors, ["cannot query field `unknown` on type `Dog`"]);

    let errors = validate_selection_set(&schema, &document, &name!("Unicorn"), selection_set)
        .unwrap_err()
        .iter()
        .map(|error| error.to_string())
        .collect::<Vec<_>>();
    assert_eq!(errors, ["cannot find type `Unicorn` in the schema"]);
}
