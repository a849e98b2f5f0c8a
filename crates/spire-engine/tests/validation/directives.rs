use crate::common::pets_schema;
use crate::common::validation_errors;

#[test]
fn skip_and_include() {
    let schema = pets_schema();
    let query = r#"
        query {
          hello @skip(if: true)
          dog @include(if: false) { name }
          ... on Query @skip(if: false) { foo }
          ...queryFields @include(if: true)
        }

        fragment queryFields on Query { hello }
    "#;
    assert_eq!(validation_errors(&schema, query), Vec::<String>::new());
}

#[test]
fn unknown_directive() {
    let schema = pets_schema();
    assert_eq!(
        validation_errors(&schema, "{ hello @deprecated }"),
        ["cannot find directive `@deprecated` in this document"]
    );
}

#[test]
fn unsupported_locations() {
    let schema = pets_schema();
    assert_eq!(
        validation_errors(&schema, "query @skip(if: true) { hello }"),
        ["`@skip` directive is not supported for QUERY location"]
    );
    let query = r#"
        { dog { ...f } }

        fragment f on Dog @include(if: true) { name }
    "#;
    assert_eq!(
        validation_errors(&schema, query),
        ["`@include` directive is not supported for FRAGMENT_DEFINITION location"]
    );
}

#[test]
fn repeated_directive() {
    let schema = pets_schema();
    assert_eq!(
        validation_errors(&schema, "{ hello @include(if: true) @include(if: false) }"),
        ["non-repeatable directive `@include` can only be used once per location"]
    );
}

#[test]
fn if_argument() {
    let schema = pets_schema();
    assert_eq!(
        validation_errors(&schema, "{ hello @skip }"),
        ["the required argument `@skip(if:)` is not provided"]
    );
    assert_eq!(
        validation_errors(&schema, r#"{ hello @skip(if: "yes") }"#),
        ["invalid value for argument `@skip(if:)`: expected a value of type `Boolean!`, found `\"yes\"`"]
    );
    assert_eq!(
        validation_errors(&schema, "{ hello @skip(if: null) }"),
        ["invalid value for argument `@skip(if:)`: expected a value of type `Boolean!`, found `null`"]
    );
    assert_eq!(
        validation_errors(&schema, "{ hello @skip(if: true, unless: false) }"),
        ["the argument `unless` is not supported by `@skip`"]
    );
}
