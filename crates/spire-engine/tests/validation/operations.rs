use crate::common::field;
use crate::common::named;
use crate::common::object;
use crate::common::pets_schema;
use crate::common::validation_errors;
use spire_engine::schema::Schema;

#[test]
fn unsupported_operation_type() {
    let schema = Schema::builder()
        .object(object("Query").field(field("hello", named("String"))))
        .build()
        .unwrap();
    assert_eq!(
        validation_errors(&schema, "mutation { hello }"),
        ["the schema does not support mutation operations"]
    );
    assert_eq!(
        validation_errors(&schema, "subscription { hello }"),
        ["the schema does not support subscription operations"]
    );
}

#[test]
fn mutation_root_fields() {
    let schema = pets_schema();
    assert_eq!(
        validation_errors(&schema, r#"mutation { rename(name: "Rex") { name } }"#),
        Vec::<String>::new()
    );
    assert_eq!(
        validation_errors(&schema, "mutation { dog { name } }"),
        ["cannot query field `dog` on type `Mutation`"]
    );
}

#[test]
fn subscription_single_root_field() {
    let schema = pets_schema();
    assert_eq!(
        validation_errors(&schema, "subscription { __typename newDog { name } }"),
        Vec::<String>::new()
    );
    assert_eq!(
        validation_errors(&schema, "subscription { newDog { name } newCat { name } }"),
        ["subscription operation must select exactly one root field, found 2"]
    );
    let query = r#"
        subscription NewPets {
          ...newPets
        }

        fragment newPets on Subscription {
          newDog { name }
          newCat { name }
        }
    "#;
    assert_eq!(
        validation_errors(&schema, query),
        ["subscription `NewPets` must select exactly one root field, found 2"]
    );
}

#[test]
fn every_operation_is_checked() {
    let schema = pets_schema();
    let query = r#"
        query A { hello }
        query B { unknown }
    "#;
    assert_eq!(
        validation_errors(&schema, query),
        ["cannot query field `unknown` on type `Query`"]
    );
}
