//! Schemas and helpers shared by the test modules

use spire_engine::ast::Type;
use spire_engine::name;
use spire_engine::schema::EnumType;
use spire_engine::schema::FieldDefinition;
use spire_engine::schema::InputValueDefinition;
use spire_engine::schema::InterfaceType;
use spire_engine::schema::ObjectType;
use spire_engine::schema::Schema;
use spire_engine::schema::UnionType;
use spire_engine::Document;
use spire_engine::Executor;
use spire_engine::JsonMap;
use spire_engine::JsonValue;
use spire_engine::Name;
use spire_engine::ObjectValue;
use spire_engine::Response;
use std::future::Future;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

pub fn named(name: &str) -> Type {
    Type::Named(Name::new(name).unwrap())
}

pub fn field(name: &str, ty: Type) -> FieldDefinition {
    FieldDefinition::new(Name::new(name).unwrap(), ty)
}

pub fn argument(name: &str, ty: Type) -> InputValueDefinition {
    InputValueDefinition::new(Name::new(name).unwrap(), ty)
}

pub fn object(name: &str) -> ObjectType {
    ObjectType::new(Name::new(name).unwrap())
}

pub fn json_map(value: JsonValue) -> JsonMap {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub fn parse(query: &str) -> Document {
    Document::parse(query, &JsonMap::new()).unwrap()
}

/// Returns the messages of validation errors, in order
pub fn validation_errors(schema: &Schema, query: &str) -> Vec<String> {
    match spire_engine::validate(schema, &parse(query)) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(|error| error.to_string()).collect(),
    }
}

pub fn execute(schema: &Schema, query: &str) -> Response {
    execute_with(schema, query, &Executor::new())
}

pub fn execute_with(schema: &Schema, query: &str, executor: &Executor) -> Response {
    let document = parse(query);
    if let Err(errors) = spire_engine::validate(schema, &document) {
        panic!("{errors}")
    }
    futures::executor::block_on(executor.execute(schema, &document, ObjectValue::default()))
        .unwrap()
}

pub fn to_json(response: &Response) -> String {
    serde_json::to_string(response).unwrap()
}

/// Returns `Pending` once, so that other futures joined with this one make progress
pub fn yield_now() -> impl Future<Output = ()> {
    struct YieldNow(bool);

    impl Future for YieldNow {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    YieldNow(false)
}

/// Types without resolvers, for validation tests:
///
/// ```graphql
/// interface Pet { name: String! }
/// type Dog implements Pet {
///   name: String!
///   nickname: String
///   barks: Boolean!
///   doesKnowCommand(command: DogCommand!): Boolean!
///   owner: Human
/// }
/// type Cat implements Pet { name: String! meows: Boolean! }
/// union CatOrDog = Cat | Dog
/// type Human { name: String! pets: [Pet!]! }
/// enum DogCommand { SIT HEEL }
/// type Query {
///   dog: Dog
///   pet: Pet
///   catOrDog: CatOrDog
///   human: Human
///   foo(x: Int): Int
///   hello: String
/// }
/// type Mutation { rename(name: String!): Dog }
/// type Subscription { newDog: Dog newCat: Cat }
/// ```
pub fn pets_schema() -> Schema {
    let string = || named("String");
    let boolean = || named("Boolean");
    Schema::builder()
        .interface(
            InterfaceType::new(name!("Pet"))
                .field(field("name", string().non_null())),
        )
        .object(
            object("Dog")
                .implements(name!("Pet"))
                .field(field("name", string().non_null()))
                .field(field("nickname", string()))
                .field(field("barks", boolean().non_null()))
                .field(
                    field("doesKnowCommand", boolean().non_null())
                        .argument(argument("command", named("DogCommand").non_null())),
                )
                .field(field("owner", named("Human"))),
        )
        .object(
            object("Cat")
                .implements(name!("Pet"))
                .field(field("name", string().non_null()))
                .field(field("meows", boolean().non_null())),
        )
        .union(
            UnionType::new(name!("CatOrDog"))
                .member(name!("Cat"))
                .member(name!("Dog")),
        )
        .object(
            object("Human")
                .field(field("name", string().non_null()))
                .field(field("pets", named("Pet").non_null().list().non_null())),
        )
        .enum_type(
            EnumType::new(name!("DogCommand"))
                .value(name!("SIT"))
                .value(name!("HEEL")),
        )
        .object(
            object("Query")
                .field(field("dog", named("Dog")))
                .field(field("pet", named("Pet")))
                .field(field("catOrDog", named("CatOrDog")))
                .field(field("human", named("Human")))
                .field(field("foo", named("Int")).argument(argument("x", named("Int"))))
                .field(field("hello", string())),
        )
        .object(
            object("Mutation")
                .field(field("rename", named("Dog")).argument(argument("name", string().non_null()))),
        )
        .object(
            object("Subscription")
                .field(field("newDog", named("Dog")))
                .field(field("newCat", named("Cat"))),
        )
        .build()
        .unwrap()
}
