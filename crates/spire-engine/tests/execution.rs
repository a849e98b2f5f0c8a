use crate::common::argument;
use crate::common::execute;
use crate::common::execute_with;
use crate::common::field;
use crate::common::json_map;
use crate::common::named;
use crate::common::object;
use crate::common::to_json;
use crate::common::yield_now;
use futures::channel::oneshot;
use futures::executor::block_on;
use pretty_assertions::assert_eq;
use serde_json_bytes::json;
use spire_engine::name;
use spire_engine::response::PathElement;
use spire_engine::schema::EnumType;
use spire_engine::schema::FieldDefinition;
use spire_engine::schema::InputObjectType;
use spire_engine::schema::InputValueDefinition;
use spire_engine::schema::InterfaceType;
use spire_engine::schema::ScalarType;
use spire_engine::schema::Schema;
use spire_engine::schema::UnionType;
use spire_engine::Document;
use spire_engine::Executor;
use spire_engine::FieldError;
use spire_engine::JsonValue;
use spire_engine::ObjectValue;
use spire_engine::RequestError;
use spire_engine::ResolvedValue;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

fn hello() -> FieldDefinition {
    field("hello", named("String")).resolve(|_| Ok(ResolvedValue::leaf("world")))
}

fn data(response: &spire_engine::Response) -> String {
    serde_json::to_string(&response.data).unwrap()
}

#[test]
fn hello_world() {
    let schema = Schema::builder()
        .object(object("Query").field(hello()))
        .build()
        .unwrap();
    let response = execute(&schema, "{ hello }");
    assert_eq!(to_json(&response), r#"{"data":{"hello":"world"},"errors":null}"#);
}

#[test]
fn merged_fields_resolve_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let schema = Schema::builder()
        .object(
            object("Query").field(
                field("foo", named("Int"))
                    .argument(argument("x", named("Int")))
                    .resolve(move |ctx| {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(ResolvedValue::leaf(ctx.argument("x").cloned().unwrap_or(JsonValue::Null)))
                    }),
            ),
        )
        .build()
        .unwrap();
    let response = execute(&schema, "{ a: foo(x: 1) a: foo(x: 1) b: foo(x: 2) }");
    assert_eq!(to_json(&response), r#"{"data":{"a":1,"b":2},"errors":null}"#);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn skip_and_include() {
    let schema = Schema::builder()
        .object(object("Query").field(hello()))
        .build()
        .unwrap();
    let query = r#"
        {
          a: hello @skip(if: true)
          b: hello
          c: hello @include(if: false)
          d: hello @include(if: true)
          e: hello @skip(if: false) @include(if: false)
          ... on Query @skip(if: true) { f: hello }
          ...fields @include(if: true)
        }

        fragment fields on Query { g: hello }
    "#;
    let response = execute(&schema, query);
    assert_eq!(data(&response), r#"{"b":"world","d":"world","g":"world"}"#);

    let variables = json_map(json!({"skip": true}));
    let query = "query($skip: Boolean!) { a: hello @skip(if: $skip) b: hello @include(if: $skip) }";
    let document = Document::parse(query, &variables).unwrap();
    spire_engine::validate(&schema, &document).unwrap();
    let response =
        block_on(Executor::new().execute(&schema, &document, ObjectValue::default())).unwrap();
    assert_eq!(data(&response), r#"{"b":"world"}"#);
}

#[test]
fn non_null_errors_propagate_to_the_nearest_nullable_field() {
    let schema = Schema::builder()
        .object(
            object("Query")
                .field(hello())
                .field(field("req", named("String").non_null()).resolve(|_| Ok(ResolvedValue::null())))
                .field(
                    field("nested", named("Nested"))
                        .resolve(|_| Ok(ResolvedValue::object(ObjectValue::default()))),
                ),
        )
        .object(
            object("Nested")
                .field(field("other", named("String")).resolve(|_| Ok(ResolvedValue::leaf("x"))))
                .field(field("req", named("String").non_null()).resolve(|_| Ok(ResolvedValue::null()))),
        )
        .build()
        .unwrap();

    let response = execute(&schema, "{ req }");
    assert_eq!(
        to_json(&response),
        r#"{"data":null,"errors":[{"message":"Non-null type String! resolved to null","locations":[{"line":1,"column":3}],"path":["req"]}]}"#
    );

    let response = execute(&schema, "{ hello nested { other req } }");
    assert_eq!(data(&response), r#"{"hello":"world","nested":null}"#);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].path,
        [
            PathElement::Field(name!("nested")),
            PathElement::Field(name!("req"))
        ]
    );
}

#[test]
fn resolver_errors() {
    let schema = Schema::builder()
        .object(
            object("Query").field(hello()).field(
                field("boom", named("String"))
                    .resolve(|_| Err(FieldError::new("boom").with_extension("code", "BOOM"))),
            ),
        )
        .build()
        .unwrap();
    let response = execute(&schema, "{ boom hello }");
    assert_eq!(
        to_json(&response),
        r#"{"data":{"boom":null,"hello":"world"},"errors":[{"message":"boom","locations":[{"line":1,"column":3}],"path":["boom"],"extensions":{"code":"BOOM"}}]}"#
    );
}

#[test]
fn response_order_does_not_depend_on_completion_order() {
    let (sender, receiver) = oneshot::channel::<()>();
    let sender = Mutex::new(Some(sender));
    let receiver = Mutex::new(Some(receiver));
    let completed = Arc::new(Mutex::new(Vec::new()));
    let completed_first = completed.clone();
    let completed_second = completed.clone();
    let schema = Schema::builder()
        .object(
            object("Query")
                .field(field("first", named("String")).resolve_async(move |_| {
                    let receiver = receiver.lock().unwrap().take();
                    let completed = completed_first.clone();
                    async move {
                        // Completes only after `second`
                        if let Some(receiver) = receiver {
                            receiver.await.unwrap();
                        }
                        completed.lock().unwrap().push("first");
                        Ok::<_, FieldError>(ResolvedValue::leaf("1"))
                    }
                }))
                .field(field("second", named("String")).resolve(move |_| {
                    if let Some(sender) = sender.lock().unwrap().take() {
                        sender.send(()).unwrap();
                    }
                    completed_second.lock().unwrap().push("second");
                    Ok(ResolvedValue::leaf("2"))
                })),
        )
        .build()
        .unwrap();
    let response = execute(&schema, "{ first second }");
    assert_eq!(data(&response), r#"{"first":"1","second":"2"}"#);
    assert_eq!(*completed.lock().unwrap(), ["second", "first"]);
}

#[test]
fn lists_with_null_items() {
    let items = || -> Result<ResolvedValue, FieldError> { Ok(ResolvedValue::leaf(json!(["a", null]))) };
    let schema = Schema::builder()
        .object(
            object("Query")
                .field(field("items", named("String").non_null().list()).resolve(move |_| items()))
                .field(
                    field("strictItems", named("String").non_null().list().non_null())
                        .resolve(move |_| items()),
                )
                .field(field("looseItems", named("String").list()).resolve(move |_| items())),
        )
        .build()
        .unwrap();

    let response = execute(&schema, "{ looseItems }");
    assert_eq!(to_json(&response), r#"{"data":{"looseItems":["a",null]},"errors":null}"#);

    let response = execute(&schema, "{ items }");
    assert_eq!(
        to_json(&response),
        r#"{"data":{"items":null},"errors":[{"message":"Non-null type String! resolved to null","locations":[{"line":1,"column":3}],"path":["items",1]}]}"#
    );

    let response = execute(&schema, "{ strictItems looseItems }");
    assert_eq!(data(&response), "null");
    assert_eq!(
        response.errors[0].path,
        [PathElement::Field(name!("strictItems")), PathElement::ListItem(1)]
    );
}

#[test]
fn list_errors_keep_item_order() {
    let schema = Schema::builder()
        .object(
            object("Query").field(field("numbers", named("Int").list()).resolve(|_| {
                Ok(ResolvedValue::list([
                    ResolvedValue::leaf(1),
                    ResolvedValue::leaf("two"),
                    ResolvedValue::leaf(3),
                    ResolvedValue::leaf(5_000_000_000_i64),
                ]))
            })),
        )
        .build()
        .unwrap();
    let response = execute(&schema, "{ numbers }");
    assert_eq!(data(&response), r#"{"numbers":[1,null,3,null]}"#);
    let messages: Vec<_> = response.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        [
            r#"Resolver returned "two", expected Int"#,
            "Resolver returned 5000000000 which overflows Int",
        ]
    );
}

fn pets_schema() -> Schema {
    Schema::builder()
        .interface(InterfaceType::new(name!("Pet")).field(field("name", named("String").non_null())))
        .object(
            object("Dog")
                .implements(name!("Pet"))
                .field(field("name", named("String").non_null()))
                .field(field("barks", named("Boolean"))),
        )
        .object(
            object("Cat")
                .implements(name!("Pet"))
                .field(field("name", named("String").non_null()))
                .field(field("meows", named("Boolean"))),
        )
        .object(object("Human").field(field("name", named("String"))))
        .union(UnionType::new(name!("CatOrDog")).member(name!("Cat")).member(name!("Dog")))
        .object(
            object("Query")
                .field(field("pets", named("Pet").non_null().list().non_null()).resolve(|_| {
                    Ok(ResolvedValue::leaf(json!([
                        {"__typename": "Dog", "name": "Rex", "barks": true},
                        {"__typename": "Cat", "name": "Tom", "meows": false},
                    ])))
                }))
                .field(field("favorite", named("CatOrDog")).resolve(|_| {
                    let cat = ObjectValue::json(json_map(json!({"name": "Felix", "meows": true})));
                    Ok(ResolvedValue::object(cat.with_type_name(name!("Cat"))))
                }))
                .field(field("untyped", named("CatOrDog")).resolve(|_| {
                    Ok(ResolvedValue::leaf(json!({"name": "Felix"})))
                }))
                .field(field("impostor", named("Pet")).resolve(|_| {
                    Ok(ResolvedValue::leaf(json!({"__typename": "Human", "name": "Bob"})))
                })),
        )
        .build()
        .unwrap()
}

#[test]
fn abstract_types() {
    let schema = pets_schema();
    let query = r#"
        {
          pets {
            __typename
            name
            ... on Dog { barks }
            ... on Cat { meows }
          }
          favorite {
            ... on Pet { name }
            ... on Cat { meows }
          }
        }
    "#;
    let response = execute(&schema, query);
    assert_eq!(
        data(&response),
        r#"{"pets":[{"__typename":"Dog","name":"Rex","barks":true},{"__typename":"Cat","name":"Tom","meows":false}],"favorite":{"name":"Felix","meows":true}}"#
    );
    assert!(response.errors.is_empty());
}

#[test]
fn invalid_runtime_types() {
    let schema = pets_schema();
    let response = execute(&schema, "{ untyped { __typename } impostor { name } }");
    assert_eq!(data(&response), r#"{"untyped":null,"impostor":null}"#);
    let messages: Vec<_> = response.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        [
            "Resolver returned an object without a runtime type name for abstract type CatOrDog",
            "Resolver returned an object of type Human which is not a possible type of Pet",
        ]
    );
}

#[test]
fn arguments_use_the_definition_of_the_runtime_type() {
    let name_with_suffix = |suffix: &str| {
        field("name", named("String").non_null())
            .argument(argument("suffix", named("String")).default_value(suffix))
            .resolve(|ctx| {
                let name = ctx
                    .source
                    .as_json()
                    .and_then(|json| json.get("name"))
                    .and_then(|name| name.as_str())
                    .unwrap_or_default();
                let suffix = ctx
                    .arguments
                    .get("suffix")
                    .and_then(|suffix| suffix.as_str())
                    .unwrap_or("<none>");
                Ok(ResolvedValue::leaf(format!("{name}{suffix}")))
            })
    };
    let schema = Schema::builder()
        .interface(InterfaceType::new(name!("Pet")).field(field("name", named("String").non_null())))
        .object(object("Dog").implements(name!("Pet")).field(name_with_suffix("!dog")))
        .object(object("Cat").implements(name!("Pet")).field(name_with_suffix("!cat")))
        .object(
            object("Query")
                .field(field("pet", named("Pet")).resolve(|_| {
                    Ok(ResolvedValue::leaf(json!({"__typename": "Dog", "name": "Rex"})))
                }))
                .field(field("pets", named("Pet").non_null().list()).resolve(|_| {
                    Ok(ResolvedValue::leaf(json!([
                        {"__typename": "Dog", "name": "Rex"},
                        {"__typename": "Cat", "name": "Tom"},
                    ])))
                })),
        )
        .build()
        .unwrap();
    let query = "{ pet { name } pets { ...petName } } fragment petName on Pet { name }";
    let response = execute(&schema, query);
    assert_eq!(
        data(&response),
        r#"{"pet":{"name":"Rex!dog"},"pets":[{"name":"Rex!dog"},{"name":"Tom!cat"}]}"#
    );
    assert!(response.errors.is_empty());
}

struct User {
    name: String,
    bio: String,
}

#[test]
fn host_object_values() {
    let schema = Schema::builder()
        .object(
            object("Query").field(field("me", named("User")).resolve(|_| {
                Ok(ResolvedValue::object(ObjectValue::new(User {
                    name: "alice".to_owned(),
                    bio: "likes graphs".to_owned(),
                })))
            })),
        )
        .object(
            object("User")
                .field(field("name", named("String")).resolve(|ctx| {
                    let user = ctx.source.downcast_ref::<User>().ok_or("not a user")?;
                    Ok(ResolvedValue::leaf(user.name.as_str()))
                }))
                // Without resolver: the profile is the user value itself
                .field(field("profile", named("Profile"))),
        )
        .object(object("Profile").field(field("bio", named("String")).resolve(|ctx| {
            let user = ctx.source.downcast_ref::<User>().ok_or("not a user")?;
            Ok(ResolvedValue::leaf(user.bio.as_str()))
        })))
        .build()
        .unwrap();
    let response = execute(&schema, "{ me { name profile { bio } } }");
    assert_eq!(
        to_json(&response),
        r#"{"data":{"me":{"name":"alice","profile":{"bio":"likes graphs"}}},"errors":null}"#
    );
}

#[test]
fn lazy_values() {
    let produced = Arc::new(AtomicUsize::new(0));
    let counter = produced.clone();
    let schema = Schema::builder()
        .object(
            object("Query")
                .field(
                    field("expensive", named("Int"))
                        .lazy()
                        .resolve(move |_| {
                            let counter = counter.clone();
                            Ok(ResolvedValue::lazy(move || async move {
                                counter.fetch_add(1, Ordering::SeqCst);
                                Ok::<_, FieldError>(ResolvedValue::leaf(42))
                            }))
                        }),
                )
                .field(field("notLazy", named("Int")).resolve(|_| {
                    Ok(ResolvedValue::lazy(|| async { Ok::<_, FieldError>(ResolvedValue::leaf(1)) }))
                })),
        )
        .build()
        .unwrap();

    let response = execute(&schema, "{ a: expensive b: expensive }");
    assert_eq!(data(&response), r#"{"a":42,"b":42}"#);
    // Once per response key
    assert_eq!(produced.load(Ordering::SeqCst), 2);

    let response = execute(&schema, "{ notLazy }");
    assert_eq!(data(&response), r#"{"notLazy":null}"#);
    assert_eq!(
        response.errors[0].message,
        "Field Query.notLazy is not lazy but its resolver returned a lazy value"
    );
}

fn logged(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> FieldDefinition {
    let log = log.clone();
    field(name, named("String")).resolve_async(move |_| {
        let log = log.clone();
        async move {
            log.lock().unwrap().push(format!("start {name}"));
            yield_now().await;
            log.lock().unwrap().push(format!("end {name}"));
            Ok::<_, FieldError>(ResolvedValue::leaf(name))
        }
    })
}

#[test]
fn mutations_are_sequential() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let schema = Schema::builder()
        .object(
            object("Query")
                .field(logged(&log, "first"))
                .field(logged(&log, "second")),
        )
        .object(
            object("Mutation")
                .field(logged(&log, "first"))
                .field(logged(&log, "second"))
                .field(
                    field("fail", named("String").non_null())
                        .resolve(|_| Err(FieldError::new("failed"))),
                ),
        )
        .build()
        .unwrap();

    let response = execute(&schema, "mutation { first second }");
    assert_eq!(data(&response), r#"{"first":"first","second":"second"}"#);
    assert_eq!(
        std::mem::take(&mut *log.lock().unwrap()),
        ["start first", "end first", "start second", "end second"]
    );

    let response = execute(&schema, "query { first second }");
    assert_eq!(data(&response), r#"{"first":"first","second":"second"}"#);
    assert_eq!(
        std::mem::take(&mut *log.lock().unwrap()),
        ["start first", "start second", "end first", "end second"]
    );

    // Root fields after a null propagated to `data` are not executed
    let response = execute(&schema, "mutation { fail first }");
    assert_eq!(data(&response), "null");
    assert_eq!(response.errors[0].message, "failed");
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn cancellation() {
    let token = CancellationToken::new();
    let cancel = token.clone();
    let schema = Schema::builder()
        .object(object("Query").field(hello()))
        .object(
            object("Mutation")
                .field(field("stop", named("String")).resolve(move |_| {
                    cancel.cancel();
                    Ok(ResolvedValue::leaf("stopped"))
                }))
                .field(hello()),
        )
        .build()
        .unwrap();
    let executor = Executor::new().cancellation_token(token.clone());

    let response = execute_with(&schema, "mutation { stop hello }", &executor);
    assert_eq!(
        to_json(&response),
        r#"{"data":{"stop":"stopped","hello":null},"errors":[{"message":"execution cancelled","locations":[{"line":1,"column":17}],"path":["hello"]}]}"#
    );

    let response = execute_with(&schema, "{ hello }", &executor);
    assert_eq!(data(&response), r#"{"hello":null}"#);
    assert_eq!(response.errors[0].message, "execution cancelled");
}

#[test]
fn context_data() {
    let schema = Schema::builder()
        .object(object("Query").field(field("viewer", named("String")).resolve(|ctx| {
            let viewer = ctx.data::<String>().ok_or("no viewer")?;
            Ok(ResolvedValue::leaf(viewer.as_str()))
        })))
        .build()
        .unwrap();
    let response = execute_with(
        &schema,
        "{ viewer }",
        &Executor::new().context_data("alice".to_owned()),
    );
    assert_eq!(data(&response), r#"{"viewer":"alice"}"#);

    let response = execute(&schema, "{ viewer }");
    assert_eq!(response.errors[0].message, "no viewer");
}

#[test]
fn input_and_output_coercion() {
    let schema = Schema::builder()
        .scalar(ScalarType::new(name!("JSON")))
        .enum_type(
            EnumType::new(name!("Order"))
                .value_with_host(name!("ASC"), 1)
                .value_with_host(name!("DESC"), -1),
        )
        .input_object(
            InputObjectType::new(name!("Filter"))
                .field(InputValueDefinition::new(name!("text"), named("String").non_null()))
                .field(InputValueDefinition::new(name!("exact"), named("Boolean")).default_value(false)),
        )
        .object(
            object("Query")
                .field(
                    field("echo", named("JSON"))
                        .argument(argument("order", named("Order")).default_value(1))
                        .argument(argument("filter", named("Filter")))
                        .argument(argument("limit", named("Float")))
                        .resolve(|ctx| Ok(ResolvedValue::leaf(JsonValue::Object((*ctx.arguments).clone())))),
                )
                .field(field("sort", named("Order")).resolve(|_| Ok(ResolvedValue::leaf(-1))))
                .field(field("badSort", named("Order")).resolve(|_| Ok(ResolvedValue::leaf(5))))
                .field(field("id", named("ID")).resolve(|_| Ok(ResolvedValue::leaf(7)))),
        )
        .build()
        .unwrap();

    let response = execute(&schema, r#"{ echo(order: DESC, filter: { text: "a" }, limit: 2) }"#);
    assert_eq!(
        data(&response),
        r#"{"echo":{"order":-1,"filter":{"text":"a","exact":false},"limit":2.0}}"#
    );
    let response = execute(&schema, "{ echo }");
    assert_eq!(data(&response), r#"{"echo":{"order":1}}"#);

    let response = execute(&schema, "{ sort id badSort }");
    assert_eq!(data(&response), r#"{"sort":"DESC","id":"7","badSort":null}"#);
    assert_eq!(response.errors[0].message, "Resolver returned 5, expected enum Order");
}

#[test]
fn request_errors() {
    let schema = Schema::builder()
        .object(object("Query").field(hello()))
        .object(object("Subscription").field(hello()))
        .build()
        .unwrap();
    let run = |query: &str, executor: Executor| {
        let document = Document::parse(query, &Default::default()).unwrap();
        block_on(executor.execute(&schema, &document, ObjectValue::default())).unwrap_err()
    };

    let error = run("query A { hello } query B { hello }", Executor::new());
    assert_eq!(
        error.to_string(),
        "must provide operation name if query contains multiple operations"
    );
    let error = run("query A { hello }", Executor::new().operation_name("C"));
    assert_eq!(error.to_string(), "unknown operation named `C`");
    let error = run("subscription { hello }", Executor::new());
    assert_eq!(error, RequestError::SubscriptionWithExecute);
    let error = run("mutation { hello }", Executor::new());
    assert_eq!(
        to_json(&error.to_response()),
        r#"{"data":null,"errors":[{"message":"the schema does not define a root type for mutation operations","extensions":{"SPIRE_VALIDATION_SHOULD_HAVE_CAUGHT_THIS":true}}]}"#
    );
}
