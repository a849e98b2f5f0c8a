use crate::common::field;
use crate::common::named;
use crate::common::object;
use crate::common::parse;
use crate::common::to_json;
use futures::executor::block_on;
use futures::stream;
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json_bytes::json;
use spire_engine::schema::Schema;
use spire_engine::Executor;
use spire_engine::FieldError;
use spire_engine::ObjectValue;
use spire_engine::RequestError;
use spire_engine::ResolvedValue;
use tokio_util::sync::CancellationToken;

fn schema() -> Schema {
    Schema::builder()
        .object(object("Query").field(field("hello", named("String"))))
        .object(
            object("Subscription")
                .field(field("counter", named("Int")).resolve(|_| {
                    Ok(ResolvedValue::stream(stream::iter(vec![
                        Ok(ResolvedValue::leaf(1)),
                        Ok(ResolvedValue::leaf(2)),
                        Err(FieldError::new("boom")),
                    ])))
                }))
                .field(field("ticks", named("Int")).resolve(|_| {
                    Ok(ResolvedValue::stream(
                        stream::iter(1..).map(|tick| Ok::<_, FieldError>(ResolvedValue::leaf(tick))),
                    ))
                }))
                .field(field("newDog", named("Dog")).resolve(|_| {
                    Ok(ResolvedValue::stream(stream::iter(vec![Ok(ResolvedValue::leaf(
                        json!({"name": "Rex", "barks": true}),
                    ))])))
                }))
                .field(field("notAStream", named("Int")).resolve(|_| Ok(ResolvedValue::leaf(1))))
                .field(
                    field("unavailable", named("Int"))
                        .resolve(|_| Err(FieldError::new("no events today"))),
                ),
        )
        .object(
            object("Dog")
                .field(field("name", named("String")))
                .field(field("barks", named("Boolean"))),
        )
        .build()
        .unwrap()
}

fn collect_responses(schema: &Schema, query: &str) -> Vec<String> {
    let document = parse(query);
    spire_engine::validate(schema, &document).unwrap();
    let executor = Executor::new();
    block_on(async {
        let Ok(responses) = executor.subscribe(schema, &document, ObjectValue::default()).await
        else {
            panic!("subscription failed to start")
        };
        responses.map(|response| to_json(&response)).collect().await
    })
}

fn subscribe_error(schema: &Schema, query: &str) -> RequestError {
    let document = parse(query);
    let executor = Executor::new();
    block_on(async {
        match executor.subscribe(schema, &document, ObjectValue::default()).await {
            Ok(_) => panic!("expected the subscription to fail"),
            Err(error) => error,
        }
    })
}

#[test]
fn one_response_per_event() {
    let schema = schema();
    assert_eq!(
        collect_responses(&schema, "subscription { counter }"),
        [
            r#"{"data":{"counter":1},"errors":null}"#,
            r#"{"data":{"counter":2},"errors":null}"#,
            r#"{"data":{"counter":null},"errors":[{"message":"boom","locations":[{"line":1,"column":16}],"path":["counter"]}]}"#,
        ]
    );
}

#[test]
fn events_are_completed_with_the_selection_set() {
    let schema = schema();
    assert_eq!(
        collect_responses(&schema, "subscription { __typename dog: newDog { name } }"),
        [r#"{"data":{"__typename":"Subscription","dog":{"name":"Rex"}},"errors":null}"#]
    );
}

#[test]
fn cancellation_ends_the_stream() {
    let schema = schema();
    let document = parse("subscription { ticks }");
    let token = CancellationToken::new();
    let executor = Executor::new().cancellation_token(token.clone());
    block_on(async {
        let Ok(mut responses) = executor.subscribe(&schema, &document, ObjectValue::default()).await
        else {
            panic!("subscription failed to start")
        };
        let first = responses.next().await.unwrap();
        assert_eq!(to_json(&first), r#"{"data":{"ticks":1},"errors":null}"#);
        let second = responses.next().await.unwrap();
        assert_eq!(to_json(&second), r#"{"data":{"ticks":2},"errors":null}"#);
        token.cancel();
        assert!(responses.next().await.is_none());
    })
}

#[test]
fn subscription_request_errors() {
    let schema = schema();
    assert_eq!(
        subscribe_error(&schema, "{ hello }").to_string(),
        "expected a subscription operation, found a query"
    );
    assert_eq!(
        subscribe_error(&schema, "subscription { notAStream }").to_string(),
        "subscription root field must resolve to a stream, found a leaf value"
    );
    assert_eq!(
        subscribe_error(&schema, "subscription { unavailable }").to_string(),
        "no events today"
    );
    // Not validated: two root fields
    assert_eq!(
        subscribe_error(&schema, "subscription { counter ticks }"),
        RequestError::SubscriptionRootField
    );
}
