use super::engine::collect_fields;
use super::engine::execute_selection_set;
use super::engine::invoke_resolver;
use super::engine::ExecutionMode;
use super::engine::Prefetched;
use super::input_coercion::coerce_field_arguments;
use super::Executor;
use super::RequestError;
use crate::ast::OperationType;
use crate::resolver::FieldError;
use crate::resolver::ObjectValue;
use crate::resolver::ResolvedValue;
use crate::response::Response;
use crate::schema::Schema;
use crate::Document;
use futures::stream::BoxStream;
use futures::StreamExt;
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::Instrument;

impl Executor {
    /// Starts a subscription: resolves the source stream of its root field,
    /// then executes the selection set once per event.
    ///
    /// The response stream ends with the source stream,
    /// or when the cancellation token is cancelled.
    ///
    /// <https://spec.graphql.org/October2021/#sec-Subscription>
    pub async fn subscribe<'a>(
        &'a self,
        schema: &'a Schema,
        document: &'a Document,
        root_value: ObjectValue,
    ) -> Result<BoxStream<'a, Response>, RequestError> {
        let operation = document.get_operation(self.operation_name.as_deref())?;
        if operation.operation_type != OperationType::Subscription {
            return Err(RequestError::NotASubscription {
                operation_type: operation.operation_type.name(),
            });
        }
        let root_type = self.root_type(schema, operation)?;
        let span = tracing::debug_span!("subscribe", operation.name = operation.name.as_deref());
        let ctx = self.context(schema, document);

        let mut grouped_field_set = IndexMap::new();
        collect_fields(
            &ctx,
            root_type,
            &operation.selection_set,
            &mut HashSet::new(),
            &mut grouped_field_set,
        );
        let mut source_fields = grouped_field_set
            .iter()
            .filter(|(_, fields)| fields[0].name != "__typename");
        let (Some((&response_key, fields)), None) = (source_fields.next(), source_fields.next())
        else {
            return Err(RequestError::SubscriptionRootField);
        };
        let field = fields[0];
        let Some(field_def) = root_type.fields.get(&field.name) else {
            return Err(RequestError::SubscriptionRootField);
        };
        let arguments = coerce_field_arguments(schema, &root_type.name, field_def, field)
            .map_err(|error| RequestError::SubscriptionSource(FieldError::new(error.to_string())))?;
        let source = invoke_resolver(&ctx, &root_value, field_def, field, arguments)
            .instrument(span.clone())
            .await
            .map_err(RequestError::SubscriptionSource)?;
        let events = match source {
            ResolvedValue::Stream(events) => events,
            other => {
                return Err(RequestError::InvalidSubscriptionSource {
                    describe: other.describe(),
                })
            }
        };
        span.in_scope(|| tracing::debug!(field = %field.name, "subscription started"));

        let cancellation_token = self.cancellation_token.clone();
        let stream = events
            .take_until(async move { cancellation_token.cancelled().await })
            .then(move |event| {
                let root_value = root_value.clone();
                async move {
                    let ctx = self.context(schema, document);
                    let mut prefetched = Prefetched::new();
                    prefetched.insert(response_key.clone(), event);
                    let mut errors = Vec::new();
                    let data = execute_selection_set(
                        &ctx,
                        &mut errors,
                        None,
                        ExecutionMode::Normal,
                        root_type,
                        &root_value,
                        operation.selection_set.iter().collect(),
                        prefetched,
                    )
                    .await
                    .ok();
                    Response { data, errors }
                }
                .instrument(span.clone())
            });
        Ok(stream.boxed())
    }
}
