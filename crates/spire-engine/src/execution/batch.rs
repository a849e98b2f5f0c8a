//! Batch resolvers: one call for a field selected on every item of a list.

use super::engine::cancelled;
use super::engine::collect_fields;
use super::engine::ExecutionContext;
use super::engine::Prefetched;
use super::input_coercion::coerce_field_arguments;
use super::result_coercion::resolve_object_type;
use crate::ast::Field;
use crate::ast::Type;
use crate::resolver::BatchResolver;
use crate::resolver::FieldError;
use crate::resolver::ObjectValue;
use crate::resolver::ResolvedValue;
use crate::schema::ObjectType;
use crate::JsonMap;
use crate::JsonValue;
use crate::Name;
use crate::Node;
use futures::future::join_all;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

/// One batch call to make: a field selected on items of the same object type
struct BatchCall<'a> {
    response_key: &'a Name,
    field: &'a Node<Field>,
    batch_resolver: &'a dyn BatchResolver,
    arguments: Arc<JsonMap>,
    /// Indices of the list items
    indices: Vec<usize>,
    sources: Vec<ObjectValue>,
}

/// Calls batch resolvers once per field for the object items of a list.
///
/// Returns the items, with JSON objects turned into object values,
/// and what was resolved for each item by response key.
/// Items whose field has no batch resolver are resolved later, one by one.
pub(crate) async fn prefetch_list<'a>(
    ctx: &ExecutionContext<'a>,
    item_ty: &'a Type,
    items: Vec<Result<ResolvedValue, FieldError>>,
    fields: &[&'a Node<Field>],
) -> (Vec<Result<ResolvedValue, FieldError>>, Vec<Prefetched>) {
    let mut prefetched: Vec<Prefetched> = items.iter().map(|_| Prefetched::new()).collect();
    let ty_name = match item_ty {
        Type::Named(ty_name) | Type::NonNullNamed(ty_name) => ty_name,
        Type::List(_) | Type::NonNullList(_) => return (items, prefetched),
    };
    match ctx.schema.types.get(ty_name) {
        Some(ty_def) if ty_def.is_composite() => {}
        _ => return (items, prefetched),
    }
    let items: Vec<_> = items
        .into_iter()
        .map(|item| match item {
            Ok(ResolvedValue::Leaf(JsonValue::Object(map))) => {
                Ok(ResolvedValue::Object(ObjectValue::json(map)))
            }
            item => item,
        })
        .collect();

    let calls = plan_batch_calls(ctx, ty_name, &items, fields);
    if calls.is_empty() {
        return (items, prefetched);
    }
    let results = join_all(calls.into_iter().map(|call| async move {
        let results = call_batch_resolver(
            ctx,
            call.batch_resolver,
            call.sources,
            call.arguments,
            call.field,
        )
        .await;
        (call.response_key, call.indices, results)
    }))
    .await;
    for (response_key, indices, results) in results {
        for (index, result) in indices.into_iter().zip(results) {
            prefetched[index].insert(response_key.clone(), result);
        }
    }
    (items, prefetched)
}

/// Groups object items by concrete type, then finds the batch fields selected on each type
fn plan_batch_calls<'a>(
    ctx: &ExecutionContext<'a>,
    ty_name: &'a Name,
    items: &[Result<ResolvedValue, FieldError>],
    fields: &[&'a Node<Field>],
) -> Vec<BatchCall<'a>> {
    let Some(ty_def) = ctx.schema.types.get(ty_name) else {
        return Vec::new();
    };
    let mut by_object_type = IndexMap::<&Name, (&'a ObjectType, Vec<usize>)>::new();
    for (index, item) in items.iter().enumerate() {
        let Ok(ResolvedValue::Object(value)) = item else {
            continue;
        };
        // Items with an invalid runtime type are reported when completed
        if let Ok(object_type) = resolve_object_type(ctx.schema, ty_def, value) {
            by_object_type
                .entry(&object_type.name)
                .or_insert_with(|| (object_type, Vec::new()))
                .1
                .push(index)
        }
    }

    let mut calls = Vec::new();
    for (object_type, indices) in by_object_type.into_values() {
        let mut grouped_field_set = IndexMap::new();
        collect_fields(
            ctx,
            object_type,
            fields.iter().flat_map(|field| &field.selection_set),
            &mut HashSet::new(),
            &mut grouped_field_set,
        );
        for (response_key, key_fields) in grouped_field_set {
            let field = key_fields[0];
            let Some(field_def) = object_type.fields.get(&field.name) else {
                continue;
            };
            let Some(batch_resolver) = &field_def.batch_resolver else {
                continue;
            };
            // Errors are reported when the field is executed for each item
            let Ok(arguments) =
                coerce_field_arguments(ctx.schema, &object_type.name, field_def, field)
            else {
                continue;
            };
            let sources = indices
                .iter()
                .filter_map(|&index| match &items[index] {
                    Ok(ResolvedValue::Object(value)) => Some(value.clone()),
                    _ => None,
                })
                .collect();
            calls.push(BatchCall {
                response_key,
                field,
                batch_resolver: batch_resolver.as_ref(),
                arguments,
                indices: indices.clone(),
                sources,
            })
        }
    }
    calls
}

/// Calls a batch resolver, returning exactly one result per source
async fn call_batch_resolver(
    ctx: &ExecutionContext<'_>,
    batch_resolver: &dyn BatchResolver,
    sources: Vec<ObjectValue>,
    arguments: Arc<JsonMap>,
    field: &Node<Field>,
) -> Vec<Result<ResolvedValue, FieldError>> {
    let count = sources.len();
    let error_for_each = |error: FieldError| (0..count).map(|_| Err(error.clone())).collect();
    if ctx.cancellation_token.is_cancelled() {
        return error_for_each(cancelled());
    }
    tracing::debug!(field = %field.name, sources = count, "invoking batch resolver");
    match batch_resolver
        .resolve_batch(ctx.batch_context(sources, arguments, field))
        .await
    {
        Ok(results) if results.len() == count => results,
        Ok(results) => error_for_each(FieldError::new(format!(
            "Batch resolver for field {} returned {} results for {count} sources",
            field.name,
            results.len()
        ))),
        Err(error) => error_for_each(error),
    }
}

/// Resolves a field that only has a batch resolver, outside of a list
pub(crate) async fn resolve_single(
    ctx: &ExecutionContext<'_>,
    batch_resolver: &dyn BatchResolver,
    source: &ObjectValue,
    arguments: Arc<JsonMap>,
    field: &Node<Field>,
) -> Result<ResolvedValue, FieldError> {
    call_batch_resolver(ctx, batch_resolver, vec![source.clone()], arguments, field)
        .await
        .into_iter()
        .next()
        .unwrap_or_else(|| Err(FieldError::new("Batch resolver returned no result")))
}
