#![allow(clippy::too_many_arguments)]

use super::batch;
use super::input_coercion::coerce_field_arguments;
use super::input_coercion::InputCoercionError;
use super::result_coercion::complete_value;
use crate::ast::Field;
use crate::ast::Selection;
use crate::ast::Type;
use crate::resolver::BatchContext;
use crate::resolver::ContextData;
use crate::resolver::FieldContext;
use crate::resolver::FieldError;
use crate::resolver::ObjectValue;
use crate::resolver::ResolvedValue;
use crate::response::GraphQLError;
use crate::response::LinkedPath;
use crate::response::LinkedPathElement;
use crate::response::PathElement;
use crate::schema::ExtendedType;
use crate::schema::FieldDefinition;
use crate::schema::ObjectType;
use crate::schema::Schema;
use crate::Document;
use crate::JsonMap;
use crate::JsonValue;
use crate::Name;
use crate::Node;
use crate::SourceSpan;
use async_recursion::async_recursion;
use futures::future::join_all;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// <https://spec.graphql.org/October2021/#sec-Normal-and-Serial-Execution>
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ExecutionMode {
    /// Allowed to resolve fields in any order, including in parallel
    Normal,
    /// Each root mutation field completes before the next one starts
    Sequential,
}

/// Return in `Err` when a field error occurred at some non-nullable place
///
/// <https://spec.graphql.org/October2021/#sec-Handling-Field-Errors>
pub(crate) struct PropagateNull;

/// Results resolved ahead of field execution, by response key.
///
/// Filled by batch resolvers for list items, and with the event of a subscription.
pub(crate) type Prefetched = IndexMap<Name, Result<ResolvedValue, FieldError>>;

/// What stays the same for all fields of one execution
pub(crate) struct ExecutionContext<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) document: &'a Document,
    pub(crate) cancellation_token: &'a CancellationToken,
    pub(crate) context_data: &'a ContextData,
}

impl<'a> ExecutionContext<'a> {
    pub(crate) fn field_error(
        &self,
        message: impl Into<String>,
        path: LinkedPath<'_>,
        location: Option<SourceSpan>,
    ) -> GraphQLError {
        GraphQLError::field_error(message, path, location, &self.document.source)
    }

    pub(crate) fn resolver_error(
        &self,
        error: FieldError,
        path: LinkedPath<'_>,
        location: Option<SourceSpan>,
    ) -> GraphQLError {
        GraphQLError::from_resolver(error, path, location, &self.document.source)
    }

    pub(crate) fn input_coercion_error(
        &self,
        error: InputCoercionError,
        path: LinkedPath<'_>,
        location: Option<SourceSpan>,
    ) -> GraphQLError {
        match error {
            InputCoercionError::ValueError { message, location } => {
                self.field_error(message, path, location)
            }
            InputCoercionError::SuspectedValidationBug(bug) => {
                self.suspected_validation_bug(bug.message, path, bug.location.or(location))
            }
        }
    }

    pub(crate) fn suspected_validation_bug(
        &self,
        message: impl Into<String>,
        path: LinkedPath<'_>,
        location: Option<SourceSpan>,
    ) -> GraphQLError {
        let message = message.into();
        tracing::warn!(%message, "error that validation should have caught");
        self.field_error(message, path, location)
            .validation_should_have_caught_this()
    }

    pub(crate) fn field_context(
        &self,
        source: ObjectValue,
        arguments: Arc<JsonMap>,
        field: &Node<Field>,
    ) -> FieldContext {
        FieldContext {
            source,
            arguments,
            field: field.clone(),
            cancellation_token: self.cancellation_token.clone(),
            context_data: self.context_data.clone(),
        }
    }

    pub(crate) fn batch_context(
        &self,
        sources: Vec<ObjectValue>,
        arguments: Arc<JsonMap>,
        field: &Node<Field>,
    ) -> BatchContext {
        BatchContext {
            sources,
            arguments,
            field: field.clone(),
            cancellation_token: self.cancellation_token.clone(),
            context_data: self.context_data.clone(),
        }
    }
}

pub(crate) fn cancelled() -> FieldError {
    FieldError::new("execution cancelled")
}

/// <https://spec.graphql.org/October2021/#ExecuteSelectionSet()>
#[async_recursion]
pub(crate) async fn execute_selection_set<'a, 'b>(
    ctx: &'b ExecutionContext<'a>,
    errors: &'b mut Vec<GraphQLError>,
    path: LinkedPath<'b>,
    mode: ExecutionMode,
    object_type: &'a ObjectType,
    object_value: &'b ObjectValue,
    selections: Vec<&'a Selection>,
    mut prefetched: Prefetched,
) -> Result<JsonMap, PropagateNull> {
    let mut grouped_field_set = IndexMap::new();
    collect_fields(
        ctx,
        object_type,
        selections,
        &mut HashSet::new(),
        &mut grouped_field_set,
    );

    let futures: Vec<_> = grouped_field_set
        .iter()
        .filter_map(|(&response_key, fields)| {
            // Indexing should not panic: `collect_fields` only creates a `Vec` to push to it
            let field_name = &fields[0].name;
            let field_def = if field_name == "__typename" {
                None
            } else if let Some(field_def) = object_type.fields.get(field_name) {
                Some(field_def)
            } else {
                tracing::warn!(
                    field = %field_name,
                    object_type = %object_type.name,
                    "skipping undefined field, validation should have caught this"
                );
                return None;
            };
            let prefetched = prefetched.swap_remove(response_key);
            Some(async move {
                let mut field_errors = Vec::new();
                let result = match field_def {
                    None => Ok(JsonValue::from(object_type.name.as_str())),
                    Some(field_def) => {
                        let field_path = LinkedPathElement {
                            element: PathElement::Field(response_key.clone()),
                            next: path,
                        };
                        execute_field(
                            ctx,
                            &mut field_errors,
                            Some(&field_path),
                            object_type,
                            object_value,
                            field_def,
                            fields,
                            prefetched,
                        )
                        .await
                    }
                };
                (response_key, result, field_errors)
            })
        })
        .collect();

    let outputs = match mode {
        ExecutionMode::Normal => join_all(futures).await,
        ExecutionMode::Sequential => {
            let mut outputs = Vec::with_capacity(futures.len());
            for future in futures {
                let output = future.await;
                let propagated = output.1.is_err();
                outputs.push(output);
                if propagated {
                    // `data` is already null, later mutations would have no visible effect
                    break;
                }
            }
            outputs
        }
    };

    let mut response_map = JsonMap::new();
    let mut propagate_null = false;
    for (response_key, result, mut field_errors) in outputs {
        errors.append(&mut field_errors);
        match result {
            Ok(value) => {
                response_map.insert(response_key.as_str(), value);
            }
            Err(PropagateNull) => propagate_null = true,
        }
    }
    if propagate_null {
        Err(PropagateNull)
    } else {
        Ok(response_map)
    }
}

/// <https://spec.graphql.org/October2021/#CollectFields()>
pub(crate) fn collect_fields<'a>(
    ctx: &ExecutionContext<'a>,
    object_type: &ObjectType,
    selections: impl IntoIterator<Item = &'a Selection>,
    visited_fragments: &mut HashSet<&'a Name>,
    grouped_fields: &mut IndexMap<&'a Name, Vec<&'a Node<Field>>>,
) {
    for selection in selections {
        if eval_if_arg(selection, "skip").unwrap_or(false)
            || !eval_if_arg(selection, "include").unwrap_or(true)
        {
            continue;
        }
        match selection {
            Selection::Field(field) => grouped_fields
                .entry(field.response_key())
                .or_default()
                .push(field),
            Selection::FragmentSpread(spread) => {
                let new = visited_fragments.insert(&spread.fragment_name);
                if !new {
                    continue;
                }
                let Some(fragment) = ctx.document.fragments.get(&spread.fragment_name) else {
                    continue;
                };
                if !does_fragment_type_apply(ctx.schema, object_type, &fragment.type_condition) {
                    continue;
                }
                collect_fields(
                    ctx,
                    object_type,
                    &fragment.selection_set,
                    visited_fragments,
                    grouped_fields,
                )
            }
            Selection::InlineFragment(inline) => {
                if let Some(condition) = &inline.type_condition {
                    if !does_fragment_type_apply(ctx.schema, object_type, condition) {
                        continue;
                    }
                }
                collect_fields(
                    ctx,
                    object_type,
                    &inline.selection_set,
                    visited_fragments,
                    grouped_fields,
                )
            }
        }
    }
}

/// <https://spec.graphql.org/October2021/#DoesFragmentTypeApply()>
fn does_fragment_type_apply(
    schema: &Schema,
    object_type: &ObjectType,
    fragment_type: &Name,
) -> bool {
    match schema.types.get(fragment_type) {
        Some(ExtendedType::Object(_)) => *fragment_type == object_type.name,
        Some(ExtendedType::Interface(_)) => {
            object_type.implements_interfaces.contains(fragment_type)
        }
        Some(ExtendedType::Union(def)) => def.members.contains(&object_type.name),
        // Undefined or not an output type: validation should have caught this
        _ => false,
    }
}

/// Variables are substituted at parse time, so a valid `if` argument is a boolean literal
fn eval_if_arg(selection: &Selection, directive_name: &str) -> Option<bool> {
    selection
        .directives()
        .get(directive_name)?
        .argument_by_name("if")?
        .to_bool()
}

/// <https://spec.graphql.org/October2021/#ExecuteField()>
async fn execute_field<'a>(
    ctx: &ExecutionContext<'a>,
    errors: &mut Vec<GraphQLError>,
    path: LinkedPath<'_>,
    object_type: &'a ObjectType,
    object_value: &ObjectValue,
    field_def: &'a FieldDefinition,
    fields: &[&'a Node<Field>],
    prefetched: Option<Result<ResolvedValue, FieldError>>,
) -> Result<JsonValue, PropagateNull> {
    let field = fields[0];
    let location = field.location();
    let resolved = match prefetched {
        Some(resolved) => resolved,
        None => {
            let arguments =
                match coerce_field_arguments(ctx.schema, &object_type.name, field_def, field) {
                    Ok(arguments) => arguments,
                    Err(error) => {
                        errors.push(ctx.input_coercion_error(error, path, location));
                        return try_nullify(&field_def.ty, Err(PropagateNull));
                    }
                };
            invoke_resolver(ctx, object_value, field_def, field, arguments).await
        }
    };
    let resolved = match resolved {
        Ok(ResolvedValue::Lazy(lazy)) if field_def.lazy => {
            if ctx.cancellation_token.is_cancelled() {
                Err(cancelled())
            } else {
                lazy.produce().await
            }
        }
        Ok(ResolvedValue::Lazy(_)) => Err(FieldError::new(format!(
            "Field {}.{} is not lazy but its resolver returned a lazy value",
            object_type.name, field_def.name
        ))),
        other => other,
    };
    let completed = match resolved {
        Ok(resolved) => {
            complete_value(
                ctx,
                errors,
                path,
                &field_def.ty,
                resolved,
                fields,
                Prefetched::new(),
            )
            .await
        }
        Err(error) => {
            errors.push(ctx.resolver_error(error, path, location));
            Err(PropagateNull)
        }
    };
    try_nullify(&field_def.ty, completed)
}

/// Calls the resolver of a field, its batch resolver with a single source,
/// or reads the field from a JSON parent value.
pub(crate) async fn invoke_resolver(
    ctx: &ExecutionContext<'_>,
    object_value: &ObjectValue,
    field_def: &FieldDefinition,
    field: &Node<Field>,
    arguments: Arc<JsonMap>,
) -> Result<ResolvedValue, FieldError> {
    if ctx.cancellation_token.is_cancelled() {
        return Err(cancelled());
    }
    if let Some(resolver) = &field_def.resolver {
        tracing::trace!(field = %field_def.name, "invoking resolver");
        let field_ctx = ctx.field_context(object_value.clone(), arguments, field);
        resolver.resolve(field_ctx).await
    } else if let Some(batch_resolver) = &field_def.batch_resolver {
        batch::resolve_single(ctx, batch_resolver.as_ref(), object_value, arguments, field).await
    } else {
        default_resolve(ctx.schema, object_value, field_def)
    }
}

/// Reads the property of the same name from a JSON parent value.
///
/// A non-JSON parent value is passed through as the value of a nested object field.
fn default_resolve(
    schema: &Schema,
    object_value: &ObjectValue,
    field_def: &FieldDefinition,
) -> Result<ResolvedValue, FieldError> {
    if let Some(json) = object_value.as_json() {
        let value = json
            .get(field_def.name.as_str())
            .cloned()
            .unwrap_or(JsonValue::Null);
        return Ok(ResolvedValue::Leaf(value));
    }
    match schema.types.get(field_def.ty.inner_named_type()) {
        Some(ExtendedType::Object(_)) if !field_def.ty.is_list() => {
            Ok(ResolvedValue::Object(object_value.untyped()))
        }
        _ => Err(FieldError::new(format!(
            "Field {} has no resolver and its parent value is not a JSON object",
            field_def.name
        ))),
    }
}

/// Try to insert a propagated null if possible, or keep propagating it.
///
/// <https://spec.graphql.org/October2021/#sec-Handling-Field-Errors>
pub(crate) fn try_nullify(
    ty: &Type,
    result: Result<JsonValue, PropagateNull>,
) -> Result<JsonValue, PropagateNull> {
    match result {
        Ok(json) => Ok(json),
        Err(PropagateNull) => {
            if ty.is_non_null() {
                Err(PropagateNull)
            } else {
                Ok(JsonValue::Null)
            }
        }
    }
}
