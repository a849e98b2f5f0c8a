use super::batch;
use super::engine::execute_selection_set;
use super::engine::try_nullify;
use super::engine::ExecutionContext;
use super::engine::ExecutionMode;
use super::engine::Prefetched;
use super::engine::PropagateNull;
use crate::ast::Field;
use crate::ast::Type;
use crate::resolver::FieldError;
use crate::resolver::ObjectValue;
use crate::resolver::ResolvedValue;
use crate::response::GraphQLError;
use crate::response::LinkedPath;
use crate::response::LinkedPathElement;
use crate::response::PathElement;
use crate::schema::ExtendedType;
use crate::schema::ObjectType;
use crate::schema::ScalarType;
use crate::schema::Schema;
use crate::JsonValue;
use crate::Node;
use async_recursion::async_recursion;
use futures::future::join_all;

/// <https://spec.graphql.org/October2021/#CompleteValue()>
///
/// Returns `Err` for a field error being propagated upwards to find a nullable place
#[async_recursion]
pub(crate) async fn complete_value<'a, 'b>(
    ctx: &'b ExecutionContext<'a>,
    errors: &'b mut Vec<GraphQLError>,
    path: LinkedPath<'b>,
    ty: &'a Type,
    resolved: ResolvedValue,
    fields: &'b [&'a Node<Field>],
    prefetched: Prefetched,
) -> Result<JsonValue, PropagateNull> {
    let location = fields[0].location();
    macro_rules! field_error {
        ($($arg: tt)+) => {
            {
                errors.push(ctx.field_error(format!($($arg)+), path, location));
                return Err(PropagateNull);
            }
        };
    }
    let resolved = match resolved {
        ResolvedValue::Leaf(JsonValue::Array(items)) if ty.is_list() => {
            ResolvedValue::List(items.into_iter().map(|item| Ok(ResolvedValue::Leaf(item))).collect())
        }
        resolved => resolved,
    };
    let resolved = match resolved {
        ResolvedValue::Leaf(JsonValue::Null) => {
            if ty.is_non_null() {
                field_error!("Non-null type {ty} resolved to null")
            } else {
                return Ok(JsonValue::Null);
            }
        }
        ResolvedValue::Lazy(_) => {
            field_error!("Resolver returned a lazy value nested in a value of type {ty}")
        }
        ResolvedValue::Stream(_) => {
            field_error!("Resolver returned a stream outside of a subscription root field")
        }
        ResolvedValue::List(items) => {
            let Some(item_ty) = ty.item_type() else {
                field_error!("Non-list type {ty} resolved to a list")
            };
            return complete_list(ctx, errors, path, item_ty, items, fields).await;
        }
        resolved if ty.is_list() => {
            field_error!("List type {ty} resolved to {}", resolved.describe())
        }
        resolved => resolved,
    };

    let ty_name = ty.inner_named_type();
    let Some(ty_def) = ctx.schema.types.get(ty_name) else {
        errors.push(ctx.suspected_validation_bug(
            format!("Undefined type {ty_name}"),
            path,
            location,
        ));
        return Err(PropagateNull);
    };
    let object_value = match (ty_def, resolved) {
        (ExtendedType::InputObject(_), _) => {
            errors.push(ctx.suspected_validation_bug(
                format!("Field with input object type {ty_name}"),
                path,
                location,
            ));
            return Err(PropagateNull);
        }
        (ExtendedType::Scalar(def), ResolvedValue::Leaf(json)) => {
            return match coerce_scalar_result(def, json) {
                Ok(json) => Ok(json),
                Err(message) => field_error!("{message}"),
            };
        }
        (ExtendedType::Enum(def), ResolvedValue::Leaf(json)) => {
            return match def.wire_name(&json) {
                Some(name) => Ok(name.as_str().into()),
                None => field_error!("Resolver returned {json}, expected enum {ty_name}"),
            };
        }
        (ExtendedType::Scalar(_) | ExtendedType::Enum(_), resolved) => {
            field_error!("Resolver returned {}, expected {ty_name}", resolved.describe())
        }
        (_, ResolvedValue::Leaf(JsonValue::Object(map))) => ObjectValue::json(map),
        (_, ResolvedValue::Object(value)) => value,
        (_, resolved) => field_error!(
            "Resolver returned {} but expected an object for type {ty_name}",
            resolved.describe()
        ),
    };
    let object_type = match resolve_object_type(ctx.schema, ty_def, &object_value) {
        Ok(object_type) => object_type,
        Err(message) => field_error!("{message}"),
    };
    execute_selection_set(
        ctx,
        errors,
        path,
        ExecutionMode::Normal,
        object_type,
        &object_value,
        fields
            .iter()
            .flat_map(|field| &field.selection_set)
            .collect(),
        prefetched,
    )
    .await
    .map(JsonValue::Object)
}

/// Items are completed concurrently, each into its own error list
/// so errors keep the order of the items.
async fn complete_list<'a>(
    ctx: &ExecutionContext<'a>,
    errors: &mut Vec<GraphQLError>,
    path: LinkedPath<'_>,
    item_ty: &'a Type,
    items: Vec<Result<ResolvedValue, FieldError>>,
    fields: &[&'a Node<Field>],
) -> Result<JsonValue, PropagateNull> {
    let (items, prefetched) = batch::prefetch_list(ctx, item_ty, items, fields).await;
    let futures = items
        .into_iter()
        .zip(prefetched)
        .enumerate()
        .map(|(index, (item, prefetched))| async move {
            let mut item_errors = Vec::new();
            let item_path = LinkedPathElement {
                element: PathElement::ListItem(index),
                next: path,
            };
            let result = match item {
                Ok(resolved) => {
                    complete_value(
                        ctx,
                        &mut item_errors,
                        Some(&item_path),
                        item_ty,
                        resolved,
                        fields,
                        prefetched,
                    )
                    .await
                }
                Err(error) => {
                    item_errors.push(ctx.resolver_error(
                        error,
                        Some(&item_path),
                        fields[0].location(),
                    ));
                    Err(PropagateNull)
                }
            };
            (try_nullify(item_ty, result), item_errors)
        });
    let mut completed = Vec::new();
    let mut propagate_null = false;
    for (result, mut item_errors) in join_all(futures).await {
        errors.append(&mut item_errors);
        match result {
            Ok(value) => completed.push(value),
            Err(PropagateNull) => propagate_null = true,
        }
    }
    if propagate_null {
        Err(PropagateNull)
    } else {
        Ok(JsonValue::Array(completed))
    }
}

/// Finds the concrete object type of a value returned for a composite type.
///
/// Values returned for an interface or union type must carry a runtime type name
/// naming one of its possible types.
pub(crate) fn resolve_object_type<'a>(
    schema: &'a Schema,
    ty_def: &'a ExtendedType,
    object_value: &ObjectValue,
) -> Result<&'a ObjectType, String> {
    let abstract_type = match ty_def {
        ExtendedType::Object(def) => return Ok(&**def),
        ExtendedType::Interface(def) => &def.name,
        ExtendedType::Union(def) => &def.name,
        ExtendedType::Scalar(_) | ExtendedType::Enum(_) | ExtendedType::InputObject(_) => {
            return Err(format!(
                "Expected an object, interface, or union type, found {} {}",
                ty_def.describe(),
                ty_def.name()
            ))
        }
    };
    let Some(type_name) = object_value.type_name() else {
        return Err(format!(
            "Resolver returned an object without a runtime type name for abstract type {abstract_type}"
        ));
    };
    let Some(def) = schema.get_object(type_name) else {
        return Err(format!(
            "Resolver returned an object of type {type_name} not defined in the schema"
        ));
    };
    if !schema.is_subtype(abstract_type, type_name) {
        return Err(format!(
            "Resolver returned an object of type {type_name} \
             which is not a possible type of {abstract_type}"
        ));
    }
    Ok(&**def)
}

/// <https://spec.graphql.org/October2021/#sec-Scalars.Result-Coercion-and-Serialization>
fn coerce_scalar_result(def: &ScalarType, json: JsonValue) -> Result<JsonValue, String> {
    let ty_name = &def.name;
    match ty_name.as_str() {
        "Int" => match json.as_i64() {
            Some(int) if i32::try_from(int).is_ok() => Ok(json),
            Some(_) => Err(format!("Resolver returned {json} which overflows Int")),
            None => Err(format!("Resolver returned {json}, expected Int")),
        },
        "Float" => match json.as_f64() {
            // Integers are accepted and serialized as floats
            Some(float) => Ok(float.into()),
            None => Err(format!("Resolver returned {json}, expected Float")),
        },
        "String" if json.is_string() => Ok(json),
        "Boolean" if json.is_boolean() => Ok(json),
        "ID" => match json.as_i64() {
            Some(int) => Ok(int.to_string().into()),
            None if json.is_string() => Ok(json),
            None => Err(format!("Resolver returned {json}, expected ID")),
        },
        "String" | "Boolean" => Err(format!("Resolver returned {json}, expected {ty_name}")),
        _ => match &def.coerce_result {
            Some(coerce) => coerce(&json)
                .map_err(|message| format!("Resolver returned {json}, invalid {ty_name}: {message}")),
            // Custom scalar without coercion: accept any value
            None => Ok(json),
        },
    }
}
