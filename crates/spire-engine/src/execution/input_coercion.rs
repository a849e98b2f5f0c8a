use crate::ast::Field;
use crate::ast::Type;
use crate::ast::Value;
use crate::schema::ExtendedType;
use crate::schema::FieldDefinition;
use crate::schema::Schema;
use crate::validation::SuspectedValidationBug;
use crate::JsonMap;
use crate::JsonValue;
use crate::Node;
use crate::SourceSpan;
use std::sync::Arc;

/// A literal in a query could not be coerced to the input type it is given for.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputCoercionError {
    #[error("{message}")]
    ValueError {
        message: String,
        location: Option<SourceSpan>,
    },
    #[error(transparent)]
    SuspectedValidationBug(SuspectedValidationBug),
}

impl InputCoercionError {
    pub fn location(&self) -> Option<SourceSpan> {
        match self {
            Self::ValueError { location, .. } => *location,
            Self::SuspectedValidationBug(bug) => bug.location,
        }
    }

    fn in_argument(self, coordinate: &str) -> Self {
        match self {
            Self::ValueError { message, location } => Self::ValueError {
                message: format!("invalid value for argument `{coordinate}`: {message}"),
                location,
            },
            bug @ Self::SuspectedValidationBug(_) => bug,
        }
    }
}

macro_rules! validation_bug {
    ($location: expr, $($arg: tt)+) => {
        return Err(InputCoercionError::SuspectedValidationBug(SuspectedValidationBug {
            message: format!($($arg)+),
            location: $location,
        }))
    };
}

/// Returns the arguments of `field` coerced against its definition,
/// coercing them on first use and reusing the memoized map afterwards.
///
/// Only fields of object types are memoized: an interface field definition
/// may lack arguments or defaults that its implementations add.
pub(crate) fn coerce_field_arguments(
    schema: &Schema,
    type_name: &str,
    field_def: &FieldDefinition,
    field: &Node<Field>,
) -> Result<Arc<JsonMap>, InputCoercionError> {
    let coerce = || coerce_argument_values(schema, type_name, field_def, field);
    match schema.get_object(type_name) {
        Some(object_type) => field
            .coerced_arguments
            .get_or_try_init(&object_type.name, coerce),
        None => coerce().map(Arc::new),
    }
}

/// <https://spec.graphql.org/October2021/#sec-Coercing-Field-Arguments>
pub fn coerce_argument_values(
    schema: &Schema,
    type_name: &str,
    field_def: &FieldDefinition,
    field: &Node<Field>,
) -> Result<JsonMap, InputCoercionError> {
    let mut coerced_values = JsonMap::new();
    for argument in &field.arguments {
        if !field_def.arguments.contains_key(&argument.name) {
            validation_bug!(
                argument.value.location(),
                "unexpected argument `{}` for `{type_name}.{}`",
                argument.name,
                field_def.name
            )
        }
    }
    for arg_def in field_def.arguments.values() {
        let coordinate = format!("{type_name}.{}({}:)", field_def.name, arg_def.name);
        if let Some(value) = field.argument_by_name(&arg_def.name) {
            let value = coerce_input_value(schema, &arg_def.ty, value)
                .map_err(|error| error.in_argument(&coordinate))?;
            coerced_values.insert(arg_def.name.as_str(), value);
        } else if let Some(default) = &arg_def.default_value {
            coerced_values.insert(arg_def.name.as_str(), default.clone());
        } else if arg_def.ty.is_non_null() {
            return Err(InputCoercionError::ValueError {
                message: format!("the required argument `{coordinate}` is not provided"),
                location: field.location(),
            });
        }
    }
    Ok(coerced_values)
}

/// <https://spec.graphql.org/October2021/#sec-Input-Values>
pub(crate) fn coerce_input_value(
    schema: &Schema,
    ty: &Type,
    value: &Node<Value>,
) -> Result<JsonValue, InputCoercionError> {
    let location = value.location();
    let mismatch = |ty: &Type| InputCoercionError::ValueError {
        message: format!("expected a value of type `{ty}`, found `{value}`"),
        location,
    };
    match value.as_ref() {
        Value::Null if ty.is_non_null() => return Err(mismatch(ty)),
        Value::Null => return Ok(JsonValue::Null),
        Value::Variable(name) => validation_bug!(location, "unsubstituted variable `${name}`"),
        _ => {}
    }
    let ty_name = match ty {
        Type::List(item_ty) | Type::NonNullList(item_ty) => {
            return if let Value::List(items) = value.as_ref() {
                items
                    .iter()
                    .map(|item| coerce_input_value(schema, item_ty, item))
                    .collect::<Result<_, _>>()
                    .map(JsonValue::Array)
            } else {
                // A single value is coerced to a list of one item
                Ok(JsonValue::Array(vec![coerce_input_value(schema, item_ty, value)?]))
            };
        }
        Type::Named(ty_name) | Type::NonNullNamed(ty_name) => ty_name,
    };
    let Some(ty_def) = schema.types.get(ty_name) else {
        validation_bug!(location, "undefined type `{ty_name}`")
    };
    match ty_def {
        ExtendedType::Scalar(def) => {
            let coerced = match (ty_name.as_str(), value.as_ref()) {
                ("Int", Value::Int(int)) => int.try_to_i32().map(JsonValue::from).map_err(|_| {
                    InputCoercionError::ValueError {
                        message: format!(
                            "Int cannot represent non 32-bit signed integer value: {int}"
                        ),
                        location,
                    }
                })?,
                ("Float", Value::Int(_) | Value::Float(_)) => match value.to_f64() {
                    Some(float) if float.is_finite() => JsonValue::from(float),
                    _ => {
                        return Err(InputCoercionError::ValueError {
                            message: format!(
                                "Float cannot represent non-finite 64-bit floating point value: {value}"
                            ),
                            location,
                        })
                    }
                },
                ("String" | "ID", Value::String(string)) => JsonValue::from(string.as_str()),
                ("ID", Value::Int(int)) => JsonValue::from(int.as_str()),
                ("Boolean", Value::Boolean(boolean)) => JsonValue::from(*boolean),
                _ if def.is_built_in() => return Err(mismatch(ty)),
                _ => {
                    let json = graphql_value_to_json(value)?;
                    match &def.coerce_input {
                        Some(coerce) => coerce(&json).map_err(|message| {
                            InputCoercionError::ValueError {
                                message: format!("invalid value for scalar `{ty_name}`: {message}"),
                                location,
                            }
                        })?,
                        None => json,
                    }
                }
            };
            Ok(coerced)
        }
        ExtendedType::Enum(def) => {
            // Substituted variables arrive as strings
            let wire_name = match value.as_ref() {
                Value::Enum(name) => Some(name.as_str()),
                Value::String(string) => Some(string.as_str()),
                _ => None,
            };
            wire_name
                .and_then(|name| def.host_value(name))
                .cloned()
                .ok_or_else(|| mismatch(ty))
        }
        ExtendedType::InputObject(def) => {
            let Value::Object(fields) = value.as_ref() else {
                return Err(mismatch(ty));
            };
            if let Some((name, field_value)) = fields
                .iter()
                .find(|(name, _)| !def.fields.contains_key(name))
            {
                return Err(InputCoercionError::ValueError {
                    message: format!("input object type `{ty_name}` has no field `{name}`"),
                    location: field_value.location(),
                });
            }
            let mut object = JsonMap::new();
            for field_def in def.fields.values() {
                if let Some((_, field_value)) = fields.iter().find(|(name, _)| *name == field_def.name) {
                    let coerced = coerce_input_value(schema, &field_def.ty, field_value)?;
                    object.insert(field_def.name.as_str(), coerced);
                } else if let Some(default) = &field_def.default_value {
                    object.insert(field_def.name.as_str(), default.clone());
                } else if field_def.ty.is_non_null() {
                    return Err(InputCoercionError::ValueError {
                        message: format!(
                            "the required field `{ty_name}.{}` is not provided",
                            field_def.name
                        ),
                        location,
                    });
                }
            }
            Ok(JsonValue::Object(object))
        }
        ExtendedType::Object(_) | ExtendedType::Interface(_) | ExtendedType::Union(_) => {
            validation_bug!(location, "`{ty_name}` is not an input type")
        }
    }
}

/// Converts a literal to JSON without a type to coerce it to, for custom scalars
fn graphql_value_to_json(value: &Node<Value>) -> Result<JsonValue, InputCoercionError> {
    Ok(match value.as_ref() {
        Value::Null => JsonValue::Null,
        Value::Variable(name) => validation_bug!(value.location(), "unsubstituted variable `${name}`"),
        Value::Enum(name) => JsonValue::from(name.as_str()),
        Value::String(string) => JsonValue::from(string.as_str()),
        Value::Boolean(boolean) => JsonValue::from(*boolean),
        Value::Int(int) => match int.as_str().parse::<i64>() {
            Ok(int) => JsonValue::from(int),
            Err(_) => value.to_f64().map_or(JsonValue::Null, JsonValue::from),
        },
        Value::Float(float) => float.try_to_f64().map_or(JsonValue::Null, JsonValue::from),
        Value::List(items) => JsonValue::Array(
            items
                .iter()
                .map(graphql_value_to_json)
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(fields) => JsonValue::Object(
            fields
                .iter()
                .map(|(name, value)| Ok((name.as_str().into(), graphql_value_to_json(value)?)))
                .collect::<Result<_, _>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name;
    use crate::schema::EnumType;
    use crate::schema::InputObjectType;
    use crate::schema::InputValueDefinition;
    use crate::schema::ObjectType;
    use crate::schema::ScalarType;
    use crate::Document;
    use serde_json_bytes::json;

    fn schema() -> Schema {
        let named = |name| Type::Named(name);
        Schema::builder()
            .object(
                ObjectType::new(name!("Query")).field(
                    FieldDefinition::new(name!("search"), named(name!("String")))
                        .argument(InputValueDefinition::new(
                            name!("limit"),
                            named(name!("Int")).non_null(),
                        ))
                        .argument(
                            InputValueDefinition::new(name!("offset"), named(name!("Int")))
                                .default_value(0),
                        )
                        .argument(InputValueDefinition::new(
                            name!("ids"),
                            named(name!("ID")).non_null().list(),
                        ))
                        .argument(InputValueDefinition::new(name!("order"), named(name!("Order"))))
                        .argument(InputValueDefinition::new(name!("filter"), named(name!("Filter"))))
                        .argument(InputValueDefinition::new(name!("at"), named(name!("Date")))),
                ),
            )
            .enum_type(
                EnumType::new(name!("Order"))
                    .value_with_host(name!("ASC"), 1)
                    .value_with_host(name!("DESC"), -1),
            )
            .input_object(
                InputObjectType::new(name!("Filter"))
                    .field(InputValueDefinition::new(
                        name!("text"),
                        named(name!("String")).non_null(),
                    ))
                    .field(
                        InputValueDefinition::new(name!("exact"), named(name!("Boolean")))
                            .default_value(false),
                    ),
            )
            .scalar(ScalarType::new(name!("Date")).coerce_input(|json| {
                json.as_str()
                    .filter(|date| date.len() == 10)
                    .map(|date| JsonValue::from(date.replace('-', "")))
                    .ok_or_else(|| "expected YYYY-MM-DD".to_owned())
            }))
            .build()
            .unwrap()
    }

    fn coerce(query: &str) -> Result<JsonMap, InputCoercionError> {
        let schema = schema();
        let document = Document::parse(query, &JsonMap::new()).unwrap();
        let field = document.operations[0].selection_set[0].as_field().unwrap();
        let field_def = schema.type_field("Query", "search").unwrap();
        coerce_argument_values(&schema, "Query", field_def, field)
    }

    #[test]
    fn coerces_with_defaults() {
        let coerced = coerce(
            r#"{ search(limit: 10, ids: 7, order: DESC, filter: { text: "a" }, at: "2024-01-31") }"#,
        )
        .unwrap();
        assert_eq!(
            JsonValue::Object(coerced),
            json!({
                "limit": 10,
                "offset": 0,
                "ids": ["7"],
                "order": -1,
                "filter": {"text": "a", "exact": false},
                "at": "20240131",
            })
        );
    }

    #[test]
    fn reports_invalid_values() {
        let message = |query| coerce(query).unwrap_err().to_string();
        assert_eq!(
            message("{ search }"),
            "the required argument `Query.search(limit:)` is not provided"
        );
        assert_eq!(
            message("{ search(limit: null) }"),
            "invalid value for argument `Query.search(limit:)`: \
             expected a value of type `Int!`, found `null`"
        );
        assert_eq!(
            message("{ search(limit: 3000000000) }"),
            "invalid value for argument `Query.search(limit:)`: \
             Int cannot represent non 32-bit signed integer value: 3000000000"
        );
        assert_eq!(
            message("{ search(limit: 1, order: UP) }"),
            "invalid value for argument `Query.search(order:)`: \
             expected a value of type `Order`, found `UP`"
        );
        assert_eq!(
            message("{ search(limit: 1, filter: { text: \"a\", fuzzy: true }) }"),
            "invalid value for argument `Query.search(filter:)`: \
             input object type `Filter` has no field `fuzzy`"
        );
        assert_eq!(
            message("{ search(limit: 1, filter: {}) }"),
            "invalid value for argument `Query.search(filter:)`: \
             the required field `Filter.text` is not provided"
        );
        assert_eq!(
            message("{ search(limit: 1, at: \"tomorrow\") }"),
            "invalid value for argument `Query.search(at:)`: \
             invalid value for scalar `Date`: expected YYYY-MM-DD"
        );
    }

    #[test]
    fn memoizes_successful_coercion() {
        let schema = schema();
        let document = Document::parse("{ search(limit: 1) }", &JsonMap::new()).unwrap();
        let field = document.operations[0].selection_set[0].as_field().unwrap();
        let field_def = schema.type_field("Query", "search").unwrap();
        assert!(field.coerced_arguments.get("Query").is_none());
        let first = coerce_field_arguments(&schema, "Query", field_def, field).unwrap();
        let second = coerce_field_arguments(&schema, "Query", field_def, field).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(field.coerced_arguments.get("Query").is_some());
        assert!(field.coerced_arguments.get("Mutation").is_none());
    }
}
