use super::DiagnosticData;
use super::DiagnosticList;
use crate::ast::Field;
use crate::execution::coerce_field_arguments;
use crate::schema::FieldDefinition;
use crate::schema::Schema;
use crate::Name;
use crate::Node;
use crate::SourceSpan;
use std::collections::HashMap;

/// Checks the arguments given to a field, then coerces them.
///
/// Coercion fills the memo on the field node, so execution
/// does not coerce the same literals a second time.
pub(crate) fn validate_field_arguments(
    diagnostics: &mut DiagnosticList,
    schema: &Schema,
    parent_type: &Name,
    field_def: &FieldDefinition,
    field: &Node<Field>,
) {
    let coordinate = format!("{parent_type}.{}", field.name);
    let mut valid = true;
    let mut seen = HashMap::<&Name, Option<SourceSpan>>::new();
    for argument in &field.arguments {
        if let Some(&original_definition) = seen.get(&argument.name) {
            valid = false;
            diagnostics.push(
                argument.location(),
                DiagnosticData::UniqueArgument {
                    name: argument.name.clone(),
                    original_definition,
                },
            );
        } else {
            seen.insert(&argument.name, argument.location());
        }
        if !field_def.arguments.contains_key(&argument.name) {
            valid = false;
            diagnostics.push(
                argument.location(),
                DiagnosticData::UndefinedArgument {
                    name: argument.name.clone(),
                    coordinate: coordinate.clone(),
                },
            );
        }
    }
    for arg_def in field_def.arguments.values() {
        if arg_def.is_required() && !seen.contains_key(&arg_def.name) {
            valid = false;
            diagnostics.push(
                field.location(),
                DiagnosticData::RequiredArgument {
                    coordinate: format!("{coordinate}({}:)", arg_def.name),
                },
            );
        }
    }
    if valid {
        if let Err(error) = coerce_field_arguments(schema, parent_type, field_def, field) {
            diagnostics.push(
                error.location().or(field.location()),
                DiagnosticData::InvalidArgumentValue {
                    message: error.to_string(),
                },
            );
        }
    }
}
