use super::arguments;
use super::directive;
use super::selection;
use super::DiagnosticData;
use super::DiagnosticList;
use crate::ast::DirectiveLocation;
use crate::ast::Field;
use crate::schema::Schema;
use crate::Document;
use crate::Name;
use crate::Node;

pub(crate) fn validate_field(
    diagnostics: &mut DiagnosticList,
    schema: &Schema,
    document: &Document,
    parent_type: &Name,
    field: &Node<Field>,
) {
    directive::validate_directives(diagnostics, schema, &field.directives, DirectiveLocation::Field);

    if field.name == "__typename" {
        // Valid on every composite type, takes no arguments
        for argument in &field.arguments {
            diagnostics.push(
                argument.location(),
                DiagnosticData::UndefinedArgument {
                    name: argument.name.clone(),
                    coordinate: format!("{parent_type}.__typename"),
                },
            )
        }
        if !field.selection_set.is_empty() {
            diagnostics.push(
                field.location(),
                DiagnosticData::SubselectionOnLeaf {
                    field: field.name.clone(),
                    ty: Name::new_unchecked("String"),
                },
            )
        }
        return;
    }

    let Some(field_def) = schema.type_field(parent_type, &field.name) else {
        diagnostics.push(
            field.location(),
            DiagnosticData::UndefinedField {
                field: field.name.clone(),
                type_name: parent_type.clone(),
            },
        );
        return;
    };

    arguments::validate_field_arguments(diagnostics, schema, parent_type, field_def, field);

    let ty = field_def.ty.inner_named_type();
    // Undefined field types are rejected when the schema is built
    let Some(ty_def) = schema.types.get(ty) else {
        return;
    };
    if ty_def.is_leaf() {
        if !field.selection_set.is_empty() {
            diagnostics.push(
                field.location(),
                DiagnosticData::SubselectionOnLeaf {
                    field: field.name.clone(),
                    ty: ty.clone(),
                },
            )
        }
    } else if field.selection_set.is_empty() {
        diagnostics.push(
            field.location(),
            DiagnosticData::MissingSubselection {
                field: field.name.clone(),
                ty: ty.clone(),
            },
        )
    } else {
        selection::validate_selection_set(diagnostics, schema, document, ty, &field.selection_set)
    }
}
