//! Fields selected with the same response key must be mergeable:
//! when their parent types may be the same object type at runtime,
//! they select the same field with the same arguments.
//!
//! Fields on parent types that can never be the same object type are not
//! compared. In particular the "same response shape" rule of
//! [`FieldsInSetCanMerge`] is not checked for them, so `... on Dog { x: name }`
//! and `... on Cat { x: meows }` are accepted.
//!
//! [`FieldsInSetCanMerge`]: https://spec.graphql.org/October2021/#FieldsInSetCanMerge()

use super::DiagnosticData;
use super::DiagnosticList;
use crate::ast::Argument;
use crate::ast::Field;
use crate::ast::Selection;
use crate::schema::Schema;
use crate::Document;
use crate::Name;
use crate::Node;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Fields by response key, each with the type it is selected on
pub(crate) type FieldsByResponseKey<'a> = IndexMap<&'a Name, Vec<(&'a Name, &'a Node<Field>)>>;

/// Collects fields by response key through fragments, ignoring `@skip` and `@include`.
///
/// Fragments with an undefined type condition keep the parent type,
/// so their fields are still compared.
pub(crate) fn collect_fields_by_response_key<'a>(
    schema: &'a Schema,
    document: &'a Document,
    parent_type: &'a Name,
    selection_set: &'a [Selection],
    visited_fragments: &mut HashSet<&'a Name>,
    fields: &mut FieldsByResponseKey<'a>,
) {
    for selection in selection_set {
        match selection {
            Selection::Field(field) => fields
                .entry(field.response_key())
                .or_default()
                .push((parent_type, field)),
            Selection::InlineFragment(inline) => {
                let ty = inline
                    .type_condition
                    .as_ref()
                    .filter(|ty| schema.types.contains_key(*ty))
                    .unwrap_or(parent_type);
                collect_fields_by_response_key(
                    schema,
                    document,
                    ty,
                    &inline.selection_set,
                    visited_fragments,
                    fields,
                )
            }
            Selection::FragmentSpread(spread) => {
                if !visited_fragments.insert(&spread.fragment_name) {
                    continue;
                }
                let Some(fragment) = document.fragments.get(&spread.fragment_name) else {
                    continue;
                };
                let ty = Some(&fragment.type_condition)
                    .filter(|ty| schema.types.contains_key(*ty))
                    .unwrap_or(parent_type);
                collect_fields_by_response_key(
                    schema,
                    document,
                    ty,
                    &fragment.selection_set,
                    visited_fragments,
                    fields,
                )
            }
        }
    }
}

/// Checks a selection set and, recursively, the merged selection sets of its fields.
///
/// Must not be called when fragments reference themselves.
pub(crate) fn validate_field_merging(
    diagnostics: &mut DiagnosticList,
    schema: &Schema,
    document: &Document,
    parent_type: &Name,
    selection_set: &[Selection],
) {
    let mut fields = FieldsByResponseKey::new();
    collect_fields_by_response_key(
        schema,
        document,
        parent_type,
        selection_set,
        &mut HashSet::new(),
        &mut fields,
    );
    validate_fields_by_response_key(diagnostics, schema, document, fields)
}

fn validate_fields_by_response_key<'a>(
    diagnostics: &mut DiagnosticList,
    schema: &'a Schema,
    document: &'a Document,
    fields: FieldsByResponseKey<'a>,
) {
    for (response_key, fields) in fields {
        let (first_parent, first) = fields[0];
        let conflict = fields[1..].iter().find(|(parent, field)| {
            let parents_may_be_equal = *parent == first_parent
                || !is_object(schema, first_parent)
                || !is_object(schema, parent);
            parents_may_be_equal
                && (field.name != first.name || !same_arguments(&field.arguments, &first.arguments))
        });
        if let Some((_, field)) = conflict {
            diagnostics.push(
                field.location(),
                DiagnosticData::ConflictingField {
                    response_key: response_key.clone(),
                    first: signature(first),
                    second: signature(field),
                    first_location: first.location(),
                },
            );
            // Sub-selections of conflicting fields would only add noise
            continue;
        }

        let mut sub_fields = FieldsByResponseKey::new();
        for &(parent, field) in &fields {
            if field.selection_set.is_empty() {
                continue;
            }
            let Some(field_def) = schema.type_field(parent, &field.name) else {
                continue;
            };
            // Fragments are expanded again for each field: they may apply to different types
            collect_fields_by_response_key(
                schema,
                document,
                field_def.ty.inner_named_type(),
                &field.selection_set,
                &mut HashSet::new(),
                &mut sub_fields,
            );
        }
        if !sub_fields.is_empty() {
            validate_fields_by_response_key(diagnostics, schema, document, sub_fields)
        }
    }
}

fn is_object(schema: &Schema, name: &str) -> bool {
    schema.types.get(name).is_some_and(|ty| ty.is_object())
}

fn same_arguments(a: &[Node<Argument>], b: &[Node<Argument>]) -> bool {
    a.len() == b.len()
        && a.iter().all(|arg| {
            b.iter()
                .any(|other| other.name == arg.name && other.value == arg.value)
        })
}

/// `name(arg: value)`, as the field was written without its alias
fn signature(field: &Field) -> String {
    if field.arguments.is_empty() {
        return field.name.to_string();
    }
    let arguments = field
        .arguments
        .iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}({arguments})", field.name)
}
