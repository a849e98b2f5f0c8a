use super::directive;
use super::selection;
use super::DiagnosticData;
use super::DiagnosticList;
use crate::ast::DirectiveLocation;
use crate::ast::FragmentDefinition;
use crate::ast::FragmentSpread;
use crate::ast::InlineFragment;
use crate::ast::Selection;
use crate::schema::Schema;
use crate::Document;
use crate::Name;
use crate::Node;
use crate::SourceSpan;
use std::collections::HashSet;

/// Returns whether some object type is a possible type of both `a` and `b`
fn types_overlap(schema: &Schema, a: &str, b: &str) -> bool {
    let possible_a = schema.possible_types(a);
    schema
        .possible_types(b)
        .iter()
        .any(|ty| possible_a.contains(ty))
}

/// Checks that a type condition names a composite type of the schema
fn validate_type_condition(
    diagnostics: &mut DiagnosticList,
    schema: &Schema,
    type_condition: &Name,
    location: Option<SourceSpan>,
) -> bool {
    match schema.types.get(type_condition) {
        Some(ty) if ty.is_composite() => true,
        Some(ty) => {
            diagnostics.push(
                location,
                DiagnosticData::InvalidFragmentTarget {
                    name: type_condition.clone(),
                    describe: ty.describe(),
                },
            );
            false
        }
        None => {
            diagnostics.push(
                location,
                DiagnosticData::UndefinedDefinition {
                    name: type_condition.clone(),
                },
            );
            false
        }
    }
}

pub(crate) fn validate_fragment_definitions(
    diagnostics: &mut DiagnosticList,
    schema: &Schema,
    document: &Document,
) {
    for fragment in document.fragments.values() {
        if document.unbound_fragments.contains(&fragment.name) {
            continue;
        }
        directive::validate_directives(
            diagnostics,
            schema,
            &fragment.directives,
            DirectiveLocation::FragmentDefinition,
        );
        if validate_type_condition(diagnostics, schema, &fragment.type_condition, fragment.location()) {
            selection::validate_selection_set(
                diagnostics,
                schema,
                document,
                &fragment.type_condition,
                &fragment.selection_set,
            );
        }
    }
}

pub(crate) fn validate_fragment_spread(
    diagnostics: &mut DiagnosticList,
    schema: &Schema,
    document: &Document,
    parent_type: &Name,
    spread: &Node<FragmentSpread>,
) {
    directive::validate_directives(
        diagnostics,
        schema,
        &spread.directives,
        DirectiveLocation::FragmentSpread,
    );
    let Some(fragment) = document.fragments.get(&spread.fragment_name) else {
        diagnostics.push(
            spread.location(),
            DiagnosticData::UndefinedFragment {
                name: spread.fragment_name.clone(),
            },
        );
        return;
    };
    // An invalid type condition is reported with the fragment definition
    let is_composite = schema
        .types
        .get(&fragment.type_condition)
        .is_some_and(|ty| ty.is_composite());
    if is_composite && !types_overlap(schema, parent_type, &fragment.type_condition) {
        diagnostics.push(
            spread.location(),
            DiagnosticData::InvalidFragmentSpread {
                fragment: format!("fragment `{}`", fragment.name),
                type_condition: fragment.type_condition.clone(),
                parent_type: parent_type.clone(),
            },
        )
    }
}

pub(crate) fn validate_inline_fragment(
    diagnostics: &mut DiagnosticList,
    schema: &Schema,
    document: &Document,
    parent_type: &Name,
    inline: &Node<InlineFragment>,
) {
    directive::validate_directives(
        diagnostics,
        schema,
        &inline.directives,
        DirectiveLocation::InlineFragment,
    );
    let ty = match &inline.type_condition {
        Some(type_condition) => {
            if !validate_type_condition(diagnostics, schema, type_condition, inline.location()) {
                return;
            }
            if !types_overlap(schema, parent_type, type_condition) {
                diagnostics.push(
                    inline.location(),
                    DiagnosticData::InvalidFragmentSpread {
                        fragment: "inline fragment".to_owned(),
                        type_condition: type_condition.clone(),
                        parent_type: parent_type.clone(),
                    },
                )
            }
            type_condition
        }
        None => parent_type,
    };
    selection::validate_selection_set(diagnostics, schema, document, ty, &inline.selection_set)
}

/// Returns the fragments that reference themselves, directly or through other fragments
pub(crate) fn find_cycles(document: &Document) -> Vec<&Node<FragmentDefinition>> {
    document
        .fragments
        .values()
        .filter(|fragment| {
            let mut visited = HashSet::new();
            references_fragment(document, &fragment.selection_set, &fragment.name, &mut visited)
        })
        .collect()
}

fn references_fragment<'doc>(
    document: &'doc Document,
    selection_set: &'doc [Selection],
    target: &Name,
    visited: &mut HashSet<&'doc Name>,
) -> bool {
    selection_set.iter().any(|selection| match selection {
        Selection::Field(field) => {
            references_fragment(document, &field.selection_set, target, visited)
        }
        Selection::InlineFragment(inline) => {
            references_fragment(document, &inline.selection_set, target, visited)
        }
        Selection::FragmentSpread(spread) => {
            if spread.fragment_name == *target {
                return true;
            }
            if !visited.insert(&spread.fragment_name) {
                return false;
            }
            document
                .fragments
                .get(&spread.fragment_name)
                .is_some_and(|fragment| {
                    references_fragment(document, &fragment.selection_set, target, visited)
                })
        }
    })
}

/// Reports fragments that reference themselves. Returns whether there are any.
pub(crate) fn validate_fragment_cycles(diagnostics: &mut DiagnosticList, document: &Document) -> bool {
    let cycles = find_cycles(document);
    for fragment in &cycles {
        diagnostics.push(
            fragment.location(),
            DiagnosticData::RecursiveFragmentDefinition {
                name: fragment.name.clone(),
            },
        )
    }
    !cycles.is_empty()
}

/// Reports fragments no operation reaches, directly or through other fragments
pub(crate) fn validate_fragments_used(diagnostics: &mut DiagnosticList, document: &Document) {
    let mut used = HashSet::new();
    for operation in &document.operations {
        collect_spreads(document, &operation.selection_set, &mut used);
    }
    for fragment in document.fragments.values() {
        if !used.contains(&fragment.name) {
            diagnostics.push(
                fragment.location(),
                DiagnosticData::UnusedFragment {
                    name: fragment.name.clone(),
                },
            )
        }
    }
}

fn collect_spreads<'doc>(
    document: &'doc Document,
    selection_set: &'doc [Selection],
    used: &mut HashSet<&'doc Name>,
) {
    for selection in selection_set {
        match selection {
            Selection::Field(field) => collect_spreads(document, &field.selection_set, used),
            Selection::InlineFragment(inline) => {
                collect_spreads(document, &inline.selection_set, used)
            }
            Selection::FragmentSpread(spread) => {
                if used.insert(&spread.fragment_name) {
                    if let Some(fragment) = document.fragments.get(&spread.fragment_name) {
                        collect_spreads(document, &fragment.selection_set, used)
                    }
                }
            }
        }
    }
}
