//! Validation of executable documents against a [`Schema`].
//!
//! Every rule runs and every violation is collected,
//! so a single call reports all the problems of a document.

mod arguments;
mod diagnostics;
mod directive;
mod field;
mod field_merging;
mod fragment;
mod operation;
mod selection;

pub use self::diagnostics::DiagnosticData;
pub use self::diagnostics::DiagnosticList;
pub use self::diagnostics::ValidationError;
use crate::ast::Selection;
use crate::schema::Schema;
use crate::Document;
use crate::Name;
use crate::SourceSpan;

/// An error found during execution that validation should have prevented.
///
/// Reported with [`EXTENSION_VALIDATION_SHOULD_HAVE_CAUGHT_THIS`][crate::response::EXTENSION_VALIDATION_SHOULD_HAVE_CAUGHT_THIS]
/// so it stands out from ordinary field errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct SuspectedValidationBug {
    pub message: String,
    pub location: Option<SourceSpan>,
}

/// Checks `document` against `schema`, returning every violation found.
///
/// A document that passes can be executed without request errors
/// other than those about operation selection.
pub fn validate(schema: &Schema, document: &Document) -> Result<(), DiagnosticList> {
    let mut diagnostics = DiagnosticList::new(document.source.clone());
    let has_cycles = fragment::validate_fragment_cycles(&mut diagnostics, document);
    for operation in &document.operations {
        // Its variables are not substituted: selecting it is a request error
        let unbound = operation
            .name
            .as_ref()
            .is_some_and(|name| document.unbound_operations.contains_key(name));
        if unbound {
            continue;
        }
        operation::validate_operation(&mut diagnostics, schema, document, operation);
        if !has_cycles {
            if let Some(root) = schema.root_operation(operation.operation_type) {
                field_merging::validate_field_merging(
                    &mut diagnostics,
                    schema,
                    document,
                    root,
                    &operation.selection_set,
                );
            }
        }
    }
    fragment::validate_fragment_definitions(&mut diagnostics, schema, document);
    fragment::validate_fragments_used(&mut diagnostics, document);
    finish(diagnostics)
}

/// Checks a selection set selected on `root_type`, and the fragments it spreads,
/// without requiring it to belong to an operation of `document`.
pub fn validate_selection_set(
    schema: &Schema,
    document: &Document,
    root_type: &Name,
    selection_set: &[Selection],
) -> Result<(), DiagnosticList> {
    let mut diagnostics = DiagnosticList::new(document.source.clone());
    match schema.types.get(root_type) {
        Some(ty) if ty.is_composite() => {
            selection::validate_selection_set(
                &mut diagnostics,
                schema,
                document,
                root_type,
                selection_set,
            );
            if fragment::find_cycles(document).is_empty() {
                field_merging::validate_field_merging(
                    &mut diagnostics,
                    schema,
                    document,
                    root_type,
                    selection_set,
                );
            }
        }
        Some(ty) => diagnostics.push(
            None,
            DiagnosticData::InvalidFragmentTarget {
                name: root_type.clone(),
                describe: ty.describe(),
            },
        ),
        None => diagnostics.push(
            None,
            DiagnosticData::UndefinedDefinition {
                name: root_type.clone(),
            },
        ),
    }
    finish(diagnostics)
}

fn finish(diagnostics: DiagnosticList) -> Result<(), DiagnosticList> {
    let result = diagnostics.into_result();
    if let Err(diagnostics) = &result {
        tracing::debug!(errors = diagnostics.len(), "document failed validation");
    }
    result
}
