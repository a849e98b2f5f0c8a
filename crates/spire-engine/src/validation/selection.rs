use super::field;
use super::fragment;
use super::DiagnosticList;
use crate::ast::Selection;
use crate::schema::Schema;
use crate::Document;
use crate::Name;

/// Validates each selection selected on `parent_type`, which must be a defined composite type.
///
/// Fragment definitions reached through spreads are validated on their own.
pub(crate) fn validate_selection_set(
    diagnostics: &mut DiagnosticList,
    schema: &Schema,
    document: &Document,
    parent_type: &Name,
    selection_set: &[Selection],
) {
    for selection in selection_set {
        match selection {
            Selection::Field(field) => {
                field::validate_field(diagnostics, schema, document, parent_type, field)
            }
            Selection::FragmentSpread(spread) => {
                fragment::validate_fragment_spread(diagnostics, schema, document, parent_type, spread)
            }
            Selection::InlineFragment(inline) => {
                fragment::validate_inline_fragment(diagnostics, schema, document, parent_type, inline)
            }
        }
    }
}
