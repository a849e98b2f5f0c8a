use super::directive;
use super::field_merging::collect_fields_by_response_key;
use super::field_merging::FieldsByResponseKey;
use super::selection;
use super::DiagnosticData;
use super::DiagnosticList;
use crate::ast::DirectiveLocation;
use crate::ast::OperationDefinition;
use crate::ast::OperationType;
use crate::schema::Schema;
use crate::Document;
use crate::Node;
use std::collections::HashSet;

pub(crate) fn validate_operation(
    diagnostics: &mut DiagnosticList,
    schema: &Schema,
    document: &Document,
    operation: &Node<OperationDefinition>,
) {
    directive::validate_directives(
        diagnostics,
        schema,
        &operation.directives,
        operation.operation_type.into(),
    );
    for variable in &operation.variables {
        directive::validate_directives(
            diagnostics,
            schema,
            &variable.directives,
            DirectiveLocation::VariableDefinition,
        );
    }

    let Some(root) = schema.root_operation(operation.operation_type) else {
        diagnostics.push(
            operation.location(),
            DiagnosticData::UnsupportedOperation {
                operation_type: operation.operation_type.name(),
            },
        );
        return;
    };
    selection::validate_selection_set(diagnostics, schema, document, root, &operation.selection_set);

    if operation.operation_type == OperationType::Subscription {
        let mut fields = FieldsByResponseKey::new();
        collect_fields_by_response_key(
            schema,
            document,
            root,
            &operation.selection_set,
            &mut HashSet::new(),
            &mut fields,
        );
        let count = fields
            .values()
            .filter(|fields| fields[0].1.name != "__typename")
            .count();
        if count != 1 {
            let operation_name = match &operation.name {
                Some(name) => format!("`{name}`"),
                None => "operation".to_owned(),
            };
            diagnostics.push(
                operation.location(),
                DiagnosticData::SingleRootField {
                    operation: operation_name,
                    count,
                },
            )
        }
    }
}
