use crate::ast::DirectiveList;
use crate::ast::OperationDefinition;
use crate::ast::OperationType;
use crate::parser::grammar::directive;
use crate::parser::grammar::name;
use crate::parser::grammar::selection;
use crate::parser::grammar::value::Constness;
use crate::parser::grammar::variable;
use crate::parser::ParserState;
use crate::Node;
use crate::ParseError;
use crate::TokenKind;

/// See: https://spec.graphql.org/October2021/#OperationDefinition
///
/// *OperationDefinition*:
///    OperationType Name? VariableDefinitions? Directives? SelectionSet
///    SelectionSet
pub(crate) fn operation_definition(
    p: &mut ParserState,
) -> Result<Node<OperationDefinition>, ParseError> {
    let start = p.offset();
    if p.at(TokenKind::LCurly) {
        let selection_set = selection::selection_set(p)?;
        return Ok(Node::new_parsed(
            OperationDefinition {
                operation_type: OperationType::Query,
                name: None,
                variables: Vec::new(),
                directives: DirectiveList::default(),
                selection_set,
            },
            p.span_from(start),
        ));
    }

    let operation_type = operation_type(p)?;
    let name = if p.at(TokenKind::Name) {
        Some(name::name(p)?)
    } else {
        None
    };
    let variables = variable::variable_definitions(p)?;
    let directives = directive::directives(p, Constness::NotConst)?;
    let selection_set = selection::selection_set(p)?;
    Ok(Node::new_parsed(
        OperationDefinition {
            operation_type,
            name,
            variables,
            directives,
            selection_set,
        },
        p.span_from(start),
    ))
}

/// See: https://spec.graphql.org/October2021/#OperationType
///
/// *OperationType*: one of
///    **query**    **mutation**    **subscription**
fn operation_type(p: &mut ParserState) -> Result<OperationType, ParseError> {
    let operation_type = match p.peek_data() {
        "query" => OperationType::Query,
        "mutation" => OperationType::Mutation,
        "subscription" => OperationType::Subscription,
        _ => return Err(p.err("an Operation Type")),
    };
    p.bump()?;
    Ok(operation_type)
}
