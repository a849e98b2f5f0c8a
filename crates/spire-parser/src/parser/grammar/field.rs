use crate::ast::CoercedArguments;
use crate::ast::Field;
use crate::parser::grammar::argument;
use crate::parser::grammar::directive;
use crate::parser::grammar::name;
use crate::parser::grammar::selection;
use crate::parser::grammar::value::Constness;
use crate::parser::ParserState;
use crate::Node;
use crate::ParseError;
use crate::TokenKind;

/// See: https://spec.graphql.org/October2021/#Field
///
/// *Field*:
///     Alias? Name Arguments? Directives? SelectionSet?
///
/// *Alias*:
///     Name **:**
pub(crate) fn field(p: &mut ParserState) -> Result<Node<Field>, ParseError> {
    let start = p.offset();
    let mut alias = None;
    let mut name = name::name(p)?;
    if p.eat(TokenKind::Colon)? {
        alias = Some(name);
        name = name::name(p)?;
    }
    let arguments = argument::arguments(p, Constness::NotConst)?;
    let directives = directive::directives(p, Constness::NotConst)?;
    let selection_set = if p.at(TokenKind::LCurly) {
        selection::selection_set(p)?
    } else {
        Vec::new()
    };
    Ok(Node::new_parsed(
        Field {
            alias,
            name,
            arguments,
            directives,
            selection_set,
            coerced_arguments: CoercedArguments::default(),
        },
        p.span_from(start),
    ))
}
