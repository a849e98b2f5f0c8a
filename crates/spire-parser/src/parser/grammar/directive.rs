use crate::ast::Directive;
use crate::ast::DirectiveList;
use crate::parser::grammar::argument;
use crate::parser::grammar::name;
use crate::parser::grammar::value::Constness;
use crate::parser::ParserState;
use crate::Node;
use crate::ParseError;
use crate::TokenKind;

/// See: https://spec.graphql.org/October2021/#Directives
///
/// *Directives[Const]*:
///     Directive[?Const]*
pub(crate) fn directives(
    p: &mut ParserState,
    constness: Constness,
) -> Result<DirectiveList, ParseError> {
    let mut directives = Vec::new();
    while p.at(TokenKind::At) {
        directives.push(directive(p, constness)?);
    }
    Ok(DirectiveList(directives))
}

/// See: https://spec.graphql.org/October2021/#Directive
///
/// *Directive[Const]*:
///     **@** Name Arguments[?Const]?
fn directive(p: &mut ParserState, constness: Constness) -> Result<Node<Directive>, ParseError> {
    let start = p.offset();
    p.bump()?;
    let name = name::name(p)?;
    let arguments = argument::arguments(p, constness)?;
    Ok(Node::new_parsed(
        Directive { name, arguments },
        p.span_from(start),
    ))
}
