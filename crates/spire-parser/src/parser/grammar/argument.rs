use crate::ast::Argument;
use crate::parser::grammar::name;
use crate::parser::grammar::value;
use crate::parser::grammar::value::Constness;
use crate::parser::ParserState;
use crate::Node;
use crate::ParseError;
use crate::TokenKind;

/// See: https://spec.graphql.org/October2021/#Arguments
///
/// *Arguments[Const]*:
///     **(** Argument[?Const]* **)**
pub(crate) fn arguments(
    p: &mut ParserState,
    constness: Constness,
) -> Result<Vec<Node<Argument>>, ParseError> {
    let mut arguments = Vec::new();
    if !p.eat(TokenKind::LParen)? {
        return Ok(arguments);
    }
    loop {
        arguments.push(argument(p, constness)?);
        if p.eat(TokenKind::RParen)? {
            return Ok(arguments);
        }
    }
}

/// See: https://spec.graphql.org/October2021/#Argument
///
/// *Argument[Const]*:
///     Name **:** Value[?Const]
fn argument(p: &mut ParserState, constness: Constness) -> Result<Node<Argument>, ParseError> {
    let start = p.offset();
    let name = name::name(p)?;
    p.expect(TokenKind::Colon, "`:`")?;
    let value = value::value(p, constness)?;
    Ok(Node::new_parsed(Argument { name, value }, p.span_from(start)))
}
