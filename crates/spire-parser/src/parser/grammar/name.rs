use crate::parser::ParserState;
use crate::Name;
use crate::ParseError;
use crate::TokenKind;

/// See: https://spec.graphql.org/October2021/#Name
///
/// *Name*:
///     [_A-Za-z][_0-9A-Za-z]*
pub(crate) fn name(p: &mut ParserState) -> Result<Name, ParseError> {
    let token = p.expect(TokenKind::Name, "a Name")?;
    // The lexer only produces valid names
    Ok(Name::new_unchecked(token.data()))
}
