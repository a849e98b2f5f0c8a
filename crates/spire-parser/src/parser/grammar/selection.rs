use crate::ast::Selection;
use crate::parser::grammar::field;
use crate::parser::grammar::fragment;
use crate::parser::ParserState;
use crate::ParseError;
use crate::TokenKind;

/// See: https://spec.graphql.org/October2021/#SelectionSet
///
/// *SelectionSet*:
///     **{** Selection* **}**
pub(crate) fn selection_set(p: &mut ParserState) -> Result<Vec<Selection>, ParseError> {
    p.enter_nested()?;
    let result = (|| -> Result<Vec<Selection>, ParseError> {
        p.expect(TokenKind::LCurly, "a Selection Set")?;
        let mut selections = vec![selection(p)?];
        while !p.eat(TokenKind::RCurly)? {
            selections.push(selection(p)?);
        }
        Ok(selections)
    })();
    p.leave_nested();
    result
}

/// See: https://spec.graphql.org/October2021/#Selection
///
/// *Selection*:
///     Field
///     FragmentSpread
///     InlineFragment
fn selection(p: &mut ParserState) -> Result<Selection, ParseError> {
    match p.peek() {
        TokenKind::Spread => fragment::spread(p),
        TokenKind::Name => Ok(Selection::Field(field::field(p)?)),
        _ => Err(p.err("a Selection")),
    }
}
