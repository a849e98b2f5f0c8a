use crate::ast::FragmentDefinition;
use crate::ast::FragmentSpread;
use crate::ast::InlineFragment;
use crate::ast::Selection;
use crate::parser::grammar::directive;
use crate::parser::grammar::name;
use crate::parser::grammar::selection;
use crate::parser::grammar::value::Constness;
use crate::parser::ParserState;
use crate::Name;
use crate::Node;
use crate::ParseError;
use crate::TokenKind;

/// See: https://spec.graphql.org/October2021/#FragmentDefinition
///
/// *FragmentDefinition*:
///     **fragment** FragmentName TypeCondition Directives? SelectionSet
pub(crate) fn fragment_definition(
    p: &mut ParserState,
) -> Result<Node<FragmentDefinition>, ParseError> {
    let start = p.offset();
    p.bump()?;
    let name = fragment_name(p)?;
    let type_condition = type_condition(p)?;
    let directives = directive::directives(p, Constness::NotConst)?;
    let selection_set = selection::selection_set(p)?;
    Ok(Node::new_parsed(
        FragmentDefinition {
            name,
            type_condition,
            directives,
            selection_set,
        },
        p.span_from(start),
    ))
}

/// See: https://spec.graphql.org/October2021/#FragmentName
///
/// *FragmentName*:
///     Name *but not* **on**
fn fragment_name(p: &mut ParserState) -> Result<Name, ParseError> {
    if p.at_keyword("on") {
        return Err(ParseError::with_loc(
            "fragment name must not be `on`",
            "on".to_owned(),
            p.offset(),
        ));
    }
    name::name(p)
}

/// See: https://spec.graphql.org/October2021/#TypeCondition
///
/// *TypeCondition*:
///     **on** NamedType
fn type_condition(p: &mut ParserState) -> Result<Name, ParseError> {
    if !p.at_keyword("on") {
        return Err(p.err("a Type Condition"));
    }
    p.bump()?;
    name::name(p)
}

/// Parse a selection starting with `...`.
///
/// See: https://spec.graphql.org/October2021/#FragmentSpread
///
/// *FragmentSpread*:
///     **...** FragmentName Directives?
///
/// See: https://spec.graphql.org/October2021/#InlineFragment
///
/// *InlineFragment*:
///     **...** TypeCondition? Directives? SelectionSet
pub(crate) fn spread(p: &mut ParserState) -> Result<Selection, ParseError> {
    let start = p.offset();
    p.bump()?;
    if p.at_keyword("on") || p.at(TokenKind::At) || p.at(TokenKind::LCurly) {
        let type_condition = if p.at_keyword("on") {
            Some(type_condition(p)?)
        } else {
            None
        };
        let directives = directive::directives(p, Constness::NotConst)?;
        let selection_set = selection::selection_set(p)?;
        let inline = InlineFragment {
            type_condition,
            directives,
            selection_set,
        };
        return Ok(Selection::InlineFragment(Node::new_parsed(
            inline,
            p.span_from(start),
        )));
    }
    if !p.at(TokenKind::Name) {
        return Err(p.err("a Fragment Spread or an Inline Fragment"));
    }
    let fragment_name = fragment_name(p)?;
    let directives = directive::directives(p, Constness::NotConst)?;
    Ok(Selection::FragmentSpread(Node::new_parsed(
        FragmentSpread {
            fragment_name,
            directives,
        },
        p.span_from(start),
    )))
}
