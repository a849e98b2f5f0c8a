use crate::ast::Type;
use crate::parser::grammar::name;
use crate::parser::ParserState;
use crate::ParseError;
use crate::TokenKind;

/// See: https://spec.graphql.org/October2021/#InputValueDefinition
///
/// *Type*:
///     NamedType
///     ListType
///         **[** Type **]**
///     NonNullType
///         NamedType **!**
///         ListType **!**
pub(crate) fn ty(p: &mut ParserState) -> Result<Type, ParseError> {
    let ty = match p.peek() {
        TokenKind::LBracket => {
            p.enter_nested()?;
            p.bump()?;
            let inner = ty(p);
            p.leave_nested();
            let inner = inner?;
            p.expect(TokenKind::RBracket, "`]`")?;
            Type::List(Box::new(inner))
        }
        TokenKind::Name => Type::Named(name::name(p)?),
        _ => return Err(p.err("a Type")),
    };
    if p.eat(TokenKind::Bang)? {
        Ok(ty.non_null())
    } else {
        Ok(ty)
    }
}
