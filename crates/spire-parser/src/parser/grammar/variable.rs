use crate::ast::VariableDefinition;
use crate::parser::grammar::directive;
use crate::parser::grammar::name;
use crate::parser::grammar::ty;
use crate::parser::grammar::value;
use crate::parser::grammar::value::Constness;
use crate::parser::ParserState;
use crate::Node;
use crate::ParseError;
use crate::TokenKind;

/// See: https://spec.graphql.org/October2021/#VariableDefinitions
///
/// *VariableDefinitions*:
///     **(** VariableDefinition* **)**
pub(crate) fn variable_definitions(
    p: &mut ParserState,
) -> Result<Vec<Node<VariableDefinition>>, ParseError> {
    let mut definitions: Vec<Node<VariableDefinition>> = Vec::new();
    if !p.eat(TokenKind::LParen)? {
        return Ok(definitions);
    }
    loop {
        let definition = variable_definition(p)?;
        if definitions.iter().any(|def| def.name == definition.name) {
            return Err(ParseError::with_loc(
                format!("variable `${}` is defined more than once", definition.name),
                format!("${}", definition.name),
                definition.location().map_or(0, |loc| loc.offset()),
            ));
        }
        definitions.push(definition);
        if p.eat(TokenKind::RParen)? {
            return Ok(definitions);
        }
    }
}

/// See: https://spec.graphql.org/October2021/#VariableDefinition
///
/// *VariableDefinition*:
///     Variable **:** Type DefaultValue? Directives[Const]?
fn variable_definition(p: &mut ParserState) -> Result<Node<VariableDefinition>, ParseError> {
    let start = p.offset();
    p.expect(TokenKind::Dollar, "a Variable")?;
    let name = name::name(p)?;
    p.expect(TokenKind::Colon, "`:`")?;
    let ty_start = p.offset();
    let ty = ty::ty(p)?;
    let ty = Node::new_parsed(ty, p.span_from(ty_start));
    let default_value = if p.eat(TokenKind::Eq)? {
        Some(value::value(p, Constness::Const)?)
    } else {
        None
    };
    let directives = directive::directives(p, Constness::Const)?;
    Ok(Node::new_parsed(
        VariableDefinition {
            name,
            ty,
            default_value,
            directives,
        },
        p.span_from(start),
    ))
}

#[cfg(test)]
mod test {
    use crate::Document;
    use crate::JsonMap;

    #[test]
    fn it_parses_variable_definitions() {
        let document = Document::parse(
            r#"query Q($a: Int = 1, $b: [String!]! = ["x"]) { f }"#,
            &JsonMap::new(),
        )
        .unwrap();
        let operation = document.get_operation(Some("Q")).unwrap();
        let definitions: Vec<_> = operation
            .variables
            .iter()
            .map(|def| def.to_string())
            .collect();
        assert_eq!(definitions, [r#"$a: Int = 1"#, r#"$b: [String!]! = ["x"]"#]);
    }

    #[test]
    fn it_rejects_duplicate_variables() {
        let err = Document::parse("query($a: Int, $a: Int) { f }", &JsonMap::new()).unwrap_err();
        assert_eq!(err.message(), "variable `$a` is defined more than once");
        assert_eq!(err.index(), 15);
    }
}
