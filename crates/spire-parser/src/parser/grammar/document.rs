use crate::ast::Document;
use crate::ast::FragmentDefinition;
use crate::ast::OperationDefinition;
use crate::parser::grammar::fragment;
use crate::parser::grammar::operation;
use crate::parser::ParserState;
use crate::Node;
use crate::ParseError;
use crate::TokenKind;
use indexmap::map::Entry;
use indexmap::IndexMap;
use indexmap::IndexSet;

/// See: https://spec.graphql.org/October2021/#Document
///
/// *Document*:
///     ExecutableDefinition*
///
/// *ExecutableDefinition*:
///     OperationDefinition
///     FragmentDefinition
pub(crate) fn document(p: &mut ParserState, source: &str) -> Result<Document, ParseError> {
    let mut operations: Vec<Node<OperationDefinition>> = Vec::new();
    let mut fragments: IndexMap<_, Node<FragmentDefinition>> = IndexMap::new();

    loop {
        match p.peek() {
            TokenKind::Eof => break,
            TokenKind::LCurly => operations.push(operation::operation_definition(p)?),
            TokenKind::Name => match p.peek_data() {
                "query" | "mutation" | "subscription" => {
                    operations.push(operation::operation_definition(p)?)
                }
                "fragment" => {
                    let fragment = fragment::fragment_definition(p)?;
                    match fragments.entry(fragment.name.clone()) {
                        Entry::Occupied(_) => {
                            return Err(redefinition("fragment", &fragment));
                        }
                        Entry::Vacant(entry) => {
                            entry.insert(fragment);
                        }
                    }
                }
                _ => return Err(p.err("an Operation or a Fragment Definition")),
            },
            _ => return Err(p.err("an Operation or a Fragment Definition")),
        }
    }

    if operations.is_empty() {
        return Err(ParseError::with_loc(
            "document must contain at least one operation",
            String::new(),
            p.offset(),
        ));
    }
    if operations.len() > 1 {
        for (index, operation) in operations.iter().enumerate() {
            let Some(name) = &operation.name else {
                return Err(ParseError::with_loc(
                    "anonymous operation must be the only operation in the document",
                    String::new(),
                    operation.location().map_or(0, |loc| loc.offset()),
                ));
            };
            let duplicate = operations[..index]
                .iter()
                .any(|previous| previous.name.as_ref() == Some(name));
            if duplicate {
                return Err(redefinition("operation", operation));
            }
        }
    }

    Ok(Document {
        source: source.into(),
        operations,
        fragments,
        unbound_operations: IndexMap::new(),
        unbound_fragments: IndexSet::new(),
    })
}

trait Named {
    fn definition_name(&self) -> &str;
}

impl Named for OperationDefinition {
    fn definition_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

impl Named for FragmentDefinition {
    fn definition_name(&self) -> &str {
        &self.name
    }
}

fn redefinition<T: Named>(kind: &str, definition: &Node<T>) -> ParseError {
    let name = definition.definition_name();
    ParseError::with_loc(
        format!("{kind} `{name}` is defined more than once"),
        name.to_owned(),
        definition.location().map_or(0, |loc| loc.offset()),
    )
}
