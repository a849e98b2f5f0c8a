//! Replacement of variable references with the request's variable values.

use crate::ast::Argument;
use crate::ast::DirectiveList;
use crate::ast::Document;
use crate::ast::Selection;
use crate::ast::Value;
use crate::JsonMap;
use crate::Name;
use crate::Node;
use crate::ParseError;
use indexmap::IndexMap;
use indexmap::IndexSet;

struct Scope<'a> {
    supplied: &'a JsonMap,
    defaults: &'a IndexMap<Name, Node<Value>>,
}

/// Replace every `$name` in arguments by the supplied value, or the declared default.
///
/// Fragments are not tied to a single operation: their references fall back
/// to the first default declared for that name by any operation.
///
/// In a document with several operations, those that miss a value are recorded
/// in [`Document::unbound_operations`] so the others can still be selected.
/// Parsing fails when no operation is left.
pub(crate) fn substitute_variables(
    document: &mut Document,
    supplied: &JsonMap,
) -> Result<(), ParseError> {
    let mut fragment_defaults = IndexMap::new();
    let mut operation_errors = IndexMap::new();
    for (index, operation) in document.operations.iter_mut().enumerate() {
        let defaults: IndexMap<Name, Node<Value>> = operation
            .variables
            .iter()
            .filter_map(|def| Some((def.name.clone(), def.default_value.clone()?)))
            .collect();
        for (name, default) in &defaults {
            fragment_defaults
                .entry(name.clone())
                .or_insert_with(|| default.clone());
        }
        let scope = Scope {
            supplied,
            defaults: &defaults,
        };
        let operation = operation.make_mut();
        if let Err(error) = scope
            .directives(&mut operation.directives)
            .and_then(|()| scope.selection_set(&mut operation.selection_set))
        {
            operation_errors.insert(index, error);
        }
    }

    let scope = Scope {
        supplied,
        defaults: &fragment_defaults,
    };
    let mut fragment_errors = IndexMap::new();
    for (name, fragment) in &mut document.fragments {
        let fragment = fragment.make_mut();
        if let Err(error) = scope
            .directives(&mut fragment.directives)
            .and_then(|()| scope.selection_set(&mut fragment.selection_set))
        {
            fragment_errors.insert(name.clone(), error);
        }
    }

    for (index, operation) in document.operations.iter().enumerate() {
        if operation_errors.contains_key(&index) {
            continue;
        }
        let unbound_fragment = reached_fragments(document, &operation.selection_set)
            .into_iter()
            .find_map(|name| fragment_errors.get(name));
        if let Some(error) = unbound_fragment {
            operation_errors.insert(index, error.clone());
        }
    }

    let first_error = || {
        operation_errors
            .values()
            .chain(fragment_errors.values())
            .min_by_key(|error| error.index)
            .cloned()
    };
    if document.operations.len() <= 1 || operation_errors.len() == document.operations.len() {
        return first_error().map_or(Ok(()), Err);
    }
    for (index, error) in operation_errors {
        match &document.operations[index].name {
            Some(name) => {
                document.unbound_operations.insert(name.clone(), error);
            }
            // Only the sole operation of a document may be anonymous
            None => return Err(error),
        }
    }
    document.unbound_fragments = fragment_errors.into_keys().collect();
    Ok(())
}

/// Names of the fragments spread in `selection_set`, directly or through other fragments.
fn reached_fragments<'doc>(
    document: &'doc Document,
    selection_set: &'doc [Selection],
) -> IndexSet<&'doc Name> {
    let mut reached = IndexSet::new();
    let mut stack = vec![selection_set];
    while let Some(selection_set) = stack.pop() {
        for selection in selection_set {
            match selection {
                Selection::Field(field) => stack.push(&field.selection_set),
                Selection::InlineFragment(inline) => stack.push(&inline.selection_set),
                Selection::FragmentSpread(spread) => {
                    if reached.insert(&spread.fragment_name) {
                        if let Some(fragment) = document.fragments.get(&spread.fragment_name) {
                            stack.push(&fragment.selection_set);
                        }
                    }
                }
            }
        }
    }
    reached
}

impl Scope<'_> {
    fn selection_set(&self, selection_set: &mut [Selection]) -> Result<(), ParseError> {
        for selection in selection_set {
            match selection {
                Selection::Field(field) => {
                    let field = field.make_mut();
                    self.arguments(&mut field.arguments)?;
                    self.directives(&mut field.directives)?;
                    self.selection_set(&mut field.selection_set)?;
                }
                Selection::FragmentSpread(spread) => {
                    self.directives(&mut spread.make_mut().directives)?;
                }
                Selection::InlineFragment(inline) => {
                    let inline = inline.make_mut();
                    self.directives(&mut inline.directives)?;
                    self.selection_set(&mut inline.selection_set)?;
                }
            }
        }
        Ok(())
    }

    fn directives(&self, directives: &mut DirectiveList) -> Result<(), ParseError> {
        for directive in &mut directives.0 {
            self.arguments(&mut directive.make_mut().arguments)?;
        }
        Ok(())
    }

    fn arguments(&self, arguments: &mut [Node<Argument>]) -> Result<(), ParseError> {
        for argument in arguments {
            self.value(&mut argument.make_mut().value)?;
        }
        Ok(())
    }

    fn value(&self, value: &mut Node<Value>) -> Result<(), ParseError> {
        match &**value {
            Value::Variable(name) => {
                let replacement = self.lookup(name, value)?;
                *value = replacement;
            }
            Value::List(_) | Value::Object(_) => match value.make_mut() {
                Value::List(items) => {
                    for item in items {
                        self.value(item)?;
                    }
                }
                Value::Object(fields) => {
                    for (_, field) in fields {
                        self.value(field)?;
                    }
                }
                _ => {}
            },
            _ => {}
        }
        Ok(())
    }

    fn lookup(&self, name: &Name, reference: &Node<Value>) -> Result<Node<Value>, ParseError> {
        if let Some(supplied) = self.supplied.get(name.as_str()) {
            return Ok(reference.same_location(Value::from_json(supplied)));
        }
        if let Some(default) = self.defaults.get(name) {
            return Ok(reference.same_location((**default).clone()));
        }
        Err(ParseError::with_loc(
            format!("no value provided for variable `${name}`"),
            format!("${name}"),
            reference.location().map_or(0, |loc| loc.offset()),
        ))
    }
}
