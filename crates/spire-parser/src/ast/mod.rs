//! *Abstract Syntax Tree* for executable GraphQL documents.
//!
//! A [`Document`] only exists for source text that conforms to the GraphQL
//! [syntactic grammar]: parsing stops at the first error. Variable references
//! are replaced by their values while parsing, so argument values in a parsed
//! document are literals.
//!
//! Nodes are wrapped in [`Node`], a reference-counted smart pointer carrying
//! the source location of the node. Executors and validators share nodes
//! without cloning entire subtrees.
//!
//! [syntactic grammar]: https://spec.graphql.org/October2021/#sec-Language

use crate::JsonMap;
use crate::Name;
use crate::Node;
use crate::ParseError;
use indexmap::IndexMap;
use indexmap::IndexSet;
use std::sync::Arc;
use std::sync::OnceLock;

mod display;
mod impls;

#[derive(Clone)]
pub struct Document {
    /// The source text this document was parsed from.
    pub source: Arc<str>,

    pub operations: Vec<Node<OperationDefinition>>,

    pub fragments: IndexMap<Name, Node<FragmentDefinition>>,

    /// Operations whose variables could not all be substituted,
    /// with the error for the first missing value.
    /// This includes variables of the fragments they spread.
    ///
    /// Only documents with several operations record them here:
    /// selecting one of the other operations still works.
    /// In a document with a single operation a missing value fails parsing.
    pub unbound_operations: IndexMap<Name, ParseError>,

    /// Fragments with a variable reference that could not be substituted.
    pub unbound_fragments: IndexSet<Name>,
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Document>();
    assert_sync::<Document>();
};

/// No operation matched the name given to [`Document::get_operation`],
/// or no name was given and the document has several operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GetOperationError {
    message: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct OperationDefinition {
    pub operation_type: OperationType,
    pub name: Option<Name>,
    pub variables: Vec<Node<VariableDefinition>>,
    pub directives: DirectiveList,
    pub selection_set: Vec<Selection>,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FragmentDefinition {
    pub name: Name,
    pub type_condition: Name,
    pub directives: DirectiveList,
    pub selection_set: Vec<Selection>,
}

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct VariableDefinition {
    pub name: Name,
    pub ty: Node<Type>,
    pub default_value: Option<Node<Value>>,
    pub directives: DirectiveList,
}

/// A reference to a type, with list and non-null wrappers.
///
/// Non-null is expressed by the variant rather than a wrapper around another
/// `Type`, so a doubly non-null type cannot be represented.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Type {
    Named(Name),
    NonNullNamed(Name),
    List(Box<Type>),
    NonNullList(Box<Type>),
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Selection {
    Field(Node<Field>),
    FragmentSpread(Node<FragmentSpread>),
    InlineFragment(Node<InlineFragment>),
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Field {
    pub alias: Option<Name>,
    pub name: Name,
    pub arguments: Vec<Node<Argument>>,
    pub directives: DirectiveList,
    pub selection_set: Vec<Selection>,
    /// Arguments coerced against the field definition, filled by the first
    /// validation or execution that needs them.
    pub coerced_arguments: CoercedArguments,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FragmentSpread {
    pub fragment_name: Name,
    pub directives: DirectiveList,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct InlineFragment {
    pub type_condition: Option<Name>,
    pub directives: DirectiveList,
    pub selection_set: Vec<Selection>,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Argument {
    pub name: Name,
    pub value: Node<Value>,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct DirectiveList(pub Vec<Node<Directive>>);

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Directive {
    pub name: Name,
    pub arguments: Vec<Node<Argument>>,
}

/// Locations where `@skip` and `@include` may appear, plus the other
/// executable locations they are rejected from.
#[derive(Copy, Clone, Hash, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Value {
    Null,
    Enum(Name),
    Variable(Name),
    String(
        /// The value after escape sequences are resolved
        String,
    ),
    Float(FloatValue),
    Int(IntValue),
    Boolean(bool),
    List(Vec<Node<Value>>),
    Object(Vec<(Name, Node<Value>)>),
}

/// An integer literal, kept as its source text.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct IntValue(String);

/// A float literal, kept as its source text.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct FloatValue(String);

/// `IntValue` or `FloatValue` magnitude too large to be converted to `f64`.
#[derive(Clone, Eq, PartialEq, Debug)]
#[non_exhaustive]
pub struct FloatOverflowError {}

/// Memoized result of argument coercion for a [`Field`],
/// tagged with the name of the type whose field definition was used.
///
/// Set at most once; concurrent first uses race and one of them wins.
/// Ignored by equality and hashing.
#[derive(Clone, Default)]
pub struct CoercedArguments(OnceLock<(Name, Arc<JsonMap>)>);
