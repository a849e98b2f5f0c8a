use super::*;
use crate::JsonValue;
use crate::ParseError;
use crate::Parser;
use std::fmt;
use std::hash;

impl Document {
    /// Return a new configurable parser
    pub fn parser() -> Parser {
        Parser::default()
    }

    /// Parse `input` with the default configuration, substituting `variables`.
    pub fn parse(input: &str, variables: &JsonMap) -> Result<Self, ParseError> {
        Self::parser().parse(input, variables)
    }

    /// Returns the operation with the given name, or the only operation if `name_request` is `None`.
    pub fn get_operation(
        &self,
        name_request: Option<&str>,
    ) -> Result<&Node<OperationDefinition>, GetOperationError> {
        if let Some(name) = name_request {
            // Honor the request
            if let Some(error) = self.unbound_operations.get(name) {
                return Err(GetOperationError {
                    message: format!("operation `{name}` cannot be executed: {error}"),
                });
            }
            self.operations
                .iter()
                .find(|op| op.name.as_ref().is_some_and(|op_name| op_name == name))
                .ok_or_else(|| GetOperationError {
                    message: format!("unknown operation named `{name}`"),
                })
        } else if let [op] = self.operations.as_slice() {
            Ok(op)
        } else {
            Err(GetOperationError {
                message: "must provide operation name if query contains multiple operations"
                    .to_owned(),
            })
        }
    }

    pub fn get_fragment(&self, name: &str) -> Option<&Node<FragmentDefinition>> {
        self.fragments.get(name)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Skip the source text
        f.debug_struct("Document")
            .field("operations", &self.operations)
            .field("fragments", &self.fragments)
            .field("unbound_operations", &self.unbound_operations)
            .field("unbound_fragments", &self.unbound_fragments)
            .finish()
    }
}

impl OperationType {
    /// Get the name of this operation type as it would appear in GraphQL source code.
    pub fn name(self) -> &'static str {
        match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        }
    }

    /// Get the default name of the object type for this operation type
    pub fn default_type_name(self) -> &'static str {
        match self {
            OperationType::Query => "Query",
            OperationType::Mutation => "Mutation",
            OperationType::Subscription => "Subscription",
        }
    }
}

impl DirectiveLocation {
    /// Get the name of this directive location as it would appear in GraphQL source code.
    pub fn name(self) -> &'static str {
        match self {
            DirectiveLocation::Query => "QUERY",
            DirectiveLocation::Mutation => "MUTATION",
            DirectiveLocation::Subscription => "SUBSCRIPTION",
            DirectiveLocation::Field => "FIELD",
            DirectiveLocation::FragmentDefinition => "FRAGMENT_DEFINITION",
            DirectiveLocation::FragmentSpread => "FRAGMENT_SPREAD",
            DirectiveLocation::InlineFragment => "INLINE_FRAGMENT",
            DirectiveLocation::VariableDefinition => "VARIABLE_DEFINITION",
        }
    }
}

impl fmt::Debug for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<OperationType> for DirectiveLocation {
    fn from(ty: OperationType) -> Self {
        match ty {
            OperationType::Query => DirectiveLocation::Query,
            OperationType::Mutation => DirectiveLocation::Mutation,
            OperationType::Subscription => DirectiveLocation::Subscription,
        }
    }
}

impl Type {
    /// Returns a new `Type::Named`
    pub fn named(name: Name) -> Self {
        Type::Named(name)
    }

    /// Returns this type made non-null, if it isn’t already.
    pub fn non_null(self) -> Self {
        match self {
            Type::Named(name) => Type::NonNullNamed(name),
            Type::List(inner) => Type::NonNullList(inner),
            Type::NonNullNamed(_) => self,
            Type::NonNullList(_) => self,
        }
    }

    /// Returns this type made nullable, if it isn’t already.
    pub fn nullable(self) -> Self {
        match self {
            Type::NonNullNamed(name) => Type::Named(name),
            Type::NonNullList(inner) => Type::List(inner),
            Type::Named(_) | Type::List(_) => self,
        }
    }

    /// Returns a list type whose items are this type.
    pub fn list(self) -> Self {
        Type::List(Box::new(self))
    }

    /// If the type is a list type (nullable or not), returns the inner item type.
    pub fn item_type(&self) -> Option<&Type> {
        match self {
            Type::List(inner) | Type::NonNullList(inner) => Some(inner),
            Type::Named(_) | Type::NonNullNamed(_) => None,
        }
    }

    /// Returns the inner named type, after unwrapping any non-null or list markers.
    pub fn inner_named_type(&self) -> &Name {
        match self {
            Type::Named(name) | Type::NonNullNamed(name) => name,
            Type::List(inner) | Type::NonNullList(inner) => inner.inner_named_type(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNullNamed(_) | Type::NonNullList(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Type::List(_) | Type::NonNullList(_))
    }
}

impl Selection {
    pub fn directives(&self) -> &DirectiveList {
        match self {
            Selection::Field(field) => &field.directives,
            Selection::FragmentSpread(spread) => &spread.directives,
            Selection::InlineFragment(inline) => &inline.directives,
        }
    }

    pub fn location(&self) -> Option<crate::SourceSpan> {
        match self {
            Selection::Field(field) => field.location(),
            Selection::FragmentSpread(spread) => spread.location(),
            Selection::InlineFragment(inline) => inline.location(),
        }
    }

    pub fn as_field(&self) -> Option<&Node<Field>> {
        if let Selection::Field(field) = self {
            Some(field)
        } else {
            None
        }
    }
}

impl Field {
    /// Returns a new field with the given name and no alias, arguments or sub-selections.
    pub fn new(name: Name) -> Self {
        Field {
            alias: None,
            name,
            arguments: Vec::new(),
            directives: DirectiveList::default(),
            selection_set: Vec::new(),
            coerced_arguments: CoercedArguments::default(),
        }
    }

    /// The response key: the alias if there is one, the field name otherwise.
    pub fn response_key(&self) -> &Name {
        self.alias.as_ref().unwrap_or(&self.name)
    }

    pub fn argument_by_name(&self, name: &str) -> Option<&Node<Value>> {
        self.arguments
            .iter()
            .find_map(|arg| (arg.name == name).then_some(&arg.value))
    }
}

impl Directive {
    pub fn argument_by_name(&self, name: &str) -> Option<&Node<Value>> {
        self.arguments
            .iter()
            .find_map(|arg| (arg.name == name).then_some(&arg.value))
    }
}

impl DirectiveList {
    /// Returns the first directive with the given name, if any.
    pub fn get(&self, name: &str) -> Option<&Node<Directive>> {
        self.0.iter().find(|dir| dir.name == name)
    }

    /// Returns an iterator of directives with the given name.
    pub fn get_all<'def: 'name, 'name>(
        &'def self,
        name: &'name str,
    ) -> impl Iterator<Item = &'def Node<Directive>> + 'name {
        self.0.iter().filter(move |dir| dir.name == name)
    }
}

impl std::ops::Deref for DirectiveList {
    type Target = Vec<Node<Directive>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a DirectiveList {
    type Item = &'a Node<Directive>;
    type IntoIter = std::slice::Iter<'a, Node<Directive>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_enum(&self) -> Option<&Name> {
        if let Value::Enum(name) = self {
            Some(name)
        } else {
            None
        }
    }

    pub fn as_variable(&self) -> Option<&Name> {
        if let Value::Variable(name) = self {
            Some(name)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(value) = self {
            Some(value)
        } else {
            None
        }
    }

    pub fn to_bool(&self) -> Option<bool> {
        if let Value::Boolean(value) = *self {
            Some(value)
        } else {
            None
        }
    }

    pub fn to_i32(&self) -> Option<i32> {
        if let Value::Int(value) = self {
            value.try_to_i32().ok()
        } else {
            None
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Float(value) => value.try_to_f64().ok(),
            Value::Int(value) => value.try_to_f64().ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node<Value>]> {
        if let Value::List(value) = self {
            Some(value)
        } else {
            None
        }
    }

    pub fn as_object(&self) -> Option<&[(Name, Node<Value>)]> {
        if let Value::Object(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// Convert a JSON variable value to a GraphQL literal.
    ///
    /// JSON strings become `Value::String`: whether they name an enum value
    /// is only known once the value is coerced to its input type.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(value) => Value::Boolean(*value),
            JsonValue::Number(number) => {
                if number.is_f64() {
                    Value::Float(FloatValue(number.to_string()))
                } else {
                    Value::Int(IntValue(number.to_string()))
                }
            }
            JsonValue::String(value) => Value::String(value.as_str().to_owned()),
            JsonValue::Array(items) => Value::List(
                items
                    .iter()
                    .map(|item| Node::new(Value::from_json(item)))
                    .collect(),
            ),
            JsonValue::Object(object) => Value::Object(
                object
                    .iter()
                    .filter_map(|(key, value)| {
                        // JSON keys that are not GraphQL names can never match an input field
                        let name = Name::new(key.as_str()).ok()?;
                        Some((name, Node::new(Value::from_json(value))))
                    })
                    .collect(),
            ),
        }
    }
}

impl IntValue {
    /// Constructs from a string matching the [`IntValue` grammar specification](https://spec.graphql.org/October2021/#IntValue)
    ///
    /// To convert an `i32`, use `from` or `into` instead.
    pub fn new_parsed(text: &str) -> Self {
        debug_assert!(IntValue::valid_syntax(text), "{text:?}");
        Self(text.into())
    }

    fn valid_syntax(text: &str) -> bool {
        match text.strip_prefix('-').unwrap_or(text).as_bytes() {
            [b'0'..=b'9'] => true,
            [b'1'..=b'9', rest @ ..] => rest.iter().all(|b| b.is_ascii_digit()),
            _ => false,
        }
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts to `i32`, returning an error on overflow
    pub fn try_to_i32(&self) -> Result<i32, std::num::ParseIntError> {
        self.0.parse()
    }

    /// Converts to a finite `f64`, returning an error on overflow to infinity.
    ///
    /// An `IntValue` signals integer syntax was used, but is also valid in contexts
    /// where a `Float` is expected.
    pub fn try_to_f64(&self) -> Result<f64, FloatOverflowError> {
        try_to_f64(&self.0)
    }
}

impl FloatValue {
    /// Constructs from a string matching the [`FloatValue` grammar specification](https://spec.graphql.org/October2021/#FloatValue)
    ///
    /// To convert an `f64`, use `from` or `into` instead.
    pub fn new_parsed(text: &str) -> Self {
        Self(text.into())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts to a finite `f64`, returning an error on overflow to infinity.
    pub fn try_to_f64(&self) -> Result<f64, FloatOverflowError> {
        try_to_f64(&self.0)
    }
}

fn try_to_f64(text: &str) -> Result<f64, FloatOverflowError> {
    // Lexed number syntax always parses, possibly to infinity
    let Ok(value) = text.parse::<f64>() else {
        return Err(FloatOverflowError {});
    };
    value.is_finite().then_some(value).ok_or(FloatOverflowError {})
}

impl From<i32> for IntValue {
    fn from(value: i32) -> Self {
        let text = value.to_string();
        debug_assert!(IntValue::valid_syntax(&text), "{text:?}");
        Self(text)
    }
}

impl From<f64> for FloatValue {
    fn from(value: f64) -> Self {
        let mut text = value.to_string();
        if !text.contains(['.', 'e', 'E']) {
            text.push_str(".0");
        }
        Self(text)
    }
}

impl fmt::Display for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Debug for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for FloatOverflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("value magnitude too large to be converted to a finite f64")
    }
}

impl std::error::Error for FloatOverflowError {}

impl From<()> for Value {
    fn from(_value: ()) -> Self {
        Value::Null
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&'_ str> for Value {
    fn from(value: &'_ str) -> Self {
        Value::String(value.to_owned())
    }
}

impl CoercedArguments {
    /// Returns the arguments memoized for a field of `type_name`, if any.
    pub fn get(&self, type_name: &str) -> Option<&Arc<JsonMap>> {
        self.0
            .get()
            .filter(|(owner, _)| owner == type_name)
            .map(|(_, arguments)| arguments)
    }

    /// Returns the arguments memoized for a field of `type_name`,
    /// running `coerce` if they are not set yet.
    ///
    /// The memo holds a single owner type: when the same field node is reached
    /// through another type, `coerce` runs again and its result is not kept.
    /// A failed coercion leaves the memo empty so the error is reported again
    /// by the next use.
    pub fn get_or_try_init<E>(
        &self,
        type_name: &Name,
        coerce: impl FnOnce() -> Result<JsonMap, E>,
    ) -> Result<Arc<JsonMap>, E> {
        if let Some((owner, arguments)) = self.0.get() {
            if owner == type_name {
                return Ok(arguments.clone());
            }
            return coerce().map(Arc::new);
        }
        let arguments = Arc::new(coerce()?);
        // Another use may have won the race: keep its value if it has the same owner.
        let (owner, memoized) = self.0.get_or_init(|| (type_name.clone(), arguments.clone()));
        Ok(if owner == type_name {
            memoized.clone()
        } else {
            arguments
        })
    }
}

impl fmt::Debug for CoercedArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.get() {
            Some((owner, arguments)) => f
                .debug_tuple("CoercedArguments")
                .field(owner)
                .field(arguments)
                .finish(),
            None => f.write_str("CoercedArguments(<pending>)"),
        }
    }
}

impl PartialEq for CoercedArguments {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for CoercedArguments {}

impl hash::Hash for CoercedArguments {
    fn hash<H: hash::Hasher>(&self, _state: &mut H) {}
}
