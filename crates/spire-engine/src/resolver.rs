//! Values produced by field resolvers, and the contexts resolvers receive.

use crate::ast::Field;
use crate::JsonMap;
use crate::JsonValue;
use crate::Name;
use crate::Node;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::FutureExt;
use futures::Stream;
use futures::StreamExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Request-wide data set with [`Executor::context_data`][crate::Executor::context_data]
/// and made available to every resolver.
pub type ContextData = Option<Arc<dyn Any + Send + Sync>>;

/// Resolves one field of an object, given the parent value and the field’s arguments.
///
/// Implemented by closures `Fn(FieldContext) -> BoxFuture<…>`.
/// See also [`FieldDefinition::resolve`][crate::schema::FieldDefinition::resolve]
/// and [`FieldDefinition::resolve_async`][crate::schema::FieldDefinition::resolve_async]
/// for more convenient ways to attach a resolver.
pub trait Resolver: Send + Sync {
    fn resolve(&self, ctx: FieldContext) -> BoxFuture<'static, Result<ResolvedValue, FieldError>>;
}

/// Resolves one field for many parent values at once.
///
/// The returned vector has one item per source, in the same order.
/// An `Err` for the whole call is reported on every source.
pub trait BatchResolver: Send + Sync {
    fn resolve_batch(
        &self,
        ctx: BatchContext,
    ) -> BoxFuture<'static, Result<Vec<Result<ResolvedValue, FieldError>>, FieldError>>;
}

impl<F> Resolver for F
where
    F: Fn(FieldContext) -> BoxFuture<'static, Result<ResolvedValue, FieldError>> + Send + Sync,
{
    fn resolve(&self, ctx: FieldContext) -> BoxFuture<'static, Result<ResolvedValue, FieldError>> {
        self(ctx)
    }
}

impl<F> BatchResolver for F
where
    F: Fn(BatchContext) -> BoxFuture<'static, Result<Vec<Result<ResolvedValue, FieldError>>, FieldError>>
        + Send
        + Sync,
{
    fn resolve_batch(
        &self,
        ctx: BatchContext,
    ) -> BoxFuture<'static, Result<Vec<Result<ResolvedValue, FieldError>>, FieldError>> {
        self(ctx)
    }
}

/// Everything a [`Resolver`] knows about the field it resolves.
#[derive(Clone)]
pub struct FieldContext {
    /// The value of the object this field is selected on
    pub source: ObjectValue,
    /// Field arguments coerced according to their definitions, with defaults applied
    pub arguments: Arc<JsonMap>,
    /// The field selection, including its sub-selections
    pub field: Node<Field>,
    pub cancellation_token: CancellationToken,
    pub(crate) context_data: ContextData,
}

/// Everything a [`BatchResolver`] knows about the field it resolves.
#[derive(Clone)]
pub struct BatchContext {
    /// Values of every object the field is resolved for, in list order
    pub sources: Vec<ObjectValue>,
    pub arguments: Arc<JsonMap>,
    pub field: Node<Field>,
    pub cancellation_token: CancellationToken,
    pub(crate) context_data: ContextData,
}

macro_rules! context_accessors {
    ($ty: ty) => {
        impl $ty {
            /// Returns the coerced value of the argument with the given name, if any
            pub fn argument(&self, name: &str) -> Option<&JsonValue> {
                self.arguments.get(name)
            }

            /// Returns the request context data, if it was set with type `T`
            pub fn data<T: Any>(&self) -> Option<&T> {
                self.context_data.as_deref()?.downcast_ref()
            }

            pub fn is_cancelled(&self) -> bool {
                self.cancellation_token.is_cancelled()
            }
        }
    };
}

context_accessors!(FieldContext);
context_accessors!(BatchContext);

/// A shared host value standing for a GraphQL object.
///
/// The runtime type name selects the concrete object type when the value is
/// returned for an interface or union type. JSON objects are also accepted:
/// their `__typename` key, if present, is the runtime type name.
#[derive(Clone)]
pub struct ObjectValue {
    value: Arc<dyn Any + Send + Sync>,
    type_name: Option<Name>,
}

impl ObjectValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            value,
            type_name: None,
        }
    }

    /// Wraps a JSON object. Fields without a resolver read the property of the same name.
    pub fn json(map: JsonMap) -> Self {
        let type_name = map
            .get("__typename")
            .and_then(JsonValue::as_str)
            .and_then(|name| Name::new(name).ok());
        Self {
            value: Arc::new(map),
            type_name,
        }
    }

    /// Sets the runtime type name
    pub fn with_type_name(mut self, type_name: Name) -> Self {
        self.type_name = Some(type_name);
        self
    }

    pub fn type_name(&self) -> Option<&Name> {
        self.type_name.as_ref()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    pub fn as_json(&self) -> Option<&JsonMap> {
        self.downcast_ref()
    }

    /// The same host value, without a runtime type name
    pub(crate) fn untyped(&self) -> Self {
        Self {
            value: self.value.clone(),
            type_name: None,
        }
    }
}

impl Default for ObjectValue {
    fn default() -> Self {
        Self::new(())
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("ObjectValue");
        debug.field("type_name", &self.type_name);
        if let Some(json) = self.as_json() {
            debug.field("json", json);
        }
        debug.finish_non_exhaustive()
    }
}

/// A value produced once, when the field it was returned for is completed.
pub struct LazyValue(Box<dyn FnOnce() -> BoxFuture<'static, Result<ResolvedValue, FieldError>> + Send>);

impl LazyValue {
    pub(crate) fn produce(self) -> BoxFuture<'static, Result<ResolvedValue, FieldError>> {
        (self.0)()
    }
}

/// Source stream of a subscription root field: one item per event.
pub type EventStream = BoxStream<'static, Result<ResolvedValue, FieldError>>;

/// The value of a resolved field
pub enum ResolvedValue {
    /// * JSON null represents GraphQL null
    /// * A GraphQL enum value is represented by its host value
    /// * Built-in scalars are coerced according to their respective *Result Coercion*
    /// * For custom scalars, any JSON value is passed through the scalar’s result coercion
    ///
    /// A JSON object is accepted where an object is expected,
    /// and a JSON array where a list is expected.
    Leaf(JsonValue),

    /// Expected where the GraphQL type is an object, interface, or union type
    Object(ObjectValue),

    /// Expected for GraphQL list types
    List(Vec<Result<ResolvedValue, FieldError>>),

    /// Only accepted from fields defined as [`lazy`][crate::schema::FieldDefinition::lazy]
    Lazy(LazyValue),

    /// Only accepted from subscription root fields
    Stream(EventStream),
}

impl ResolvedValue {
    /// Construct a null leaf resolved value
    pub fn null() -> Self {
        Self::Leaf(JsonValue::Null)
    }

    /// Construct a leaf resolved value from something that is convertible to JSON
    pub fn leaf(json: impl Into<JsonValue>) -> Self {
        Self::Leaf(json.into())
    }

    pub fn object(value: ObjectValue) -> Self {
        Self::Object(value)
    }

    /// Construct an object resolved value or null
    pub fn opt_object(value: Option<ObjectValue>) -> Self {
        match value {
            Some(value) => Self::Object(value),
            None => Self::null(),
        }
    }

    /// Construct a list resolved value where no item is an error
    pub fn list(items: impl IntoIterator<Item = Self>) -> Self {
        Self::List(items.into_iter().map(Ok).collect())
    }

    /// Construct a value produced by `producer` only when the field is completed
    pub fn lazy<F, Fut>(producer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<ResolvedValue, FieldError>> + Send + 'static,
    {
        Self::Lazy(LazyValue(Box::new(move || producer().boxed())))
    }

    /// Construct a subscription source stream
    pub fn stream(events: impl Stream<Item = Result<ResolvedValue, FieldError>> + Send + 'static) -> Self {
        Self::Stream(events.boxed())
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "a leaf value",
            Self::Object(_) => "an object",
            Self::List(_) => "a list",
            Self::Lazy(_) => "a lazy value",
            Self::Stream(_) => "a stream",
        }
    }
}

impl fmt::Debug for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(json) => f.debug_tuple("Leaf").field(json).finish(),
            Self::Object(object) => f.debug_tuple("Object").field(object).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Lazy(_) => f.write_str("Lazy"),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

impl From<JsonValue> for ResolvedValue {
    fn from(json: JsonValue) -> Self {
        Self::Leaf(json)
    }
}

impl From<ObjectValue> for ResolvedValue {
    fn from(value: ObjectValue) -> Self {
        Self::Object(value)
    }
}

/// An error returned by a resolver.
///
/// Becomes a [field error] in the response, at the path of the field.
///
/// [field error]: https://spec.graphql.org/October2021/#sec-Errors.Field-errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    pub message: String,
    /// Copied into the `extensions` of the response error
    pub extensions: JsonMap,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extensions: JsonMap::new(),
        }
    }

    pub fn with_extension(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.extensions.insert(key, value.into());
        self
    }
}

impl From<String> for FieldError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&'_ str> for FieldError {
    fn from(message: &'_ str) -> Self {
        Self::new(message)
    }
}
