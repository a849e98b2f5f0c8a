//! Execution of operations against a [`Schema`] with resolvers.
//!
//! Queries resolve the fields of a selection set concurrently,
//! mutations resolve root fields one after another,
//! and subscriptions map each event of a source stream to a response.

mod batch;
mod engine;
mod input_coercion;
mod result_coercion;
mod subscription;

pub use self::input_coercion::coerce_argument_values;
pub use self::input_coercion::InputCoercionError;
pub(crate) use self::input_coercion::coerce_field_arguments;
pub(crate) use self::input_coercion::coerce_input_value;
use self::engine::execute_selection_set;
use self::engine::ExecutionContext;
use self::engine::ExecutionMode;
use self::engine::Prefetched;
use crate::ast::GetOperationError;
use crate::ast::OperationDefinition;
use crate::ast::OperationType;
use crate::resolver::ContextData;
use crate::resolver::FieldError;
use crate::resolver::ObjectValue;
use crate::response::GraphQLError;
use crate::response::Response;
use crate::schema::ObjectType;
use crate::schema::Schema;
use crate::Document;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// An error that prevents execution from starting. The response has no `data`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum RequestError {
    #[error(transparent)]
    GetOperation(#[from] GetOperationError),
    #[error("the schema does not define a root type for {operation_type} operations")]
    MissingRootType { operation_type: &'static str },
    #[error("subscription operations must be executed with `Executor::subscribe`")]
    SubscriptionWithExecute,
    #[error("expected a subscription operation, found a {operation_type}")]
    NotASubscription { operation_type: &'static str },
    #[error("a subscription must select exactly one root field")]
    SubscriptionRootField,
    #[error("{0}")]
    SubscriptionSource(FieldError),
    #[error("subscription root field must resolve to a stream, found {describe}")]
    InvalidSubscriptionSource { describe: &'static str },
}

impl RequestError {
    pub fn to_graphql_error(&self) -> GraphQLError {
        let error = GraphQLError::new(self.to_string(), None, "");
        match self {
            Self::MissingRootType { .. } | Self::SubscriptionRootField => {
                error.validation_should_have_caught_this()
            }
            Self::SubscriptionSource(source_error) => GraphQLError {
                extensions: source_error.extensions.clone(),
                ..error
            },
            _ => error,
        }
    }

    pub fn to_response(&self) -> Response {
        Response::from_errors(vec![self.to_graphql_error()])
    }
}

/// Configuration for executing operations of validated documents.
///
/// ```rust
/// use spire_engine::ast::Type;
/// use spire_engine::name;
/// use spire_engine::schema::{FieldDefinition, ObjectType, Schema};
/// use spire_engine::{Document, Executor, JsonMap, ObjectValue, ResolvedValue};
///
/// let schema = Schema::builder()
///     .object(ObjectType::new(name!("Query")).field(
///         FieldDefinition::new(name!("hello"), Type::Named(name!("String")))
///             .resolve(|_| Ok(ResolvedValue::leaf("world"))),
///     ))
///     .build()
///     .unwrap();
/// let document = Document::parse("{ hello }", &JsonMap::new()).unwrap();
/// spire_engine::validate(&schema, &document).unwrap();
/// let response = futures::executor::block_on(
///     Executor::new().execute(&schema, &document, ObjectValue::default()),
/// )
/// .unwrap();
/// assert_eq!(
///     serde_json::to_string(&response).unwrap(),
///     r#"{"data":{"hello":"world"},"errors":null}"#
/// );
/// ```
#[derive(Clone, Default)]
pub struct Executor {
    operation_name: Option<String>,
    cancellation_token: CancellationToken,
    context_data: ContextData,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the operation to execute when the document has several
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Once cancelled, resolvers are no longer invoked and subscriptions end
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Sets data available to every resolver through [`FieldContext::data`][crate::FieldContext::data]
    pub fn context_data<T: Any + Send + Sync>(mut self, data: T) -> Self {
        self.context_data = Some(Arc::new(data));
        self
    }

    /// Executes a query or mutation. `document` is expected to be valid against `schema`.
    ///
    /// Field errors are in the response. `Err` is only returned
    /// if execution could not start.
    pub async fn execute(
        &self,
        schema: &Schema,
        document: &Document,
        root_value: ObjectValue,
    ) -> Result<Response, RequestError> {
        let operation = document.get_operation(self.operation_name.as_deref())?;
        let mode = match operation.operation_type {
            OperationType::Query => ExecutionMode::Normal,
            OperationType::Mutation => ExecutionMode::Sequential,
            OperationType::Subscription => return Err(RequestError::SubscriptionWithExecute),
        };
        let root_type = self.root_type(schema, operation)?;
        let span = tracing::debug_span!(
            "execute",
            operation.kind = operation.operation_type.name(),
            operation.name = operation.name.as_deref(),
        );
        let response = async {
            let ctx = self.context(schema, document);
            let mut errors = Vec::new();
            let data = execute_selection_set(
                &ctx,
                &mut errors,
                None,
                mode,
                root_type,
                &root_value,
                operation.selection_set.iter().collect(),
                Prefetched::new(),
            )
            .await
            .ok();
            tracing::debug!(errors = errors.len(), "operation executed");
            Response { data, errors }
        }
        .instrument(span)
        .await;
        Ok(response)
    }

    fn root_type<'a>(
        &self,
        schema: &'a Schema,
        operation: &OperationDefinition,
    ) -> Result<&'a ObjectType, RequestError> {
        schema
            .root_operation(operation.operation_type)
            .and_then(|name| schema.get_object(name))
            .map(|def| &**def)
            .ok_or(RequestError::MissingRootType {
                operation_type: operation.operation_type.name(),
            })
    }

    fn context<'a>(&'a self, schema: &'a Schema, document: &'a Document) -> ExecutionContext<'a> {
        ExecutionContext {
            schema,
            document,
            cancellation_token: &self.cancellation_token,
            context_data: &self.context_data,
        }
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("operation_name", &self.operation_name)
            .field("cancelled", &self.cancellation_token.is_cancelled())
            .field("context_data", &self.context_data.is_some())
            .finish()
    }
}
