//! GraphQL requests as received over the wire: parse, validate, then execute.

use crate::diagnostic::ToDiagnostic;
use crate::execution::Executor;
use crate::resolver::ObjectValue;
use crate::response::Response;
use crate::schema::Schema;
use crate::Document;
use crate::JsonMap;
use serde::Deserialize;
use serde::Serialize;

/// A [request](https://graphql.github.io/graphql-over-http/draft/#sec-Request-Parameters)
/// as found in the body of an HTTP POST.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<JsonMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl Request {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn variables(mut self, variables: JsonMap) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn operation_name(mut self, operation_name: impl Into<String>) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }
}

/// Runs a request to completion.
///
/// Parse errors, validation errors, and request errors
/// become a response with `data: null`.
/// The operation name of the request overrides the one of `executor`.
pub async fn execute_request(
    schema: &Schema,
    request: &Request,
    root_value: ObjectValue,
    executor: &Executor,
) -> Response {
    let empty = JsonMap::new();
    let variables = request.variables.as_ref().unwrap_or(&empty);
    let document = match Document::parse(&request.query, variables) {
        Ok(document) => document,
        Err(error) => {
            tracing::debug!(%error, "request failed to parse");
            let json = error.to_diagnostic(request.query.as_str()).to_json();
            return Response::from_errors(vec![json]);
        }
    };
    if let Err(diagnostics) = crate::validation::validate(schema, &document) {
        return Response::from_errors(diagnostics.to_graphql_errors());
    }
    let executor = match &request.operation_name {
        Some(name) => executor.clone().operation_name(name.as_str()),
        None => executor.clone(),
    };
    match executor.execute(schema, &document, root_value).await {
        Ok(response) => response,
        Err(error) => error.to_response(),
    }
}
