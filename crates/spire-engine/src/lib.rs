#![doc = include_str!("../README.md")]

pub mod diagnostic;
pub mod execution;
mod request;
pub mod resolver;
pub mod response;
pub mod schema;
pub mod validation;

pub use crate::execution::Executor;
pub use crate::execution::RequestError;
pub use crate::request::execute_request;
pub use crate::request::Request;
pub use crate::resolver::BatchContext;
pub use crate::resolver::FieldContext;
pub use crate::resolver::FieldError;
pub use crate::resolver::ObjectValue;
pub use crate::resolver::ResolvedValue;
pub use crate::response::GraphQLError;
pub use crate::response::Response;
pub use crate::schema::Schema;
pub use crate::validation::validate;
pub use crate::validation::validate_selection_set;
pub use crate::validation::DiagnosticList;
pub use spire_parser::ast;
pub use spire_parser::name;
pub use spire_parser::Document;
pub use spire_parser::JsonMap;
pub use spire_parser::JsonValue;
pub use spire_parser::LineColumn;
pub use spire_parser::Name;
pub use spire_parser::Node;
pub use spire_parser::ParseError;
pub use spire_parser::Parser;
pub use spire_parser::SourceSpan;
