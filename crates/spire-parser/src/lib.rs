#![doc = include_str!("../README.md")]

pub mod ast;
mod error;
mod lexer;
mod limit;
mod name;
mod node;
mod parser;

pub use crate::ast::Document;
pub use crate::error::ParseError;
pub use crate::lexer::Lexer;
pub use crate::lexer::Token;
pub use crate::lexer::TokenKind;
pub use crate::limit::LimitTracker;
pub use crate::name::InvalidNameError;
pub use crate::name::Name;
pub use crate::node::LineColumn;
pub use crate::node::Node;
pub use crate::node::SourceSpan;
pub use crate::parser::Parser;

/// A JSON-compatible value, as found in variables and responses.
pub type JsonValue = serde_json_bytes::Value;

/// A JSON-compatible object/map with string keys and [`JsonValue`] values.
pub type JsonMap = serde_json_bytes::Map<serde_json_bytes::ByteString, JsonValue>;
