use std::fmt;

/// An error produced by the lexer or the parser.
///
/// Parsing stops at the first error: a document that does not conform to the
/// grammar is never executed, so there is no partial syntax tree to recover.
///
/// ## Example
/// ```rust
/// use spire_parser::Document;
/// use spire_parser::JsonMap;
///
/// let error = Document::parse("{ field(arg: ) }", &JsonMap::new()).unwrap_err();
/// assert_eq!(error.message(), "expected a value, got `)`");
/// assert_eq!(error.index(), 13);
/// ```
#[derive(PartialEq, Eq, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub(crate) message: String,
    pub(crate) data: String,
    pub(crate) index: usize,
}

impl ParseError {
    /// Create a new instance of `ParseError` at the start of the input.
    pub fn new<S: Into<String>>(message: S, data: String) -> Self {
        Self {
            message: message.into(),
            data,
            index: 0,
        }
    }

    /// Create a new instance of `ParseError` at a byte offset.
    pub fn with_loc<S: Into<String>>(message: S, data: String, index: usize) -> Self {
        Self {
            message: message.into(),
            data,
            index,
        }
    }

    pub(crate) fn limit<S: Into<String>>(message: S, index: usize) -> Self {
        Self::with_loc(message, String::new(), index)
    }

    /// The source text the error points at. This is usually the token that
    /// was found to be lexically or syntactically incorrect.
    pub fn data(&self) -> &str {
        self.data.as_ref()
    }

    /// Byte offset where the error begins in the input.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    /// The byte range covered by the error.
    pub fn span(&self) -> crate::SourceSpan {
        crate::SourceSpan::new(self.index, self.index + self.data.len())
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.index;
        let end = self.index + self.data.len();

        if self.data == "EOF" || self.data.is_empty() {
            write!(f, "ERROR@{}:{} {:?} {}", start, start, self.message, self.data)
        } else {
            write!(f, "ERROR@{}:{} {:?} {}", start, end, self.message, self.data)
        }
    }
}
