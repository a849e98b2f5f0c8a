use std::fmt;

/// A token kind produced by the [`Lexer`](crate::Lexer).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Whitespace,
    Comment,
    Comma,
    Bang,
    Dollar,
    Amp,
    Spread,
    LParen,
    RParen,
    Colon,
    Eq,
    At,
    LBracket,
    RBracket,
    LCurly,
    RCurly,
    Pipe,
    Name,
    StringValue,
    BlockStringValue,
    Int,
    Float,
    Eof,
}

impl TokenKind {
    /// Ignored tokens carry no meaning for the grammar.
    /// See: https://spec.graphql.org/October2021/#Ignored
    pub fn is_ignored(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::Comma
        )
    }
}

/// A lexed token: its kind, the source text it covers, and its byte offset.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub(crate) kind: TokenKind,
    pub(crate) data: &'a str,
    pub(crate) index: usize,
}

impl<'a> Token<'a> {
    pub(crate) fn new(kind: TokenKind, data: &'a str, index: usize) -> Self {
        Self { kind, data, index }
    }

    /// Get a reference to the token's kind.
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Get a reference to the token's source text.
    pub fn data(&self) -> &'a str {
        self.data
    }

    /// Get the token's byte offset.
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn end(&self) -> usize {
        self.index + self.data.len()
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.index;
        let end = self.end();

        match self.kind {
            TokenKind::Eof => write!(f, "EOF@{start}:{start}"),
            kind => write!(f, "{kind:?}@{start}:{end} {:?}", self.data),
        }
    }
}
