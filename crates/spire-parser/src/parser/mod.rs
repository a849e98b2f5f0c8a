pub(crate) mod grammar;
mod substitute;
mod unescape;

use crate::ast::Document;
use crate::lexer::Lexer;
use crate::lexer::Token;
use crate::lexer::TokenKind;
use crate::JsonMap;
use crate::LimitTracker;
use crate::ParseError;
use crate::SourceSpan;

pub(crate) use unescape::unescape_block_string;
pub(crate) use unescape::unescape_string;

/// Nesting of selection sets, list and object values and list types
/// allowed when no limit is configured.
const DEFAULT_RECURSION_LIMIT: usize = 500;

/// Configuration for parsing an input string as a GraphQL executable document.
///
/// ## Example
///
/// ```rust
/// use spire_parser::JsonMap;
/// use spire_parser::Parser;
/// use spire_parser::ast::Value;
///
/// let mut variables = JsonMap::new();
/// variables.insert("id", "cat".into());
///
/// let query = "query Animal($id: ID!) { animal(id: $id) { name } }";
/// let document = Parser::new()
///     .token_limit(100)
///     .parse(query, &variables)
///     .unwrap();
///
/// let operation = document.get_operation(None).unwrap();
/// let field = operation.selection_set[0].as_field().unwrap();
/// assert_eq!(*field.arguments[0].value, Value::String("cat".into()));
/// ```
#[derive(Default, Debug, Clone)]
pub struct Parser {
    recursion_limit: Option<usize>,
    token_limit: Option<usize>,
    recursion_reached: usize,
    tokens_reached: usize,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the recursion to use while parsing.
    /// The default limit is 500.
    pub fn recursion_limit(mut self, value: usize) -> Self {
        self.recursion_limit = Some(value);
        self
    }

    /// Configure the limit on the number of tokens to parse.
    /// If an input document is too big, parsing will be aborted.
    /// By default, there is no limit.
    pub fn token_limit(mut self, value: usize) -> Self {
        self.token_limit = Some(value);
        self
    }

    /// Parse `source_text` into a document, replacing variable references
    /// with the values from `variables` or the variables' default values.
    pub fn parse(&mut self, source_text: &str, variables: &JsonMap) -> Result<Document, ParseError> {
        let mut lexer = Lexer::new(source_text);
        if let Some(limit) = self.token_limit {
            lexer = lexer.with_limit(limit);
        }
        let recursion_limit = self.recursion_limit.unwrap_or(DEFAULT_RECURSION_LIMIT);
        let mut state = ParserState::new(lexer, recursion_limit);
        let result = state
            .start()
            .and_then(|()| grammar::document::document(&mut state, source_text));
        self.recursion_reached = state.recursion.high;
        self.tokens_reached = state.lexer.limit_tracker().map_or(0, |limit| limit.high);

        let mut document = result?;
        substitute::substitute_variables(&mut document, variables)?;
        Ok(document)
    }

    /// Get the current recursion limit high-water mark.
    ///
    /// This is how deep the parser recursed during the last call to `parse`.
    pub fn recursion_reached(&self) -> usize {
        self.recursion_reached
    }

    /// Get how many tokens were lexed during the last call to `parse`.
    ///
    /// Only tracked when a token limit is configured.
    pub fn tokens_reached(&self) -> usize {
        self.tokens_reached
    }
}

/// Token cursor used by the grammar functions.
///
/// Ignored tokens are skipped: `current` is always a significant token.
pub(crate) struct ParserState<'a> {
    lexer: Lexer<'a>,
    current: Token<'a>,
    /// End offset of the last consumed significant token.
    last_end: usize,
    pub(crate) recursion: LimitTracker,
}

impl<'a> ParserState<'a> {
    fn new(lexer: Lexer<'a>, recursion_limit: usize) -> Self {
        Self {
            lexer,
            current: Token::new(TokenKind::Eof, "", 0),
            last_end: 0,
            recursion: LimitTracker::new(recursion_limit),
        }
    }

    fn start(&mut self) -> Result<(), ParseError> {
        self.current = self.next_significant()?;
        Ok(())
    }

    fn next_significant(&mut self) -> Result<Token<'a>, ParseError> {
        loop {
            match self.lexer.next() {
                Some(Ok(token)) if token.kind().is_ignored() => continue,
                Some(Ok(token)) => return Ok(token),
                Some(Err(error)) => return Err(error),
                None => return Ok(Token::new(TokenKind::Eof, "", self.last_end)),
            }
        }
    }

    /// Get current token's kind.
    pub(crate) fn peek(&self) -> TokenKind {
        self.current.kind()
    }

    /// Get current token's data.
    pub(crate) fn peek_data(&self) -> &'a str {
        self.current.data()
    }

    /// Byte offset of the current token.
    pub(crate) fn offset(&self) -> usize {
        self.current.index()
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current.kind() == kind
    }

    /// Whether the current token is the given keyword.
    pub(crate) fn at_keyword(&self, keyword: &str) -> bool {
        self.at(TokenKind::Name) && self.current.data() == keyword
    }

    /// Consume the current token and move on to the next significant one.
    pub(crate) fn bump(&mut self) -> Result<Token<'a>, ParseError> {
        let token = self.current;
        self.last_end = token.end();
        self.current = self.next_significant()?;
        Ok(token)
    }

    /// Consume the current token if it is of the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        if self.at(kind) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume a token of the given kind, or fail with "expected {expected}".
    pub(crate) fn expect(
        &mut self,
        kind: TokenKind,
        expected: &str,
    ) -> Result<Token<'a>, ParseError> {
        if self.at(kind) {
            self.bump()
        } else {
            Err(self.err(expected))
        }
    }

    /// An error for an unexpected current token.
    pub(crate) fn err(&self, expected: &str) -> ParseError {
        if self.at(TokenKind::Eof) {
            ParseError::with_loc(
                format!("expected {expected}, got end of input"),
                "EOF".to_owned(),
                self.current.index(),
            )
        } else {
            ParseError::with_loc(
                format!("expected {expected}, got `{}`", self.current.data()),
                self.current.data().to_owned(),
                self.current.index(),
            )
        }
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: usize) -> SourceSpan {
        SourceSpan::new(start, self.last_end.max(start))
    }

    /// Enter a nested construct, failing once the recursion limit is exceeded.
    pub(crate) fn enter_nested(&mut self) -> Result<(), ParseError> {
        if self.recursion.check_and_increment() {
            Err(ParseError::limit(
                "parser recursion limit reached",
                self.current.index(),
            ))
        } else {
            Ok(())
        }
    }

    pub(crate) fn leave_nested(&mut self) {
        self.recursion.decrement()
    }
}
