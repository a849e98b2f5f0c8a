mod cursor;
mod token;

use crate::lexer::cursor::Cursor;
use crate::LimitTracker;
use crate::ParseError;

pub use token::Token;
pub use token::TokenKind;

/// Parses GraphQL source text into tokens.
/// ```rust
/// use spire_parser::Lexer;
///
/// let query = "
/// {
///     animal
///     ...snackSelection
///     ... on Pet {
///       playmates {
///         count
///       }
///     }
/// }
/// ";
/// let tokens = Lexer::new(query).lex().unwrap();
/// assert_eq!(tokens.last().unwrap().data(), "");
/// ```
///
/// Lexing stops at the first error.
#[derive(Clone, Debug)]
pub struct Lexer<'a> {
    input: &'a str,
    index: usize,
    finished: bool,
    limit: Option<LimitTracker>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer for a GraphQL source text.
    ///
    /// The Lexer is an iterator over tokens and errors:
    /// ```rust
    /// use spire_parser::Lexer;
    ///
    /// let query = "# --- GraphQL here ---";
    ///
    /// let mut lexer = Lexer::new(query);
    /// let mut tokens = vec![];
    /// for token in lexer {
    ///     match token {
    ///         Ok(token) => tokens.push(token),
    ///         Err(error) => panic!("{:?}", error),
    ///     }
    /// }
    /// ```
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            index: 0,
            finished: false,
            limit: None,
        }
    }

    /// Abort lexing with an error after `limit` tokens. Ignored tokens count too.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(LimitTracker::new(limit));
        self
    }

    /// The token limit tracker, if one was configured.
    pub fn limit_tracker(&self) -> Option<LimitTracker> {
        self.limit
    }

    /// Lex the full source text, consuming the lexer.
    pub fn lex(self) -> Result<Vec<Token<'a>>, ParseError> {
        self.collect()
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.input.is_empty() {
            self.finished = true;
            return Some(Ok(Token::new(TokenKind::Eof, "", self.index)));
        }

        if let Some(limit) = &mut self.limit {
            if limit.check_and_increment() {
                self.finished = true;
                return Some(Err(ParseError::limit(
                    "token limit reached, aborting lexing",
                    self.index,
                )));
            }
        }

        let mut cursor = Cursor::new(self.input);
        let result = cursor.advance();
        let data = cursor.consumed();
        let index = self.index;
        self.index += data.len();
        self.input = &self.input[data.len()..];

        match result {
            Ok(kind) => Some(Ok(Token::new(kind, data, index))),
            Err(message) => {
                self.finished = true;
                Some(Err(ParseError::with_loc(message, data.to_owned(), index)))
            }
        }
    }
}

impl Cursor<'_> {
    fn advance(&mut self) -> Result<TokenKind, String> {
        let Some(first_char) = self.bump() else {
            return Ok(TokenKind::Eof);
        };

        match first_char {
            '"' => self.string_value(),
            '#' => {
                self.eat_while(|c| !is_line_terminator(c));
                Ok(TokenKind::Comment)
            }
            '.' => self.spread_operator(),
            c if is_whitespace(c) => {
                self.eat_while(is_whitespace);
                Ok(TokenKind::Whitespace)
            }
            c if is_name_start(c) => {
                self.eat_while(is_name_continue);
                Ok(TokenKind::Name)
            }
            c @ '-' => self.number(c),
            c if is_digit_char(c) => self.number(c),
            ',' => Ok(TokenKind::Comma),
            '!' => Ok(TokenKind::Bang),
            '$' => Ok(TokenKind::Dollar),
            '&' => Ok(TokenKind::Amp),
            '(' => Ok(TokenKind::LParen),
            ')' => Ok(TokenKind::RParen),
            ':' => Ok(TokenKind::Colon),
            '=' => Ok(TokenKind::Eq),
            '@' => Ok(TokenKind::At),
            '[' => Ok(TokenKind::LBracket),
            ']' => Ok(TokenKind::RBracket),
            '{' => Ok(TokenKind::LCurly),
            '|' => Ok(TokenKind::Pipe),
            '}' => Ok(TokenKind::RCurly),
            c => Err(format!("unexpected character `{c}`")),
        }
    }

    /// See: https://spec.graphql.org/October2021/#StringValue
    ///
    /// *StringValue*:
    ///     **""** [lookahead != **"**]
    ///     **"** StringCharacter* **"**
    ///     **"""** BlockStringCharacter* **"""**
    fn string_value(&mut self) -> Result<TokenKind, String> {
        if self.first() == '"' && self.second() == '"' {
            self.bump();
            self.bump();
            return self.block_string_value();
        }

        loop {
            let Some(c) = self.bump() else {
                return Err("unterminated string value".to_owned());
            };
            match c {
                '"' => return Ok(TokenKind::StringValue),
                '\\' => {
                    let escaped = self.bump().unwrap_or(cursor::EOF_CHAR);
                    if escaped == 'u' {
                        for _ in 0..4 {
                            if !self.first().is_ascii_hexdigit() {
                                return Err("invalid unicode escape sequence".to_owned());
                            }
                            self.bump();
                        }
                    } else if !is_escaped_char(escaped) {
                        return Err(format!("unexpected escaped character `{escaped}`"));
                    }
                }
                c if is_line_terminator(c) => {
                    return Err("unexpected line terminator".to_owned());
                }
                c if is_control_char(c) => {
                    return Err(format!("unexpected control character {:?}", c));
                }
                _ => {}
            }
        }
    }

    /// See: https://spec.graphql.org/October2021/#BlockStringCharacter
    fn block_string_value(&mut self) -> Result<TokenKind, String> {
        loop {
            let Some(c) = self.bump() else {
                return Err("unterminated block string value".to_owned());
            };
            match c {
                '\\' if self.first() == '"' && self.second() == '"' => {
                    // `\"""` is an escaped triple quote, not the terminator.
                    let mut quotes = self.clone();
                    quotes.bump();
                    quotes.bump();
                    if quotes.first() == '"' {
                        self.bump();
                        self.bump();
                        self.bump();
                    }
                }
                '"' if self.first() == '"' && self.second() == '"' => {
                    self.bump();
                    self.bump();
                    return Ok(TokenKind::BlockStringValue);
                }
                c if is_control_char(c) => {
                    return Err(format!("unexpected control character {:?}", c));
                }
                _ => {}
            }
        }
    }

    fn spread_operator(&mut self) -> Result<TokenKind, String> {
        if self.eat('.') && self.eat('.') {
            Ok(TokenKind::Spread)
        } else {
            Err("unterminated spread operator".to_owned())
        }
    }

    /// See: https://spec.graphql.org/October2021/#IntValue
    /// and https://spec.graphql.org/October2021/#FloatValue
    fn number(&mut self, first_char: char) -> Result<TokenKind, String> {
        let first_digit = if first_char == '-' {
            match self.bump() {
                Some(c) if is_digit_char(c) => c,
                _ => return Err("expected a digit after `-`".to_owned()),
            }
        } else {
            first_char
        };

        if first_digit == '0' && is_digit_char(self.first()) {
            return Err("unexpected leading zero in number".to_owned());
        }
        self.eat_while(is_digit_char);

        let mut kind = TokenKind::Int;
        if self.first() == '.' {
            self.bump();
            if !is_digit_char(self.first()) {
                return Err("expected a digit after `.` in number".to_owned());
            }
            self.eat_while(is_digit_char);
            kind = TokenKind::Float;
        }
        if matches!(self.first(), 'e' | 'E') {
            self.bump();
            if matches!(self.first(), '+' | '-') {
                self.bump();
            }
            if !is_digit_char(self.first()) {
                return Err("expected a digit in number exponent".to_owned());
            }
            self.eat_while(is_digit_char);
            kind = TokenKind::Float;
        }

        let next = self.first();
        if !self.is_eof() && (next == '.' || is_name_start(next)) {
            self.bump();
            return Err(format!("unexpected character `{next}` in number"));
        }
        Ok(kind)
    }
}

/// WhiteSpace and LineTerminator, plus the Unicode BOM.
fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | ' ' | '\n' | '\r' | '\u{FEFF}')
}

fn is_name_start(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_name_continue(c: char) -> bool {
    is_name_start(c) || is_digit_char(c)
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r')
}

fn is_digit_char(c: char) -> bool {
    c.is_ascii_digit()
}

// SourceCharacter excludes control characters other than tab and line terminators.
fn is_control_char(c: char) -> bool {
    c < ' ' && !matches!(c, '\t' | '\n' | '\r')
}

// EscapedCharacter
//     "  \  /  b  f  n  r  t
fn is_escaped_char(c: char) -> bool {
    matches!(c, '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't')
}
