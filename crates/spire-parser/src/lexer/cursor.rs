use std::str::Chars;

/// Peekable iterator over a char sequence, tracking how many bytes were consumed.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    source: &'a str,
    chars: Chars<'a>,
}

pub(crate) const EOF_CHAR: char = '\0';

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Cursor<'a> {
        Cursor {
            source: input,
            chars: input.chars(),
        }
    }

    /// Number of bytes consumed so far.
    pub(crate) fn len_consumed(&self) -> usize {
        self.source.len() - self.chars.as_str().len()
    }

    /// The source text consumed so far.
    pub(crate) fn consumed(&self) -> &'a str {
        &self.source[..self.len_consumed()]
    }

    /// Peeks the next char without consuming it. Returns [`EOF_CHAR`] at the end of the input.
    pub(crate) fn first(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    /// Peeks the char after the next one.
    pub(crate) fn second(&self) -> char {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    /// Moves to the next character.
    pub(crate) fn bump(&mut self) -> Option<char> {
        self.chars.next()
    }

    /// Moves to the next character if it is `c`.
    pub(crate) fn eat(&mut self, c: char) -> bool {
        if !self.is_eof() && self.first() == c {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consumes characters while `predicate` holds.
    pub(crate) fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while !self.is_eof() && predicate(self.first()) {
            self.bump();
        }
    }
}
