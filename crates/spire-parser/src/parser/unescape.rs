//! Decoding of lexed string tokens into their values.

/// Handle escaped characters in a StringValue, without the surrounding quotes.
///
/// The lexer already rejected unknown escapes and malformed `\u` sequences,
/// only surrogate pairing can still fail here.
pub(crate) fn unescape_string(input: &str) -> Result<String, &'static str> {
    let mut output = String::with_capacity(input.len());

    let mut iter = input.chars();
    while let Some(c) = iter.next() {
        if c != '\\' {
            output.push(c);
            continue;
        }
        let Some(c2) = iter.next() else {
            output.push(c);
            break;
        };
        match c2 {
            '"' | '\\' | '/' => output.push(c2),
            'b' => output.push('\u{0008}'),
            'f' => output.push('\u{000c}'),
            'n' => output.push('\n'),
            'r' => output.push('\r'),
            't' => output.push('\t'),
            'u' => {
                let value = hex_value(&mut iter)?;
                let c = match value {
                    0xD800..=0xDBFF => {
                        // Leading surrogate, must be followed by `\uDC00`..`\uDFFF`
                        let rest = iter.as_str();
                        if !rest.starts_with("\\u") {
                            return Err("unpaired surrogate in unicode escape sequence");
                        }
                        iter.nth(1);
                        let trailing = hex_value(&mut iter)?;
                        if !(0xDC00..=0xDFFF).contains(&trailing) {
                            return Err("unpaired surrogate in unicode escape sequence");
                        }
                        let code_point = 0x10000 + ((value - 0xD800) << 10) + (trailing - 0xDC00);
                        char::from_u32(code_point)
                    }
                    0xDC00..=0xDFFF => None,
                    _ => char::from_u32(value),
                };
                output.push(c.ok_or("unpaired surrogate in unicode escape sequence")?);
            }
            _ => return Err("invalid escape sequence"),
        }
    }

    Ok(output)
}

fn hex_value(iter: &mut std::str::Chars<'_>) -> Result<u32, &'static str> {
    let mut value = 0;
    for _ in 0..4 {
        let digit = iter
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or("invalid unicode escape sequence")?;
        value = (value << 4) + digit;
    }
    Ok(value)
}

const ESCAPED_TRIPLE_QUOTE: &str = r#"\""""#;
const TRIPLE_QUOTE: &str = r#"""""#;

/// Iterator over the lines in a GraphQL string, using GraphQL's definition of newlines
/// (\r\n, \n, or just \r).
struct GraphQLLines<'a> {
    input: &'a str,
    finished: bool,
}

impl<'a> Iterator for GraphQLLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        // An empty string still produces one line.
        if self.finished {
            return None;
        }

        let Some(index) = self.input.find(['\r', '\n']) else {
            self.finished = true;
            return Some(self.input);
        };
        let line = &self.input[..index];
        self.input = match self.input.get(index..=index + 1) {
            Some("\r\n") => &self.input[index + 2..],
            _ => &self.input[index + 1..],
        };
        Some(line)
    }
}

fn split_lines(input: &str) -> GraphQLLines<'_> {
    GraphQLLines {
        input,
        finished: false,
    }
}

/// The block string value of a BlockStringValue token, without the surrounding triple quotes.
///
/// Removes the common indentation and leading and trailing blank lines, normalizes
/// line terminators to `\n` and unescapes `\"""`.
///
/// See: https://spec.graphql.org/October2021/#BlockStringValue()
pub(crate) fn unescape_block_string(raw_value: &str) -> String {
    fn is_whitespace(c: char) -> bool {
        matches!(c, ' ' | '\t')
    }
    fn is_whitespace_line(line: &str) -> bool {
        line.chars().all(is_whitespace)
    }
    fn count_indent(line: &str) -> usize {
        line.chars().take_while(|&c| is_whitespace(c)).count()
    }

    // The first line never counts towards the common indentation.
    let common_indent = split_lines(raw_value)
        .skip(1)
        .filter_map(|line| {
            // `count_indent` only counts one-byte characters so byte length compares fine
            let indent = count_indent(line);
            (indent < line.len()).then_some(indent)
        })
        .min()
        .unwrap_or(0);

    let mut lines = split_lines(raw_value)
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                line
            } else {
                &line[common_indent.min(line.len())..]
            }
        })
        .skip_while(|line| is_whitespace_line(line));

    let mut formatted = String::with_capacity(raw_value.len());
    if let Some(line) = lines.next() {
        formatted.push_str(&line.replace(ESCAPED_TRIPLE_QUOTE, TRIPLE_QUOTE));
    }

    let mut final_char_index = formatted.len();
    for line in lines {
        formatted.push('\n');
        formatted.push_str(&line.replace(ESCAPED_TRIPLE_QUOTE, TRIPLE_QUOTE));

        if !is_whitespace_line(line) {
            final_char_index = formatted.len();
        }
    }
    // Trailing blank lines
    formatted.truncate(final_char_index);

    formatted
}
