//! Serialization back to GraphQL syntax.

use super::*;
use std::fmt;
use std::fmt::Display;
use std::fmt::Write;

struct Indented<'a, 'f> {
    f: &'a mut fmt::Formatter<'f>,
    level: usize,
}

impl Indented<'_, '_> {
    fn new_line(&mut self) -> fmt::Result {
        self.f.write_char('\n')?;
        for _ in 0..self.level {
            self.f.write_str("  ")?;
        }
        Ok(())
    }

    fn selection_set(&mut self, selection_set: &[Selection]) -> fmt::Result {
        if selection_set.is_empty() {
            return Ok(());
        }
        self.f.write_str(" {")?;
        self.level += 1;
        for selection in selection_set {
            self.new_line()?;
            self.selection(selection)?;
        }
        self.level -= 1;
        self.new_line()?;
        self.f.write_char('}')
    }

    fn selection(&mut self, selection: &Selection) -> fmt::Result {
        match selection {
            Selection::Field(field) => {
                if let Some(alias) = &field.alias {
                    write!(self.f, "{alias}: ")?;
                }
                write!(self.f, "{}", field.name)?;
                arguments(self.f, &field.arguments)?;
                write!(self.f, "{}", field.directives)?;
                self.selection_set(&field.selection_set)
            }
            Selection::FragmentSpread(spread) => {
                write!(self.f, "...{}{}", spread.fragment_name, spread.directives)
            }
            Selection::InlineFragment(inline) => {
                self.f.write_str("...")?;
                if let Some(type_condition) = &inline.type_condition {
                    write!(self.f, " on {type_condition}")?;
                }
                write!(self.f, "{}", inline.directives)?;
                self.selection_set(&inline.selection_set)
            }
        }
    }
}

fn arguments(f: &mut fmt::Formatter<'_>, arguments: &[Node<Argument>]) -> fmt::Result {
    if arguments.is_empty() {
        return Ok(());
    }
    f.write_char('(')?;
    for (i, argument) in arguments.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{argument}")?;
    }
    f.write_char(')')
}

fn string_value(f: &mut fmt::Formatter<'_>, mut str: &str) -> fmt::Result {
    f.write_char('"')?;
    while let Some(i) = str.find(|c| (c < ' ' && c != '\t') || c == '"' || c == '\\') {
        let (without_escaping, rest) = str.split_at(i);
        f.write_str(without_escaping)?;
        // All characters that need escaping are in the ASCII range,
        // and so take a single byte in UTF-8.
        match rest.as_bytes()[0] {
            b'\x08' => f.write_str("\\b")?,
            b'\n' => f.write_str("\\n")?,
            b'\x0C' => f.write_str("\\f")?,
            b'\r' => f.write_str("\\r")?,
            b'"' => f.write_str("\\\"")?,
            b'\\' => f.write_str("\\\\")?,
            byte => write!(f, "\\u{:04X}", byte)?,
        }
        str = &rest[1..]
    }
    f.write_str(str)?;
    f.write_char('"')
}

impl Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for operation in &self.operations {
            if !first {
                f.write_str("\n\n")?;
            }
            first = false;
            write!(f, "{operation}")?;
        }
        for fragment in self.fragments.values() {
            if !first {
                f.write_str("\n\n")?;
            }
            first = false;
            write!(f, "{fragment}")?;
        }
        Ok(())
    }
}

impl Display for OperationDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shorthand = self.operation_type == OperationType::Query
            && self.name.is_none()
            && self.variables.is_empty()
            && self.directives.is_empty();
        if shorthand {
            f.write_char('{')?;
        } else {
            f.write_str(self.operation_type.name())?;
            if let Some(name) = &self.name {
                write!(f, " {name}")?;
            }
            if !self.variables.is_empty() {
                f.write_char('(')?;
                for (i, variable) in self.variables.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{variable}")?;
                }
                f.write_char(')')?;
            }
            write!(f, "{}", self.directives)?;
            f.write_str(" {")?;
        }
        let mut indented = Indented { f, level: 1 };
        for selection in &self.selection_set {
            indented.new_line()?;
            indented.selection(selection)?;
        }
        f.write_str("\n}")
    }
}

impl Display for FragmentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fragment {} on {}{}",
            self.name, self.type_condition, self.directives
        )?;
        Indented { f, level: 0 }.selection_set(&self.selection_set)
    }
}

impl Display for VariableDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}: {}", self.name, self.ty)?;
        if let Some(default_value) = &self.default_value {
            write!(f, " = {default_value}")?;
        }
        write!(f, "{}", self.directives)
    }
}

impl Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Indented { f, level: 0 }.selection(self)
    }
}

impl Display for DirectiveList {
    /// Serialized with a leading space when not empty
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for directive in self {
            write!(f, " {directive}")?;
        }
        Ok(())
    }
}

impl Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        arguments(f, &self.arguments)
    }
}

impl Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Enum(name) => write!(f, "{name}"),
            Value::Variable(name) => write!(f, "${name}"),
            Value::String(value) => string_value(f, value),
            Value::Float(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::List(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            Value::Object(fields) => {
                f.write_char('{')?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, " {name}: {value}")?;
                }
                if !fields.is_empty() {
                    f.write_char(' ')?;
                }
                f.write_char('}')
            }
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => write!(f, "{name}"),
            Type::NonNullNamed(name) => write!(f, "{name}!"),
            Type::List(inner) => write!(f, "[{inner}]"),
            Type::NonNullList(inner) => write!(f, "[{inner}]!"),
        }
    }
}

impl Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

impl Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}
