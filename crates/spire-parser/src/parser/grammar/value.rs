use crate::ast::FloatValue;
use crate::ast::IntValue;
use crate::ast::Value;
use crate::parser::grammar::name;
use crate::parser::unescape_block_string;
use crate::parser::unescape_string;
use crate::parser::ParserState;
use crate::Node;
use crate::ParseError;
use crate::TokenKind;

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Constness {
    Const,
    NotConst,
}

/// See: https://spec.graphql.org/October2021/#Value
///
/// *Value[Const]*
///     [~Const] Variable
///     IntValue
///     FloatValue
///     StringValue
///     BooleanValue
///     NullValue
///     EnumValue
///     ListValue[?Const]
///     ObjectValue[?Const]
pub(crate) fn value(p: &mut ParserState, constness: Constness) -> Result<Node<Value>, ParseError> {
    let start = p.offset();
    let value = match p.peek() {
        TokenKind::Dollar => {
            if constness == Constness::Const {
                return Err(ParseError::with_loc(
                    "unexpected variable in a constant value",
                    "$".to_owned(),
                    start,
                ));
            }
            p.bump()?;
            Value::Variable(name::name(p)?)
        }
        TokenKind::Int => Value::Int(IntValue::new_parsed(p.bump()?.data())),
        TokenKind::Float => Value::Float(FloatValue::new_parsed(p.bump()?.data())),
        TokenKind::StringValue => {
            let token = p.bump()?;
            let data = token.data();
            let value = unescape_string(&data[1..data.len() - 1])
                .map_err(|message| ParseError::with_loc(message, data.to_owned(), start))?;
            Value::String(value)
        }
        TokenKind::BlockStringValue => {
            let data = p.bump()?.data();
            Value::String(unescape_block_string(&data[3..data.len() - 3]))
        }
        TokenKind::Name => match p.peek_data() {
            "true" => {
                p.bump()?;
                Value::Boolean(true)
            }
            "false" => {
                p.bump()?;
                Value::Boolean(false)
            }
            "null" => {
                p.bump()?;
                Value::Null
            }
            _ => Value::Enum(name::name(p)?),
        },
        TokenKind::LBracket => list_value(p, constness)?,
        TokenKind::LCurly => object_value(p, constness)?,
        _ => return Err(p.err("a value")),
    };
    Ok(Node::new_parsed(value, p.span_from(start)))
}

/// See: https://spec.graphql.org/October2021/#ListValue
///
/// *ListValue[Const]*:
///     **[** **]**
///     **[** Value[?Const]* **]**
fn list_value(p: &mut ParserState, constness: Constness) -> Result<Value, ParseError> {
    p.enter_nested()?;
    let result = (|| -> Result<Value, ParseError> {
        p.bump()?;
        let mut items = Vec::new();
        while !p.eat(TokenKind::RBracket)? {
            if p.at(TokenKind::Eof) {
                return Err(p.err("`]`"));
            }
            items.push(value(p, constness)?);
        }
        Ok(Value::List(items))
    })();
    p.leave_nested();
    result
}

/// See: https://spec.graphql.org/October2021/#ObjectValue
///
/// *ObjectValue[Const]*:
///     **{** **}**
///     **{** ObjectField[?Const]* **}**
///
/// *ObjectField[Const]*:
///     Name **:** Value[?Const]
fn object_value(p: &mut ParserState, constness: Constness) -> Result<Value, ParseError> {
    p.enter_nested()?;
    let result = (|| -> Result<Value, ParseError> {
        p.bump()?;
        let mut fields: Vec<(crate::Name, Node<Value>)> = Vec::new();
        while !p.eat(TokenKind::RCurly)? {
            let start = p.offset();
            let name = name::name(p)?;
            if fields.iter().any(|(existing, _)| *existing == name) {
                return Err(ParseError::with_loc(
                    format!("input object field `{name}` is given more than once"),
                    name.to_string(),
                    start,
                ));
            }
            p.expect(TokenKind::Colon, "`:`")?;
            fields.push((name, value(p, constness)?));
        }
        Ok(Value::Object(fields))
    })();
    p.leave_nested();
    result
}
