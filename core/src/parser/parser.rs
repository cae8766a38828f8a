use alloc::string::{String, ToString};
use core::str::FromStr;

use num_bigint::BigInt;
use pest::Parser;
use pest::iterators::Pairs;
use pest_derive::Parser;
use rust_decimal::Decimal;

use crate::parser::error::{ParseError, ParseErrorKind, convert_pest_error};
use crate::parser::{Operator, Span};
use crate::types::Type;
use crate::values::Value;

#[derive(Parser)]
#[grammar = "parser/expression.pest"]
pub struct ExpressionParser;

/// Default limit on parenthesis nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Parse a whole program. The returned pairs hold a single `main` pair.
pub fn parse(source: &str) -> Result<Pairs<'_, Rule>, ParseError> {
    parse_with_max_depth(source, DEFAULT_MAX_DEPTH)
}

/// Parse a whole program, rejecting parentheses nested deeper than
/// `max_depth` before the grammar recurses into them.
pub fn parse_with_max_depth(source: &str, max_depth: usize) -> Result<Pairs<'_, Rule>, ParseError> {
    check_nesting(source, max_depth)?;
    ExpressionParser::parse(Rule::main, source).map_err(|e| convert_pest_error(e, source))
}

/// Scan for parenthesis nesting, skipping string literals and comments.
fn check_nesting(source: &str, max_depth: usize) -> Result<(), ParseError> {
    let mut depth = 0usize;
    let mut chars = source.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        match c {
            '"' | '\'' => {
                while let Some((_, next)) = chars.next() {
                    if next == '\\' {
                        chars.next();
                    } else if next == c {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                for (_, next) in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut star = false;
                for (_, next) in chars.by_ref() {
                    if star && next == '/' {
                        break;
                    }
                    star = next == '*';
                }
            }
            '(' => {
                depth += 1;
                if depth > max_depth {
                    return Err(ParseError::new(
                        ParseErrorKind::MaxDepthExceeded { depth, max_depth },
                        Span(offset..offset + 1),
                    ));
                }
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Operator for a binary operator rule.
pub fn operator_of(rule: Rule) -> Option<Operator> {
    let op = match rule {
        Rule::or => Operator::Or,
        Rule::and => Operator::And,
        Rule::eq => Operator::Eq,
        Rule::neq => Operator::Neq,
        Rule::le => Operator::Le,
        Rule::ge => Operator::Ge,
        Rule::lt => Operator::Lt,
        Rule::gt => Operator::Gt,
        Rule::ushr => Operator::UShr,
        Rule::shr => Operator::Shr,
        Rule::shl => Operator::Shl,
        Rule::bit_or => Operator::BitOr,
        Rule::bit_xor => Operator::BitXor,
        Rule::bit_and => Operator::BitAnd,
        Rule::add => Operator::Add,
        Rule::sub => Operator::Sub,
        Rule::pow => Operator::Pow,
        Rule::mul => Operator::Mul,
        Rule::div => Operator::Div,
        Rule::rem => Operator::Mod,
        _ => return None,
    };
    Some(op)
}

/// Decode a number literal into its value and (boxed) type.
///
/// Unsuffixed integers are `Integer` when they fit and `Long` otherwise; a
/// fractional part makes the literal a `Double`.
pub fn parse_number<'a>(text: &str) -> Result<(Value<'a>, Type<'a>), ParseErrorKind> {
    let invalid = || ParseErrorKind::InvalidNumber {
        text: text.to_string(),
    };
    let (digits, suffix) = match text.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&text[..i], Some(c)),
        _ => (text, None),
    };
    let fractional = digits.contains('.');

    let value = match suffix {
        Some('L' | 'l') if !fractional => digits.parse::<i64>().map(Value::Long).ok(),
        Some('f' | 'F') => digits.parse::<f32>().map(Value::Float).ok(),
        Some('d' | 'D') => digits.parse::<f64>().map(Value::Double).ok(),
        Some('I') if !fractional => BigInt::from_str(digits).map(Value::BigInteger).ok(),
        Some('B') => Decimal::from_str(digits).map(Value::BigDecimal).ok(),
        Some(_) => None,
        None if fractional => digits.parse::<f64>().map(Value::Double).ok(),
        None => digits
            .parse::<i32>()
            .map(Value::Int)
            .ok()
            .or_else(|| digits.parse::<i64>().map(Value::Long).ok()),
    };
    let value = value.ok_or_else(invalid)?;
    let ty = value.ty();
    Ok((value, ty))
}

/// Resolve escape sequences in the body of a string literal.
pub fn unescape(raw: &str) -> Result<String, ParseErrorKind> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
                match decoded {
                    Some(c) => out.push(c),
                    None => {
                        return Err(ParseErrorKind::InvalidEscape {
                            text: alloc::format!("\\u{}", hex),
                        });
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Ok(out)
}
