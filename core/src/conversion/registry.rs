//! Conversion rules between engine types.
//!
//! The registry answers two questions: can a value of one type be turned into
//! another, and what is the converted value. Rules for built-in types are
//! fixed; conversions into host classes are delegated to handlers registered
//! per class name.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;

use hashbrown::HashMap;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::conversion::ConversionError;
use crate::types::{Primitive, Type};
use crate::values::Value;

/// Conversion into a host class.
pub trait ConversionHandler: Send + Sync {
    fn can_convert_from(&self, from: &Type<'_>) -> bool;

    fn convert<'a>(&self, value: &Value<'a>, to: Type<'a>) -> Result<Value<'a>, ConversionError>;
}

#[derive(Default)]
pub struct ConversionRegistry {
    handlers: HashMap<String, Box<dyn ConversionHandler>>,
}

impl fmt::Debug for ConversionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionRegistry")
            .field("handlers", &self.handlers.keys().collect::<alloc::vec::Vec<_>>())
            .finish()
    }
}

impl ConversionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler used for conversions into the class `name`.
    /// Replaces any previous handler for that class.
    pub fn register(&mut self, name: &str, handler: impl ConversionHandler + 'static) {
        tracing::debug!(class = name, "registered conversion handler");
        self.handlers.insert(name.to_string(), Box::new(handler));
    }

    /// Whether a value of type `from` can be converted to `to`.
    ///
    /// A source of type `Any` is always accepted here; whether the actual
    /// value converts is only known when `convert` runs.
    pub fn can_convert(&self, to: &Type<'_>, from: &Type<'_>) -> bool {
        if to.is_assignable_from(from) {
            return true;
        }
        match (to, from) {
            (_, Type::Any) => true,
            (Type::Any, _) | (Type::Str, _) => true,
            (to, Type::Null) => !to.is_primitive(),
            (Type::Class(class), from) => {
                if let Type::Class(from) = from {
                    if class.is_ancestor_of(from) {
                        return true;
                    }
                }
                self.handlers
                    .get(class.name)
                    .is_some_and(|handler| handler.can_convert_from(from))
            }
            (to, from) if to.is_number() => {
                from.is_number() || *from == Type::Str || is_char(from)
            }
            (to, from) if to.is_boolean() => from.is_boolean() || *from == Type::Str,
            (to, from) if is_char(to) => {
                is_char(from) || *from == Type::Str || from.is_integral_kind()
            }
            _ => false,
        }
    }

    /// Convert `value` to type `to`.
    pub fn convert<'a>(&self, value: &Value<'a>, to: Type<'a>) -> Result<Value<'a>, ConversionError> {
        if let Value::Null = value {
            return if to.is_primitive() {
                Err(unsupported(value, &to))
            } else {
                Ok(Value::Null)
            };
        }
        match to {
            Type::Any => Ok(value.clone()),
            Type::Str => Ok(Value::str(value.to_string())),
            Type::Primitive(p) | Type::Boxed(p) => to_primitive(value, p, &to),
            Type::BigInteger => to_big_integer(value, &to),
            Type::BigDecimal => to_big_decimal(value, &to),
            Type::Null => Err(unsupported(value, &to)),
            Type::Class(class) => {
                if let Value::Object(object) = value {
                    if class.is_ancestor_of(object.class) {
                        return Ok(value.clone());
                    }
                }
                match self.handlers.get(class.name) {
                    Some(handler) if handler.can_convert_from(&value.ty()) => {
                        handler.convert(value, to)
                    }
                    _ => Err(unsupported(value, &to)),
                }
            }
        }
    }
}

fn is_char(ty: &Type<'_>) -> bool {
    ty.primitive() == Some(Primitive::Char)
}

fn unsupported(value: &Value<'_>, to: &Type<'_>) -> ConversionError {
    ConversionError::Unsupported {
        from: value.ty().to_string(),
        to: to.to_string(),
    }
}

fn invalid(text: &str, to: &Type<'_>) -> ConversionError {
    ConversionError::InvalidLiteral {
        text: text.to_string(),
        to: to.to_string(),
    }
}

fn out_of_range(value: &Value<'_>, to: &Type<'_>) -> ConversionError {
    ConversionError::OutOfRange {
        value: value.to_string(),
        to: to.to_string(),
    }
}

/// A numeric source reduced to one of the two machine representations.
enum Number {
    Integral(i64),
    Floating(f64),
}

fn number_of(value: &Value<'_>, integral_target: bool) -> Option<Number> {
    match value {
        Value::Float(n) => Some(Number::Floating(*n as f64)),
        Value::Double(n) => Some(Number::Floating(*n)),
        Value::BigDecimal(n) if integral_target => n.trunc().to_i64().map(Number::Integral),
        Value::BigDecimal(n) => n.to_f64().map(Number::Floating),
        Value::BigInteger(n) if !integral_target => n.to_f64().map(Number::Floating),
        other => other.to_i64().map(Number::Integral),
    }
}

fn parse_number(text: &str, p: Primitive, to: &Type<'_>) -> Result<Number, ConversionError> {
    let trimmed = text.trim();
    let parsed = match p {
        Primitive::Float | Primitive::Double => trimmed.parse::<f64>().ok().map(Number::Floating),
        _ => trimmed.parse::<i64>().ok().map(Number::Integral),
    };
    parsed.ok_or_else(|| invalid(text, to))
}

fn to_primitive<'a>(value: &Value<'a>, p: Primitive, to: &Type<'a>) -> Result<Value<'a>, ConversionError> {
    match p {
        Primitive::Boolean => match value {
            Value::Boolean(b) => Ok(Value::Boolean(*b)),
            Value::Str(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Boolean(true)),
            Value::Str(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Boolean(false)),
            Value::Str(s) => Err(invalid(s, to)),
            _ => Err(unsupported(value, to)),
        },
        Primitive::Char => match value {
            Value::Char(c) => Ok(Value::Char(*c)),
            Value::Str(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(invalid(s, to)),
                }
            }
            _ => {
                let code = value.to_i64().ok_or_else(|| unsupported(value, to))?;
                u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .map(Value::Char)
                    .ok_or_else(|| out_of_range(value, to))
            }
        },
        _ => {
            let integral_target = !matches!(p, Primitive::Float | Primitive::Double);
            let number = match value {
                Value::Str(s) => parse_number(s, p, to)?,
                Value::Boolean(_) | Value::Object(_) | Value::Null => {
                    return Err(unsupported(value, to));
                }
                _ => number_of(value, integral_target).ok_or_else(|| out_of_range(value, to))?,
            };
            Ok(narrow(number, p))
        }
    }
}

/// Numeric narrowing with two's complement wrap for integers and
/// saturating float to integer casts.
fn narrow<'a>(number: Number, p: Primitive) -> Value<'a> {
    match (number, p) {
        (Number::Integral(n), Primitive::Byte) => Value::Byte(n as i8),
        (Number::Integral(n), Primitive::Short) => Value::Short(n as i16),
        (Number::Integral(n), Primitive::Long) => Value::Long(n),
        (Number::Integral(n), Primitive::Float) => Value::Float(n as f32),
        (Number::Integral(n), Primitive::Double) => Value::Double(n as f64),
        (Number::Integral(n), _) => Value::Int(n as i32),
        (Number::Floating(n), Primitive::Byte) => Value::Byte(n as i32 as i8),
        (Number::Floating(n), Primitive::Short) => Value::Short(n as i32 as i16),
        (Number::Floating(n), Primitive::Long) => Value::Long(n as i64),
        (Number::Floating(n), Primitive::Float) => Value::Float(n as f32),
        (Number::Floating(n), Primitive::Double) => Value::Double(n),
        (Number::Floating(n), _) => Value::Int(n as i32),
    }
}

fn to_big_integer<'a>(value: &Value<'a>, to: &Type<'a>) -> Result<Value<'a>, ConversionError> {
    match value {
        Value::Str(s) => BigInt::from_str(s.trim())
            .map(Value::BigInteger)
            .map_err(|_| invalid(s, to)),
        Value::Boolean(_) | Value::Object(_) => Err(unsupported(value, to)),
        _ => value
            .to_bigint()
            .map(Value::BigInteger)
            .ok_or_else(|| out_of_range(value, to)),
    }
}

fn to_big_decimal<'a>(value: &Value<'a>, to: &Type<'a>) -> Result<Value<'a>, ConversionError> {
    match value {
        Value::Str(s) => {
            let text = s.trim();
            Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .map(Value::BigDecimal)
                .map_err(|_| invalid(s, to))
        }
        Value::Boolean(_) | Value::Object(_) => Err(unsupported(value, to)),
        _ => value
            .to_decimal()
            .map(Value::BigDecimal)
            .ok_or_else(|| out_of_range(value, to)),
    }
}
