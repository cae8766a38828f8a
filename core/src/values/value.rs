use alloc::sync::Arc;
use core::any::Any;
use core::fmt;
use core::str::FromStr;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::types::{ClassType, Primitive, Type};

/// Payload of a host object.
///
/// Host objects are opaque to the engine: it can print them and compare them
/// for equality, nothing else.
pub trait HostValue: fmt::Debug + fmt::Display + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;

    /// Equality used by `==` and `!=`. Defaults to identity.
    fn equals(&self, other: &dyn HostValue) -> bool {
        core::ptr::addr_eq(self as *const Self, other as *const dyn HostValue)
    }
}

/// An instance of a host-declared class.
#[derive(Clone)]
pub struct HostObject<'a> {
    pub class: &'a ClassType<'a>,
    pub data: Arc<dyn HostValue>,
}

impl fmt::Debug for HostObject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.class.name, self.data)
    }
}

impl PartialEq for HostObject<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.class.name == other.class.name && self.data.equals(other.data.as_ref())
    }
}

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Null,
    Boolean(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    BigInteger(BigInt),
    BigDecimal(Decimal),
    Str(Arc<str>),
    Object(HostObject<'a>),
}

impl<'a> Value<'a> {
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Wrap host data as an instance of `class`. Returns `None` when `class`
    /// is not a class type.
    pub fn object(class: Type<'a>, data: impl HostValue) -> Option<Self> {
        match class {
            Type::Class(class) => Some(Value::Object(HostObject {
                class,
                data: Arc::new(data),
            })),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The boxed static type describing this value.
    pub fn ty(&self) -> Type<'a> {
        match self {
            Value::Null => Type::Null,
            Value::Boolean(_) => Type::Boxed(Primitive::Boolean),
            Value::Char(_) => Type::Boxed(Primitive::Char),
            Value::Byte(_) => Type::Boxed(Primitive::Byte),
            Value::Short(_) => Type::Boxed(Primitive::Short),
            Value::Int(_) => Type::Boxed(Primitive::Int),
            Value::Long(_) => Type::Boxed(Primitive::Long),
            Value::Float(_) => Type::Boxed(Primitive::Float),
            Value::Double(_) => Type::Boxed(Primitive::Double),
            Value::BigInteger(_) => Type::BigInteger,
            Value::BigDecimal(_) => Type::BigDecimal,
            Value::Str(_) => Type::Str,
            Value::Object(object) => Type::Class(object.class),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integral view of the value. Floating values are not integral.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Char(c) => Some(*c as i64),
            Value::Byte(n) => Some(*n as i64),
            Value::Short(n) => Some(*n as i64),
            Value::Int(n) => Some(*n as i64),
            Value::Long(n) => Some(*n),
            Value::BigInteger(n) => n.to_i64(),
            _ => None,
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n as f64),
            Value::Double(n) => Some(*n),
            Value::BigInteger(n) => n.to_f64(),
            Value::BigDecimal(n) => n.to_f64(),
            other => other.to_i64().map(|n| n as f64),
        }
    }

    pub fn to_bigint(&self) -> Option<BigInt> {
        match self {
            Value::BigInteger(n) => Some(n.clone()),
            Value::Float(n) => BigInt::from_f32(n.trunc()),
            Value::Double(n) => BigInt::from_f64(n.trunc()),
            Value::BigDecimal(n) => BigInt::from_str(&n.trunc().to_string()).ok(),
            other => other.to_i64().map(BigInt::from),
        }
    }

    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Value::BigDecimal(n) => Some(*n),
            Value::Float(n) => Decimal::from_f32(*n),
            Value::Double(n) => Decimal::from_f64(*n),
            Value::BigInteger(n) => Decimal::from_str(&n.to_string()).ok(),
            other => other.to_i64().map(Decimal::from),
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::Byte(n) => write!(f, "{}", n),
            Value::Short(n) => write!(f, "{}", n),
            Value::Int(n) => write!(f, "{}", n),
            Value::Long(n) => write!(f, "{}", n),
            Value::Float(n) => format_float(f, n.to_string(), n.is_finite()),
            Value::Double(n) => format_float(f, n.to_string(), n.is_finite()),
            Value::BigInteger(n) => write!(f, "{}", n),
            Value::BigDecimal(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Object(object) => write!(f, "{}", object.data),
        }
    }
}

fn format_float(f: &mut fmt::Formatter<'_>, digits: String, finite: bool) -> fmt::Result {
    if !finite || digits.contains('.') || digits.contains('e') {
        write!(f, "{}", digits)
    } else {
        write!(f, "{}.0", digits)
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value<'_> {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value<'_> {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f64> for Value<'_> {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<&str> for Value<'_> {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}
