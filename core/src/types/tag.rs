//! Compact runtime type classification.
//!
//! A [`TypeTag`] is what the arithmetic kernel dispatches on. Binary
//! operation nodes cache the tags of their operands when they can be decided
//! at compile time and re-derive them from the live value otherwise.

use core::fmt;

use crate::parser::Operator;
use crate::types::{Primitive, Type};
use crate::values::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Null,
    Object,
    Str,
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    BigInteger,
    BigDecimal,
}

impl TypeTag {
    pub const ALL: [TypeTag; 13] = [
        TypeTag::Null,
        TypeTag::Object,
        TypeTag::Str,
        TypeTag::Boolean,
        TypeTag::Char,
        TypeTag::Byte,
        TypeTag::Short,
        TypeTag::Int,
        TypeTag::Long,
        TypeTag::Float,
        TypeTag::Double,
        TypeTag::BigInteger,
        TypeTag::BigDecimal,
    ];

    /// Total mapping from a static type to its tag. Primitive and boxed forms
    /// of the same kind share a tag; host classes map to `Object`.
    pub fn of_type(ty: &Type<'_>) -> TypeTag {
        match ty {
            Type::Primitive(p) | Type::Boxed(p) => TypeTag::of_primitive(*p),
            Type::BigInteger => TypeTag::BigInteger,
            Type::BigDecimal => TypeTag::BigDecimal,
            Type::Str => TypeTag::Str,
            Type::Null => TypeTag::Null,
            Type::Any | Type::Class(_) => TypeTag::Object,
        }
    }

    pub fn of_primitive(p: Primitive) -> TypeTag {
        match p {
            Primitive::Boolean => TypeTag::Boolean,
            Primitive::Char => TypeTag::Char,
            Primitive::Byte => TypeTag::Byte,
            Primitive::Short => TypeTag::Short,
            Primitive::Int => TypeTag::Int,
            Primitive::Long => TypeTag::Long,
            Primitive::Float => TypeTag::Float,
            Primitive::Double => TypeTag::Double,
        }
    }

    /// Total mapping from a runtime value to its tag.
    pub fn of_value(value: &Value<'_>) -> TypeTag {
        match value {
            Value::Null => TypeTag::Null,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Char(_) => TypeTag::Char,
            Value::Byte(_) => TypeTag::Byte,
            Value::Short(_) => TypeTag::Short,
            Value::Int(_) => TypeTag::Int,
            Value::Long(_) => TypeTag::Long,
            Value::Float(_) => TypeTag::Float,
            Value::Double(_) => TypeTag::Double,
            Value::BigInteger(_) => TypeTag::BigInteger,
            Value::BigDecimal(_) => TypeTag::BigDecimal,
            Value::Str(_) => TypeTag::Str,
            Value::Object(_) => TypeTag::Object,
        }
    }

    /// The boxed type corresponding to a tag.
    pub fn to_type<'a>(self) -> Type<'a> {
        match self {
            TypeTag::Null => Type::Null,
            TypeTag::Object => Type::Any,
            TypeTag::Str => Type::Str,
            TypeTag::Boolean => Type::Boxed(Primitive::Boolean),
            TypeTag::Char => Type::Boxed(Primitive::Char),
            TypeTag::Byte => Type::Boxed(Primitive::Byte),
            TypeTag::Short => Type::Boxed(Primitive::Short),
            TypeTag::Int => Type::Boxed(Primitive::Int),
            TypeTag::Long => Type::Boxed(Primitive::Long),
            TypeTag::Float => Type::Boxed(Primitive::Float),
            TypeTag::Double => Type::Boxed(Primitive::Double),
            TypeTag::BigInteger => Type::BigInteger,
            TypeTag::BigDecimal => Type::BigDecimal,
        }
    }

    /// Tags that take part in numeric promotion. `Char` promotes as its code
    /// point.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            TypeTag::Char
                | TypeTag::Byte
                | TypeTag::Short
                | TypeTag::Int
                | TypeTag::Long
                | TypeTag::Float
                | TypeTag::Double
                | TypeTag::BigInteger
                | TypeTag::BigDecimal
        )
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            TypeTag::Char
                | TypeTag::Byte
                | TypeTag::Short
                | TypeTag::Int
                | TypeTag::Long
                | TypeTag::BigInteger
        )
    }

    fn is_floating(self) -> bool {
        matches!(self, TypeTag::Float | TypeTag::Double)
    }

    /// The tag both operands of an arithmetic operation are promoted to.
    /// Returns `None` unless both tags are numeric.
    pub fn widen(left: TypeTag, right: TypeTag) -> Option<TypeTag> {
        if !left.is_numeric() || !right.is_numeric() {
            return None;
        }
        let either = |tag: TypeTag| left == tag || right == tag;
        let widened = if either(TypeTag::BigDecimal) {
            TypeTag::BigDecimal
        } else if either(TypeTag::BigInteger) {
            if left.is_floating() || right.is_floating() {
                TypeTag::BigDecimal
            } else {
                TypeTag::BigInteger
            }
        } else if either(TypeTag::Double) {
            TypeTag::Double
        } else if either(TypeTag::Float) {
            TypeTag::Float
        } else if either(TypeTag::Long) {
            TypeTag::Long
        } else if either(TypeTag::Int) || either(TypeTag::Char) {
            TypeTag::Int
        } else if either(TypeTag::Short) {
            TypeTag::Short
        } else {
            TypeTag::Byte
        };
        Some(widened)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Null => "null",
            TypeTag::Object => "object",
            TypeTag::Str => "string",
            TypeTag::Boolean => "boolean",
            TypeTag::Char => "char",
            TypeTag::Byte => "byte",
            TypeTag::Short => "short",
            TypeTag::Int => "int",
            TypeTag::Long => "long",
            TypeTag::Float => "float",
            TypeTag::Double => "double",
            TypeTag::BigInteger => "big integer",
            TypeTag::BigDecimal => "big decimal",
        };
        f.write_str(name)
    }
}

/// The tag of an operand as a node sees it: known at compile time, or left
/// to be derived from each evaluated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandType {
    Resolved(TypeTag),
    Unresolved,
}

impl OperandType {
    /// `Null` and `Object` carry no dispatch information, so they are stored
    /// as unresolved.
    pub fn from_tag(tag: TypeTag) -> OperandType {
        match tag {
            TypeTag::Null | TypeTag::Object => OperandType::Unresolved,
            tag => OperandType::Resolved(tag),
        }
    }

    /// Tag for an operand given its declared egress type.
    pub fn of_type(ty: &Type<'_>) -> OperandType {
        OperandType::from_tag(resolve_operand_tag(ty))
    }

    /// The tag to dispatch on for a freshly produced operand value.
    #[inline]
    pub fn resolve(self, value: &Value<'_>) -> TypeTag {
        match self {
            OperandType::Resolved(tag) => tag,
            OperandType::Unresolved => TypeTag::of_value(value),
        }
    }

    pub fn is_resolved(self) -> bool {
        matches!(self, OperandType::Resolved(_))
    }
}

/// Operand type resolution: an absent or universal egress type yields the
/// `Null` tag, anything else goes through the fixed type mapping.
pub fn resolve_operand_tag(ty: &Type<'_>) -> TypeTag {
    match ty {
        Type::Any => TypeTag::Null,
        ty => TypeTag::of_type(ty),
    }
}

/// The natural result type of `op` applied to operands of the given types.
pub fn result_type<'a>(op: Operator, left: Type<'a>, right: Type<'a>) -> Type<'a> {
    use crate::parser::Operator::*;

    match op {
        Eq | Neq | Lt | Gt | Le | Ge | And | Or => Type::Primitive(Primitive::Boolean),
        Add if left == Type::Str || right == Type::Str => Type::Str,
        Add | Sub | Mul | Div | Mod | Pow => arithmetic_result(left, right),
        BitAnd | BitOr | BitXor | Shl | Shr | UShr => {
            if left.is_boolean() && right.is_boolean() {
                Type::Primitive(Primitive::Boolean)
            } else if left.primitive() == Some(Primitive::Long)
                || right.primitive() == Some(Primitive::Long)
            {
                Type::Primitive(Primitive::Long)
            } else {
                Type::Primitive(Primitive::Int)
            }
        }
    }
}

fn arithmetic_result<'a>(left: Type<'a>, right: Type<'a>) -> Type<'a> {
    if left == Type::Any || right == Type::Any {
        return Type::Any;
    }
    let (l_tag, r_tag) = (TypeTag::of_type(&left), TypeTag::of_type(&right));
    match TypeTag::widen(l_tag, r_tag) {
        Some(tag) if tag == l_tag => left,
        Some(tag) if tag == r_tag => right,
        Some(tag) => tag.to_type(),
        None if right.is_number() && !left.is_number() => right,
        None => left,
    }
}
