use core::fmt::{self, Display};

/// Primitive value kinds. A primitive type and its boxed form share the same
/// runtime representation; they differ only in how assignment and null are
/// treated at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub const ALL: [Primitive; 8] = [
        Primitive::Boolean,
        Primitive::Char,
        Primitive::Byte,
        Primitive::Short,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
    ];

    pub fn is_numeric(self) -> bool {
        !matches!(self, Primitive::Boolean | Primitive::Char)
    }

    /// Widening primitive conversions: byte -> short -> int -> long -> float
    /// -> double, and char -> int.
    pub fn widens_to(self, target: Primitive) -> bool {
        use Primitive::*;
        if self == target {
            return true;
        }
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short => matches!(target, Int | Long | Float | Double),
            Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => matches!(target, Double),
            Double | Boolean => false,
        }
    }

    fn primitive_name(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Char => "char",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    fn boxed_name(self) -> &'static str {
        match self {
            Primitive::Boolean => "Boolean",
            Primitive::Char => "Character",
            Primitive::Byte => "Byte",
            Primitive::Short => "Short",
            Primitive::Int => "Integer",
            Primitive::Long => "Long",
            Primitive::Float => "Float",
            Primitive::Double => "Double",
        }
    }
}

/// A host-declared reference type. Class types are interned by the
/// [`TypeManager`](super::manager::TypeManager), so two declarations with the
/// same name are the same type.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ClassType<'a> {
    pub name: &'a str,
    pub parent: Option<&'a ClassType<'a>>,
}

impl<'a> ClassType<'a> {
    /// Whether `self` is `other` or one of its ancestors.
    pub fn is_ancestor_of(&self, other: &ClassType<'a>) -> bool {
        let mut current = Some(other);
        while let Some(class) = current {
            if class.name == self.name {
                return true;
            }
            current = class.parent;
        }
        false
    }
}

/// Static (egress) type of an AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type<'a> {
    Primitive(Primitive),
    Boxed(Primitive),
    BigInteger,
    BigDecimal,
    Str,
    /// The type of the `null` literal.
    Null,
    /// The universal object type. Nodes whose type is unknown at compile
    /// time report `Any`.
    Any,
    Class(&'a ClassType<'a>),
}

impl<'a> Type<'a> {
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            Type::Primitive(p) | Type::Boxed(p) => Some(*p),
            _ => None,
        }
    }

    /// The boxed form of a primitive type; every other type is returned
    /// unchanged.
    pub fn boxed(self) -> Type<'a> {
        match self {
            Type::Primitive(p) => Type::Boxed(p),
            other => other,
        }
    }

    /// Numeric primitives, their boxed forms, and the big number types.
    pub fn is_number(&self) -> bool {
        match self {
            Type::Primitive(p) | Type::Boxed(p) => p.is_numeric(),
            Type::BigInteger | Type::BigDecimal => true,
            _ => false,
        }
    }

    /// short, int, long (primitive or boxed) and BigInteger.
    pub fn is_integral_kind(&self) -> bool {
        match self {
            Type::Primitive(p) | Type::Boxed(p) => {
                matches!(p, Primitive::Short | Primitive::Int | Primitive::Long)
            }
            Type::BigInteger => true,
            _ => false,
        }
    }

    /// float, double (primitive or boxed) and BigDecimal.
    pub fn is_floating_kind(&self) -> bool {
        match self {
            Type::Primitive(p) | Type::Boxed(p) => {
                matches!(p, Primitive::Float | Primitive::Double)
            }
            Type::BigDecimal => true,
            _ => false,
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.primitive(), Some(Primitive::Boolean))
    }

    /// Whether a value of type `other` can be used where `self` is expected
    /// without any conversion.
    pub fn is_assignable_from(&self, other: &Type<'a>) -> bool {
        if self == other {
            return true;
        }
        match (self, other) {
            (Type::Any, other) => !other.is_primitive(),
            (Type::Primitive(to), Type::Primitive(from)) => from.widens_to(*to),
            (Type::Primitive(to), Type::Boxed(from)) | (Type::Boxed(to), Type::Primitive(from)) => {
                to == from
            }
            (Type::Class(to), Type::Class(from)) => to.is_ancestor_of(from),
            _ => false,
        }
    }
}

impl Display for Type<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{}", p.primitive_name()),
            Type::Boxed(p) => write!(f, "{}", p.boxed_name()),
            Type::BigInteger => write!(f, "BigInteger"),
            Type::BigDecimal => write!(f, "BigDecimal"),
            Type::Str => write!(f, "String"),
            Type::Null => write!(f, "null"),
            Type::Any => write!(f, "Object"),
            Type::Class(class) => write!(f, "{}", class.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_widening() {
        assert!(Primitive::Byte.widens_to(Primitive::Int));
        assert!(Primitive::Char.widens_to(Primitive::Long));
        assert!(Primitive::Int.widens_to(Primitive::Double));
        assert!(!Primitive::Double.widens_to(Primitive::Int));
        assert!(!Primitive::Char.widens_to(Primitive::Short));
        assert!(!Primitive::Boolean.widens_to(Primitive::Int));
    }

    #[test]
    fn test_assignability() {
        let int = Type::Primitive(Primitive::Int);
        let long = Type::Primitive(Primitive::Long);
        let boxed_int = Type::Boxed(Primitive::Int);
        let boxed_double = Type::Boxed(Primitive::Double);

        assert!(long.is_assignable_from(&int));
        assert!(!int.is_assignable_from(&long));
        assert!(int.is_assignable_from(&boxed_int));
        assert!(boxed_int.is_assignable_from(&int));
        assert!(!boxed_double.is_assignable_from(&boxed_int));
        assert!(Type::Any.is_assignable_from(&Type::Str));
        assert!(Type::Any.is_assignable_from(&Type::Null));
        assert!(!Type::Any.is_assignable_from(&int));
        assert!(!Type::Str.is_assignable_from(&Type::Null));
    }

    #[test]
    fn test_class_hierarchy() {
        let base = ClassType {
            name: "Shape",
            parent: None,
        };
        let derived = ClassType {
            name: "Circle",
            parent: Some(&base),
        };
        let shape = Type::Class(&base);
        let circle = Type::Class(&derived);

        assert!(shape.is_assignable_from(&circle));
        assert!(!circle.is_assignable_from(&shape));
    }

    #[test]
    fn test_kinds() {
        assert!(Type::Primitive(Primitive::Short).is_integral_kind());
        assert!(Type::BigInteger.is_integral_kind());
        assert!(!Type::Primitive(Primitive::Byte).is_integral_kind());
        assert!(Type::Boxed(Primitive::Float).is_floating_kind());
        assert!(Type::BigDecimal.is_floating_kind());
        assert!(!Type::Boxed(Primitive::Char).is_number());
        assert!(Type::Primitive(Primitive::Byte).is_number());
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::Primitive(Primitive::Int).to_string(), "int");
        assert_eq!(Type::Boxed(Primitive::Int).to_string(), "Integer");
        assert_eq!(Type::Str.to_string(), "String");
        assert_eq!(Type::Any.to_string(), "Object");
    }
}
