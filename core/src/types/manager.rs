use crate::types::types::{ClassType, Primitive, Type};
use bumpalo::Bump;
use core::cell::RefCell;
use hashbrown::{DefaultHashBuilder, HashMap};

/// Owner of host-declared class types.
///
/// Class types are allocated in the arena and interned by name, so a class
/// declared twice resolves to the same `&ClassType`. Built-in types are plain
/// values and need no interning; the factory methods exist for symmetry.
pub struct TypeManager<'a> {
    arena: &'a Bump,
    classes: RefCell<HashMap<&'a str, &'a ClassType<'a>, DefaultHashBuilder, &'a Bump>>,
}

impl<'a> TypeManager<'a> {
    pub fn new(arena: &'a Bump) -> &'a Self {
        arena.alloc(Self {
            arena,
            classes: RefCell::new(HashMap::new_in(arena)),
        })
    }

    /// Declare a class type, optionally extending `parent`.
    ///
    /// Re-declaring an existing name returns the existing type unchanged.
    pub fn declare_class(&self, name: &str, parent: Option<Type<'a>>) -> Type<'a> {
        if let Some(&class) = self.classes.borrow().get(name) {
            return Type::Class(class);
        }
        let parent = match parent {
            Some(Type::Class(parent)) => Some(parent),
            _ => None,
        };
        let name = self.arena.alloc_str(name);
        let class = self.arena.alloc(ClassType { name, parent });
        self.classes.borrow_mut().insert(name, class);
        tracing::debug!(class = name, "declared class type");
        Type::Class(class)
    }

    /// Look up a previously declared class by name.
    pub fn class(&self, name: &str) -> Option<Type<'a>> {
        self.classes.borrow().get(name).map(|&class| Type::Class(class))
    }

    // Factory methods for built-in types.
    pub fn boolean(&self) -> Type<'a> {
        Type::Primitive(Primitive::Boolean)
    }
    pub fn char(&self) -> Type<'a> {
        Type::Primitive(Primitive::Char)
    }
    pub fn short(&self) -> Type<'a> {
        Type::Primitive(Primitive::Short)
    }
    pub fn int(&self) -> Type<'a> {
        Type::Primitive(Primitive::Int)
    }
    pub fn long(&self) -> Type<'a> {
        Type::Primitive(Primitive::Long)
    }
    pub fn float(&self) -> Type<'a> {
        Type::Primitive(Primitive::Float)
    }
    pub fn double(&self) -> Type<'a> {
        Type::Primitive(Primitive::Double)
    }
    pub fn boxed(&self, primitive: Primitive) -> Type<'a> {
        Type::Boxed(primitive)
    }
    pub fn big_integer(&self) -> Type<'a> {
        Type::BigInteger
    }
    pub fn big_decimal(&self) -> Type<'a> {
        Type::BigDecimal
    }
    pub fn str(&self) -> Type<'a> {
        Type::Str
    }
    pub fn any(&self) -> Type<'a> {
        Type::Any
    }
}
