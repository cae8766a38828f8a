use super::manager::TypeManager;
use super::{Primitive, Type};
use bumpalo::Bump;

#[test]
fn test_class_interning() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    let Type::Class(first) = manager.declare_class("Date", None) else {
        panic!("expected a class type");
    };
    let Type::Class(second) = manager.declare_class("Date", None) else {
        panic!("expected a class type");
    };
    assert!(core::ptr::eq(first, second));
}

#[test]
fn test_class_lookup() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    assert_eq!(manager.class("Shape"), None);
    let shape = manager.declare_class("Shape", None);
    assert_eq!(manager.class("Shape"), Some(shape));
}

#[test]
fn test_class_parent_chain() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    let shape = manager.declare_class("Shape", None);
    let circle = manager.declare_class("Circle", Some(shape));
    let unit_circle = manager.declare_class("UnitCircle", Some(circle));

    assert!(shape.is_assignable_from(&unit_circle));
    assert!(circle.is_assignable_from(&unit_circle));
    assert!(!unit_circle.is_assignable_from(&shape));
}

#[test]
fn test_non_class_parent_is_ignored() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    let odd = manager.declare_class("Odd", Some(manager.int()));
    let Type::Class(class) = odd else {
        panic!("expected a class type");
    };
    assert!(class.parent.is_none());
}

#[test]
fn test_builtin_factories() {
    let bump = Bump::new();
    let manager = TypeManager::new(&bump);

    assert_eq!(manager.int(), Type::Primitive(Primitive::Int));
    assert_eq!(manager.boxed(Primitive::Long), Type::Boxed(Primitive::Long));
    assert_eq!(manager.str(), Type::Str);
    assert_eq!(manager.any(), Type::Any);
}
