use std::fmt;

use bitflags::bitflags;

use crate::typesystem::PrimitiveKind;

/// Identity of a type registered in a [`crate::typesystem::TypeSystem`].
///
/// Classes, interfaces, primitives and array types all share this id space. Two
/// `TypeId`s are equal exactly when they denote the same type, which makes the id
/// usable as the "type identity" in signature keys and property tables.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Creates a new id from a raw value
    #[must_use]
    pub fn new(value: u32) -> Self {
        TypeId(value)
    }

    /// Returns the raw id value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Returns the id as a slot index
    #[must_use]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for TypeId {
    fn from(value: u32) -> Self {
        TypeId(value)
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The fundamental category of a registered type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFlavor {
    /// A concrete or abstract class
    Class,
    /// An interface; contributes methods but never fields
    Interface,
    /// A built-in primitive value type
    Primitive(PrimitiveKind),
    /// A single-dimensional array over a component type
    Array {
        /// The element type
        component: TypeId,
    },
}

impl TypeFlavor {
    /// Check if this is a primitive type
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeFlavor::Primitive(_))
    }

    /// Check if this is an interface
    #[must_use]
    pub fn is_interface(&self) -> bool {
        matches!(self, TypeFlavor::Interface)
    }

    /// The component type, if this is an array
    #[must_use]
    pub fn component(&self) -> Option<TypeId> {
        match self {
            TypeFlavor::Array { component } => Some(*component),
            _ => None,
        }
    }
}

/// A type as written in a declaration, before generic substitution.
///
/// Mirrors the shapes a declared member type can take: a plain class, a
/// parameterized class (`List<String>`), a generic array (`T[]`), a type
/// variable (`T`) or a wildcard (`? extends Number`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenericType {
    /// A non-generic reference to a registered type
    Class(TypeId),
    /// A generic class applied to type arguments
    Parameterized {
        /// The generic class being instantiated
        raw: TypeId,
        /// The type arguments, in declaration order of the class' parameters
        args: Vec<GenericType>,
    },
    /// An array whose component is itself generic
    Array(Box<GenericType>),
    /// A type variable, looked up by name in the declaring method, then class
    Variable(String),
    /// A wildcard argument with optional bounds
    Wildcard {
        /// Upper bounds (`? extends X`)
        upper: Vec<GenericType>,
        /// Lower bounds (`? super X`)
        lower: Vec<GenericType>,
    },
}

impl GenericType {
    /// Shorthand for a type variable
    #[must_use]
    pub fn var(name: &str) -> Self {
        GenericType::Variable(name.to_string())
    }

    /// Shorthand for a parameterized type
    #[must_use]
    pub fn parameterized(raw: TypeId, args: Vec<GenericType>) -> Self {
        GenericType::Parameterized { raw, args }
    }

    /// Shorthand for a generic array
    #[must_use]
    pub fn array(component: GenericType) -> Self {
        GenericType::Array(Box::new(component))
    }

    /// The class this type names, for `Class` and `Parameterized` shapes
    #[must_use]
    pub fn raw_type(&self) -> Option<TypeId> {
        match self {
            GenericType::Class(id) | GenericType::Parameterized { raw: id, .. } => Some(*id),
            _ => None,
        }
    }

    /// The type arguments of a parameterized type, empty otherwise
    #[must_use]
    pub fn type_args(&self) -> &[GenericType] {
        match self {
            GenericType::Parameterized { args, .. } => args,
            _ => &[],
        }
    }
}

impl From<TypeId> for GenericType {
    fn from(id: TypeId) -> Self {
        GenericType::Class(id)
    }
}

/// A declared type parameter of a class or method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeParam {
    /// Parameter name as referenced by [`GenericType::Variable`]
    pub name: String,
    /// Declared bounds; the first one is used when the variable stays unbound
    pub bounds: Vec<GenericType>,
}

impl TypeParam {
    /// An unbounded parameter
    #[must_use]
    pub fn new(name: &str) -> Self {
        TypeParam {
            name: name.to_string(),
            bounds: Vec::new(),
        }
    }

    /// A parameter with a single upper bound
    #[must_use]
    pub fn bounded(name: &str, bound: GenericType) -> Self {
        TypeParam {
            name: name.to_string(),
            bounds: vec![bound],
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Modifiers of methods, fields and constructors
    pub struct MemberFlags: u32 {
        /// Accessible by anyone
        const PUBLIC = 0x0001;
        /// Accessible only by the declaring type
        const PRIVATE = 0x0002;
        /// Accessible by the declaring type and sub-types
        const PROTECTED = 0x0004;
        /// Class-scoped rather than instance-scoped
        const STATIC = 0x0008;
        /// Immutable after initialization
        const FINAL = 0x0010;
        /// Declared without a body
        const ABSTRACT = 0x0400;
        /// Generated by the compiler
        const SYNTHETIC = 0x1000;
        /// Compiler-generated bridge for a covariant or generic override
        const BRIDGE = 0x0040;
    }
}

impl MemberFlags {
    /// Both `FINAL` and `STATIC`, i.e. a compile-time constant
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.contains(MemberFlags::FINAL | MemberFlags::STATIC)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Modifiers of a type declaration
    pub struct TypeFlags: u32 {
        /// Cannot be instantiated directly
        const ABSTRACT = 0x0400;
        /// Cannot be extended
        const FINAL = 0x0010;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_roundtrip() {
        let id = TypeId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.index(), 42);
        assert_eq!(TypeId::from(42), id);
        assert_eq!(format!("{}", id), "#42");
        assert_eq!(format!("{:?}", id), "TypeId(42)");
    }

    #[test]
    fn test_generic_type_raw() {
        let list = TypeId::new(10);
        let string = TypeId::new(11);

        let plain = GenericType::Class(list);
        assert_eq!(plain.raw_type(), Some(list));
        assert!(plain.type_args().is_empty());

        let param = GenericType::parameterized(list, vec![string.into()]);
        assert_eq!(param.raw_type(), Some(list));
        assert_eq!(param.type_args(), &[GenericType::Class(string)]);

        assert_eq!(GenericType::var("T").raw_type(), None);
        assert_eq!(GenericType::array(GenericType::var("T")).raw_type(), None);
    }

    #[test]
    fn test_member_flags_constant() {
        assert!((MemberFlags::STATIC | MemberFlags::FINAL).is_constant());
        assert!((MemberFlags::PUBLIC | MemberFlags::STATIC | MemberFlags::FINAL).is_constant());
        assert!(!MemberFlags::FINAL.is_constant());
        assert!(!MemberFlags::STATIC.is_constant());
    }

    #[test]
    fn test_flavor_helpers() {
        assert!(TypeFlavor::Primitive(PrimitiveKind::Int).is_primitive());
        assert!(!TypeFlavor::Class.is_primitive());
        assert!(TypeFlavor::Interface.is_interface());
        assert_eq!(
            TypeFlavor::Array {
                component: TypeId::new(3)
            }
            .component(),
            Some(TypeId::new(3))
        );
        assert_eq!(TypeFlavor::Class.component(), None);
    }
}
