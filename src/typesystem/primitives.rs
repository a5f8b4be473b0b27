use std::fmt;

use strum::{EnumCount, EnumIter};

use crate::runtime::Value;

/// Built-in primitive value types.
///
/// Every [`crate::typesystem::TypeRegistry`] pre-registers one type per kind, so
/// primitive property types can be compared by [`crate::typesystem::TypeId`] like
/// any other type. Primitives are only assignable from themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum PrimitiveKind {
    /// No value; only valid as a return type
    Void,
    /// `true` or `false`
    Boolean,
    /// A single character
    Char,
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
}

impl PrimitiveKind {
    /// The keyword used for this primitive in type names
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// The zero value a field of this kind holds before initialization
    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            PrimitiveKind::Void => Value::Null,
            PrimitiveKind::Boolean => Value::Boolean(false),
            PrimitiveKind::Char => Value::Char('\0'),
            PrimitiveKind::Byte
            | PrimitiveKind::Short
            | PrimitiveKind::Int
            | PrimitiveKind::Long => Value::Integer(0),
            PrimitiveKind::Float | PrimitiveKind::Double => Value::Float(0.0),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
