//! # beanscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the beanscope library. Import this module to get quick access to the essential
//! types for declaring types and reflecting over their properties.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all beanscope operations
pub use crate::Error;

/// The result type used throughout beanscope
pub use crate::Result;

/// Which side of a property a failed lookup targeted
pub use crate::AccessorKind;

// ================================================================================================
// Type System
// ================================================================================================

/// Type introspection capability and its shared handle
pub use crate::typesystem::{TypeSystem, TypeSystemRc};

/// In-memory type registry and its builders
pub use crate::typesystem::{ClassBuilder, MethodBuilder, TypeRegistry};

/// Type identities and declared types
pub use crate::typesystem::{GenericType, PrimitiveKind, TypeId, TypeParam};

/// Member and type modifiers
pub use crate::typesystem::{MemberFlags, TypeFlags};

// ================================================================================================
// Runtime
// ================================================================================================

/// Dynamic values and objects
pub use crate::runtime::{Instance, ObjectRc, Value};

// ================================================================================================
// Reflection
// ================================================================================================

/// Property tables and their construction options
pub use crate::reflection::{DefaultConstructor, Reflector, ReflectorConfig};

/// Reflector cache
pub use crate::reflection::{DefaultReflectorFactory, ReflectorFactory, ReflectorFactoryRc};

/// Accessor handles
pub use crate::reflection::{Invoker, InvokerRc};

/// Property path navigation
pub use crate::reflection::{MetaClass, PropertyTokenizer};

/// Configuration key validation
pub use crate::settings::Settings;
