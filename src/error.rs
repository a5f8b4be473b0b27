use thiserror::Error;

use crate::typesystem::TypeId;

macro_rules! type_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::TypeError($msg.to_string())
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::TypeError(format!($fmt, $($arg)*))
    };
}

/// Which side of a property a lookup was made against.
///
/// Carried by [`Error::PropertyNotFound`] so callers can tell a missing getter
/// from a missing setter without parsing the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    /// A read accessor (getter method or readable field)
    Getter,
    /// A write accessor (setter method or writable field)
    Setter,
}

impl std::fmt::Display for AccessorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessorKind::Getter => write!(f, "getter"),
            AccessorKind::Setter => write!(f, "setter"),
        }
    }
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Resolution Errors
/// - [`Error::AmbiguousGetter`] - Two getter candidates cannot be ordered
/// - [`Error::AmbiguousSetter`] - Two setter candidates cannot be ordered
/// - [`Error::InvalidPropertyName`] - An accessor name without a bean prefix
///
/// ## Lookup Errors
/// - [`Error::PropertyNotFound`] - A property is absent from the table
/// - [`Error::NoDefaultConstructor`] - The type has no zero-argument constructor
/// - [`Error::TypeNotFound`] - A [`TypeId`] is not known to the type system
/// - [`Error::UnknownSetting`] - A configuration key has no writable property
///
/// ## Runtime Errors
/// - [`Error::Invocation`] - A method or field accessor could not be invoked
/// - [`Error::Instantiation`] - A type could not be instantiated
/// - [`Error::RecursionLimit`] - A type hierarchy is deeper than allowed
/// - [`Error::LockError`] - Thread synchronization failure
///
/// # Examples
///
/// ```rust
/// use beanscope::{Error, prelude::*};
/// use std::sync::Arc;
///
/// let registry = Arc::new(TypeRegistry::new());
/// let ty = registry.class("com.example", "Empty").build()?;
/// let types: TypeSystemRc = registry.clone();
/// let reflector = Reflector::new(&types, ty)?;
///
/// match reflector.getter_type("missing") {
///     Err(Error::PropertyNotFound { property, .. }) => assert_eq!(property, "missing"),
///     other => panic!("unexpected {:?}", other.is_ok()),
/// }
/// # Ok::<(), beanscope::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Two or more getters for the same property cannot be ordered.
    ///
    /// Raised when two candidates share an identical non-boolean return type,
    /// or when their return types are unrelated. Construction of the whole
    /// property table fails.
    #[error("Illegal overloaded getter method with ambiguous type for property '{property}' in class '{class}'. This breaks the JavaBeans specification and can cause unpredictable results.")]
    AmbiguousGetter {
        /// The property that could not be resolved
        property: String,
        /// The class declaring the conflicting getter
        class: String,
    },

    /// Two or more setters for the same property cannot be ordered.
    ///
    /// Raised when the parameter types of two candidates are unrelated and no
    /// candidate matches the getter type exactly.
    #[error("Ambiguous setters defined for property '{property}' in class '{class}' with types '{first}' and '{second}'.")]
    AmbiguousSetter {
        /// The property that could not be resolved
        property: String,
        /// The class declaring the conflicting setter
        class: String,
        /// Parameter type of the first conflicting setter
        first: String,
        /// Parameter type of the second conflicting setter
        second: String,
    },

    /// A query named a property absent from the relevant table.
    #[error("There is no {kind} for property named '{property}' in '{class}'")]
    PropertyNotFound {
        /// Whether the read or the write table was consulted
        kind: AccessorKind,
        /// The requested property name
        property: String,
        /// The reflected class
        class: String,
    },

    /// Default construction was requested on a type without a qualifying constructor.
    #[error("There is no default constructor for {0}")]
    NoDefaultConstructor(String),

    /// A method name could not be converted to a property name.
    #[error("Error parsing property name '{0}'. Didn't start with 'is', 'get' or 'set'.")]
    InvalidPropertyName(String),

    /// Failed to find a type in the type system.
    #[error("Failed to find type in TypeSystem - {0}")]
    TypeNotFound(TypeId),

    /// General error during `TypeSystem` usage.
    #[error("{0}")]
    TypeError(String),

    /// A method, getter or setter could not be invoked.
    #[error("{0}")]
    Invocation(String),

    /// A type could not be instantiated.
    #[error("{0}")]
    Instantiation(String),

    /// Recursion limit reached.
    ///
    /// Hierarchy walks are bounded so that a cyclic or absurdly deep type graph
    /// fails instead of overflowing the stack. The associated value shows the
    /// limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// Failed to lock target.
    #[error("Failed to lock target")]
    LockError,

    /// A configuration key has no corresponding writable property.
    #[error("The setting {key} is not known. Make sure you spelled it correctly (case sensitive).")]
    UnknownSetting {
        /// The rejected configuration key
        key: String,
    },
}
