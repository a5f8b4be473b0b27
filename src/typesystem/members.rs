//! Member declarations: methods, fields and constructors.
//!
//! Members are immutable once their declaring class is published to the registry,
//! with one exception: static fields own their class-scoped storage slot.

use std::{
    fmt,
    sync::{Arc, RwLock},
};

use crate::{
    runtime::{Instance, Value},
    typesystem::{GenericType, MemberFlags, TypeId, TypeParam},
    Result,
};

/// Executable body of a method: receives the target object and the arguments
pub type MethodBody = Arc<dyn Fn(&Instance, &[Value]) -> Result<Value> + Send + Sync>;
/// Executable body of a constructor: initializes an already allocated object
pub type ConstructorBody = Arc<dyn Fn(&Instance, &[Value]) -> Result<()> + Send + Sync>;

/// Reference to a `MethodInfo`
pub type MethodRc = Arc<MethodInfo>;
/// Reference to a `FieldInfo`
pub type FieldRc = Arc<FieldInfo>;
/// Reference to a `ConstructorInfo`
pub type ConstructorRc = Arc<ConstructorInfo>;

/// A method declared on a class or interface
pub struct MethodInfo {
    /// Simple method name
    pub name: String,
    /// The type declaring this method
    pub declaring: TypeId,
    /// Declared return type, `void` for procedures
    pub return_type: GenericType,
    /// Declared parameter types, in order
    pub params: Vec<GenericType>,
    /// Method-scoped type parameters
    pub type_params: Vec<TypeParam>,
    /// Modifiers
    pub flags: MemberFlags,
    /// Implementation, absent for abstract and interface methods
    pub body: Option<MethodBody>,
}

impl MethodInfo {
    /// Compiler-generated bridge method
    #[must_use]
    pub fn is_bridge(&self) -> bool {
        self.flags.contains(MemberFlags::BRIDGE)
    }

    /// Class-scoped method
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    /// Private method, never dispatched virtually
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.flags.contains(MemberFlags::PRIVATE)
    }

    /// Number of declared parameters
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("declaring", &self.declaring)
            .field("return_type", &self.return_type)
            .field("params", &self.params)
            .field("flags", &self.flags)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// A field declared on a class
#[derive(Debug)]
pub struct FieldInfo {
    /// Field name
    pub name: String,
    /// The class declaring this field
    pub declaring: TypeId,
    /// Declared field type
    pub field_type: GenericType,
    /// Modifiers
    pub flags: MemberFlags,
    /// Value assigned when an instance (or, for statics, the class) is initialized
    pub initial: Value,
    static_slot: Option<RwLock<Value>>,
}

impl FieldInfo {
    /// Create a new field; static fields get their class-scoped slot here
    #[must_use]
    pub fn new(
        name: String,
        declaring: TypeId,
        field_type: GenericType,
        flags: MemberFlags,
        initial: Value,
    ) -> Self {
        let static_slot = if flags.contains(MemberFlags::STATIC) {
            Some(RwLock::new(initial.clone()))
        } else {
            None
        };

        FieldInfo {
            name,
            declaring,
            field_type,
            flags,
            initial,
            static_slot,
        }
    }

    /// Class-scoped field
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    /// Read this field from `target`, or from the class slot if static
    ///
    /// # Errors
    /// Returns an error if `target` lacks the slot or the slot lock is poisoned.
    pub fn read(&self, target: &Instance) -> Result<Value> {
        match &self.static_slot {
            Some(slot) => Ok(read_lock!(slot).clone()),
            None => target.get(self.declaring, &self.name),
        }
    }

    /// Write this field on `target`, or the class slot if static
    ///
    /// # Errors
    /// Returns an error if `target` lacks the slot or the slot lock is poisoned.
    pub fn write(&self, target: &Instance, value: Value) -> Result<()> {
        match &self.static_slot {
            Some(slot) => {
                *write_lock!(slot) = value;
                Ok(())
            }
            None => target.set(self.declaring, &self.name, value),
        }
    }
}

/// A constructor declared on a class
pub struct ConstructorInfo {
    /// The class this constructor instantiates
    pub declaring: TypeId,
    /// Declared parameter types, in order
    pub params: Vec<GenericType>,
    /// Modifiers
    pub flags: MemberFlags,
    /// Initialization logic run after field slots are allocated
    pub body: Option<ConstructorBody>,
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("declaring", &self.declaring)
            .field("params", &self.params)
            .field("flags", &self.flags)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_field_slot() {
        let owner = TypeId::new(5);
        let field = FieldInfo::new(
            "counter".to_string(),
            owner,
            GenericType::Class(TypeId::new(1)),
            MemberFlags::STATIC,
            Value::Integer(3),
        );
        let target = Instance::new(owner);

        assert!(field.is_static());
        assert_eq!(field.read(&target).unwrap(), Value::Integer(3));
        field.write(&target, Value::Integer(4)).unwrap();
        assert_eq!(field.read(&target).unwrap(), Value::Integer(4));
        assert_eq!(target.slot_count().unwrap(), 0);
    }

    #[test]
    fn test_method_flags() {
        let method = MethodInfo {
            name: "getName".to_string(),
            declaring: TypeId::new(5),
            return_type: GenericType::Class(TypeId::new(1)),
            params: Vec::new(),
            type_params: Vec::new(),
            flags: MemberFlags::PUBLIC | MemberFlags::SYNTHETIC | MemberFlags::BRIDGE,
            body: None,
        };

        assert!(method.is_bridge());
        assert!(!method.is_static());
        assert!(!method.is_private());
        assert_eq!(method.param_count(), 0);
        assert!(format!("{:?}", method).contains("has_body: false"));
    }
}
