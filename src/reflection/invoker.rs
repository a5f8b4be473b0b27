//! Invocable property accessors.
//!
//! Every entry of a property table is an [`Invoker`]: a uniform handle that reads or
//! writes a property on a target object, whether it is backed by a method or by a
//! field.

use std::sync::Arc;

use crate::{
    runtime::{Instance, Value},
    typesystem::{FieldRc, MethodRc, TypeId, TypeSystemRc},
    Error, Result,
};

/// Shared reference to an invoker
pub type InvokerRc = Arc<dyn Invoker>;

/// A uniform read or write operation on a target object
pub trait Invoker: Send + Sync {
    /// Run the operation on `target`
    ///
    /// # Errors
    /// Returns [`Error::Invocation`] on arity mismatch, missing implementation or
    /// missing field slot, or whatever the underlying member body returns.
    fn invoke(&self, target: &Instance, args: &[Value]) -> Result<Value>;

    /// The erased type of the value read or written
    fn value_type(&self) -> TypeId;
}

/// Invokes a method, dispatching virtually on the target's runtime type
pub struct MethodInvoker {
    method: MethodRc,
    value_type: TypeId,
    types: TypeSystemRc,
}

impl MethodInvoker {
    /// Create a new method invoker
    ///
    /// ## Arguments
    /// * 'types'      - The type system used for dispatch
    /// * 'method'     - The accessor method
    /// * 'value_type' - The resolved property type seen through the reflected class
    #[must_use]
    pub fn new(types: TypeSystemRc, method: MethodRc, value_type: TypeId) -> Self {
        MethodInvoker {
            method,
            value_type,
            types,
        }
    }

    /// The method this invoker calls
    #[must_use]
    pub fn method(&self) -> &MethodRc {
        &self.method
    }
}

impl Invoker for MethodInvoker {
    fn invoke(&self, target: &Instance, args: &[Value]) -> Result<Value> {
        if args.len() != self.method.param_count() {
            return Err(Error::Invocation(format!(
                "Method {} expects {} argument(s), got {}",
                self.method.name,
                self.method.param_count(),
                args.len()
            )));
        }

        let implementation = if self.method.is_static() || self.method.is_private() {
            None
        } else {
            self.types
                .find_implementation(target.type_id(), &self.method)?
        };

        let body = implementation
            .as_ref()
            .and_then(|method| method.body.as_ref())
            .or(self.method.body.as_ref())
            .ok_or_else(|| {
                Error::Invocation(format!(
                    "No implementation of {} for object of type {}",
                    self.method.name,
                    target.type_id()
                ))
            })?;

        body(target, args)
    }

    fn value_type(&self) -> TypeId {
        self.value_type
    }
}

/// Reads a field directly
pub struct GetFieldInvoker {
    field: FieldRc,
    value_type: TypeId,
}

impl GetFieldInvoker {
    /// Create a new field reader
    #[must_use]
    pub fn new(field: FieldRc, value_type: TypeId) -> Self {
        GetFieldInvoker { field, value_type }
    }
}

impl Invoker for GetFieldInvoker {
    fn invoke(&self, target: &Instance, _args: &[Value]) -> Result<Value> {
        self.field.read(target)
    }

    fn value_type(&self) -> TypeId {
        self.value_type
    }
}

/// Writes a field directly
pub struct SetFieldInvoker {
    field: FieldRc,
    value_type: TypeId,
}

impl SetFieldInvoker {
    /// Create a new field writer
    #[must_use]
    pub fn new(field: FieldRc, value_type: TypeId) -> Self {
        SetFieldInvoker { field, value_type }
    }
}

impl Invoker for SetFieldInvoker {
    fn invoke(&self, target: &Instance, args: &[Value]) -> Result<Value> {
        let [value] = args else {
            return Err(Error::Invocation(format!(
                "Field {} expects exactly one value, got {}",
                self.field.name,
                args.len()
            )));
        };

        self.field.write(target, value.clone())?;
        Ok(Value::Null)
    }

    fn value_type(&self) -> TypeId {
        self.value_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typesystem::{PrimitiveKind, TypeRegistry, TypeSystem};

    #[test]
    fn test_method_invoker_virtual_dispatch() {
        let registry = Arc::new(TypeRegistry::new());
        let string = registry.string_type();
        let animal = registry
            .class("test", "Animal")
            .method(|m| {
                m.name("getSound")
                    .returns(string)
                    .body(|_, _| Ok(Value::from("...")))
            })
            .build()
            .unwrap();
        let dog = registry
            .class("test", "Dog")
            .extends(animal)
            .method(|m| {
                m.name("getSound")
                    .returns(string)
                    .body(|_, _| Ok(Value::from("woof")))
            })
            .build()
            .unwrap();

        let method = registry.declared_methods(animal).unwrap()[0].clone();
        let types: TypeSystemRc = registry.clone();
        let invoker = MethodInvoker::new(types, method, string);

        let plain = registry.allocate(animal).unwrap();
        let barking = registry.allocate(dog).unwrap();
        assert_eq!(invoker.invoke(&plain, &[]).unwrap(), Value::from("..."));
        assert_eq!(invoker.invoke(&barking, &[]).unwrap(), Value::from("woof"));
        assert_eq!(invoker.value_type(), string);
    }

    #[test]
    fn test_method_invoker_arity_and_abstract() {
        let registry = Arc::new(TypeRegistry::new());
        let int = registry.primitive(PrimitiveKind::Int);
        let shape = registry
            .class("test", "Shape")
            .getter("getArea", int)
            .build()
            .unwrap();

        let method = registry.declared_methods(shape).unwrap()[0].clone();
        let types: TypeSystemRc = registry.clone();
        let invoker = MethodInvoker::new(types, method, int);
        let target = registry.allocate(shape).unwrap();

        assert!(matches!(
            invoker.invoke(&target, &[Value::Integer(1)]),
            Err(Error::Invocation(_))
        ));
        assert!(matches!(
            invoker.invoke(&target, &[]),
            Err(Error::Invocation(_))
        ));
    }

    #[test]
    fn test_field_invokers() {
        let registry = TypeRegistry::new();
        let long = registry.primitive(PrimitiveKind::Long);
        let counter = registry
            .class("test", "Counter")
            .field("count", long)
            .build()
            .unwrap();

        let field = registry.declared_fields(counter).unwrap()[0].clone();
        let getter = GetFieldInvoker::new(field.clone(), long);
        let setter = SetFieldInvoker::new(field, long);
        let target = registry.allocate(counter).unwrap();

        assert_eq!(getter.invoke(&target, &[]).unwrap(), Value::Integer(0));
        assert_eq!(
            setter.invoke(&target, &[Value::Integer(7)]).unwrap(),
            Value::Null
        );
        assert_eq!(getter.invoke(&target, &[]).unwrap(), Value::Integer(7));
        assert!(matches!(
            setter.invoke(&target, &[]),
            Err(Error::Invocation(_))
        ));
        assert_eq!(getter.value_type(), long);
    }
}
