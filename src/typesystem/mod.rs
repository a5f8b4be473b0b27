//! Type introspection for property reflection.
//!
//! The reflector never talks to a concrete type representation directly. It consumes
//! the [`TypeSystem`] capability, which can enumerate the declared members,
//! supertypes and type parameters of a type, test subtyping, and allocate instances.
//! This keeps the resolution algorithm independent of where type information comes
//! from.
//!
//! # Key Components
//!
//! - [`TypeSystem`]: The introspection capability consumed by the reflector
//! - [`TypeRegistry`]: Thread-safe in-memory implementation, populated via builders
//! - [`ClassBuilder`] / [`MethodBuilder`]: Fluent API for declaring types and members
//! - [`TypeResolver`]: Generic type-variable substitution and erasure
//! - [`GenericType`]: Declared member types before substitution
//!
//! # Examples
//!
//! ```rust
//! use beanscope::typesystem::{GenericType, PrimitiveKind, TypeRegistry, TypeSystem};
//!
//! let registry = TypeRegistry::new();
//! let number = registry.class("java.lang", "Number").build()?;
//! let integer = registry.class("java.lang", "Integer").extends(number).build()?;
//!
//! assert!(registry.is_assignable_from(number, integer)?);
//! assert!(!registry.is_assignable_from(integer, number)?);
//! assert!(!registry.is_assignable_from(number, registry.primitive(PrimitiveKind::Int))?);
//! # Ok::<(), beanscope::Error>(())
//! ```

mod base;
mod builder;
mod members;
mod primitives;
mod registry;
mod resolver;

use std::{collections::HashSet, sync::Arc};

pub use base::{GenericType, MemberFlags, TypeFlags, TypeFlavor, TypeId, TypeParam};
pub use builder::{ClassBuilder, MethodBuilder};
pub use members::{
    ConstructorBody, ConstructorInfo, ConstructorRc, FieldInfo, FieldRc, MethodBody, MethodInfo,
    MethodRc,
};
pub use primitives::PrimitiveKind;
pub use registry::{ClassDef, ClassDefRc, TypeRegistry};
pub use resolver::TypeResolver;

use crate::{runtime::Instance, Error, Result};

/// Shared handle to a type system
pub type TypeSystemRc = Arc<dyn TypeSystem>;

/// The introspection facility the reflector consumes.
///
/// Implementors only provide the raw per-type queries; subtyping, virtual dispatch
/// and allocation have default implementations built on top of them.
pub trait TypeSystem: Send + Sync {
    /// Fully qualified, human readable name of a type
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] for unknown ids.
    fn type_name(&self, ty: TypeId) -> Result<String>;

    /// The category of a type
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] for unknown ids.
    fn flavor(&self, ty: TypeId) -> Result<TypeFlavor>;

    /// Type-level modifiers
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] for unknown ids.
    fn type_flags(&self, ty: TypeId) -> Result<TypeFlags>;

    /// The declared superclass, possibly parameterized
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] for unknown ids.
    fn generic_superclass(&self, ty: TypeId) -> Result<Option<GenericType>>;

    /// The directly implemented (or, for interfaces, extended) interfaces
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] for unknown ids.
    fn generic_interfaces(&self, ty: TypeId) -> Result<Vec<GenericType>>;

    /// Class-scoped type parameters
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] for unknown ids.
    fn type_params(&self, ty: TypeId) -> Result<Vec<TypeParam>>;

    /// Methods declared directly on a type, in declaration order
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] for unknown ids.
    fn declared_methods(&self, ty: TypeId) -> Result<Vec<MethodRc>>;

    /// Fields declared directly on a type, in declaration order
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] for unknown ids.
    fn declared_fields(&self, ty: TypeId) -> Result<Vec<FieldRc>>;

    /// Constructors declared directly on a type
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] for unknown ids.
    fn declared_constructors(&self, ty: TypeId) -> Result<Vec<ConstructorRc>>;

    /// The universal root type every reference type is assignable to
    fn object_type(&self) -> TypeId;

    /// The type registered for a primitive kind
    fn primitive(&self, kind: PrimitiveKind) -> TypeId;

    /// The (interned) array type over `component`
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if the component is unknown.
    fn array_of(&self, component: TypeId) -> Result<TypeId>;

    /// The raw superclass
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] for unknown ids.
    fn superclass(&self, ty: TypeId) -> Result<Option<TypeId>> {
        Ok(self
            .generic_superclass(ty)?
            .and_then(|parent| parent.raw_type()))
    }

    /// The raw directly implemented interfaces
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] for unknown ids.
    fn interfaces(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        Ok(self
            .generic_interfaces(ty)?
            .iter()
            .filter_map(GenericType::raw_type)
            .collect())
    }

    /// Returns `true` if a value of type `source` can be used where `target` is expected
    ///
    /// Identical types are always assignable. Primitives are assignable only from
    /// themselves; every other type is assignable to the root type; arrays are
    /// covariant in their component; classes and interfaces follow the transitive
    /// superclass and interface relation.
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if a type on the walk is unknown.
    fn is_assignable_from(&self, target: TypeId, source: TypeId) -> Result<bool> {
        if target == source {
            return Ok(true);
        }

        let target_flavor = self.flavor(target)?;
        let source_flavor = self.flavor(source)?;
        if target_flavor.is_primitive() || source_flavor.is_primitive() {
            return Ok(false);
        }
        if target == self.object_type() {
            return Ok(true);
        }

        match (target_flavor, source_flavor) {
            (TypeFlavor::Array { component: t }, TypeFlavor::Array { component: s }) => {
                return self.is_assignable_from(t, s);
            }
            (TypeFlavor::Array { .. }, _) | (_, TypeFlavor::Array { .. }) => return Ok(false),
            _ => {}
        }

        let mut visited = HashSet::new();
        let mut pending = vec![source];
        while let Some(current) = pending.pop() {
            if current == target {
                return Ok(true);
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(parent) = self.superclass(current)? {
                pending.push(parent);
            }
            pending.extend(self.interfaces(current)?);
        }

        Ok(false)
    }

    /// Find the most derived implementation of `method` for objects of type `receiver`
    ///
    /// Walks the superclass chain of `receiver`, then its interfaces, looking for a
    /// non-static method with a body, the same name and the same erased parameter
    /// types. Within one type, a candidate that also has the same erased return
    /// type is preferred over a covariant one.
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if a type on the walk is unknown.
    fn find_implementation(&self, receiver: TypeId, method: &MethodInfo) -> Result<Option<MethodRc>> {
        let resolver = TypeResolver::new(self);
        let wanted = erased_signature(&resolver, method)?;

        let mut visited = HashSet::new();
        let mut interfaces = Vec::new();
        let mut current = Some(receiver);
        while let Some(ty) = current {
            if !visited.insert(ty) {
                break;
            }
            if let Some(found) = best_override(&resolver, self.declared_methods(ty)?, &wanted)? {
                return Ok(Some(found));
            }
            interfaces.extend(self.interfaces(ty)?);
            current = self.superclass(ty)?;
        }

        while let Some(interface) = interfaces.pop() {
            if !visited.insert(interface) {
                continue;
            }
            if let Some(found) =
                best_override(&resolver, self.declared_methods(interface)?, &wanted)?
            {
                return Ok(Some(found));
            }
            interfaces.extend(self.interfaces(interface)?);
        }

        Ok(None)
    }

    /// Allocate an uninitialized object of `ty` with one slot per instance field
    ///
    /// Slots of the whole superclass chain are created and set to each field's
    /// initial value. Constructors are not run.
    ///
    /// # Errors
    /// Returns [`Error::Instantiation`] for interfaces, primitives, arrays and
    /// abstract classes.
    fn allocate(&self, ty: TypeId) -> Result<Instance> {
        let name = self.type_name(ty)?;
        if self.flavor(ty)? != TypeFlavor::Class {
            return Err(Error::Instantiation(format!(
                "Cannot instantiate non-class type {}",
                name
            )));
        }
        if self.type_flags(ty)?.contains(TypeFlags::ABSTRACT) {
            return Err(Error::Instantiation(format!(
                "Cannot instantiate abstract class {}",
                name
            )));
        }

        let mut slots = std::collections::HashMap::new();
        let mut visited = HashSet::new();
        let mut current = Some(ty);
        while let Some(class) = current {
            if !visited.insert(class) {
                break;
            }
            for field in self.declared_fields(class)? {
                if !field.is_static() {
                    slots.insert((class, field.name.clone()), field.initial.clone());
                }
            }
            current = self.superclass(class)?;
        }

        Ok(Instance::with_slots(ty, slots))
    }
}

/// Name, erased parameter types and erased return type of a method
type ErasedSignature<'m> = (&'m str, Vec<TypeId>, TypeId);

fn erased_signature<'m, T: TypeSystem + ?Sized>(
    resolver: &TypeResolver<'_, T>,
    method: &'m MethodInfo,
) -> Result<ErasedSignature<'m>> {
    let params = method
        .params
        .iter()
        .map(|param| resolver.erase_declared(method, param))
        .collect::<Result<Vec<_>>>()?;
    let ret = resolver.erase_declared(method, &method.return_type)?;
    Ok((&method.name, params, ret))
}

fn best_override<T: TypeSystem + ?Sized>(
    resolver: &TypeResolver<'_, T>,
    candidates: Vec<MethodRc>,
    wanted: &ErasedSignature<'_>,
) -> Result<Option<MethodRc>> {
    let (name, params, ret) = wanted;
    let mut covariant = None;
    for candidate in candidates {
        if candidate.name != *name
            || candidate.body.is_none()
            || candidate.is_static()
            || candidate.params.len() != params.len()
        {
            continue;
        }

        let (_, candidate_params, candidate_ret) = erased_signature(resolver, &candidate)?;
        if candidate_params != *params {
            continue;
        }
        if candidate_ret == *ret {
            return Ok(Some(candidate));
        }
        if covariant.is_none() {
            covariant = Some(candidate);
        }
    }
    Ok(covariant)
}
