//! Generic type resolution against a concrete owning type.
//!
//! A member declared as `T getId()` on `Base<T>` has a different effective type
//! depending on which subclass it is viewed through: `Child extends Base<String>`
//! sees `String`, a raw `Other extends Base` sees the bound of `T`. The
//! [`TypeResolver`] computes this view.
//!
//! # Resolution Rules
//!
//! - Class-scoped type variables are bound by walking the owner's generic superclass
//!   and interfaces, substituting type arguments along the path to the declaring class
//! - Variables that stay unbound (owner is the declaring class, raw inheritance, or
//!   method-scoped variables) fall back to their first bound, else the root type
//! - Erasure reduces parameterized types to their raw class and generic arrays to
//!   concrete (interned) array types; anything else erases to the root type

use std::collections::{HashMap, HashSet};

use crate::{
    typesystem::{FieldInfo, GenericType, MethodInfo, TypeId, TypeParam, TypeSystem},
    Result,
};

type Bindings = HashMap<String, GenericType>;

/// Resolves declared member types in the context of a concrete owner
pub struct TypeResolver<'a, T: TypeSystem + ?Sized> {
    types: &'a T,
}

impl<'a, T: TypeSystem + ?Sized> TypeResolver<'a, T> {
    /// Create a resolver over the given type system
    pub fn new(types: &'a T) -> Self {
        TypeResolver { types }
    }

    /// Resolve the return type of `method` as seen from `owner`
    ///
    /// # Errors
    /// Returns an error if a type on the supertype walk is unknown.
    pub fn resolve_return_type(&self, method: &MethodInfo, owner: TypeId) -> Result<GenericType> {
        let env = self.method_env(method, owner)?;
        Ok(self.apply(&method.return_type, &env))
    }

    /// Resolve the parameter types of `method` as seen from `owner`
    ///
    /// # Errors
    /// Returns an error if a type on the supertype walk is unknown.
    pub fn resolve_param_types(
        &self,
        method: &MethodInfo,
        owner: TypeId,
    ) -> Result<Vec<GenericType>> {
        let env = self.method_env(method, owner)?;
        Ok(method
            .params
            .iter()
            .map(|param| self.apply(param, &env))
            .collect())
    }

    /// Resolve the type of `field` as seen from `owner`
    ///
    /// # Errors
    /// Returns an error if a type on the supertype walk is unknown.
    pub fn resolve_field_type(&self, field: &FieldInfo, owner: TypeId) -> Result<GenericType> {
        let env = self.bindings(owner, field.declaring)?;
        Ok(self.apply(&field.field_type, &env))
    }

    /// Reduce a resolved type to a raw type identity
    ///
    /// Variables and wildcards erase to the root type, regardless of bounds.
    ///
    /// # Errors
    /// Returns an error if an array component is unknown.
    pub fn erase(&self, ty: &GenericType) -> Result<TypeId> {
        match ty {
            GenericType::Class(id) | GenericType::Parameterized { raw: id, .. } => Ok(*id),
            GenericType::Array(component) => {
                let component = self.erase(component)?;
                self.types.array_of(component)
            }
            GenericType::Variable(_) | GenericType::Wildcard { .. } => {
                Ok(self.types.object_type())
            }
        }
    }

    /// Erase a type as declared on `method`, without any owner context
    ///
    /// This is the identity used for signature keys and overload comparison:
    /// variables reduce to their declared bound.
    ///
    /// # Errors
    /// Returns an error if the declaring type is unknown.
    pub fn erase_declared(&self, method: &MethodInfo, ty: &GenericType) -> Result<TypeId> {
        let mut env = self.fallbacks(&self.types.type_params(method.declaring)?);
        env.extend(self.fallbacks(&method.type_params));
        self.erase(&self.apply(ty, &env))
    }

    /// Bindings visible inside `method`: class bindings from `owner`, shadowed by
    /// the method's own type parameters
    fn method_env(&self, method: &MethodInfo, owner: TypeId) -> Result<Bindings> {
        let mut env = self.bindings(owner, method.declaring)?;
        for param in &method.type_params {
            let bound = self.fallback_with(param, &env);
            env.insert(param.name.clone(), bound);
        }
        Ok(env)
    }

    /// Bindings of the type parameters of `declaring` as seen from `owner`
    fn bindings(&self, owner: TypeId, declaring: TypeId) -> Result<Bindings> {
        let start = self.fallbacks(&self.types.type_params(owner)?);
        let mut visited = HashSet::new();
        match self.search(owner, declaring, start, &mut visited)? {
            Some(found) => Ok(found),
            None => Ok(self.fallbacks(&self.types.type_params(declaring)?)),
        }
    }

    fn search(
        &self,
        current: TypeId,
        target: TypeId,
        env: Bindings,
        visited: &mut HashSet<TypeId>,
    ) -> Result<Option<Bindings>> {
        if current == target {
            return Ok(Some(env));
        }
        if !visited.insert(current) {
            return Ok(None);
        }

        let parents = self
            .types
            .generic_superclass(current)?
            .into_iter()
            .chain(self.types.generic_interfaces(current)?);
        for parent in parents {
            let Some(raw) = parent.raw_type() else {
                continue;
            };

            let params = self.types.type_params(raw)?;
            let args = parent.type_args();
            let parent_env = if !args.is_empty() && args.len() == params.len() {
                params
                    .iter()
                    .zip(args)
                    .map(|(param, arg)| (param.name.clone(), self.apply(arg, &env)))
                    .collect()
            } else {
                // raw inheritance
                self.fallbacks(&params)
            };

            if let Some(found) = self.search(raw, target, parent_env, visited)? {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    fn fallbacks(&self, params: &[TypeParam]) -> Bindings {
        let empty = Bindings::new();
        params
            .iter()
            .map(|param| (param.name.clone(), self.fallback_with(param, &empty)))
            .collect()
    }

    fn fallback_with(&self, param: &TypeParam, env: &Bindings) -> GenericType {
        match param.bounds.first() {
            Some(bound) => self.apply(bound, env),
            None => GenericType::Class(self.types.object_type()),
        }
    }

    fn apply(&self, ty: &GenericType, env: &Bindings) -> GenericType {
        match ty {
            GenericType::Class(_) => ty.clone(),
            GenericType::Parameterized { raw, args } => GenericType::Parameterized {
                raw: *raw,
                args: args.iter().map(|arg| self.apply(arg, env)).collect(),
            },
            GenericType::Array(component) => GenericType::Array(Box::new(self.apply(component, env))),
            GenericType::Variable(name) => env
                .get(name)
                .cloned()
                .unwrap_or(GenericType::Class(self.types.object_type())),
            GenericType::Wildcard { upper, lower } => GenericType::Wildcard {
                upper: upper.iter().map(|bound| self.apply(bound, env)).collect(),
                lower: lower.iter().map(|bound| self.apply(bound, env)).collect(),
            },
        }
    }
}
