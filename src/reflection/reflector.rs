//! Per-type property tables.
//!
//! A [`Reflector`] is computed once for a concrete type and never changes afterwards.
//! Construction walks the type hierarchy, collects bean-style accessor candidates,
//! reduces every property to a single read and a single write accessor and finally
//! falls back to plain fields for names no method claims.
//!
//! # Method Discovery
//!
//! For each class from the reflected type up to (not including) the root type, its
//! declared methods are collected, followed by the methods of every interface it
//! implements, transitively. Bridge methods are skipped. A method is dropped when a
//! method with the same erased return type, name and erased parameter types was
//! already seen further down the hierarchy, so overrides collapse onto the most
//! derived declaration while covariant overrides stay separate candidates.
//!
//! # Conflict Resolution
//!
//! Getter candidates of one property are ordered by return type: a subtype beats its
//! supertypes and, for primitive `boolean`, `isX` beats `getX`. Setter candidates are
//! ordered by parameter type, except that a setter taking exactly the resolved getter
//! type always wins. The winner must beat every other candidate; if no candidate
//! does, construction fails. This makes the outcome independent of discovery order.
//!
//! # Examples
//!
//! ```rust
//! use beanscope::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new());
//! let user = registry
//!     .class("com.example", "User")
//!     .property("userName", registry.string_type())
//!     .default_constructor()
//!     .build()?;
//!
//! let types: TypeSystemRc = registry.clone();
//! let reflector = Reflector::new(&types, user)?;
//!
//! assert!(reflector.has_getter("userName"));
//! assert_eq!(reflector.getter_type("userName")?, registry.string_type());
//! assert_eq!(reflector.find_property_name("USERNAME"), Some("userName"));
//!
//! let instance = reflector.default_constructor()?.new_instance()?;
//! reflector.set_invoker("userName")?.invoke(&instance, &[Value::from("alice")])?;
//! assert_eq!(
//!     reflector.get_invoker("userName")?.invoke(&instance, &[])?,
//!     Value::from("alice")
//! );
//! # Ok::<(), beanscope::Error>(())
//! ```

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
    sync::Arc,
};

use tracing::{debug, trace};

use crate::{
    reflection::{
        namer, GetFieldInvoker, InvokerRc, MethodInvoker, ReflectorConfig, SetFieldInvoker,
    },
    runtime::ObjectRc,
    typesystem::{
        ConstructorRc, GenericType, MethodRc, PrimitiveKind, TypeId, TypeResolver, TypeSystem,
        TypeSystemRc,
    },
    AccessorKind, Error, Result,
};

/// Erased return type, name and erased parameter types
type Signature = (TypeId, String, Vec<TypeId>);

/// Creates new objects of a type through its zero-argument constructor
#[derive(Clone)]
pub struct DefaultConstructor {
    ty: TypeId,
    constructor: ConstructorRc,
    types: TypeSystemRc,
}

impl DefaultConstructor {
    /// The type this constructor instantiates
    #[must_use]
    pub fn declaring_type(&self) -> TypeId {
        self.ty
    }

    /// Allocate a new object and run the constructor body on it
    ///
    /// # Errors
    /// Returns [`Error::Instantiation`] if the type cannot be allocated, or the
    /// error raised by the constructor body.
    pub fn new_instance(&self) -> Result<ObjectRc> {
        let instance = self.types.allocate(self.ty)?;
        if let Some(body) = &self.constructor.body {
            body(&instance, &[])?;
        }
        Ok(Arc::new(instance))
    }
}

impl fmt::Debug for DefaultConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultConstructor")
            .field("ty", &self.ty)
            .field("constructor", &self.constructor)
            .finish()
    }
}

/// The immutable property table of one type
pub struct Reflector {
    ty: TypeId,
    class_name: String,
    readable: Vec<String>,
    writable: Vec<String>,
    get_invokers: HashMap<String, InvokerRc>,
    set_invokers: HashMap<String, InvokerRc>,
    get_types: HashMap<String, TypeId>,
    set_types: HashMap<String, TypeId>,
    generic_get_types: HashMap<String, GenericType>,
    generic_set_types: HashMap<String, GenericType>,
    case_insensitive: HashMap<String, String>,
    default_constructor: Option<DefaultConstructor>,
}

impl Reflector {
    /// Build the property table of `ty` with the default configuration
    ///
    /// ## Arguments
    /// * 'types' - The type system describing `ty` and its hierarchy
    /// * 'ty'    - The type to reflect
    ///
    /// # Errors
    /// Returns [`Error::AmbiguousGetter`] / [`Error::AmbiguousSetter`] if a property
    /// has no single winning accessor, or [`Error::TypeNotFound`] if the hierarchy
    /// references unknown types.
    pub fn new(types: &TypeSystemRc, ty: TypeId) -> Result<Self> {
        Self::with_config(types, ty, &ReflectorConfig::default())
    }

    /// Build the property table of `ty`
    ///
    /// # Errors
    /// See [`Reflector::new`]; additionally returns [`Error::RecursionLimit`] if the
    /// superclass chain is deeper than `config.max_hierarchy_depth`.
    pub fn with_config(
        types: &TypeSystemRc,
        ty: TypeId,
        config: &ReflectorConfig,
    ) -> Result<Self> {
        let class_name = types.type_name(ty)?;
        debug!(class = %class_name, "building property table");

        let mut table = TableBuilder {
            types,
            resolver: TypeResolver::new(&**types),
            ty,
            max_depth: config.max_hierarchy_depth,
            get_invokers: HashMap::new(),
            set_invokers: HashMap::new(),
            get_types: HashMap::new(),
            set_types: HashMap::new(),
            generic_get_types: HashMap::new(),
            generic_set_types: HashMap::new(),
        };

        let methods = table.collect_methods()?;
        table.add_getters(&methods)?;
        table.add_setters(&methods)?;
        table.add_fields()?;

        let default_constructor = types
            .declared_constructors(ty)?
            .into_iter()
            .find(|constructor| constructor.params.is_empty())
            .map(|constructor| DefaultConstructor {
                ty,
                constructor,
                types: types.clone(),
            });

        let mut readable: Vec<String> = table.get_invokers.keys().cloned().collect();
        let mut writable: Vec<String> = table.set_invokers.keys().cloned().collect();
        readable.sort();
        writable.sort();

        let case_insensitive = readable
            .iter()
            .chain(&writable)
            .map(|name| (name.to_uppercase(), name.clone()))
            .collect();

        debug!(
            class = %class_name,
            readable = readable.len(),
            writable = writable.len(),
            "property table built"
        );

        Ok(Reflector {
            ty,
            class_name,
            readable,
            writable,
            get_invokers: table.get_invokers,
            set_invokers: table.set_invokers,
            get_types: table.get_types,
            set_types: table.set_types,
            generic_get_types: table.generic_get_types,
            generic_set_types: table.generic_set_types,
            case_insensitive,
            default_constructor,
        })
    }

    /// The reflected type
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    /// Full name of the reflected type
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Names of all readable properties, sorted
    #[must_use]
    pub fn readable_property_names(&self) -> &[String] {
        &self.readable
    }

    /// Names of all writable properties, sorted
    #[must_use]
    pub fn writable_property_names(&self) -> &[String] {
        &self.writable
    }

    /// Returns `true` if `name` has a read accessor
    #[must_use]
    pub fn has_getter(&self, name: &str) -> bool {
        self.get_invokers.contains_key(name)
    }

    /// Returns `true` if `name` has a write accessor
    #[must_use]
    pub fn has_setter(&self, name: &str) -> bool {
        self.set_invokers.contains_key(name)
    }

    /// The erased type read from property `name`
    ///
    /// # Errors
    /// Returns [`Error::PropertyNotFound`] if `name` is not readable.
    pub fn getter_type(&self, name: &str) -> Result<TypeId> {
        self.get_types
            .get(name)
            .copied()
            .ok_or_else(|| self.not_found(AccessorKind::Getter, name))
    }

    /// The erased type written to property `name`
    ///
    /// # Errors
    /// Returns [`Error::PropertyNotFound`] if `name` is not writable.
    pub fn setter_type(&self, name: &str) -> Result<TypeId> {
        self.set_types
            .get(name)
            .copied()
            .ok_or_else(|| self.not_found(AccessorKind::Setter, name))
    }

    /// The read type of `name` before erasure, with type variables substituted
    ///
    /// # Errors
    /// Returns [`Error::PropertyNotFound`] if `name` is not readable.
    pub fn generic_getter_type(&self, name: &str) -> Result<&GenericType> {
        self.generic_get_types
            .get(name)
            .ok_or_else(|| self.not_found(AccessorKind::Getter, name))
    }

    /// The write type of `name` before erasure, with type variables substituted
    ///
    /// # Errors
    /// Returns [`Error::PropertyNotFound`] if `name` is not writable.
    pub fn generic_setter_type(&self, name: &str) -> Result<&GenericType> {
        self.generic_set_types
            .get(name)
            .ok_or_else(|| self.not_found(AccessorKind::Setter, name))
    }

    /// The read accessor of `name`
    ///
    /// # Errors
    /// Returns [`Error::PropertyNotFound`] if `name` is not readable.
    pub fn get_invoker(&self, name: &str) -> Result<InvokerRc> {
        self.get_invokers
            .get(name)
            .cloned()
            .ok_or_else(|| self.not_found(AccessorKind::Getter, name))
    }

    /// The write accessor of `name`
    ///
    /// # Errors
    /// Returns [`Error::PropertyNotFound`] if `name` is not writable.
    pub fn set_invoker(&self, name: &str) -> Result<InvokerRc> {
        self.set_invokers
            .get(name)
            .cloned()
            .ok_or_else(|| self.not_found(AccessorKind::Setter, name))
    }

    /// Resolve `name` case-insensitively to the canonical property name
    #[must_use]
    pub fn find_property_name(&self, name: &str) -> Option<&str> {
        self.case_insensitive
            .get(&name.to_uppercase())
            .map(String::as_str)
    }

    /// The zero-argument constructor
    ///
    /// # Errors
    /// Returns [`Error::NoDefaultConstructor`] if the type declares none.
    pub fn default_constructor(&self) -> Result<&DefaultConstructor> {
        self.default_constructor
            .as_ref()
            .ok_or_else(|| Error::NoDefaultConstructor(self.class_name.clone()))
    }

    /// Returns `true` if the type declares a zero-argument constructor
    #[must_use]
    pub fn has_default_constructor(&self) -> bool {
        self.default_constructor.is_some()
    }

    fn not_found(&self, kind: AccessorKind, name: &str) -> Error {
        Error::PropertyNotFound {
            kind,
            property: name.to_string(),
            class: self.class_name.clone(),
        }
    }
}

impl fmt::Debug for Reflector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reflector")
            .field("ty", &self.ty)
            .field("class_name", &self.class_name)
            .field("readable", &self.readable)
            .field("writable", &self.writable)
            .field("default_constructor", &self.default_constructor.is_some())
            .finish()
    }
}

/// Mutable state while a property table is being built
struct TableBuilder<'a> {
    types: &'a TypeSystemRc,
    resolver: TypeResolver<'a, dyn TypeSystem>,
    ty: TypeId,
    max_depth: usize,
    get_invokers: HashMap<String, InvokerRc>,
    set_invokers: HashMap<String, InvokerRc>,
    get_types: HashMap<String, TypeId>,
    set_types: HashMap<String, TypeId>,
    generic_get_types: HashMap<String, GenericType>,
    generic_set_types: HashMap<String, GenericType>,
}

impl TableBuilder<'_> {
    /// Superclass chain of the reflected type, most derived first, root excluded
    fn class_chain(&self) -> Result<Vec<TypeId>> {
        let object = self.types.object_type();
        let mut chain = Vec::new();
        let mut current = Some(self.ty);
        while let Some(class) = current {
            if class == object {
                break;
            }
            if chain.len() >= self.max_depth {
                return Err(Error::RecursionLimit(self.max_depth));
            }
            chain.push(class);
            current = self.types.superclass(class)?;
        }
        Ok(chain)
    }

    fn collect_methods(&self) -> Result<Vec<MethodRc>> {
        let mut seen = HashSet::new();
        let mut visited_interfaces = HashSet::new();
        let mut methods = Vec::new();

        for class in self.class_chain()? {
            self.add_unique(self.types.declared_methods(class)?, &mut seen, &mut methods)?;

            let mut pending = self.types.interfaces(class)?;
            pending.reverse();
            while let Some(interface) = pending.pop() {
                if !visited_interfaces.insert(interface) {
                    continue;
                }
                self.add_unique(self.types.declared_methods(interface)?, &mut seen, &mut methods)?;

                let mut parents = self.types.interfaces(interface)?;
                parents.reverse();
                pending.extend(parents);
            }
        }

        Ok(methods)
    }

    fn add_unique(
        &self,
        candidates: Vec<MethodRc>,
        seen: &mut HashSet<Signature>,
        methods: &mut Vec<MethodRc>,
    ) -> Result<()> {
        for method in candidates {
            if method.is_bridge() {
                continue;
            }
            if seen.insert(self.signature(&method)?) {
                methods.push(method);
            }
        }
        Ok(())
    }

    fn signature(&self, method: &MethodRc) -> Result<Signature> {
        let params = method
            .params
            .iter()
            .map(|param| self.resolver.erase_declared(method, param))
            .collect::<Result<Vec<_>>>()?;
        Ok((
            self.resolver.erase_declared(method, &method.return_type)?,
            method.name.clone(),
            params,
        ))
    }

    fn add_getters(&mut self, methods: &[MethodRc]) -> Result<()> {
        let mut conflicting: BTreeMap<String, Vec<MethodRc>> = BTreeMap::new();
        for method in methods {
            if method.param_count() == 0 && namer::is_getter(&method.name) {
                let property = namer::method_to_property(&method.name)?;
                conflicting.entry(property).or_default().push(method.clone());
            }
        }

        for (property, candidates) in conflicting {
            let winner = self.resolve_getter(&property, &candidates)?;
            if !namer::is_valid_property_name(&property) {
                continue;
            }

            let generic = self.resolver.resolve_return_type(&winner, self.ty)?;
            let read_type = self.resolver.erase(&generic)?;
            self.get_invokers.insert(
                property.clone(),
                Arc::new(MethodInvoker::new(self.types.clone(), winner, read_type)),
            );
            self.get_types.insert(property.clone(), read_type);
            self.generic_get_types.insert(property, generic);
        }

        Ok(())
    }

    fn resolve_getter(&self, property: &str, candidates: &[MethodRc]) -> Result<MethodRc> {
        if let [single] = candidates {
            return Ok(single.clone());
        }

        let boolean = self.types.primitive(PrimitiveKind::Boolean);
        let typed = candidates
            .iter()
            .map(|method| Ok((method, self.resolver.erase_declared(method, &method.return_type)?)))
            .collect::<Result<Vec<_>>>()?;

        let ambiguous = || -> Result<Error> {
            Ok(Error::AmbiguousGetter {
                property: property.to_string(),
                class: self.types.type_name(candidates[0].declaring)?,
            })
        };

        for (index, (method, ty)) in typed.iter().enumerate() {
            for (other, other_ty) in &typed[index + 1..] {
                if ty == other_ty
                    && (*ty != boolean || method.name.starts_with("is") == other.name.starts_with("is"))
                {
                    return Err(ambiguous()?);
                }
            }
        }

        let mut winner = None;
        for (index, (method, ty)) in typed.iter().enumerate() {
            let mut beats_all = true;
            for (other_index, (other, other_ty)) in typed.iter().enumerate() {
                if index == other_index {
                    continue;
                }
                let beats = if ty == other_ty {
                    method.name.starts_with("is") && !other.name.starts_with("is")
                } else {
                    self.types.is_assignable_from(*other_ty, *ty)?
                };
                if !beats {
                    beats_all = false;
                    break;
                }
            }
            if beats_all {
                winner = Some(Arc::clone(method));
                break;
            }
        }

        match winner {
            Some(winner) => {
                trace!(
                    property,
                    candidates = candidates.len(),
                    winner = %winner.name,
                    "resolved getter conflict"
                );
                Ok(winner)
            }
            None => Err(ambiguous()?),
        }
    }

    fn add_setters(&mut self, methods: &[MethodRc]) -> Result<()> {
        let mut conflicting: BTreeMap<String, Vec<MethodRc>> = BTreeMap::new();
        for method in methods {
            if method.param_count() == 1 && namer::is_setter(&method.name) {
                let property = namer::method_to_property(&method.name)?;
                conflicting.entry(property).or_default().push(method.clone());
            }
        }

        for (property, candidates) in conflicting {
            let winner = self.resolve_setter(&property, &candidates)?;
            if !namer::is_valid_property_name(&property) {
                continue;
            }

            let generic = self
                .resolver
                .resolve_param_types(&winner, self.ty)?
                .into_iter()
                .next()
                .unwrap_or(GenericType::Class(self.types.object_type()));
            let write_type = self.resolver.erase(&generic)?;
            self.set_invokers.insert(
                property.clone(),
                Arc::new(MethodInvoker::new(self.types.clone(), winner, write_type)),
            );
            self.set_types.insert(property.clone(), write_type);
            self.generic_set_types.insert(property, generic);
        }

        Ok(())
    }

    fn resolve_setter(&self, property: &str, candidates: &[MethodRc]) -> Result<MethodRc> {
        if let [single] = candidates {
            return Ok(single.clone());
        }

        let typed = candidates
            .iter()
            .map(|method| {
                let param = method
                    .params
                    .first()
                    .map(|param| self.resolver.erase_declared(method, param))
                    .transpose()?
                    .unwrap_or(self.types.object_type());
                Ok((method, param))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(getter_type) = self.get_types.get(property) {
            if let Some((method, _)) = typed.iter().find(|(_, ty)| ty == getter_type) {
                trace!(property, winner = %method.name, "setter matches getter type");
                return Ok(Arc::clone(method));
            }
        }

        // equal parameter types resolve to the later candidate
        let mut winner = None;
        for (method, ty) in typed.iter().rev() {
            let mut narrowest = true;
            for (_, other_ty) in &typed {
                if !self.types.is_assignable_from(*other_ty, *ty)? {
                    narrowest = false;
                    break;
                }
            }
            if narrowest {
                winner = Some(Arc::clone(method));
                break;
            }
        }

        if let Some(winner) = winner {
            trace!(
                property,
                candidates = candidates.len(),
                "resolved setter conflict by parameter type"
            );
            return Ok(winner);
        }

        let mut conflict = (&typed[0], &typed[1]);
        'search: for (index, first) in typed.iter().enumerate() {
            for second in &typed[index + 1..] {
                if !self.types.is_assignable_from(first.1, second.1)?
                    && !self.types.is_assignable_from(second.1, first.1)?
                {
                    conflict = (first, second);
                    break 'search;
                }
            }
        }

        let ((_, first), (second_method, second)) = conflict;
        Err(Error::AmbiguousSetter {
            property: property.to_string(),
            class: self.types.type_name(second_method.declaring)?,
            first: self.types.type_name(*first)?,
            second: self.types.type_name(*second)?,
        })
    }

    fn add_fields(&mut self) -> Result<()> {
        let mut depth = 0;
        let mut current = Some(self.ty);
        while let Some(class) = current {
            if depth >= self.max_depth {
                return Err(Error::RecursionLimit(self.max_depth));
            }
            depth += 1;

            for field in self.types.declared_fields(class)? {
                if !namer::is_valid_property_name(&field.name) {
                    continue;
                }

                let claims_write = !self.set_invokers.contains_key(&field.name)
                    && !field.flags.is_constant();
                let claims_read = !self.get_invokers.contains_key(&field.name);
                if !claims_write && !claims_read {
                    continue;
                }

                let generic = self.resolver.resolve_field_type(&field, self.ty)?;
                let field_type = self.resolver.erase(&generic)?;
                if claims_write {
                    self.set_invokers.insert(
                        field.name.clone(),
                        Arc::new(SetFieldInvoker::new(field.clone(), field_type)),
                    );
                    self.set_types.insert(field.name.clone(), field_type);
                    self.generic_set_types
                        .insert(field.name.clone(), generic.clone());
                }
                if claims_read {
                    self.get_invokers.insert(
                        field.name.clone(),
                        Arc::new(GetFieldInvoker::new(field.clone(), field_type)),
                    );
                    self.get_types.insert(field.name.clone(), field_type);
                    self.generic_get_types.insert(field.name.clone(), generic);
                }
            }

            current = self.types.superclass(class)?;
        }

        Ok(())
    }
}
