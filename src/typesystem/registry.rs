//! Central in-memory type registry.
//!
//! This module provides the `TypeRegistry`, a thread-safe, append-only store of type
//! declarations implementing [`TypeSystem`]. It is the reference implementation of the
//! introspection capability and is what tests and embedders populate through
//! [`ClassBuilder`].
//!
//! # Registry Architecture
//!
//! - **Slot storage**: `boxcar::Vec` of write-once slots indexed by [`TypeId`]; an id is
//!   reserved when a builder is created and the declaration is published on `build()`,
//!   which allows self-referencing and mutually referencing declarations
//! - **Name index**: `SkipMap` from full name to id, iterated in name order
//! - **Array interning**: `DashMap` from component id to array id, so every array type
//!   exists exactly once
//!
//! # Built-in Types
//!
//! Every registry starts with the root type `Object`, `String` and one type per
//! [`PrimitiveKind`].
//!
//! # Examples
//!
//! ```rust
//! use beanscope::typesystem::{TypeRegistry, TypeSystem};
//!
//! let registry = TypeRegistry::new();
//! let user = registry
//!     .class("com.example", "User")
//!     .property("name", registry.string_type())
//!     .default_constructor()
//!     .build()?;
//!
//! assert_eq!(registry.get_by_fullname("com.example.User"), Some(user));
//! assert_eq!(registry.type_name(user)?, "com.example.User");
//! # Ok::<(), beanscope::Error>(())
//! ```

use std::{
    collections::HashMap,
    sync::{Arc, OnceLock},
};

use crossbeam_skiplist::SkipMap;
use dashmap::{mapref::entry::Entry, DashMap};
use strum::IntoEnumIterator;

use crate::{
    typesystem::{
        ClassBuilder, ConstructorRc, FieldRc, GenericType, MethodRc, PrimitiveKind, TypeFlags,
        TypeFlavor, TypeId, TypeParam, TypeSystem,
    },
    Error::TypeNotFound,
    Result,
};

/// Reference to a `ClassDef`
pub type ClassDefRc = Arc<ClassDef>;

/// A published type declaration
#[derive(Debug)]
pub struct ClassDef {
    /// Identity of this type
    pub id: TypeId,
    /// Namespace (can be empty for built-in types)
    pub namespace: String,
    /// Simple name
    pub name: String,
    /// Category of the type
    pub flavor: TypeFlavor,
    /// Type-level modifiers
    pub flags: TypeFlags,
    /// Class-scoped type parameters
    pub type_params: Vec<TypeParam>,
    /// The declared superclass ('extends')
    pub superclass: Option<GenericType>,
    /// Directly implemented interfaces
    pub interfaces: Vec<GenericType>,
    /// Declared methods
    pub methods: Vec<MethodRc>,
    /// Declared fields
    pub fields: Vec<FieldRc>,
    /// Declared constructors
    pub constructors: Vec<ConstructorRc>,
}

impl ClassDef {
    /// Returns the full name (Namespace.Name) of the type
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    fn builtin(id: TypeId, name: String, flavor: TypeFlavor, superclass: Option<TypeId>) -> Self {
        ClassDef {
            id,
            namespace: String::new(),
            name,
            flavor,
            flags: TypeFlags::empty(),
            type_params: Vec::new(),
            superclass: superclass.map(GenericType::Class),
            interfaces: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
        }
    }
}

/// Thread-safe, append-only registry of type declarations
pub struct TypeRegistry {
    slots: boxcar::Vec<OnceLock<ClassDefRc>>,
    by_name: SkipMap<String, TypeId>,
    arrays: DashMap<TypeId, TypeId>,
    primitives: HashMap<PrimitiveKind, TypeId>,
    object: TypeId,
    string: TypeId,
}

impl TypeRegistry {
    /// Create a new registry with the built-in types registered
    #[must_use]
    pub fn new() -> Self {
        let slots = boxcar::Vec::new();
        let by_name = SkipMap::new();

        let publish = |def: ClassDef| {
            let index = slots.push(OnceLock::new());
            let id = TypeId::new(u32::try_from(index).unwrap_or(u32::MAX));
            let def = ClassDef { id, ..def };
            by_name.insert(def.fullname(), id);
            if let Some(slot) = slots.get(index) {
                let _ = slot.set(Arc::new(def));
            }
            id
        };

        let object = publish(ClassDef::builtin(
            TypeId::new(0),
            "Object".to_string(),
            TypeFlavor::Class,
            None,
        ));
        let string = publish(ClassDef {
            flags: TypeFlags::FINAL,
            ..ClassDef::builtin(
                TypeId::new(0),
                "String".to_string(),
                TypeFlavor::Class,
                Some(object),
            )
        });
        let primitives = PrimitiveKind::iter()
            .map(|kind| {
                let id = publish(ClassDef::builtin(
                    TypeId::new(0),
                    kind.name().to_string(),
                    TypeFlavor::Primitive(kind),
                    None,
                ));
                (kind, id)
            })
            .collect();

        TypeRegistry {
            slots,
            by_name,
            arrays: DashMap::new(),
            primitives,
            object,
            string,
        }
    }

    /// Start declaring a class; the id is reserved immediately
    ///
    /// ## Arguments
    /// * 'namespace' - Namespace of the class
    /// * 'name'      - Simple name of the class
    pub fn class(&self, namespace: &str, name: &str) -> ClassBuilder<'_> {
        ClassBuilder::new(self, self.reserve(), namespace, name, TypeFlavor::Class)
    }

    /// Start declaring an interface; the id is reserved immediately
    ///
    /// ## Arguments
    /// * 'namespace' - Namespace of the interface
    /// * 'name'      - Simple name of the interface
    pub fn interface(&self, namespace: &str, name: &str) -> ClassBuilder<'_> {
        ClassBuilder::new(self, self.reserve(), namespace, name, TypeFlavor::Interface)
    }

    /// The built-in `String` type
    #[must_use]
    pub fn string_type(&self) -> TypeId {
        self.string
    }

    /// Get a published declaration
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if the id was never reserved or its
    /// declaration has not been built yet.
    pub fn get(&self, id: TypeId) -> Result<ClassDefRc> {
        self.slots
            .get(id.index())
            .and_then(OnceLock::get)
            .cloned()
            .ok_or(TypeNotFound(id))
    }

    /// Look up a type by its full name (Namespace.Name)
    #[must_use]
    pub fn get_by_fullname(&self, fullname: &str) -> Option<TypeId> {
        self.by_name.get(fullname).map(|entry| *entry.value())
    }

    /// All published types, ordered by full name
    #[must_use]
    pub fn types_by_name(&self) -> Vec<(String, TypeId)> {
        self.by_name
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// Number of reserved type slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.count()
    }

    /// Returns `true` if no slot was ever reserved (never the case after `new`)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.count() == 0
    }

    pub(crate) fn reserve(&self) -> TypeId {
        let index = self.slots.push(OnceLock::new());
        TypeId::new(u32::try_from(index).unwrap_or(u32::MAX))
    }

    pub(crate) fn publish(&self, def: ClassDef) -> Result<TypeId> {
        let id = def.id;
        let fullname = def.fullname();
        let slot = self.slots.get(id.index()).ok_or(TypeNotFound(id))?;
        slot.set(Arc::new(def))
            .map_err(|_| type_error!("Type {} was already published", fullname))?;
        self.by_name.insert(fullname, id);
        Ok(id)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeSystem for TypeRegistry {
    fn type_name(&self, ty: TypeId) -> Result<String> {
        Ok(self.get(ty)?.fullname())
    }

    fn flavor(&self, ty: TypeId) -> Result<TypeFlavor> {
        Ok(self.get(ty)?.flavor)
    }

    fn type_flags(&self, ty: TypeId) -> Result<TypeFlags> {
        Ok(self.get(ty)?.flags)
    }

    fn generic_superclass(&self, ty: TypeId) -> Result<Option<GenericType>> {
        Ok(self.get(ty)?.superclass.clone())
    }

    fn generic_interfaces(&self, ty: TypeId) -> Result<Vec<GenericType>> {
        Ok(self.get(ty)?.interfaces.clone())
    }

    fn type_params(&self, ty: TypeId) -> Result<Vec<TypeParam>> {
        Ok(self.get(ty)?.type_params.clone())
    }

    fn declared_methods(&self, ty: TypeId) -> Result<Vec<MethodRc>> {
        Ok(self.get(ty)?.methods.clone())
    }

    fn declared_fields(&self, ty: TypeId) -> Result<Vec<FieldRc>> {
        Ok(self.get(ty)?.fields.clone())
    }

    fn declared_constructors(&self, ty: TypeId) -> Result<Vec<ConstructorRc>> {
        Ok(self.get(ty)?.constructors.clone())
    }

    fn object_type(&self) -> TypeId {
        self.object
    }

    fn primitive(&self, kind: PrimitiveKind) -> TypeId {
        // every kind is registered in `new`
        self.primitives.get(&kind).copied().unwrap_or(self.object)
    }

    fn array_of(&self, component: TypeId) -> Result<TypeId> {
        match self.arrays.entry(component) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => {
                let element = self.get(component)?;
                let id = self.reserve();
                self.publish(ClassDef {
                    namespace: element.namespace.clone(),
                    ..ClassDef::builtin(
                        id,
                        format!("{}[]", element.name),
                        TypeFlavor::Array { component },
                        Some(self.object),
                    )
                })?;
                entry.insert(id);
                Ok(id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{runtime::Value, typesystem::MemberFlags};

    #[test]
    fn test_registry_builtins() {
        let registry = TypeRegistry::new();
        let object = registry.object_type();

        assert_eq!(registry.type_name(object).unwrap(), "Object");
        assert_eq!(registry.type_name(registry.string_type()).unwrap(), "String");
        assert_eq!(registry.superclass(registry.string_type()).unwrap(), Some(object));
        assert_eq!(registry.superclass(object).unwrap(), None);

        for kind in PrimitiveKind::iter() {
            let id = registry.primitive(kind);
            assert_eq!(registry.flavor(id).unwrap(), TypeFlavor::Primitive(kind));
            assert_eq!(registry.type_name(id).unwrap(), kind.name());
            assert_eq!(registry.get_by_fullname(kind.name()), Some(id));
        }
        assert_eq!(registry.len(), 2 + PrimitiveKind::iter().count());
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_registry_unbuilt_type() {
        let registry = TypeRegistry::new();
        let builder = registry.class("test", "Pending");
        let id = builder.id();

        assert!(matches!(registry.get(id), Err(TypeNotFound(_))));
        builder.build().unwrap();
        assert_eq!(registry.type_name(id).unwrap(), "test.Pending");
        assert!(matches!(
            registry.get(TypeId::new(9999)),
            Err(TypeNotFound(_))
        ));
    }

    #[test]
    fn test_registry_array_interning() {
        let registry = TypeRegistry::new();
        let string = registry.string_type();

        let first = registry.array_of(string).unwrap();
        let second = registry.array_of(string).unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.type_name(first).unwrap(), "String[]");

        let nested = registry.array_of(first).unwrap();
        assert_ne!(nested, first);
        assert_eq!(registry.type_name(nested).unwrap(), "String[][]");
    }

    #[test]
    fn test_registry_assignability() {
        let registry = TypeRegistry::new();
        let object = registry.object_type();
        let string = registry.string_type();
        let sequence = registry.interface("java.lang", "CharSequence").build().unwrap();
        let text = registry
            .class("test", "Text")
            .implements(sequence)
            .build()
            .unwrap();
        let rich = registry.class("test", "RichText").extends(text).build().unwrap();
        let int = registry.primitive(PrimitiveKind::Int);

        assert!(registry.is_assignable_from(object, rich).unwrap());
        assert!(registry.is_assignable_from(sequence, rich).unwrap());
        assert!(registry.is_assignable_from(text, rich).unwrap());
        assert!(!registry.is_assignable_from(rich, text).unwrap());
        assert!(!registry.is_assignable_from(sequence, string).unwrap());
        assert!(registry.is_assignable_from(object, sequence).unwrap());

        assert!(registry.is_assignable_from(int, int).unwrap());
        assert!(!registry.is_assignable_from(object, int).unwrap());

        let texts = registry.array_of(text).unwrap();
        let riches = registry.array_of(rich).unwrap();
        let ints = registry.array_of(int).unwrap();
        assert!(registry.is_assignable_from(texts, riches).unwrap());
        assert!(!registry.is_assignable_from(riches, texts).unwrap());
        assert!(registry.is_assignable_from(object, ints).unwrap());
        assert!(!registry.is_assignable_from(registry.array_of(object).unwrap(), ints).unwrap());
    }

    #[test]
    fn test_registry_allocate() {
        let registry = TypeRegistry::new();
        let base = registry
            .class("test", "Base")
            .field("id", registry.primitive(PrimitiveKind::Long))
            .field_with("COUNT", registry.primitive(PrimitiveKind::Int), MemberFlags::STATIC)
            .build()
            .unwrap();
        let derived = registry
            .class("test", "Derived")
            .extends(base)
            .field("id", registry.string_type())
            .build()
            .unwrap();
        let abstract_type = registry
            .class("test", "Shape")
            .flags(TypeFlags::ABSTRACT)
            .build()
            .unwrap();

        let instance = registry.allocate(derived).unwrap();
        assert_eq!(instance.slot_count().unwrap(), 2);
        assert_eq!(instance.get(base, "id").unwrap(), crate::runtime::Value::Integer(0));
        assert!(instance.get(derived, "id").unwrap().is_null());

        assert!(matches!(
            registry.allocate(abstract_type),
            Err(crate::Error::Instantiation(_))
        ));
        assert!(matches!(
            registry.allocate(registry.primitive(PrimitiveKind::Int)),
            Err(crate::Error::Instantiation(_))
        ));
    }

    #[test]
    fn test_registry_dispatch_prefers_same_return() {
        let registry = TypeRegistry::new();
        let object = registry.object_type();
        let string = registry.string_type();
        let base = registry
            .class("test", "Describable")
            .getter("describe", object)
            .build()
            .unwrap();
        let derived = registry
            .class("test", "Described")
            .extends(base)
            .method(|m| m.name("describe").returns(string).body(|_, _| Ok(Value::Null)))
            .method(|m| m.name("describe").returns(object).body(|_, _| Ok(Value::Null)))
            .build()
            .unwrap();

        let declared = registry.declared_methods(derived).unwrap();
        let base_methods = registry.declared_methods(base).unwrap();
        let abstract_describe = &base_methods[0];
        let found = registry
            .find_implementation(derived, abstract_describe)
            .unwrap()
            .unwrap();
        assert_eq!(found.return_type, GenericType::Class(object));

        // covariant implementation when no exact return type exists
        let narrowed = registry
            .class("test", "Narrowed")
            .extends(base)
            .method(|m| m.name("describe").returns(string).body(|_, _| Ok(Value::Null)))
            .build()
            .unwrap();
        let found = registry
            .find_implementation(narrowed, abstract_describe)
            .unwrap()
            .unwrap();
        assert_eq!(found.return_type, GenericType::Class(string));
        assert_eq!(declared.len(), 2);
    }

    #[test]
    fn test_registry_types_by_name() {
        let registry = TypeRegistry::new();
        registry.class("b", "Second").build().unwrap();
        registry.class("a", "First").build().unwrap();

        let names: Vec<_> = registry
            .types_by_name()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        let first = names.iter().position(|n| n == "a.First").unwrap();
        let second = names.iter().position(|n| n == "b.Second").unwrap();
        assert!(first < second);
    }
}
