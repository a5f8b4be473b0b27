//! Fluent builders for declaring types in a [`TypeRegistry`].
//!
//! A [`ClassBuilder`] reserves its [`TypeId`] as soon as it is created, so members may
//! refer to the type being declared (e.g. `Node getParent()`). The declaration becomes
//! visible to the registry only when [`ClassBuilder::build`] is called.
//!
//! # Example
//!
//! ```rust
//! use beanscope::typesystem::{GenericType, PrimitiveKind, TypeParam, TypeRegistry, TypeSystem};
//! use beanscope::runtime::Value;
//!
//! let registry = TypeRegistry::new();
//! let builder = registry.class("com.example", "Node");
//! let node = builder.id();
//! builder
//!     .type_param(TypeParam::new("T"))
//!     .property("parent", node)
//!     .field("payload", GenericType::var("T"))
//!     .method(|method| {
//!         method
//!             .name("isRoot")
//!             .returns(registry.primitive(PrimitiveKind::Boolean))
//!             .body(|_, _| Ok(Value::Boolean(true)))
//!     })
//!     .default_constructor()
//!     .build()?;
//! # Ok::<(), beanscope::Error>(())
//! ```

use std::sync::Arc;

use crate::{
    runtime::{Instance, Value},
    typesystem::{
        registry::ClassDef, ConstructorBody, ConstructorInfo, FieldInfo, GenericType,
        MemberFlags, MethodBody, MethodInfo, PrimitiveKind, TypeFlags, TypeFlavor, TypeId,
        TypeParam, TypeRegistry, TypeSystem,
    },
    Result,
};

/// Provides a fluent API for declaring a method
pub struct MethodBuilder {
    name: String,
    return_type: Option<GenericType>,
    params: Vec<GenericType>,
    type_params: Vec<TypeParam>,
    flags: MemberFlags,
    body: Option<MethodBody>,
}

impl MethodBuilder {
    fn new() -> Self {
        MethodBuilder {
            name: String::new(),
            return_type: None,
            params: Vec::new(),
            type_params: Vec::new(),
            flags: MemberFlags::PUBLIC,
            body: None,
        }
    }

    /// Set the method name
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the return type; methods without one return `void`
    #[must_use]
    pub fn returns(mut self, ty: impl Into<GenericType>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    /// Append a parameter
    #[must_use]
    pub fn parameter(mut self, ty: impl Into<GenericType>) -> Self {
        self.params.push(ty.into());
        self
    }

    /// Declare a method-scoped type parameter
    #[must_use]
    pub fn type_param(mut self, param: TypeParam) -> Self {
        self.type_params.push(param);
        self
    }

    /// Make the method private
    #[must_use]
    pub fn private(mut self) -> Self {
        self.flags.remove(MemberFlags::PUBLIC | MemberFlags::PROTECTED);
        self.flags.insert(MemberFlags::PRIVATE);
        self
    }

    /// Add modifiers
    #[must_use]
    pub fn with_flags(mut self, flags: MemberFlags) -> Self {
        self.flags.insert(flags);
        self
    }

    /// Mark the method as a compiler-generated bridge
    #[must_use]
    pub fn bridge(self) -> Self {
        self.with_flags(MemberFlags::BRIDGE | MemberFlags::SYNTHETIC)
    }

    /// Provide the implementation
    #[must_use]
    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(body));
        self
    }

    fn finish(self, declaring: TypeId, void: TypeId) -> MethodInfo {
        let flags = if self.body.is_none() {
            self.flags | MemberFlags::ABSTRACT
        } else {
            self.flags
        };

        MethodInfo {
            name: self.name,
            declaring,
            return_type: self.return_type.unwrap_or(GenericType::Class(void)),
            params: self.params,
            type_params: self.type_params,
            flags,
            body: self.body,
        }
    }
}

struct PendingField {
    name: String,
    field_type: GenericType,
    flags: MemberFlags,
    initial: Option<Value>,
}

/// Provides a fluent API for declaring a class or interface
pub struct ClassBuilder<'a> {
    registry: &'a TypeRegistry,
    id: TypeId,
    namespace: String,
    name: String,
    flavor: TypeFlavor,
    flags: TypeFlags,
    type_params: Vec<TypeParam>,
    superclass: Option<GenericType>,
    interfaces: Vec<GenericType>,
    methods: Vec<MethodBuilder>,
    fields: Vec<PendingField>,
    constructors: Vec<ConstructorInfo>,
}

impl<'a> ClassBuilder<'a> {
    pub(crate) fn new(
        registry: &'a TypeRegistry,
        id: TypeId,
        namespace: &str,
        name: &str,
        flavor: TypeFlavor,
    ) -> Self {
        ClassBuilder {
            registry,
            id,
            namespace: namespace.to_string(),
            name: name.to_string(),
            flavor,
            flags: TypeFlags::empty(),
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// The id reserved for the type being declared
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Add type-level modifiers
    #[must_use]
    pub fn flags(mut self, flags: TypeFlags) -> Self {
        self.flags.insert(flags);
        self
    }

    /// Declare a class-scoped type parameter
    #[must_use]
    pub fn type_param(mut self, param: TypeParam) -> Self {
        self.type_params.push(param);
        self
    }

    /// Set a non-generic superclass
    #[must_use]
    pub fn extends(self, parent: TypeId) -> Self {
        self.extends_generic(GenericType::Class(parent))
    }

    /// Set a (possibly parameterized) superclass
    #[must_use]
    pub fn extends_generic(mut self, parent: GenericType) -> Self {
        self.superclass = Some(parent);
        self
    }

    /// Implement (or, for interfaces, extend) a non-generic interface
    #[must_use]
    pub fn implements(self, interface: TypeId) -> Self {
        self.implements_generic(GenericType::Class(interface))
    }

    /// Implement (or, for interfaces, extend) a possibly parameterized interface
    #[must_use]
    pub fn implements_generic(mut self, interface: GenericType) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Declare a method
    #[must_use]
    pub fn method<F>(mut self, declare: F) -> Self
    where
        F: FnOnce(MethodBuilder) -> MethodBuilder,
    {
        self.methods.push(declare(MethodBuilder::new()));
        self
    }

    /// Declare a public, body-less zero-argument method returning `ty`
    #[must_use]
    pub fn getter(self, name: &str, ty: impl Into<GenericType>) -> Self {
        let ty = ty.into();
        self.method(|method| method.name(name).returns(ty))
    }

    /// Declare a public, body-less one-argument `void` method taking `ty`
    #[must_use]
    pub fn setter(self, name: &str, ty: impl Into<GenericType>) -> Self {
        let ty = ty.into();
        self.method(|method| method.name(name).parameter(ty))
    }

    /// Declare a private field with a `get`/`set` method pair backed by it
    ///
    /// Accessor names are chosen so that they map back to `name`: `userName`
    /// gets `getUserName`, while a name whose second character is upper case
    /// keeps its spelling (`aB` gets `getaB`, `URL` gets `getURL`). A name
    /// starting with one upper-case letter followed by a lower-case one
    /// (`Name`) has no such accessor; its methods expose the property `name`.
    #[must_use]
    pub fn property(self, name: &str, ty: impl Into<GenericType>) -> Self {
        let ty = ty.into();
        let declaring = self.id;
        let suffix = accessor_suffix(name);

        let read_name = name.to_string();
        let write_name = name.to_string();
        self.field_with(name, ty.clone(), MemberFlags::PRIVATE)
            .method(|method| {
                method
                    .name(&format!("get{}", suffix))
                    .returns(ty.clone())
                    .body(move |target, _| target.get(declaring, &read_name))
            })
            .method(|method| {
                method
                    .name(&format!("set{}", suffix))
                    .parameter(ty)
                    .body(move |target, args| {
                        let value = args.first().cloned().unwrap_or_default();
                        target.set(declaring, &write_name, value)?;
                        Ok(Value::Null)
                    })
            })
    }

    /// Declare a private instance field
    #[must_use]
    pub fn field(self, name: &str, ty: impl Into<GenericType>) -> Self {
        self.field_with(name, ty, MemberFlags::PRIVATE)
    }

    /// Declare a field with explicit modifiers
    #[must_use]
    pub fn field_with(mut self, name: &str, ty: impl Into<GenericType>, flags: MemberFlags) -> Self {
        self.fields.push(PendingField {
            name: name.to_string(),
            field_type: ty.into(),
            flags,
            initial: None,
        });
        self
    }

    /// Declare a `public static final` field holding `value`
    #[must_use]
    pub fn constant(mut self, name: &str, ty: impl Into<GenericType>, value: Value) -> Self {
        self.fields.push(PendingField {
            name: name.to_string(),
            field_type: ty.into(),
            flags: MemberFlags::PUBLIC | MemberFlags::STATIC | MemberFlags::FINAL,
            initial: Some(value),
        });
        self
    }

    /// Declare a public zero-argument constructor that only allocates
    #[must_use]
    pub fn default_constructor(mut self) -> Self {
        self.constructors.push(ConstructorInfo {
            declaring: self.id,
            params: Vec::new(),
            flags: MemberFlags::PUBLIC,
            body: None,
        });
        self
    }

    /// Declare a public constructor
    #[must_use]
    pub fn constructor(mut self, params: Vec<GenericType>, body: Option<ConstructorBody>) -> Self {
        self.constructors.push(ConstructorInfo {
            declaring: self.id,
            params,
            flags: MemberFlags::PUBLIC,
            body,
        });
        self
    }

    /// Publish the declaration to the registry
    ///
    /// # Errors
    /// Returns an error if the declaration was already published.
    pub fn build(self) -> Result<TypeId> {
        let registry = self.registry;
        let id = self.id;
        let void = registry.primitive(PrimitiveKind::Void);

        let superclass = match (self.superclass, self.flavor) {
            (Some(parent), _) => Some(parent),
            (None, TypeFlavor::Class) => Some(GenericType::Class(registry.object_type())),
            (None, _) => None,
        };

        let methods = self
            .methods
            .into_iter()
            .map(|method| Arc::new(method.finish(id, void)))
            .collect();

        let fields = self
            .fields
            .into_iter()
            .map(|pending| {
                let initial = pending
                    .initial
                    .unwrap_or_else(|| default_value(registry, &pending.field_type));
                Arc::new(FieldInfo::new(
                    pending.name,
                    id,
                    pending.field_type,
                    pending.flags,
                    initial,
                ))
            })
            .collect();

        let constructors = self.constructors.into_iter().map(Arc::new).collect();

        registry.publish(ClassDef {
            id,
            namespace: self.namespace,
            name: self.name,
            flavor: self.flavor,
            flags: self.flags,
            type_params: self.type_params,
            superclass,
            interfaces: self.interfaces,
            methods,
            fields,
            constructors,
        })
    }
}

fn default_value(registry: &TypeRegistry, ty: &GenericType) -> Value {
    match ty {
        GenericType::Class(id) => match registry.flavor(*id) {
            Ok(TypeFlavor::Primitive(kind)) => kind.default_value(),
            _ => Value::Null,
        },
        _ => Value::Null,
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The part after `get`/`set` that decapitalizes back to `name`
fn accessor_suffix(name: &str) -> String {
    match name.chars().nth(1) {
        Some(second) if second.is_uppercase() => name.to_string(),
        _ => capitalize(name),
    }
}
