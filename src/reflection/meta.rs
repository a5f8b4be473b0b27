//! Property path navigation across reflectors.
//!
//! A [`MetaClass`] answers questions about dotted property paths such as
//! `order.customer.name` by walking from one property table to the next through the
//! getter types. Tables are obtained from a [`ReflectorFactory`], so repeated
//! navigation through the same types reuses cached tables.
//!
//! # Examples
//!
//! ```rust
//! use beanscope::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new());
//! let address = registry
//!     .class("com.example", "Address")
//!     .property("city", registry.string_type())
//!     .build()?;
//! let person = registry
//!     .class("com.example", "Person")
//!     .property("homeAddress", address)
//!     .build()?;
//!
//! let factory: ReflectorFactoryRc = Arc::new(DefaultReflectorFactory::new(registry.clone()));
//! let meta = MetaClass::for_class(person, &factory)?;
//!
//! assert!(meta.has_getter("homeAddress.city")?);
//! assert_eq!(meta.getter_type("homeAddress.city")?, registry.string_type());
//! assert_eq!(
//!     meta.find_property("HOME_ADDRESS.CITY", true)?.as_deref(),
//!     Some("homeAddress.city")
//! );
//! # Ok::<(), beanscope::Error>(())
//! ```

use std::sync::Arc;

use crate::{
    reflection::{InvokerRc, PropertyTokenizer, Reflector, ReflectorFactoryRc},
    typesystem::{GenericType, TypeId},
    Result,
};

/// Path-aware view of one type's property table
pub struct MetaClass {
    factory: ReflectorFactoryRc,
    reflector: Arc<Reflector>,
}

impl MetaClass {
    /// Create the meta class of `ty`
    ///
    /// # Errors
    /// Returns the construction error of the type's reflector.
    pub fn for_class(ty: TypeId, factory: &ReflectorFactoryRc) -> Result<Self> {
        Ok(MetaClass {
            reflector: factory.find_for_class(ty)?,
            factory: factory.clone(),
        })
    }

    /// The property table this meta class wraps
    #[must_use]
    pub fn reflector(&self) -> &Arc<Reflector> {
        &self.reflector
    }

    /// The meta class of the getter type of `name`
    ///
    /// # Errors
    /// Returns [`crate::Error::PropertyNotFound`] if `name` is not readable.
    pub fn meta_class_for_property(&self, name: &str) -> Result<MetaClass> {
        let ty = self.reflector.getter_type(name)?;
        MetaClass::for_class(ty, &self.factory)
    }

    /// Resolve a path case-insensitively to its canonical spelling
    ///
    /// With `use_camel_case_mapping`, underscores are removed first so that column
    /// style names such as `user_name` find `userName`. Resolution stops at the
    /// first unknown segment; `None` is returned if the first segment is unknown.
    ///
    /// # Errors
    /// Returns an error if a reflector on the path fails to build.
    pub fn find_property(
        &self,
        name: &str,
        use_camel_case_mapping: bool,
    ) -> Result<Option<String>> {
        let name = if use_camel_case_mapping {
            name.replace('_', "")
        } else {
            name.to_string()
        };

        let mut builder = String::new();
        self.build_property(&name, &mut builder)?;
        Ok(if builder.is_empty() {
            None
        } else {
            Some(builder)
        })
    }

    fn build_property(&self, name: &str, builder: &mut String) -> Result<()> {
        let prop = PropertyTokenizer::new(name);
        match prop.children() {
            Some(children) => {
                if let Some(property) = self.reflector.find_property_name(prop.name()) {
                    builder.push_str(property);
                    builder.push('.');
                    self.meta_class_for_property(property)?
                        .build_property(children, builder)?;
                }
            }
            None => {
                if let Some(property) = self.reflector.find_property_name(name) {
                    builder.push_str(property);
                }
            }
        }
        Ok(())
    }

    /// Names of all readable properties of this type
    #[must_use]
    pub fn getter_names(&self) -> &[String] {
        self.reflector.readable_property_names()
    }

    /// Names of all writable properties of this type
    #[must_use]
    pub fn setter_names(&self) -> &[String] {
        self.reflector.writable_property_names()
    }

    /// The type written at the end of `name`
    ///
    /// # Errors
    /// Returns [`crate::Error::PropertyNotFound`] if a segment is missing.
    pub fn setter_type(&self, name: &str) -> Result<TypeId> {
        let prop = PropertyTokenizer::new(name);
        match prop.children() {
            Some(children) => self
                .meta_class_for_property(prop.name())?
                .setter_type(children),
            None => self.reflector.setter_type(prop.name()),
        }
    }

    /// The type read at the end of `name`
    ///
    /// An indexed segment (`items[0]`) on a getter declared as any parameterized
    /// type with exactly one type argument yields that argument. This covers
    /// collections (`List<Item>`) but also single-argument holders such as
    /// `Optional<Item>`. On an array it yields the component type. Any other
    /// indexed getter yields its own type.
    ///
    /// # Errors
    /// Returns [`crate::Error::PropertyNotFound`] if a segment is missing.
    pub fn getter_type(&self, name: &str) -> Result<TypeId> {
        let prop = PropertyTokenizer::new(name);
        match prop.children() {
            Some(children) => self.meta_class_for_token(&prop)?.getter_type(children),
            None => self.token_getter_type(&prop),
        }
    }

    fn meta_class_for_token(&self, prop: &PropertyTokenizer<'_>) -> Result<MetaClass> {
        MetaClass::for_class(self.token_getter_type(prop)?, &self.factory)
    }

    fn token_getter_type(&self, prop: &PropertyTokenizer<'_>) -> Result<TypeId> {
        let ty = self.reflector.getter_type(prop.name())?;
        if prop.index().is_none() {
            return Ok(ty);
        }

        match self.reflector.generic_getter_type(prop.name())? {
            GenericType::Parameterized { args, .. } if args.len() == 1 => Ok(match &args[0] {
                GenericType::Class(element) | GenericType::Parameterized { raw: element, .. } => {
                    *element
                }
                _ => ty,
            }),
            GenericType::Array(component) => Ok(match component.as_ref() {
                GenericType::Class(element) | GenericType::Parameterized { raw: element, .. } => {
                    *element
                }
                _ => ty,
            }),
            _ => Ok(ty),
        }
    }

    /// Returns `true` if every segment of `name` is readable up to the last,
    /// which must be writable
    ///
    /// # Errors
    /// Returns an error if a reflector on the path fails to build, or an
    /// intermediate segment is writable but not readable.
    pub fn has_setter(&self, name: &str) -> Result<bool> {
        let prop = PropertyTokenizer::new(name);
        match prop.children() {
            Some(children) => {
                if self.reflector.has_setter(prop.name()) {
                    self.meta_class_for_property(prop.name())?
                        .has_setter(children)
                } else {
                    Ok(false)
                }
            }
            None => Ok(self.reflector.has_setter(prop.name())),
        }
    }

    /// Returns `true` if every segment of `name` is readable
    ///
    /// # Errors
    /// Returns an error if a reflector on the path fails to build.
    pub fn has_getter(&self, name: &str) -> Result<bool> {
        let prop = PropertyTokenizer::new(name);
        match prop.children() {
            Some(children) => {
                if self.reflector.has_getter(prop.name()) {
                    self.meta_class_for_token(&prop)?.has_getter(children)
                } else {
                    Ok(false)
                }
            }
            None => Ok(self.reflector.has_getter(prop.name())),
        }
    }

    /// The read accessor of a property of this type (no path navigation)
    ///
    /// # Errors
    /// Returns [`crate::Error::PropertyNotFound`] if `name` is not readable.
    pub fn get_invoker(&self, name: &str) -> Result<InvokerRc> {
        self.reflector.get_invoker(name)
    }

    /// The write accessor of a property of this type (no path navigation)
    ///
    /// # Errors
    /// Returns [`crate::Error::PropertyNotFound`] if `name` is not writable.
    pub fn set_invoker(&self, name: &str) -> Result<InvokerRc> {
        self.reflector.set_invoker(name)
    }

    /// Returns `true` if the type declares a zero-argument constructor
    #[must_use]
    pub fn has_default_constructor(&self) -> bool {
        self.reflector.has_default_constructor()
    }
}
