// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # beanscope
//!
//! Bean property reflection over an explicit, thread-safe type system.
//!
//! `beanscope` discovers every bean-style getter (`getX` / `isX`), setter (`setX`) and
//! plain field of a type and reduces them to one deterministic property table: for
//! each property name a single read accessor and a single write accessor, together
//! with their resolved value types. It follows the method resolution rules of a
//! class-based type system: covariant return types, the `isX` / `getX` boolean dual,
//! accessors contributed by interfaces, shadowed fields, generic type arguments and
//! compiler-generated bridge methods.
//!
//! ## Features
//!
//! - **Deterministic conflict resolution** - Overloaded accessors resolve to a unique
//!   winner independent of discovery order, or construction fails with a typed error
//! - **Generic aware** - Accessor types are resolved through parameterized supertypes
//!   (`User extends Entity<Long>` reads `Long` from `K getId()`)
//! - **Invocable** - Every accessor is an [`reflection::Invoker`] that can be called on
//!   live objects, with virtual dispatch to the most derived implementation
//! - **Shared and cached** - Property tables are immutable, `Send + Sync`, and handed
//!   out by a single-flight concurrent cache
//! - **Path navigation** - [`reflection::MetaClass`] resolves `order.items[0].sku`
//!
//! ## Quick Start
//!
//! ```rust
//! use beanscope::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new());
//! let boolean = registry.primitive(PrimitiveKind::Boolean);
//! let user = registry
//!     .class("com.example", "User")
//!     .property("userName", registry.string_type())
//!     .property("active", boolean)
//!     .default_constructor()
//!     .build()?;
//!
//! let factory = DefaultReflectorFactory::new(registry.clone());
//! let reflector = factory.find_for_class(user)?;
//!
//! assert_eq!(reflector.readable_property_names(), ["active", "userName"]);
//! assert_eq!(reflector.getter_type("active")?, boolean);
//! assert_eq!(reflector.find_property_name("username"), Some("userName"));
//! # Ok::<(), beanscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`typesystem`] - The [`typesystem::TypeSystem`] introspection capability, the
//!   in-memory [`typesystem::TypeRegistry`] and generic type resolution
//! - [`runtime`] - Dynamic values and object instances accessors operate on
//! - [`reflection`] - Property tables, invokers, the reflector cache and path navigation
//! - [`settings`] - Validation of configuration keys against a settings type
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`]. Construction of a property table
//! either succeeds completely or fails with an [`Error`] naming the offending property
//! and class; no partial table is ever produced or cached.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (`debug` for table construction and cache
//! misses, `trace` for individual conflict resolutions). No subscriber is installed.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use beanscope::prelude::*;
/// use std::sync::Arc;
///
/// let registry = Arc::new(TypeRegistry::new());
/// let ty = registry.class("com.example", "Empty").default_constructor().build()?;
/// let types: TypeSystemRc = registry;
/// assert!(Reflector::new(&types, ty)?.has_default_constructor());
/// # Ok::<(), beanscope::Error>(())
/// ```
pub mod prelude;

pub mod reflection;
pub mod runtime;
pub mod settings;
pub mod typesystem;

/// `beanscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `beanscope` Error type
///
/// The main error type for all operations in this crate.
pub use error::{AccessorKind, Error};

/// The property table of one type; see [`reflection::Reflector`].
pub use reflection::Reflector;
