//! Bean property reflection.
//!
//! This module turns the raw member lists of a [`crate::typesystem::TypeSystem`] into
//! property tables: for every property name a single read accessor and a single write
//! accessor with their value types.
//!
//! # Key Components
//!
//! - [`Reflector`]: The immutable property table of one type
//! - [`ReflectorFactory`] / [`DefaultReflectorFactory`]: Cached, single-flight access
//!   to property tables
//! - [`MetaClass`]: Navigation of dotted and indexed property paths
//! - [`Invoker`]: Uniform handle to call a getter, setter or field accessor
//! - [`namer`]: Bean naming conventions (`getUserName` → `userName`)
//! - [`ReflectorConfig`]: Caching and hierarchy depth options
//!
//! # Thread Safety
//!
//! Property tables are built once and never modified, so they are `Send + Sync` and
//! shared through `Arc`. The factory cache is a concurrent map; concurrent first
//! lookups of the same type wait for a single construction.

mod config;
mod factory;
mod invoker;
mod meta;
pub mod namer;
mod reflector;
mod tokenizer;

pub use config::ReflectorConfig;
pub use factory::{DefaultReflectorFactory, ReflectorFactory, ReflectorFactoryRc};
pub use invoker::{GetFieldInvoker, Invoker, InvokerRc, MethodInvoker, SetFieldInvoker};
pub use meta::MetaClass;
pub use reflector::{DefaultConstructor, Reflector};
pub use tokenizer::PropertyTokenizer;
