//! Runtime object model for invoking reflected accessors.
//!
//! Reflection would be of limited use if the discovered getters and setters could
//! not be called. This module provides the minimal dynamic object model the
//! invokers operate on:
//!
//! - [`Value`]: a dynamically typed value (primitives, strings, objects, arrays)
//! - [`Instance`]: a live object with one slot per instance field of its class
//!   hierarchy, keyed by declaring class so shadowed fields stay distinct
//!
//! Instances are normally created through
//! [`crate::typesystem::TypeSystem::allocate`] or a reflector's default
//! constructor rather than by hand.

mod instance;
mod value;

pub use instance::{Instance, SlotKey};
pub use value::{ObjectRc, Value};
