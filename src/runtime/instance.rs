use std::{collections::HashMap, sync::RwLock};

use crate::{runtime::Value, typesystem::TypeId, Error, Result};

/// Storage key of an instance field: the declaring class plus the field name.
///
/// Keying by declaring class keeps a subclass field and the superclass field it
/// shadows in separate slots.
pub type SlotKey = (TypeId, String);

/// A live object of some registered type.
///
/// Field storage is interior-mutable so that shared `Arc<Instance>` handles can be
/// passed to setters from any thread.
#[derive(Debug)]
pub struct Instance {
    ty: TypeId,
    slots: RwLock<HashMap<SlotKey, Value>>,
}

impl Instance {
    /// Create an instance without any field slots
    #[must_use]
    pub fn new(ty: TypeId) -> Self {
        Instance {
            ty,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Create an instance with pre-populated field slots
    #[must_use]
    pub fn with_slots(ty: TypeId, slots: HashMap<SlotKey, Value>) -> Self {
        Instance {
            ty,
            slots: RwLock::new(slots),
        }
    }

    /// The runtime type of this object
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    /// Read the slot of field `name` declared by `declaring`
    ///
    /// # Errors
    /// Returns [`Error::Invocation`] if this object has no such slot, or
    /// [`Error::LockError`] if the slot storage is poisoned.
    pub fn get(&self, declaring: TypeId, name: &str) -> Result<Value> {
        let slots = read_lock!(self.slots);
        slots
            .get(&(declaring, name.to_string()))
            .cloned()
            .ok_or_else(|| {
                Error::Invocation(format!(
                    "Object of type {} has no field '{}' declared by {}",
                    self.ty, name, declaring
                ))
            })
    }

    /// Write the slot of field `name` declared by `declaring`
    ///
    /// # Errors
    /// Returns [`Error::Invocation`] if this object has no such slot, or
    /// [`Error::LockError`] if the slot storage is poisoned.
    pub fn set(&self, declaring: TypeId, name: &str, value: Value) -> Result<()> {
        let mut slots = write_lock!(self.slots);
        match slots.get_mut(&(declaring, name.to_string())) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::Invocation(format!(
                "Object of type {} has no field '{}' declared by {}",
                self.ty, name, declaring
            ))),
        }
    }

    /// Number of field slots
    ///
    /// # Errors
    /// Returns [`Error::LockError`] if the slot storage is poisoned.
    pub fn slot_count(&self) -> Result<usize> {
        Ok(read_lock!(self.slots).len())
    }
}
