use std::{
    any::{TypeId, type_name},
    collections::BTreeMap,
};

use crate::{Compute, Error, State, ctx::Slot};

/// Read-only view over the context handed to `Compute::compute`.
pub struct Dep<'a> {
    storage: &'a BTreeMap<TypeId, Slot>,
}

impl<'a> Dep<'a> {
    pub(crate) fn new(storage: &'a BTreeMap<TypeId, Slot>) -> Self {
        Self { storage }
    }

    pub fn state<T: State>(&self) -> Result<&'a T, Error> {
        match self.storage.get(&TypeId::of::<T>()) {
            Some(Slot::State(state)) => state
                .as_any()
                .downcast_ref::<T>()
                .ok_or_else(|| Error::state_not_found(type_name::<T>(), "Dep::state")),
            _ => Err(Error::state_not_found(type_name::<T>(), "Dep::state")),
        }
    }

    pub fn compute<T: Compute>(&self) -> Result<&'a T, Error> {
        match self.storage.get(&TypeId::of::<T>()) {
            Some(Slot::Compute(compute)) => compute
                .as_any()
                .downcast_ref::<T>()
                .ok_or_else(|| Error::compute_not_found(type_name::<T>(), "Dep::compute")),
            _ => Err(Error::compute_not_found(type_name::<T>(), "Dep::compute")),
        }
    }
}
