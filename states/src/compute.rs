use std::any::{Any, TypeId, type_name};

use log::warn;

use crate::{Dep, SnapshotClone, Updater};

/// State types a compute reads. A change to any of them marks the compute dirty.
pub type ComputeDeps = Vec<TypeId>;

/// Cached value owned by the context.
///
/// Two flavors exist:
/// - derived computes, whose `compute()` reads `deps()` and publishes a new value via `Updater`
/// - command caches, whose `deps()` is empty and `compute()` is a no-op; commands update them
pub trait Compute: Any + Send + SnapshotClone {
    fn deps(&self) -> ComputeDeps;

    fn compute(&self, deps: Dep<'_>, updater: Updater);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

pub fn assign_impl<T: Compute>(target: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(value) => *target = *value,
        Err(_) => warn!("assign_impl: type mismatch for {}", type_name::<T>()),
    }
}
