use std::any::{Any, type_name};

use log::warn;

/// Clones a value into a type-erased box so it can travel with a command snapshot.
pub trait SnapshotClone {
    fn clone_boxed(&self) -> Box<dyn Any + Send + Sync>;
}

impl<T> SnapshotClone for T
where
    T: Any + Clone + Send + Sync,
{
    fn clone_boxed(&self) -> Box<dyn Any + Send + Sync> {
        Box::new(self.clone())
    }
}

/// Plain input state owned by the UI thread.
///
/// States are edited directly through `StateCtx::update` / `StateCtx::state_mut`,
/// or replaced from async commands through an `Updater`.
pub trait State: Any + Send + SnapshotClone {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Replaces `target` with the boxed value when the types line up.
pub fn state_assign_impl<T: State>(target: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(value) => *target = *value,
        Err(_) => warn!("state_assign_impl: type mismatch for {}", type_name::<T>()),
    }
}
