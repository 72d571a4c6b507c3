use std::any::{Any, TypeId, type_name};

use flume::Sender;
use log::warn;

type Mutation = Box<dyn FnOnce(&mut dyn Any) + Send>;

pub(crate) enum Update {
    Replace(TypeId, Box<dyn Any + Send>),
    Mutate(TypeId, Mutation),
}

/// Send-safe handle for publishing results back to the UI thread.
///
/// Updates are queued and applied by `StateCtx::sync_computes()`.
#[derive(Clone)]
pub struct Updater {
    send: Sender<Update>,
}

impl Updater {
    pub(crate) fn new(send: Sender<Update>) -> Self {
        Self { send }
    }

    /// Replaces the stored state or compute of type `T`.
    pub fn set<T: Any + Send>(&self, value: T) {
        let update = Update::Replace(TypeId::of::<T>(), Box::new(value));
        if self.send.send(update).is_err() {
            warn!("Updater::set: context dropped before {}", type_name::<T>());
        }
    }

    /// Edits the stored state or compute of type `T` in place once synced.
    ///
    /// Use this instead of `set` when the UI may have changed other fields of
    /// `T` while the command was in flight.
    pub fn update<T: Any + Send>(&self, f: impl FnOnce(&mut T) + Send + 'static) {
        let mutation: Mutation = Box::new(move |any| match any.downcast_mut::<T>() {
            Some(target) => f(target),
            None => warn!("Updater::update: type mismatch for {}", type_name::<T>()),
        });
        if self
            .send
            .send(Update::Mutate(TypeId::of::<T>(), mutation))
            .is_err()
        {
            warn!("Updater::update: context dropped before {}", type_name::<T>());
        }
    }
}
