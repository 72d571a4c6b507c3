use std::{any::Any, future::Future, pin::Pin};

use crate::{CommandSnapshot, Updater};

pub type CommandFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Manual-only side effect, dispatched explicitly via `StateCtx::dispatch`.
///
/// `run` is called on the UI thread with a snapshot taken at flush time; the
/// returned future runs in the background and reports through `updater`.
pub trait Command: Any + Send + Sync {
    fn run(&self, snap: CommandSnapshot, updater: Updater) -> CommandFuture;
}
