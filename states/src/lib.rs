//! State context shared by the business and UI crates.
//!
//! - [`State`]: plain data edited on the UI thread
//! - [`Compute`]: cached values, either derived from states or written by commands
//! - [`Command`]: explicit side effects that run in the background and report via [`Updater`]

mod basic_state;
mod command;
mod compute;
mod ctx;
mod dep;
mod error;
mod snapshot;
mod state;
mod state_sync_status;
mod updater;

pub use basic_state::Time;
pub use command::{Command, CommandFuture};
pub use compute::{Compute, ComputeDeps, assign_impl};
pub use ctx::StateCtx;
pub use dep::Dep;
pub use error::Error;
pub use snapshot::CommandSnapshot;
pub use state::{SnapshotClone, State, state_assign_impl};
pub use state_sync_status::StateSyncStatus;
pub use updater::Updater;
