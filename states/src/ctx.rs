use std::{
    any::{Any, TypeId, type_name},
    collections::BTreeMap,
};

use flume::{Receiver, Sender};
use log::{debug, error, warn};

use crate::{
    Command, CommandFuture, CommandSnapshot, Compute, Dep, Error, State, StateSyncStatus, Updater,
    updater::Update,
};

pub(crate) enum Slot {
    State(Box<dyn State>),
    Compute(Box<dyn Compute>),
}

impl Slot {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        match self {
            Self::State(state) => state.as_any_mut(),
            Self::Compute(compute) => compute.as_any_mut(),
        }
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        match self {
            Self::State(state) => state.assign_box(new_self),
            Self::Compute(compute) => compute.assign_box(new_self),
        }
    }
}

/// Owner of every state, compute and command of the app.
///
/// The UI thread reads and edits states directly; commands run in the
/// background and report through `Updater`, whose queue is drained by
/// `sync_computes()`.
pub struct StateCtx {
    storage: BTreeMap<TypeId, Slot>,
    status: BTreeMap<TypeId, StateSyncStatus>,
    commands: BTreeMap<TypeId, Box<dyn Command>>,
    queue: Vec<TypeId>,

    send: Sender<Update>,
    recv: Receiver<Update>,

    #[cfg(not(target_arch = "wasm32"))]
    tasks: tokio::task::JoinSet<()>,
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();

        Self {
            storage: BTreeMap::new(),
            status: BTreeMap::new(),
            commands: BTreeMap::new(),
            queue: Vec::new(),
            send,
            recv,
            #[cfg(not(target_arch = "wasm32"))]
            tasks: tokio::task::JoinSet::new(),
        }
    }

    pub fn add_state<T: State>(&mut self, state: T) {
        let id = TypeId::of::<T>();
        self.storage.insert(id, Slot::State(Box::new(state)));
        self.mark_dependents_dirty(id);
    }

    pub fn record_compute<T: Compute>(&mut self, compute: T) {
        let id = TypeId::of::<T>();
        self.storage.insert(id, Slot::Compute(Box::new(compute)));
        self.status.insert(id, StateSyncStatus::BeforeInit);
    }

    pub fn record_command<T: Command>(&mut self, command: T) {
        self.commands.insert(TypeId::of::<T>(), Box::new(command));
    }

    pub fn try_state<T: State>(&self) -> Result<&T, Error> {
        match self.storage.get(&TypeId::of::<T>()) {
            Some(Slot::State(state)) => state
                .as_any()
                .downcast_ref::<T>()
                .ok_or_else(|| Error::state_not_found(type_name::<T>(), "StateCtx::try_state")),
            _ => Err(Error::state_not_found(
                type_name::<T>(),
                "StateCtx::try_state",
            )),
        }
    }

    /// # Panics
    /// Panics if `T` was never registered with `add_state`.
    pub fn state<T: State>(&self) -> &T {
        match self.try_state::<T>() {
            Ok(state) => state,
            Err(err) => panic!("StateCtx::state: {err}"),
        }
    }

    /// Mutable access to a state. Computes depending on `T` are marked dirty.
    ///
    /// # Panics
    /// Panics if `T` was never registered with `add_state`.
    pub fn state_mut<T: State>(&mut self) -> &mut T {
        let id = TypeId::of::<T>();
        self.mark_dependents_dirty(id);
        match self.storage.get_mut(&id) {
            Some(Slot::State(state)) => match state.as_any_mut().downcast_mut::<T>() {
                Some(state) => state,
                None => panic!("StateCtx::state_mut: type mismatch for {}", type_name::<T>()),
            },
            _ => panic!("StateCtx::state_mut: {} is not registered", type_name::<T>()),
        }
    }

    pub fn update<T: State>(&mut self, f: impl FnOnce(&mut T)) {
        f(self.state_mut::<T>());
    }

    pub fn cached<T: Compute>(&self) -> Option<&T> {
        match self.storage.get(&TypeId::of::<T>()) {
            Some(Slot::Compute(compute)) => compute.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn try_cached<T: Compute>(&self) -> Result<&T, Error> {
        self.cached::<T>()
            .ok_or_else(|| Error::compute_not_found(type_name::<T>(), "StateCtx::try_cached"))
    }

    pub fn updater(&self) -> Updater {
        Updater::new(self.send.clone())
    }

    /// Applies every update published through `Updater` since the last sync.
    pub fn sync_computes(&mut self) {
        let updates: Vec<Update> = self.recv.try_iter().collect();

        for update in updates {
            let id = match update {
                Update::Replace(id, value) => {
                    let Some(slot) = self.storage.get_mut(&id) else {
                        warn!("sync_computes: dropping update for unregistered {id:?}");
                        continue;
                    };
                    slot.assign_box(value);
                    id
                }
                Update::Mutate(id, mutate) => {
                    let Some(slot) = self.storage.get_mut(&id) else {
                        warn!("sync_computes: dropping mutation for unregistered {id:?}");
                        continue;
                    };
                    mutate(slot.as_any_mut());
                    id
                }
            };
            self.mark_dependents_dirty(id);
        }
    }

    /// Runs every derived compute whose dependencies changed.
    ///
    /// Results are published through `Updater`, so call `sync_computes()` afterwards
    /// (the app does this at the start of the next frame).
    pub fn run_computed(&mut self) {
        let dirty: Vec<TypeId> = self
            .status
            .iter()
            .filter(|(_, status)| status.needs_compute())
            .map(|(id, _)| *id)
            .collect();

        let updater = self.updater();
        for id in dirty {
            if let Some(Slot::Compute(compute)) = self.storage.get(&id) {
                compute.compute(Dep::new(&self.storage), updater.clone());
            }
            self.status.insert(id, StateSyncStatus::Clean);
        }
    }

    pub fn compute_status<T: Compute>(&self) -> Option<StateSyncStatus> {
        self.status.get(&TypeId::of::<T>()).copied()
    }

    pub fn enqueue_command<T: Command>(&mut self) {
        let id = TypeId::of::<T>();
        if !self.commands.contains_key(&id) {
            error!("enqueue_command: {} is not registered", type_name::<T>());
            return;
        }
        self.queue.push(id);
    }

    /// Snapshots the context once per queued command and spawns it.
    ///
    /// Pending updates are synced before every snapshot, so a command sees
    /// whatever an earlier command's `run()` published synchronously.
    pub fn flush_commands(&mut self) {
        let queued = std::mem::take(&mut self.queue);

        for id in queued {
            self.sync_computes();
            let future = match self.commands.get(&id) {
                Some(command) => command.run(self.snapshot(), self.updater()),
                None => continue,
            };
            self.spawn(future);
        }
    }

    pub fn dispatch<T: Command>(&mut self) {
        debug!("dispatch: {}", type_name::<T>());
        self.enqueue_command::<T>();
        self.flush_commands();
    }

    pub fn snapshot(&self) -> CommandSnapshot {
        let mut snap = CommandSnapshot::new();
        for (id, slot) in &self.storage {
            match slot {
                Slot::State(state) => snap.insert_state(*id, state.clone_boxed()),
                Slot::Compute(compute) => snap.insert_compute(*id, compute.clone_boxed()),
            }
        }
        snap
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn spawn(&mut self, future: CommandFuture) {
        self.tasks.spawn(future);
    }

    #[cfg(target_arch = "wasm32")]
    fn spawn(&mut self, future: CommandFuture) {
        wasm_bindgen_futures::spawn_local(future);
    }

    /// Number of command tasks still tracked. Always zero on wasm, where
    /// tasks are handed to the browser's executor.
    pub fn task_count(&self) -> usize {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.tasks.len()
        }

        #[cfg(target_arch = "wasm32")]
        {
            0
        }
    }

    /// Reaps finished command tasks without blocking.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn reap_tasks(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(err) = result {
                error!("command task failed: {err}");
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn reap_tasks(&mut self) {}

    /// Waits for every spawned command, syncing after each one finishes.
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn await_tasks(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(err) = result {
                error!("command task failed: {err}");
            }
            self.sync_computes();
        }
        self.sync_computes();
    }

    fn mark_dependents_dirty(&mut self, changed: TypeId) {
        let dependents: Vec<TypeId> = self
            .storage
            .iter()
            .filter_map(|(id, slot)| match slot {
                Slot::Compute(compute) if compute.deps().contains(&changed) => Some(*id),
                _ => None,
            })
            .collect();

        for id in dependents {
            let status = self.status.entry(id).or_default();
            if *status == StateSyncStatus::Clean {
                *status = StateSyncStatus::Dirty;
            }
        }
    }
}
