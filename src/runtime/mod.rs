//! The imperative shell: runs a machine over a shared state cell.
//!
//! [`run`] allocates one mutable cell seeded with the machine's initial
//! state, wires the root [`Store`] to it, builds the action bundle, and
//! launches the machine's lifecycle hooks. Every update commits to the cell
//! under a lock, then notifies subscribers synchronously, then hands the new
//! state to the machine's `on_update` hook as a spawned task.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::task::JoinHandle;

use crate::core::{StateMachine, Store};

type SubscriberFn<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Lock a mutex, recovering the guard if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Subscribers<S> {
    entries: Vec<(u64, SubscriberFn<S>)>,
    next_id: u64,
}

impl<S> Subscribers<S> {
    fn insert(&mut self, task: SubscriberFn<S>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, task));
        id
    }

    fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry, _)| *entry != id);
    }

    fn snapshot(&self) -> Vec<SubscriberFn<S>> {
        self.entries.iter().map(|(_, task)| Arc::clone(task)).collect()
    }
}

/// Handle for one registered subscriber.
///
/// Dropping the handle does not unregister the subscriber; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription<S> {
    id: u64,
    registry: Weak<Mutex<Subscribers<S>>>,
}

impl<S> Subscription<S> {
    /// Remove this subscriber from the instance it was registered on.
    ///
    /// Idempotent once the instance is gone; unsubscribing twice is
    /// impossible since the handle is consumed.
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).remove(self.id);
        }
    }
}

/// A running machine: its cell, its action bundle, and its lifecycle tasks.
pub struct Instance<M: StateMachine> {
    cell: Arc<Mutex<M::State>>,
    subscribers: Arc<Mutex<Subscribers<M::State>>>,
    store: Store<M::State>,
    /// The machine's action bundle, built over the root store.
    pub actions: M::Actions,
    /// Join handle for the machine's `start` task, if it launched one.
    ///
    /// Held without being awaited; dropping the instance detaches the task
    /// rather than cancelling it.
    pub start_task: Option<JoinHandle<()>>,
}

impl<M: StateMachine> Instance<M> {
    /// Read the current state.
    pub fn state(&self) -> M::State {
        lock(&self.cell).clone()
    }

    /// A clone of the root store over this instance's state.
    pub fn store(&self) -> Store<M::State> {
        self.store.clone()
    }

    /// Register a subscriber called synchronously after every commit.
    ///
    /// Subscribers run in registration order. A subscriber registered while
    /// a notification round is in flight is not called for that round; it
    /// sees the next commit.
    pub fn subscribe(
        &self,
        task: impl Fn(&M::State) + Send + Sync + 'static,
    ) -> Subscription<M::State> {
        let id = lock(&self.subscribers).insert(Arc::new(task));
        Subscription {
            id,
            registry: Arc::downgrade(&self.subscribers),
        }
    }
}

/// Run a machine: seed its cell, build its actions, launch its hooks.
///
/// Updates flowing through the returned instance's store hold the cell lock
/// only while the pure transform runs. Notification happens after the lock
/// is released, so subscribers and `on_update` may themselves invoke
/// actions without deadlocking.
///
/// Machines whose hooks return futures must be run inside a Tokio runtime;
/// machines without hooks work anywhere.
///
/// # Example
///
/// ```rust
/// use formwork::{machines, runtime};
///
/// let counter = runtime::run(machines::value(0u32));
/// counter.actions.update(|n| n + 1);
/// assert_eq!(counter.actions.get(), 1);
/// ```
pub fn run<M: StateMachine>(machine: M) -> Instance<M> {
    let machine = Arc::new(machine);
    let cell = Arc::new(Mutex::new(machine.initial_state()));
    let subscribers: Arc<Mutex<Subscribers<M::State>>> = Arc::new(Mutex::new(Subscribers {
        entries: Vec::new(),
        next_id: 0,
    }));

    let store = {
        let get_cell = Arc::clone(&cell);
        let update_cell = Arc::clone(&cell);
        let update_subscribers = Arc::clone(&subscribers);
        let hook = Arc::clone(&machine);

        Store::new(
            move || lock(&get_cell).clone(),
            move |transform| {
                let next = {
                    let mut guard = lock(&update_cell);
                    let previous = guard.clone();
                    let next = transform(previous);
                    *guard = next.clone();
                    next
                };

                // Notify a snapshot of the current subscribers, in
                // registration order, with the lock released.
                let round = lock(&update_subscribers).snapshot();
                for task in round {
                    task(&next);
                }

                if let Some(reaction) = hook.on_update(&next) {
                    tokio::spawn(reaction);
                }
            },
        )
    };

    let actions = machine.actions(store.clone());
    let start_task = machine.start(&store).map(tokio::spawn);

    Instance {
        cell,
        subscribers,
        store,
        actions,
        start_task,
    }
}
