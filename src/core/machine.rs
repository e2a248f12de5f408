//! The state machine contract: initial state, an action bundle factory,
//! and optional lifecycle hooks.
//!
//! Machines are passive descriptions. Nothing runs until
//! [`runtime::run`](crate::runtime::run) allocates a cell and asks the
//! machine for its actions.

use std::fmt::Debug;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::core::store::Store;

/// Marker for values a machine may hold as state.
///
/// Blanket-implemented for every type with the required traits, so it never
/// needs to be implemented by hand.
///
/// # Required Traits
///
/// - `Clone`: state is handed to subscribers and read out by value
/// - `PartialEq`: tests and callers compare observed states
/// - `Debug`: states must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: states must be serializable for persistence
/// - `Send` + `Sync` + `'static`: state crosses task boundaries in hooks
pub trait StateValue:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
}

impl<T> StateValue for T where
    T: Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
}

/// A composable unit of state plus the operations that may change it.
///
/// A machine supplies its initial state and builds its action bundle over a
/// [`Store`] scoped to that state. Because actions only ever see a store,
/// the same machine can run standalone or embedded inside a parent machine
/// that zooms a lens onto its slice of a larger state.
///
/// # Example
///
/// ```rust
/// use formwork::{runtime, StateMachine, Store};
///
/// struct Counter;
///
/// struct CounterActions {
///     store: Store<i64>,
/// }
///
/// impl CounterActions {
///     fn increment(&self) {
///         self.store.update(|n| n + 1);
///     }
/// }
///
/// impl StateMachine for Counter {
///     type State = i64;
///     type Actions = CounterActions;
///
///     fn initial_state(&self) -> i64 {
///         0
///     }
///
///     fn actions(&self, store: Store<i64>) -> CounterActions {
///         CounterActions { store }
///     }
/// }
///
/// let counter = runtime::run(Counter);
/// counter.actions.increment();
/// counter.actions.increment();
/// assert_eq!(counter.state(), 2);
/// ```
pub trait StateMachine: Send + Sync + 'static {
    /// The state this machine owns.
    type State: StateValue;

    /// The bundle of operations exposed to callers.
    type Actions;

    /// The state the runtime seeds the cell with.
    fn initial_state(&self) -> Self::State;

    /// Build the action bundle over a store scoped to this machine's state.
    fn actions(&self, store: Store<Self::State>) -> Self::Actions;

    /// Optional background task launched once when the machine starts.
    ///
    /// The runtime spawns the returned future and keeps its join handle
    /// without awaiting it. Returning `None` (the default) starts nothing.
    fn start(&self, store: &Store<Self::State>) -> Option<BoxFuture<'static, ()>> {
        let _ = store;
        None
    }

    /// Optional reaction to a committed update.
    ///
    /// Called with each newly committed state; any returned future is
    /// spawned fire-and-forget, after subscribers have been notified.
    fn on_update(&self, state: &Self::State) -> Option<BoxFuture<'static, ()>> {
        let _ = state;
        None
    }
}

type MapFn<M, A> = Arc<
    dyn Fn(<M as StateMachine>::Actions, &Store<<M as StateMachine>::State>) -> A + Send + Sync,
>;

/// A machine with the same state as `M` but a rewrapped action bundle.
///
/// Built with [`map_actions`].
pub struct MapActions<M: StateMachine, A> {
    inner: M,
    map: MapFn<M, A>,
}

/// Rewrap a machine's action bundle, keeping its state and hooks.
///
/// The mapping closure receives the inner bundle plus the scoped store, and
/// returns the replacement bundle. The usual shape keeps every original
/// entry reachable by holding the inner bundle in a field and implementing
/// `Deref` to it, then adds or overrides entries on the wrapper.
///
/// # Example
///
/// ```rust
/// use std::ops::Deref;
///
/// use formwork::{machines, map_actions, runtime};
///
/// struct CartActions {
///     inner: machines::ValueActions<Vec<String>>,
/// }
///
/// impl CartActions {
///     fn add(&self, item: &str) {
///         let item = item.to_string();
///         self.inner.update(move |mut items| {
///             items.push(item);
///             items
///         });
///     }
/// }
///
/// impl Deref for CartActions {
///     type Target = machines::ValueActions<Vec<String>>;
///
///     fn deref(&self) -> &Self::Target {
///         &self.inner
///     }
/// }
///
/// let cart = map_actions(machines::value(Vec::new()), |inner, _| CartActions { inner });
/// let cart = runtime::run(cart);
///
/// cart.actions.add("apples");
/// assert_eq!(cart.actions.get(), vec!["apples".to_string()]);
///
/// // Original entries stay reachable through Deref.
/// cart.actions.set(Vec::new());
/// assert!(cart.actions.get().is_empty());
/// ```
pub fn map_actions<M, A>(
    machine: M,
    map: impl Fn(M::Actions, &Store<M::State>) -> A + Send + Sync + 'static,
) -> MapActions<M, A>
where
    M: StateMachine,
    A: 'static,
{
    MapActions {
        inner: machine,
        map: Arc::new(map),
    }
}

impl<M, A> StateMachine for MapActions<M, A>
where
    M: StateMachine,
    A: 'static,
{
    type State = M::State;
    type Actions = A;

    fn initial_state(&self) -> Self::State {
        self.inner.initial_state()
    }

    fn actions(&self, store: Store<Self::State>) -> Self::Actions {
        let inner = self.inner.actions(store.clone());
        (self.map)(inner, &store)
    }

    fn start(&self, store: &Store<Self::State>) -> Option<BoxFuture<'static, ()>> {
        self.inner.start(store)
    }

    fn on_update(&self, state: &Self::State) -> Option<BoxFuture<'static, ()>> {
        self.inner.on_update(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::Deref;
    use std::sync::Mutex;

    struct Toggle;

    #[derive(Clone)]
    struct ToggleActions {
        store: Store<bool>,
    }

    impl ToggleActions {
        fn flip(&self) {
            self.store.update(|on| !on);
        }
    }

    impl StateMachine for Toggle {
        type State = bool;
        type Actions = ToggleActions;

        fn initial_state(&self) -> bool {
            false
        }

        fn actions(&self, store: Store<bool>) -> ToggleActions {
            ToggleActions { store }
        }
    }

    fn plain_store(initial: bool) -> Store<bool> {
        let cell = Arc::new(Mutex::new(initial));
        let get_cell = Arc::clone(&cell);
        Store::new(
            move || *get_cell.lock().unwrap(),
            move |transform| {
                let mut guard = cell.lock().unwrap();
                let previous = *guard;
                *guard = transform(previous);
            },
        )
    }

    struct Wrapped {
        inner: ToggleActions,
        label: &'static str,
    }

    impl Deref for Wrapped {
        type Target = ToggleActions;

        fn deref(&self) -> &Self::Target {
            &self.inner
        }
    }

    #[test]
    fn map_actions_keeps_initial_state() {
        let machine = map_actions(Toggle, |inner, _| Wrapped {
            inner,
            label: "toggle",
        });
        assert!(!machine.initial_state());
    }

    #[test]
    fn map_actions_builds_wrapped_bundle() {
        let machine = map_actions(Toggle, |inner, _| Wrapped {
            inner,
            label: "toggle",
        });
        let store = plain_store(machine.initial_state());
        let actions = machine.actions(store.clone());

        assert_eq!(actions.label, "toggle");
        actions.flip();
        assert!(store.get());
    }

    #[test]
    fn map_actions_receives_scoped_store() {
        let machine = map_actions(Toggle, |_, store| store.clone());
        let store = plain_store(true);
        let captured = machine.actions(store);
        assert!(captured.get());
    }
}
