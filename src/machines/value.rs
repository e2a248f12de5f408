//! The smallest machine: a plain mutable value.

use crate::core::{StateMachine, StateValue, Store};

/// Machine holding a single value with `get`/`set`/`update` actions.
///
/// Useful standalone for simple app state, and as the innermost building
/// block when composing larger machines with
/// [`map_actions`](crate::map_actions).
pub struct Value<A> {
    initial: A,
}

/// Build a [`Value`] machine seeded with `initial`.
///
/// # Example
///
/// ```rust
/// use formwork::{machines, runtime};
///
/// let counter = runtime::run(machines::value(0u32));
/// counter.actions.update(|n| n + 1);
/// counter.actions.update(|n| n + 1);
/// assert_eq!(counter.actions.get(), 2);
/// ```
pub fn value<A: StateValue>(initial: A) -> Value<A> {
    Value { initial }
}

/// Action bundle for a [`Value`] machine.
pub struct ValueActions<A> {
    store: Store<A>,
}

impl<A> Clone for ValueActions<A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<A: StateValue> ValueActions<A> {
    /// Read the current value.
    pub fn get(&self) -> A {
        self.store.get()
    }

    /// Replace the value.
    pub fn set(&self, value: A) {
        self.store.update(move |_| value)
    }

    /// Apply a pure transform to the value.
    pub fn update(&self, transform: impl FnOnce(A) -> A + 'static) {
        self.store.update(transform)
    }
}

impl<A: StateValue> StateMachine for Value<A> {
    type State = A;
    type Actions = ValueActions<A>;

    fn initial_state(&self) -> A {
        self.initial.clone()
    }

    fn actions(&self, store: Store<A>) -> ValueActions<A> {
        ValueActions { store }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime;

    #[test]
    fn seeds_with_initial_value() {
        let instance = runtime::run(value("seed".to_string()));
        assert_eq!(instance.actions.get(), "seed");
    }

    #[test]
    fn set_replaces_the_value() {
        let instance = runtime::run(value(1u8));
        instance.actions.set(9);
        assert_eq!(instance.actions.get(), 9);
    }

    #[test]
    fn update_transforms_the_value() {
        let instance = runtime::run(value(vec![1u32]));
        instance.actions.update(|mut items| {
            items.push(2);
            items
        });
        assert_eq!(instance.actions.get(), vec![1, 2]);
    }
}
