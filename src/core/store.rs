//! Scoped store handles over a single shared state cell.
//!
//! A [`Store`] never owns state. It is a pair of capabilities, read the
//! current value and apply a pure transform, wired either to the runtime's
//! root cell or, through a lens, to part of a parent store. Child updates
//! write back through the parent, so one child update commits exactly one
//! parent update.

use std::sync::Arc;

use crate::core::optics::{Lens, OptionalLens};

/// Boxed pure transform carried through a store's update path.
pub type StateTransform<S> = Box<dyn FnOnce(S) -> S>;

type GetFn<S> = Arc<dyn Fn() -> S + Send + Sync>;
type GetOptFn<S> = Arc<dyn Fn() -> Option<S> + Send + Sync>;
type UpdateFn<S> = Arc<dyn Fn(StateTransform<S>) + Send + Sync>;

/// A read/update handle scoped to a state value `S`.
///
/// Cloning a store clones the handle, not the state: every clone reads and
/// writes the same underlying cell.
///
/// # Example
///
/// ```rust
/// use formwork::{lens, machines, runtime};
///
/// let counter = runtime::run(machines::value(0u32));
/// let store = counter.store();
///
/// store.update(|n| n + 1);
/// assert_eq!(store.get(), 1);
/// ```
pub struct Store<S> {
    get: GetFn<S>,
    update: UpdateFn<S>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            update: Arc::clone(&self.update),
        }
    }
}

impl<S: 'static> Store<S> {
    /// Build a store from raw read and update capabilities.
    ///
    /// The runtime uses this to wire the root store to its state cell;
    /// scoped stores are derived with [`Store::zoom`] instead.
    pub fn new(
        get: impl Fn() -> S + Send + Sync + 'static,
        update: impl Fn(StateTransform<S>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            get: Arc::new(get),
            update: Arc::new(update),
        }
    }

    /// Read the current state.
    pub fn get(&self) -> S {
        (self.get)()
    }

    /// Apply a pure transform to the current state.
    ///
    /// The transform must be pure: no side effects and no re-entrant store
    /// calls, since the root cell lock is held while it runs. Subscribers
    /// observe the committed value after the transform returns.
    pub fn update(&self, transform: impl FnOnce(S) -> S + 'static) {
        (self.update)(Box::new(transform))
    }

    /// Derive a store scoped to the part focused by `lens`.
    ///
    /// Reads go through the lens reader; each scoped update becomes exactly
    /// one parent update that reads the part, transforms it, and writes it
    /// back into the whole. Zoom composes: zooming twice is the same store
    /// as zooming once with the composed lens.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formwork::{lens, machines, runtime};
    ///
    /// #[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    /// struct Draft {
    ///     title: String,
    ///     body: String,
    /// }
    ///
    /// let draft = runtime::run(machines::value(Draft {
    ///     title: String::new(),
    ///     body: String::new(),
    /// }));
    ///
    /// let title = draft.store().zoom(lens!(Draft, title));
    /// title.update(|_| "hello".to_string());
    ///
    /// assert_eq!(draft.state().title, "hello");
    /// assert_eq!(draft.state().body, "");
    /// ```
    pub fn zoom<A: 'static>(&self, lens: Lens<S, A>) -> Store<A> {
        let parent_get = Arc::clone(&self.get);
        let parent_update = Arc::clone(&self.update);
        let read_lens = lens.clone();
        Store {
            get: Arc::new(move || read_lens.read(&parent_get())),
            update: Arc::new(move |transform: StateTransform<A>| {
                let lens = lens.clone();
                parent_update(Box::new(move |whole: S| {
                    let part = transform(lens.read(&whole));
                    lens.write(whole, part)
                }))
            }),
        }
    }

    /// Derive a store scoped to a part that may be absent.
    ///
    /// When the focus is missing, reads yield `None` and updates leave the
    /// whole state unchanged. The parent update still commits in that case,
    /// so subscribers are notified with an identical state.
    pub fn zoom_optional<A: 'static>(&self, lens: OptionalLens<S, A>) -> PartialStore<A> {
        let parent_get = Arc::clone(&self.get);
        let parent_update = Arc::clone(&self.update);
        let read_lens = lens.clone();
        PartialStore {
            get: Arc::new(move || read_lens.read(&parent_get())),
            update: Arc::new(move |transform: StateTransform<A>| {
                let lens = lens.clone();
                parent_update(Box::new(move |whole: S| match lens.read(&whole) {
                    Some(part) => {
                        let part = transform(part);
                        lens.write(whole, part)
                    }
                    None => whole,
                }))
            }),
        }
    }
}

/// A store over a focus that may be absent.
///
/// Produced by [`Store::zoom_optional`]. Reads yield `Option<S>`; updates
/// are dropped while the focus is missing.
pub struct PartialStore<S> {
    get: GetOptFn<S>,
    update: UpdateFn<S>,
}

impl<S> Clone for PartialStore<S> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            update: Arc::clone(&self.update),
        }
    }
}

impl<S: 'static> PartialStore<S> {
    /// Read the focused part, if present.
    pub fn get(&self) -> Option<S> {
        (self.get)()
    }

    /// Apply a pure transform to the focused part, if present.
    pub fn update(&self, transform: impl FnOnce(S) -> S + 'static) {
        (self.update)(Box::new(transform))
    }
}
