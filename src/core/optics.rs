//! Lenses for focusing a store on part of its state.
//!
//! A lens pairs a pure reader with a pure writer for one part of a larger
//! state value. Stores use lenses to hand out scoped views whose updates
//! write back through the parent.

use std::sync::Arc;

type ReadFn<S, A> = Arc<dyn Fn(&S) -> A + Send + Sync>;
type WriteFn<S, A> = Arc<dyn Fn(S, A) -> S + Send + Sync>;
type ReadOptFn<S, A> = Arc<dyn Fn(&S) -> Option<A> + Send + Sync>;

/// A total lens from a whole state `S` onto a part `A`.
///
/// Both halves must be pure: `read` extracts the part without side effects,
/// and `write` returns a new whole with the part replaced and every sibling
/// untouched.
///
/// # Example
///
/// ```rust
/// use formwork::Lens;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Profile {
///     name: String,
///     age: u32,
/// }
///
/// let name = Lens::new(
///     |profile: &Profile| profile.name.clone(),
///     |mut profile: Profile, name| {
///         profile.name = name;
///         profile
///     },
/// );
///
/// let profile = Profile { name: "Ada".into(), age: 36 };
/// assert_eq!(name.read(&profile), "Ada");
///
/// let renamed = name.write(profile, "Grace".into());
/// assert_eq!(renamed.name, "Grace");
/// assert_eq!(renamed.age, 36);
/// ```
pub struct Lens<S, A> {
    read: ReadFn<S, A>,
    write: WriteFn<S, A>,
}

impl<S, A> Clone for Lens<S, A> {
    fn clone(&self) -> Self {
        Self {
            read: Arc::clone(&self.read),
            write: Arc::clone(&self.write),
        }
    }
}

impl<S: 'static, A: 'static> Lens<S, A> {
    /// Build a lens from a reader and a writer.
    pub fn new(
        read: impl Fn(&S) -> A + Send + Sync + 'static,
        write: impl Fn(S, A) -> S + Send + Sync + 'static,
    ) -> Self {
        Self {
            read: Arc::new(read),
            write: Arc::new(write),
        }
    }

    /// Extract the focused part from a whole state.
    pub fn read(&self, whole: &S) -> A {
        (self.read)(whole)
    }

    /// Replace the focused part, returning the new whole state.
    pub fn write(&self, whole: S, part: A) -> S {
        (self.write)(whole, part)
    }

    /// Compose with a lens that focuses deeper inside the part.
    ///
    /// Composition is associative: focusing `a.b` then `c` reads and writes
    /// the same state as focusing `a` then `b.c`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formwork::lens;
    ///
    /// #[derive(Clone, Debug, PartialEq)]
    /// struct Inner {
    ///     count: u32,
    /// }
    ///
    /// #[derive(Clone, Debug, PartialEq)]
    /// struct Outer {
    ///     inner: Inner,
    /// }
    ///
    /// let count = lens!(Outer, inner).compose(lens!(Inner, count));
    /// let outer = Outer { inner: Inner { count: 1 } };
    /// assert_eq!(count.read(&outer), 1);
    /// assert_eq!(count.write(outer, 7).inner.count, 7);
    /// ```
    pub fn compose<B: 'static>(self, inner: Lens<A, B>) -> Lens<S, B> {
        let read_outer = Arc::clone(&self.read);
        let read_inner = inner.clone();
        Lens {
            read: Arc::new(move |whole: &S| read_inner.read(&read_outer(whole))),
            write: Arc::new(move |whole: S, part: B| {
                let focused = self.read(&whole);
                let focused = inner.write(focused, part);
                self.write(whole, focused)
            }),
        }
    }
}

impl<S: Clone + 'static> Lens<S, S> {
    /// The identity lens: focuses the whole state.
    pub fn identity() -> Self {
        Lens::new(|whole: &S| whole.clone(), |_, part| part)
    }
}

/// A partial lens from a whole state `S` onto a part `A` that may be absent.
///
/// `read` yields `None` when the focus is missing (an empty `Option`, an
/// inactive enum variant). `write` is only applied after `read` produced a
/// value, so it may assume the focus is present.
pub struct OptionalLens<S, A> {
    read: ReadOptFn<S, A>,
    write: WriteFn<S, A>,
}

impl<S, A> Clone for OptionalLens<S, A> {
    fn clone(&self) -> Self {
        Self {
            read: Arc::clone(&self.read),
            write: Arc::clone(&self.write),
        }
    }
}

impl<S: 'static, A: 'static> OptionalLens<S, A> {
    /// Build a partial lens from a reader and a writer.
    pub fn new(
        read: impl Fn(&S) -> Option<A> + Send + Sync + 'static,
        write: impl Fn(S, A) -> S + Send + Sync + 'static,
    ) -> Self {
        Self {
            read: Arc::new(read),
            write: Arc::new(write),
        }
    }

    /// Extract the focused part, if present.
    pub fn read(&self, whole: &S) -> Option<A> {
        (self.read)(whole)
    }

    /// Replace the focused part, returning the new whole state.
    pub fn write(&self, whole: S, part: A) -> S {
        (self.write)(whole, part)
    }
}

impl<T: Clone + 'static> OptionalLens<Option<T>, T> {
    /// Focus the payload of an `Option` state.
    ///
    /// Reading an empty state yields `None`; writing always stores `Some`.
    pub fn some() -> Self {
        OptionalLens::new(|whole: &Option<T>| whole.clone(), |_, part| Some(part))
    }
}

/// Build a [`Lens`] onto a named field of a struct.
///
/// The struct must be `Clone`; the writer moves the whole value, replaces
/// the one field, and leaves every sibling untouched.
///
/// # Example
///
/// ```rust
/// use formwork::lens;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Settings {
///     volume: u8,
///     muted: bool,
/// }
///
/// let volume = lens!(Settings, volume);
/// let settings = Settings { volume: 3, muted: false };
/// assert_eq!(volume.read(&settings), 3);
/// assert_eq!(volume.write(settings, 9).volume, 9);
/// ```
#[macro_export]
macro_rules! lens {
    ($ty:ty, $field:ident) => {
        $crate::Lens::new(
            |whole: &$ty| whole.$field.clone(),
            |mut whole: $ty, part| {
                whole.$field = part;
                whole
            },
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Address {
        city: String,
        zip: String,
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Person {
        name: String,
        address: Address,
    }

    fn sample() -> Person {
        Person {
            name: "Ada".into(),
            address: Address {
                city: "London".into(),
                zip: "N1".into(),
            },
        }
    }

    #[test]
    fn read_extracts_focused_part() {
        let name = lens!(Person, name);
        assert_eq!(name.read(&sample()), "Ada");
    }

    #[test]
    fn write_replaces_part_and_keeps_siblings() {
        let name = lens!(Person, name);
        let updated = name.write(sample(), "Grace".into());
        assert_eq!(updated.name, "Grace");
        assert_eq!(updated.address, sample().address);
    }

    #[test]
    fn compose_reads_through_both_lenses() {
        let city = lens!(Person, address).compose(lens!(Address, city));
        assert_eq!(city.read(&sample()), "London");
    }

    #[test]
    fn compose_writes_through_both_lenses() {
        let city = lens!(Person, address).compose(lens!(Address, city));
        let updated = city.write(sample(), "Paris".into());
        assert_eq!(updated.address.city, "Paris");
        assert_eq!(updated.address.zip, "N1");
        assert_eq!(updated.name, "Ada");
    }

    #[test]
    fn identity_lens_round_trips() {
        let id = Lens::<Person, Person>::identity();
        assert_eq!(id.read(&sample()), sample());

        let replacement = Person {
            name: "Grace".into(),
            address: sample().address,
        };
        assert_eq!(id.write(sample(), replacement.clone()), replacement);
    }

    #[test]
    fn optional_some_reads_present_payload() {
        let lens = OptionalLens::<Option<u32>, u32>::some();
        assert_eq!(lens.read(&Some(5)), Some(5));
        assert_eq!(lens.read(&None), None);
    }

    #[test]
    fn optional_some_write_stores_payload() {
        let lens = OptionalLens::<Option<u32>, u32>::some();
        assert_eq!(lens.write(Some(1), 2), Some(2));
    }
}
