//! Leaf form fields: an editable value plus its last validation error.
//!
//! A [`FormField`] couples three things: the state a user edits, a
//! validation chain that turns that state into clean data, and the inverse
//! mapping used to refill the field from clean data. Validation stages are
//! composed up front with [`parse`](FormField::parse) and friends; running
//! the chain is what [`FieldActions::validate`] does.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{StateMachine, StateValue, Store};
use crate::form::error::{Never, RequiredError, SchemaError, ValidationError};
use crate::form::FormActions;

/// State of one leaf field: the edited value and the last validation error.
///
/// `error` is `None` until a validation fails, and is cleared again by any
/// edit or successful validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldState<I, E> {
    pub value: I,
    pub error: Option<E>,
}

impl<I, E> FieldState<I, E> {
    /// A pristine state holding `value` with no error.
    pub fn new(value: I) -> Self {
        Self { value, error: None }
    }
}

type ValidateFn<I, A, E> = Arc<dyn Fn(I) -> Result<A, E> + Send + Sync>;
type FromDataFn<A, I> = Arc<dyn Fn(&A) -> I + Send + Sync>;

/// A leaf field machine: edited value `I`, validated data `A`, error `E`.
///
/// Built from a constructor such as [`text`] or [`of`], then refined by
/// chaining validation stages. Each stage runs only if the previous
/// stages passed.
///
/// # Example
///
/// ```rust
/// use formwork::{form, runtime};
///
/// let name = runtime::run(form::trim_non_empty_text::<form::RequiredError>());
///
/// name.actions.set("  Ada  ".into());
/// assert_eq!(name.actions.validate().unwrap(), "Ada");
/// assert_eq!(name.state().error, None);
///
/// name.actions.set("   ".into());
/// assert!(name.actions.validate().is_err());
/// assert_eq!(name.state().error, Some(form::RequiredError));
/// ```
pub struct FormField<A, I, E> {
    initial: I,
    validate: ValidateFn<I, A, E>,
    from_data: FromDataFn<A, I>,
}

impl<A, I: Clone, E> Clone for FormField<A, I, E> {
    fn clone(&self) -> Self {
        Self {
            initial: self.initial.clone(),
            validate: Arc::clone(&self.validate),
            from_data: Arc::clone(&self.from_data),
        }
    }
}

impl<A, I, E> FormField<A, I, E>
where
    A: Send + Sync + 'static,
    I: StateValue,
    E: StateValue,
{
    /// Build a field from its initial value, validation chain, and the
    /// inverse mapping from clean data back to an edited value.
    pub fn new(
        initial: I,
        validate: impl Fn(I) -> Result<A, E> + Send + Sync + 'static,
        from_data: impl Fn(&A) -> I + Send + Sync + 'static,
    ) -> Self {
        Self {
            initial,
            validate: Arc::new(validate),
            from_data: Arc::new(from_data),
        }
    }

    /// Append a fallible stage: validated data `A` becomes `A2`, and the
    /// error type widens to `E2`.
    ///
    /// `from` is the inverse of `to`, used when refilling the field from
    /// clean data.
    pub fn parse<A2, E2>(
        self,
        to: impl Fn(A) -> Result<A2, E2> + Send + Sync + 'static,
        from: impl Fn(&A2) -> A + Send + Sync + 'static,
    ) -> FormField<A2, I, E2>
    where
        E: Into<E2>,
        A2: Send + Sync + 'static,
        E2: StateValue,
    {
        let validate = self.validate;
        let from_data = self.from_data;
        FormField {
            initial: self.initial,
            validate: Arc::new(move |input: I| match validate(input) {
                Ok(value) => to(value),
                Err(error) => Err(error.into()),
            }),
            from_data: Arc::new(move |data: &A2| from_data(&from(data))),
        }
    }

    /// Append an infallible rewrite of the validated data.
    pub fn map(self, rewrite: impl Fn(A) -> A + Send + Sync + 'static) -> FormField<A, I, E> {
        let validate = self.validate;
        FormField {
            initial: self.initial,
            validate: Arc::new(move |input: I| validate(input).map(|value| rewrite(value))),
            from_data: self.from_data,
        }
    }

    /// Append an infallible conversion of the validated data to `A2`.
    ///
    /// `from` is the inverse of `to`, used when refilling the field from
    /// clean data.
    pub fn transform<A2>(
        self,
        to: impl Fn(A) -> A2 + Send + Sync + 'static,
        from: impl Fn(&A2) -> A + Send + Sync + 'static,
    ) -> FormField<A2, I, E>
    where
        A2: Send + Sync + 'static,
    {
        let validate = self.validate;
        let from_data = self.from_data;
        FormField {
            initial: self.initial,
            validate: Arc::new(move |input: I| validate(input).map(|value| to(value))),
            from_data: Arc::new(move |data: &A2| from_data(&from(data))),
        }
    }

    /// Append a predicate stage; values failing it become `on_fail`'s error.
    pub fn filter(
        self,
        predicate: impl Fn(&A) -> bool + Send + Sync + 'static,
        on_fail: impl Fn(&A) -> E + Send + Sync + 'static,
    ) -> FormField<A, I, E> {
        let validate = self.validate;
        FormField {
            initial: self.initial,
            validate: Arc::new(move |input: I| {
                validate(input).and_then(|value| {
                    if predicate(&value) {
                        Ok(value)
                    } else {
                        Err(on_fail(&value))
                    }
                })
            }),
            from_data: self.from_data,
        }
    }

    /// Widen the error type to `E2` without adding a stage.
    pub fn with_error<E2>(self) -> FormField<A, I, E2>
    where
        E: Into<E2>,
        E2: StateValue,
    {
        let validate = self.validate;
        FormField {
            initial: self.initial,
            validate: Arc::new(move |input: I| validate(input).map_err(Into::into)),
            from_data: self.from_data,
        }
    }

    /// Append a serde round trip decoding the validated data into `A2`.
    ///
    /// Decode failures surface as [`SchemaError`] converted into `E`.
    ///
    /// # Panics
    ///
    /// Refilling the field from clean data re-encodes `A2` back into `A`
    /// and panics if that round trip fails; the two shapes must stay
    /// serde-compatible.
    pub fn schema<A2>(self) -> FormField<A2, I, E>
    where
        A: Serialize + serde::de::DeserializeOwned,
        A2: Serialize + serde::de::DeserializeOwned + Send + Sync + 'static,
        E: From<SchemaError>,
    {
        self.schema_with(E::from)
    }

    /// Like [`schema`](Self::schema), with decode failures mapped by
    /// `make_error` instead of a `From` impl.
    ///
    /// # Panics
    ///
    /// Same contract as [`schema`](Self::schema): refilling from clean
    /// data panics if `A2` no longer round-trips back into `A`.
    pub fn schema_with<A2>(
        self,
        make_error: impl Fn(SchemaError) -> E + Send + Sync + 'static,
    ) -> FormField<A2, I, E>
    where
        A: Serialize + serde::de::DeserializeOwned,
        A2: Serialize + serde::de::DeserializeOwned + Send + Sync + 'static,
    {
        self.parse(
            move |value: A| {
                serde_json::to_value(&value)
                    .and_then(serde_json::from_value::<A2>)
                    .map_err(|error| make_error(SchemaError::from(error)))
            },
            |data: &A2| {
                let encoded =
                    serde_json::to_value(data).expect("schema data should re-encode");
                serde_json::from_value(encoded)
                    .expect("schema data should decode back to its source shape")
            },
        )
    }
}

impl<T, I, E> FormField<Option<T>, I, E>
where
    T: Clone + Send + Sync + 'static,
    I: StateValue,
    E: StateValue,
{
    /// Require the optional data to be present, unwrapping it.
    ///
    /// A missing value fails with [`RequiredError`] converted into `E`.
    pub fn required(self) -> FormField<T, I, E>
    where
        E: From<RequiredError>,
    {
        self.parse(
            |value: Option<T>| value.ok_or_else(|| E::from(RequiredError)),
            |data: &T| Some(data.clone()),
        )
    }
}

impl<A, I, E> StateMachine for FormField<A, I, E>
where
    A: Send + Sync + 'static,
    I: StateValue,
    E: StateValue,
{
    type State = FieldState<I, E>;
    type Actions = FieldActions<A, I, E>;

    fn initial_state(&self) -> Self::State {
        FieldState::new(self.initial.clone())
    }

    fn actions(&self, store: Store<Self::State>) -> Self::Actions {
        FieldActions {
            store,
            validate: Arc::clone(&self.validate),
            from_data: Arc::clone(&self.from_data),
        }
    }
}

/// A field whose edited value is already its data: validation never fails.
pub fn of<A, E>(initial: A) -> FormField<A, A, E>
where
    A: StateValue,
    E: StateValue,
{
    FormField::new(initial, |value| Ok(value), |data: &A| data.clone())
}

/// A field holding an optional value, starting from `initial`.
///
/// Pairs with [`required`](FormField::required) when the data must be
/// present by validation time.
pub fn option_of<A, E>(initial: Option<A>) -> FormField<Option<A>, Option<A>, E>
where
    A: StateValue,
    E: StateValue,
{
    of(initial)
}

/// An empty text field accepting any content.
pub fn text<E: StateValue>() -> FormField<String, String, E> {
    of(String::new())
}

/// A text field whose data is trimmed of surrounding whitespace.
pub fn trim_text<E: StateValue>() -> FormField<String, String, E> {
    text().map(|value| value.trim().to_string())
}

/// A text field rejecting empty content.
pub fn non_empty_text<E>() -> FormField<String, String, E>
where
    E: StateValue + From<RequiredError>,
{
    text().filter(|value| !value.is_empty(), |_| E::from(RequiredError))
}

/// A trimmed text field rejecting content that trims to nothing.
pub fn trim_non_empty_text<E>() -> FormField<String, String, E>
where
    E: StateValue + From<RequiredError>,
{
    trim_text().filter(|value| !value.is_empty(), |_| E::from(RequiredError))
}

/// Lift a field so both its edited value and its data become optional.
///
/// A missing value validates to `None` without running the inner chain;
/// a present value runs the inner chain as usual. The lifted field starts
/// out empty.
pub fn optional<A, I, E>(inner: FormField<A, I, E>) -> FormField<Option<A>, Option<I>, E>
where
    A: Send + Sync + 'static,
    I: StateValue,
    E: StateValue,
{
    let validate = inner.validate;
    let from_data = inner.from_data;
    FormField::new(
        None,
        move |input: Option<I>| match input {
            Some(input) => validate(input).map(Some),
            None => Ok(None),
        },
        move |data: &Option<A>| data.as_ref().map(|data| from_data(data)),
    )
}

/// Action bundle for a [`FormField`].
///
/// Every mutation clears the stored error; only a failing
/// [`validate`](FieldActions::validate) writes one.
pub struct FieldActions<A, I, E> {
    store: Store<FieldState<I, E>>,
    validate: ValidateFn<I, A, E>,
    from_data: FromDataFn<A, I>,
}

impl<A, I, E> Clone for FieldActions<A, I, E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            validate: Arc::clone(&self.validate),
            from_data: Arc::clone(&self.from_data),
        }
    }
}

impl<A, I, E> FieldActions<A, I, E>
where
    A: Send + Sync + 'static,
    I: StateValue,
    E: StateValue,
{
    /// Replace the edited value and clear any error.
    pub fn set(&self, value: I) {
        self.store.update(move |_| FieldState::new(value))
    }

    /// Transform the edited value and clear any error.
    pub fn update(&self, transform: impl FnOnce(I) -> I + 'static) {
        self.store
            .update(move |state| FieldState::new(transform(state.value)))
    }

    /// Overwrite the stored error without touching the value.
    ///
    /// `None` clears it. Parent combinators use this to push cross-field
    /// errors down onto the field they belong to.
    pub fn set_error(&self, error: Option<E>) {
        self.store.update(move |state| FieldState {
            error,
            ..state
        })
    }

    /// Run the validation chain over the current value.
    ///
    /// The outcome is always written back: success clears the stored
    /// error, failure stores the new one. The same outcome is returned to
    /// the caller.
    pub fn validate(&self) -> Result<A, ValidationError<E>> {
        let value = self.store.get().value;
        match (self.validate)(value) {
            Ok(data) => {
                self.store.update(|state| FieldState {
                    error: None,
                    ..state
                });
                Ok(data)
            }
            Err(error) => {
                let stored = error.clone();
                self.store.update(move |state| FieldState {
                    error: Some(stored),
                    ..state
                });
                Err(ValidationError::new(error))
            }
        }
    }

    /// [`validate`](Self::validate), reified as a future.
    ///
    /// Lets callers treat leaf and combinator validations uniformly when
    /// composing them into async flows.
    pub async fn check(&self) -> Result<A, ValidationError<E>> {
        self.validate()
    }

    /// Refill the field from clean data, clearing any error.
    pub fn set_state_from_data(&self, data: &A) {
        let value = (self.from_data)(data);
        self.store.update(move |_| FieldState::new(value))
    }
}

impl<A, I, E> FormActions for FieldActions<A, I, E>
where
    A: Send + Sync + 'static,
    I: StateValue,
    E: StateValue,
{
    type Data = A;
    type Error = E;

    fn validate(&self) -> Result<A, ValidationError<E>> {
        FieldActions::validate(self)
    }

    fn set_state_from_data(&self, data: &A) {
        FieldActions::set_state_from_data(self, data)
    }
}

/// Action bundle over a union's tag field.
///
/// The tag is metadata about which variant is active; switching it never
/// touches variant states and never fails, so its error type is [`Never`].
pub struct TagActions<T> {
    store: Store<FieldState<T, Never>>,
}

impl<T> Clone for TagActions<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T: StateValue> TagActions<T> {
    /// Wrap a store scoped to the tag field.
    pub fn new(store: Store<FieldState<T, Never>>) -> Self {
        Self { store }
    }

    /// The active tag.
    pub fn get(&self) -> T {
        self.store.get().value
    }

    /// Switch the active tag.
    pub fn set(&self, tag: T) {
        self.store.update(move |_| FieldState::new(tag))
    }

    /// Yield the active tag; tags always validate.
    pub fn validate(&self) -> Result<T, ValidationError<Never>> {
        Ok(self.get())
    }

    /// [`validate`](Self::validate), reified as a future.
    pub async fn check(&self) -> Result<T, ValidationError<Never>> {
        self.validate()
    }
}
