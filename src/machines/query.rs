//! Machines for tracking the lifecycle of an async request.
//!
//! [`QueryState`] records where a request currently stands: never sent,
//! in flight with progress, finished with data, or failed. [`query`] exposes
//! the raw transitions; [`tracked`] additionally owns the async effect and
//! drives the transitions around each submission.

use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::core::{StateMachine, StateValue, Store};

/// Lifecycle of one tracked request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum QueryState<A, E, P = ()> {
    /// No request sent yet.
    Idle,
    /// Request in flight since `started_at`.
    Loading { started_at: DateTime<Utc>, progress: P },
    /// Request finished with `data`; `invalidated` marks the data stale.
    Success {
        finished_at: DateTime<Utc>,
        data: A,
        invalidated: bool,
    },
    /// Request failed with `error`.
    Failure { finished_at: DateTime<Utc>, error: E },
}

impl<A, E, P> QueryState<A, E, P> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// The data of a successful request, stale or not.
    pub fn data(&self) -> Option<&A> {
        match self {
            Self::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    /// The error of a failed request.
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Failure { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Whether a success has been invalidated since it finished.
    pub fn is_invalidated(&self) -> bool {
        matches!(
            self,
            Self::Success {
                invalidated: true,
                ..
            }
        )
    }
}

/// Machine exposing the raw [`QueryState`] transitions.
pub struct Query<A, E, P = ()> {
    _marker: PhantomData<fn() -> (A, E, P)>,
}

/// Build a [`Query`] machine starting at [`QueryState::Idle`].
pub fn query<A, E, P>() -> Query<A, E, P>
where
    A: StateValue,
    E: StateValue,
    P: StateValue,
{
    Query {
        _marker: PhantomData,
    }
}

/// Action bundle for [`Query`]; also reachable through
/// [`TrackedQueryActions`] via `Deref`.
pub struct QueryActions<A, E, P> {
    store: Store<QueryState<A, E, P>>,
}

impl<A, E, P> Clone for QueryActions<A, E, P> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<A, E, P> QueryActions<A, E, P>
where
    A: StateValue,
    E: StateValue,
    P: StateValue,
{
    /// Read the current lifecycle state.
    pub fn get(&self) -> QueryState<A, E, P> {
        self.store.get()
    }

    /// Mark a request as in flight, stamping the start time.
    pub fn begin(&self, progress: P) {
        let started_at = Utc::now();
        self.store.update(move |_| QueryState::Loading {
            started_at,
            progress,
        })
    }

    /// Replace the progress of an in-flight request; no-op otherwise.
    pub fn set_progress(&self, progress: P) {
        self.store.update(move |state| match state {
            QueryState::Loading { started_at, .. } => QueryState::Loading {
                started_at,
                progress,
            },
            other => other,
        })
    }

    /// Mark the request as finished with `data`.
    pub fn succeed(&self, data: A) {
        let finished_at = Utc::now();
        self.store.update(move |_| QueryState::Success {
            finished_at,
            data,
            invalidated: false,
        })
    }

    /// Mark the request as failed with `error`.
    pub fn fail(&self, error: E) {
        let finished_at = Utc::now();
        self.store
            .update(move |_| QueryState::Failure { finished_at, error })
    }

    /// Flag a success as stale; no-op in any other state.
    pub fn invalidate(&self) {
        self.store.update(|state| match state {
            QueryState::Success {
                finished_at, data, ..
            } => QueryState::Success {
                finished_at,
                data,
                invalidated: true,
            },
            other => other,
        })
    }
}

impl<A, E, P> StateMachine for Query<A, E, P>
where
    A: StateValue,
    E: StateValue,
    P: StateValue,
{
    type State = QueryState<A, E, P>;
    type Actions = QueryActions<A, E, P>;

    fn initial_state(&self) -> Self::State {
        QueryState::Idle
    }

    fn actions(&self, store: Store<Self::State>) -> Self::Actions {
        QueryActions { store }
    }
}

type EffectFn<In, A, E> = Arc<dyn Fn(In) -> BoxFuture<'static, Result<A, E>> + Send + Sync>;

/// A [`Query`] that owns the async effect producing its data.
///
/// Built with [`tracked`]; submissions drive the state through
/// `Loading` and into `Success` or `Failure`.
pub struct TrackedQuery<In, A, E, P = ()> {
    effect: EffectFn<In, A, E>,
    initial_progress: P,
    start_input: Option<In>,
}

/// Build a [`TrackedQuery`] around an async effect.
///
/// # Example
///
/// ```rust
/// use formwork::{machines, runtime};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let doubler = runtime::run(machines::tracked(|n: u32| async move {
///     Ok::<u32, String>(n * 2)
/// }));
///
/// let result = doubler.actions.submit(21).await;
/// assert_eq!(result, Ok(42));
/// assert_eq!(doubler.state().data(), Some(&42));
/// # }
/// ```
pub fn tracked<In, A, E, Fut>(
    effect: impl Fn(In) -> Fut + Send + Sync + 'static,
) -> TrackedQuery<In, A, E, ()>
where
    In: Clone + Send + Sync + 'static,
    A: StateValue,
    E: StateValue,
    Fut: std::future::Future<Output = Result<A, E>> + Send + 'static,
{
    TrackedQuery {
        effect: Arc::new(move |input| Box::pin(effect(input))),
        initial_progress: (),
        start_input: None,
    }
}

impl<In, A, E> TrackedQuery<In, A, E, ()> {
    /// Track progress of type `P`, seeding each submission with `initial`.
    pub fn with_progress<P>(self, initial: P) -> TrackedQuery<In, A, E, P> {
        TrackedQuery {
            effect: self.effect,
            initial_progress: initial,
            start_input: self.start_input,
        }
    }
}

impl<In, A, E, P> TrackedQuery<In, A, E, P> {
    /// Submit `input` once, as the machine's `start` task.
    pub fn run_on_start(mut self, input: In) -> Self {
        self.start_input = Some(input);
        self
    }
}

/// Action bundle for [`TrackedQuery`].
///
/// Dereferences to [`QueryActions`], so the raw transitions stay available
/// alongside [`submit`](TrackedQueryActions::submit).
pub struct TrackedQueryActions<In, A, E, P> {
    query: QueryActions<A, E, P>,
    effect: EffectFn<In, A, E>,
    initial_progress: P,
}

impl<In, A, E, P: Clone> Clone for TrackedQueryActions<In, A, E, P> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            effect: Arc::clone(&self.effect),
            initial_progress: self.initial_progress.clone(),
        }
    }
}

impl<In, A, E, P> Deref for TrackedQueryActions<In, A, E, P> {
    type Target = QueryActions<A, E, P>;

    fn deref(&self) -> &Self::Target {
        &self.query
    }
}

impl<In, A, E, P> TrackedQueryActions<In, A, E, P>
where
    In: Clone + Send + Sync + 'static,
    A: StateValue,
    E: StateValue,
    P: StateValue,
{
    /// Run the effect once, tracking it through the query state.
    ///
    /// Marks the query loading before the effect starts, then commits the
    /// outcome, and returns it to the caller as well.
    pub async fn submit(&self, input: In) -> Result<A, E> {
        self.query.begin(self.initial_progress.clone());
        match (self.effect)(input).await {
            Ok(data) => {
                self.query.succeed(data.clone());
                Ok(data)
            }
            Err(error) => {
                self.query.fail(error.clone());
                Err(error)
            }
        }
    }
}

impl<In, A, E, P> StateMachine for TrackedQuery<In, A, E, P>
where
    In: Clone + Send + Sync + 'static,
    A: StateValue,
    E: StateValue,
    P: StateValue,
{
    type State = QueryState<A, E, P>;
    type Actions = TrackedQueryActions<In, A, E, P>;

    fn initial_state(&self) -> Self::State {
        QueryState::Idle
    }

    fn actions(&self, store: Store<Self::State>) -> Self::Actions {
        TrackedQueryActions {
            query: QueryActions { store },
            effect: Arc::clone(&self.effect),
            initial_progress: self.initial_progress.clone(),
        }
    }

    fn start(&self, store: &Store<Self::State>) -> Option<BoxFuture<'static, ()>> {
        let input = self.start_input.clone()?;
        let actions = self.actions(store.clone());
        Some(Box::pin(async move {
            let _ = actions.submit(input).await;
        }))
    }
}
