//! Form machines: leaf fields and the combinators that compose them.
//!
//! Leaves are [`FormField`]s holding an edited value plus its last
//! validation error. Combinators compose leaves (and other combinators)
//! into larger forms:
//!
//! - [`form_struct!`](crate::form_struct) keys fields by name
//! - [`form_union!`](crate::form_union) keeps one variant active by tag
//! - [`list`] holds a growable sequence of one item machine
//!
//! Every level exposes the same contract, [`FormActions`]: validate into
//! clean data, or refill state from clean data. Validation is collect-all
//! at every branching level: each branch settles and writes its own error
//! state before the branches are folded into one outcome.

mod error;
mod field;
mod list;
mod macros;

pub use error::{Never, RequiredError, SchemaError, ValidationError};
pub use field::{
    non_empty_text, of, option_of, optional, text, trim_non_empty_text, trim_text,
    FieldActions, FieldState, FormField, TagActions,
};
pub use list::{list, List, ListActions};

use std::fmt::Debug;

/// Contract shared by every form bundle, leaf or combinator.
///
/// `Data` is the clean value produced by a successful validation; `Error`
/// is the aggregate error shape for this level. The two operations are
/// inverses in spirit: `validate` distills state into data, and
/// `set_state_from_data` rebuilds state from data.
///
/// Combinators compose through this trait, so any machine whose bundle
/// implements it can sit inside a struct, union, or list, including
/// hand-rolled bundles layered on with
/// [`map_actions`](crate::map_actions).
pub trait FormActions {
    /// Clean data produced by a successful validation.
    type Data;

    /// Aggregate error shape for this level.
    type Error: Debug;

    /// Run validation, writing each branch's error state and returning
    /// the folded outcome.
    fn validate(&self) -> Result<Self::Data, ValidationError<Self::Error>>;

    /// Rebuild this level's state from clean data, clearing errors.
    fn set_state_from_data(&self, data: &Self::Data);
}
