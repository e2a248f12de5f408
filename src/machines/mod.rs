//! General-purpose machines: plain values and tracked async queries.
//!
//! Form-specific machines live in [`crate::form`]; the machines here are
//! the non-form building blocks most applications start from.

mod query;
mod value;

pub use query::{query, tracked, Query, QueryActions, QueryState, TrackedQuery, TrackedQueryActions};
pub use value::{value, Value, ValueActions};
