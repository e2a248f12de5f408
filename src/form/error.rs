//! Error types shared across form machines.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failed validation, carrying the shaped error for the failing branch.
///
/// For a leaf field the payload is the field's own error type; for a
/// combinator it is the combinator's aggregate shape, with one slot per
/// branch. The same error state has already been written into the form at
/// the point this value is returned.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("validation failed: {error:?}")]
pub struct ValidationError<E: fmt::Debug> {
    error: E,
}

impl<E: fmt::Debug> ValidationError<E> {
    /// Wrap a shaped error.
    pub fn new(error: E) -> Self {
        Self { error }
    }

    /// The shaped error, by reference.
    pub fn error(&self) -> &E {
        &self.error
    }

    /// The shaped error, by value.
    pub fn into_error(self) -> E {
        self.error
    }
}

/// Error type for fields that cannot fail validation.
///
/// Uninhabited, so a `FieldState<_, Never>` can never hold an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Never {}

impl fmt::Display for Never {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl std::error::Error for Never {}

/// Raised by [`required`](crate::form::FormField::required) when an
/// optional field holds no value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("a value is required")]
pub struct RequiredError;

/// Raised when decoding a validated value into another serde shape fails.
///
/// Carries the decoder's message as text so it can live inside state,
/// which must stay cloneable and serializable.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("schema decode failed: {message}")]
pub struct SchemaError {
    pub message: String,
}

impl From<serde_json::Error> for SchemaError {
    fn from(error: serde_json::Error) -> Self {
        Self {
            message: error.to_string(),
        }
    }
}
