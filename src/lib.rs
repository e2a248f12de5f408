//! Formwork: composable state containers and collect-all form validation
//!
//! Formwork splits stateful logic into passive machines and a small
//! imperative shell. A machine describes one unit of state, the actions
//! that may change it, and optional lifecycle hooks; the runtime allocates
//! a single cell, scopes child machines onto slices of it with lenses, and
//! notifies subscribers after every commit.
//!
//! # Core Concepts
//!
//! - **Store**: a read/update handle over state, scoped with `zoom`
//! - **StateMachine**: initial state plus an action bundle factory
//! - **Form fields**: editable values paired with validation chains
//! - **Combinators**: structs, tagged unions, and lists of machines,
//!   all validating collect-all style
//!
//! # Example
//!
//! ```rust
//! use formwork::{form, form_struct, runtime};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
//! enum LoginError {
//!     Required,
//! }
//!
//! impl From<form::RequiredError> for LoginError {
//!     fn from(_: form::RequiredError) -> Self {
//!         Self::Required
//!     }
//! }
//!
//! form_struct! {
//!     pub mod login {
//!         email: form::FormField<String, String, LoginError> = form::trim_non_empty_text(),
//!         password: form::FormField<String, String, LoginError> = form::non_empty_text(),
//!     }
//! }
//!
//! fn main() {
//!     let form = runtime::run(login::machine());
//!
//!     form.actions.email.set(" ada@example.com ".into());
//!     let errors = form.actions.validate().unwrap_err().into_error();
//!     assert_eq!(errors.email, None);
//!     assert_eq!(errors.password, Some(LoginError::Required));
//!
//!     form.actions.password.set("hunter2".into());
//!     let data = form.actions.validate().unwrap();
//!     assert_eq!(data.email, "ada@example.com");
//! }
//! ```

pub mod core;
pub mod form;
pub mod machines;
pub mod runtime;

// Re-export commonly used types
pub use crate::core::{
    map_actions, Lens, MapActions, OptionalLens, PartialStore, StateMachine, StateTransform,
    StateValue, Store,
};
pub use crate::form::{
    FieldActions, FieldState, FormActions, FormField, Never, RequiredError, SchemaError,
    TagActions, ValidationError,
};
pub use crate::runtime::{run, Instance, Subscription};

#[doc(hidden)]
pub mod __private {
    pub use futures::future::{join_all, BoxFuture};
}
