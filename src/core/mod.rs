//! Core building blocks for composable state containers.
//!
//! This module contains the pure core of the library:
//! - Lenses for focusing part of a state value
//! - Scoped [`Store`] handles whose updates write back through the parent
//! - The [`StateMachine`] contract tying state to its action bundle
//!
//! Everything here is passive wiring; side effects only happen once a
//! machine is handed to [`runtime::run`](crate::runtime::run).

mod machine;
mod optics;
mod store;

pub use machine::{map_actions, MapActions, StateMachine, StateValue};
pub use optics::{Lens, OptionalLens};
pub use store::{PartialStore, StateTransform, Store};
