//! Password Change Form
//!
//! This example demonstrates a change-password form with a cross-field
//! confirmation check layered onto a generated struct combinator.
//!
//! Key concepts:
//! - Leaf fields with chained validation stages
//! - Collect-all validation across a generated struct combinator
//! - Rewrapping a bundle to add a cross-field rule
//! - Refilling a whole form from clean data
//!
//! Run with: cargo run --example password_form

use std::ops::Deref;

use formwork::{
    form, form_struct, map_actions, runtime, FormActions, MapActions, ValidationError,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum PasswordError {
    Required,
    TooShort,
    NoMatch,
}

impl From<form::RequiredError> for PasswordError {
    fn from(_: form::RequiredError) -> Self {
        Self::Required
    }
}

fn password_field() -> form::FormField<String, String, PasswordError> {
    form::non_empty_text().filter(|value| value.len() >= 8, |_| PasswordError::TooShort)
}

form_struct! {
    mod new_password {
        password: form::FormField<String, String, PasswordError> = password_field(),
        confirmation: form::FormField<String, String, PasswordError> = form::text(),
    }
}

// The password pair bundle, plus an equality check across both fields.
struct ConfirmedPasswordActions {
    inner: new_password::Actions,
}

impl Deref for ConfirmedPasswordActions {
    type Target = new_password::Actions;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FormActions for ConfirmedPasswordActions {
    type Data = String;
    type Error = new_password::Errors;

    fn validate(&self) -> Result<String, ValidationError<new_password::Errors>> {
        let data = self.inner.validate()?;
        if data.password == data.confirmation {
            return Ok(data.password);
        }
        self.inner
            .confirmation
            .set_error(Some(PasswordError::NoMatch));
        Err(ValidationError::new(new_password::Errors {
            password: None,
            confirmation: Some(PasswordError::NoMatch),
        }))
    }

    fn set_state_from_data(&self, data: &String) {
        self.inner.set_state_from_data(&new_password::Data {
            password: data.clone(),
            confirmation: data.clone(),
        });
    }
}

fn confirmed_password() -> MapActions<new_password::Machine, ConfirmedPasswordActions> {
    map_actions(new_password::machine(), |inner, _| {
        ConfirmedPasswordActions { inner }
    })
}

form_struct! {
    mod change_password {
        current: form::FormField<String, String, PasswordError> = form::non_empty_text(),
        replacement: MapActions<new_password::Machine, ConfirmedPasswordActions> =
            confirmed_password(),
    }
}

fn main() {
    println!("=== Password Change Form Example ===\n");

    let form = runtime::run(change_password::machine());

    // First attempt: current password missing, confirmation mismatched.
    println!("Validating a mismatched form...");
    form.actions.replacement.password.set("s3cretpassw0rd".into());
    form.actions.replacement.confirmation.set("s3cretpassword".into());

    match form.actions.validate() {
        Ok(_) => println!("  Unexpectedly valid"),
        Err(failure) => {
            let errors = failure.into_error();
            println!("  Validation failed:");
            println!("    current:     {:?}", errors.current);
            println!("    replacement: {:?}", errors.replacement);
        }
    }

    // Each failing branch also wrote its own field error.
    println!("\nField-level error states:");
    let state = form.state();
    println!("  current.error:      {:?}", state.current.error);
    println!(
        "  confirmation.error: {:?}",
        state.replacement.confirmation.error
    );

    // Second attempt: edits clear stale errors as they land.
    println!("\nFixing the form...");
    form.actions.current.set("correct horse".into());
    form.actions.replacement.confirmation.set("s3cretpassw0rd".into());

    match form.actions.validate() {
        Ok(data) => {
            println!("  Validation passed!");
            println!("    current:     {}", data.current);
            println!("    replacement: {}", data.replacement);
        }
        Err(failure) => println!("  Still failing: {:?}", failure.into_error()),
    }

    // Refilling from clean data duplicates the password into the
    // confirmation, so the refilled form validates as-is.
    println!("\nRefilling from clean data...");
    form.actions.set_state_from_data(&change_password::Data {
        current: "correct horse".into(),
        replacement: "battery staple!".into(),
    });
    println!("  password:     {}", form.state().replacement.password.value);
    println!(
        "  confirmation: {}",
        form.state().replacement.confirmation.value
    );

    println!("\n=== Example Complete ===");
}
