//! Signup Form
//!
//! This example demonstrates a signup form composed from struct, union,
//! and list combinators, submitted through a tracked async request.
//!
//! Key concepts:
//! - Composing one machine from every combinator
//! - Tag switches that keep inactive variants' state
//! - Collect-all validation across the whole tree
//! - Tracking an async submission through a query machine
//!
//! Run with: cargo run --example signup

use formwork::{form, form_struct, form_union, machines, runtime};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum SignupError {
    Required,
}

impl From<form::RequiredError> for SignupError {
    fn from(_: form::RequiredError) -> Self {
        Self::Required
    }
}

form_union! {
    mod contact by channel {
        Email: form::FormField<String, String, SignupError> = form::trim_non_empty_text(),
        Phone: form::FormField<String, String, SignupError> = form::trim_non_empty_text(),
    }
}

form_struct! {
    mod signup {
        username: form::FormField<String, String, SignupError> = form::trim_non_empty_text(),
        contact: contact::Machine = contact::machine(),
        interests: form::List<form::FormField<String, String, SignupError>> =
            form::list(form::non_empty_text()),
    }
}

#[tokio::main]
async fn main() {
    println!("=== Signup Form Example ===\n");

    let form = runtime::run(signup::machine());

    // Collect-all validation reports every failing branch at once.
    println!("Validating a half-filled form...");
    form.actions.interests.add_item();
    match form.actions.validate() {
        Ok(_) => println!("  Unexpectedly valid"),
        Err(failure) => {
            let errors = failure.into_error();
            println!("  username:  {:?}", errors.username);
            println!("  contact:   {:?}", errors.contact);
            println!("  interests: {:?}", errors.interests);
        }
    }

    // Fill every branch. The phone number is edited while the email tag
    // is still active; switching tags afterwards keeps that edit.
    println!("\nFilling the form...");
    form.actions.username.set("ada".into());
    form.actions.contact.Phone.set("555-0100".into());
    form.actions.contact.channel.set(contact::Tag::Phone);
    form.actions.interests.index(0).set("mathematics".into());
    form.actions.interests.add_item();
    form.actions.interests.index(1).set("engines".into());

    let data = match form.actions.validate() {
        Ok(data) => data,
        Err(failure) => {
            println!("  Validation failed: {:?}", failure.into_error());
            return;
        }
    };
    println!("  Clean data: {:?}", data);

    // Submit through a tracked query; subscribers observe the lifecycle.
    println!("\nSubmitting...");
    let request = runtime::run(machines::tracked(|data: signup::Data| async move {
        // A stand-in for the real network call.
        Ok::<String, String>(format!("welcome, {}", data.username))
    }));

    let subscription = request.subscribe(|state: &machines::QueryState<String, String>| {
        if state.is_loading() {
            println!("  [Request] loading...");
        } else if let Some(message) = state.data() {
            println!("  [Request] success: {}", message);
        }
    });

    let outcome = request.actions.submit(data).await;
    println!("  Outcome: {:?}", outcome);
    subscription.unsubscribe();

    println!("\n=== Example Complete ===");
}
