//! Sanitizing a signup form with a nested address.
//!
//! This example shows the basic flow:
//! 1. Declare a schema once (here, with a nested address sub-schema)
//! 2. Sanitize untrusted input against it
//! 3. Read typed values from the restricted output
//! 4. Return the collected field errors as JSON
//!
//! Run with: `cargo run --example signup_form`

use std::sync::Arc;

use input_sanitizer::{FieldOptions, Schema, Value};
use serde_json::json;

fn main() {
    println!("=== Signup Form Example ===\n");

    let address = Arc::new(
        Schema::builder("Address")
            .string(["street"], FieldOptions::new())
            .string(["city"], FieldOptions::new().required(true))
            .build(),
    );

    let signup = match Schema::builder("Signup")
        .string(["name"], FieldOptions::new().required(true))
        .integer(["age"], FieldOptions::new())
        .boolean(["newsletter"], FieldOptions::new().default_value(false))
        .date(["birthday"], FieldOptions::new())
        .nested(
            ["address"],
            FieldOptions::new().sanitizer(address).include_errors(true),
        ) {
        Ok(builder) => builder.build(),
        Err(e) => {
            eprintln!("Schema error: {}", e);
            return;
        }
    };

    // Scenario 1: Well-formed input, with an extra key that gets dropped
    println!("--- Scenario 1: Valid Input ---");
    let sanitizer = signup.sanitize(json!({
        "name": "Alice",
        "age": "34",
        "birthday": "1990-04-01",
        "address": { "street": "Main St 1", "city": "Utrecht" },
        "is_admin": true,
    }));

    println!("Valid: {}", sanitizer.is_valid());
    for (key, value) in sanitizer.cleaned().iter() {
        println!("  {} = {}", key, value);
    }
    if let Ok(Some(Value::Bool(newsletter))) = sanitizer.get("newsletter") {
        println!("Newsletter defaulted to {}", newsletter);
    }
    match sanitizer.get("is_admin") {
        Ok(_) => println!("Unexpected: undeclared key readable"),
        Err(e) => println!("Undeclared key rejected (expected): {}", e),
    }

    // Scenario 2: Invalid and missing fields, including inside the address
    println!("\n--- Scenario 2: Invalid Input ---");
    let sanitizer = signup.sanitize(json!({
        "age": "thirty",
        "birthday": "1990-02-30",
        "address": { "street": "Main St 1" },
    }));

    println!("Valid: {}", sanitizer.is_valid());
    for error in sanitizer.errors() {
        println!("  {}", error);
    }

    match serde_json::to_string_pretty(sanitizer.errors()) {
        Ok(body) => println!("\nError response body:\n{}", body),
        Err(e) => eprintln!("Serialization error: {}", e),
    }

    println!("\n=== Example Complete ===");
}
