//! Custom converters, schema derivation and field policies.
//!
//! Demonstrates:
//! - a plain converter and a context-aware converter that records its own error
//! - deriving a schema from a base and overriding a field
//! - collection, namespace and output-key policies
//! - structured logging of a pass through `tracing`
//!
//! Run with: `cargo run --example custom_converters`

use input_sanitizer::{
    ConversionError, Converter, ConverterKind, FieldError, FieldOptions, Schema, SchemaBuilder,
    Value,
};
use serde_json::json;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Custom Converters Example ===\n");

    let slug = Converter::plain(|value| {
        let text = value.to_string().trim().to_lowercase().replace(' ', "-");
        if text.is_empty() {
            Err(ConversionError::new("empty slug"))
        } else {
            Ok(Value::from(text))
        }
    });

    // Accepts the value but flags suspicious content on the pass.
    let comment = Converter::with_context(|value, ctx| {
        let text = value.to_string();
        if text.contains("<script") {
            let field = ctx.field().to_string();
            ctx.push_error(FieldError::invalid_value(
                field,
                value.clone(),
                "markup not allowed",
            ));
        }
        Ok(Value::from(text))
    });

    let base = match Schema::builder("Article")
        .string(["title"], FieldOptions::new().required(true))
        .integer(["tag_ids"], FieldOptions::new().collection(true))
        .integer(["author"], FieldOptions::new().namespace("id"))
        .declare(
            ConverterKind::SpecificValues(vec!["draft".into(), "published".into()]),
            ["status"],
            FieldOptions::new().default_value("draft"),
        )
        .custom(["slug"], FieldOptions::new().converter(slug))
        .and_then(|b| {
            b.custom(
                ["body"],
                FieldOptions::new().converter(comment).output_key("content"),
            )
        }) {
        Ok(builder) => builder.build(),
        Err(e) => {
            eprintln!("Schema error: {}", e);
            return;
        }
    };

    // Scenario 1: Base schema
    println!("--- Scenario 1: Base Schema ---");
    let sanitizer = base.sanitize(json!({
        "title": "Hello",
        "slug": "Hello World",
        "tag_ids": ["1", 2, "3"],
        "author": { "id": "7" },
        "body": "<script>alert(1)</script>",
    }));
    for (key, value) in sanitizer.cleaned().iter() {
        println!("  {} = {}", key, value);
    }
    for error in sanitizer.errors() {
        println!("  error: {}", error);
    }

    // Scenario 2: Derived schema overriding `tag_ids` with a comma-joined list
    println!("\n--- Scenario 2: Derived Schema ---");
    let derived = SchemaBuilder::derive(&base, "ImportedArticle")
        .declare(
            ConverterKind::CommaJoinedIntegers,
            ["tag_ids"],
            FieldOptions::new(),
        )
        .build();
    let cleaned = derived.clean(json!({ "title": "Imported", "tag_ids": "4,5,6" }));
    match cleaned.get("tag_ids") {
        Ok(Some(tags)) => println!("  tag_ids = {}", tags),
        Ok(None) => println!("  tag_ids missing"),
        Err(e) => println!("  error: {}", e),
    }
    println!("  base still has {} fields", base.len());

    println!("\n=== Example Complete ===");
}
