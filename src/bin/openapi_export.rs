//! Prints the OpenAPI document to stdout.
//!
//! Usage: cargo run --bin openapi-export > openapi.json

use anyhow::{Context, Result};
use utoipa::OpenApi;

use teamon_api::api::openapi::ApiDoc;

fn main() -> Result<()> {
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("Failed to serialize OpenAPI document")?;
    println!("{json}");
    Ok(())
}
