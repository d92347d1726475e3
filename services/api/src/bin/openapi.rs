//! services/api/src/bin/openapi.rs
//!
//! Dumps the OpenAPI 3.0 document for the REST API, so the contract can
//! be consumed without a running server. Takes an optional output path.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());
    std::fs::write(&path, ApiDoc::openapi().to_pretty_json()?)?;
    println!("Wrote OpenAPI document to {}", path);
    Ok(())
}
