//! Print the OpenAPI document as pretty JSON.
//!
//! Usage: `cargo run -p glimpse-api --bin generate-openapi > openapi.json`

use glimpse_api::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), serde_json::Error> {
    let json = ApiDoc::openapi().to_pretty_json()?;
    println!("{}", json);
    Ok(())
}
