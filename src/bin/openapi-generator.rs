//! Emits the OpenAPI document for the HTTP API as pretty-printed JSON on stdout.

use fishbowl_back::services::documentation::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), serde_json::Error> {
    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}
