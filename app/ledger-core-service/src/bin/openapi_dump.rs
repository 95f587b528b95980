//! Prints the service's OpenAPI document as JSON. Run with
//! `cargo run --bin openapi_dump > openapi.json`; nothing here touches a
//! database or network.

use ledger_core_service::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() {
    let doc = ApiDoc::openapi();
    println!(
        "{}",
        doc.to_pretty_json().expect("openapi document must serialize")
    );
}
