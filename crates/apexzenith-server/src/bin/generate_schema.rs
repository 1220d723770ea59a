//! Print the OpenAPI document for the dashboard API to stdout.

use utoipa::OpenApi;

use apexzenith_server::openapi::ApiDoc;

fn main() {
    match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI document: {}", e);
            std::process::exit(1);
        }
    }
}
