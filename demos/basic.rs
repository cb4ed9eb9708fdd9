//! Serves the student API over an in-memory store. Nothing touches disk.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -X POST http://localhost:3000/api/students \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"Ann","email":"ann@x.com","age":21}'
//!   curl http://localhost:3000/api/students/1
//!   curl -X DELETE http://localhost:3000/api/students/1
//!   curl http://localhost:3000/readyz

use std::sync::Arc;

use students_api::{app, logging, MemoryStore, Server};

#[tokio::main]
async fn main() -> Result<(), students_api::Error> {
    if let Err(err) = logging::init_logging("local") {
        eprintln!("{err}");
    }

    let store = Arc::new(MemoryStore::new());

    Server::bind("0.0.0.0:3000")
        .await?
        .serve(app(store))
        .await
}
