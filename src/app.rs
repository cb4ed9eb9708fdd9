//! Route table for the service.

use std::future::Future;
use std::sync::Arc;

use crate::handler::Handler;
use crate::request::Request;
use crate::response::IntoResponse;
use crate::router::Router;
use crate::storage::SharedStore;
use crate::{health, students};

/// Builds the full router over `store`.
pub fn app(store: SharedStore) -> Router {
    Router::new()
        .post("/api/students", with_store(Arc::clone(&store), students::create))
        .get("/api/students", with_store(Arc::clone(&store), students::list))
        .get("/api/students/{id}", with_store(Arc::clone(&store), students::get_by_id))
        .put("/api/students/{id}", with_store(Arc::clone(&store), students::update))
        .patch("/api/students/{id}", with_store(Arc::clone(&store), students::update))
        .delete("/api/students/{id}", with_store(Arc::clone(&store), students::delete))
        .get("/healthz", health::liveness)
        .get("/readyz", with_store(Arc::clone(&store), health::readiness))
}

/// Closes a `(store, request)` handler over the shared store.
fn with_store<F, Fut, R>(store: SharedStore, handler: F) -> impl Handler
where
    F: Fn(SharedStore, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    move |req: Request| handler(Arc::clone(&store), req)
}
