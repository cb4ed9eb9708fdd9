//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Register a path, get a
//! handler.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::{ErrorResponse, Response};
use crate::status::Status;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or conflicts with an existing route.
    /// Routes are fixed at startup, so this is a programming error.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Patch, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }

    /// Routes one request and produces one response.
    ///
    /// Unrouted paths yield a `404` envelope; a path registered only under
    /// other methods yields `405`.
    pub async fn handle(&self, mut req: Request) -> Response {
        match self.lookup(req.method, &req.path) {
            Some((handler, params)) => {
                req.params = params;
                handler.call(req).await
            }
            None if self.matches_any_method(&req.path) => {
                ErrorResponse::general(format!("method {} not allowed", req.method))
                    .with_status(Status::MethodNotAllowed)
            }
            None => ErrorResponse::general(format!("no route for {}", req.path))
                .with_status(Status::NotFound),
        }
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    fn matches_any_method(&self, path: &str) -> bool {
        self.routes.values().any(|tree| tree.at(path).is_ok())
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::Router;
    use crate::method::Method;
    use crate::request::Request;
    use crate::response::Response;
    use crate::status::Status;

    async fn echo_id(req: Request) -> Response {
        Response::text(req.param("id").unwrap_or("none").to_owned())
    }

    fn router() -> Router {
        Router::new().get("/api/students/{id}", echo_id)
    }

    #[tokio::test]
    async fn extracts_path_params() {
        let response = router().handle(Request::new(Method::Get, "/api/students/42", "")).await;

        assert_eq!(response.status_code(), Status::Ok);
        assert_eq!(response.body(), b"42");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let response = router().handle(Request::new(Method::Get, "/api/teachers", "")).await;

        assert_eq!(response.status_code(), Status::NotFound);
        assert_eq!(response.header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn known_path_with_other_method_is_not_allowed() {
        let response = router().handle(Request::new(Method::Post, "/api/students/1", "")).await;

        assert_eq!(response.status_code(), Status::MethodNotAllowed);
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_routes_panic() {
        let _ = Router::new()
            .get("/api/students/{id}", echo_id)
            .get("/api/students/{id}", echo_id);
    }
}
