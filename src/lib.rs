//! # students-api
//!
//! A small JSON service for student records. Four layers, leaves first:
//!
//! - [`model`] — the [`Student`] record and request payload validation
//! - [`storage`] — the [`StudentStore`] capability, backed by SQLite or memory
//! - [`response`] — JSON writer and the `{status, error}` envelope
//! - [`students`] — request handlers wired onto the router by [`app`]
//!
//! The HTTP plumbing underneath (radix routing via [`matchit`], hyper
//! connections, graceful shutdown) is deliberately thin. Handlers are plain
//! `async fn`s; state travels in closures.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use students_api::{app, Server, SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), students_api::Error> {
//!     let store = Arc::new(SqliteStore::open("storage/storage.db")?);
//!     let router = app(store);
//!
//!     Server::bind("localhost:8082").await?.serve(router).await
//! }
//! ```
//!
//! ## Routes
//!
//! | Method & Path | Success |
//! |---|---|
//! | `POST /api/students` | `201 {"id": N}` |
//! | `GET /api/students` | `200 [Student]` |
//! | `GET /api/students/{id}` | `200 Student` |
//! | `PUT`/`PATCH /api/students/{id}` | `200 Student` |
//! | `DELETE /api/students/{id}` | `204` |
//! | `GET /healthz`, `GET /readyz` | `200` |

mod app;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod config;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod model;
pub mod storage;
pub mod students;

pub use app::app;
pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use model::{FieldError, Student, StudentPayload};
pub use request::Request;
pub use response::{ErrorResponse, IntoResponse, Response};
pub use router::Router;
pub use server::Server;
pub use status::Status;
pub use storage::{MemoryStore, SharedStore, SqliteStore, StorageError, StudentStore};
