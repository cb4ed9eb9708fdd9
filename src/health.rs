//! Liveness and readiness checks.
//!
//! | Check | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can the storage answer a query? |

use tracing::warn;

use crate::response::ErrorResponse;
use crate::storage::{SharedStore, StorageError};
use crate::{Request, Response, Status};

/// Always `200 OK` with body `"ok"`. No dependencies.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"` when the store answers a ping, otherwise
/// `503` with the error envelope.
pub async fn readiness(store: SharedStore, _req: Request) -> Response {
    let ping = tokio::task::spawn_blocking(move || store.ping())
        .await
        .map_err(|err| StorageError::Unavailable(format!("storage task failed: {err}")))
        .and_then(|result| result);

    match ping {
        Ok(()) => Response::text("ready"),
        Err(err) => {
            warn!("readiness check failed: {err}");
            ErrorResponse::general(err).with_status(Status::ServiceUnavailable)
        }
    }
}
