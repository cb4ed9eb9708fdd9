//! Student request handlers.
//!
//! Each handler decodes and validates its input, makes one storage call on
//! the blocking pool, and writes exactly one response. Failures are turned
//! into the `{status, error}` envelope here and never escape further.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::model::{FieldError, StudentId, StudentPayload};
use crate::request::Request;
use crate::response::{ErrorResponse, IntoResponse, Response};
use crate::status::Status;
use crate::storage::{SharedStore, StorageError, StorageResult, StudentStore};

/// Failure taxonomy at the HTTP boundary.
#[derive(Debug)]
pub enum ApiError {
    /// Empty, undecodable or invalid input. Answered with `400`.
    BadRequest(ErrorResponse),
    /// Referenced id does not exist. Answered with `404`.
    NotFound(String),
    /// Underlying persistence failure. Answered with `500`.
    Storage(String),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => Self::NotFound(err.to_string()),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<Vec<FieldError>> for ApiError {
    fn from(errors: Vec<FieldError>) -> Self {
        Self::BadRequest(ErrorResponse::validation(&errors))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(envelope) => envelope.with_status(Status::BadRequest),
            Self::NotFound(message) => {
                ErrorResponse::general(message).with_status(Status::NotFound)
            }
            Self::Storage(message) => {
                ErrorResponse::general(message).with_status(Status::InternalServerError)
            }
        }
    }
}

impl ApiError {
    fn bad_request(message: impl std::fmt::Display) -> Self {
        Self::BadRequest(ErrorResponse::general(message))
    }
}

type ApiResult = Result<Response, ApiError>;

/// `POST /api/students` → `201 {"id": N}`
pub async fn create(store: SharedStore, req: Request) -> ApiResult {
    let payload = decode_payload(req.body())?;

    let id = run_blocking(store, move |store| {
        store.create_student(&payload.name, &payload.email, payload.age)
    })
    .await
    .inspect_err(|err| error!("failed to create student: {err}"))?;

    info!(student_id = id, "student created successfully");
    Ok(Response::write_json(Status::Created, &json!({ "id": id })))
}

/// `GET /api/students/{id}` → `200 Student`
pub async fn get_by_id(store: SharedStore, req: Request) -> ApiResult {
    let id = parse_id(&req)?;
    info!(student_id = id, "getting student by id");

    let student = run_blocking(store, move |store| store.get_student_by_id(id))
        .await
        .inspect_err(|err| warn!(student_id = id, "failed to get student: {err}"))?;

    Ok(Response::write_json(Status::Ok, &student))
}

/// `GET /api/students` → `200 [Student]`
pub async fn list(store: SharedStore, _req: Request) -> ApiResult {
    info!("getting student list");

    let students = run_blocking(store, |store| store.get_students())
        .await
        .inspect_err(|err| error!("failed to list students: {err}"))?;

    Ok(Response::write_json(Status::Ok, &students))
}

/// `PUT`/`PATCH /api/students/{id}` → `200 Student`
pub async fn update(store: SharedStore, req: Request) -> ApiResult {
    let id = parse_id(&req)?;
    let payload = decode_payload(req.body())?;

    let student = run_blocking(store, move |store| {
        store.update_student(id, &payload.name, &payload.email, payload.age)
    })
    .await
    .inspect_err(|err| warn!(student_id = id, "failed to update student: {err}"))?;

    info!(student_id = id, "student updated successfully");
    Ok(Response::write_json(Status::Ok, &student))
}

/// `DELETE /api/students/{id}` → `204`
pub async fn delete(store: SharedStore, req: Request) -> ApiResult {
    let id = parse_id(&req)?;

    run_blocking(store, move |store| store.delete_student(id))
        .await
        .inspect_err(|err| warn!(student_id = id, "failed to delete student: {err}"))?;

    info!(student_id = id, "student deleted successfully");
    Ok(Response::builder().status(Status::NoContent).no_body())
}

fn parse_id(req: &Request) -> Result<StudentId, ApiError> {
    let raw = req.param("id").unwrap_or_default();
    raw.parse::<StudentId>().map_err(|_| {
        error!(student_id = raw, "invalid id passed by user");
        ApiError::bad_request(format!("invalid student id `{raw}`"))
    })
}

fn decode_payload(body: &[u8]) -> Result<StudentPayload, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::bad_request("empty body"));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|err| ApiError::bad_request(format!("invalid JSON body: {err}")))?;
    let Value::Object(object) = value else {
        return Err(ApiError::bad_request("request body must be a JSON object"));
    };

    Ok(StudentPayload::from_json(&object)?)
}

/// Runs one storage call on Tokio's blocking pool.
async fn run_blocking<T, F>(store: SharedStore, call: F) -> StorageResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn StudentStore) -> StorageResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || call(Arc::as_ref(&store)))
        .await
        .map_err(|err| StorageError::Unavailable(format!("storage task failed: {err}")))?
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use super::{create, delete, get_by_id, list, update};
    use crate::method::Method;
    use crate::request::Request;
    use crate::response::{IntoResponse, Response};
    use crate::status::Status;
    use crate::storage::{MemoryStore, SharedStore, StudentStore};

    fn store() -> SharedStore {
        Arc::new(MemoryStore::new())
    }

    fn with_id(method: Method, id: &str, body: &str) -> Request {
        let mut req = Request::new(method, format!("/api/students/{id}"), body.to_owned());
        req.params.insert("id".to_owned(), id.to_owned());
        req
    }

    fn json_body(response: &Response) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[tokio::test]
    async fn create_returns_new_id() {
        let store = store();
        let body = r#"{"name":"Ann","email":"ann@x.com","age":21}"#;
        let response = create(store.clone(), Request::new(Method::Post, "/api/students", body))
            .await
            .into_response();

        assert_eq!(response.status_code(), Status::Created);
        assert_eq!(json_body(&response), json!({"id": 1}));
        assert_eq!(store.get_students().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_empty_body_without_touching_storage() {
        let store = store();
        let response = create(store.clone(), Request::new(Method::Post, "/api/students", ""))
            .await
            .into_response();

        assert_eq!(response.status_code(), Status::BadRequest);
        assert_eq!(json_body(&response), json!({"status": "error", "error": "empty body"}));
        assert!(store.get_students().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_non_object_body() {
        let response = create(store(), Request::new(Method::Post, "/api/students", "[1,2]"))
            .await
            .into_response();

        assert_eq!(response.status_code(), Status::BadRequest);
    }

    #[tokio::test]
    async fn create_reports_every_missing_field() {
        let response = create(
            store(),
            Request::new(Method::Post, "/api/students", r#"{"age":3}"#),
        )
        .await
        .into_response();

        assert_eq!(response.status_code(), Status::BadRequest);
        assert_eq!(
            json_body(&response)["error"],
            "field name is required,field email is required"
        );
    }

    #[tokio::test]
    async fn get_by_id_rejects_non_numeric_id() {
        let response = get_by_id(store(), with_id(Method::Get, "abc", ""))
            .await
            .into_response();

        assert_eq!(response.status_code(), Status::BadRequest);
        assert_eq!(json_body(&response)["error"], "invalid student id `abc`");
    }

    #[tokio::test]
    async fn get_by_id_maps_missing_row_to_not_found() {
        let response = get_by_id(store(), with_id(Method::Get, "7", ""))
            .await
            .into_response();

        assert_eq!(response.status_code(), Status::NotFound);
        assert_eq!(json_body(&response)["error"], "no student found with id 7");
    }

    #[tokio::test]
    async fn list_starts_empty() {
        let response = list(store(), Request::new(Method::Get, "/api/students", ""))
            .await
            .into_response();

        assert_eq!(response.status_code(), Status::Ok);
        assert_eq!(json_body(&response), json!([]));
    }

    #[tokio::test]
    async fn update_validates_before_storage() {
        let store = store();
        let id = store.create_student("Ann", "ann@x.com", 21).unwrap();

        let response = update(
            store.clone(),
            with_id(Method::Put, &id.to_string(), r#"{"name":"","email":"ann@x.com","age":1}"#),
        )
        .await
        .into_response();

        assert_eq!(response.status_code(), Status::BadRequest);
        assert_eq!(store.get_student_by_id(id).unwrap().name, "Ann");
    }

    #[tokio::test]
    async fn delete_answers_no_content_without_body() {
        let store = store();
        let id = store.create_student("Ann", "ann@x.com", 21).unwrap();

        let response = delete(store.clone(), with_id(Method::Delete, &id.to_string(), ""))
            .await
            .into_response();

        assert_eq!(response.status_code(), Status::NoContent);
        assert!(response.body().is_empty());
        assert_eq!(response.header("content-type"), None);
        assert!(store.get_students().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_student_is_not_found() {
        let response = delete(store(), with_id(Method::Delete, "5", ""))
            .await
            .into_response();

        assert_eq!(response.status_code(), Status::NotFound);
    }
}
