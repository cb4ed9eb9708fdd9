//! Student domain model and request payload validation.
//!
//! # Invariants
//! - `id` is assigned by storage and never changes afterwards.
//! - `name` and `email` of a persisted record are never empty.
//! - `age` must be supplied explicitly; `0` is a legal value, absence is not.

use std::error::Error;
use std::fmt::{Display, Formatter};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Identifier assigned by the storage layer.
pub type StudentId = i64;

/// One persisted student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub age: i64,
}

/// The mutable fields of a student, validated and ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentPayload {
    pub name: String,
    pub email: String,
    pub age: i64,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// Field is absent, `null`, or an empty string.
    Required(&'static str),
    /// Field is present but has the wrong type or shape.
    Invalid(&'static str),
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required(field) => write!(f, "field {field} is required"),
            Self::Invalid(field) => write!(f, "field {field} is invalid"),
        }
    }
}

impl Error for FieldError {}

impl StudentPayload {
    /// Validates a decoded JSON object.
    ///
    /// Every field is checked; all failures come back together, in the order
    /// `name`, `email`, `age`.
    pub fn from_json(object: &Map<String, Value>) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = required_text(object, "name", &mut errors);
        let email = required_text(object, "email", &mut errors).and_then(|email| {
            if EMAIL_RE.is_match(&email) {
                Some(email)
            } else {
                errors.push(FieldError::Invalid("email"));
                None
            }
        });
        let age = match object.get("age") {
            None | Some(Value::Null) => {
                errors.push(FieldError::Required("age"));
                None
            }
            Some(value) => {
                let age = value.as_i64();
                if age.is_none() {
                    errors.push(FieldError::Invalid("age"));
                }
                age
            }
        };

        match (name, email, age) {
            (Some(name), Some(email), Some(age)) if errors.is_empty() => {
                Ok(Self { name, email, age })
            }
            _ => Err(errors),
        }
    }
}

fn required_text(
    object: &Map<String, Value>,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => {
            errors.push(FieldError::Required(field));
            None
        }
        Some(Value::String(text)) if text.is_empty() => {
            errors.push(FieldError::Required(field));
            None
        }
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            errors.push(FieldError::Invalid(field));
            None
        }
    }
}
