use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SellyApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Selly API error. {0}")]
    Api(ErrorResponse),
}

/// The error object Selly returns alongside non-2xx responses, e.g.
/// `{"message": "Validation failed", "errors": {"title": ["can't be blank"]}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default)]
    pub errors: ErrorTitles,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorTitles {
    #[serde(default)]
    pub title: Vec<String>,
}

impl Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.title.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: [{}]", self.message, self.errors.title.join(", "))
        }
    }
}

impl std::error::Error for ErrorResponse {}
