use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::services::{AuthError, EmployeeError};
use crate::validation::FieldError;

#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<FieldError>),

    BadRequest(String),

    NotFound(String),

    Unauthorized(String),

    Forbidden(String),

    TooManyRequests(String),

    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "Validation failed ({} errors)", errors.len()),
            Self::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::TooManyRequests(msg) => write!(f, "Too many requests: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Uniform error body: `{message, errors?}`, field errors as
/// `{field, message, value}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldErrorBody>>,
}

#[derive(Debug, Serialize)]
pub struct FieldErrorBody {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl From<FieldError> for FieldErrorBody {
    fn from(error: FieldError) -> Self {
        Self {
            field: error.field,
            message: error.message,
            value: error.rejected_value,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    message: "Validation failed".to_string(),
                    errors: Some(errors.into_iter().map(FieldErrorBody::from).collect()),
                },
            ),
            Self::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    message: msg,
                    errors: None,
                },
            ),
            Self::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    message: msg,
                    errors: None,
                },
            ),
            Self::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    message: msg,
                    errors: None,
                },
            ),
            Self::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    message: msg,
                    errors: None,
                },
            ),
            Self::TooManyRequests(msg) => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody {
                    message: msg,
                    errors: None,
                },
            ),
            Self::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message: "An internal error occurred".to_string(),
                        errors: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<EmployeeError> for ApiError {
    fn from(err: EmployeeError) -> Self {
        match err {
            EmployeeError::Validation(errors) => Self::Validation(errors),
            EmployeeError::InvalidIdFormat(id) => {
                Self::BadRequest(format!("Invalid employee id format: {id}"))
            }
            EmployeeError::NotFound(id) => Self::NotFound(format!("Employee {id} not found")),
            EmployeeError::DuplicateId(id) => {
                Self::BadRequest(format!("Employee id already in use: {id}"))
            }
            EmployeeError::DuplicateEmail(email) => {
                Self::BadRequest(format!("Email already in use: {email}"))
            }
            EmployeeError::InvalidManager(rejection) => {
                Self::BadRequest(format!("Invalid manager assignment: {rejection}"))
            }
            EmployeeError::HasDependents(count) => Self::BadRequest(format!(
                "Cannot delete employee: {count} employee(s) report to them"
            )),
            EmployeeError::Database(msg) | EmployeeError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_string()),
            AuthError::UserNotFound => Self::Unauthorized("User not found".to_string()),
            AuthError::Unauthorized => Self::Unauthorized("Not authenticated".to_string()),
            AuthError::Validation(msg) => Self::BadRequest(msg),
            AuthError::Database(msg) | AuthError::Internal(msg) => Self::Internal(msg),
        }
    }
}
