use crate::error::DomainError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Success envelope: `{success: true, data, count?, message}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            count: None,
            message: message.into(),
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Error envelope: `{success: false, error, message}` plus optional hints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_routes: Option<Vec<&'static str>>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            error: error.into(),
            message: message.into(),
            required: None,
            available_routes: None,
        }
    }

    pub fn bad_request(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error, message)
    }

    pub fn not_found(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", message)
    }

    /// Maps a service error onto a response. `failure` is the message used
    /// when the error is a server side one.
    pub fn from_domain(err: DomainError, failure: &str) -> Self {
        match err {
            DomainError::Validation { field, message } => {
                Self::bad_request(format!("Invalid {field}"), format!("{field} {message}"))
            }
            DomainError::Conflict(what) => Self::new(StatusCode::CONFLICT, "Conflict", what),
            other => {
                tracing::error!(error = %other, "request failed");
                Self::internal(failure)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::error::DbError;
    use serde_json::json;

    #[test]
    fn error_mapping() {
        let v = ApiError::from_domain(
            DomainError::Validation {
                field: "id",
                message: "must be a positive integer".into(),
            },
            "x",
        );
        assert_eq!(v.status, StatusCode::BAD_REQUEST);

        let c = ApiError::from_domain(DomainError::Conflict("taken".into()), "x");
        assert_eq!(c.status, StatusCode::CONFLICT);

        let db = ApiError::from_domain(
            DomainError::Db(DbError::NotADirectory("items".into())),
            "Could not load items",
        );
        assert_eq!(db.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(db.message, "Could not load items");
    }

    #[test]
    fn envelopes_serialize_without_empty_hints() {
        let body = serde_json::to_value(ApiError::not_found(
            "Item not found",
            "Item with ID 9 does not exist",
        ))
        .unwrap();
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": "Item not found",
                "message": "Item with ID 9 does not exist"
            })
        );

        let body = serde_json::to_value(ApiResponse::ok(vec![1, 2], "ok").with_count(2)).unwrap();
        assert_eq!(body, json!({ "success": true, "data": [1, 2], "count": 2, "message": "ok" }));
    }
}
