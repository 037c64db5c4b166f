//! Generic success envelope (spec §6): `{success, message, data, timestamp}`.
//! Pairs with [`crate::error::AppError`]'s own `{success, message, error,
//! timestamp}` shape on the failure path.

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
    pub timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::with_message("OK", data)
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_marks_success_true() {
        let response = ApiResponse::ok(serde_json::json!({"a": 1}));
        assert!(response.success);
        assert_eq!(response.message, "OK");
    }
}
