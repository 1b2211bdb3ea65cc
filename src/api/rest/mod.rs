//! REST API module for HTTP endpoints
//!
//! - `POST /message` - Broadcast a chat message into a channel
//! - `GET /api/channels` - Membership snapshot of every channel
//! - `GET /api/channels/:channel` - Participants of one channel

pub mod channels;
pub mod message;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::RelayError;

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "BAD_REQUEST".to_string(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "NOT_FOUND".to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: "CONFLICT".to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match self {
            RelayError::Validation(_) | RelayError::InvalidMessage(_) => {
                (StatusCode::BAD_REQUEST, ApiError::bad_request(message))
            }
            RelayError::UnknownParticipant(_) | RelayError::SessionTerminated(_) => {
                (StatusCode::NOT_FOUND, ApiError::not_found(message))
            }
            RelayError::DuplicateParticipant(_) => {
                (StatusCode::CONFLICT, ApiError::conflict(message))
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_error_status_codes() {
        let response = RelayError::InvalidMessage("Message is invalid".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = RelayError::UnknownParticipant("a".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = RelayError::DuplicateParticipant("a".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
