//! Message ingress - one-shot chat message posted over HTTP

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, RelayResult};
use crate::relay::{RelayState, ServerEvent};
use crate::validation::require_message;

/// Body of `POST /message`
#[derive(Debug, Default, Deserialize)]
pub struct MessageRequest {
    pub message: Option<String>,
    pub name: Option<String>,
    pub channel: Option<String>,
}

/// `POST /message` body read as JSON or as an urlencoded form,
/// chosen by `Content-Type`
#[derive(Debug)]
pub struct MessageBody(pub MessageRequest);

#[async_trait]
impl<S> FromRequest<S> for MessageBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(body) = Form::<MessageRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(body))
        } else {
            let Json(body) = Json::<MessageRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(body))
        }
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|mime| mime.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

/// Success body of `POST /message`
#[derive(Debug, Serialize)]
pub struct MessageAccepted {
    pub message: &'static str,
}

impl MessageRequest {
    /// Check the body and build the event to broadcast, with its channel
    pub fn into_event(self) -> RelayResult<(String, ServerEvent)> {
        let message = require_message(self.message.as_deref())?.to_string();
        let channel = self
            .channel
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| RelayError::InvalidMessage("Channel is invalid".to_string()))?;

        Ok((
            channel,
            ServerEvent::IncomingMessage {
                message,
                name: self.name,
            },
        ))
    }
}

/// POST /message - Broadcast `incomingMessage` to a channel
///
/// Does not touch the registry; the audience is whoever is in the channel now.
pub async fn post_message(
    State(state): State<Arc<RelayState>>,
    MessageBody(body): MessageBody,
) -> Result<impl IntoResponse, RelayError> {
    let (channel, event) = body.into_event().map_err(|err| {
        tracing::debug!(error = %err, "Rejected message");
        err
    })?;

    let delivered = state.broadcast(&channel, event);
    tracing::debug!(channel = %channel, delivered, "Message relayed");

    Ok((
        StatusCode::OK,
        Json(MessageAccepted {
            message: "Message received",
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_event() {
        let request = MessageRequest {
            message: Some("hi".to_string()),
            name: Some("Alice".to_string()),
            channel: Some("lobby".to_string()),
        };

        let (channel, event) = request.into_event().unwrap();
        assert_eq!(channel, "lobby");
        assert_eq!(
            event,
            ServerEvent::IncomingMessage {
                message: "hi".to_string(),
                name: Some("Alice".to_string()),
            }
        );
    }

    #[test]
    fn test_into_event_rejects_blank_message() {
        let request = MessageRequest {
            message: Some("   ".to_string()),
            channel: Some("lobby".to_string()),
            ..Default::default()
        };
        assert_eq!(
            request.into_event().unwrap_err(),
            RelayError::InvalidMessage("Message is invalid".to_string())
        );
    }

    #[test]
    fn test_into_event_rejects_missing_channel() {
        let request = MessageRequest {
            message: Some("hi".to_string()),
            ..Default::default()
        };
        assert_eq!(
            request.into_event().unwrap_err(),
            RelayError::InvalidMessage("Channel is invalid".to_string())
        );
    }
}
