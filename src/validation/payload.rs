//! Field-level checks for event payloads and message bodies

use serde_json::Value;

use crate::error::{RelayError, RelayResult};

/// Read a required string field from an event payload
pub fn require_string(data: &Value, field: &str) -> RelayResult<String> {
    match data.get(field) {
        None | Some(Value::Null) => Err(RelayError::validation(format!(
            "missing field '{}'",
            field
        ))),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(RelayError::validation(format!(
            "field '{}' must be a string",
            field
        ))),
    }
}

/// Read an optional string field; present-but-not-a-string is still an error
pub fn optional_string(data: &Value, field: &str) -> RelayResult<Option<String>> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(RelayError::validation(format!(
            "field '{}' must be a string",
            field
        ))),
    }
}

/// Read the `channel` field; blank channel names are rejected
pub fn require_channel(data: &Value) -> RelayResult<String> {
    let channel = require_string(data, "channel")?;
    if channel.trim().is_empty() {
        return Err(RelayError::validation("channel must not be blank"));
    }
    Ok(channel)
}

/// Check the text of a `POST /message` body
pub fn require_message(message: Option<&str>) -> RelayResult<&str> {
    match message {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(RelayError::InvalidMessage("Message is invalid".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_string() {
        let data = json!({"name": "Alice", "age": 3});
        assert_eq!(require_string(&data, "name").unwrap(), "Alice");
        assert!(require_string(&data, "channel")
            .unwrap_err()
            .to_string()
            .contains("missing field 'channel'"));
        assert!(require_string(&data, "age")
            .unwrap_err()
            .to_string()
            .contains("must be a string"));
    }

    #[test]
    fn test_require_string_on_non_object() {
        assert!(require_string(&Value::Null, "name").is_err());
        assert!(require_string(&json!("Alice"), "name").is_err());
    }

    #[test]
    fn test_optional_string() {
        assert_eq!(optional_string(&json!({}), "id").unwrap(), None);
        assert_eq!(
            optional_string(&json!({"id": "conn_1"}), "id").unwrap(),
            Some("conn_1".to_string())
        );
        assert!(optional_string(&json!({"id": 7}), "id").is_err());
    }

    #[test]
    fn test_require_channel_rejects_blank() {
        assert_eq!(require_channel(&json!({"channel": "lobby"})).unwrap(), "lobby");
        assert!(require_channel(&json!({"channel": "   "})).is_err());
        assert!(require_channel(&json!({"channel": ["lobby"]})).is_err());
    }

    #[test]
    fn test_require_message() {
        assert_eq!(require_message(Some("hi")).unwrap(), "hi");
        assert_eq!(
            require_message(Some("  \n")).unwrap_err(),
            RelayError::InvalidMessage("Message is invalid".to_string())
        );
        assert!(require_message(Some("")).is_err());
        assert!(require_message(None).is_err());
    }
}
