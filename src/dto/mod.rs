pub mod application_dto;
pub mod auth_dto;
pub mod candidate_dto;
pub mod course_dto;
pub mod enquiry_dto;
pub mod enrollment_dto;
pub mod job_dto;
pub mod patch;
pub mod stats_dto;
pub mod user_dto;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};

/// Body of `PATCH /{entity}/{id}/{field}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldPatchPayload {
    pub value: JsonValue,
}

/// Turns a single `field = value` pair into the entity's update payload so it
/// goes through the same merge path as a full `PUT`. Update payloads reject
/// unknown keys, which makes an unknown field name a validation error here.
pub fn single_field_update<T: DeserializeOwned>(field: &str, value: JsonValue) -> Result<T> {
    let mut body = Map::new();
    body.insert(field.to_string(), value);
    serde_json::from_value(JsonValue::Object(body))
        .map_err(|e| Error::Invalid(format!("Cannot update field {}: {}", field, e)))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::course_dto::UpdateCoursePayload;
    use crate::dto::patch::Patch;
    use serde_json::json;

    #[test]
    fn single_field_becomes_partial_update() {
        let payload: UpdateCoursePayload = single_field_update("instructor", json!("Ravi")).unwrap();
        assert_eq!(payload.instructor, Patch::Value("Ravi".to_string()));
        assert!(payload.name.is_missing());

        let payload: UpdateCoursePayload = single_field_update("instructor", JsonValue::Null).unwrap();
        assert_eq!(payload.instructor, Patch::Null);
    }

    #[test]
    fn unknown_field_is_a_validation_error() {
        let err = single_field_update::<UpdateCoursePayload>("colour", json!("red")).unwrap_err();
        assert!(matches!(err, Error::Invalid(msg) if msg.contains("colour")));
    }
}
