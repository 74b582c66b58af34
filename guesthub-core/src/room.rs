use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub number: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub price_per_night: f64,
    pub capacity: i32,
    pub status: String,
}

impl Room {
    pub fn from_fields(id: Uuid, fields: RoomFields) -> Self {
        Self {
            id,
            number: fields.number,
            room_type: fields.room_type,
            price_per_night: fields.price_per_night,
            capacity: fields.capacity,
            status: fields.status,
        }
    }
}

/// The mutable part of a room, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomFields {
    pub number: String,
    pub room_type: String,
    pub price_per_night: f64,
    pub capacity: i32,
    pub status: String,
}

/// Room body as sent by a client for create and update.
///
/// Every field is required on both operations; an update replaces the room wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPayload {
    pub number: Option<String>,
    #[serde(rename = "type")]
    pub room_type: Option<String>,
    pub price_per_night: Option<f64>,
    pub capacity: Option<i32>,
    pub status: Option<String>,
}

impl RoomPayload {
    pub fn validate(self) -> CoreResult<RoomFields> {
        let mut missing = Vec::new();

        let number = non_blank(self.number);
        if number.is_none() {
            missing.push("number");
        }
        let room_type = non_blank(self.room_type);
        if room_type.is_none() {
            missing.push("type");
        }
        if self.price_per_night.is_none() {
            missing.push("pricePerNight");
        }
        if self.capacity.is_none() {
            missing.push("capacity");
        }
        let status = non_blank(self.status);
        if status.is_none() {
            missing.push("status");
        }

        match (number, room_type, self.price_per_night, self.capacity, status) {
            (Some(number), Some(room_type), Some(price_per_night), Some(capacity), Some(status)) => {
                if !price_per_night.is_finite() || price_per_night < 0.0 {
                    return Err(CoreError::ValidationError(
                        "pricePerNight must be a non-negative number".to_string(),
                    ));
                }
                if capacity < 1 {
                    return Err(CoreError::ValidationError(
                        "capacity must be at least 1".to_string(),
                    ));
                }
                Ok(RoomFields {
                    number,
                    room_type,
                    price_per_night,
                    capacity,
                    status,
                })
            }
            _ => Err(CoreError::ValidationError(format!(
                "missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> RoomPayload {
        RoomPayload {
            number: Some("101".to_string()),
            room_type: Some("double".to_string()),
            price_per_night: Some(89.5),
            capacity: Some(2),
            status: Some("available".to_string()),
        }
    }

    #[test]
    fn accepts_complete_payload() {
        let fields = full_payload().validate().unwrap();
        assert_eq!(fields.number, "101");
        assert_eq!(fields.room_type, "double");
        assert_eq!(fields.capacity, 2);
    }

    #[test]
    fn lists_every_missing_field() {
        let payload = RoomPayload {
            number: Some("  ".to_string()),
            capacity: Some(2),
            ..RoomPayload::default()
        };
        match payload.validate() {
            Err(CoreError::ValidationError(msg)) => {
                assert_eq!(msg, "missing required fields: number, type, pricePerNight, status");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_negative_price_and_empty_capacity() {
        let mut payload = full_payload();
        payload.price_per_night = Some(-1.0);
        assert!(payload.validate().is_err());

        let mut payload = full_payload();
        payload.capacity = Some(0);
        assert!(payload.validate().is_err());
    }

    #[test]
    fn reads_type_field_from_json() {
        let payload: RoomPayload = serde_json::from_str(
            r#"{"number":"7","type":"suite","pricePerNight":200,"capacity":4,"status":"free"}"#,
        )
        .unwrap();
        assert_eq!(payload.validate().unwrap().room_type, "suite");
    }
}
