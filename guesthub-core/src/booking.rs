use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::normalize_email;
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    /// `None` for a guest booking made without an account.
    pub user_id: Option<Uuid>,
    /// Lookup into the room inventory. Cleared when the room is deleted.
    pub room_id: Option<Uuid>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub room_type: Option<String>,
    pub number_of_guests: Option<i32>,
    pub special_requests: Option<String>,
    pub total_price: Option<f64>,
    pub booking_date: DateTime<Utc>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub status: BookingStatus,
}

impl Booking {
    pub fn from_new(id: Uuid, new: NewBooking) -> Self {
        Self {
            id,
            user_id: new.user_id,
            room_id: new.room_id,
            full_name: new.full_name,
            email: new.email,
            phone: new.phone,
            room_type: new.room_type,
            number_of_guests: new.number_of_guests,
            special_requests: new.special_requests,
            total_price: new.total_price,
            booking_date: new.booking_date,
            check_in_date: new.check_in_date,
            check_out_date: new.check_out_date,
            status: new.status,
        }
    }
}

/// A validated booking ready to be stored. The store assigns `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub user_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub room_type: Option<String>,
    pub number_of_guests: Option<i32>,
    pub special_requests: Option<String>,
    pub total_price: Option<f64>,
    pub booking_date: DateTime<Utc>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub status: BookingStatus,
}

/// Rules applied to incoming bookings on top of required-field checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingRules {
    /// Reject stays whose check-out is not strictly after check-in.
    pub enforce_checkout_after_checkin: bool,
}

/// Booking body as sent by a client.
///
/// There is no `status`, `bookingDate` or user field: the server decides those,
/// so whatever a client puts there is dropped during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub room_id: Option<Uuid>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub room_type: Option<String>,
    pub number_of_guests: Option<i32>,
    pub special_requests: Option<String>,
    pub total_price: Option<f64>,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
}

impl BookingPayload {
    /// Validates the payload and stamps it as a fresh `PENDING` booking made at `now`.
    /// The returned booking is unlinked; the caller decides the user reference.
    pub fn validate(self, rules: BookingRules, now: DateTime<Utc>) -> CoreResult<NewBooking> {
        let mut missing = Vec::new();
        if self.check_in_date.is_none() {
            missing.push("checkInDate");
        }
        if self.check_out_date.is_none() {
            missing.push("checkOutDate");
        }
        let (Some(check_in_date), Some(check_out_date)) = (self.check_in_date, self.check_out_date)
        else {
            return Err(CoreError::ValidationError(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        };

        if rules.enforce_checkout_after_checkin && check_out_date <= check_in_date {
            return Err(CoreError::ValidationError(
                "checkOutDate must be after checkInDate".to_string(),
            ));
        }
        if matches!(self.number_of_guests, Some(n) if n < 1) {
            return Err(CoreError::ValidationError(
                "numberOfGuests must be at least 1".to_string(),
            ));
        }
        if matches!(self.total_price, Some(p) if !p.is_finite() || p < 0.0) {
            return Err(CoreError::ValidationError(
                "totalPrice must be a non-negative number".to_string(),
            ));
        }
        let email = match optional(self.email) {
            Some(raw) => Some(normalize_email(&raw)?),
            None => None,
        };

        Ok(NewBooking {
            user_id: None,
            room_id: self.room_id,
            full_name: optional(self.full_name),
            email,
            phone: optional(self.phone),
            room_type: optional(self.room_type),
            number_of_guests: self.number_of_guests,
            special_requests: optional(self.special_requests),
            total_price: self.total_price,
            booking_date: now,
            check_in_date,
            check_out_date,
            status: BookingStatus::Pending,
        })
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn payload() -> BookingPayload {
        BookingPayload {
            room_id: Some(Uuid::new_v4()),
            full_name: Some("Ada Guest".to_string()),
            email: Some("Ada@Example.com".to_string()),
            number_of_guests: Some(2),
            total_price: Some(240.0),
            check_in_date: Some(date("2026-11-01")),
            check_out_date: Some(date("2026-11-03")),
            ..BookingPayload::default()
        }
    }

    #[test]
    fn stamps_pending_status_and_booking_date() {
        let now = Utc::now();
        let booking = payload().validate(BookingRules::default(), now).unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.booking_date, now);
        assert_eq!(booking.user_id, None);
        assert_eq!(booking.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn ignores_client_supplied_status() {
        let json = format!(
            r#"{{"roomId":"{}","checkInDate":"2026-11-01","checkOutDate":"2026-11-02","status":"CONFIRMED","bookingDate":"2000-01-01T00:00:00Z"}}"#,
            Uuid::new_v4()
        );
        let payload: BookingPayload = serde_json::from_str(&json).unwrap();
        let now = Utc::now();
        let booking = payload.validate(BookingRules::default(), now).unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.booking_date, now);
    }

    #[test]
    fn requires_both_dates() {
        match BookingPayload::default().validate(BookingRules::default(), Utc::now()) {
            Err(CoreError::ValidationError(msg)) => {
                assert_eq!(msg, "missing required fields: checkInDate, checkOutDate");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn accepts_room_type_request_without_room_id() {
        let json = r#"{
            "fullName": "Ada Guest",
            "email": "ada@example.com",
            "phone": "+44 20 7946 0000",
            "roomType": "deluxe",
            "checkInDate": "2026-11-01",
            "checkOutDate": "2026-11-04",
            "numberOfGuests": 2,
            "specialRequests": "",
            "totalPrice": 360,
            "bookingDate": "2026-10-18T09:30:00.000Z"
        }"#;
        let payload: BookingPayload = serde_json::from_str(json).unwrap();
        let booking = payload.validate(BookingRules::default(), Utc::now()).unwrap();
        assert_eq!(booking.room_id, None);
        assert_eq!(booking.room_type.as_deref(), Some("deluxe"));
        assert_eq!(booking.special_requests, None);
        assert_eq!(booking.total_price, Some(360.0));
    }

    #[test]
    fn date_order_rule_is_configurable() {
        let mut inverted = payload();
        inverted.check_out_date = Some(date("2026-10-30"));

        let lenient = BookingRules {
            enforce_checkout_after_checkin: false,
        };
        assert!(inverted.clone().validate(lenient, Utc::now()).is_ok());

        let strict = BookingRules {
            enforce_checkout_after_checkin: true,
        };
        assert!(matches!(
            inverted.validate(strict, Utc::now()),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_non_positive_guest_count() {
        let mut p = payload();
        p.number_of_guests = Some(0);
        assert!(p.validate(BookingRules::default(), Utc::now()).is_err());
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert!("EXPIRED".parse::<BookingStatus>().is_err());
    }
}
