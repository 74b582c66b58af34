use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::booking::{Booking, BookingPayload, BookingRules};
use crate::identity::{Caller, Role};
use crate::repository::{bounded, BookingRepository, Repositories, RoomRepository, UserRepository};
use crate::{CoreError, CoreResult};

pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    users: Arc<dyn UserRepository>,
    rooms: Arc<dyn RoomRepository>,
    rules: BookingRules,
    store_timeout: Duration,
}

impl BookingService {
    pub fn new(repos: &Repositories, rules: BookingRules, store_timeout: Duration) -> Self {
        Self {
            bookings: Arc::clone(&repos.bookings),
            users: Arc::clone(&repos.users),
            rooms: Arc::clone(&repos.rooms),
            rules,
            store_timeout,
        }
    }

    /// Privileged callers see every booking; anyone else only their own.
    pub async fn list_for_caller(&self, caller: &Caller) -> CoreResult<Vec<Booking>> {
        if caller.is_privileged() {
            return bounded(self.store_timeout, self.bookings.list_all()).await;
        }

        // The token may outlive the account it was issued for.
        let user = bounded(self.store_timeout, self.users.find_by_email(&caller.email))
            .await?
            .ok_or_else(|| CoreError::NotFound("User".to_string()))?;

        bounded(self.store_timeout, self.bookings.list_for_user(user.id)).await
    }

    /// Accepts bookings from anyone. A caller whose identity resolves to an account
    /// gets the booking linked to it; everyone else makes a guest booking.
    pub async fn create(&self, caller: Option<&Caller>, payload: BookingPayload) -> CoreResult<Booking> {
        let mut booking = payload.validate(self.rules, Utc::now())?;

        // A booking may name only a room type; a named room must exist.
        if let Some(room_id) = booking.room_id {
            if bounded(self.store_timeout, self.rooms.get(room_id))
                .await?
                .is_none()
            {
                return Err(CoreError::ValidationError(format!(
                    "room {} does not exist",
                    room_id
                )));
            }
        }

        if let Some(caller) = caller {
            booking.user_id = bounded(self.store_timeout, self.users.find_by_email(&caller.email))
                .await?
                .map(|user| user.id);
        }

        let booking = bounded(self.store_timeout, self.bookings.insert(booking)).await?;
        tracing::info!(
            booking_id = %booking.id,
            room_id = ?booking.room_id,
            status = %booking.status,
            guest_booking = booking.user_id.is_none(),
            "Booking created"
        );
        Ok(booking)
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> CoreResult<()> {
        caller.require_any(&[Role::Management, Role::Admin])?;

        if !bounded(self.store_timeout, self.bookings.delete(id)).await? {
            return Err(CoreError::NotFound(format!("Booking {}", id)));
        }
        tracing::info!(booking_id = %id, by = %caller.email, "Booking deleted");
        Ok(())
    }
}
