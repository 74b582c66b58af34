use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::identity::{Caller, Role};
use crate::repository::{bounded, BookingRepository, Page, Repositories, RoomRepository};
use crate::room::{Room, RoomPayload};
use crate::{CoreError, CoreResult};

const ROOM_EDITORS: [Role; 2] = [Role::Management, Role::Admin];

pub struct RoomService {
    rooms: Arc<dyn RoomRepository>,
    bookings: Arc<dyn BookingRepository>,
    store_timeout: Duration,
}

impl RoomService {
    pub fn new(repos: &Repositories, store_timeout: Duration) -> Self {
        Self {
            rooms: Arc::clone(&repos.rooms),
            bookings: Arc::clone(&repos.bookings),
            store_timeout,
        }
    }

    pub async fn list(&self, page: Page) -> CoreResult<Vec<Room>> {
        bounded(self.store_timeout, self.rooms.list(page)).await
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<Room> {
        bounded(self.store_timeout, self.rooms.get(id))
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, caller: &Caller, payload: RoomPayload) -> CoreResult<Room> {
        caller.require_any(&ROOM_EDITORS)?;
        let fields = payload.validate()?;

        let room = bounded(self.store_timeout, self.rooms.insert(fields)).await?;
        tracing::info!(room_id = %room.id, number = %room.number, by = %caller.email, "Room created");
        Ok(room)
    }

    /// Replace all mutable fields of a room.
    pub async fn update(&self, caller: &Caller, id: Uuid, payload: RoomPayload) -> CoreResult<Room> {
        caller.require_any(&ROOM_EDITORS)?;
        let fields = payload.validate()?;

        let room = bounded(self.store_timeout, self.rooms.update(id, fields))
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!(room_id = %room.id, by = %caller.email, "Room updated");
        Ok(room)
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> CoreResult<()> {
        caller.require_any(&[Role::Admin])?;

        if !bounded(self.store_timeout, self.rooms.delete(id)).await? {
            return Err(not_found(id));
        }
        // Bookings only look rooms up; they outlive the room they named.
        let detached = bounded(self.store_timeout, self.bookings.detach_room(id)).await?;
        tracing::info!(room_id = %id, detached, by = %caller.email, "Room deleted");
        Ok(())
    }
}

fn not_found(id: Uuid) -> CoreError {
    CoreError::NotFound(format!("Room {}", id))
}
