//! In-process stores backed by `RwLock`ed vectors.
//!
//! Used by the `memory` backend and by tests. Insertion order is listing order.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::booking::{Booking, NewBooking};
use crate::repository::{
    BookingRepository, Page, Repositories, RoomRepository, StoreError, StoreResult,
    UserRepository,
};
use crate::room::{Room, RoomFields};
use crate::user::{NewUser, User};

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        // The uniqueness check and the push happen under one write guard.
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email already exists".to_string()));
        }
        let stored = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            role: user.role,
            created_at: Utc::now(),
        };
        users.push(stored.clone());
        Ok(stored)
    }
}

#[derive(Default)]
pub struct MemoryRoomRepository {
    rooms: RwLock<Vec<Room>>,
}

#[async_trait]
impl RoomRepository for MemoryRoomRepository {
    async fn list(&self, page: Page) -> StoreResult<Vec<Room>> {
        let rooms = self.rooms.read().await;
        Ok(page.apply(rooms.iter().cloned()))
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Room>> {
        let rooms = self.rooms.read().await;
        Ok(rooms.iter().find(|r| r.id == id).cloned())
    }

    async fn insert(&self, fields: RoomFields) -> StoreResult<Room> {
        let room = Room::from_fields(Uuid::new_v4(), fields);
        self.rooms.write().await.push(room.clone());
        Ok(room)
    }

    async fn update(&self, id: Uuid, fields: RoomFields) -> StoreResult<Option<Room>> {
        let mut rooms = self.rooms.write().await;
        let Some(slot) = rooms.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        *slot = Room::from_fields(id, fields);
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut rooms = self.rooms.write().await;
        let before = rooms.len();
        rooms.retain(|r| r.id != id);
        Ok(rooms.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryBookingRepository {
    bookings: RwLock<Vec<Booking>>,
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn list_all(&self) -> StoreResult<Vec<Booking>> {
        Ok(self.bookings.read().await.clone())
    }

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .iter()
            .filter(|b| b.user_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn insert(&self, booking: NewBooking) -> StoreResult<Booking> {
        let booking = Booking::from_new(Uuid::new_v4(), booking);
        self.bookings.write().await.push(booking.clone());
        Ok(booking)
    }

    async fn detach_room(&self, room_id: Uuid) -> StoreResult<u64> {
        let mut bookings = self.bookings.write().await;
        let mut touched = 0;
        for booking in bookings.iter_mut().filter(|b| b.room_id == Some(room_id)) {
            booking.room_id = None;
            touched += 1;
        }
        Ok(touched)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut bookings = self.bookings.write().await;
        let before = bookings.len();
        bookings.retain(|b| b.id != id);
        Ok(bookings.len() != before)
    }
}

impl Repositories {
    /// Fresh, empty in-memory stores.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::default()),
            rooms: Arc::new(MemoryRoomRepository::default()),
            bookings: Arc::new(MemoryBookingRepository::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: "Test".to_string(),
            role: Role::Guest,
        }
    }

    #[tokio::test]
    async fn user_email_is_unique() {
        let repo = MemoryUserRepository::default();
        let first = repo.insert(new_user("a@b.com")).await.unwrap();
        assert_eq!(repo.find_by_email("a@b.com").await.unwrap(), Some(first));
        assert!(matches!(
            repo.insert(new_user("a@b.com")).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn room_update_and_delete_report_missing_ids() {
        let repo = MemoryRoomRepository::default();
        let fields = RoomFields {
            number: "1".to_string(),
            room_type: "single".to_string(),
            price_per_night: 50.0,
            capacity: 1,
            status: "available".to_string(),
        };
        assert_eq!(repo.update(Uuid::new_v4(), fields.clone()).await.unwrap(), None);
        assert!(!repo.delete(Uuid::new_v4()).await.unwrap());

        let room = repo.insert(fields).await.unwrap();
        assert!(repo.delete(room.id).await.unwrap());
        assert_eq!(repo.get(room.id).await.unwrap(), None);
    }
}
