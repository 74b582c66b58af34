use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{Booking, NewBooking};
use crate::room::{Room, RoomFields};
use crate::user::{NewUser, User};
use crate::{CoreError, CoreResult};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Window over a listing. `limit: None` means no upper bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<u32>,
    pub offset: u32,
}

impl Page {
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skipped = items.into_iter().skip(self.offset as usize);
        match self.limit {
            Some(limit) => skipped.take(limit as usize).collect(),
            None => skipped.collect(),
        }
    }
}

/// Repository trait for user credential access
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Fails with `StoreError::Conflict` when the email is already taken.
    async fn insert(&self, user: NewUser) -> StoreResult<User>;
}

/// Repository trait for room inventory access
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn list(&self, page: Page) -> StoreResult<Vec<Room>>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<Room>>;

    async fn insert(&self, fields: RoomFields) -> StoreResult<Room>;

    /// Returns `None` when no room has `id`.
    async fn update(&self, id: Uuid, fields: RoomFields) -> StoreResult<Option<Room>>;

    /// Returns whether a room was removed.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// Repository trait for booking access
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn list_all(&self) -> StoreResult<Vec<Booking>>;

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Booking>>;

    async fn insert(&self, booking: NewBooking) -> StoreResult<Booking>;

    /// Clear the room reference on every booking for `room_id`.
    /// Returns how many bookings were touched.
    async fn detach_room(&self, room_id: Uuid) -> StoreResult<u64>;

    /// Returns whether a booking was removed.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// The three stores a running service needs, behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub rooms: Arc<dyn RoomRepository>,
    pub bookings: Arc<dyn BookingRepository>,
}

/// Await a store call for at most `deadline`.
pub async fn bounded<T, F>(deadline: Duration, call: F) -> CoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result.map_err(CoreError::from),
        Err(_) => {
            tracing::warn!(?deadline, "store call timed out");
            Err(CoreError::StoreTimeout(deadline))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_skips_then_limits() {
        let page = Page {
            limit: Some(2),
            offset: 1,
        };
        assert_eq!(page.apply(1..=5), vec![2, 3]);
        assert_eq!(Page::default().apply(1..=3), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn bounded_reports_timeout() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, StoreError>(1)
        };
        let result = bounded(Duration::from_millis(10), slow).await;
        assert!(matches!(result, Err(CoreError::StoreTimeout(_))));
    }

    #[tokio::test]
    async fn bounded_passes_store_errors_through() {
        let failing = async { Err::<(), _>(StoreError::Conflict("email".to_string())) };
        let result = bounded(Duration::from_secs(1), failing).await;
        assert!(matches!(
            result,
            Err(CoreError::Store(StoreError::Conflict(_)))
        ));
    }
}
