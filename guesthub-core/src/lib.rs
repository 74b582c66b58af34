pub mod identity;
pub mod user;
pub mod room;
pub mod booking;
pub mod repository;
pub mod memory;
pub mod token;
pub mod auth;
pub mod rooms;
pub mod bookings;

use std::time::Duration;

use repository::StoreError;

pub use identity::{Caller, Role};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token has expired")]
    ExpiredToken,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Store call exceeded {0:?}")]
    StoreTimeout(Duration),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
