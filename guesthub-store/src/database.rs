use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

use guesthub_core::repository::{Repositories, StoreError};

use crate::{PgBookingRepository, PgRoomRepository, PgUserRepository};

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Postgres-backed stores sharing this client's pool.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(PgUserRepository::new(self.pool.clone())),
            rooms: Arc::new(PgRoomRepository::new(self.pool.clone())),
            bookings: Arc::new(PgBookingRepository::new(self.pool.clone())),
        }
    }
}

/// Translate a driver error, turning unique-index violations into `Conflict`.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(db_err.message().to_string());
        }
    }
    StoreError::backend(err)
}
