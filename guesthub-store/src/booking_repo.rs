use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use guesthub_core::booking::{Booking, NewBooking};
use guesthub_core::repository::{BookingRepository, StoreError, StoreResult};

use crate::database::store_error;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Option<Uuid>,
    room_id: Option<Uuid>,
    full_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    room_type: Option<String>,
    number_of_guests: Option<i32>,
    special_requests: Option<String>,
    total_price: Option<f64>,
    booking_date: DateTime<Utc>,
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    status: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(StoreError::backend)?;
        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            room_id: row.room_id,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            room_type: row.room_type,
            number_of_guests: row.number_of_guests,
            special_requests: row.special_requests,
            total_price: row.total_price,
            booking_date: row.booking_date,
            check_in_date: row.check_in_date,
            check_out_date: row.check_out_date,
            status,
        })
    }
}

const BOOKING_COLUMNS: &str = "id, user_id, room_id, full_name, email, phone, room_type, \
    number_of_guests, special_requests, total_price, booking_date, check_in_date, \
    check_out_date, status";

fn into_bookings(rows: Vec<BookingRow>) -> StoreResult<Vec<Booking>> {
    rows.into_iter().map(Booking::try_from).collect()
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn list_all(&self) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings ORDER BY booking_date, id",
            BOOKING_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        into_bookings(rows)
    }

    async fn list_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY booking_date, id",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        into_bookings(rows)
    }

    async fn insert(&self, booking: NewBooking) -> StoreResult<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            INSERT INTO bookings ({})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            BOOKING_COLUMNS, BOOKING_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(booking.user_id)
        .bind(booking.room_id)
        .bind(&booking.full_name)
        .bind(&booking.email)
        .bind(&booking.phone)
        .bind(&booking.room_type)
        .bind(booking.number_of_guests)
        .bind(&booking.special_requests)
        .bind(booking.total_price)
        .bind(booking.booking_date)
        .bind(booking.check_in_date)
        .bind(booking.check_out_date)
        .bind(booking.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Booking::try_from(row)
    }

    async fn detach_room(&self, room_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE bookings SET room_id = NULL WHERE room_id = $1")
            .bind(room_id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }
}
