use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use guesthub_core::repository::{Page, RoomRepository, StoreResult};
use guesthub_core::room::{Room, RoomFields};

use crate::database::store_error;

pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RoomRow {
    id: Uuid,
    number: String,
    room_type: String,
    price_per_night: f64,
    capacity: i32,
    status: String,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            number: row.number,
            room_type: row.room_type,
            price_per_night: row.price_per_night,
            capacity: row.capacity,
            status: row.status,
        }
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn list(&self, page: Page) -> StoreResult<Vec<Room>> {
        // LIMIT NULL means no limit in Postgres.
        let rows = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT id, number, room_type, price_per_night, capacity, status
            FROM rooms
            ORDER BY created_at, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit.map(i64::from))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(Room::from).collect())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Room>> {
        let row = sqlx::query_as::<_, RoomRow>(
            "SELECT id, number, room_type, price_per_night, capacity, status FROM rooms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Room::from))
    }

    async fn insert(&self, fields: RoomFields) -> StoreResult<Room> {
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            INSERT INTO rooms (id, number, room_type, price_per_night, capacity, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, number, room_type, price_per_night, capacity, status
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&fields.number)
        .bind(&fields.room_type)
        .bind(fields.price_per_night)
        .bind(fields.capacity)
        .bind(&fields.status)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(Room::from(row))
    }

    async fn update(&self, id: Uuid, fields: RoomFields) -> StoreResult<Option<Room>> {
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            UPDATE rooms
            SET number = $2, room_type = $3, price_per_night = $4, capacity = $5, status = $6
            WHERE id = $1
            RETURNING id, number, room_type, price_per_night, capacity, status
            "#,
        )
        .bind(id)
        .bind(&fields.number)
        .bind(&fields.room_type)
        .bind(fields.price_per_night)
        .bind(fields.capacity)
        .bind(&fields.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Room::from))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }
}
