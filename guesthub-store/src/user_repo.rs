use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use guesthub_core::repository::{StoreError, StoreResult, UserRepository};
use guesthub_core::user::{NewUser, User};

use crate::database::store_error;

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    name: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse().map_err(StoreError::backend)?;
        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            role,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, name, role, created_at";

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(User::try_from).transpose()
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, name, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        User::try_from(row)
    }
}
