use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use guesthub_core::{
    repository::Page,
    room::{Room, RoomPayload},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    middleware::AuthUser,
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListRoomsQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<ListRoomsQuery> for Page {
    fn from(query: ListRoomsQuery) -> Self {
        Page {
            limit: query.limit,
            offset: query.offset.unwrap_or(0),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/rooms", get(list_rooms).post(create_room))
        .route(
            "/api/rooms/{id}",
            get(get_room).put(update_room).delete(delete_room),
        )
}

async fn list_rooms(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListRoomsQuery>,
) -> Result<Json<Vec<Room>>, AppError> {
    Ok(Json(state.rooms.list(query.into()).await?))
}

async fn get_room(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Room>, AppError> {
    Ok(Json(state.rooms.get(id).await?))
}

async fn create_room(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppJson(payload): AppJson<RoomPayload>,
) -> Result<Json<Room>, AppError> {
    Ok(Json(state.rooms.create(&caller, payload).await?))
}

async fn update_room(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<RoomPayload>,
) -> Result<Json<Room>, AppError> {
    Ok(Json(state.rooms.update(&caller, id, payload).await?))
}

async fn delete_room(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.rooms.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
