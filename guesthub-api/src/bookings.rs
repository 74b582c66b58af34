use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use guesthub_core::booking::{Booking, BookingPayload};
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{AppJson, AppPath},
    middleware::{AuthUser, MaybeAuthUser},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", get(list_bookings).post(create_booking))
        .route("/api/bookings/{id}", delete(delete_booking))
}

async fn list_bookings(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.bookings.list_for_caller(&caller).await?))
}

/// Open to anonymous callers; a valid token links the booking to the account.
async fn create_booking(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    AppJson(payload): AppJson<BookingPayload>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.bookings.create(caller.as_ref(), payload).await?;
    Ok(Json(booking))
}

async fn delete_booking(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.bookings.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
