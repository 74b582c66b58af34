use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use guesthub_core::{auth::AuthSession, user::UserProfile};
use guesthub_shared::Masked;
use serde::Deserialize;

use crate::{error::AppError, extract::AppJson, middleware::AuthUser, state::AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: Masked<String>,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: Masked<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<Json<AuthSession>, AppError> {
    let session = state
        .auth
        .register(&req.email, req.password.expose(), &req.name, &req.role)
        .await?;
    Ok(Json(session))
}

async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthSession>, AppError> {
    let session = state.auth.login(&req.email, req.password.expose()).await?;
    Ok(Json(session))
}

async fn me(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.auth.current_user(&caller).await?))
}
