use std::sync::Arc;
use std::time::Duration;

use guesthub_core::auth::AuthService;
use guesthub_core::booking::BookingRules;
use guesthub_core::bookings::BookingService;
use guesthub_core::repository::Repositories;
use guesthub_core::rooms::RoomService;
use guesthub_core::token::TokenService;
use guesthub_store::app_config::Config;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub rooms: Arc<RoomService>,
    pub bookings: Arc<BookingService>,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        auth: AuthConfig,
        booking_rules: BookingRules,
        store_timeout: Duration,
    ) -> Self {
        let tokens = TokenService::new(&auth.secret, auth.expiration);

        Self {
            auth: Arc::new(AuthService::new(Arc::clone(&repos.users), tokens, store_timeout)),
            rooms: Arc::new(RoomService::new(&repos, store_timeout)),
            bookings: Arc::new(BookingService::new(&repos, booking_rules, store_timeout)),
        }
    }

    pub fn from_config(repos: Repositories, config: &Config) -> Self {
        Self::new(
            repos,
            AuthConfig {
                secret: config.auth.jwt_secret.clone(),
                expiration: config.auth.jwt_expiration_seconds,
            },
            config.bookings.rules(),
            config.database.call_timeout(),
        )
    }
}
