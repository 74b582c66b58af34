pub mod app_config;
pub mod database;
pub mod user_repo;
pub mod room_repo;
pub mod booking_repo;

pub use database::DbClient;
pub use user_repo::PgUserRepository;
pub use room_repo::PgRoomRepository;
pub use booking_repo::PgBookingRepository;
