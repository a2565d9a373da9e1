pub mod attendance;
pub mod auth;
pub mod export;
pub mod posts;
pub mod units;
pub mod users;
