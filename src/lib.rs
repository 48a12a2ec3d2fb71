pub mod cache;
pub mod clock;
pub mod config;
pub mod duration;
pub mod holdings;
pub mod models;
pub mod prices;
