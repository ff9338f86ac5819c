pub mod config;
pub mod iso8601;
pub mod state;
