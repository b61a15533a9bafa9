pub mod config;
pub mod constants;
pub mod operations;
pub mod schedule;
pub mod services;
pub mod types;
