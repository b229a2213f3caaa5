pub mod config;
pub mod dashboard;
