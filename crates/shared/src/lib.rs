pub mod config;
mod config_env;
pub mod dashboard;
pub mod posts;
pub mod retry;
