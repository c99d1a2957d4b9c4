pub mod config;
pub mod constants;
pub mod env_profile;
pub mod error;
pub mod logger;
pub mod utils;
