pub mod common;

pub use common::config::Config;
pub use common::constants::{Contract, Network};
pub use common::env_profile::{EnvProfile, EnvVars, RunMode};
pub use common::error::ConfigError;
pub use common::utils::parse_comma_list;
