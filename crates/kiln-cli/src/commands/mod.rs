//! CLI command implementations

pub mod check_config;
pub mod run;
