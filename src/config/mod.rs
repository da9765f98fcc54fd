//! Configuration management for Clarity

pub mod loader;
mod schema;

pub use loader::{config_from_env, load_config, load_config_from_path};
pub use schema::*;
