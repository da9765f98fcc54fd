//! Clarity - expense journaling with mood tagging
//!
//! Library interface: the HTTP API with its token-based session handling,
//! the storage backends, and a client that keeps a session alive.

pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod expenses;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
