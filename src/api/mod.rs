//! HTTP API server

pub mod cookies;
pub mod expenses;
pub mod routes;
pub mod server;

pub use server::*;
