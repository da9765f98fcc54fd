//! Client session bootstrapper

pub mod api_client;
pub mod session;

pub use api_client::ApiClient;
pub use session::{SessionContext, SessionState};
