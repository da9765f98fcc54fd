//! Authentication and session management

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod rate_limit;
pub mod service;

pub use jwt::{Claims, TokenError, TokenIssuer, TokenKind};
pub use middleware::{bearer_token, cookie_value, AuthUser};
pub use models::{
    AuthResponse, Goal, LoginRequest, PublicUser, SignupRequest, UpdateProfileRequest, User,
};
pub use password::PasswordHasher;
pub use rate_limit::LoginLimiter;
pub use service::{AuthService, LoginOutcome};
