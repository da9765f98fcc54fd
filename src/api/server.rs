//! HTTP API server

use axum::{
    extract::{FromRef, Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::rate_limit::client_key;
use crate::auth::{AuthService, LoginLimiter};
use crate::config::{Config, ServerConfig};
use crate::error::{Error, Result};
use crate::store::{self, SharedStore};

use super::{expenses, routes};

/// Prefix every API route is mounted under
pub const API_PREFIX: &str = "/api/v1";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthService>,
    pub store: SharedStore,
    pub limiter: LoginLimiter,
}

impl AppState {
    /// Wire up state over an already opened store
    pub fn new(config: Config, store: SharedStore) -> Result<Self> {
        config.validate()?;
        let auth = AuthService::new(&config.auth, store.clone())?.shared();
        let limiter = LoginLimiter::new(config.auth.login_max_attempts, config.auth.login_window());

        Ok(Self {
            config: Arc::new(config),
            auth,
            store,
            limiter,
        })
    }

    /// Open the configured store and wire up state
    pub async fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let store = store::open_store(&config.database).await?;
        Self::new(config, store)
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let state = AppState::from_config(config).await?;

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    serve(listener, state).await
}

/// Serve the API on an already bound listener
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let app = create_router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server);

    let api = Router::new()
        .route("/health", get(routes::health))
        // Auth routes
        .route("/signup", post(routes::signup))
        .route(
            "/login",
            post(routes::login).layer(middleware::from_fn_with_state(
                state.clone(),
                login_rate_limit,
            )),
        )
        .route("/logout", get(routes::logout))
        .route("/refresh-token", get(routes::refresh_token))
        .route("/update-income-goal", patch(routes::update_income_goal))
        // Expense routes
        .route(
            "/expenses",
            get(expenses::list_expenses).post(expenses::create_expense),
        )
        .route("/expenses/insights", get(expenses::insights))
        .route("/expenses/{id}", delete(expenses::delete_expense));

    Router::new()
        .nest(API_PREFIX, api)
        .fallback(routes::not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Reject login attempts over the configured rate before credentials are checked
async fn login_rate_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> std::result::Result<Response, Error> {
    let key = client_key(&req);
    if !state.limiter.check(&key).await {
        tracing::warn!(client = %key, "Login rate limit exceeded");
        return Err(Error::TooManyRequests);
    }
    Ok(next.run(req).await)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    // Credentials are needed for the refresh cookie
    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CACHE_CONTROL,
        ])
}
