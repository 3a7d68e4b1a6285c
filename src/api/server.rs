//! HTTP API server

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{require_auth, PasswordHasher, TokenService};
use crate::config::Config;
use crate::error::Result;
use crate::store::{self, SharedStore};

use super::routes;

/// Application state shared across handlers
pub struct AppState {
    pub store: SharedStore,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
}

impl AppState {
    /// Build state from a validated configuration and an opened store
    pub fn new(config: &Config, store: SharedStore) -> Self {
        Self {
            store,
            tokens: TokenService::new(&config.auth),
            hasher: PasswordHasher::new(config.auth.bcrypt_cost),
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Run the HTTP API server
pub async fn run_server(config: Config) -> Result<()> {
    config.validate()?;

    let store = store::connect(&config).await?;
    let state = Arc::new(AppState::new(&config, store));

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let protected = Router::new()
        .route("/room", post(routes::create_room))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(routes::health))
        // Account routes
        .route("/signup", post(routes::signup))
        .route("/signin", post(routes::signin))
        .route("/refresh", post(routes::refresh))
        // Room routes; `{room}` is a slug or a numeric id depending on the route
        .route("/chats/{room}", get(routes::list_chats))
        .route("/room/{room}", get(routes::get_room))
        .route("/room/{room}/elements", get(routes::list_elements))
        .merge(protected)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
