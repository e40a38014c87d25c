//! Route table and service wiring.
//!
//! `build_app` turns a PostgreSQL storage and the auth configuration
//! into the full application router; `build_router` only assembles the
//! route table from prepared endpoint states and exists so tests can
//! wire in-memory state without a database.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use tokensmith_auth::storage::{
    AccessTokenStorage, AuthorizationCodeStorage, ClientStorage, RefreshTokenStorage,
};
use tokensmith_auth::{
    AuthConfig, AuthenticateState, AuthorizationService, AuthorizeState, CodeLedger,
    IdentityProvider, TokenLedger, TokenService, TokenState, authenticate_handler,
    authorize_handler, token_handler,
};
use tokensmith_auth_postgres::PostgresAuthStorage;
use tower_http::trace::TraceLayer;

/// Builds the application router on top of PostgreSQL storage.
pub fn build_app(storage: &PostgresAuthStorage, auth_config: AuthConfig) -> Router {
    let client_storage: Arc<dyn ClientStorage> = Arc::new(storage.client_storage());
    let code_storage: Arc<dyn AuthorizationCodeStorage> = Arc::new(storage.code_storage());
    let access_tokens: Arc<dyn AccessTokenStorage> = Arc::new(storage.access_token_storage());
    let refresh_tokens: Arc<dyn RefreshTokenStorage> = Arc::new(storage.refresh_token_storage());
    let identity: Arc<dyn IdentityProvider> = Arc::new(storage.identity_provider());

    let codes = Arc::new(CodeLedger::new(
        code_storage,
        auth_config.authorization_code_lifetime,
    ));
    let tokens = Arc::new(TokenLedger::new(
        access_tokens,
        refresh_tokens,
        auth_config.clone(),
    ));
    let authorization_service = Arc::new(AuthorizationService::new(
        Arc::clone(&client_storage),
        Arc::clone(&identity),
        Arc::clone(&codes),
    ));
    let token_service = Arc::new(TokenService::new(
        codes,
        tokens,
        Arc::clone(&identity),
        auth_config,
    ));

    build_router(
        AuthorizeState::new(authorization_service, Arc::clone(&token_service)),
        TokenState::new(Arc::clone(&token_service), client_storage),
        AuthenticateState::new(token_service, identity),
    )
}

/// Assembles the route table. Each endpoint carries its own state, the
/// sub-routers are merged so the states stay independent.
pub fn build_router(
    authorize_state: AuthorizeState,
    token_state: TokenState,
    authenticate_state: AuthenticateState,
) -> Router {
    let authorize_routes = Router::new()
        .route("/oauth/authorize", get(authorize_handler))
        .with_state(authorize_state);

    let token_routes = Router::new()
        .route("/token", post(token_handler))
        .with_state(token_state);

    let authenticate_routes = Router::new()
        .route("/authenticate", get(authenticate_handler))
        .with_state(authenticate_state);

    Router::new()
        .route("/healthz", get(healthz))
        .merge(authorize_routes)
        .merge(token_routes)
        .merge(authenticate_routes)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
