//! Route handlers for the HTTP API.

pub mod admin;
pub mod agents;
pub mod auth;
pub mod chat;
pub mod credits;
pub mod health;
pub mod models;
pub mod sessions;


use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    let api = Router::new()
        // Service info
        .route("/", get(health::root))
        .route("/health", get(health::health))
        // Accounts
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/credits", get(credits::credits))
        // Chat
        .route("/models", get(models::list_models))
        .route("/chat", post(chat::chat))
        .route(
            "/chat/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route(
            "/chat/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        // Agent task records
        .route(
            "/agents/tasks",
            get(agents::list_tasks).post(agents::create_task),
        )
        .route("/agents/tasks/:id", get(agents::get_task))
        // Admin
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id/credits", post(admin::adjust_credits));

    Router::new().nest("/api", api)
}

/// The full application: routes, state, CORS and request tracing.
pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    router()
        .with_state(state)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}
