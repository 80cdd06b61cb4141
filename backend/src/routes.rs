use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::handlers::{events, health, missing_id, tasks};
use crate::realtime::socket_handler;
use crate::state::AppState;

/// Task and event routes; every one of them requires a bearer token.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Task routes
        .route(
            "/tasks",
            get(tasks::list_tasks)
                .post(tasks::create_task)
                .put(missing_id)
                .delete(missing_id),
        )
        .route(
            "/tasks/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        // Event routes
        .route(
            "/events",
            get(events::list_events)
                .post(events::create_event)
                .put(missing_id)
                .delete(missing_id),
        )
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

/// The whole application: health check, realtime socket and the API.
pub fn create_app(state: AppState, cors_allowed_origins: Option<&[String]>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/socket", get(socket_handler))
        .merge(api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_allowed_origins))
        .with_state(state)
}

/// Build CORS layer from the configured origins.
///
/// Without a list (or with a list that parses to nothing) CORS is permissive,
/// which is only meant for development.
fn build_cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .unwrap_or_default()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            "CORS_ALLOWED_ORIGINS not set or empty, using permissive CORS (not recommended for production)"
        );
        return CorsLayer::permissive();
    }

    tracing::info!("CORS configured for origins: {:?}", origins);
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
