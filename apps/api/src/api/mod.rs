// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod handlers;

use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::agents::Orchestrator;
use crate::domain::repositories::TaskRepository;

pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self' 'unsafe-inline'";

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub tasks: Arc<dyn TaskRepository>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, tasks: Arc<dyn TaskRepository>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            tasks,
        }
    }
}

/// Builds the HTTP router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(handlers::health::health_check))
        .route("/orchestrate", post(handlers::orchestrate::orchestrate))
        .route("/api/tasks", get(handlers::tasks::recent_tasks))
        .route("/api/tasks/:id", get(handlers::tasks::get_task))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ))
        .with_state(state)
}
