use std::path::Path;

use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::session;
use crate::state::AppState;

/// Build the axum router with all Parley endpoints.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/login/:user", post(handler::login_handler))
        .route("/getid", get(handler::getid_handler))
        .route("/logout", post(handler::logout_handler))
        .route("/chat", get(session::chat_handler))
        .route("/exit", post(handler::exit_handler))
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
