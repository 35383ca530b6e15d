use axum::extract::{Path, State};
use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use parley_types::UserId;

use crate::auth::{self, presented_token};
use crate::state::AppState;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub ingress: String,
    pub connected: bool,
}

/// Health check handler.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let ingress = if state.ingress.running() { "running" } else { "stopped" };
    Json(HealthResponse {
        status: "ok".into(),
        ingress: ingress.into(),
        connected: state.ingress.connected(),
    })
}

/// Info handler.
pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "parley-server",
        "version": env!("CARGO_PKG_VERSION"),
        "last_offset": state.relay.last_offset().get(),
        "subscribers": state.relay.subscriber_count(),
        "backlog_capacity": state.relay.capacity(),
        "retained": state.relay.retained_range().map(|(oldest, newest)| {
            json!({ "oldest": oldest.get(), "newest": newest.get() })
        }),
        "public_key": state.authority.verifying_key().to_hex(),
    }))
}

/// `POST /login/{uuid}`: bind the identity to a fresh token cookie.
pub async fn login_handler(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    let Ok(user) = raw.parse::<UserId>() else {
        return (StatusCode::BAD_REQUEST, [(CONTENT_TYPE, TEXT_PLAIN)], "Required UUID").into_response();
    };
    let token = state.authority.issue(user);
    info!(%user, "login");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, TEXT_PLAIN.to_string()),
            (SET_COOKIE, auth::set_cookie(&token, state.authority.ttl())),
        ],
        user.to_string(),
    )
        .into_response()
}

/// `GET /getid`: report the identity and refresh the token.
pub async fn getid_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let verified = presented_token(&headers).map(|t| state.authority.verify(t));
    match verified {
        Some(Ok(user)) => {
            let token = state.authority.issue(user);
            (
                StatusCode::OK,
                [
                    (CONTENT_TYPE, TEXT_PLAIN.to_string()),
                    (SET_COOKIE, auth::set_cookie(&token, state.authority.ttl())),
                ],
                user.to_string(),
            )
                .into_response()
        }
        _ => (StatusCode::FORBIDDEN, [(CONTENT_TYPE, TEXT_PLAIN)], "Not logged in").into_response(),
    }
}

/// `POST /logout`
pub async fn logout_handler() -> Response {
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, TEXT_PLAIN.to_string()),
            (SET_COOKIE, auth::clear_cookie()),
        ],
        "logged out",
    )
        .into_response()
}

/// `POST /exit`: request a graceful shutdown, when enabled.
pub async fn exit_handler(State(state): State<AppState>) -> Response {
    if !state.allow_remote_exit {
        warn!("remote exit requested but disabled");
        return StatusCode::NOT_FOUND.into_response();
    }
    info!("remote exit requested");
    state.shutdown.notify_one();
    (StatusCode::OK, [(CONTENT_TYPE, TEXT_PLAIN)], "shutting down").into_response()
}
