//! HTTP and WebSocket server for Parley.
//!
//! Wires a [`Relay`](parley_relay::Relay) to an ingress pump and exposes the
//! login endpoints, the `/chat` WebSocket, and status routes over axum.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod session;
pub mod state;

pub use auth::{Authority, TOKEN_COOKIE};
pub use config::{IngressMode, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::ParleyServer;
pub use session::{CLOSE_BAD_ARGUMENTS, CLOSE_INVALID_TOKEN, CLOSE_MISSING_TOKEN, READY};
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::header::{COOKIE, SET_COOKIE};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use parley_types::UserId;
    use tower::util::ServiceExt;

    async fn app(config: ServerConfig) -> Router {
        ParleyServer::start(config).await.unwrap().router()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn token_from_set_cookie(response: &axum::response::Response) -> String {
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        let pair = cookie.split(';').next().unwrap();
        pair.strip_prefix("BT=").unwrap().to_string()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let response = app(ServerConfig::default())
            .await
            .oneshot(Request::builder().uri("/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let health: handler::HealthResponse =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.ingress, "running");
    }

    #[tokio::test]
    async fn health_reports_loopback_connected() {
        let server = ParleyServer::start(ServerConfig::default()).await.unwrap();
        server.state().writer.post(UserId::random(), "hi").await.unwrap();
        for _ in 0..100 {
            if server.state().ingress.connected() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        let response = server
            .router()
            .oneshot(Request::builder().uri("/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let health: handler::HealthResponse =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert!(health.connected);
    }

    #[tokio::test]
    async fn info_endpoint() {
        let response = app(ServerConfig::default())
            .await
            .oneshot(Request::builder().uri("/v1/info").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let info: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(info["name"], "parley-server");
        assert_eq!(info["last_offset"], 0);
        assert_eq!(info["backlog_capacity"], 10);
        assert!(info["retained"].is_null());
        assert_eq!(info["public_key"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn login_sets_cookie() {
        let user = UserId::random();
        let response = app(ServerConfig::default())
            .await
            .oneshot(
                Request::post(format!("/login/{user}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!token_from_set_cookie(&response).is_empty());
        assert_eq!(body_text(response).await, user.to_string());
    }

    #[tokio::test]
    async fn login_rejects_bad_uuid() {
        let response = app(ServerConfig::default())
            .await
            .oneshot(Request::post("/login/not-a-uuid").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn getid_round_trip() {
        let app = app(ServerConfig::default()).await;
        let user = UserId::random();

        let login = app
            .clone()
            .oneshot(
                Request::post(format!("/login/{user}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let token = token_from_set_cookie(&login);

        let response = app
            .oneshot(
                Request::get("/getid")
                    .header(COOKIE, format!("BT={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(SET_COOKIE));
        assert_eq!(body_text(response).await, user.to_string());
    }

    #[tokio::test]
    async fn getid_without_token_forbidden() {
        let app = app(ServerConfig::default()).await;
        let response = app
            .clone()
            .oneshot(Request::get("/getid").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(
                Request::get("/getid")
                    .header(COOKIE, "BT=AAAA")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let response = app(ServerConfig::default())
            .await
            .oneshot(Request::post("/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn exit_disabled_by_default() {
        let response = app(ServerConfig::default())
            .await
            .oneshot(Request::post("/exit").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn exit_signals_shutdown() {
        let server = ParleyServer::start(ServerConfig {
            allow_remote_exit: true,
            ..Default::default()
        })
        .await
        .unwrap();
        let shutdown = server.state().shutdown.clone();
        let response = server
            .router()
            .oneshot(Request::post("/exit").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        tokio::time::timeout(std::time::Duration::from_secs(1), shutdown.notified())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn static_files_served() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>parley</h1>").unwrap();
        let response = app(ServerConfig {
            static_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        })
        .await
        .oneshot(Request::get("/index.html").body(Body::empty()).unwrap())
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<h1>parley</h1>");
    }
}
