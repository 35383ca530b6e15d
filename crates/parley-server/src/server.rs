use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use parley_ingress::{
    loopback, pump, ChatWriter, EventIngress, IngressResult, RemoteIngress, RemoteWriter,
};
use parley_relay::{Relay, RelayConfig};
use parley_types::Offset;

use crate::auth::Authority;
use crate::config::{IngressMode, ServerConfig};
use crate::error::ServerResult;
use crate::router::build_router;
use crate::state::AppState;

/// Parley chat server: relay, ingress pump, and HTTP surface.
pub struct ParleyServer {
    config: ServerConfig,
    state: AppState,
    pump: JoinHandle<IngressResult<()>>,
}

impl ParleyServer {
    /// Build the relay, connect the ingress, and start the pump.
    ///
    /// Must be called inside a Tokio runtime.
    pub async fn start(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let relay = Arc::new(Relay::new(RelayConfig {
            backlog_capacity: config.backlog_capacity,
        })?);
        let authority = Authority::new(
            config.signing_key()?,
            Duration::from_millis(config.token_ttl_ms),
        );

        match config.ingress.clone() {
            IngressMode::Local => {
                info!("using local loopback log");
                let (writer, ingress) = loopback(config.sink_queue_depth);
                Ok(Self::assemble(config, relay, Arc::new(writer), authority, ingress))
            }
            IngressMode::Remote { addr, topic } => {
                let writer = RemoteWriter::connect(addr, &topic).await?;
                let ingress = RemoteIngress::connect(addr, &topic, Offset::ZERO).await?;
                Ok(Self::assemble(config, relay, Arc::new(writer), authority, ingress))
            }
        }
    }

    fn assemble<I>(
        config: ServerConfig,
        relay: Arc<Relay>,
        writer: Arc<dyn ChatWriter>,
        authority: Authority,
        ingress: I,
    ) -> Self
    where
        I: EventIngress + 'static,
    {
        let state = AppState::new(
            Arc::clone(&relay),
            writer,
            authority,
            config.sink_queue_depth,
            config.allow_remote_exit,
        );
        let pump_task = tokio::spawn(pump(ingress, relay, Arc::clone(&state.ingress)));
        Self {
            config,
            state,
            pump: pump_task,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), self.config.static_dir.as_deref())
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn serve(self) -> ServerResult<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_on(listener).await
    }

    /// Serve on an already-bound listener until `POST /exit` or Ctrl-C.
    pub async fn serve_on(self, listener: TcpListener) -> ServerResult<()> {
        let addr = listener.local_addr()?;
        let app = self.router();
        let shutdown = Arc::clone(&self.state.shutdown);
        info!(%addr, "parley server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.notified() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            })
            .await?;
        self.pump.abort();
        info!("parley server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn server_construction() {
        let server = ParleyServer::start(ServerConfig::default()).await.unwrap();
        assert_eq!(server.config().bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(server.state().relay.capacity(), 10);
        assert_eq!(server.state().relay.last_offset(), Offset::ZERO);
    }

    #[tokio::test]
    async fn invalid_config_refused() {
        let config = ServerConfig {
            sink_queue_depth: 0,
            ..Default::default()
        };
        assert!(ParleyServer::start(config).await.is_err());
    }

    #[tokio::test]
    async fn posts_flow_through_loopback() {
        let server = ParleyServer::start(ServerConfig::default()).await.unwrap();
        let state = server.state().clone();
        let user = parley_types::UserId::random();
        state.writer.post(user, "hello").await.unwrap();

        for _ in 0..100 {
            if state.relay.last_offset() == Offset::new(1) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let backlog = state.relay.backlog();
        assert!(state.ingress.running());
        assert!(state.ingress.connected());
        assert_eq!(backlog.len(), 1);
        assert_eq!(backlog[0].sender, user);
        assert_eq!(backlog[0].content, "hello");
    }
}
