use std::sync::Arc;

use tokio::sync::Notify;

use parley_ingress::{ChatWriter, IngressHealth};
use parley_relay::Relay;

use crate::auth::Authority;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub writer: Arc<dyn ChatWriter>,
    pub authority: Arc<Authority>,
    pub sink_queue_depth: usize,
    pub allow_remote_exit: bool,
    pub shutdown: Arc<Notify>,
    pub ingress: Arc<IngressHealth>,
}

impl AppState {
    pub fn new(
        relay: Arc<Relay>,
        writer: Arc<dyn ChatWriter>,
        authority: Authority,
        sink_queue_depth: usize,
        allow_remote_exit: bool,
    ) -> Self {
        Self {
            relay,
            writer,
            authority: Arc::new(authority),
            sink_queue_depth,
            allow_remote_exit,
            shutdown: Arc::new(Notify::new()),
            ingress: Arc::new(IngressHealth::starting()),
        }
    }
}
