use async_trait::async_trait;
use parley_types::UserId;

use crate::error::IngressResult;
use crate::event::IngressEvent;

/// Read side of an upstream ordered log.
#[async_trait]
pub trait EventIngress: Send {
    /// Next event in log order. `Ok(None)` means the source ended cleanly.
    async fn next_event(&mut self) -> IngressResult<Option<IngressEvent>>;

    /// Whether the source still believes it is attached to its upstream.
    fn is_connected(&self) -> bool;
}

/// Write side of an upstream ordered log.
///
/// Posts come back to listeners only through the matching [`EventIngress`],
/// so every listener sees the log's single canonical order.
#[async_trait]
pub trait ChatWriter: Send + Sync {
    async fn post(&self, sender: UserId, content: &str) -> IngressResult<()>;
}
