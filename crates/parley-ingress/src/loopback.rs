use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use parley_types::{Offset, UserId};

use crate::error::{IngressError, IngressResult};
use crate::event::IngressEvent;
use crate::traits::{ChatWriter, EventIngress};

/// Build a connected loopback pair for standalone operation.
///
/// The writer assigns dense offsets starting at 1; the ingress yields the
/// posts in that order. `depth` bounds how many posts may be queued ahead of
/// the pump.
pub fn loopback(depth: usize) -> (LoopbackWriter, LoopbackIngress) {
    let (tx, rx) = mpsc::channel(depth.max(1));
    let open = Arc::new(AtomicBool::new(true));
    let writer = LoopbackWriter {
        sequencer: Mutex::new(Sequencer {
            last: Offset::ZERO,
            tx,
        }),
    };
    let ingress = LoopbackIngress { rx, open };
    (writer, ingress)
}

struct Sequencer {
    last: Offset,
    tx: mpsc::Sender<IngressEvent>,
}

/// Posting side of the loopback log.
pub struct LoopbackWriter {
    sequencer: Mutex<Sequencer>,
}

#[async_trait]
impl ChatWriter for LoopbackWriter {
    async fn post(&self, sender: UserId, content: &str) -> IngressResult<()> {
        // Held across the send so offsets enter the channel in order.
        let mut seq = self.sequencer.lock().await;
        let offset = seq.last.next();
        let event = IngressEvent::Put {
            sender,
            value: content.as_bytes().to_vec(),
            offset,
        };
        seq.tx
            .send(event)
            .await
            .map_err(|_| IngressError::Disconnected)?;
        seq.last = offset;
        debug!(%offset, %sender, "loopback post");
        Ok(())
    }
}

/// Reading side of the loopback log.
pub struct LoopbackIngress {
    rx: mpsc::Receiver<IngressEvent>,
    open: Arc<AtomicBool>,
}

#[async_trait]
impl EventIngress for LoopbackIngress {
    async fn next_event(&mut self) -> IngressResult<Option<IngressEvent>> {
        let event = self.rx.recv().await;
        if event.is_none() {
            self.open.store(false, Ordering::Release);
        }
        Ok(event)
    }

    fn is_connected(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}
