use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info};

use parley_relay::{Relay, RelayError};
use parley_types::Offset;

use crate::error::{IngressError, IngressResult};
use crate::event::IngressEvent;
use crate::traits::EventIngress;

/// Liveness of a running pump and the connectivity its ingress reports.
#[derive(Debug, Default)]
pub struct IngressHealth {
    running: AtomicBool,
    connected: AtomicBool,
}

impl IngressHealth {
    /// Health for a pump about to be spawned: running, not yet observed.
    pub fn starting() -> Self {
        Self {
            running: AtomicBool::new(true),
            connected: AtomicBool::new(false),
        }
    }

    /// Whether the pump is still consuming events.
    pub fn running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Whether the ingress last reported itself attached to its upstream.
    pub fn connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn observe<I: EventIngress>(&self, ingress: &I) {
        self.connected.store(ingress.is_connected(), Ordering::Release);
    }
}

/// Move events from `ingress` into `relay` until the source ends.
///
/// Every event, whatever its kind, must carry an offset above the previous
/// one. Topic creation is skipped (its offset simply leaves a gap). A
/// destroyed topic, a deleted key, non-UTF-8 content or a non-advancing
/// offset is a protocol violation: the pump logs it and stops.
pub async fn pump<I>(
    mut ingress: I,
    relay: Arc<Relay>,
    health: Arc<IngressHealth>,
) -> IngressResult<()>
where
    I: EventIngress,
{
    let mut delivered = 0u64;
    let mut watermark = relay.last_offset();
    health.running.store(true, Ordering::Release);
    health.observe(&ingress);
    let result = loop {
        let next = ingress.next_event().await;
        health.observe(&ingress);
        let event = match next {
            Ok(Some(event)) => event,
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        };
        if let Err(e) = advance(&mut watermark, &event) {
            break Err(e);
        }
        match apply(&relay, event) {
            Ok(true) => delivered += 1,
            Ok(false) => {}
            Err(e) => break Err(e),
        }
    };
    health.running.store(false, Ordering::Release);

    match &result {
        Ok(()) => info!(delivered, "ingress ended"),
        Err(e) if e.is_protocol_violation() => error!(error = %e, delivered, "ingress stopped"),
        Err(e) => error!(error = %e, delivered, "ingress failed"),
    }
    result
}

fn advance(watermark: &mut Offset, event: &IngressEvent) -> IngressResult<()> {
    let offset = event.offset();
    if offset <= *watermark {
        return Err(IngressError::ProtocolViolation(format!(
            "{} at offset {offset} does not follow offset {watermark}",
            event.kind_name()
        )));
    }
    *watermark = offset;
    Ok(())
}

fn apply(relay: &Relay, event: IngressEvent) -> IngressResult<bool> {
    match event {
        IngressEvent::Put {
            sender,
            value,
            offset,
        } => {
            let content = String::from_utf8(value).map_err(|_| {
                IngressError::ProtocolViolation(format!("non-UTF-8 content at offset {offset}"))
            })?;
            relay
                .ingest_at(sender, content, offset)
                .map_err(|e: RelayError| IngressError::ProtocolViolation(e.to_string()))?;
            Ok(true)
        }
        IngressEvent::TopicCreated { offset } => {
            debug!(%offset, "topic created");
            Ok(false)
        }
        other => Err(IngressError::ProtocolViolation(format!(
            "{} at offset {} on chat topic",
            other.kind_name(),
            other.offset()
        ))),
    }
}
