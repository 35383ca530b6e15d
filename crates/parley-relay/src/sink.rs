use tokio::sync::mpsc;

use parley_types::ChatMessage;

/// Why a sink refused a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// The receiving side is gone.
    #[error("sink closed")]
    Closed,
    /// The receiver is too far behind to accept more.
    #[error("sink full")]
    Full,
}

/// Output side of one subscriber.
///
/// `deliver` is called while the relay holds its lock, so implementations
/// must never block: queue the message or fail immediately. Any error closes
/// the subscriber.
pub trait MessageSink: Send + Sync {
    fn deliver(&self, message: &ChatMessage) -> Result<(), SinkError>;
}

/// Sink backed by a bounded tokio channel, drained by the connection's
/// writer task.
pub struct ChannelSink {
    sender: mpsc::Sender<ChatMessage>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<ChatMessage>) -> Self {
        Self { sender }
    }

    /// Create a sink and the receiver that drains it.
    pub fn channel(depth: usize) -> (Self, mpsc::Receiver<ChatMessage>) {
        let (tx, rx) = mpsc::channel(depth.max(1));
        (Self::new(tx), rx)
    }
}

impl MessageSink for ChannelSink {
    fn deliver(&self, message: &ChatMessage) -> Result<(), SinkError> {
        self.sender.try_send(message.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::{Offset, UserId};

    fn msg(n: u64) -> ChatMessage {
        ChatMessage::new(UserId::random(), format!("m{n}"), Offset::new(n))
    }

    #[test]
    fn delivers_into_channel() {
        let (sink, mut rx) = ChannelSink::channel(4);
        sink.deliver(&msg(1)).unwrap();
        assert_eq!(rx.try_recv().unwrap().offset, Offset::new(1));
    }

    #[test]
    fn full_channel_reports_full() {
        let (sink, _rx) = ChannelSink::channel(1);
        sink.deliver(&msg(1)).unwrap();
        assert_eq!(sink.deliver(&msg(2)), Err(SinkError::Full));
    }

    #[test]
    fn dropped_receiver_reports_closed() {
        let (sink, rx) = ChannelSink::channel(4);
        drop(rx);
        assert_eq!(sink.deliver(&msg(1)), Err(SinkError::Closed));
    }
}
