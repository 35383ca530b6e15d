use parley_types::{Offset, UserId};

use crate::relay::SubscriberId;
use crate::sink::SinkError;

/// Errors produced by the relay.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// An upstream-assigned offset did not advance past the last one ingested.
    #[error("protocol violation: offset {offset} does not follow last ingested offset {last}")]
    ProtocolViolation { offset: Offset, last: Offset },

    /// The handle does not name a registered subscriber of this relay.
    #[error("subscriber {0} is not registered")]
    UnknownSubscriber(SubscriberId),

    /// The sink rejected a backlog entry during registration.
    #[error("backlog replay to {user} failed: {source}")]
    ReplayFailed { user: UserId, source: SinkError },

    /// Backlog capacity must be at least one message.
    #[error("backlog capacity must be non-zero")]
    ZeroCapacity,
}

/// Convenience alias used throughout the relay crate.
pub type RelayResult<T> = std::result::Result<T, RelayError>;
