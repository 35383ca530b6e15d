//! Message relay for Parley.
//!
//! Owns the live subscriber set and a bounded, offset-ordered replay
//! backlog. Every ingested message is appended to the backlog and broadcast
//! to every active subscriber; a subscriber that reconnects with a
//! last-seen offset is first replayed what it missed, then joins the live
//! stream with no gap and no duplicate across the boundary.

pub mod backlog;
pub mod error;
pub mod relay;
pub mod sink;

pub use backlog::{Backlog, DEFAULT_BACKLOG_CAPACITY};
pub use error::{RelayError, RelayResult};
pub use relay::{Departure, Relay, RelayConfig, SubscriberHandle, SubscriberId, EVICTION_RECORDS};
pub use sink::{ChannelSink, MessageSink, SinkError};
