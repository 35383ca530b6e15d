use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use parley_types::{ChatMessage, Offset, UserId};

use crate::backlog::{Backlog, DEFAULT_BACKLOG_CAPACITY};
use crate::error::{RelayError, RelayResult};
use crate::sink::MessageSink;

/// Registration-ordered identifier of a subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub:{}", self.0)
    }
}

/// Proof of one registration with a [`Relay`].
///
/// Not `Clone`: [`Relay::unsubscribe`] consumes it, so a handle cannot
/// outlive its registration cycle. Every handle must be passed to
/// `unsubscribe`, including after eviction. Dropping it instead leaves a
/// live subscriber registered, or an eviction record behind until the
/// newest [`EVICTION_RECORDS`] records push it out.
#[derive(Debug)]
#[must_use = "dropping the handle leaves the subscriber registered"]
pub struct SubscriberHandle {
    id: SubscriberId,
    user: UserId,
}

impl SubscriberHandle {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn user(&self) -> UserId {
        self.user
    }
}

/// Evictions remembered for handles not yet unsubscribed.
pub const EVICTION_RECORDS: usize = 1024;

/// How a subscriber left the live set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Departure {
    /// Removed by this `unsubscribe` call.
    Closed,
    /// Already removed by the relay after its sink failed.
    Evicted,
}

/// Configuration for the [`Relay`].
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Number of messages retained for resume.
    pub backlog_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            backlog_capacity: DEFAULT_BACKLOG_CAPACITY,
        }
    }
}

struct Subscriber {
    user: UserId,
    sink: Box<dyn MessageSink>,
}

#[derive(Default)]
struct RelayState {
    next_id: u64,
    last_offset: Offset,
    backlog: Backlog,
    subscribers: BTreeMap<SubscriberId, Subscriber>,
    evicted: BTreeSet<SubscriberId>,
}

impl RelayState {
    /// Append and fan out. Callers have already validated `message.offset`.
    fn append(&mut self, message: ChatMessage) {
        self.last_offset = message.offset;

        let mut failed = Vec::new();
        for (id, sub) in &self.subscribers {
            if let Err(e) = sub.sink.deliver(&message) {
                failed.push((*id, e));
            }
        }
        for (id, e) in failed {
            if let Some(sub) = self.subscribers.remove(&id) {
                warn!(subscriber = %id, user = %sub.user, error = %e, "closing subscriber after failed delivery");
                self.evicted.insert(id);
            }
        }
        while self.evicted.len() > EVICTION_RECORDS {
            self.evicted.pop_first();
        }

        debug!(offset = %message.offset, sender = %message.sender, "message relayed");
        if let Some(old) = self.backlog.push(message) {
            debug!(offset = %old.offset, "evicted from backlog");
        }
    }
}

/// Fan-out point for one chat topic.
///
/// Offset assignment, backlog mutation, subscriber registration and backlog
/// replay all happen under one mutex, so a subscriber sees every offset
/// above its watermark exactly once.
pub struct Relay {
    state: Mutex<RelayState>,
    config: RelayConfig,
}

impl Relay {
    pub fn new(config: RelayConfig) -> RelayResult<Self> {
        if config.backlog_capacity == 0 {
            return Err(RelayError::ZeroCapacity);
        }
        let state = RelayState {
            backlog: Backlog::new(config.backlog_capacity),
            ..Default::default()
        };
        info!(backlog_capacity = config.backlog_capacity, "relay started");
        Ok(Self {
            state: Mutex::new(state),
            config,
        })
    }

    /// Ingest a message, assigning it the next offset.
    ///
    /// Used when this relay is the offset authority for its topic.
    pub fn ingest(&self, sender: UserId, content: impl Into<String>) -> Offset {
        let mut state = self.state.lock();
        let offset = state.last_offset.next();
        state.append(ChatMessage::new(sender, content, offset));
        offset
    }

    /// Ingest a message whose offset was assigned upstream.
    ///
    /// The offset must be strictly greater than the last one ingested; gaps
    /// are accepted. On violation nothing is mutated.
    pub fn ingest_at(
        &self,
        sender: UserId,
        content: impl Into<String>,
        offset: Offset,
    ) -> RelayResult<Offset> {
        let mut state = self.state.lock();
        if offset <= state.last_offset {
            return Err(RelayError::ProtocolViolation {
                offset,
                last: state.last_offset,
            });
        }
        if offset != state.last_offset.next() {
            debug!(%offset, last = %state.last_offset, "offset gap from upstream");
        }
        state.append(ChatMessage::new(sender, content, offset));
        Ok(offset)
    }

    /// Register a subscriber and replay what it missed.
    ///
    /// With `last_seen = None` only live messages are delivered. With
    /// `Some(k)` every retained entry with an offset above `k` is delivered
    /// first, oldest first. If the sink fails during replay the subscriber is
    /// not registered.
    pub fn subscribe<S>(
        &self,
        user: UserId,
        sink: S,
        last_seen: Option<Offset>,
    ) -> RelayResult<SubscriberHandle>
    where
        S: MessageSink + 'static,
    {
        let mut state = self.state.lock();

        let mut replayed = 0usize;
        if let Some(watermark) = last_seen {
            for message in state.backlog.since(watermark) {
                sink.deliver(message)
                    .map_err(|source| RelayError::ReplayFailed { user, source })?;
                replayed += 1;
            }
        }

        let id = SubscriberId(state.next_id);
        state.next_id += 1;
        state.subscribers.insert(
            id,
            Subscriber {
                user,
                sink: Box::new(sink),
            },
        );

        info!(subscriber = %id, %user, last_seen = ?last_seen, replayed, "subscriber registered");
        Ok(SubscriberHandle { id, user })
    }

    /// Remove a subscriber from the live set.
    pub fn unsubscribe(&self, handle: SubscriberHandle) -> RelayResult<Departure> {
        let mut state = self.state.lock();
        if state.subscribers.remove(&handle.id).is_some() {
            info!(subscriber = %handle.id, user = %handle.user, "subscriber closed");
            return Ok(Departure::Closed);
        }
        if state.evicted.remove(&handle.id) {
            return Ok(Departure::Evicted);
        }
        Err(RelayError::UnknownSubscriber(handle.id))
    }

    /// Offset of the most recently ingested message.
    pub fn last_offset(&self) -> Offset {
        self.state.lock().last_offset
    }

    /// Snapshot of the retained backlog, oldest first.
    pub fn backlog(&self) -> Vec<ChatMessage> {
        self.state.lock().backlog.iter().cloned().collect()
    }

    /// Offsets of the oldest and newest retained messages.
    pub fn retained_range(&self) -> Option<(Offset, Offset)> {
        let state = self.state.lock();
        Some((state.backlog.oldest()?, state.backlog.newest()?))
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    pub fn capacity(&self) -> usize {
        self.config.backlog_capacity
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self {
            state: Mutex::new(RelayState::default()),
            config: RelayConfig::default(),
        }
    }
}
