use std::collections::VecDeque;

use parley_types::{ChatMessage, Offset};

/// Number of messages retained for resume when not configured otherwise.
pub const DEFAULT_BACKLOG_CAPACITY: usize = 10;

/// Bounded replay buffer of the most recently ingested messages.
///
/// Entries are kept in strictly increasing offset order; once `capacity` is
/// exceeded the oldest entry is evicted first.
#[derive(Clone, Debug)]
pub struct Backlog {
    capacity: usize,
    entries: VecDeque<ChatMessage>,
}

impl Backlog {
    /// Create an empty backlog. A capacity of zero is clamped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a message, returning the evicted entry if the window was full.
    ///
    /// The caller guarantees `message.offset` exceeds every retained offset.
    pub fn push(&mut self, message: ChatMessage) -> Option<ChatMessage> {
        debug_assert!(self
            .entries
            .back()
            .map_or(true, |last| last.offset < message.offset));
        self.entries.push_back(message);
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    /// Oldest retained offset.
    pub fn oldest(&self) -> Option<Offset> {
        self.entries.front().map(|m| m.offset)
    }

    /// Newest retained offset.
    pub fn newest(&self) -> Option<Offset> {
        self.entries.back().map(|m| m.offset)
    }

    /// Retained entries with an offset strictly greater than `watermark`,
    /// oldest first.
    pub fn since(&self, watermark: Offset) -> impl Iterator<Item = &ChatMessage> {
        let start = self.entries.partition_point(|m| m.offset <= watermark);
        self.entries.range(start..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter()
    }
}

impl Default for Backlog {
    fn default() -> Self {
        Self::new(DEFAULT_BACKLOG_CAPACITY)
    }
}
