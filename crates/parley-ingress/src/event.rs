use parley_types::{Offset, UserId};

/// One event delivered by an upstream log for the chat topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngressEvent {
    /// A chat post: the key is the sender, the value is UTF-8 text.
    Put {
        sender: UserId,
        value: Vec<u8>,
        offset: Offset,
    },
    /// The topic was created. Carries no chat content.
    TopicCreated { offset: Offset },
    /// The topic was destroyed. Never valid for the chat topic.
    TopicDestroyed { offset: Offset },
    /// A key was deleted. Chat entries are never deleted.
    KeyDeleted { key: UserId, offset: Offset },
}

impl IngressEvent {
    pub fn offset(&self) -> Offset {
        match self {
            Self::Put { offset, .. }
            | Self::TopicCreated { offset }
            | Self::TopicDestroyed { offset }
            | Self::KeyDeleted { offset, .. } => *offset,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Put { .. } => "Put",
            Self::TopicCreated { .. } => "TopicCreated",
            Self::TopicDestroyed { .. } => "TopicDestroyed",
            Self::KeyDeleted { .. } => "KeyDeleted",
        }
    }
}
