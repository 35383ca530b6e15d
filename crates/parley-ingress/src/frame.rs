use serde::{Deserialize, Serialize};

/// One log entry as streamed to a listener.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Dense position in the log.
    pub offset: u64,
    pub kind: RecordKind,
}

/// What a [`LogRecord`] did to the topic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// The topic was created.
    TopicCreate,
    /// The topic was destroyed.
    TopicDestroy,
    /// `value` was stored under `key`.
    KeyPut { key: Vec<u8>, value: Vec<u8> },
    /// `key` was removed.
    KeyDelete { key: Vec<u8> },
    /// Cluster membership change; not addressed to any topic.
    ConfigChange,
}

/// All frames exchanged with the upstream log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFrame {
    /// Writer → log: create a topic (an existing topic is rejected).
    CreateTopic { topic: String },
    /// Writer → log: append a keyed value.
    Put { topic: String, key: Vec<u8>, value: Vec<u8> },
    /// Listener → log: stream the topic's records after `from_offset`.
    Listen { topic: String, from_offset: u64 },
    /// Log → writer: the request was committed at `offset`.
    Committed { offset: u64 },
    /// Log → writer: the request was not applied.
    Rejected { reason: String },
    /// Log → listener: the next record.
    Record(LogRecord),
}

impl LogFrame {
    pub fn type_tag(&self) -> u8 {
        match self {
            Self::CreateTopic { .. } => 1,
            Self::Put { .. } => 2,
            Self::Listen { .. } => 3,
            Self::Committed { .. } => 4,
            Self::Rejected { .. } => 5,
            Self::Record(_) => 6,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::CreateTopic { .. } => "CreateTopic",
            Self::Put { .. } => "Put",
            Self::Listen { .. } => "Listen",
            Self::Committed { .. } => "Committed",
            Self::Rejected { .. } => "Rejected",
            Self::Record(_) => "Record",
        }
    }
}
