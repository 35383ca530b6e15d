use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngressError {
    /// The upstream broke the ordering or lifecycle contract. Fatal to the
    /// pump: no further events are processed from that source.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The log connection or loopback channel closed mid-request.
    #[error("upstream log disconnected")]
    Disconnected,

    /// The log answered a write with `Rejected`.
    #[error("upstream rejected request: {0}")]
    Rejected(String),

    /// A frame arrived that is not valid at this point of the exchange.
    #[error("unexpected frame: {0}")]
    UnexpectedFrame(&'static str),

    /// Payload above `MAX_FRAME_SIZE`, outgoing or announced by a header.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// Malformed frame: zero length, missing tag or mismatched tag.
    #[error("framing error: {0}")]
    Framing(String),

    /// A frame could not be encoded with bincode.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A frame body could not be decoded with bincode.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Socket failure, including a stream cut inside a frame.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngressError {
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::ProtocolViolation(_))
    }
}

pub type IngressResult<T> = Result<T, IngressError>;
