use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::UserId;
use crate::offset::Offset;

/// One chat post, as ordered by the upstream log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: UserId,
    pub content: String,
    pub offset: Offset,
}

impl ChatMessage {
    pub fn new(sender: UserId, content: impl Into<String>, offset: Offset) -> Self {
        Self {
            sender,
            content: content.into(),
            offset,
        }
    }

    /// The record pushed to listeners for this message.
    pub fn delivery(&self) -> Delivery {
        Delivery {
            sender: self.sender,
            content: self.content.clone(),
            index: self.offset,
        }
    }

    /// Compact JSON text of [`Self::delivery`].
    pub fn to_json(&self) -> Result<String, TypeError> {
        self.delivery().to_json()
    }
}

/// Wire record sent to each listener: `{"sender", "content", "index"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub sender: UserId,
    pub content: String,
    pub index: Offset,
}

impl Delivery {
    pub fn to_json(&self) -> Result<String, TypeError> {
        serde_json::to_string(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self, TypeError> {
        serde_json::from_str(text).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn json_has_three_named_fields() {
        let sender: UserId = "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11".parse().unwrap();
        let msg = ChatMessage::new(sender, "hello", Offset::new(4));
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["sender"], "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11");
        assert_eq!(obj["content"], "hello");
        assert_eq!(obj["index"], 4);
    }

    #[test]
    fn json_is_compact() {
        let msg = ChatMessage::new(UserId::random(), "x", Offset::new(1));
        let text = msg.to_json().unwrap();
        assert!(!text.contains('\n'));
        assert!(!text.contains(": "));
    }

    #[test]
    fn content_is_escaped() {
        let msg = ChatMessage::new(UserId::random(), "say \"hi\"\n", Offset::new(2));
        let parsed = Delivery::from_json(&msg.to_json().unwrap()).unwrap();
        assert_eq!(parsed.content, "say \"hi\"\n");
        assert_eq!(parsed, msg.delivery());
    }
}
