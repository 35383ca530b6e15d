use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Globally-unique 128-bit identity of a chat participant.
///
/// The binary form is the UUID's 16 bytes in big-endian order (most
/// significant 64 bits first), which is the layout capability tokens sign.
/// The string form is the canonical hyphenated UUID, which is what listeners
/// see in the `sender` field of every delivery.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Width of the binary encoding.
    pub const LEN: usize = 16;

    /// Create a random identity for tests and demos.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Build from the two 64-bit halves.
    pub fn from_u64_pair(most: u64, least: u64) -> Self {
        Self(Uuid::from_u64_pair(most, least))
    }

    /// Big-endian 16-byte encoding.
    pub fn to_bytes(&self) -> [u8; 16] {
        *self.0.as_bytes()
    }

    /// Decode from big-endian bytes; the slice must be exactly 16 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| TypeError::InvalidLength {
            expected: Self::LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(Uuid::from_bytes(arr)))
    }
}

impl FromStr for UserId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| TypeError::InvalidUserId(e.to_string()))
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_big_endian_halves() {
        let id = UserId::from_u64_pair(0x0102_0304_0506_0708, 0x090a_0b0c_0d0e_0f10);
        let bytes = id.to_bytes();
        assert_eq!(bytes[0], 0x01);
        assert_eq!(bytes[7], 0x08);
        assert_eq!(bytes[8], 0x09);
        assert_eq!(bytes[15], 0x10);
    }

    #[test]
    fn slice_roundtrip() {
        let id = UserId::random();
        let parsed = UserId::from_slice(&id.to_bytes()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn slice_wrong_length() {
        let err = UserId::from_slice(&[0u8; 15]).unwrap_err();
        assert_eq!(err, TypeError::InvalidLength { expected: 16, actual: 15 });
    }

    #[test]
    fn parse_display_roundtrip() {
        let id = UserId::random();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            "not-a-uuid".parse::<UserId>(),
            Err(TypeError::InvalidUserId(_))
        ));
    }

    #[test]
    fn display_is_hyphenated_lowercase() {
        let id: UserId = "A0EEBC99-9C0B-4EF8-BB6D-6BB9BD380A11".parse().unwrap();
        assert_eq!(id.to_string(), "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11");
    }

    #[test]
    fn serde_is_string() {
        let id: UserId = "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11\"");
    }

    #[test]
    fn random_ids_are_unique() {
        assert_ne!(UserId::random(), UserId::random());
    }
}
