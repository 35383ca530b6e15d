use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Position of a message in the upstream ordered log.
///
/// Offsets are 1-indexed and strictly increasing per topic. `Offset::ZERO`
/// never names a message; as a resume watermark it means "everything that is
/// still retained".
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Offset(u64);

impl Offset {
    /// The watermark before the first message.
    pub const ZERO: Self = Self(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The offset immediately after this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u64> for Offset {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for Offset {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| TypeError::InvalidOffset(format!("{s:?}: {e}")))
    }
}

impl fmt::Debug for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Offset({})", self.0)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_increments() {
        assert_eq!(Offset::ZERO.next(), Offset::new(1));
        assert_eq!(Offset::new(41).next().get(), 42);
    }

    #[test]
    fn parse() {
        assert_eq!("12".parse::<Offset>().unwrap(), Offset::new(12));
        assert_eq!(" 0 ".parse::<Offset>().unwrap(), Offset::ZERO);
        assert!("-1".parse::<Offset>().is_err());
        assert!("abc".parse::<Offset>().is_err());
    }

    #[test]
    fn ordering() {
        assert!(Offset::new(3) > Offset::new(2));
        assert!(Offset::ZERO < Offset::new(1));
    }

    #[test]
    fn serde_is_plain_number() {
        assert_eq!(serde_json::to_string(&Offset::new(7)).unwrap(), "7");
    }
}
