use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Wall-clock milliseconds since the UNIX epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Absolute expiry instant of a capability token, in epoch milliseconds.
///
/// A token is valid strictly before its expiry: at `now == expiry` it has
/// already lapsed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Expiry(u64);

impl Expiry {
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Expiry `ttl` after the current wall-clock time.
    pub fn after(ttl: Duration) -> Self {
        Self::after_from(now_millis(), ttl)
    }

    /// Expiry `ttl` after the given instant. Saturates instead of wrapping.
    pub fn after_from(now_ms: u64, ttl: Duration) -> Self {
        Self(now_ms.saturating_add(ttl.as_millis() as u64))
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// `true` once `now_ms` has reached the expiry.
    pub const fn is_expired_at(self, now_ms: u64) -> bool {
        self.0 <= now_ms
    }
}

impl fmt::Debug for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expiry({}ms)", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_strict() {
        let e = Expiry::from_millis(2000);
        assert!(!e.is_expired_at(1999));
        assert!(e.is_expired_at(2000));
        assert!(e.is_expired_at(2001));
    }

    #[test]
    fn after_from_adds_ttl() {
        let e = Expiry::after_from(1_000, Duration::from_secs(10));
        assert_eq!(e.as_millis(), 11_000);
    }

    #[test]
    fn after_from_saturates() {
        let e = Expiry::after_from(u64::MAX - 1, Duration::from_secs(1));
        assert_eq!(e.as_millis(), u64::MAX);
    }

    #[test]
    fn after_is_in_the_future() {
        let before = now_millis();
        let e = Expiry::after(Duration::from_secs(60));
        assert!(e.as_millis() >= before + 60_000);
    }
}
