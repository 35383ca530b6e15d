use std::time::Duration;

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;

use parley_crypto::{InvalidToken, SigningKey, VerifyingKey};
use parley_types::{now_millis, Expiry, UserId};

/// Cookie carrying the capability token.
pub const TOKEN_COOKIE: &str = "BT";

/// Issues and checks capability tokens for this process.
pub struct Authority {
    signing: SigningKey,
    verifying: VerifyingKey,
    ttl: Duration,
}

impl Authority {
    pub fn new(signing: SigningKey, ttl: Duration) -> Self {
        let verifying = signing.verifying_key();
        Self {
            signing,
            verifying,
            ttl,
        }
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// A fresh token for `user`, valid for the configured lifetime.
    pub fn issue(&self, user: UserId) -> String {
        parley_crypto::issue(&self.signing, user, Expiry::after(self.ttl))
    }

    pub fn verify(&self, token: &str) -> Result<UserId, InvalidToken> {
        parley_crypto::verify(&self.verifying, now_millis(), token)
    }
}

/// Value of the named cookie, if the request carries it.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim())
}

/// Token presented by the request: the `BT` cookie, else a bearer header.
pub fn presented_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = cookie_value(headers, TOKEN_COOKIE).filter(|t| !t.is_empty()) {
        return Some(token);
    }
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub fn set_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{TOKEN_COOKIE}={token}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
        ttl.as_secs()
    )
}

pub fn clear_cookie() -> String {
    format!("{TOKEN_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Strict")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn authority() -> Authority {
        Authority::new(SigningKey::generate(), Duration::from_secs(60))
    }

    #[test]
    fn issue_then_verify() {
        let auth = authority();
        let user = UserId::random();
        let token = auth.issue(user);
        assert_eq!(auth.verify(&token), Ok(user));
    }

    #[test]
    fn foreign_token_rejected() {
        let token = authority().issue(UserId::random());
        assert_eq!(authority().verify(&token), Err(InvalidToken));
    }

    #[test]
    fn cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; BT=abc+/=; other=1"));
        assert_eq!(cookie_value(&headers, "BT"), Some("abc+/="));
        assert_eq!(cookie_value(&headers, "theme"), Some("dark"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn cookie_preferred_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("BT=from-cookie"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(presented_token(&headers), Some("from-cookie"));
    }

    #[test]
    fn bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("BT="));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(presented_token(&headers), Some("tok"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        assert_eq!(presented_token(&headers), None);
    }

    #[test]
    fn cookie_strings() {
        let set = set_cookie("tok", Duration::from_secs(600));
        assert!(set.starts_with("BT=tok;"));
        assert!(set.contains("Max-Age=600"));
        assert!(clear_cookie().contains("Max-Age=0"));
    }
}
