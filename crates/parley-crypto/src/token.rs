//! Binary capability tokens.
//!
//! A token is the standard Base64 encoding of:
//!
//! | bytes    | field                                     |
//! |----------|-------------------------------------------|
//! | `0`      | version, always [`TOKEN_VERSION`]         |
//! | `1..17`  | user id, big-endian                       |
//! | `17..25` | expiry in epoch milliseconds, big-endian  |
//! | `25..`   | signature over bytes `0..25`              |
//!
//! The signature length is whatever the scheme produces; the verifier takes
//! everything after the fixed payload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use parley_types::{Expiry, UserId};

use crate::signer::{Signature, SigningKey, VerifyingKey};

/// The only token layout this authority issues or accepts.
pub const TOKEN_VERSION: u8 = 0;

const PAYLOAD_LEN: usize = 1 + UserId::LEN + 8;

/// The single outcome for every rejected token.
///
/// Bad encoding, truncation, wrong version, expiry and signature mismatch are
/// deliberately indistinguishable to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid capability token")]
pub struct InvalidToken;

fn encode_payload(user: UserId, expiry: Expiry) -> [u8; PAYLOAD_LEN] {
    let mut payload = [0u8; PAYLOAD_LEN];
    payload[0] = TOKEN_VERSION;
    payload[1..17].copy_from_slice(&user.to_bytes());
    payload[17..25].copy_from_slice(&expiry.as_millis().to_be_bytes());
    payload
}

/// Issue a token asserting `user` until `expiry`.
pub fn issue(key: &SigningKey, user: UserId, expiry: Expiry) -> String {
    let payload = encode_payload(user, expiry);
    let signature = key.sign(&payload).to_vec();

    let mut raw = Vec::with_capacity(PAYLOAD_LEN + signature.len());
    raw.extend_from_slice(&payload);
    raw.extend_from_slice(&signature);
    STANDARD.encode(raw)
}

/// Verify `token` at wall-clock instant `now_ms`, returning the user it names.
pub fn verify(key: &VerifyingKey, now_ms: u64, token: &str) -> Result<UserId, InvalidToken> {
    let raw = STANDARD.decode(token.trim()).map_err(|_| InvalidToken)?;
    if raw.len() <= PAYLOAD_LEN {
        return Err(InvalidToken);
    }
    let (payload, signature) = raw.split_at(PAYLOAD_LEN);

    let signature = Signature::from_slice(signature).map_err(|_| InvalidToken)?;
    key.verify(payload, &signature).map_err(|_| InvalidToken)?;

    if payload[0] != TOKEN_VERSION {
        return Err(InvalidToken);
    }
    let user = UserId::from_slice(&payload[1..17]).map_err(|_| InvalidToken)?;
    let expiry_bytes: [u8; 8] = payload[17..25].try_into().map_err(|_| InvalidToken)?;
    let expiry = Expiry::from_millis(u64::from_be_bytes(expiry_bytes));
    if expiry.is_expired_at(now_ms) {
        return Err(InvalidToken);
    }
    Ok(user)
}
