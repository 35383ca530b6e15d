//! Token authority for Parley.
//!
//! Issues and verifies stateless capability tokens: a signed, time-bounded
//! claim that the bearer is a given [`UserId`](parley_types::UserId). The
//! authority keeps no registry; validity is decided entirely by the
//! signature and the expiry.
//!
//! All signing wraps `ed25519-dalek`; there is no custom cryptography.

pub mod signer;
pub mod token;

pub use signer::{KeyError, Signature, SigningKey, VerifyingKey};
pub use token::{issue, verify, InvalidToken, TOKEN_VERSION};
