//! Foundation types for Parley.
//!
//! This crate provides the identity, ordering, and message types shared by
//! the token authority, the relay, the ingress adapters, and the server.
//!
//! # Key Types
//!
//! - [`UserId`]: 128-bit identity claimed by a capability token
//! - [`Offset`]: Position of a message in the upstream ordered log
//! - [`ChatMessage`]: One immutable chat post with its assigned offset
//! - [`Delivery`]: The JSON record pushed to each listener

pub mod error;
pub mod identity;
pub mod message;
pub mod offset;
pub mod temporal;

pub use error::TypeError;
pub use identity::UserId;
pub use message::{ChatMessage, Delivery};
pub use offset::Offset;
pub use temporal::{now_millis, Expiry};
