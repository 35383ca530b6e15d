//! Event ingress for Parley.
//!
//! The relay consumes an ordered stream of keyed put events from an upstream
//! log. This crate defines that boundary ([`EventIngress`] for reading,
//! [`ChatWriter`] for posting), two backends for it, and the [`pump`] that
//! moves events into a [`Relay`](parley_relay::Relay).
//!
//! - [`loopback`]: standalone mode, offsets assigned locally.
//! - [`remote`]: client for an external ordered log over TCP, speaking the
//!   frames defined in [`codec`] and [`frame`].

pub mod codec;
pub mod error;
pub mod event;
pub mod frame;
pub mod loopback;
pub mod pump;
pub mod remote;
pub mod traits;

pub use codec::{LogCodec, MAX_FRAME_SIZE};
pub use error::{IngressError, IngressResult};
pub use event::IngressEvent;
pub use frame::{LogFrame, LogRecord, RecordKind};
pub use loopback::{loopback, LoopbackIngress, LoopbackWriter};
pub use pump::{pump, IngressHealth};
pub use remote::{RemoteIngress, RemoteWriter};
pub use traits::{ChatWriter, EventIngress};
