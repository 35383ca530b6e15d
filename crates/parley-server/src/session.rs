//! WebSocket chat sessions.
//!
//! A connection is admitted once: the token and resume watermark are read
//! from the upgrade request, `READY` is sent, and the connection is
//! subscribed to the relay. After that, text frames from the client are
//! posted to the writer under the bound identity, and relay deliveries are
//! pushed back as JSON.

use std::borrow::Cow;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};

use parley_relay::{ChannelSink, Departure};
use parley_types::{Offset, UserId};

use crate::auth::{presented_token, Authority};
use crate::state::AppState;

/// No token was presented.
pub const CLOSE_MISSING_TOKEN: u16 = 3000;
/// The token failed verification or has expired.
pub const CLOSE_INVALID_TOKEN: u16 = 3001;
/// The query arguments could not be parsed.
pub const CLOSE_BAD_ARGUMENTS: u16 = 3002;

/// Text frame sent once the connection is admitted.
pub const READY: &str = "READY";

#[derive(Debug, Default, Deserialize)]
pub struct ChatQuery {
    pub last_seen: Option<String>,
}

/// Why a connection was turned away.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Refusal {
    pub code: u16,
    pub reason: &'static str,
}

impl Refusal {
    const BAD_ARGUMENTS: Self = Self {
        code: CLOSE_BAD_ARGUMENTS,
        reason: "Invalid arguments",
    };
    const MISSING_TOKEN: Self = Self {
        code: CLOSE_MISSING_TOKEN,
        reason: "Missing token",
    };
    const INVALID_TOKEN: Self = Self {
        code: CLOSE_INVALID_TOKEN,
        reason: "Stale or invalid token",
    };
}

/// Decide admission from the presented token and raw `last_seen` value.
pub fn admit(
    authority: &Authority,
    token: Option<&str>,
    last_seen: Option<&str>,
) -> Result<(UserId, Option<Offset>), Refusal> {
    let last_seen = match last_seen {
        None => None,
        Some(raw) => Some(raw.trim().parse::<Offset>().map_err(|_| Refusal::BAD_ARGUMENTS)?),
    };
    let token = token.ok_or(Refusal::MISSING_TOKEN)?;
    let user = authority
        .verify(token)
        .map_err(|_| Refusal::INVALID_TOKEN)?;
    Ok((user, last_seen))
}

/// `GET /chat`
pub async fn chat_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    query: Result<Query<ChatQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Response {
    let admission = match query {
        Ok(Query(query)) => admit(
            &state.authority,
            presented_token(&headers),
            query.last_seen.as_deref(),
        ),
        Err(rejection) => {
            debug!(error = %rejection, "unparsable chat query");
            Err(Refusal::BAD_ARGUMENTS)
        }
    };
    ws.on_upgrade(move |socket| run_session(socket, state, admission))
}

async fn run_session(
    socket: WebSocket,
    state: AppState,
    admission: Result<(UserId, Option<Offset>), Refusal>,
) {
    let (mut sender, mut receiver) = socket.split();

    let (user, last_seen) = match admission {
        Ok(admitted) => admitted,
        Err(refusal) => {
            warn!(code = refusal.code, reason = refusal.reason, "connection refused");
            let frame = CloseFrame {
                code: refusal.code,
                reason: Cow::Borrowed(refusal.reason),
            };
            let _ = sender.send(Message::Close(Some(frame))).await;
            return;
        }
    };

    if sender.send(Message::Text(READY.to_string())).await.is_err() {
        return;
    }

    // Room for a full replay plus the live queue.
    let depth = state.sink_queue_depth + state.relay.capacity();
    let (sink, mut rx) = ChannelSink::channel(depth);
    let handle = match state.relay.subscribe(user, sink, last_seen) {
        Ok(handle) => handle,
        Err(e) => {
            warn!(%user, error = %e, "subscribe failed");
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match message.to_json() {
                Ok(text) => text,
                Err(e) => {
                    warn!(offset = %message.offset, error = %e, "dropping unencodable message");
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let writer = state.writer.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if let Err(e) = writer.post(user, &text).await {
                        warn!(%user, error = %e, "post failed");
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(Message::Binary(_)) => debug!(%user, "ignoring binary frame"),
                Ok(_) => {}
                Err(e) => {
                    debug!(%user, error = %e, "websocket error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    match state.relay.unsubscribe(handle) {
        Ok(Departure::Closed) => info!(%user, "session closed"),
        Ok(Departure::Evicted) => info!(%user, "session closed after eviction"),
        Err(e) => warn!(%user, error = %e, "unsubscribe failed"),
    }
}
