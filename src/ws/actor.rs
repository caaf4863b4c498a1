//! Actor-per-connection message router
//!
//! Splits the WebSocket into reader and writer halves:
//! - Writer task: owns the sink, forwards messages from an mpsc channel
//! - Reader loop: parses inbound frames and dispatches them
//!
//! The mpsc channel allows any part of the system (other connections,
//! eviction) to send messages to this client by cloning the sender.
//!
//! Per-connection lifecycle: Unauthenticated → Authenticated → Closed.
//! Only an `AUTH` frame is accepted while unauthenticated; a failed
//! handshake closes the connection (fail-closed). On exit the actor
//! releases its registry binding with a compare-and-remove so a stale
//! close never evicts a newer binding for the same identity.

use std::ops::ControlFlow;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval, timeout};

use crate::auth::TokenError;
use crate::store::AccountId;
use crate::ws::protocol::{
    parse_client_frame, ClientFrame, FrameParseError, SendPayload, ServerFrame,
};
use crate::ws::registry::{ConnectionHandle, ConnectionId};
use crate::AppState;

/// Ping interval: server sends a WebSocket ping every 30 seconds to
/// detect abrupt disconnects that never produce a close frame.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Pong timeout: if no pong arrives within 10 seconds after a ping, close.
const PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// WebSocket close codes for server-initiated closes
const CLOSE_SUPERSEDED: u16 = 4000;
const CLOSE_TOKEN_EXPIRED: u16 = 4001;
const CLOSE_TOKEN_INVALID: u16 = 4002;

/// Run the actor for one WebSocket connection.
pub async fn run_connection(socket: WebSocket, state: AppState) {
    let connection_id = state.registry.next_connection_id();
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();
    let handle = ConnectionHandle::new(connection_id, tx.clone());

    tracing::debug!(connection_id, "WebSocket actor started");

    // Writer task: forwards mpsc messages to the WebSocket sink
    let writer_handle = tokio::spawn(writer_task(ws_sender, rx));

    // Track pong reception
    let (pong_tx, mut pong_rx) = mpsc::unbounded_channel::<()>();

    // Ping task: sends periodic pings and monitors pong responses
    let ping_tx = tx.clone();
    let ping_handle = tokio::spawn(async move {
        let mut ping_timer = interval(PING_INTERVAL);
        // Skip the first immediate tick
        ping_timer.tick().await;

        loop {
            ping_timer.tick().await;

            if ping_tx.send(Message::Ping(vec![1, 2, 3, 4])).is_err() {
                // Writer task has died, connection is gone
                break;
            }

            match timeout(PONG_TIMEOUT, pong_rx.recv()).await {
                Ok(Some(())) => {}
                _ => {
                    tracing::warn!(connection_id, "Pong timeout, closing connection");
                    let _ = ping_tx.send(Message::Close(Some(CloseFrame {
                        code: 1001,
                        reason: "Pong timeout".into(),
                    })));
                    break;
                }
            }
        }
    });

    // The identity bound to this connection once the handshake succeeds
    let mut identity: Option<AccountId> = None;

    loop {
        match ws_receiver.next().await {
            Some(Ok(msg)) => match msg {
                Message::Text(text) => {
                    let flow =
                        dispatch_frame(&text, &state, &handle, connection_id, &mut identity);
                    if flow.is_break() {
                        break;
                    }
                }
                Message::Binary(_) => {
                    // The protocol is JSON text frames
                    handle.send(&ServerFrame::error("Invalid message format."));
                }
                Message::Pong(_) => {
                    let _ = pong_tx.send(());
                }
                Message::Ping(data) => {
                    let _ = tx.send(Message::Pong(data));
                }
                Message::Close(frame) => {
                    tracing::debug!(connection_id, reason = ?frame, "Client initiated close");
                    break;
                }
            },
            Some(Err(e)) => {
                tracing::warn!(connection_id, error = %e, "WebSocket receive error");
                break;
            }
            None => {
                tracing::debug!(connection_id, "WebSocket stream ended");
                break;
            }
        }
    }

    ping_handle.abort();

    // Release the binding, but only if it still points at this connection.
    if let Some(id) = identity {
        if state.registry.unbind(id, connection_id) {
            tracing::debug!(identity = id, connection_id, "Connection unbound");
        }
    }

    // Drop all senders so the writer drains queued frames (including any
    // final AUTH_FAIL/close) and exits on its own.
    drop(handle);
    drop(tx);
    let _ = timeout(Duration::from_secs(5), writer_handle).await;

    tracing::debug!(connection_id, "WebSocket actor stopped");
}

/// Writer task: receives messages from the mpsc channel and forwards
/// them to the WebSocket sink.
async fn writer_task(
    mut ws_sender: futures::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if ws_sender.send(msg).await.is_err() {
            // WebSocket send failed, connection is broken
            break;
        }
    }
}

/// Parse and route one inbound text frame.
///
/// Returns `ControlFlow::Break` when the connection must be closed
/// (failed handshake). All other outcomes, including malformed frames,
/// leave the connection open.
fn dispatch_frame(
    text: &str,
    state: &AppState,
    handle: &ConnectionHandle,
    connection_id: ConnectionId,
    identity: &mut Option<AccountId>,
) -> ControlFlow<()> {
    let frame = match parse_client_frame(text) {
        Ok(frame) => frame,
        Err(FrameParseError::Invalid) => {
            handle.send(&ServerFrame::error("Invalid message format."));
            return ControlFlow::Continue(());
        }
        Err(FrameParseError::UnknownType(kind)) => {
            if identity.is_some() {
                handle.send(&ServerFrame::error(format!("Unknown message type: {}", kind)));
            } else {
                handle.send(&ServerFrame::error("Authentication required."));
            }
            return ControlFlow::Continue(());
        }
    };

    match frame {
        ClientFrame::Auth { token } => {
            handle_auth(token, state, handle, connection_id, identity)
        }
        ClientFrame::Send { payload } => {
            // Any non-AUTH frame while unauthenticated is rejected, but
            // the connection is left open.
            let Some(sender) = *identity else {
                handle.send(&ServerFrame::error("Authentication required."));
                return ControlFlow::Continue(());
            };
            handle_send(payload, sender, state, handle);
            ControlFlow::Continue(())
        }
    }
}

/// Handle the `AUTH` handshake. Re-sending `AUTH` while authenticated is
/// not an error: it re-binds, evicting any prior connection for the
/// token's identity (last-writer-wins).
fn handle_auth(
    token: Option<String>,
    state: &AppState,
    handle: &ConnectionHandle,
    connection_id: ConnectionId,
    identity: &mut Option<AccountId>,
) -> ControlFlow<()> {
    let Some(token) = token else {
        handle.send(&ServerFrame::auth_fail("Token not provided."));
        handle.close(CLOSE_TOKEN_INVALID, "Token not provided");
        return ControlFlow::Break(());
    };

    match state.tokens.validate(&token) {
        Ok(claims) => {
            // Re-authentication under a different identity releases the
            // old binding first.
            if let Some(previous) = *identity {
                if previous != claims.sub {
                    state.registry.unbind(previous, connection_id);
                }
            }

            if let Some(evicted) = state.registry.bind(claims.sub, handle.clone()) {
                tracing::info!(
                    identity = claims.sub,
                    evicted_connection = evicted.id(),
                    "Evicting superseded connection"
                );
                evicted.close(CLOSE_SUPERSEDED, "Superseded by a newer connection");
            }

            *identity = Some(claims.sub);
            handle.send(&ServerFrame::auth_success(claims.sub));
            tracing::info!(identity = claims.sub, connection_id, "Connection authenticated");
            ControlFlow::Continue(())
        }
        Err(TokenError::Expired) => {
            handle.send(&ServerFrame::auth_fail("Token expired."));
            handle.close(CLOSE_TOKEN_EXPIRED, "Token expired");
            ControlFlow::Break(())
        }
        Err(_) => {
            // Uninformative on purpose: bad signature and malformed
            // tokens get the same message.
            handle.send(&ServerFrame::auth_fail("Invalid token."));
            handle.close(CLOSE_TOKEN_INVALID, "Token invalid");
            ControlFlow::Break(())
        }
    }
}

/// Handle a `SEND` frame from an authenticated connection.
fn handle_send(
    payload: Option<SendPayload>,
    sender: AccountId,
    state: &AppState,
    handle: &ConnectionHandle,
) {
    let (to_identity, text) = match payload {
        Some(SendPayload {
            to_identity: Some(to),
            text: Some(text),
        }) => (to, text),
        _ => {
            handle.send(&ServerFrame::error("Missing toIdentity or text in SEND."));
            return;
        }
    };

    let timestamp = Utc::now();

    // Best-effort, exactly-once-or-not-at-all: no queueing for offline
    // recipients, no retries.
    match state.registry.lookup(to_identity) {
        Some(target)
            if target.send(&ServerFrame::incoming_message(
                sender,
                text.clone(),
                timestamp,
            )) =>
        {
            handle.send(&ServerFrame::message_sent(to_identity, text, timestamp));
        }
        _ => {
            tracing::debug!(
                from = sender,
                to = to_identity,
                "Recipient not connected"
            );
            handle.send(&ServerFrame::recipient_offline(to_identity));
        }
    }
}
