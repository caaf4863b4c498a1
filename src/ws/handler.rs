//! WebSocket upgrade endpoint

use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};

use crate::ws::actor;
use crate::AppState;

/// GET /ws
///
/// Upgrades the connection and hands it to the per-connection actor.
/// Authentication happens in-band via the `AUTH` frame, so the upgrade
/// itself is unauthenticated.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| actor::run_connection(socket, state))
}
