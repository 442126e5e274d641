//! Terminal WebSocket endpoint.

use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::StreamExt;
use serde::Deserialize;

use crate::remote::TerminalSize;
use crate::rest::state::ApiState;

/// Initial terminal geometry requested by the client
#[derive(Debug, Default, Deserialize)]
pub struct TerminalQuery {
    pub rows: Option<u16>,
    pub cols: Option<u16>,
}

impl TerminalQuery {
    /// Both dimensions, when present and non-zero
    pub fn size(&self) -> Option<TerminalSize> {
        TerminalSize::new(self.rows?, self.cols?)
    }
}

/// Upgrade to a WebSocket and attach it to a new shell
pub async fn connect(
    State(state): State<ApiState>,
    Query(query): Query<TerminalQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let size = query.size();
    ws.on_upgrade(move |socket| session(state, socket, size))
}

async fn session(state: ApiState, socket: WebSocket, size: Option<TerminalSize>) {
    let (sink, stream) = socket.split();
    state.terminals.run(sink, stream, size).await;
}
