use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};

use crate::remote::TerminalSize;

/// JSON control messages a client may send as text frames.
///
/// A text frame is only taken as a control message when it is byte-for-byte
/// the compact serialization of one; anything else goes to the shell.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ControlFrame {
    Resize { rows: u16, cols: u16 },
}

/// What to do with one frame received from the client
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Inbound {
    /// Bytes for the shell's stdin
    Input(Vec<u8>),
    Resize(TerminalSize),
    Ignore,
    Close,
}

pub(crate) fn classify(message: Message) -> Inbound {
    match message {
        Message::Binary(bytes) => Inbound::Input(bytes),
        Message::Text(text) => match control_frame(&text) {
            Some(ControlFrame::Resize { rows, cols }) => match TerminalSize::new(rows, cols) {
                Some(size) => Inbound::Resize(size),
                None => Inbound::Ignore,
            },
            None => Inbound::Input(text.into_bytes()),
        },
        Message::Ping(_) | Message::Pong(_) => Inbound::Ignore,
        Message::Close(_) => Inbound::Close,
    }
}

fn control_frame(text: &str) -> Option<ControlFrame> {
    let frame = serde_json::from_str::<ControlFrame>(text).ok()?;
    let canonical = serde_json::to_string(&frame).ok()?;
    (canonical == text).then_some(frame)
}
