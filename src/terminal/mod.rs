//! Browser terminal sessions.
//!
//! Each socket connection gets its own shell on the execution target,
//! attached to a pseudo-terminal. Output is relayed as binary frames and
//! client frames are written to the shell verbatim, except for JSON resize
//! messages. The shell is closed, killed and reaped exactly once per session.

mod bridge;
mod frame;
mod guard;

pub use bridge::{SessionEnd, SessionSummary, TerminalBridge};
pub use guard::ShellGuard;
