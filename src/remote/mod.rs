//! Remote execution target abstraction.
//!
//! Provides a trait-based abstraction over the fixed execution target so that:
//! - the terminal bridge and check runner never build commands themselves
//! - tests can substitute a recording double for kubectl
//! - development can run against a local shell

use std::io::{Read, Write};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{Config, TargetKind};

pub mod mock;
pub mod process;
pub mod pty;
pub mod target;

pub use mock::{MockCall, MockRemoteExecutor};
pub use process::ProcessExecutor;
pub use pty::PtyShell;
pub use target::Target;

/// Errors raised while starting or talking to the target
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("failed to start {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("pseudo-terminal error: {0}")]
    Pty(String),

    #[error("{0} was already taken from this shell")]
    AlreadyTaken(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Terminal geometry in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    pub rows: u16,
    pub cols: u16,
}

impl TerminalSize {
    /// Sizes with a zero dimension are rejected
    pub fn new(rows: u16, cols: u16) -> Option<Self> {
        (rows > 0 && cols > 0).then_some(Self { rows, cols })
    }
}

impl Default for TerminalSize {
    fn default() -> Self {
        Self { rows: 24, cols: 80 }
    }
}

/// Outcome of a one-shot command on the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit status was zero
    pub success: bool,
    /// Stdout followed by stderr, untrimmed
    pub output: String,
}

/// Interactive shell attached to a pseudo-terminal.
///
/// The reader and writer are handed out once so that the two copy loops can
/// own them; everything else stays with the handle until it is released.
pub trait ShellHandle: Send {
    /// Output side of the PTY master
    fn take_reader(&mut self) -> Result<Box<dyn Read + Send>, RemoteError>;

    /// Input side of the PTY master
    fn take_writer(&mut self) -> Result<Box<dyn Write + Send>, RemoteError>;

    fn resize(&self, size: TerminalSize) -> Result<(), RemoteError>;

    /// Release the PTY master. Idempotent.
    fn close_pty(&mut self);

    fn kill(&mut self) -> std::io::Result<()>;

    /// Block until the process exits and return its exit code
    fn wait(&mut self) -> std::io::Result<u32>;

    fn process_id(&self) -> Option<u32>;
}

/// Trait abstracting the execution target for testability
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Human-readable target identity for logs
    fn describe(&self) -> String;

    /// Run `script` non-interactively and capture its combined output
    async fn exec(&self, script: &str) -> Result<ExecOutput, RemoteError>;

    /// Start an interactive shell on a new pseudo-terminal
    fn spawn_shell(&self, size: TerminalSize) -> Result<Box<dyn ShellHandle>, RemoteError>;
}

/// Build the executor selected by configuration
pub fn executor_from_config(config: &Config) -> Arc<dyn RemoteExecutor> {
    let target = Target::from_config(&config.target);
    if config.target.kind == TargetKind::Kubectl && which::which(&config.target.kubectl).is_err() {
        tracing::warn!(
            kubectl = %config.target.kubectl,
            "kubectl not found in PATH; terminals and checks will fail"
        );
    }
    Arc::new(ProcessExecutor::new(target, config.terminal.term.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_size_rejects_zero() {
        assert!(TerminalSize::new(0, 80).is_none());
        assert!(TerminalSize::new(24, 0).is_none());
        assert_eq!(
            TerminalSize::new(40, 120),
            Some(TerminalSize { rows: 40, cols: 120 })
        );
    }

    #[test]
    fn test_executor_from_config_local() {
        let mut config = Config::default();
        config.target.kind = TargetKind::Local;
        config.target.shell = "/bin/sh".to_string();

        let executor = executor_from_config(&config);
        assert!(executor.describe().contains("/bin/sh"));
    }

    #[test]
    fn test_executor_from_config_kubectl() {
        let config = Config::default();
        let executor = executor_from_config(&config);
        let described = executor.describe();
        assert!(described.contains("default/learning-ui-shell-0"));
        assert!(described.contains("shell"));
    }
}
