//! Executor that runs the target's command lines as local processes

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::pty::PtyShell;
use super::target::Target;
use super::{ExecOutput, RemoteError, RemoteExecutor, ShellHandle, TerminalSize};

/// Real implementation: spawns `kubectl` (or a local shell) per operation
pub struct ProcessExecutor {
    target: Target,
    /// TERM exported to interactive shells
    term: String,
}

impl ProcessExecutor {
    pub fn new(target: Target, term: String) -> Self {
        Self { target, term }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }
}

#[async_trait]
impl RemoteExecutor for ProcessExecutor {
    fn describe(&self) -> String {
        self.target.to_string()
    }

    #[instrument(skip_all, fields(target = %self.target))]
    async fn exec(&self, script: &str) -> Result<ExecOutput, RemoteError> {
        let spec = self.target.exec_command(script);
        debug!(program = %spec.program, "Running one-shot command");

        let output = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| RemoteError::SpawnFailed {
                program: spec.program.clone(),
                reason: e.to_string(),
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        debug!(status = ?output.status, "One-shot command finished");

        Ok(ExecOutput {
            success: output.status.success(),
            output: combined,
        })
    }

    fn spawn_shell(&self, size: TerminalSize) -> Result<Box<dyn ShellHandle>, RemoteError> {
        let spec = self.target.shell_command();
        let shell = PtyShell::spawn(&spec, size, &self.term)?;
        Ok(Box::new(shell))
    }
}
