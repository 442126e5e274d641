//! Shell processes attached to a native pseudo-terminal

use std::io::{Read, Write};

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use tracing::debug;

use super::target::CommandSpec;
use super::{RemoteError, ShellHandle, TerminalSize};

impl From<TerminalSize> for PtySize {
    fn from(size: TerminalSize) -> Self {
        PtySize {
            rows: size.rows,
            cols: size.cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }
}

fn pty_error<E: std::fmt::Display>(error: E) -> RemoteError {
    RemoteError::Pty(error.to_string())
}

/// A child process running on the slave side of a PTY
pub struct PtyShell {
    master: Option<Box<dyn MasterPty + Send>>,
    child: Box<dyn Child + Send + Sync>,
    writer_taken: bool,
    reader_taken: bool,
}

impl PtyShell {
    /// Open a PTY of `size` and spawn `command` on it
    pub fn spawn(command: &CommandSpec, size: TerminalSize, term: &str) -> Result<Self, RemoteError> {
        let pair = native_pty_system().openpty(size.into()).map_err(pty_error)?;

        let mut cmd = CommandBuilder::new(&command.program);
        cmd.args(&command.args);
        for (key, value) in std::env::vars() {
            cmd.env(key, value);
        }
        cmd.env("TERM", term);

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| RemoteError::SpawnFailed {
                program: command.program.clone(),
                reason: e.to_string(),
            })?;
        // Only the child may hold the slave side, otherwise reads never see EOF
        drop(pair.slave);

        debug!(
            program = %command.program,
            pid = ?child.process_id(),
            rows = size.rows,
            cols = size.cols,
            "Spawned shell on PTY"
        );

        Ok(Self {
            master: Some(pair.master),
            child,
            writer_taken: false,
            reader_taken: false,
        })
    }

    fn master(&self) -> Result<&(dyn MasterPty + Send), RemoteError> {
        self.master
            .as_deref()
            .ok_or_else(|| RemoteError::Pty("pseudo-terminal already closed".to_string()))
    }
}

impl ShellHandle for PtyShell {
    fn take_reader(&mut self) -> Result<Box<dyn Read + Send>, RemoteError> {
        if self.reader_taken {
            return Err(RemoteError::AlreadyTaken("reader"));
        }
        let reader = self.master()?.try_clone_reader().map_err(pty_error)?;
        self.reader_taken = true;
        Ok(reader)
    }

    fn take_writer(&mut self) -> Result<Box<dyn Write + Send>, RemoteError> {
        if self.writer_taken {
            return Err(RemoteError::AlreadyTaken("writer"));
        }
        let writer = self.master()?.take_writer().map_err(pty_error)?;
        self.writer_taken = true;
        Ok(writer)
    }

    fn resize(&self, size: TerminalSize) -> Result<(), RemoteError> {
        self.master()?.resize(size.into()).map_err(pty_error)
    }

    fn close_pty(&mut self) {
        self.master.take();
    }

    fn kill(&mut self) -> std::io::Result<()> {
        self.child.kill()
    }

    fn wait(&mut self) -> std::io::Result<u32> {
        self.child.wait().map(|status| status.exit_code())
    }

    fn process_id(&self) -> Option<u32> {
        self.child.process_id()
    }
}
