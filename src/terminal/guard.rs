//! Release-once ownership of a terminal's shell process

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::remote::{RemoteError, ShellHandle, TerminalSize};

/// Owns the PTY and child of one terminal session.
///
/// `release` closes the PTY, kills the child and reaps it. Only the first
/// call does anything; `Drop` releases whatever is still held.
pub struct ShellGuard {
    shell: Mutex<Option<Box<dyn ShellHandle>>>,
}

impl ShellGuard {
    pub fn new(shell: Box<dyn ShellHandle>) -> Self {
        Self {
            shell: Mutex::new(Some(shell)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn ShellHandle>>> {
        self.shell.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn resize(&self, size: TerminalSize) -> Result<(), RemoteError> {
        match self.lock().as_ref() {
            Some(shell) => shell.resize(size),
            None => Err(RemoteError::Pty("shell already released".to_string())),
        }
    }

    pub fn is_released(&self) -> bool {
        self.lock().is_none()
    }

    /// Tear the shell down and return its exit code, if it could be reaped.
    ///
    /// Blocks while waiting for the child; call from a blocking context.
    pub fn release(&self) -> Option<u32> {
        let shell = self.lock().take()?;
        teardown(shell)
    }
}

fn teardown(mut shell: Box<dyn ShellHandle>) -> Option<u32> {
    let pid = shell.process_id();

    shell.close_pty();
    if let Err(e) = shell.kill() {
        // Already exited
        debug!(?pid, "Kill failed: {}", e);
    }
    match shell.wait() {
        Ok(code) => {
            debug!(?pid, exit_code = code, "Shell released");
            Some(code)
        }
        Err(e) => {
            warn!(?pid, "Failed to reap shell process: {}", e);
            None
        }
    }
}

/// Dropping a guard that was never released happens when a session is
/// cancelled. Inside a runtime the teardown moves to the blocking pool so the
/// reap does not stall a worker thread; a runtime that is already shutting
/// down discards that task, leaving the child to be reaped by its parent's exit.
impl Drop for ShellGuard {
    fn drop(&mut self) {
        let Some(shell) = self.lock().take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || teardown(shell));
            }
            Err(_) => {
                teardown(shell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MockCall, MockRemoteExecutor, RemoteExecutor};

    fn guard(mock: &MockRemoteExecutor) -> ShellGuard {
        ShellGuard::new(mock.spawn_shell(TerminalSize::default()).unwrap())
    }

    fn cleanup_counts(mock: &MockRemoteExecutor) -> (usize, usize, usize) {
        (
            mock.count(&MockCall::ClosePty),
            mock.count(&MockCall::Kill),
            mock.count(&MockCall::Wait),
        )
    }

    #[test]
    fn test_release_runs_once() {
        let mock = MockRemoteExecutor::new();
        let guard = guard(&mock);

        assert_eq!(guard.release(), Some(0));
        assert_eq!(guard.release(), None);
        assert!(guard.is_released());
        drop(guard);

        assert_eq!(cleanup_counts(&mock), (1, 1, 1));
    }

    #[test]
    fn test_release_order() {
        let mock = MockRemoteExecutor::new();
        guard(&mock).release();

        let calls = mock.calls();
        assert_eq!(
            &calls[1..],
            &[MockCall::ClosePty, MockCall::Kill, MockCall::Wait]
        );
    }

    #[test]
    fn test_drop_releases() {
        let mock = MockRemoteExecutor::new();
        drop(guard(&mock));
        assert_eq!(cleanup_counts(&mock), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_drop_inside_runtime_releases_on_blocking_pool() {
        let mock = MockRemoteExecutor::new();
        drop(guard(&mock));

        for _ in 0..100 {
            if mock.count(&MockCall::Wait) == 1 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(cleanup_counts(&mock), (1, 1, 1));
    }

    #[test]
    fn test_resize_after_release_fails() {
        let mock = MockRemoteExecutor::new();
        let guard = guard(&mock);

        let size = TerminalSize { rows: 40, cols: 120 };
        guard.resize(size).unwrap();
        guard.release();
        assert!(guard.resize(size).is_err());
        assert_eq!(mock.count(&MockCall::Resize(size)), 1);
    }
}
