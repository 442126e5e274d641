//! Recording test double for the execution target

use std::io::{self, Read, Write};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{ExecOutput, RemoteError, RemoteExecutor, ShellHandle, TerminalSize};

/// One recorded interaction with the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Exec(String),
    Spawn(TerminalSize),
    Resize(TerminalSize),
    ClosePty,
    Kill,
    Wait,
}

type ExecResponder = dyn Fn(&str) -> Result<ExecOutput, RemoteError> + Send + Sync;

/// Mock implementation for testing
///
/// Shells produce the scripted output chunks and then either stay open until
/// their PTY is closed or killed, or end right away when configured with
/// [`MockRemoteExecutor::shell_exits_after_output`].
#[derive(Clone)]
pub struct MockRemoteExecutor {
    /// Record of calls, shared with every spawned shell
    calls: Arc<Mutex<Vec<MockCall>>>,
    /// Bytes written to any spawned shell
    written: Arc<Mutex<Vec<u8>>>,
    exec_responder: Arc<ExecResponder>,
    exec_delay: Option<Duration>,
    spawn_error: Option<String>,
    shell_output: Vec<Vec<u8>>,
    shell_exits: bool,
    exit_code: u32,
}

impl Default for MockRemoteExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemoteExecutor {
    /// Exec succeeds with no output; shells stay open with no output
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            written: Arc::new(Mutex::new(Vec::new())),
            exec_responder: Arc::new(|_: &str| {
                Ok::<_, RemoteError>(ExecOutput {
                    success: true,
                    output: String::new(),
                })
            }),
            exec_delay: None,
            spawn_error: None,
            shell_output: Vec::new(),
            shell_exits: false,
            exit_code: 0,
        }
    }

    /// Answer exec calls with `responder`
    pub fn with_exec<F>(mut self, responder: F) -> Self
    where
        F: Fn(&str) -> Result<ExecOutput, RemoteError> + Send + Sync + 'static,
    {
        self.exec_responder = Arc::new(responder);
        self
    }

    /// Sleep before answering exec calls
    pub fn with_exec_delay(mut self, delay: Duration) -> Self {
        self.exec_delay = Some(delay);
        self
    }

    /// Make every shell spawn fail with `reason`
    pub fn failing_spawn(mut self, reason: &str) -> Self {
        self.spawn_error = Some(reason.to_string());
        self
    }

    /// Output chunks every new shell produces
    pub fn with_shell_output(mut self, chunks: &[&[u8]]) -> Self {
        self.shell_output = chunks.iter().map(|c| c.to_vec()).collect();
        self
    }

    /// Shells end their output after the scripted chunks, like a shell that exited
    pub fn shell_exits_after_output(mut self) -> Self {
        self.shell_exits = true;
        self
    }

    /// All calls so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls equal to `call`
    pub fn count(&self, call: &MockCall) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    /// Everything written to spawned shells
    pub fn written(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RemoteExecutor for MockRemoteExecutor {
    fn describe(&self) -> String {
        "mock target".to_string()
    }

    async fn exec(&self, script: &str) -> Result<ExecOutput, RemoteError> {
        self.record(MockCall::Exec(script.to_string()));
        if let Some(delay) = self.exec_delay {
            tokio::time::sleep(delay).await;
        }
        (self.exec_responder)(script)
    }

    fn spawn_shell(&self, size: TerminalSize) -> Result<Box<dyn ShellHandle>, RemoteError> {
        self.record(MockCall::Spawn(size));
        if let Some(reason) = &self.spawn_error {
            return Err(RemoteError::SpawnFailed {
                program: "mock-shell".to_string(),
                reason: reason.clone(),
            });
        }

        let (tx, rx) = mpsc::channel();
        for chunk in &self.shell_output {
            // Receiver is alive in this scope
            let _ = tx.send(chunk.clone());
        }

        Ok(Box::new(MockShell {
            calls: self.calls.clone(),
            written: self.written.clone(),
            output_tx: (!self.shell_exits).then_some(tx),
            reader: Some(MockReader {
                rx,
                pending: Vec::new(),
            }),
            writer_taken: false,
            exit_code: self.exit_code,
        }))
    }
}

struct MockShell {
    calls: Arc<Mutex<Vec<MockCall>>>,
    written: Arc<Mutex<Vec<u8>>>,
    /// Stands in for the PTY master; dropping it ends the output stream
    output_tx: Option<mpsc::Sender<Vec<u8>>>,
    reader: Option<MockReader>,
    writer_taken: bool,
    exit_code: u32,
}

impl MockShell {
    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ShellHandle for MockShell {
    fn take_reader(&mut self) -> Result<Box<dyn Read + Send>, RemoteError> {
        self.reader
            .take()
            .map(|r| Box::new(r) as Box<dyn Read + Send>)
            .ok_or(RemoteError::AlreadyTaken("reader"))
    }

    fn take_writer(&mut self) -> Result<Box<dyn Write + Send>, RemoteError> {
        if self.writer_taken {
            return Err(RemoteError::AlreadyTaken("writer"));
        }
        self.writer_taken = true;
        Ok(Box::new(MockWriter {
            written: self.written.clone(),
        }))
    }

    fn resize(&self, size: TerminalSize) -> Result<(), RemoteError> {
        self.record(MockCall::Resize(size));
        Ok(())
    }

    fn close_pty(&mut self) {
        self.record(MockCall::ClosePty);
        self.output_tx.take();
    }

    fn kill(&mut self) -> io::Result<()> {
        self.record(MockCall::Kill);
        self.output_tx.take();
        Ok(())
    }

    fn wait(&mut self) -> io::Result<u32> {
        self.record(MockCall::Wait);
        Ok(self.exit_code)
    }

    fn process_id(&self) -> Option<u32> {
        None
    }
}

struct MockReader {
    rx: mpsc::Receiver<Vec<u8>>,
    pending: Vec<u8>,
}

impl Read for MockReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.rx.recv() {
                Ok(chunk) => self.pending = chunk,
                Err(_) => return Ok(0),
            }
        }
        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

struct MockWriter {
    written: Arc<Mutex<Vec<u8>>>,
}

impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
