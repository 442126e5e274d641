//! Per-connection byte relay between a client socket and a PTY shell

use std::fmt::Display;
use std::io::{ErrorKind, Read, Write};
use std::sync::Arc;

use axum::extract::ws::Message;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use super::frame::{classify, Inbound};
use super::guard::ShellGuard;
use crate::config::TerminalConfig;
use crate::remote::{RemoteExecutor, TerminalSize};

/// PTY reads are forwarded in chunks of at most this many bytes
const READ_CHUNK: usize = 4096;
const CHANNEL_DEPTH: usize = 64;

/// Why a terminal session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client closed the socket or stopped reading
    ClientClosed,
    /// The shell's output ended
    ShellExited,
    /// No shell could be started; the client got a one-line explanation
    SpawnFailed(String),
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub end: SessionEnd,
    /// Exit code of the reaped shell; `None` when nothing was spawned
    pub exit_code: Option<u32>,
}

/// Starts one shell per connection and relays bytes until either side closes
pub struct TerminalBridge {
    executor: Arc<dyn RemoteExecutor>,
    default_size: TerminalSize,
}

impl TerminalBridge {
    pub fn new(executor: Arc<dyn RemoteExecutor>, config: &TerminalConfig) -> Self {
        Self {
            executor,
            default_size: TerminalSize::new(config.rows, config.cols).unwrap_or_default(),
        }
    }

    pub fn default_size(&self) -> TerminalSize {
        self.default_size
    }

    /// Run a session over an already-upgraded socket, split into its halves.
    ///
    /// Returns after the shell has been released, whichever side ended first.
    pub async fn run<S, R, E>(&self, sink: S, stream: R, size: Option<TerminalSize>) -> SessionSummary
    where
        S: Sink<Message> + Unpin,
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
    {
        let session_id = Uuid::new_v4();
        let size = size.unwrap_or(self.default_size);
        let (end, exit_code) = self
            .relay(sink, stream, size)
            .instrument(info_span!("terminal", %session_id))
            .await;

        SessionSummary {
            session_id,
            end,
            exit_code,
        }
    }

    async fn relay<S, R, E>(
        &self,
        mut sink: S,
        mut stream: R,
        size: TerminalSize,
    ) -> (SessionEnd, Option<u32>)
    where
        S: Sink<Message> + Unpin,
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
    {
        let mut shell = match self.executor.spawn_shell(size) {
            Ok(shell) => shell,
            Err(e) => return (refuse(&mut sink, e.to_string()).await, None),
        };
        let io = shell
            .take_reader()
            .and_then(|reader| Ok((reader, shell.take_writer()?)));
        let guard = Arc::new(ShellGuard::new(shell));

        let (reader, writer) = match io {
            Ok(io) => io,
            Err(e) => {
                let end = refuse(&mut sink, e.to_string()).await;
                return (end, release(guard).await);
            }
        };

        info!(
            target_shell = %self.executor.describe(),
            rows = size.rows,
            cols = size.cols,
            "Terminal session started"
        );

        let (output_tx, mut output_rx) = mpsc::channel::<Vec<u8>>(CHANNEL_DEPTH);
        let (input_tx, input_rx) = mpsc::channel::<Vec<u8>>(CHANNEL_DEPTH);

        let span = Span::current();
        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            pump_output(reader, output_tx)
        });
        let span = Span::current();
        let writer_task = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            pump_input(writer, input_rx)
        });

        let outbound = async {
            while let Some(chunk) = output_rx.recv().await {
                if sink.send(Message::Binary(chunk)).await.is_err() {
                    return SessionEnd::ClientClosed;
                }
            }
            SessionEnd::ShellExited
        };

        let inbound = async {
            while let Some(frame) = stream.next().await {
                let message = match frame {
                    Ok(message) => message,
                    Err(e) => {
                        debug!("Socket read failed: {}", e);
                        break;
                    }
                };
                match classify(message) {
                    Inbound::Input(bytes) => {
                        if input_tx.send(bytes).await.is_err() {
                            return SessionEnd::ShellExited;
                        }
                    }
                    Inbound::Resize(size) => match guard.resize(size) {
                        Ok(()) => debug!(rows = size.rows, cols = size.cols, "Terminal resized"),
                        Err(e) => debug!("Resize failed: {}", e),
                    },
                    Inbound::Ignore => {}
                    Inbound::Close => break,
                }
            }
            SessionEnd::ClientClosed
        };

        let end = tokio::select! {
            end = outbound => end,
            end = inbound => end,
        };

        // Unblock both pump threads before tearing the shell down
        drop(output_rx);
        drop(input_tx);
        let _ = sink.close().await;

        let exit_code = release(guard).await;
        if let Err(e) = writer_task.await {
            warn!("Terminal input task failed: {}", e);
        }

        info!(?end, ?exit_code, "Terminal session ended");
        (end, exit_code)
    }
}

async fn refuse<S>(sink: &mut S, reason: String) -> SessionEnd
where
    S: Sink<Message> + Unpin,
{
    warn!("Failed to start terminal: {}", reason);
    let _ = sink
        .send(Message::Text(format!("Failed to start terminal: {}", reason)))
        .await;
    let _ = sink.close().await;
    SessionEnd::SpawnFailed(reason)
}

async fn release(guard: Arc<ShellGuard>) -> Option<u32> {
    match tokio::task::spawn_blocking(move || guard.release()).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            warn!("Shell release task failed: {}", e);
            None
        }
    }
}

fn pump_output(mut reader: Box<dyn Read + Send>, output: mpsc::Sender<Vec<u8>>) {
    let mut buf = [0u8; READ_CHUNK];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if output.blocking_send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            // EIO once the shell side of the PTY is gone
            Err(e) => {
                debug!("PTY read ended: {}", e);
                break;
            }
        }
    }
}

fn pump_input(mut writer: Box<dyn Write + Send>, mut input: mpsc::Receiver<Vec<u8>>) {
    while let Some(bytes) = input.blocking_recv() {
        if let Err(e) = writer.write_all(&bytes).and_then(|_| writer.flush()) {
            debug!("PTY write failed: {}", e);
            break;
        }
    }
}
