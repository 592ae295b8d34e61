//! `process.rs` - spawns and supervises the external encoder.
//!
//! The child process is owned exclusively by a dedicated waiter thread: it
//! is the only place that reaps the exit status or sends a kill. A feeder
//! thread copies the caller's source into the encoder's stdin; the stdout
//! pipe is handed to the frame decoder. Everything the process does on exit
//! is reported through the [`CompletionGate`].

use std::io::{self, Read};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ProviderError;
use crate::gate::CompletionGate;

/// How often the waiter thread polls the child between close-signal checks.
/// Bounds both the kill latency after `close` and the reap latency after a
/// natural exit.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Argument template for the encoder invocation: raw audio on stdin, an
/// Ogg/Opus stream at 96 kbit/s on stdout. Only the channel count and the
/// sample rate are parameterized.
fn encoder_args(config: &Config) -> Vec<String> {
    vec![
        "-i".into(),
        "pipe:0".into(),
        "-c:a".into(),
        "libopus".into(),
        "-ac".into(),
        config.channels.to_string(),
        "-ar".into(),
        config.sample_rate.to_string(),
        "-f".into(),
        "ogg".into(),
        "-b:a".into(),
        "96K".into(),
        "pipe:1".into(),
    ]
}

/// Handle to the running encoder. Holds the sender half of the close
/// channel; dropping it counts as a close request, so an abandoned provider
/// can never leave an unreaped child behind.
pub(crate) struct Supervisor {
    close_tx: flume::Sender<()>,
}

impl Supervisor {
    /// Spawn the encoder, wire `source` to its stdin and return its stdout
    /// for the decoder. A spawn failure is reported synchronously and
    /// retains nothing.
    pub(crate) fn start<R>(
        config: &Config,
        source: R,
        gate: Arc<CompletionGate>,
        closed: Arc<AtomicBool>,
    ) -> Result<(Self, ChildStdout), ProviderError>
    where
        R: Read + Send + 'static,
    {
        let mut child = Command::new(&config.exec)
            .args(encoder_args(config))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ProviderError::start(&config.exec, e))?;

        let (Some(mut stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            // both ends were requested as pipes, so this cannot happen; kill
            // rather than leak if it somehow does
            let _ = child.kill();
            let _ = child.wait();
            return Err(ProviderError::start(
                &config.exec,
                io::Error::other("encoder pipes missing after spawn"),
            ));
        };

        debug!(exec = %config.exec, pid = child.id(), "encoder started");

        // Feeder: source -> encoder stdin. Dropping stdin at the end is the
        // encoder's EOF. A broken pipe here just means the child died first.
        thread::spawn(move || {
            let mut source = source;
            match io::copy(&mut source, &mut stdin) {
                Ok(n) => debug!(bytes = n, "source fully fed to encoder"),
                Err(e) => debug!("stopped feeding encoder: {e}"),
            }
        });

        let (close_tx, close_rx) = flume::bounded::<()>(1);
        thread::spawn(move || match reap(child, close_rx) {
            Ok(status) => {
                if status.success() {
                    debug!("encoder exited cleanly");
                    gate.complete_process(None);
                } else if closed.load(Ordering::Acquire) {
                    debug!("encoder terminated after close: {status}");
                    gate.complete_process(Some(ProviderError::Cancelled));
                } else {
                    warn!("encoder exited with {status}");
                    gate.complete_process(Some(ProviderError::ProcessExited(status)));
                }
            }
            Err(e) => {
                warn!("failed to reap encoder: {e}");
                gate.complete_process(Some(ProviderError::Process(Arc::new(e))));
            }
        });

        Ok((Self { close_tx }, stdout))
    }

    /// Ask the waiter thread to kill the child. Non-blocking and idempotent;
    /// a no-op once the child has already been reaped.
    pub(crate) fn signal_close(&self) {
        let _ = self.close_tx.try_send(());
    }
}

/// Wait for the child to exit, killing it first if a close is signalled or
/// the provider is dropped. Always reaps: the loop only returns with an
/// exit status (or a wait error), never with a live child.
fn reap(mut child: Child, close_rx: flume::Receiver<()>) -> io::Result<ExitStatus> {
    let mut killed = false;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        match close_rx.recv_timeout(POLL_INTERVAL) {
            Ok(()) | Err(flume::RecvTimeoutError::Disconnected) => {
                if killed {
                    // already signalled; give the child time to die
                    thread::sleep(POLL_INTERVAL);
                } else {
                    killed = true;
                    if let Err(e) = child.kill() {
                        debug!("encoder kill failed: {e}");
                    }
                }
            }
            Err(flume::RecvTimeoutError::Timeout) => {}
        }
    }
}
