//! `provider.rs` - the encoder-backed Opus frame provider.
//!
//! Construction spawns the encoder and wires the pipes; after that the
//! caller pulls frames one at a time while the supervisor's threads watch
//! the process. Process exit, stream end and explicit close all funnel into
//! one [`CompletionGate`] resolution, so `wait` reports exactly one outcome
//! no matter how the run ends.

use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::debug;

use crate::config::Config;
use crate::decode::FrameDecoder;
use crate::error::ProviderError;
use crate::gate::CompletionGate;
use crate::process::Supervisor;

/// Pull-based source of encoded Opus frames.
///
/// The seam towards any frame-consuming collaborator (a voice transport's
/// send loop, typically): one consumer thread drives `provide_frame` while
/// `close` and `wait` may be called from anywhere.
pub trait OpusFrameProvider: Send + Sync {
    /// Next frame, `Ok(None)` at end-of-stream, `Err` on a decode fault.
    fn provide_frame(&self) -> Result<Option<Bytes>, ProviderError>;

    /// Request termination. Idempotent, non-blocking.
    fn close(&self);

    /// Block until the provider reaches its terminal state and return the
    /// recorded outcome. Idempotent.
    fn wait(&self) -> Result<(), ProviderError>;
}

/// Supervises an external encoder process and yields the Opus frames it
/// produces, in emission order.
///
/// The child process and both pipe ends are owned exclusively by this
/// provider; nothing else reads, writes or signals them. Dropping the
/// provider mid-run kills and reaps the child.
pub struct AudioProvider {
    supervisor: Supervisor,
    decoder: Mutex<FrameDecoder>,
    gate: Arc<CompletionGate>,
    closed: Arc<AtomicBool>,
}

impl AudioProvider {
    /// Spawn the configured encoder with `source` as its input.
    ///
    /// Fails synchronously with [`ProviderError::Start`] if the process
    /// cannot be launched; nothing is retained in that case. A process that
    /// starts but misbehaves later is only observed through
    /// [`provide_frame`](Self::provide_frame) and [`wait`](Self::wait).
    pub fn new<R>(source: R, config: Config) -> Result<Self, ProviderError>
    where
        R: Read + Send + 'static,
    {
        let gate = Arc::new(CompletionGate::new());
        let closed = Arc::new(AtomicBool::new(false));
        let (supervisor, stdout) =
            Supervisor::start(&config, source, gate.clone(), closed.clone())?;
        Ok(Self {
            supervisor,
            decoder: Mutex::new(FrameDecoder::new(stdout, config.buffer_size)),
            gate,
            closed,
        })
    }

    /// Pull the next encoded frame, blocking until one is available, the
    /// stream ends, or decoding fails. End-of-stream (`Ok(None)`) covers
    /// both the natural end and a stream cut short by [`close`](Self::close).
    pub fn provide_frame(&self) -> Result<Option<Bytes>, ProviderError> {
        let mut decoder = self.decoder.lock();
        match decoder.next_frame(self.closed.load(Ordering::Acquire)) {
            Ok(Some(frame)) => Ok(Some(frame)),
            Ok(None) => {
                self.gate.complete_stream(None);
                Ok(None)
            }
            Err(e) => {
                // a close may have landed while we were blocked mid-read;
                // whatever the torn stream produced is not a fault then
                if self.closed.load(Ordering::Acquire) {
                    self.gate.complete_stream(None);
                    return Ok(None);
                }
                self.gate.complete_stream(Some(e.clone()));
                Err(e)
            }
        }
    }

    /// Request termination: the encoder is killed, any blocked
    /// [`provide_frame`](Self::provide_frame) call unblocks with
    /// end-of-stream shortly after, and [`wait`](Self::wait) resolves.
    /// Returns immediately; safe to call any number of times, including
    /// after natural completion.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!("closing audio provider");
        self.supervisor.signal_close();
        // the consumer may never pull another frame after closing, so the
        // stream-side trigger has to fire here rather than in provide_frame;
        // a no-op if the gate already resolved naturally
        self.gate.complete_stream(Some(ProviderError::Cancelled));
    }

    /// Block until the terminal outcome is resolved: `Ok(())` for a clean
    /// end, [`ProviderError::ProcessExited`] for a nonzero exit,
    /// [`ProviderError::Decode`] for a stream fault, or
    /// [`ProviderError::Cancelled`] after a [`close`](Self::close) that
    /// preempted natural completion.
    pub fn wait(&self) -> Result<(), ProviderError> {
        self.gate.wait()
    }
}

impl OpusFrameProvider for AudioProvider {
    fn provide_frame(&self) -> Result<Option<Bytes>, ProviderError> {
        AudioProvider::provide_frame(self)
    }

    fn close(&self) {
        AudioProvider::close(self);
    }

    fn wait(&self) -> Result<(), ProviderError> {
        AudioProvider::wait(self)
    }
}
