//! `gate.rs` - one-shot completion gate for the provider lifecycle.
//!
//! Three things can end a provider's life: the encoder process exiting, the
//! packet stream reaching its end (or failing), and an explicit close. The
//! gate folds all of them into a single outcome that is resolved exactly
//! once and observed consistently by every `wait` caller.

use parking_lot::{Condvar, Mutex};

use crate::error::ProviderError;

/// The terminal outcome of a provider: `Ok(())` for a clean run, otherwise
/// the first error any trigger reported.
pub type Outcome = Result<(), ProviderError>;

#[derive(Default)]
struct Inner {
    stream_done: bool,
    process_done: bool,
    outcome: Option<Outcome>,
}

/// Single-fire resolution gate.
///
/// Resolution policy: the first non-`None` error from either trigger wins
/// and resolves the gate immediately; a clean trigger on its own does not
/// resolve anything, both sides must finish cleanly for `Ok(())`. Once
/// resolved, later triggers only mark their side as done and never change
/// the outcome.
pub struct CompletionGate {
    inner: Mutex<Inner>,
    resolved: Condvar,
}

impl CompletionGate {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            resolved: Condvar::new(),
        }
    }

    /// The packet stream finished: `None` for a natural end-of-stream,
    /// `Some` for a decode failure.
    pub fn complete_stream(&self, error: Option<ProviderError>) {
        self.complete(error, |inner| &mut inner.stream_done);
    }

    /// The encoder process was reaped: `None` for a zero exit status,
    /// `Some` for a nonzero one (or a cancellation kill).
    pub fn complete_process(&self, error: Option<ProviderError>) {
        self.complete(error, |inner| &mut inner.process_done);
    }

    fn complete(&self, error: Option<ProviderError>, side: impl FnOnce(&mut Inner) -> &mut bool) {
        let mut inner = self.inner.lock();
        *side(&mut inner) = true;

        if inner.outcome.is_some() {
            return; // already resolved, later triggers are no-ops
        }
        if let Some(err) = error {
            inner.outcome = Some(Err(err));
        } else if inner.stream_done && inner.process_done {
            inner.outcome = Some(Ok(()));
        }
        if inner.outcome.is_some() {
            self.resolved.notify_all();
        }
    }

    /// Block until the gate resolves and return the recorded outcome.
    /// Safe to call any number of times, from any thread.
    pub fn wait(&self) -> Outcome {
        let mut inner = self.inner.lock();
        loop {
            if let Some(outcome) = &inner.outcome {
                return outcome.clone();
            }
            self.resolved.wait(&mut inner);
        }
    }

    /// Non-blocking peek at the outcome, `None` while still running.
    pub fn try_outcome(&self) -> Option<Outcome> {
        self.inner.lock().outcome.clone()
    }
}

impl Default for CompletionGate {
    fn default() -> Self {
        Self::new()
    }
}
