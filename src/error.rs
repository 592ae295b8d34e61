use std::io;
use std::process::ExitStatus;
use std::sync::Arc;

use thiserror::Error;

/// Everything that can go wrong between spawning the encoder and the last
/// frame.
///
/// All variants are cheaply clonable (`io`/symphonia causes are behind `Arc`)
/// so the terminal outcome can be handed out by every [`wait`] call, not just
/// the first one.
///
/// [`wait`]: crate::provider::AudioProvider::wait
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The encoder executable could not be launched at all. Returned
    /// synchronously from construction; no provider exists afterwards.
    #[error("failed to start encoder `{exec}`")]
    Start {
        exec: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// The encoder terminated with a nonzero status while the provider was
    /// still open. Carries the raw status for diagnostics.
    #[error("encoder exited with {0}")]
    ProcessExited(ExitStatus),

    /// Waiting on the encoder process itself failed.
    #[error("failed to supervise encoder process")]
    Process(#[source] Arc<io::Error>),

    /// The encoder's output stream contained data the demuxer could not
    /// parse, or reading it failed with something other than end-of-stream.
    #[error("failed to decode ogg packet stream")]
    Decode(#[source] Arc<symphonia::core::errors::Error>),

    /// The caller closed the provider before the stream finished naturally.
    #[error("provider closed before completion")]
    Cancelled,
}

impl ProviderError {
    pub(crate) fn start(exec: impl Into<String>, source: io::Error) -> Self {
        Self::Start {
            exec: exec.into(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn decode(source: symphonia::core::errors::Error) -> Self {
        Self::Decode(Arc::new(source))
    }
}
