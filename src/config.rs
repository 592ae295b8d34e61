use serde::{Deserialize, Serialize};

/// Default path to the encoder executable.
pub const DEFAULT_EXEC: &str = "ffmpeg";
/// Default channel count.
pub const DEFAULT_CHANNELS: u32 = 2;
/// Default output sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;
/// Default read-buffer size for the encoder's stdout, in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 65_307;

/// Options for an encoder-backed audio provider.
///
/// Immutable once handed to [`AudioProvider::new`]; unset fields take the
/// documented defaults. No validation happens here: a zero sample rate is
/// only rejected by the encoder process itself, and surfaces through
/// [`wait`].
///
/// [`AudioProvider::new`]: crate::provider::AudioProvider::new
/// [`wait`]: crate::provider::AudioProvider::wait
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the encoder executable.
    pub exec: String,
    /// Number of output channels.
    pub channels: u32,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Capacity of the buffered reader wrapping the encoder's stdout.
    pub buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exec: DEFAULT_EXEC.to_string(),
            channels: DEFAULT_CHANNELS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl Config {
    /// Start from the documented defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path to the encoder executable.
    pub fn with_exec(mut self, exec: impl Into<String>) -> Self {
        self.exec = exec.into();
        self
    }

    /// Set the number of output channels.
    pub fn with_channels(mut self, channels: u32) -> Self {
        self.channels = channels;
        self
    }

    /// Set the output sample rate in Hz.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the stdout read-buffer capacity in bytes.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }
}
