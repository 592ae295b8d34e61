//! Pull-based Opus frames from an external encoder process.
//!
//! `opuspipe` feeds an arbitrary audio byte stream to an `ffmpeg` child
//! process and demuxes the Ogg/Opus stream it produces into discrete
//! frames, one per [`AudioProvider::provide_frame`] call. The caller never
//! touches subprocess management, pipes or container parsing, only the
//! three-operation contract `provide_frame` / `close` / `wait`.
//!
//! ```no_run
//! use std::fs::File;
//!
//! use opuspipe::{AudioProvider, Config};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = File::open("track.mp3")?;
//!     let provider = AudioProvider::new(source, Config::default())?;
//!
//!     while let Some(frame) = provider.provide_frame()? {
//!         // hand `frame` to the voice transport
//!         let _ = frame;
//!     }
//!
//!     provider.wait()?;
//!     Ok(())
//! }
//! ```
//!
//! Any `Read` works as a source, including another process's stdout:
//!
//! ```no_run
//! use std::process::{Command, Stdio};
//!
//! use opuspipe::{AudioProvider, Config};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut ytdlp = Command::new("yt-dlp")
//!         .args(["-x", "-o", "-", "https://www.youtube.com/watch?v=jfKfPfyJRdk"])
//!         .stdout(Stdio::piped())
//!         .spawn()?;
//!     let audio = ytdlp.stdout.take().expect("piped stdout");
//!
//!     let provider = AudioProvider::new(audio, Config::default())?;
//!     while let Some(frame) = provider.provide_frame()? {
//!         let _ = frame;
//!     }
//!     provider.wait()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod gate;
pub mod process;
pub mod provider;

pub use config::Config;
pub use error::ProviderError;
pub use provider::{AudioProvider, OpusFrameProvider};
