//! `decode.rs` - Ogg container -> raw Opus packet extraction.
//!
//! Wraps the encoder's stdout in symphonia's Ogg demuxer and yields one raw
//! Opus packet per call, ready to be handed to a voice transport without
//! re-encoding. Strictly pull-based: no read happens outside `next_frame`,
//! and the container probe itself is deferred to the first call so that
//! constructing a provider never blocks on encoder output.

use std::io::{BufReader, Read};
use std::mem;

use bytes::Bytes;
use symphonia::core::{
    codecs::CODEC_TYPE_OPUS,
    errors::Error as SymphoniaError,
    formats::{FormatOptions, FormatReader},
    io::{MediaSourceStream, ReadOnlySource},
    meta::MetadataOptions,
    probe::Hint,
};
use tracing::debug;

use crate::error::ProviderError;

enum State {
    /// Stream attached, container not probed yet.
    Pending(MediaSourceStream),
    /// Probed; packets are being pulled from the Opus track.
    Streaming {
        format: Box<dyn FormatReader>,
        track_id: u32,
    },
    /// End-of-stream or error already reported; stays exhausted.
    Finished,
}

/// Lazy, finite sequence of Opus frames over a byte stream.
///
/// Single-consumer: one thread at a time drives `next_frame`. The decoder
/// takes no lock of its own, concurrent close/wait never contend with it.
pub struct FrameDecoder {
    state: State,
}

impl FrameDecoder {
    /// Attach to `stream`, buffering reads with `buffer_size` bytes.
    pub fn new<R>(stream: R, buffer_size: usize) -> Self
    where
        R: Read + Send + Sync + 'static,
    {
        let reader = BufReader::with_capacity(buffer_size, stream);
        let mss = MediaSourceStream::new(Box::new(ReadOnlySource::new(reader)), Default::default());
        Self {
            state: State::Pending(mss),
        }
    }

    /// Pull the next raw Opus packet.
    ///
    /// Blocks until a full packet is available. `Ok(None)` is the explicit
    /// end-of-stream: a natural upstream end, or any condition after the
    /// provider was closed (`closed` tells us closure was requested, so
    /// whatever the truncated stream looks like is not a fault). Anything
    /// else is a decode error, reported once; the decoder is exhausted
    /// afterwards.
    pub fn next_frame(&mut self, closed: bool) -> Result<Option<Bytes>, ProviderError> {
        loop {
            match mem::replace(&mut self.state, State::Finished) {
                State::Pending(mss) => match Self::probe(mss) {
                    Ok(Some((format, track_id))) => {
                        self.state = State::Streaming { format, track_id };
                    }
                    // stream ended before a container header ever arrived
                    Ok(None) => return Ok(None),
                    Err(_) if closed => {
                        debug!("container probe cut short by close");
                        return Ok(None);
                    }
                    Err(e) => return Err(e),
                },
                State::Streaming {
                    mut format,
                    track_id,
                } => {
                    let packet = match format.next_packet() {
                        Ok(p) => p,
                        Err(SymphoniaError::IoError(e))
                            if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                        {
                            debug!("opus packet stream reached end-of-stream");
                            return Ok(None);
                        }
                        Err(_) if closed => return Ok(None),
                        Err(e) => return Err(ProviderError::decode(e)),
                    };

                    if packet.track_id() != track_id {
                        self.state = State::Streaming { format, track_id };
                        continue;
                    }

                    let frame = Bytes::from(Vec::from(packet.data));
                    self.state = State::Streaming { format, track_id };
                    return Ok(Some(frame));
                }
                State::Finished => return Ok(None),
            }
        }
    }

    /// Probe the container and locate the Opus track. `Ok(None)` when the
    /// stream ends before any header bytes.
    #[allow(clippy::type_complexity)]
    fn probe(
        mss: MediaSourceStream,
    ) -> Result<Option<(Box<dyn FormatReader>, u32)>, ProviderError> {
        let mut hint = Hint::new();
        hint.with_extension("ogg");

        let probed = match symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        ) {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                return Ok(None);
            }
            Err(e) => return Err(ProviderError::decode(e)),
        };

        let format = probed.format;
        let track_id = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec == CODEC_TYPE_OPUS)
            .map(|t| t.id);

        match track_id {
            Some(id) => Ok(Some((format, id))),
            None => Err(ProviderError::decode(SymphoniaError::Unsupported(
                "no opus track in container",
            ))),
        }
    }
}
