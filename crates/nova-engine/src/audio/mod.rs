//! Sound playback on rodio: decoded waves, an output engine and playable voices.

mod engine;
mod voice;
mod wave;

pub use engine::AudioEngine;
pub use voice::{Audio, AudioEvent, PlaybackState};
pub use wave::Wave;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to decode audio")]
    Decode(#[source] rodio::decoder::DecoderError),

    #[error("no audio output device")]
    Output(#[source] rodio::StreamError),

    #[error("failed to open an audio voice")]
    Voice(#[source] rodio::PlayError),

    #[error("audio has no samples")]
    Empty,
}

/// Minimal PCM WAV file: 16-bit, `channels` interleaved.
#[cfg(test)]
pub(crate) fn test_wav(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let block_align = channels * 2;
    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * u32::from(block_align)).to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}
