use std::f64::consts::TAU;
use std::io::Cursor;
use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, Source};

use super::AudioError;

const TONE_SAMPLE_RATE: u32 = 8192;
const TONE_FIRST_HZ: f64 = 650.0;
const TONE_SECOND_HZ: f64 = 450.0;

/// Decoded 16-bit PCM, interleaved by channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    channels: u16,
    sample_rate: u32,
    samples: Vec<i16>,
}

impl Wave {
    pub fn from_samples(channels: u16, sample_rate: u32, samples: Vec<i16>) -> Result<Self, AudioError> {
        if channels == 0 || sample_rate == 0 || samples.is_empty() {
            return Err(AudioError::Empty);
        }
        Ok(Self {
            channels,
            sample_rate,
            samples,
        })
    }

    /// Decodes an encoded file (WAV) held in memory.
    pub fn decode(bytes: &[u8]) -> Result<Self, AudioError> {
        let decoder = Decoder::new(Cursor::new(bytes.to_vec())).map_err(AudioError::Decode)?;
        let (channels, sample_rate) = (decoder.channels(), decoder.sample_rate());
        Self::from_samples(channels, sample_rate, decoder.collect())
    }

    /// One second of mono beeping, two notes; stands in for audio that failed to load.
    pub fn tone() -> Self {
        let frames = TONE_SAMPLE_RATE as usize;
        let rate = f64::from(TONE_SAMPLE_RATE);
        let samples = (0..frames)
            .map(|i| {
                let hz = if i < frames / 2 { TONE_FIRST_HZ } else { TONE_SECOND_HZ };
                (f64::from(i16::MAX) * (TAU * hz / rate * i as f64).sin()) as i16
            })
            .collect();
        Self {
            channels: 1,
            sample_rate: TONE_SAMPLE_RATE,
            samples,
        }
    }

    #[inline]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Sample frames, one sample per channel each.
    pub fn frames(&self) -> u64 {
        (self.samples.len() / usize::from(self.channels)) as u64
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub(crate) fn source(&self) -> SamplesBuffer<i16> {
        SamplesBuffer::new(self.channels, self.sample_rate, self.samples.clone())
    }
}
