use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use rodio::{OutputStream, OutputStreamHandle};

use super::voice::Audio;
use super::{AudioError, Wave};

/// Owner of the audio output and the master volume.
///
/// Without an output device the engine is silent: voices still keep time and
/// report events, they just make no sound.
pub struct AudioEngine {
    output: Option<(OutputStream, OutputStreamHandle)>,
    master: Rc<Cell<f32>>,
}

impl AudioEngine {
    /// Opens the default output device, falling back to a silent engine.
    pub fn new() -> Self {
        match Self::open() {
            Ok(engine) => engine,
            Err(err) => {
                log::warn!("audio disabled: {err}");
                Self::silent()
            }
        }
    }

    pub fn open() -> Result<Self, AudioError> {
        let output = OutputStream::try_default().map_err(AudioError::Output)?;
        log::info!("audio output opened");
        Ok(Self {
            output: Some(output),
            master: Rc::new(Cell::new(1.0)),
        })
    }

    pub fn silent() -> Self {
        Self {
            output: None,
            master: Rc::new(Cell::new(1.0)),
        }
    }

    #[inline]
    pub fn is_silent(&self) -> bool {
        self.output.is_none()
    }

    /// Master volume applied on top of every voice, `0.0..=1.0`.
    #[inline]
    pub fn volume(&self) -> f32 {
        self.master.get()
    }

    /// Takes effect on each voice at its next `update`.
    pub fn set_volume(&mut self, volume: f32) {
        self.master.set(volume.clamp(0.0, 1.0));
    }

    /// A stopped voice playing `wave`.
    pub fn voice(&self, wave: Rc<Wave>) -> Audio {
        let output = self.output.as_ref().map(|(_, handle)| handle.clone());
        Audio::new(wave, output, Rc::clone(&self.master))
    }
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AudioEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioEngine")
            .field("silent", &self.is_silent())
            .field("volume", &self.volume())
            .finish()
    }
}
