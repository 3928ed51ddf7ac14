use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use rodio::{OutputStreamHandle, Sink, Source};

use super::Wave;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// Returned by [`Audio::update`] when playback reaches the end of the wave.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    Finished,
    Looped,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Fade {
    None,
    In { timer: f32, duration: f32 },
    Out { timer: f32, duration: f32 },
}

impl Fade {
    fn gain(self) -> f32 {
        match self {
            Fade::None => 1.0,
            Fade::In { timer, duration } => (timer / duration).clamp(0.0, 1.0),
            Fade::Out { timer, duration } => (1.0 - timer / duration).clamp(0.0, 1.0),
        }
    }
}

/// One playable instance of a [`Wave`].
///
/// Playback position is kept in game time and advanced by `update`, so end
/// and loop events arrive on the game thread once per frame.
pub struct Audio {
    wave: Rc<Wave>,
    output: Option<OutputStreamHandle>,
    sink: Option<Sink>,
    master: Rc<Cell<f32>>,
    state: PlaybackState,
    looping: bool,
    volume: f32,
    speed: f32,
    /// Seconds into the wave.
    position: f64,
    fade: Fade,
}

impl Audio {
    pub(crate) fn new(wave: Rc<Wave>, output: Option<OutputStreamHandle>, master: Rc<Cell<f32>>) -> Self {
        Self {
            wave,
            output,
            sink: None,
            master,
            state: PlaybackState::Stopped,
            looping: false,
            volume: 1.0,
            speed: 1.0,
            position: 0.0,
            fade: Fade::None,
        }
    }

    #[inline]
    pub fn wave(&self) -> &Rc<Wave> {
        &self.wave
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Starts or resumes. A playing voice is left alone.
    pub fn play(&mut self) {
        match self.state {
            PlaybackState::Playing => {}
            PlaybackState::Paused => {
                if let Some(sink) = &self.sink {
                    sink.play();
                }
                self.state = PlaybackState::Playing;
            }
            PlaybackState::Stopped => {
                self.sink = self.open_sink();
                self.state = PlaybackState::Playing;
                self.apply_volume();
            }
        }
    }

    /// Plays from the first sample even if already playing.
    pub fn restart(&mut self) {
        self.stop();
        self.play();
    }

    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        self.state = PlaybackState::Paused;
    }

    /// Stops and rewinds.
    pub fn stop(&mut self) {
        self.sink = None;
        self.state = PlaybackState::Stopped;
        self.position = 0.0;
        self.fade = Fade::None;
    }

    /// Starts playing silent and ramps up to the voice volume over `duration` seconds.
    pub fn fade_in(&mut self, duration: f32) {
        self.fade = if duration > 0.0 {
            Fade::In { timer: 0.0, duration }
        } else {
            Fade::None
        };
        self.play();
        self.apply_volume();
    }

    /// Ramps down over `duration` seconds, then stops.
    pub fn fade_out(&mut self, duration: f32) {
        if self.state != PlaybackState::Playing {
            return;
        }
        if duration <= 0.0 {
            self.stop();
            return;
        }
        self.fade = Fade::Out { timer: 0.0, duration };
    }

    /// Applies to the next start; a playing voice keeps its current mode.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    #[inline]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Voice volume, `0.0..=1.0`, before fades and the master volume.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.apply_volume();
    }

    /// Gain actually sent to the output.
    pub fn effective_volume(&self) -> f32 {
        self.volume * self.fade.gain() * self.master.get()
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Playback rate; also shifts pitch. Non-positive ratios are ignored.
    pub fn set_speed(&mut self, ratio: f32) {
        if ratio <= 0.0 || !ratio.is_finite() {
            log::warn!("ignoring audio speed {ratio}");
            return;
        }
        self.speed = ratio;
        if let Some(sink) = &self.sink {
            sink.set_speed(ratio);
        }
    }

    pub fn duration(&self) -> Duration {
        self.wave.duration()
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_secs_f64(self.position)
    }

    pub fn remaining(&self) -> Duration {
        self.duration().saturating_sub(self.elapsed())
    }

    /// Advances fades and the playback position by `dt` seconds of game time.
    pub fn update(&mut self, dt: f32) -> Option<AudioEvent> {
        if self.state != PlaybackState::Playing {
            return None;
        }

        match &mut self.fade {
            Fade::None => {}
            Fade::In { timer, duration } => {
                *timer += dt;
                if *timer >= *duration {
                    self.fade = Fade::None;
                }
            }
            Fade::Out { timer, duration } => {
                *timer += dt;
                if *timer >= *duration {
                    self.stop();
                    return None;
                }
            }
        }
        self.apply_volume();

        let length = self.wave.duration().as_secs_f64();
        self.position += f64::from(dt * self.speed);
        if self.position < length {
            return None;
        }
        if self.looping {
            self.position %= length;
            Some(AudioEvent::Looped)
        } else {
            self.stop();
            Some(AudioEvent::Finished)
        }
    }

    fn open_sink(&self) -> Option<Sink> {
        let output = self.output.as_ref()?;
        let sink = match Sink::try_new(output) {
            Ok(sink) => sink,
            Err(err) => {
                log::warn!("audio voice unavailable: {err}");
                return None;
            }
        };
        let source = self.wave.source();
        if self.looping {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }
        sink.set_speed(self.speed);
        Some(sink)
    }

    fn apply_volume(&self) {
        if let Some(sink) = &self.sink {
            sink.set_volume(self.effective_volume());
        }
    }
}

impl fmt::Debug for Audio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Audio")
            .field("state", &self.state)
            .field("looping", &self.looping)
            .field("volume", &self.volume)
            .field("speed", &self.speed)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioEngine;

    /// Half a second of silence at 100 Hz.
    fn voice(engine: &AudioEngine) -> Audio {
        let wave = Wave::from_samples(1, 100, vec![0; 50]).unwrap();
        engine.voice(Rc::new(wave))
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    // ── playback ──────────────────────────────────────────────────────────

    #[test]
    fn one_shot_finishes_and_rewinds() {
        let engine = AudioEngine::silent();
        let mut audio = voice(&engine);
        assert_eq!(audio.update(1.0), None);

        audio.play();
        assert_eq!(audio.update(0.3), None);
        assert!(audio.is_playing());
        assert_eq!(audio.update(0.3), Some(AudioEvent::Finished));
        assert_eq!(audio.state(), PlaybackState::Stopped);
        assert_eq!(audio.elapsed(), Duration::ZERO);
    }

    #[test]
    fn looping_voice_wraps() {
        let engine = AudioEngine::silent();
        let mut audio = voice(&engine);
        audio.set_looping(true);
        audio.play();

        assert_eq!(audio.update(0.75), Some(AudioEvent::Looped));
        assert!(audio.is_playing());
        assert!((audio.elapsed().as_secs_f64() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn paused_voice_keeps_its_place() {
        let engine = AudioEngine::silent();
        let mut audio = voice(&engine);
        audio.play();
        audio.update(0.2);
        audio.pause();
        assert_eq!(audio.update(5.0), None);
        assert_eq!(audio.state(), PlaybackState::Paused);

        audio.play();
        assert!((audio.remaining().as_secs_f64() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn speed_scales_elapsed_time() {
        let engine = AudioEngine::silent();
        let mut audio = voice(&engine);
        audio.set_speed(0.0);
        assert_eq!(audio.speed(), 1.0);
        audio.set_speed(2.0);
        audio.play();
        assert_eq!(audio.update(0.25), Some(AudioEvent::Finished));
    }

    // ── volume ────────────────────────────────────────────────────────────

    #[test]
    fn fade_in_ramps_to_voice_volume() {
        let engine = AudioEngine::silent();
        let mut audio = voice(&engine);
        audio.set_volume(0.8);
        audio.fade_in(0.2);
        assert!(audio.is_playing());
        assert!(close(audio.effective_volume(), 0.0));

        audio.update(0.1);
        assert!(close(audio.effective_volume(), 0.4));
        audio.update(0.1);
        assert!(close(audio.effective_volume(), 0.8));
    }

    #[test]
    fn fade_out_stops_at_the_end() {
        let engine = AudioEngine::silent();
        let mut audio = voice(&engine);
        audio.play();
        audio.fade_out(0.2);
        audio.update(0.1);
        assert!(close(audio.effective_volume(), 0.5));
        assert_eq!(audio.update(0.1), None);
        assert_eq!(audio.state(), PlaybackState::Stopped);
    }

    #[test]
    fn master_volume_scales_every_voice() {
        let mut engine = AudioEngine::silent();
        let mut audio = voice(&engine);
        audio.set_volume(0.5);
        engine.set_volume(0.5);
        assert!(close(audio.effective_volume(), 0.25));
        engine.set_volume(3.0);
        assert_eq!(engine.volume(), 1.0);
    }
}
