/// Frames per second averaged over fixed windows.
///
/// The reported value changes once per window, which keeps an on-screen
/// readout legible.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: f32,
    accumulated: f32,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::with_window(1.0)
    }

    pub fn with_window(seconds: f32) -> Self {
        Self {
            window: seconds,
            accumulated: 0.0,
            frames: 0,
            fps: 0.0,
        }
    }

    pub fn record(&mut self, dt: f32) {
        self.accumulated += dt;
        self.frames += 1;
        if self.accumulated >= self.window {
            self.fps = self.frames as f32 / self.accumulated;
            self.accumulated = 0.0;
            self.frames = 0;
        }
    }

    /// Average of the last complete window; zero before the first one ends.
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
