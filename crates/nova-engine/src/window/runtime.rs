use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowId};

use crate::audio::AudioEngine;
use crate::config::{AudioConfig, EngineConfig};
use crate::coords::Viewport;
use crate::core::{AppControl, DebugOverlay, Game, OverlayStats, StartCtx, UpdateCtx};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::input::{platform, InputFrame, InputState};
use crate::paint::Color;
use crate::render::{BatchRenderer, WgpuDevice};
use crate::resources::ResourceManager;
use crate::time::FrameClock;

const OVERLAY_FONT_PX: u32 = 16;

/// Entry point: opens the window and drives `game` until it exits or the window closes.
pub struct Runtime;

impl Runtime {
    pub fn run<G>(config: EngineConfig, game: G) -> Result<()>
    where
        G: Game + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, game);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    device: WgpuDevice<'this>,
}

/// Per-window state that does not borrow the window.
struct Session {
    resources: ResourceManager,
    audio: AudioEngine,
    batch: BatchRenderer,
    overlay: DebugOverlay,
    input_state: InputState,
    input_frame: InputFrame,
    clock: FrameClock,
    clear_color: Color,
}

impl Session {
    fn start(device: &mut WgpuDevice<'_>, config: &EngineConfig, game: &mut dyn Game) -> Result<Self> {
        let size = device.size();
        let viewport = Viewport::from_size(size.width as f32, size.height as f32);

        let mut resources = ResourceManager::new(device, &config.resources.root)
            .context("failed to create default resources")?;
        let batch = BatchRenderer::new(device, &resources.builtin_shaders(), config.renderer_settings())
            .context("failed to create batch renderer")?;

        let font = if config.debug.overlay_enabled() {
            match resources.load_font(device, &config.debug.overlay_font, OVERLAY_FONT_PX) {
                Ok(font) => Some(font),
                Err(err) => {
                    log::warn!("debug overlay disabled: {err}");
                    None
                }
            }
        } else {
            None
        };
        let overlay = DebugOverlay::new(&config.debug, font, viewport);
        let mut audio = open_audio(&config.audio);

        game.on_start(&mut StartCtx {
            device,
            resources: &mut resources,
            audio: &mut audio,
            config,
            viewport,
        })
        .context("game failed to start")?;

        Ok(Self {
            resources,
            audio,
            batch,
            overlay,
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::new(),
            clear_color: config.clear_color(),
        })
    }

    fn frame(&mut self, device: &mut WgpuDevice<'_>, window: &Window, game: &mut dyn Game) -> AppControl {
        let size = device.size();
        if size.width == 0 || size.height == 0 {
            return AppControl::Continue;
        }

        let time = self.clock.tick();
        self.overlay.record_frame(time.dt);

        let control = game.on_update(&mut UpdateCtx {
            time,
            input: &self.input_state,
            input_frame: &self.input_frame,
            resources: &mut self.resources,
            audio: &mut self.audio,
            viewport: Viewport::from_size(size.width as f32, size.height as f32),
        });
        self.input_frame.clear();
        if control == AppControl::Exit {
            return AppControl::Exit;
        }

        self.batch.new_frame();
        let stats = OverlayStats {
            total_draw_calls: self.batch.total_draw_calls(),
            frame_draw_calls: self.batch.last_frame_draw_calls(),
        };
        {
            let mut batch = self.batch.bind(device);
            game.on_render(&mut batch);
            self.overlay.render(&mut batch, stats);
            batch.end_scene();
        }

        window.pre_present_notify();
        match device.present(self.clear_color) {
            Ok(()) | Err(SurfaceErrorAction::SkipFrame | SurfaceErrorAction::Reconfigured) => {}
            Err(SurfaceErrorAction::Fatal) => {
                log::error!("surface lost beyond recovery");
                return AppControl::Exit;
            }
        }

        self.resources.release_unused(device);
        AppControl::Continue
    }

    fn resize(&mut self, device: &mut WgpuDevice<'_>, size: PhysicalSize<u32>, game: &mut dyn Game) {
        let was_minimized = device.size().width == 0 || device.size().height == 0;
        device.resize(size);
        if size.width == 0 || size.height == 0 {
            return;
        }
        if was_minimized {
            self.clock.reset();
        }
        self.overlay.on_resize(size.width, size.height);
        game.on_resize(size.width, size.height);
    }

    fn shutdown(mut self, device: &mut WgpuDevice<'_>) {
        self.batch.release(device);
        self.resources.release(device);
        log::info!("renderer released");
    }
}

fn open_audio(config: &AudioConfig) -> AudioEngine {
    let mut audio = if config.enabled {
        AudioEngine::new()
    } else {
        log::info!("audio disabled by config");
        AudioEngine::silent()
    };
    audio.set_volume(config.volume);
    audio
}

struct AppState<G>
where
    G: Game + 'static,
{
    config: EngineConfig,
    game: G,

    window: Option<WindowEntry>,
    session: Option<Session>,

    failure: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<G> AppState<G>
where
    G: Game + 'static,
{
    fn new(config: EngineConfig, game: G) -> Self {
        Self {
            config,
            game,
            window: None,
            session: None,
            failure: None,
            exit_requested: false,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let cfg = &self.config.window;
        let mut attrs = Window::default_attributes()
            .with_title(cfg.title.clone())
            .with_inner_size(LogicalSize::new(f64::from(cfg.width), f64::from(cfg.height)));
        if cfg.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = GpuInit::with_vsync(cfg.vsync);
        let mut entry = WindowEntryTryBuilder {
            window,
            device_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)).map(WgpuDevice::new),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let (config, game) = (&self.config, &mut self.game);
        let session = entry.with_device_mut(|device| Session::start(device, config, game))?;

        entry.with_window(|w| w.request_redraw());
        self.window = Some(entry);
        self.session = Some(session);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let (Some(entry), Some(session)) = (self.window.as_mut(), self.session.take()) {
            entry.with_device_mut(|device| session.shutdown(device));
        }
        self.window = None;
        self.exit_requested = true;
        event_loop.exit();
    }
}

impl<G> ApplicationHandler for AppState<G>
where
    G: Game + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exit_requested {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Continuous redraw; games animate every frame.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let (Some(entry), Some(session)) = (self.window.as_mut(), self.session.as_mut()) else {
            return;
        };
        let game: &mut dyn Game = &mut self.game;

        if let Some(input) = platform::translate_window_event(&event) {
            session.input_state.apply_event(&mut session.input_frame, input);
        }

        let control = match &event {
            WindowEvent::CloseRequested => AppControl::Exit,

            WindowEvent::Resized(size) => {
                entry.with_device_mut(|device| session.resize(device, *size, game));
                entry.with_window(|w| w.request_redraw());
                AppControl::Continue
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = entry.with_window(|w| w.inner_size());
                entry.with_device_mut(|device| session.resize(device, size, game));
                AppControl::Continue
            }

            WindowEvent::RedrawRequested => {
                entry.with_mut(|fields| session.frame(fields.device, fields.window, game))
            }

            _ => AppControl::Continue,
        };

        if control == AppControl::Exit {
            self.shutdown(event_loop);
        }
    }
}
