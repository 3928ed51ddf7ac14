use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use super::GpuInit;

/// What the runtime should do after a failed acquire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; the next frame should succeed.
    Reconfigured,
    /// Transient; drop this frame.
    SkipFrame,
    /// Out of memory. Shut down.
    Fatal,
}

/// A configured window surface and its current size.
pub(crate) struct WindowSurface<'w> {
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl<'w> WindowSurface<'w> {
    pub fn configure(
        surface: wgpu::Surface<'w>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        init: &GpuInit,
        size: PhysicalSize<u32>,
    ) -> Result<Self> {
        let caps = surface.get_capabilities(adapter);
        let format = choose_format(&caps, init.prefer_srgb).context("surface offers no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: choose_present_mode(&caps, init.present_mode),
            alpha_mode: choose_alpha_mode(&caps, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(device, &config);
        log::debug!(
            "surface configured: {format:?} {}x{} {:?}",
            config.width,
            config.height,
            config.present_mode
        );

        Ok(Self { surface, config, size })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Records the new size; a zero-area size leaves the old configuration in place.
    pub fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        self.size = size;
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(device, &self.config);
    }

    pub fn acquire(&self, device: &wgpu::Device) -> Result<wgpu::SurfaceTexture, SurfaceErrorAction> {
        self.surface.get_current_texture().map_err(|err| {
            let action = error_action(&err);
            if action == SurfaceErrorAction::Reconfigured && self.size.width > 0 && self.size.height > 0 {
                self.surface.configure(device, &self.config);
            }
            log::debug!("surface error {err:?}: {action:?}");
            action
        })
    }
}

fn error_action(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

/// An sRGB 8-bit format when asked for and offered, otherwise the surface's first choice.
fn choose_format(caps: &wgpu::SurfaceCapabilities, prefer_srgb: bool) -> Option<wgpu::TextureFormat> {
    let srgb = [wgpu::TextureFormat::Bgra8UnormSrgb, wgpu::TextureFormat::Rgba8UnormSrgb];
    prefer_srgb
        .then(|| srgb.into_iter().find(|f| caps.formats.contains(f)))
        .flatten()
        .or_else(|| caps.formats.first().copied())
}

/// The requested mode if offered, otherwise `Fifo`, which every surface supports.
fn choose_present_mode(caps: &wgpu::SurfaceCapabilities, requested: wgpu::PresentMode) -> wgpu::PresentMode {
    let auto = matches!(requested, wgpu::PresentMode::AutoVsync | wgpu::PresentMode::AutoNoVsync);
    if auto || caps.present_modes.contains(&requested) {
        requested
    } else {
        log::warn!("present mode {requested:?} unsupported; using Fifo");
        wgpu::PresentMode::Fifo
    }
}

fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode, PresentMode, TextureFormat};

    fn caps(formats: &[TextureFormat], modes: &[PresentMode]) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats: formats.to_vec(),
            present_modes: modes.to_vec(),
            alpha_modes: vec![CompositeAlphaMode::Opaque],
            ..Default::default()
        }
    }

    // ── format ────────────────────────────────────────────────────────────

    #[test]
    fn srgb_format_preferred() {
        let c = caps(&[TextureFormat::Bgra8Unorm, TextureFormat::Rgba8UnormSrgb], &[]);
        assert_eq!(choose_format(&c, true), Some(TextureFormat::Rgba8UnormSrgb));
        assert_eq!(choose_format(&c, false), Some(TextureFormat::Bgra8Unorm));
        assert_eq!(choose_format(&caps(&[], &[]), true), None);
    }

    // ── present mode ──────────────────────────────────────────────────────

    #[test]
    fn unsupported_present_mode_falls_back_to_fifo() {
        let c = caps(&[], &[PresentMode::Fifo]);
        assert_eq!(choose_present_mode(&c, PresentMode::Mailbox), PresentMode::Fifo);
        assert_eq!(choose_present_mode(&c, PresentMode::AutoNoVsync), PresentMode::AutoNoVsync);
    }

    #[test]
    fn alpha_mode_falls_back_to_first_offered() {
        let c = caps(&[], &[]);
        assert_eq!(choose_alpha_mode(&c, Some(CompositeAlphaMode::PreMultiplied)), CompositeAlphaMode::Opaque);
        assert_eq!(choose_alpha_mode(&c, Some(CompositeAlphaMode::Opaque)), CompositeAlphaMode::Opaque);
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn lost_surface_is_reconfigured_oom_is_fatal() {
        assert_eq!(error_action(&wgpu::SurfaceError::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(error_action(&wgpu::SurfaceError::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(error_action(&wgpu::SurfaceError::OutOfMemory), SurfaceErrorAction::Fatal);
    }
}
