use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface::WindowSurface;
use super::{GpuInit, SurfaceErrorAction};

/// One acquired swapchain image and the encoder drawing into it.
///
/// Hand it back through [`Gpu::submit`]; an outstanding frame blocks the next acquire.
pub struct Frame {
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
    texture: wgpu::SurfaceTexture,
}

/// Device, queue and the window surface they present to.
///
/// The surface borrows the window for `'w`.
pub struct Gpu<'w> {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: WindowSurface<'w>,
    adapter: wgpu::AdapterInfo,
}

impl<'w> Gpu<'w> {
    /// Fails when no adapter offers the features and limits in `init`.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;
        let info = adapter.get_info();
        log::info!("GPU adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = request_device(&adapter, &info, &init).await?;
        let surface = WindowSurface::configure(surface, &adapter, &device, &init, size)?;

        Ok(Self {
            device,
            queue,
            surface,
            adapter: info,
        })
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface.format()
    }

    /// Drawable size in physical pixels; zero while minimized.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.surface.size()
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.surface.resize(&self.device, size);
    }

    /// Acquires the next swapchain image.
    ///
    /// Lost and outdated surfaces are reconfigured before the error is returned.
    pub fn begin_frame(&self) -> Result<Frame, SurfaceErrorAction> {
        let texture = self.surface.acquire(&self.device)?;
        let view = texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("nova frame encoder"),
        });
        Ok(Frame { view, encoder, texture })
    }

    pub fn submit(&self, frame: Frame) {
        let Frame { view, encoder, texture } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        texture.present();
    }
}

async fn request_device(
    adapter: &wgpu::Adapter,
    info: &wgpu::AdapterInfo,
    init: &GpuInit,
) -> Result<(wgpu::Device, wgpu::Queue)> {
    let missing = init.required_features - adapter.features();
    anyhow::ensure!(
        missing.is_empty(),
        "GPU adapter {:?} lacks required features {missing:?}",
        info.name
    );

    let limits = adapter.limits();
    anyhow::ensure!(
        limits.max_binding_array_elements_per_shader_stage >= init.required_limits.max_binding_array_elements_per_shader_stage,
        "GPU adapter {:?} binds only {} textures per draw",
        info.name,
        limits.max_binding_array_elements_per_shader_stage
    );

    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("nova device"),
            required_features: init.required_features,
            required_limits: init.required_limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await
        .context("failed to create wgpu device")
}
