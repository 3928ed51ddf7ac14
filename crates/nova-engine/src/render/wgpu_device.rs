//! [`GraphicsDevice`] over wgpu.
//!
//! Calls made while a frame is built are recorded, not executed: every
//! vertex upload is appended to a per-frame staging stream at an aligned
//! offset, and every draw remembers the offset of the data it saw. At
//! [`WgpuDevice::present`] the stream is written once and the draws are
//! replayed inside a single render pass. This keeps several flushes of the
//! same arena within one frame from overwriting each other.

use std::collections::HashMap;
use std::num::{NonZeroU32, NonZeroU64};

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::coords::Viewport;
use crate::device::{Gpu, SurfaceErrorAction, BATCH_TEXTURE_SLOTS};
use crate::paint::Color;

use super::device::{
    validate_image, validate_program, BufferId, DeviceError, GraphicsDevice, ImageData,
    SceneUniforms, ShaderId, ShaderProgram, TextureId, Topology, VertexArrayId,
};
use super::layout::{BufferLayout, ShaderDataType};

const SCENE_UNIFORM_SIZE: u64 = std::mem::size_of::<SceneUniforms>() as u64;
const INITIAL_STAGING_BYTES: u64 = 1 << 20;
const INITIAL_UNIFORM_SLOTS: u64 = 16;

/// How a program gets its vertices.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ProgramKind {
    /// Vertex buffer plus a texture binding array in group 1.
    Textured { slots: u32 },
    /// Vertex buffer only.
    Plain,
    /// No vertex buffer; the shader reads a storage buffer in group 1.
    Pulled,
}

struct Program {
    key: &'static str,
    kind: ProgramKind,
    pipeline: wgpu::RenderPipeline,
    /// Group 1 layout for textured and pulled programs.
    extra_layout: Option<wgpu::BindGroupLayout>,
}

enum BufferEntry {
    /// CPU side only; uploads go to the frame stream.
    Vertex { size: u64 },
    Index(wgpu::Buffer),
}

struct VertexArrayEntry {
    vertex_buffer: BufferId,
    index_buffer: BufferId,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// A draw waiting for [`WgpuDevice::present`].
struct DrawCommand {
    shader: ShaderId,
    uniform_offset: u32,
    viewport: Viewport,
    index_buffer: BufferId,
    vertices: std::ops::Range<u64>,
    index_count: u32,
    textures: Vec<TextureId>,
}

pub struct WgpuDevice<'w> {
    gpu: Gpu<'w>,
    next_id: u32,

    programs: HashMap<ShaderId, Program>,
    buffers: HashMap<BufferId, BufferEntry>,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayEntry>,
    textures: HashMap<TextureId, GpuTexture>,

    scene_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: wgpu::TextureView,
    alignment: u64,

    // Frame recording.
    staging: Vec<u8>,
    latest_upload: HashMap<BufferId, std::ops::Range<u64>>,
    uniforms: Vec<u8>,
    bound_shader: Option<ShaderId>,
    bound_uniforms: Option<(u32, Viewport)>,
    slots: Vec<Option<TextureId>>,
    commands: Vec<DrawCommand>,

    // GPU side of the frame stream, grown on demand.
    staging_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
}

impl<'w> WgpuDevice<'w> {
    pub fn new(gpu: Gpu<'w>) -> Self {
        let device = gpu.device();
        let limits = device.limits();
        let alignment = u64::from(
            limits
                .min_uniform_buffer_offset_alignment
                .max(limits.min_storage_buffer_offset_alignment),
        );

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nova scene bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(SCENE_UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("nova sprite sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let white = upload_texture(device, gpu.queue(), "nova slot filler", &ImageData::white()).view;

        let staging_buffer = create_staging_buffer(device, INITIAL_STAGING_BYTES);
        let uniform_buffer = create_uniform_buffer(device, INITIAL_UNIFORM_SLOTS * alignment);

        Self {
            gpu,
            next_id: 1,
            programs: HashMap::new(),
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            textures: HashMap::new(),
            scene_layout,
            sampler,
            white,
            alignment,
            staging: Vec::new(),
            latest_upload: HashMap::new(),
            uniforms: Vec::new(),
            bound_shader: None,
            bound_uniforms: None,
            slots: vec![None; BATCH_TEXTURE_SLOTS as usize],
            commands: Vec::new(),
            staging_buffer,
            uniform_buffer,
        }
    }

    pub fn gpu(&self) -> &Gpu<'w> {
        &self.gpu
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size);
    }

    /// Number of draws recorded for the frame in progress.
    pub fn pending_draws(&self) -> usize {
        self.commands.len()
    }

    /// Clears the frame to `clear`, replays every recorded draw and presents.
    ///
    /// The recording is discarded even when no frame could be acquired.
    pub fn present(&mut self, clear: Color) -> Result<(), SurfaceErrorAction> {
        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(action) => {
                self.reset_frame();
                return Err(action);
            }
        };

        self.write_frame_stream();
        let scene_group = self.scene_bind_group();
        let extra_groups: Vec<Option<wgpu::BindGroup>> =
            self.commands.iter().map(|c| self.extra_bind_group(c)).collect();

        let target = self.gpu.size();
        {
            let [r, g, b, a] = clear.to_array().map(f64::from);
            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("nova batch pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for (command, extra) in self.commands.iter().zip(&extra_groups) {
                let Some(program) = self.programs.get(&command.shader) else { continue };
                let Some((x, y, w, h)) = surface_viewport(command.viewport, target) else { continue };

                pass.set_viewport(x, y, w, h, 0.0, 1.0);
                pass.set_pipeline(&program.pipeline);
                pass.set_bind_group(0, &scene_group, &[command.uniform_offset]);
                if let Some(group) = extra {
                    pass.set_bind_group(1, group, &[]);
                }

                match program.kind {
                    ProgramKind::Pulled => {
                        // One quad per segment between two real vertices.
                        let segments = command.index_count.saturating_sub(3);
                        if segments > 0 {
                            pass.draw(0..segments * 6, 0..1);
                        }
                    }
                    ProgramKind::Textured { .. } | ProgramKind::Plain => {
                        let Some(BufferEntry::Index(ibo)) = self.buffers.get(&command.index_buffer) else {
                            continue;
                        };
                        pass.set_vertex_buffer(0, self.staging_buffer.slice(command.vertices.clone()));
                        pass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..command.index_count, 0, 0..1);
                    }
                }
            }
        }

        self.gpu.submit(frame);
        self.reset_frame();
        Ok(())
    }

    fn reset_frame(&mut self) {
        self.staging.clear();
        self.latest_upload.clear();
        self.uniforms.clear();
        self.commands.clear();
        self.bound_uniforms = None;
    }

    fn mint(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn align(&self, len: usize) -> usize {
        let a = self.alignment as usize;
        len.div_ceil(a) * a
    }

    fn write_frame_stream(&mut self) {
        let device = self.gpu.device();

        if self.staging.len() as u64 > self.staging_buffer.size() {
            let size = (self.staging.len() as u64).next_power_of_two();
            log::debug!("growing frame staging buffer to {size} bytes");
            self.staging_buffer = create_staging_buffer(device, size);
        }
        if self.uniforms.len() as u64 > self.uniform_buffer.size() {
            let size = (self.uniforms.len() as u64).next_power_of_two();
            self.uniform_buffer = create_uniform_buffer(device, size);
        }

        let queue = self.gpu.queue();
        if !self.staging.is_empty() {
            queue.write_buffer(&self.staging_buffer, 0, &self.staging);
        }
        if !self.uniforms.is_empty() {
            queue.write_buffer(&self.uniform_buffer, 0, &self.uniforms);
        }
    }

    fn scene_bind_group(&self) -> wgpu::BindGroup {
        self.gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nova scene bind group"),
            layout: &self.scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &self.uniform_buffer,
                    offset: 0,
                    size: NonZeroU64::new(SCENE_UNIFORM_SIZE),
                }),
            }],
        })
    }

    fn extra_bind_group(&self, command: &DrawCommand) -> Option<wgpu::BindGroup> {
        let program = self.programs.get(&command.shader)?;
        let layout = program.extra_layout.as_ref()?;
        let device = self.gpu.device();

        match program.kind {
            ProgramKind::Textured { slots } => {
                let views: Vec<&wgpu::TextureView> = (0..slots as usize)
                    .map(|i| {
                        command
                            .textures
                            .get(i)
                            .and_then(|t| self.textures.get(t))
                            .map_or(&self.white, |t| &t.view)
                    })
                    .collect();
                Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("nova sprite textures"),
                    layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureViewArray(&views),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                }))
            }
            ProgramKind::Pulled => {
                let size = NonZeroU64::new(command.vertices.end - command.vertices.start)?;
                Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("nova line strip"),
                    layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer: &self.staging_buffer,
                            offset: command.vertices.start,
                            size: Some(size),
                        }),
                    }],
                }))
            }
            ProgramKind::Plain => None,
        }
    }

    fn extra_layout(&self, kind: ProgramKind) -> Option<wgpu::BindGroupLayout> {
        let device = self.gpu.device();
        match kind {
            ProgramKind::Textured { slots } => Some(device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("nova sprite textures bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: NonZeroU32::new(slots),
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            })),
            ProgramKind::Pulled => Some(device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("nova line strip bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            })),
            ProgramKind::Plain => None,
        }
    }
}

impl GraphicsDevice for WgpuDevice<'_> {
    fn create_shader(&mut self, program: &ShaderProgram) -> Result<ShaderId, DeviceError> {
        validate_program(program, self.max_texture_slots())?;

        let kind = match (program.topology, program.texture_slots) {
            (Topology::LineStripAdjacency, _) => ProgramKind::Pulled,
            (_, 0) => ProgramKind::Plain,
            (_, slots) => ProgramKind::Textured { slots },
        };
        let extra_layout = self.extra_layout(kind);
        let device = self.gpu.device();

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(program.key),
            source: wgpu::ShaderSource::Wgsl(program.source.into()),
        });

        let mut group_layouts = vec![&self.scene_layout];
        group_layouts.extend(extra_layout.as_ref());
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("nova batch pipeline layout"),
            bind_group_layouts: &group_layouts,
            immediate_size: 0,
        });

        let attributes = vertex_attributes(&program.layout);
        let vertex_buffers = [wgpu::VertexBufferLayout {
            array_stride: u64::from(program.layout.stride()),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        }];
        let buffers: &[wgpu::VertexBufferLayout<'_>] = match kind {
            ProgramKind::Pulled => &[],
            _ => &vertex_buffers,
        };

        let topology = match program.topology {
            Topology::Points => wgpu::PrimitiveTopology::PointList,
            Topology::Triangles | Topology::LineStripAdjacency => wgpu::PrimitiveTopology::TriangleList,
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(program.key),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.gpu.surface_format(),
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let id = ShaderId::from_raw(self.mint());
        self.programs.insert(
            id,
            Program {
                key: program.key,
                kind,
                pipeline,
                extra_layout,
            },
        );
        log::debug!("created pipeline {:?} ({kind:?})", program.key);
        Ok(id)
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        if let Some(program) = self.programs.remove(&shader) {
            log::debug!("deleted pipeline {:?}", program.key);
        }
        if self.bound_shader == Some(shader) {
            self.bound_shader = None;
        }
    }

    fn create_vertex_buffer(&mut self, _label: &str, size: u64) -> BufferId {
        let id = BufferId::from_raw(self.mint());
        self.buffers.insert(id, BufferEntry::Vertex { size });
        id
    }

    fn create_index_buffer(&mut self, label: &str, indices: &[u32]) -> BufferId {
        let buffer = self.gpu.device().create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let id = BufferId::from_raw(self.mint());
        self.buffers.insert(id, BufferEntry::Index(buffer));
        id
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
        self.latest_upload.remove(&buffer);
    }

    fn create_vertex_array(
        &mut self,
        vertex_buffer: BufferId,
        _layout: &BufferLayout,
        index_buffer: BufferId,
    ) -> VertexArrayId {
        let id = VertexArrayId::from_raw(self.mint());
        self.vertex_arrays.insert(id, VertexArrayEntry { vertex_buffer, index_buffer });
        id
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        self.vertex_arrays.remove(&vertex_array);
    }

    fn create_texture(&mut self, label: &str, image: &ImageData) -> Result<TextureId, DeviceError> {
        validate_image(label, image)?;
        let texture = upload_texture(self.gpu.device(), self.gpu.queue(), label, image);
        let id = TextureId::from_raw(self.mint());
        self.textures.insert(id, texture);
        Ok(id)
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        for slot in self.slots.iter_mut().filter(|s| **s == Some(texture)) {
            *slot = None;
        }
    }

    fn upload(&mut self, buffer: BufferId, bytes: &[u8]) {
        let Some(BufferEntry::Vertex { size }) = self.buffers.get(&buffer) else {
            log::warn!("upload to unknown vertex buffer {buffer:?}");
            return;
        };
        let len = bytes.len().min(*size as usize);

        let start = self.align(self.staging.len());
        self.staging.resize(start, 0);
        self.staging.extend_from_slice(&bytes[..len]);
        self.latest_upload.insert(buffer, start as u64..(start + len) as u64);
    }

    fn bind_shader(&mut self, shader: ShaderId) {
        self.bound_shader = Some(shader);
    }

    fn set_scene_uniforms(&mut self, uniforms: &SceneUniforms) {
        let offset = self.align(self.uniforms.len());
        self.uniforms.resize(offset, 0);
        self.uniforms.extend_from_slice(bytemuck::bytes_of(uniforms));

        let [x, y, w, h] = uniforms.viewport;
        self.bound_uniforms = Some((offset as u32, Viewport::new(x, y, w, h)));
    }

    fn bind_texture(&mut self, slot: u32, texture: TextureId) {
        match self.slots.get_mut(slot as usize) {
            Some(s) => *s = Some(texture),
            None => log::warn!("texture slot {slot} out of range"),
        }
    }

    fn draw_indexed(&mut self, vertex_array: VertexArrayId, _topology: Topology, index_count: u32) {
        let Some(shader) = self.bound_shader else {
            log::warn!("draw with no shader bound; skipped");
            return;
        };
        let Some((uniform_offset, viewport)) = self.bound_uniforms else {
            log::warn!("draw before scene uniforms were set; skipped");
            return;
        };
        let Some(va) = self.vertex_arrays.get(&vertex_array) else {
            log::warn!("draw with unknown vertex array {vertex_array:?}; skipped");
            return;
        };
        let vertices = self.latest_upload.get(&va.vertex_buffer).cloned().unwrap_or(0..0);

        let textures = match self.programs.get(&shader).map(|p| p.kind) {
            Some(ProgramKind::Textured { slots }) => self.slots[..slots as usize]
                .iter()
                .map(|s| s.unwrap_or(TextureId::from_raw(0)))
                .collect(),
            _ => Vec::new(),
        };
        self.slots.fill(None);

        self.commands.push(DrawCommand {
            shader,
            uniform_offset,
            viewport,
            index_buffer: va.index_buffer,
            vertices,
            index_count,
            textures,
        });
    }

    fn max_texture_slots(&self) -> u32 {
        BATCH_TEXTURE_SLOTS
    }
}

fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

fn vertex_format(data_type: ShaderDataType) -> Option<wgpu::VertexFormat> {
    Some(match data_type {
        ShaderDataType::Float => wgpu::VertexFormat::Float32,
        ShaderDataType::Float2 => wgpu::VertexFormat::Float32x2,
        ShaderDataType::Float3 => wgpu::VertexFormat::Float32x3,
        ShaderDataType::Float4 => wgpu::VertexFormat::Float32x4,
        ShaderDataType::Int | ShaderDataType::Bool => wgpu::VertexFormat::Sint32,
        ShaderDataType::Int2 => wgpu::VertexFormat::Sint32x2,
        ShaderDataType::Int3 => wgpu::VertexFormat::Sint32x3,
        ShaderDataType::Int4 => wgpu::VertexFormat::Sint32x4,
        ShaderDataType::Mat3 | ShaderDataType::Mat4 => return None,
    })
}

/// One attribute per element, at consecutive shader locations.
///
/// Matrices take one location per column.
fn vertex_attributes(layout: &BufferLayout) -> Vec<wgpu::VertexAttribute> {
    let mut attributes = Vec::with_capacity(layout.elements().len());
    for element in layout.elements() {
        let offset = u64::from(element.offset);
        let location = attributes.len() as u32;
        match vertex_format(element.data_type) {
            Some(format) => attributes.push(wgpu::VertexAttribute {
                format,
                offset,
                shader_location: location,
            }),
            None => {
                let (columns, format) = match element.data_type {
                    ShaderDataType::Mat3 => (3, wgpu::VertexFormat::Float32x3),
                    _ => (4, wgpu::VertexFormat::Float32x4),
                };
                for c in 0..columns {
                    attributes.push(wgpu::VertexAttribute {
                        format,
                        offset: offset + c * format.size(),
                        shader_location: location + c as u32,
                    });
                }
            }
        }
    }
    attributes
}

/// Converts a bottom-left-origin viewport into a top-left one clipped to the target.
fn surface_viewport(viewport: Viewport, target: PhysicalSize<u32>) -> Option<(f32, f32, f32, f32)> {
    let (tw, th) = (target.width as f32, target.height as f32);
    let x0 = viewport.x.max(0.0);
    let x1 = (viewport.x + viewport.width).min(tw);
    let top = (th - (viewport.y + viewport.height)).max(0.0);
    let bottom = (th - viewport.y).min(th);
    (x1 > x0 && bottom > top).then(|| (x0, top, x1 - x0, bottom - top))
}

fn upload_texture(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, image: &ImageData) -> GpuTexture {
    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(image.width * 4),
            rows_per_image: Some(image.height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture { _texture: texture, view }
}

fn create_staging_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("nova frame vertices"),
        size,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_uniform_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("nova frame uniforms"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
