use std::collections::HashMap;

use super::device::{
    validate_image, validate_program, BufferId, DeviceError, GraphicsDevice, ImageData,
    SceneUniforms, ShaderId, ShaderProgram, TextureId, Topology, VertexArrayId,
};
use super::layout::BufferLayout;

const HEADLESS_TEXTURE_SLOTS: u32 = 32;

/// One draw call as seen by the device.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub shader: Option<&'static str>,
    pub topology: Topology,
    pub index_count: u32,
    /// Slot table at draw time; trailing empty slots are trimmed.
    pub textures: Vec<Option<TextureId>>,
    pub uniforms: Option<SceneUniforms>,
    /// Contents of the vertex buffer when the draw was issued.
    pub vertex_bytes: Vec<u8>,
}

impl DrawRecord {
    /// Decodes the captured vertex bytes as `V` records.
    pub fn vertices<V: bytemuck::Pod>(&self) -> Vec<V> {
        self.vertex_bytes
            .chunks_exact(std::mem::size_of::<V>())
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }

    /// Distinct textures bound in slots other than 0.
    pub fn extra_textures(&self) -> Vec<TextureId> {
        self.textures.iter().skip(1).flatten().copied().collect()
    }
}

#[derive(Debug)]
struct VertexArrayEntry {
    vertex_buffer: BufferId,
}

/// Device that executes nothing and records everything.
///
/// Used to run the batching renderers without a GPU, chiefly from tests.
#[derive(Debug)]
pub struct HeadlessDevice {
    next_id: u32,
    max_slots: u32,

    shaders: HashMap<ShaderId, &'static str>,
    buffers: HashMap<BufferId, Vec<u8>>,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayEntry>,
    textures: HashMap<TextureId, (u32, u32)>,

    bound_shader: Option<ShaderId>,
    uniforms: Option<SceneUniforms>,
    slots: Vec<Option<TextureId>>,

    draws: Vec<DrawRecord>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::with_texture_slots(HEADLESS_TEXTURE_SLOTS)
    }
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texture_slots(max_slots: u32) -> Self {
        Self {
            next_id: 1,
            max_slots,
            shaders: HashMap::new(),
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            textures: HashMap::new(),
            bound_shader: None,
            uniforms: None,
            slots: vec![None; max_slots as usize],
            draws: Vec::new(),
        }
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn take_draws(&mut self) -> Vec<DrawRecord> {
        std::mem::take(&mut self.draws)
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&texture).copied()
    }

    fn mint(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_shader(&mut self, program: &ShaderProgram) -> Result<ShaderId, DeviceError> {
        validate_program(program, self.max_slots)?;
        let id = ShaderId::from_raw(self.mint());
        self.shaders.insert(id, program.key);
        Ok(id)
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
        if self.bound_shader == Some(shader) {
            self.bound_shader = None;
        }
    }

    fn create_vertex_buffer(&mut self, _label: &str, size: u64) -> BufferId {
        let id = BufferId::from_raw(self.mint());
        self.buffers.insert(id, Vec::with_capacity(size as usize));
        id
    }

    fn create_index_buffer(&mut self, _label: &str, indices: &[u32]) -> BufferId {
        let id = BufferId::from_raw(self.mint());
        self.buffers.insert(id, bytemuck::cast_slice(indices).to_vec());
        id
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
    }

    fn create_vertex_array(
        &mut self,
        vertex_buffer: BufferId,
        _layout: &BufferLayout,
        _index_buffer: BufferId,
    ) -> VertexArrayId {
        let id = VertexArrayId::from_raw(self.mint());
        self.vertex_arrays.insert(id, VertexArrayEntry { vertex_buffer });
        id
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        self.vertex_arrays.remove(&vertex_array);
    }

    fn create_texture(&mut self, label: &str, image: &ImageData) -> Result<TextureId, DeviceError> {
        validate_image(label, image)?;
        let id = TextureId::from_raw(self.mint());
        self.textures.insert(id, (image.width, image.height));
        Ok(id)
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        for slot in self.slots.iter_mut().filter(|s| **s == Some(texture)) {
            *slot = None;
        }
    }

    fn upload(&mut self, buffer: BufferId, bytes: &[u8]) {
        match self.buffers.get_mut(&buffer) {
            Some(data) => {
                data.clear();
                data.extend_from_slice(bytes);
            }
            None => log::warn!("upload to unknown buffer {buffer:?}"),
        }
    }

    fn bind_shader(&mut self, shader: ShaderId) {
        self.bound_shader = Some(shader);
    }

    fn set_scene_uniforms(&mut self, uniforms: &SceneUniforms) {
        self.uniforms = Some(*uniforms);
    }

    fn bind_texture(&mut self, slot: u32, texture: TextureId) {
        match self.slots.get_mut(slot as usize) {
            Some(s) => *s = Some(texture),
            None => log::warn!("texture slot {slot} out of range"),
        }
    }

    fn draw_indexed(&mut self, vertex_array: VertexArrayId, topology: Topology, index_count: u32) {
        let vertex_bytes = self
            .vertex_arrays
            .get(&vertex_array)
            .and_then(|va| self.buffers.get(&va.vertex_buffer))
            .cloned()
            .unwrap_or_default();

        let mut textures = std::mem::replace(&mut self.slots, vec![None; self.max_slots as usize]);
        while textures.last() == Some(&None) {
            textures.pop();
        }

        self.draws.push(DrawRecord {
            shader: self.bound_shader.and_then(|s| self.shaders.get(&s).copied()),
            topology,
            index_count,
            textures,
            uniforms: self.uniforms,
            vertex_bytes,
        });
    }

    fn max_texture_slots(&self) -> u32 {
        self.max_slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::layout::{BufferElement, ShaderDataType};

    fn program(source: &'static str) -> ShaderProgram {
        ShaderProgram {
            key: "test",
            source,
            layout: BufferLayout::new([BufferElement::new(ShaderDataType::Float2, "a_position")]),
            topology: Topology::Points,
            texture_slots: 0,
        }
    }

    #[test]
    fn shader_without_entry_points_is_rejected() {
        let mut device = HeadlessDevice::new();
        let err = device.create_shader(&program("fn vs_main() {}")).unwrap_err();
        assert_eq!(
            err,
            DeviceError::MissingEntryPoint { key: "test".into(), entry: "fs_main" }
        );
    }

    #[test]
    fn draw_snapshots_uploaded_bytes() {
        let mut device = HeadlessDevice::new();
        let shader = device.create_shader(&program("fn vs_main() {} fn fs_main() {}")).unwrap();
        let vbo = device.create_vertex_buffer("vbo", 64);
        let ibo = device.create_index_buffer("ibo", &[0, 1, 2]);
        let vao = device.create_vertex_array(vbo, &BufferLayout::default(), ibo);

        device.bind_shader(shader);
        device.upload(vbo, &[1, 2, 3]);
        device.draw_indexed(vao, Topology::Points, 3);
        device.upload(vbo, &[9]);
        device.draw_indexed(vao, Topology::Points, 1);

        let draws = device.draws();
        assert_eq!(draws[0].vertex_bytes, vec![1, 2, 3]);
        assert_eq!(draws[1].vertex_bytes, vec![9]);
        assert_eq!(draws[0].shader, Some("test"));
    }

    #[test]
    fn texture_bindings_last_one_draw() {
        let mut device = HeadlessDevice::new();
        let vbo = device.create_vertex_buffer("vbo", 64);
        let ibo = device.create_index_buffer("ibo", &[0, 1, 2]);
        let vao = device.create_vertex_array(vbo, &BufferLayout::default(), ibo);
        let image = ImageData::white();
        let a = device.create_texture("a", &image).unwrap();
        let b = device.create_texture("b", &image).unwrap();

        device.bind_texture(0, a);
        device.bind_texture(1, b);
        device.draw_indexed(vao, Topology::Triangles, 3);
        device.bind_texture(0, a);
        device.draw_indexed(vao, Topology::Triangles, 3);

        let draws = device.take_draws();
        assert_eq!(draws[0].extra_textures(), vec![b]);
        assert_eq!(draws[1].textures, vec![Some(a)]);
        assert!(draws[1].extra_textures().is_empty());
    }

    #[test]
    fn inconsistent_image_is_rejected() {
        let mut device = HeadlessDevice::new();
        let image = ImageData { width: 2, height: 2, pixels: vec![0; 4] };
        assert!(device.create_texture("bad", &image).is_err());
        assert_eq!(device.live_textures(), 0);
    }
}
