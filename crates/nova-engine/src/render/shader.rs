//! Built-in programs for the four batch renderers.

use super::batch::{CircleVertex, LineVertex, PointVertex, QuadVertex, MAX_TEXTURE_SLOTS};
use super::device::{DeviceError, GraphicsDevice, ShaderId, ShaderProgram, Topology};
use super::layout::Vertex;

pub const SPRITE_SHADER: &str = "sprite";
pub const LINE_SHADER: &str = "line";
pub const POINT_SHADER: &str = "point";
pub const CIRCLE_SHADER: &str = "circle";

/// A compiled program, shared through the resource cache by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shader {
    key: &'static str,
    id: ShaderId,
}

impl Shader {
    pub fn compile(device: &mut dyn GraphicsDevice, program: &ShaderProgram) -> Result<Self, DeviceError> {
        let id = device.create_shader(program)?;
        log::debug!("compiled shader {:?}", program.key);
        Ok(Self { key: program.key, id })
    }

    #[inline]
    pub fn key(&self) -> &'static str {
        self.key
    }

    #[inline]
    pub fn id(&self) -> ShaderId {
        self.id
    }
}

pub fn sprite_program(texture_slots: u32) -> ShaderProgram {
    ShaderProgram {
        key: SPRITE_SHADER,
        source: include_str!("shaders/sprite.wgsl"),
        layout: QuadVertex::layout(),
        topology: Topology::Triangles,
        texture_slots,
    }
}

pub fn line_program() -> ShaderProgram {
    ShaderProgram {
        key: LINE_SHADER,
        source: include_str!("shaders/line.wgsl"),
        layout: LineVertex::layout(),
        topology: Topology::LineStripAdjacency,
        texture_slots: 0,
    }
}

pub fn point_program() -> ShaderProgram {
    ShaderProgram {
        key: POINT_SHADER,
        source: include_str!("shaders/point.wgsl"),
        layout: PointVertex::layout(),
        topology: Topology::Points,
        texture_slots: 0,
    }
}

pub fn circle_program() -> ShaderProgram {
    ShaderProgram {
        key: CIRCLE_SHADER,
        source: include_str!("shaders/circle.wgsl"),
        layout: CircleVertex::layout(),
        topology: Topology::Triangles,
        texture_slots: 0,
    }
}

/// The four programs for `device`, the sprite slot count clamped to what it supports.
pub fn builtin_programs(device: &dyn GraphicsDevice) -> [ShaderProgram; 4] {
    let slots = MAX_TEXTURE_SLOTS.min(device.max_texture_slots());
    [sprite_program(slots), line_program(), point_program(), circle_program()]
}

/// Ids of the built-in programs, one per batch renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BuiltinShaders {
    pub sprite: ShaderId,
    pub line: ShaderId,
    pub point: ShaderId,
    pub circle: ShaderId,
}

impl BuiltinShaders {
    /// Compiles every built-in program. Any failure is fatal to the caller.
    pub fn compile(device: &mut dyn GraphicsDevice) -> Result<Self, DeviceError> {
        let [sprite, line, point, circle] = builtin_programs(device);
        Ok(Self {
            sprite: device.create_shader(&sprite)?,
            line: device.create_shader(&line)?,
            point: device.create_shader(&point)?,
            circle: device.create_shader(&circle)?,
        })
    }

    pub fn from_shaders(sprite: &Shader, line: &Shader, point: &Shader, circle: &Shader) -> Self {
        Self {
            sprite: sprite.id(),
            line: line.id(),
            point: point.id(),
            circle: circle.id(),
        }
    }
}
