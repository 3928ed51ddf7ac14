//! Typed, strided description of vertex bytes.

use super::device::{BufferId, VertexArrayId};

/// Scalar/vector/matrix types a vertex attribute can hold.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderDataType {
    Float,
    Float2,
    Float3,
    Float4,
    Int,
    Int2,
    Int3,
    Int4,
    Mat3,
    Mat4,
    Bool,
}

impl ShaderDataType {
    /// Number of scalar components.
    pub const fn component_count(self) -> u32 {
        match self {
            ShaderDataType::Float | ShaderDataType::Int | ShaderDataType::Bool => 1,
            ShaderDataType::Float2 | ShaderDataType::Int2 => 2,
            ShaderDataType::Float3 | ShaderDataType::Int3 => 3,
            ShaderDataType::Float4 | ShaderDataType::Int4 => 4,
            ShaderDataType::Mat3 => 3 * 3,
            ShaderDataType::Mat4 => 4 * 4,
        }
    }

    /// Size in bytes. Every component is 4 bytes wide, booleans included.
    pub const fn size(self) -> u32 {
        self.component_count() * 4
    }
}

/// One named attribute inside a [`BufferLayout`].
#[derive(Debug, Clone, PartialEq)]
pub struct BufferElement {
    pub name: &'static str,
    pub data_type: ShaderDataType,
    pub offset: u32,
    pub normalized: bool,
}

impl BufferElement {
    pub const fn new(data_type: ShaderDataType, name: &'static str) -> Self {
        Self {
            name,
            data_type,
            offset: 0,
            normalized: false,
        }
    }

    pub const fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }
}

/// Ordered attribute list with tightly packed offsets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferLayout {
    elements: Vec<BufferElement>,
    stride: u32,
}

impl BufferLayout {
    pub fn new(elements: impl IntoIterator<Item = BufferElement>) -> Self {
        let mut elements: Vec<BufferElement> = elements.into_iter().collect();
        let mut offset = 0;
        for element in &mut elements {
            element.offset = offset;
            offset += element.data_type.size();
        }
        Self { elements, stride: offset }
    }

    #[inline]
    pub fn elements(&self) -> &[BufferElement] {
        &self.elements
    }

    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }
}

/// A vertex record that can be staged in a [`VertexArena`](super::VertexArena).
pub trait Vertex: bytemuck::Pod {
    fn layout() -> BufferLayout;
}

/// Vertex buffer + layout + static index buffer, created once per renderer.
#[derive(Debug, Clone)]
pub struct VertexArray {
    pub id: VertexArrayId,
    pub vertex_buffer: BufferId,
    pub index_buffer: BufferId,
    pub layout: BufferLayout,
    pub index_capacity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_declaration_order() {
        let layout = BufferLayout::new([
            BufferElement::new(ShaderDataType::Float2, "a_position"),
            BufferElement::new(ShaderDataType::Float4, "a_color"),
            BufferElement::new(ShaderDataType::Float, "a_width"),
        ]);

        let offsets: Vec<u32> = layout.elements().iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![0, 8, 24]);
        assert_eq!(layout.stride(), 28);
    }

    #[test]
    fn matrix_sizes() {
        assert_eq!(ShaderDataType::Mat3.size(), 36);
        assert_eq!(ShaderDataType::Mat4.size(), 64);
        assert_eq!(ShaderDataType::Bool.size(), 4);
    }

    #[test]
    fn empty_layout_has_zero_stride() {
        assert_eq!(BufferLayout::default().stride(), 0);
    }
}
