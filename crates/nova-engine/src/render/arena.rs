use super::layout::Vertex;

/// Fixed-capacity CPU staging store for one renderer's vertices.
///
/// The backing storage is allocated once. `push` never grows it; callers
/// check [`remaining`](Self::remaining) and flush before it runs out.
#[derive(Debug)]
pub struct VertexArena<V: Vertex> {
    vertices: Vec<V>,
    capacity: usize,
}

impl<V: Vertex> VertexArena<V> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of vertices written since the last reset.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.vertices.len()
    }

    /// Appends one vertex. Returns `false` (and writes nothing) when full.
    #[inline]
    pub fn push(&mut self, vertex: V) -> bool {
        if self.vertices.len() >= self.capacity {
            return false;
        }
        self.vertices.push(vertex);
        true
    }

    /// Exactly the bytes written since the last reset.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    #[inline]
    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    /// Rewinds the cursor to the arena start. Keeps the allocation.
    #[inline]
    pub fn reset(&mut self) {
        self.vertices.clear();
    }
}
