use glam::Vec2;

/// Axis-aligned rectangle in image pixels (top-left origin, +Y down).
///
/// Used for texture frames: a sprite or glyph samples the sub-rectangle
/// `frame` of its texture.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Maps the frame into normalized texture coordinates.
    ///
    /// Returns `(uv_min, uv_max)` where `uv_min` is the top-left texel corner.
    /// A zero-sized texture maps to the whole unit square.
    #[inline]
    pub fn uv_bounds(self, texture_size: Vec2) -> (Vec2, Vec2) {
        if texture_size.x <= 0.0 || texture_size.y <= 0.0 {
            return (Vec2::ZERO, Vec2::ONE);
        }
        (self.origin / texture_size, self.max() / texture_size)
    }

    /// UVs for a quad emitted bottom-left, bottom-right, top-right, top-left
    /// in a +Y up world, so the image appears upright.
    #[inline]
    pub fn uv_corners(self, texture_size: Vec2) -> [Vec2; 4] {
        let (min, max) = self.uv_bounds(texture_size);
        [
            Vec2::new(min.x, max.y),
            Vec2::new(max.x, max.y),
            Vec2::new(max.x, min.y),
            Vec2::new(min.x, min.y),
        ]
    }
}
