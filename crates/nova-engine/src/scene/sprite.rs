use std::rc::Rc;

use glam::Vec2;

use crate::coords::Rect;
use crate::math::{NodeId, TransformTree};
use crate::paint::Color;
use crate::render::Texture;

use super::SpriteAtlas;

/// World-space extents of a sprite's rotated bounding box.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Edges {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// A textured quad placed by a transform node.
///
/// The sprite samples `frame` (image pixels, top-left origin) of its texture
/// and is drawn `frame.size` pixels large before the node's scale applies.
/// The anchor is the normalized point of the quad that sits on the node's
/// origin: `(0, 0)` is bottom-left, `(0.5, 0.5)` the centre.
#[derive(Debug, Clone)]
pub struct Sprite {
    texture: Rc<Texture>,
    frame: Rect,
    anchor: Vec2,
    color: Color,
    node: NodeId,
}

impl Sprite {
    /// A sprite showing the whole texture, on a fresh root node.
    pub fn new(transforms: &mut TransformTree, texture: Rc<Texture>) -> Self {
        let frame = Rect::from_origin_size(Vec2::ZERO, texture.size());
        Self::with_frame(transforms, texture, frame)
    }

    pub fn with_frame(transforms: &mut TransformTree, texture: Rc<Texture>, frame: Rect) -> Self {
        Self {
            texture,
            frame,
            anchor: Vec2::ZERO,
            color: Color::WHITE,
            node: transforms.create(),
        }
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[inline]
    pub fn texture(&self) -> &Rc<Texture> {
        &self.texture
    }

    /// Swaps the texture and resets the frame to cover all of it.
    pub fn set_texture(&mut self, texture: Rc<Texture>) {
        self.frame = Rect::from_origin_size(Vec2::ZERO, texture.size());
        self.texture = texture;
    }

    #[inline]
    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    /// Switches to the atlas frame `key`. An unknown key leaves the frame as is and returns false.
    pub fn use_frame(&mut self, atlas: &SpriteAtlas, key: &str) -> bool {
        match atlas.frame(key) {
            Some(frame) => {
                self.frame = frame;
                true
            }
            None => {
                log::warn!("atlas has no frame {key:?}");
                false
            }
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.frame.size
    }

    pub fn width(&self) -> f32 {
        self.frame.size.x
    }

    pub fn height(&self) -> f32 {
        self.frame.size.y
    }

    #[inline]
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn alpha(&self) -> f32 {
        self.color.a
    }

    /// Fades the sprite, keeping its hue.
    pub fn set_alpha(&mut self, alpha: f32) {
        self.color = self.color.with_alpha(alpha);
    }

    /// Texture coordinates in the order the sprite renderer emits corners.
    pub fn uv_corners(&self) -> [Vec2; 4] {
        self.frame.uv_corners(self.texture.size())
    }

    /// Axis-aligned bounds of the rotated quad in world space.
    ///
    /// Uses the node's world position and rotation; scale is ignored.
    pub fn edges(&self, transforms: &mut TransformTree) -> Edges {
        let position = transforms.world_position(self.node);
        let (s, c) = transforms.world_rotation_radians(self.node).sin_cos();
        let (w, h) = (self.width(), self.height());

        let (cw, ch, sw, sh) = (c * w, c * h, s * w, s * h);
        let extent = Vec2::new((sh.abs() + cw.abs()) * 0.5, (sw.abs() + ch.abs()) * 0.5);
        let a = self.anchor - Vec2::splat(0.5);

        // Centre of the quad: the anchor offset rotated into world space.
        let center = position - Vec2::new(cw * a.x - sh * a.y, sw * a.x + ch * a.y);
        Edges {
            left: center.x - extent.x,
            right: center.x + extent.x,
            top: center.y + extent.y,
            bottom: center.y - extent.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{HeadlessDevice, ImageData};

    fn texture(width: u32, height: u32) -> Rc<Texture> {
        let mut device = HeadlessDevice::new();
        let image = ImageData {
            width,
            height,
            pixels: vec![0xff; (width * height * 4) as usize],
        };
        Rc::new(Texture::create(&mut device, "test", &image).unwrap())
    }

    fn assert_edges(actual: Edges, expected: Edges) {
        for (a, e) in [
            (actual.left, expected.left),
            (actual.right, expected.right),
            (actual.top, expected.top),
            (actual.bottom, expected.bottom),
        ] {
            assert!((a - e).abs() < 1e-4, "{actual:?} != {expected:?}");
        }
    }

    // ── frame ─────────────────────────────────────────────────────────────

    #[test]
    fn new_sprite_covers_whole_texture() {
        let mut tree = TransformTree::new();
        let sprite = Sprite::new(&mut tree, texture(64, 32));
        assert_eq!(sprite.size(), Vec2::new(64.0, 32.0));
        assert_eq!(sprite.anchor(), Vec2::ZERO);
        assert_eq!(sprite.color(), Color::WHITE);
        assert!(tree.contains(sprite.node()));
    }

    #[test]
    fn frame_uvs_are_flipped_upright() {
        let mut tree = TransformTree::new();
        let sprite = Sprite::with_frame(&mut tree, texture(64, 32), Rect::new(16.0, 0.0, 16.0, 16.0));
        let uv = sprite.uv_corners();
        assert_eq!(uv[0], Vec2::new(0.25, 0.5));
        assert_eq!(uv[2], Vec2::new(0.5, 0.0));
    }

    #[test]
    fn set_texture_resets_frame() {
        let mut tree = TransformTree::new();
        let mut sprite = Sprite::with_frame(&mut tree, texture(64, 32), Rect::new(0.0, 0.0, 8.0, 8.0));
        sprite.set_texture(texture(10, 20));
        assert_eq!(sprite.frame(), Rect::new(0.0, 0.0, 10.0, 20.0));
    }

    #[test]
    fn atlas_frame_selects_sub_rect() {
        let mut tree = TransformTree::new();
        let mut sprite = Sprite::new(&mut tree, texture(64, 32));
        let atlas = SpriteAtlas::from_json(
            r#"{"frames": [{"filename": "wing", "frame": {"x": 8, "y": 4, "w": 16, "h": 12}}]}"#,
        )
        .unwrap();

        assert!(sprite.use_frame(&atlas, "wing"));
        assert_eq!(sprite.size(), Vec2::new(16.0, 12.0));
        assert!(!sprite.use_frame(&atlas, "tail"));
        assert_eq!(sprite.frame(), Rect::new(8.0, 4.0, 16.0, 12.0));
    }

    // ── edges ─────────────────────────────────────────────────────────────

    #[test]
    fn edges_follow_anchor() {
        let mut tree = TransformTree::new();
        let mut sprite = Sprite::new(&mut tree, texture(40, 20));
        tree.set_position(sprite.node(), Vec2::new(100.0, 50.0));

        assert_edges(
            sprite.edges(&mut tree),
            Edges { left: 100.0, right: 140.0, top: 70.0, bottom: 50.0 },
        );

        sprite.set_anchor(Vec2::splat(0.5));
        assert_edges(
            sprite.edges(&mut tree),
            Edges { left: 80.0, right: 120.0, top: 60.0, bottom: 40.0 },
        );
    }

    #[test]
    fn quarter_turn_swaps_extents() {
        let mut tree = TransformTree::new();
        let mut sprite = Sprite::new(&mut tree, texture(40, 20));
        sprite.set_anchor(Vec2::splat(0.5));
        tree.set_rotation_radians(sprite.node(), std::f32::consts::FRAC_PI_2);

        assert_edges(
            sprite.edges(&mut tree),
            Edges { left: -10.0, right: 10.0, top: 20.0, bottom: -20.0 },
        );
    }

    #[test]
    fn rotated_corner_anchor_moves_centre() {
        let mut tree = TransformTree::new();
        let sprite = Sprite::new(&mut tree, texture(40, 20));
        tree.set_rotation_radians(sprite.node(), std::f32::consts::FRAC_PI_2);

        // Bottom-left anchored quad turned 90 degrees extends left of the origin.
        assert_edges(
            sprite.edges(&mut tree),
            Edges { left: -20.0, right: 0.0, top: 40.0, bottom: 0.0 },
        );
    }
}
