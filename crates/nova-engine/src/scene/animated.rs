use std::rc::Rc;

use crate::math::TransformTree;
use crate::render::Texture;

use super::{Sprite, SpriteAtlas};

const DEFAULT_FPS: f64 = 15.0;

/// Reported by [`AnimatedSprite::update`] when the last frame has been shown.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AnimationEvent {
    Finished,
    Looped,
}

/// A sprite that steps through named frames of an atlas.
///
/// Starts paused on the first frame added, at 15 frames per second, not looping.
#[derive(Debug, Clone)]
pub struct AnimatedSprite {
    sprite: Sprite,
    atlas: Rc<SpriteAtlas>,
    frames: Vec<String>,
    index: usize,
    frame_duration: f64,
    frame_time: f64,
    looping: bool,
    playing: bool,
}

impl AnimatedSprite {
    pub fn new(transforms: &mut TransformTree, texture: Rc<Texture>, atlas: Rc<SpriteAtlas>) -> Self {
        Self {
            sprite: Sprite::new(transforms, texture),
            atlas,
            frames: Vec::new(),
            index: 0,
            frame_duration: 1.0 / DEFAULT_FPS,
            frame_time: 0.0,
            looping: false,
            playing: false,
        }
    }

    /// The sprite to hand to `Batch::render_sprite`.
    #[inline]
    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    #[inline]
    pub fn sprite_mut(&mut self) -> &mut Sprite {
        &mut self.sprite
    }

    /// Appends the atlas frame `key`; the first frame added is shown at once.
    pub fn add_frame(&mut self, key: impl Into<String>) {
        self.frames.push(key.into());
        if self.frames.len() == 1 {
            self.set_frame_index(0);
        }
    }

    pub fn clear_frames(&mut self) {
        self.frames.clear();
        self.index = 0;
        self.frame_time = 0.0;
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn frame_index(&self) -> usize {
        self.index
    }

    /// Shows frame `index`. Out-of-range indices are ignored.
    pub fn set_frame_index(&mut self, index: usize) {
        let Some(key) = self.frames.get(index) else {
            return;
        };
        self.index = index;
        self.frame_time = 0.0;
        self.sprite.use_frame(&self.atlas, key);
    }

    pub fn frames_per_second(&self) -> f64 {
        1.0 / self.frame_duration
    }

    /// Non-positive rates are ignored.
    pub fn set_frames_per_second(&mut self, fps: f64) {
        if fps > 0.0 {
            self.frame_duration = 1.0 / fps;
        }
    }

    #[inline]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Pauses and rewinds to the first frame.
    pub fn stop(&mut self) {
        self.pause();
        self.set_frame_index(0);
    }

    /// Advances at most one frame per call.
    pub fn update(&mut self, dt: f32) -> Option<AnimationEvent> {
        if !self.playing {
            return None;
        }
        self.frame_time += f64::from(dt);
        if self.frame_time < self.frame_duration {
            return None;
        }
        self.frame_time -= self.frame_duration;

        let next = self.index + 1;
        if next < self.frames.len() {
            self.set_frame_index(next);
            None
        } else if self.looping {
            self.set_frame_index(0);
            Some(AnimationEvent::Looped)
        } else {
            self.playing = false;
            Some(AnimationEvent::Finished)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::render::{HeadlessDevice, ImageData};

    fn explosion(tree: &mut TransformTree) -> AnimatedSprite {
        let mut device = HeadlessDevice::new();
        let image = ImageData { width: 64, height: 16, pixels: vec![0xff; 64 * 16 * 4] };
        let texture = Rc::new(Texture::create(&mut device, "boom", &image).unwrap());
        let atlas = SpriteAtlas::from_json(
            r#"{"frames": [
                {"filename": "boom_0", "frame": {"x": 0, "y": 0, "w": 16, "h": 16}},
                {"filename": "boom_1", "frame": {"x": 16, "y": 0, "w": 16, "h": 16}},
                {"filename": "boom_2", "frame": {"x": 32, "y": 0, "w": 16, "h": 16}}
            ]}"#,
        )
        .unwrap();

        let mut anim = AnimatedSprite::new(tree, texture, Rc::new(atlas));
        for i in 0..3 {
            anim.add_frame(format!("boom_{i}"));
        }
        anim.set_frames_per_second(10.0);
        anim
    }

    #[test]
    fn first_frame_shows_immediately() {
        let mut tree = TransformTree::new();
        let anim = explosion(&mut tree);
        assert_eq!(anim.sprite().frame(), Rect::new(0.0, 0.0, 16.0, 16.0));
        assert!(!anim.is_playing());
    }

    #[test]
    fn one_shot_stops_on_last_frame() {
        let mut tree = TransformTree::new();
        let mut anim = explosion(&mut tree);
        assert_eq!(anim.update(1.0), None);

        anim.play();
        assert_eq!(anim.update(0.1), None);
        assert_eq!(anim.update(0.1), None);
        assert_eq!(anim.sprite().frame(), Rect::new(32.0, 0.0, 16.0, 16.0));
        assert_eq!(anim.update(0.1), Some(AnimationEvent::Finished));
        assert!(!anim.is_playing());
        assert_eq!(anim.frame_index(), 2);
    }

    #[test]
    fn looping_wraps_to_first_frame() {
        let mut tree = TransformTree::new();
        let mut anim = explosion(&mut tree);
        anim.set_looping(true);
        anim.play();
        anim.set_frame_index(2);
        assert_eq!(anim.update(0.1), Some(AnimationEvent::Looped));
        assert_eq!(anim.frame_index(), 0);
        assert!(anim.is_playing());
    }

    #[test]
    fn stop_rewinds() {
        let mut tree = TransformTree::new();
        let mut anim = explosion(&mut tree);
        anim.play();
        anim.update(0.1);
        anim.stop();
        assert_eq!(anim.frame_index(), 0);
        assert!(!anim.is_playing());

        anim.set_frame_index(9);
        assert_eq!(anim.frame_index(), 0);
    }
}
