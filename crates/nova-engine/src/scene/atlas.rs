use std::collections::HashMap;

use serde::Deserialize;

use crate::coords::Rect;

#[derive(Debug, Deserialize)]
struct AtlasFile {
    #[serde(default)]
    frames: Vec<AtlasEntry>,
}

#[derive(Debug, Deserialize)]
struct AtlasEntry {
    #[serde(default)]
    filename: Option<String>,
    frame: FrameRect,
}

#[derive(Debug, Deserialize)]
struct FrameRect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

/// Named sub-rectangles of one texture, read from the JSON written by
/// texture packers (`{"frames": [{"filename": .., "frame": {x, y, w, h}}]}`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteAtlas {
    frames: HashMap<String, Rect>,
}

impl SpriteAtlas {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: AtlasFile = serde_json::from_str(json)?;
        let frames = file
            .frames
            .into_iter()
            .filter_map(|entry| {
                let FrameRect { x, y, w, h } = entry.frame;
                let rect = Rect::new(x as f32, y as f32, w as f32, h as f32);
                entry.filename.map(|name| (name, rect))
            })
            .collect();
        Ok(Self { frames })
    }

    pub fn frame(&self, key: &str) -> Option<Rect> {
        self.frames.get(key).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.frames.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "frames": [
            {"filename": "ship_0", "frame": {"x": 0, "y": 0, "w": 32, "h": 24}},
            {"filename": "ship_1", "frame": {"x": 32, "y": 0, "w": 32, "h": 24}},
            {"frame": {"x": 64, "y": 0, "w": 8, "h": 8}}
        ],
        "meta": {"app": "packer"}
    }"#;

    #[test]
    fn frames_are_keyed_by_filename() {
        let atlas = SpriteAtlas::from_json(JSON).unwrap();
        assert_eq!(atlas.len(), 2);
        assert_eq!(atlas.frame("ship_1"), Some(Rect::new(32.0, 0.0, 32.0, 24.0)));
        assert_eq!(atlas.frame("ship_2"), None);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SpriteAtlas::from_json("{\"frames\": [").is_err());
        assert!(SpriteAtlas::from_json("{}").unwrap().is_empty());
    }
}
