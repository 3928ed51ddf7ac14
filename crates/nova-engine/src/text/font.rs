use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::coords::Rect;
use crate::render::{DeviceError, GraphicsDevice, Texture};

use super::atlas::AtlasBuilder;

/// Printable ASCII, the set rasterized when no explicit set is given.
pub const DEFAULT_CHARACTER_SET: &str =
    " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

#[derive(Debug, Error)]
pub enum FontError {
    #[error("font parse error: {0}")]
    Parse(String),

    #[error("font {0:?} has no horizontal line metrics")]
    MissingMetrics(String),

    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Placement data for one rasterized character.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Glyph {
    pub width: u32,
    pub height: u32,
    /// Pen advance in pixels.
    pub advance_x: f32,
    /// Offset of the bitmap's left edge from the pen.
    pub bearing_x: f32,
    /// Offset of the bitmap's top edge above the baseline.
    pub bearing_y: f32,
    /// Location in the atlas texture.
    pub frame: Rect,
}

/// Bitmap font: an atlas texture plus per-character metrics.
#[derive(Debug)]
pub struct Font {
    name: String,
    size: u32,
    line_height: f32,
    /// Distance from the top of a line down to its baseline.
    baseline: f32,
    character_set: String,
    glyphs: HashMap<char, Glyph>,
    texture: Rc<Texture>,
}

impl Font {
    /// Builds a font from an existing atlas and glyph table.
    pub fn from_glyphs(
        name: impl Into<String>,
        size: u32,
        line_height: f32,
        baseline: f32,
        glyphs: HashMap<char, Glyph>,
        texture: Rc<Texture>,
    ) -> Self {
        let mut character_set: Vec<char> = glyphs.keys().copied().collect();
        character_set.sort_unstable();
        Self {
            name: name.into(),
            size,
            line_height,
            baseline,
            character_set: character_set.into_iter().collect(),
            glyphs,
            texture,
        }
    }

    /// A font with no glyphs; text drawn with it renders nothing.
    pub fn empty(texture: Rc<Texture>) -> Self {
        Self::from_glyphs("empty", 16, 16.0, 12.0, HashMap::new(), texture)
    }

    /// Rasterizes `character_set` from TrueType/OpenType bytes at `px` pixels.
    pub fn rasterize(
        device: &mut dyn GraphicsDevice,
        name: &str,
        bytes: &[u8],
        px: u32,
        character_set: &str,
    ) -> Result<Self, FontError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontError::Parse(e.to_string()))?;
        let px_f = px as f32;

        let metrics = font
            .horizontal_line_metrics(px_f)
            .ok_or_else(|| FontError::MissingMetrics(name.to_string()))?;

        let rasterized: Vec<(char, fontdue::Metrics, Vec<u8>)> = character_set
            .chars()
            .map(|c| {
                let (m, bitmap) = font.rasterize(c, px_f);
                (c, m, bitmap)
            })
            .collect();

        let widest = rasterized.iter().map(|(_, m, _)| m.width as u32).max().unwrap_or(0);
        let mut atlas = AtlasBuilder::new(widest);
        let mut glyphs = HashMap::with_capacity(rasterized.len());

        for (c, m, bitmap) in rasterized {
            let (w, h) = (m.width as u32, m.height as u32);
            let frame = if w > 0 && h > 0 {
                atlas.place(bitmap, w, h)
            } else {
                Rect::default()
            };
            glyphs.insert(
                c,
                Glyph {
                    width: w,
                    height: h,
                    advance_x: m.advance_width.round(),
                    bearing_x: m.xmin as f32,
                    bearing_y: (m.ymin + m.height as i32) as f32,
                    frame,
                },
            );
        }

        let image = atlas.finish();
        let texture = Texture::create(device, format!("font {name} {px}px"), &image)?;
        log::debug!(
            "rasterized font {name:?} at {px}px: {} glyphs, atlas {}x{}",
            glyphs.len(),
            image.width,
            image.height
        );

        Ok(Self {
            name: name.to_string(),
            size: px,
            line_height: metrics.new_line_size.ceil(),
            baseline: metrics.ascent.ceil(),
            character_set: character_set.to_string(),
            glyphs,
            texture: Rc::new(texture),
        })
    }

    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    /// Advance of `c`, zero for characters outside the set.
    pub fn advance(&self, c: char) -> f32 {
        self.glyph(c).map_or(0.0, |g| g.advance_x)
    }

    pub fn texture(&self) -> &Rc<Texture> {
        &self.texture
    }

    pub(crate) fn into_texture(self) -> Rc<Texture> {
        self.texture
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn baseline(&self) -> f32 {
        self.baseline
    }

    pub fn character_set(&self) -> &str {
        &self.character_set
    }
}
