use std::rc::Rc;

use glam::{Affine2, Vec2};

use crate::math::{NodeId, TransformTree};
use crate::paint::Color;

use super::font::Font;

/// Horizontal alignment of each line inside the text block.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Justification {
    #[default]
    Left,
    Center,
    Right,
}

/// Per-character overrides applied on top of the block's transform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CharacterData {
    pub color: Color,
    pub scale: Vec2,
    pub anchor: Vec2,
    pub angle: f32,
}

impl CharacterData {
    fn with_color(color: Color) -> Self {
        Self {
            color,
            scale: Vec2::ONE,
            anchor: Vec2::ZERO,
            angle: 0.0,
        }
    }
}

/// One placed glyph, relative to the text block's own transform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphQuad {
    pub local: Affine2,
    pub size: Vec2,
    pub anchor: Vec2,
    pub uv: [Vec2; 4],
    pub color: Color,
}

/// A positioned block of text drawn with a bitmap [`Font`].
///
/// Lines are separated by `'\n'`. Size and line widths are recomputed
/// whenever the text, font or spacing changes.
#[derive(Debug)]
pub struct SpriteFont {
    font: Rc<Font>,
    node: NodeId,
    text: String,
    anchor: Vec2,
    color: Color,
    justification: Justification,
    character_spacing: f32,
    characters: Vec<CharacterData>,
    line_widths: Vec<f32>,
    size: Vec2,
}

impl SpriteFont {
    pub fn new(transforms: &mut TransformTree, font: Rc<Font>) -> Self {
        let mut sprite_font = Self {
            font,
            node: transforms.create(),
            text: String::new(),
            anchor: Vec2::ZERO,
            color: Color::WHITE,
            justification: Justification::Left,
            character_spacing: 0.0,
            characters: Vec::new(),
            line_widths: Vec::new(),
            size: Vec2::ZERO,
        };
        sprite_font.calculate_size();
        sprite_font
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn font(&self) -> &Rc<Font> {
        &self.font
    }

    pub fn set_font(&mut self, font: Rc<Font>) {
        self.font = font;
        self.calculate_size();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text; per-character data resets to the block color.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.text {
            return;
        }
        self.text = text;
        self.characters = vec![CharacterData::with_color(self.color); self.text.chars().count()];
        self.calculate_size();
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Sets the block color and every character's color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        for c in &mut self.characters {
            c.color = color;
        }
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
    }

    pub fn justification(&self) -> Justification {
        self.justification
    }

    pub fn set_justification(&mut self, justification: Justification) {
        self.justification = justification;
    }

    pub fn character_spacing(&self) -> f32 {
        self.character_spacing
    }

    pub fn set_character_spacing(&mut self, spacing: f32) {
        if spacing != self.character_spacing {
            self.character_spacing = spacing;
            self.calculate_size();
        }
    }

    /// Per-character data, one entry per `char` of the text (newlines included).
    pub fn characters_mut(&mut self) -> &mut [CharacterData] {
        &mut self.characters
    }

    pub fn line_count(&self) -> usize {
        self.line_widths.len()
    }

    pub fn line_width(&self, line: usize) -> f32 {
        self.line_widths.get(line).copied().unwrap_or(0.0)
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    fn calculate_size(&mut self) {
        let step = |c: char| self.font.advance(c) + self.character_spacing;
        self.line_widths = self.text.split('\n').map(|line| line.chars().map(step).sum::<f32>()).collect();

        let width = self.line_widths.iter().copied().fold(0.0, f32::max);
        self.size = Vec2::new(width, self.font.line_height() * self.line_widths.len() as f32);
    }

    fn line_origin_x(&self, line: usize) -> f32 {
        match self.justification {
            Justification::Left => 0.0,
            Justification::Center => (self.width() - self.line_width(line)) * 0.5,
            Justification::Right => self.width() - self.line_width(line),
        }
    }

    /// Lays out every visible glyph.
    ///
    /// The pen starts on the baseline of the first line, which sits at the
    /// top of the block; each newline steps down one line height.
    pub fn glyph_quads(&self) -> Vec<GlyphQuad> {
        let font = &self.font;
        let texture_size = font.texture().size();
        let anchor_offset = -self.size * self.anchor;

        let mut line = 0;
        let mut pen = Vec2::new(
            self.line_origin_x(0),
            (font.line_height() - font.baseline()) + font.line_height() * (self.line_count() as f32 - 1.0),
        );

        let mut quads = Vec::with_capacity(self.characters.len());
        for (c, data) in self.text.chars().zip(&self.characters) {
            if c == '\n' {
                line += 1;
                pen.x = self.line_origin_x(line);
                pen.y -= font.line_height();
                continue;
            }

            let Some(glyph) = font.glyph(c) else { continue };

            if !glyph.frame.is_empty() {
                let position = pen
                    + anchor_offset
                    + Vec2::new(glyph.bearing_x, glyph.bearing_y - glyph.frame.size.y);
                quads.push(GlyphQuad {
                    local: Affine2::from_scale_angle_translation(data.scale, data.angle, position),
                    size: glyph.frame.size,
                    anchor: data.anchor,
                    uv: glyph.frame.uv_corners(texture_size),
                    color: data.color,
                });
            }

            pen.x += glyph.advance_x + self.character_spacing;
        }
        quads
    }
}
