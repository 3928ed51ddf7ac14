//! Bitmap fonts rasterized with fontdue, and laid-out text blocks.

mod atlas;
mod font;
mod sprite_font;

pub use font::{Font, FontError, Glyph, DEFAULT_CHARACTER_SET};
pub use sprite_font::{CharacterData, GlyphQuad, Justification, SpriteFont};
