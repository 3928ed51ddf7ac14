//! Color model shared between game code and renderers.
//!
//! Colors are linear and premultiplied; every pipeline blends with
//! `One, OneMinusSrcAlpha`.

pub mod color;

pub use color::{Color, ColorParseError};
