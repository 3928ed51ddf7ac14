use thiserror::Error;

/// Linear premultiplied RGBA color.
///
/// Invariant: `rgb` components are already multiplied by `a`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

/// Error returned by [`Color::from_hex`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid hex color {0:?}: expected RRGGBB or RRGGBBAA")]
pub struct ColorParseError(pub String);

impl Color {
    pub const CLEAR: Color = Color::from_premul(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::from_premul(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::from_premul(0.0, 0.0, 0.0, 1.0);
    pub const RED: Color = Color::from_premul(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::from_premul(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::from_premul(0.0, 0.0, 1.0, 1.0);
    pub const YELLOW: Color = Color::from_premul(1.0, 1.0, 0.0, 1.0);
    pub const ORANGE: Color = Color::from_premul(1.0, 0.5, 0.0, 1.0);
    pub const CYAN: Color = Color::from_premul(0.0, 1.0, 1.0, 1.0);
    pub const MAGENTA: Color = Color::from_premul(1.0, 0.0, 1.0, 1.0);
    pub const GRAY: Color = Color::from_premul(0.5, 0.5, 0.5, 1.0);

    /// Creates a color from premultiplied components.
    #[inline]
    pub const fn from_premul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a premultiplied color from straight alpha components.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: r.clamp(0.0, 1.0) * a,
            g: g.clamp(0.0, 1.0) * a,
            b: b.clamp(0.0, 1.0) * a,
            a,
        }
    }

    /// Creates a premultiplied color from straight RGBA bytes.
    #[inline]
    pub fn from_srgb_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_straight(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Parses `RRGGBB` or `RRGGBBAA`, with an optional `#` or `0x` prefix.
    pub fn from_hex(text: &str) -> Result<Self, ColorParseError> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .unwrap_or(trimmed);

        let err = || ColorParseError(text.to_string());
        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return Err(err());
        }

        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| err());
        let a = if digits.len() == 8 { byte(6)? } else { 0xff };
        Ok(Self::from_srgb_u8(byte(0)?, byte(2)?, byte(4)?, a))
    }

    /// Same hue with a new alpha; keeps the premultiplication invariant.
    #[inline]
    pub fn with_alpha(self, alpha: f32) -> Self {
        let (r, g, b, _) = self.to_straight();
        Self::from_straight(r, g, b, alpha)
    }

    /// Returns a straight-alpha representation.
    ///
    /// For `a == 0`, RGB is returned as 0.
    #[inline]
    pub fn to_straight(self) -> (f32, f32, f32, f32) {
        if self.a <= 0.0 {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let inv = 1.0 / self.a;
            (self.r * inv, self.g * inv, self.b * inv, self.a)
        }
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── from_hex ──────────────────────────────────────────────────────────

    #[test]
    fn hex_without_alpha_is_opaque() {
        assert_eq!(Color::from_hex("ff0000").unwrap(), Color::RED);
    }

    #[test]
    fn hex_accepts_prefixes() {
        assert_eq!(Color::from_hex("#000000ff").unwrap(), Color::BLACK);
        assert_eq!(Color::from_hex("0x0000ffff").unwrap(), Color::BLUE);
    }

    #[test]
    fn hex_alpha_premultiplies() {
        let c = Color::from_hex("ffffff00").unwrap();
        assert_eq!(c, Color::CLEAR);
    }

    #[test]
    fn hex_rejects_bad_input() {
        assert!(Color::from_hex("fff").is_err());
        assert!(Color::from_hex("zzzzzz").is_err());
        assert!(Color::from_hex("ééé").is_err());
    }

    // ── alpha ─────────────────────────────────────────────────────────────

    #[test]
    fn with_alpha_scales_channels() {
        let c = Color::WHITE.with_alpha(0.5);
        assert_eq!(c.to_array(), [0.5, 0.5, 0.5, 0.5]);
    }
}
