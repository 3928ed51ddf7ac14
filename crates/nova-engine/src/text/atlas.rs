use crate::coords::Rect;
use crate::render::ImageData;

const ATLAS_WIDTH: u32 = 512;
const GLYPH_PADDING: u32 = 1; // pixels between glyphs in the atlas

/// Shelf packer producing a premultiplied white-on-transparent RGBA atlas.
///
/// Glyphs are placed left to right; a glyph that does not fit on the current
/// row opens a new shelf below the tallest glyph of that row.
#[derive(Debug)]
pub(crate) struct AtlasBuilder {
    width: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    placed: Vec<(Rect, u32, u32, Vec<u8>)>,
}

impl AtlasBuilder {
    pub(crate) fn new(widest_glyph: u32) -> Self {
        Self {
            width: ATLAS_WIDTH.max((widest_glyph + 2 * GLYPH_PADDING).next_power_of_two()),
            cursor_x: GLYPH_PADDING,
            cursor_y: GLYPH_PADDING,
            row_height: 0,
            placed: Vec::new(),
        }
    }

    /// Reserves space for a `w` x `h` coverage bitmap and returns its frame.
    pub(crate) fn place(&mut self, coverage: Vec<u8>, w: u32, h: u32) -> Rect {
        if self.cursor_x + w + GLYPH_PADDING > self.width {
            self.cursor_y += self.row_height + GLYPH_PADDING;
            self.cursor_x = GLYPH_PADDING;
            self.row_height = 0;
        }

        let frame = Rect::new(self.cursor_x as f32, self.cursor_y as f32, w as f32, h as f32);
        self.placed.push((frame, w, h, coverage));

        self.cursor_x += w + GLYPH_PADDING;
        self.row_height = self.row_height.max(h);
        frame
    }

    /// Rasterizes every placed bitmap into one image.
    pub(crate) fn finish(self) -> ImageData {
        let height = (self.cursor_y + self.row_height + GLYPH_PADDING).next_power_of_two();
        let stride = self.width as usize * 4;
        let mut pixels = vec![0u8; stride * height as usize];

        for (frame, w, h, coverage) in &self.placed {
            let (x0, y0) = (frame.origin.x as usize, frame.origin.y as usize);
            for row in 0..*h as usize {
                for col in 0..*w as usize {
                    let c = coverage[row * *w as usize + col];
                    let at = (y0 + row) * stride + (x0 + col) * 4;
                    pixels[at..at + 4].copy_from_slice(&[c, c, c, c]);
                }
            }
        }

        ImageData {
            width: self.width,
            height,
            pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs_wrap_onto_new_shelf() {
        let mut atlas = AtlasBuilder::new(300);
        let a = atlas.place(vec![255; 300 * 10], 300, 10);
        let b = atlas.place(vec![255; 300 * 4], 300, 4);
        assert_eq!(a, Rect::new(1.0, 1.0, 300.0, 10.0));
        assert_eq!(b, Rect::new(1.0, 12.0, 300.0, 4.0));
    }

    #[test]
    fn coverage_becomes_premultiplied_white() {
        let mut atlas = AtlasBuilder::new(1);
        atlas.place(vec![128], 1, 1);
        let image = atlas.finish();
        assert!(image.is_consistent());
        let at = (image.width as usize + 1) * 4;
        assert_eq!(&image.pixels[at..at + 4], &[128, 128, 128, 128]);
    }
}
