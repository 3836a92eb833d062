//! Glyph outlines as tiny-skia paths.
//!
//! Outlines are emitted in font design units (y-up); [`glyph_transform`]
//! maps them onto the y-down surface at a given pen position.

use tiny_skia::{Path, PathBuilder, Transform};

/// Receives ttf-parser outline commands and builds a tiny-skia `Path`.
pub struct GlyphOutlineBuilder {
    builder: PathBuilder,
}

impl GlyphOutlineBuilder {
    pub fn new() -> Self {
        Self {
            builder: PathBuilder::new(),
        }
    }

    /// `None` for glyphs with no contours (spaces).
    pub fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl Default for GlyphOutlineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ttf_parser::OutlineBuilder for GlyphOutlineBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Build the outline path of `glyph_id` in design units.
pub fn build_glyph_path(face: &ttf_parser::Face<'_>, glyph_id: u16) -> Option<Path> {
    let mut builder = GlyphOutlineBuilder::new();
    face.outline_glyph(ttf_parser::GlyphId(glyph_id), &mut builder)?;
    builder.finish()
}

/// Design units → surface pixels, flipping Y, with the origin at the pen
/// position on the baseline.
pub fn glyph_transform(scale: f32, x: f32, baseline: f32) -> Transform {
    Transform::from_row(scale, 0.0, 0.0, -scale, x, baseline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttf_parser::OutlineBuilder;

    #[test]
    fn test_builder_produces_closed_path() {
        let mut builder = GlyphOutlineBuilder::new();
        OutlineBuilder::move_to(&mut builder, 0.0, 0.0);
        OutlineBuilder::line_to(&mut builder, 10.0, 0.0);
        OutlineBuilder::quad_to(&mut builder, 15.0, 5.0, 20.0, 0.0);
        OutlineBuilder::curve_to(&mut builder, 20.0, 5.0, 25.0, 5.0, 30.0, 10.0);
        OutlineBuilder::close(&mut builder);

        let path = builder.finish().expect("path");
        let bounds = path.bounds();
        assert_eq!(bounds.left(), 0.0);
        assert_eq!(bounds.right(), 30.0);
    }

    #[test]
    fn test_empty_outline_is_none() {
        assert!(GlyphOutlineBuilder::new().finish().is_none());
    }

    #[test]
    fn test_transform_flips_y() {
        let t = glyph_transform(0.5, 10.0, 20.0);
        assert_eq!(t.sx, 0.5);
        assert_eq!(t.sy, -0.5);
        assert_eq!(t.tx, 10.0);
        assert_eq!(t.ty, 20.0);
    }
}
