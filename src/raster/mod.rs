//! # Raster Surface
//!
//! Applies paint commands, in order, to an RGBA pixmap and serializes the
//! result as PNG. This is the only module that touches pixels; everything
//! upstream works in geometry and paint descriptions.
//!
//! Text is drawn from glyph outlines of the faces registered in the
//! [`FontContext`]. Characters no face covers advance the pen by their
//! fallback width and leave no ink; the compositor reports them.

pub mod glyph;

use crate::error::ExportError;
use crate::font::FontContext;
use crate::image_loader::LoadedImage;
use crate::layout::Rect;
use crate::render::PaintCommand;
use crate::style::{Color, Paint};
use crate::text::FontSpec;
use image::ImageEncoder;
use tiny_skia::{
    FillRule, GradientStop, IntSize, LinearGradient, PathBuilder, Pixmap, PixmapPaint, Point,
    Shader, SpreadMode, Transform,
};

/// An addressable RGBA raster that paint commands write into.
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    /// Allocate a transparent `width × height` surface.
    pub fn new(width: u32, height: u32) -> Result<Self, ExportError> {
        let pixmap = Pixmap::new(width, height).ok_or(ExportError::Surface { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight (non-premultiplied) RGBA at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Apply every command in order.
    pub fn apply(&mut self, commands: &[PaintCommand], fonts: &FontContext) {
        for command in commands {
            match command {
                PaintCommand::FillRect { rect, paint } => self.fill_rect(*rect, paint),
                PaintCommand::FillCircle {
                    center,
                    radius,
                    paint,
                } => self.fill_circle(*center, *radius, paint),
                PaintCommand::FillRoundRect {
                    rect,
                    radius,
                    paint,
                } => self.fill_round_rect(*rect, *radius, paint),
                PaintCommand::AvatarGlyph {
                    center,
                    size,
                    color,
                } => self.draw_avatar_glyph(*center, *size, *color),
                PaintCommand::Text {
                    text,
                    x,
                    baseline,
                    font,
                    color,
                } => self.draw_text(text, *x, *baseline, font, *color, fonts),
                PaintCommand::Image { image, dest } => self.draw_image(image, *dest),
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        let Some(r) = tiny_skia::Rect::from_xywh(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        ) else {
            return;
        };
        self.pixmap
            .fill_rect(r, &skia_paint(paint), Transform::identity(), None);
    }

    fn fill_circle(&mut self, (cx, cy): (f64, f64), radius: f64, paint: &Paint) {
        if let Some(path) = PathBuilder::from_circle(cx as f32, cy as f32, radius as f32) {
            self.pixmap.fill_path(
                &path,
                &skia_paint(paint),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// Rounded rectangle with quadratic corners. The radius is clamped to
    /// half the shorter side so corners never overlap.
    fn fill_round_rect(&mut self, rect: Rect, radius: f64, paint: &Paint) {
        let r = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0) as f32;
        let (x, y) = (rect.x as f32, rect.y as f32);
        let (right, bottom) = (rect.right() as f32, rect.bottom() as f32);

        let mut pb = PathBuilder::new();
        pb.move_to(x + r, y);
        pb.line_to(right - r, y);
        pb.quad_to(right, y, right, y + r);
        pb.line_to(right, bottom - r);
        pb.quad_to(right, bottom, right - r, bottom);
        pb.line_to(x + r, bottom);
        pb.quad_to(x, bottom, x, bottom - r);
        pb.line_to(x, y + r);
        pb.quad_to(x, y, x + r, y);
        pb.close();

        if let Some(path) = pb.finish() {
            self.pixmap.fill_path(
                &path,
                &skia_paint(paint),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// A head-and-shoulders silhouette centred on `center`, `size` px tall.
    fn draw_avatar_glyph(&mut self, (cx, cy): (f64, f64), size: f64, color: Color) {
        let (cx, cy, s) = (cx as f32, cy as f32, size as f32);
        let paint = skia_paint(&Paint::Solid(color));

        if let Some(head) = PathBuilder::from_circle(cx, cy - s * 0.18, s * 0.22) {
            self.pixmap
                .fill_path(&head, &paint, FillRule::Winding, Transform::identity(), None);
        }

        let mut pb = PathBuilder::new();
        pb.move_to(cx - s * 0.38, cy + s * 0.42);
        pb.cubic_to(
            cx - s * 0.38,
            cy + s * 0.1,
            cx + s * 0.38,
            cy + s * 0.1,
            cx + s * 0.38,
            cy + s * 0.42,
        );
        pb.close();
        if let Some(shoulders) = pb.finish() {
            self.pixmap.fill_path(
                &shoulders,
                &paint,
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        baseline: f64,
        font: &FontSpec,
        color: Color,
        fonts: &FontContext,
    ) {
        let paint = skia_paint(&Paint::Solid(color));
        let faces = fonts.faces();
        // Parsed lazily, once per face per run.
        let mut parsed: Vec<Option<ttf_parser::Face<'_>>> = Vec::new();
        parsed.resize_with(faces.len(), || None);
        let mut pen = x;

        for ch in text.chars() {
            if let Some((slot, glyph_id)) = fonts.face_index_for(ch) {
                let face = &faces[slot];
                if parsed[slot].is_none() {
                    parsed[slot] = face.parse();
                }
                let scale = font.size / face.metrics().units_per_em as f64;
                let path = parsed[slot]
                    .as_ref()
                    .and_then(|parsed| glyph::build_glyph_path(parsed, glyph_id));
                if let Some(path) = path {
                    self.pixmap.fill_path(
                        &path,
                        &paint,
                        FillRule::Winding,
                        glyph::glyph_transform(scale as f32, pen as f32, baseline as f32),
                        None,
                    );
                }
            }
            pen += fonts.char_width(ch, font.size);
        }
    }

    /// Blit `image` scaled to `dest`'s (integer) size at its rounded origin.
    fn draw_image(&mut self, image: &LoadedImage, dest: Rect) {
        let (w, h) = (dest.width.round() as u32, dest.height.round() as u32);
        let scaled;
        let pixels = if (w, h) == (image.width_px, image.height_px) {
            &image.pixels
        } else {
            scaled = image::imageops::resize(&image.pixels, w, h, image::imageops::FilterType::Triangle);
            &scaled
        };

        let mut data = Vec::with_capacity(pixels.as_raw().len());
        for p in pixels.pixels() {
            let c = tiny_skia::ColorU8::from_rgba(p[0], p[1], p[2], p[3]).premultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        let Some(sprite) = IntSize::from_wh(w, h).and_then(|size| Pixmap::from_vec(data, size))
        else {
            return;
        };

        self.pixmap.draw_pixmap(
            dest.x.round() as i32,
            dest.y.round() as i32,
            sprite.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// Serialize to PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, ExportError> {
        let mut rgba = Vec::with_capacity(self.pixmap.data().len());
        for p in self.pixmap.pixels() {
            let c = p.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }

        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        encoder.write_image(&rgba, self.width(), self.height(), image::ColorType::Rgba8)?;
        Ok(buf)
    }
}

fn skia_color(color: Color) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_rgba8();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

fn skia_paint(paint: &Paint) -> tiny_skia::Paint<'static> {
    let shader = match *paint {
        Paint::Solid(color) => Shader::SolidColor(skia_color(color)),
        Paint::Linear {
            start,
            end,
            from,
            to,
        } => LinearGradient::new(
            Point::from_xy(start.0 as f32, start.1 as f32),
            Point::from_xy(end.0 as f32, end.1 as f32),
            vec![
                GradientStop::new(0.0, skia_color(from)),
                GradientStop::new(1.0, skia_color(to)),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        )
        // Degenerate (zero-length) gradients paint the start colour.
        .unwrap_or(Shader::SolidColor(skia_color(from))),
    };
    tiny_skia::Paint {
        shader,
        anti_alias: true,
        ..Default::default()
    }
}
