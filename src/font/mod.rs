//! # Font Management
//!
//! Registered TrueType/OpenType faces form a fallback chain: each character
//! is measured and drawn with the first face that has a glyph for it. A
//! typical setup is a Latin UI face followed by a CJK face.
//!
//! When a conversation names no fonts, the chain is filled from the system
//! (see [`system`]). DejaVu Sans is compiled in and always sits at the end
//! of the chain, so Latin text is drawn even where no system fonts exist
//! (WASM). Characters no face covers fall back to [`FallbackMetrics`] for
//! measurement, are not drawn, and are reported by the export.

pub mod metrics;
#[cfg(not(target_arch = "wasm32"))]
pub mod system;

pub use metrics::FallbackMetrics;

use crate::error::ExportError;
use crate::image_loader::read_source_bytes;
use crate::model::FontEntry;
use crate::text::{FontSpec, TextMeasure};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// DejaVu Sans, the last-resort face. See `fonts/LICENSE-DejaVu.txt`.
pub const BUNDLED_FACE: &[u8] = include_bytes!("../../fonts/DejaVuSans.ttf");

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct FaceMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub ascender: i16,
    /// Maps characters to their glyph IDs in the font.
    pub glyph_ids: HashMap<char, u16>,
}

impl FaceMetrics {
    /// Get the advance width of a character in pixels, if the face has it.
    pub fn char_width(&self, ch: char, font_size: f64) -> Option<f64> {
        let w = self.advance_widths.get(&ch)?;
        Some((*w as f64 / self.units_per_em as f64) * font_size)
    }

    /// Parse metrics from font data using ttf-parser. `index` selects the
    /// face inside a collection (`.ttc`); it is 0 for plain font files.
    pub fn from_font_data(data: &[u8], index: u32) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, index).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut glyph_ids = HashMap::new();

        // Walk the cmap once so per-character lookups during layout are
        // plain hash hits.
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code| {
                    let Some(ch) = char::from_u32(code) else {
                        return;
                    };
                    if glyph_ids.contains_key(&ch) {
                        return;
                    }
                    if let Some(glyph_id) = subtable.glyph_index(code) {
                        let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                        advance_widths.insert(ch, advance);
                        glyph_ids.insert(ch, glyph_id.0);
                    }
                });
            }
        }

        Some(FaceMetrics {
            units_per_em,
            advance_widths,
            ascender: face.ascender(),
            glyph_ids,
        })
    }
}

/// A registered face: raw font bytes plus the metrics parsed from them.
#[derive(Debug, Clone)]
pub struct FontFace {
    data: Vec<u8>,
    index: u32,
    metrics: FaceMetrics,
}

impl FontFace {
    pub fn metrics(&self) -> &FaceMetrics {
        &self.metrics
    }

    /// Parse the face for outline access. Cheap: ttf-parser only reads
    /// table offsets.
    pub fn parse(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.index).ok()
    }
}

/// Shared font context used by layout and rasterization.
/// Provides text measurement with real glyph metrics where available.
#[derive(Debug, Clone, Default)]
pub struct FontContext {
    faces: Vec<FontFace>,
}

impl FontContext {
    /// A context with no faces: everything is measured with
    /// [`FallbackMetrics`] and no glyphs are drawn.
    pub fn new() -> Self {
        Self { faces: Vec::new() }
    }

    /// A context holding only the compiled-in face. Output depends on
    /// nothing installed on the host.
    pub fn bundled() -> Self {
        let mut ctx = Self::new();
        ctx.push_bundled();
        ctx
    }

    /// Build a context from document font entries, in order, followed by
    /// the bundled face. With no entries, system faces are discovered
    /// first. Relative file paths resolve against `base_dir`.
    pub fn from_entries(entries: &[FontEntry], base_dir: Option<&Path>) -> Result<Self, ExportError> {
        let mut ctx = Self::new();
        for entry in entries {
            let data = read_source_bytes(&entry.src, base_dir).map_err(ExportError::Font)?;
            ctx.register(data)?;
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            if entries.is_empty() {
                system::register_system_faces(&mut ctx);
            }
        }
        ctx.push_bundled();
        Ok(ctx)
    }

    /// Append a face to the end of the fallback chain.
    pub fn register(&mut self, data: Vec<u8>) -> Result<(), ExportError> {
        self.register_face(data, 0)
    }

    /// Append face `index` of a font file or collection.
    pub fn register_face(&mut self, data: Vec<u8>, index: u32) -> Result<(), ExportError> {
        let metrics = FaceMetrics::from_font_data(&data, index)
            .ok_or_else(|| ExportError::Font("Not a valid TrueType/OpenType font".to_string()))?;
        log::debug!(
            "registered font face #{} ({} glyphs mapped)",
            self.faces.len(),
            metrics.glyph_ids.len()
        );
        self.faces.push(FontFace {
            data,
            index,
            metrics,
        });
        Ok(())
    }

    fn push_bundled(&mut self) {
        if let Err(e) = self.register(BUNDLED_FACE.to_vec()) {
            log::warn!("bundled face failed to load: {}", e);
        }
    }

    pub fn faces(&self) -> &[FontFace] {
        &self.faces
    }

    /// Position in [`faces`](Self::faces) of the first face that can draw
    /// `ch`, with the glyph id to draw.
    pub fn face_index_for(&self, ch: char) -> Option<(usize, u16)> {
        self.faces
            .iter()
            .enumerate()
            .find_map(|(i, face)| face.metrics.glyph_ids.get(&ch).map(|gid| (i, *gid)))
    }

    /// The first face that can draw `ch`, with the glyph id to draw.
    pub fn face_for(&self, ch: char) -> Option<(&FontFace, u16)> {
        let (i, gid) = self.face_index_for(ch)?;
        Some((&self.faces[i], gid))
    }

    /// Add to `into` the visible characters of `text` that no registered
    /// face can draw.
    pub fn uncovered(&self, text: &str, into: &mut BTreeSet<char>) {
        into.extend(
            text.chars()
                .filter(|ch| !ch.is_whitespace() && !ch.is_control())
                .filter(|ch| self.face_index_for(*ch).is_none()),
        );
    }

    /// Get the advance width of a single character in pixels.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.faces
            .iter()
            .find_map(|face| face.metrics.char_width(ch, font_size))
            .unwrap_or_else(|| FallbackMetrics::char_width(ch, font_size))
    }

    /// Distance from the em-box top to the baseline, from the primary face.
    pub fn ascent(&self, font_size: f64) -> f64 {
        match self.faces.first() {
            Some(face) => {
                let m = &face.metrics;
                m.ascender as f64 / m.units_per_em as f64 * font_size
            }
            None => metrics::FALLBACK_ASCENT * font_size,
        }
    }
}

impl TextMeasure for FontContext {
    fn measure(&self, text: &str, font: &FontSpec) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font.size)).sum()
    }
}
