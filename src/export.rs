//! # Export Pipeline
//!
//! Two passes at most:
//!
//! 1. **Probe**: render at the viewport size and note where the cursor
//!    ends up.
//! 2. If the content plus [`BOTTOM_MARGIN`] fits, the probe is the final
//!    image. Otherwise **regrow**: render again from scratch on a surface
//!    tall enough for everything. The probe is discarded rather than
//!    patched because the background gradient spans the final height.
//! 3. Encode PNG.
//!
//! Nothing is written anywhere until the bytes are returned, so dropping
//! the future at any point cancels the export cleanly.

use crate::error::ExportError;
use crate::font::FontContext;
use crate::image_loader::ImageResolver;
use crate::layout::BubbleGeometry;
use crate::model::Message;
use crate::render::{Compositor, ImageCache, Rendered};
use crate::style::Theme;
use std::time::{SystemTime, UNIX_EPOCH};

/// Space kept free below the last message.
pub const BOTTOM_MARGIN: f64 = 80.0;

/// The result of a successful export.
pub struct Exported {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Whether the probe overflowed and a taller surface was rendered.
    pub regrown: bool,
    /// Final geometry of every message, in list order.
    pub bubbles: Vec<BubbleGeometry>,
    /// Characters that were left blank because no registered face has a
    /// glyph for them, in code point order.
    pub uncovered: Vec<char>,
}

/// Exports conversations to PNG.
pub struct ExportPipeline<'a, R: ImageResolver> {
    compositor: Compositor<'a, R>,
}

impl<'a, R: ImageResolver> ExportPipeline<'a, R> {
    pub fn new(fonts: &'a FontContext, resolver: &'a R) -> Self {
        Self {
            compositor: Compositor::new(fonts, resolver),
        }
    }

    /// Render `messages` with `theme` into PNG bytes. The image is
    /// `viewport_width` wide and at least `viewport_height` tall.
    pub async fn export(
        &self,
        messages: &[Message],
        theme: &Theme,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Result<Exported, ExportError> {
        if messages.is_empty() {
            return Err(ExportError::EmptyConversation);
        }

        let mut images = ImageCache::new();
        let probe = self
            .compositor
            .render(messages, theme, viewport_width, viewport_height, &mut images)
            .await?;

        let (rendered, regrown) = match required_height(probe.final_cursor_y, viewport_height) {
            None => (probe, false),
            Some(height) => {
                log::debug!(
                    "content ends at {} which overflows {}px; re-rendering at {}px",
                    probe.final_cursor_y,
                    viewport_height,
                    height
                );
                drop(probe);
                let grown = self
                    .compositor
                    .render(messages, theme, viewport_width, height, &mut images)
                    .await?;
                (grown, true)
            }
        };

        let Rendered {
            surface,
            bubbles,
            uncovered,
            ..
        } = rendered;
        if !uncovered.is_empty() {
            let chars: String = uncovered.iter().collect();
            log::warn!(
                "{} character(s) have no glyph in any registered face and were left blank: {}",
                uncovered.len(),
                chars
            );
        }
        let png = surface.encode_png()?;
        Ok(Exported {
            png,
            width: surface.width(),
            height: surface.height(),
            regrown,
            bubbles,
            uncovered: uncovered.into_iter().collect(),
        })
    }
}

/// The surface height needed when content ending at `final_cursor_y`
/// doesn't fit `viewport_height`, or `None` when it does.
pub fn required_height(final_cursor_y: f64, viewport_height: u32) -> Option<u32> {
    let needed = final_cursor_y + BOTTOM_MARGIN;
    if needed <= viewport_height as f64 {
        None
    } else {
        Some(needed.ceil() as u32)
    }
}

/// Download name for an export taken at `millis` since the Unix epoch.
pub fn export_file_name(millis: u128) -> String {
    format!("sticker-sandbox-{}.png", millis)
}

/// Download name for an export taken now.
pub fn export_file_name_now() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    export_file_name(millis)
}
