//! # Sticker Sandbox
//!
//! Renders a fake mobile-chat transcript (text messages and image stickers)
//! to a themed PNG, the way the chat panel would look if you could scroll
//! the whole conversation into one screenshot.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    — Conversation: messages, theme id, viewport
//!       ↓
//!   [text]     — Character-granularity wrapping   ← [font] metrics
//!       ↓
//!   [layout]   — Bubble / avatar / time geometry  ← [style] paints
//!       ↓
//!   [render]   — Ordered paint commands per pass
//!       ↓
//!   [raster]   — tiny-skia surface
//!       ↓
//!   [export]   — Probe, maybe regrow, encode PNG
//! ```
//!
//! Every export is independent: no state survives from one call to the
//! next, and identical inputs produce identical bytes.

pub mod error;
pub mod export;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod raster;
pub mod render;
pub mod style;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::ExportError;
pub use export::{export_file_name, export_file_name_now, ExportPipeline, Exported};

use font::FontContext;
use image_loader::{ImageResolver, SourceResolver};
use model::{Conversation, Message};
use std::path::Path;
use style::Theme;

/// Export `messages` to PNG bytes at the given viewport size.
///
/// This is the primary entry point for hosts that manage their own fonts
/// and image sources.
pub async fn export<R: ImageResolver>(
    fonts: &FontContext,
    resolver: &R,
    messages: &[Message],
    theme: &Theme,
    viewport_width: u32,
    viewport_height: u32,
) -> Result<Vec<u8>, ExportError> {
    let pipeline = ExportPipeline::new(fonts, resolver);
    let exported = pipeline
        .export(messages, theme, viewport_width, viewport_height)
        .await?;
    Ok(exported.png)
}

/// Export a parsed conversation, blocking until done. Relative sticker and
/// font paths resolve against `base_dir`.
pub fn export_conversation(
    conversation: &Conversation,
    base_dir: Option<&Path>,
) -> Result<Exported, ExportError> {
    let theme = conversation.resolve_theme()?;
    let fonts = FontContext::from_entries(&conversation.fonts, base_dir)?;
    let resolver = match base_dir {
        Some(dir) => SourceResolver::with_base_dir(dir),
        None => SourceResolver::new(),
    };
    let pipeline = ExportPipeline::new(&fonts, &resolver);
    futures::executor::block_on(pipeline.export(
        &conversation.messages,
        &theme,
        conversation.viewport.width,
        conversation.viewport.height,
    ))
}

/// Export a conversation described as JSON to PNG bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>, ExportError> {
    let conversation: Conversation = serde_json::from_str(json)?;
    Ok(export_conversation(&conversation, None)?.png)
}
