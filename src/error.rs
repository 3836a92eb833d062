//! Structured error types for the export engine.
//!
//! The three conditions a user can actually hit while exporting
//! (`EmptyConversation`, `ImageLoad`, `Encode`) map 1:1 to user-facing
//! notices. The remaining variants cover document parsing and setup.

use thiserror::Error;

/// The unified error type returned by all public export functions.
#[derive(Debug, Error)]
pub enum ExportError {
    /// There are no messages to export. Nothing was rendered.
    #[error("Conversation is empty: add at least one message before exporting")]
    EmptyConversation,

    /// A sticker's image reference could not be resolved or decoded.
    /// The whole export is aborted rather than rendering a placeholder.
    #[error("Failed to load sticker image for message '{message_id}': {reason}")]
    ImageLoad { message_id: String, reason: String },

    /// The finished surface could not be serialized to PNG.
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),

    /// A raster surface of the requested size could not be allocated.
    #[error("Cannot allocate a {width}x{height} surface")]
    Surface { width: u32, height: u32 },

    /// The conversation document failed to parse.
    #[error("Failed to parse conversation: {source}{}", format_hint(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// The document named a theme that does not exist.
    #[error("Unknown theme '{0}' (expected one of: sunrise, midnight, mint)")]
    UnknownTheme(String),

    /// A font could not be loaded or parsed.
    #[error("Font error: {0}")]
    Font(String),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the conversation schema. Check field names and message types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ExportError::Parse { source: e, hint }
    }
}
