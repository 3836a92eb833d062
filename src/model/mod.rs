//! # Conversation Model
//!
//! The input representation for the export engine. A conversation is an
//! ordered, append-only list of messages plus the theme and viewport to
//! render them with. It is designed to be produced by the chat UI's state
//! container or by direct JSON construction.
//!
//! The engine consumes this read-only. Nothing here is mutated by an export.

use crate::error::ExportError;
use crate::style::Theme;
use serde::{Deserialize, Serialize};

/// A complete conversation ready for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Built-in theme id (`sunrise`, `midnight`, `mint`).
    #[serde(default = "default_theme_id")]
    pub theme: String,

    /// Inline theme that overrides `theme` when present.
    #[serde(default)]
    pub custom_theme: Option<Theme>,

    /// Size of the visible chat panel. The export grows taller than this
    /// when the messages don't fit.
    #[serde(default)]
    pub viewport: Viewport,

    /// Fonts to register before layout, in fallback order.
    #[serde(default)]
    pub fonts: Vec<FontEntry>,

    /// Messages in chronological order.
    #[serde(default)]
    pub messages: Vec<Message>,
}

fn default_theme_id() -> String {
    "sunrise".to_string()
}

impl Conversation {
    /// Resolve the theme this conversation should render with.
    pub fn resolve_theme(&self) -> Result<Theme, ExportError> {
        if let Some(theme) = &self.custom_theme {
            return Ok(theme.clone());
        }
        Theme::by_id(&self.theme).ok_or_else(|| ExportError::UnknownTheme(self.theme.clone()))
    }
}

/// Pixel dimensions of the visible chat panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 375,
            height: 667,
        }
    }
}

/// A font face to register with the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    /// File path, base64-encoded font data, or a data URI
    /// (e.g. "data:font/ttf;base64,...").
    pub src: String,
}

/// Which side of the conversation wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    /// The local user: right-aligned, no avatar.
    Send,
    /// The other party: left-aligned behind an avatar.
    Receive,
}

impl Author {
    pub fn has_avatar(self) -> bool {
        matches!(self, Author::Receive)
    }
}

/// A handle to a sticker image, resolved by an [`crate::image_loader::ImageResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub author: Author,
    #[serde(flatten)]
    pub body: MessageBody,
    /// Pre-formatted short time, drawn verbatim.
    #[serde(default)]
    pub time_label: String,
}

/// What a message carries. Exactly one of text or an image reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageBody {
    Text { text: String },
    Sticker { src: ImageRef },
}

impl Message {
    pub fn text(id: &str, author: Author, text: &str, time_label: &str) -> Self {
        Self {
            id: id.to_string(),
            author,
            body: MessageBody::Text {
                text: text.to_string(),
            },
            time_label: time_label.to_string(),
        }
    }

    pub fn sticker(id: &str, author: Author, src: &str, time_label: &str) -> Self {
        Self {
            id: id.to_string(),
            author,
            body: MessageBody::Sticker {
                src: ImageRef(src.to_string()),
            },
            time_label: time_label.to_string(),
        }
    }
}

/// Format a wall-clock time as the short `HH:MM` label used for messages
/// and the status bar.
pub fn format_time(hour: u32, minute: u32) -> String {
    format!("{:02}:{:02}", hour, minute)
}
