//! # Sticker Image Loading
//!
//! Resolves a message's image reference to decoded RGBA pixels. Resolution
//! is asynchronous because a real host may have to fetch or decode off the
//! UI thread; the export awaits each sticker before laying it out.
//!
//! [`SourceResolver`] handles the references the CLI and WASM front ends
//! produce: data URIs, explicit file paths, and raw base64. PNG, JPEG and
//! WebP are decoded.

use crate::model::ImageRef;
use std::collections::HashMap;
use std::future::Future;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// A fully decoded sticker image (straight, non-premultiplied RGBA).
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixels: image::RgbaImage,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    pub fn from_rgba(pixels: image::RgbaImage) -> Self {
        Self {
            width_px: pixels.width(),
            height_px: pixels.height(),
            pixels,
        }
    }
}

/// Resolves image references to decoded pixels.
///
/// The error string is surfaced to the caller as an image-load failure for
/// the message that referenced the image.
pub trait ImageResolver {
    fn resolve(&self, image: &ImageRef) -> impl Future<Output = Result<LoadedImage, String>>;
}

/// Loads images from data URIs, file paths, or raw base64.
#[derive(Debug, Clone, Default)]
pub struct SourceResolver {
    base_dir: Option<PathBuf>,
}

impl SourceResolver {
    pub fn new() -> Self {
        Self { base_dir: None }
    }

    /// Resolve relative file paths (`./x.png`, `../x.png`) against `dir`.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }
}

impl ImageResolver for SourceResolver {
    async fn resolve(&self, image: &ImageRef) -> Result<LoadedImage, String> {
        load_image(image.as_str(), self.base_dir.as_deref())
    }
}

/// Serves images that the host has already decoded, keyed by reference.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    images: HashMap<String, LoadedImage>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, src: &str, image: LoadedImage) {
        self.images.insert(src.to_string(), image);
    }
}

impl ImageResolver for MemoryResolver {
    async fn resolve(&self, image: &ImageRef) -> Result<LoadedImage, String> {
        self.images
            .get(image.as_str())
            .cloned()
            .ok_or_else(|| format!("No image registered for '{}'", image.as_str()))
    }
}

/// Load an image from a source string.
///
/// Supported `src` formats:
/// - `data:image/...;base64,...`: data URI
/// - File path (absolute or `./` / `../` relative): read from disk
/// - Raw base64-encoded image data
pub fn load_image(src: &str, base_dir: Option<&Path>) -> Result<LoadedImage, String> {
    let raw_bytes = read_source_bytes(src, base_dir)?;
    decode_image_bytes(&raw_bytes)
}

/// Resolve a source string to raw bytes. Shared with font loading.
pub(crate) fn read_source_bytes(src: &str, base_dir: Option<&Path>) -> Result<Vec<u8>, String> {
    // Data URI: data:image/png;base64,iVBOR... (or data:font/ttf;base64,...)
    if src.starts_with("data:") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| "Invalid data URI: missing comma".to_string())?;
        if !src[..comma_pos].ends_with(";base64") {
            return Err("Invalid data URI: only base64 payloads are supported".to_string());
        }
        return base64_decode(&src[comma_pos + 1..]);
    }

    // Only match explicit path prefixes to avoid treating base64 strings
    // (which contain '/') as file paths.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let path = match base_dir {
                Some(dir) if !src.starts_with('/') => dir.join(src),
                _ => PathBuf::from(src),
            };
            return std::fs::read(&path)
                .map_err(|e| format!("Failed to read file '{}': {}", path.display(), e));
        }
        #[cfg(target_arch = "wasm32")]
        {
            let _ = base_dir;
            return Err(format!(
                "File paths are not supported in WASM: '{}'. Use data URIs or base64.",
                src
            ));
        }
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| format!("Base64 decode error: {}", e))
}

/// Detect image format from magic bytes and decode to RGBA.
fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, String> {
    if data.len() < 4 {
        return Err("Image data too short".to_string());
    }

    let format = if is_png(data) {
        image::ImageFormat::Png
    } else if is_jpeg(data) {
        image::ImageFormat::Jpeg
    } else if is_webp(data) {
        image::ImageFormat::WebP
    } else {
        return Err("Unsupported image format (expected PNG, JPEG or WebP)".to_string());
    };

    let img = image::io::Reader::with_format(Cursor::new(data), format)
        .decode()
        .map_err(|e| format!("Failed to decode {:?} image: {}", format, e))?;

    let rgba = img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err("Image has zero size".to_string());
    }
    Ok(LoadedImage::from_rgba(rgba))
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

fn is_webp(data: &[u8]) -> bool {
    data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP"
}
