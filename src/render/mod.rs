//! # Compositor
//!
//! Walks the message list in order and turns it into an ordered list of
//! [`PaintCommand`]s: phone background, full-height chat gradient, then one
//! row per message. [`Compositor::render`] applies that list to a fresh
//! [`Surface`].
//!
//! Per row the stacking order is fixed: avatar circle, avatar glyph, bubble
//! fill or sticker, text lines, time label. A translucent theme therefore
//! never shows a glyph underneath its own background.

use crate::error::ExportError;
use crate::font::FontContext;
use crate::image_loader::{ImageResolver, LoadedImage};
use crate::layout::{
    BubbleContent, BubbleGeometry, BubbleLayoutEngine, Rect, TextAlign, BODY_FONT, BUBBLE_RADIUS,
    LINE_HEIGHT, MESSAGE_GAP, TIME_FONT,
};
use crate::model::{ImageRef, Message, MessageBody};
use crate::raster::Surface;
use crate::style::{self, Color, ColorSpec, GradientAxis, Paint, Theme};
use crate::text::{FontSpec, TextMeasure};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Where the first message starts, leaving room for the status header.
pub const TOP_OFFSET: f64 = 80.0;
/// Font size of the avatar glyph.
pub const AVATAR_GLYPH_SIZE: f64 = 20.0;

/// Fill behind the avatar glyph.
pub fn avatar_background() -> Color {
    Color::rgba8(255, 255, 255, 0.15)
}

/// One explicit drawing operation, applied in list order.
#[derive(Debug, Clone)]
pub enum PaintCommand {
    FillRect {
        rect: Rect,
        paint: Paint,
    },
    FillCircle {
        center: (f64, f64),
        radius: f64,
        paint: Paint,
    },
    FillRoundRect {
        rect: Rect,
        radius: f64,
        paint: Paint,
    },
    /// The default-avatar silhouette.
    AvatarGlyph {
        center: (f64, f64),
        size: f64,
        color: Color,
    },
    /// A single line of text starting at `x` on `baseline`.
    Text {
        text: String,
        x: f64,
        baseline: f64,
        font: FontSpec,
        color: Color,
    },
    Image {
        image: Arc<LoadedImage>,
        dest: Rect,
    },
}

/// Decoded stickers for one export, so the regrow pass doesn't resolve
/// every image a second time. Never outlives the export that created it.
#[derive(Default)]
pub struct ImageCache {
    images: HashMap<ImageRef, Arc<LoadedImage>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn get_or_resolve<R: ImageResolver>(
        &mut self,
        message: &Message,
        src: &ImageRef,
        resolver: &R,
    ) -> Result<Arc<LoadedImage>, ExportError> {
        if let Some(image) = self.images.get(src) {
            return Ok(Arc::clone(image));
        }
        let image = resolver
            .resolve(src)
            .await
            .map_err(|reason| ExportError::ImageLoad {
                message_id: message.id.clone(),
                reason,
            })?;
        let image = Arc::new(image);
        self.images.insert(src.clone(), Arc::clone(&image));
        Ok(image)
    }
}

/// State of one render pass. Created fresh for every pass.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub cursor_y: f64,
    /// Geometry of every message laid out so far, in list order.
    pub bubbles: Vec<BubbleGeometry>,
    pub commands: Vec<PaintCommand>,
    /// Characters queued for drawing that no registered face covers.
    pub uncovered: BTreeSet<char>,
}

impl RenderContext {
    fn new() -> Self {
        Self {
            cursor_y: TOP_OFFSET,
            bubbles: Vec::new(),
            commands: Vec::new(),
            uncovered: BTreeSet::new(),
        }
    }
}

/// A populated surface and where the cursor ended up.
pub struct Rendered {
    pub surface: Surface,
    /// Cursor after the last message, including its trailing gap.
    pub final_cursor_y: f64,
    pub bubbles: Vec<BubbleGeometry>,
    /// Characters left blank for lack of a face.
    pub uncovered: BTreeSet<char>,
}

/// Lays out and paints conversations.
pub struct Compositor<'a, R: ImageResolver> {
    fonts: &'a FontContext,
    resolver: &'a R,
}

impl<'a, R: ImageResolver> Compositor<'a, R> {
    pub fn new(fonts: &'a FontContext, resolver: &'a R) -> Self {
        Self { fonts, resolver }
    }

    /// Build the paint commands for `messages` on a `width × height`
    /// canvas. Each sticker is resolved before its row is laid out.
    pub async fn compose(
        &self,
        messages: &[Message],
        theme: &Theme,
        width: u32,
        height: u32,
        images: &mut ImageCache,
    ) -> Result<RenderContext, ExportError> {
        let mut ctx = RenderContext::new();
        let canvas = Rect::new(0.0, 0.0, width as f64, height as f64);

        ctx.commands.push(PaintCommand::FillRect {
            rect: canvas,
            paint: Paint::Solid(theme.phone_background),
        });
        ctx.commands.push(PaintCommand::FillRect {
            rect: canvas,
            paint: style::resolve(
                &ColorSpec::Gradient(theme.chat_background),
                canvas,
                GradientAxis::Vertical,
            ),
        });

        let engine = BubbleLayoutEngine::new(self.fonts);
        for message in messages {
            let (placement, sticker) = match &message.body {
                MessageBody::Text { text } => (
                    engine.layout_text(message.author, text, ctx.cursor_y, theme, canvas.width),
                    None,
                ),
                MessageBody::Sticker { src } => {
                    let image = images.get_or_resolve(message, src, self.resolver).await?;
                    let dims = (image.width_px, image.height_px);
                    (
                        engine.layout_sticker(message.author, ctx.cursor_y, canvas.width, dims),
                        Some(image),
                    )
                }
            };

            self.paint_row(&mut ctx, &placement.geometry, &message.time_label, theme, sticker);
            ctx.bubbles.push(placement.geometry);
            ctx.cursor_y = placement.next_y + MESSAGE_GAP;
        }

        log::debug!(
            "composed {} message(s) on {}x{}, cursor ends at {}",
            messages.len(),
            width,
            height,
            ctx.cursor_y
        );
        Ok(ctx)
    }

    /// Compose and paint onto a new `width × height` surface.
    pub async fn render(
        &self,
        messages: &[Message],
        theme: &Theme,
        width: u32,
        height: u32,
        images: &mut ImageCache,
    ) -> Result<Rendered, ExportError> {
        let mut surface = Surface::new(width, height)?;
        let ctx = self.compose(messages, theme, width, height, images).await?;
        surface.apply(&ctx.commands, self.fonts);
        Ok(Rendered {
            surface,
            final_cursor_y: ctx.cursor_y,
            bubbles: ctx.bubbles,
            uncovered: ctx.uncovered,
        })
    }

    fn paint_row(
        &self,
        ctx: &mut RenderContext,
        geometry: &BubbleGeometry,
        time_label: &str,
        theme: &Theme,
        sticker: Option<Arc<LoadedImage>>,
    ) {
        if let Some(avatar) = geometry.avatar {
            ctx.commands.push(PaintCommand::FillCircle {
                center: avatar.center(),
                radius: avatar.width / 2.0,
                paint: Paint::Solid(avatar_background()),
            });
            ctx.commands.push(PaintCommand::AvatarGlyph {
                center: avatar.center(),
                size: AVATAR_GLYPH_SIZE,
                color: Color::BLACK,
            });
        }

        if let Some(fill) = geometry.fill {
            ctx.commands.push(PaintCommand::FillRoundRect {
                rect: geometry.bounds,
                radius: BUBBLE_RADIUS,
                paint: fill,
            });
        }

        match (&geometry.content, sticker) {
            (BubbleContent::Text { lines, x, top, color }, _) => {
                let ascent = self.fonts.ascent(BODY_FONT.size);
                for (i, line) in lines.iter().enumerate() {
                    if line.is_empty() {
                        continue;
                    }
                    self.fonts.uncovered(line, &mut ctx.uncovered);
                    ctx.commands.push(PaintCommand::Text {
                        text: line.clone(),
                        x: *x,
                        baseline: top + i as f64 * LINE_HEIGHT + ascent,
                        font: BODY_FONT,
                        color: *color,
                    });
                }
            }
            (BubbleContent::Sticker { .. }, Some(image)) => {
                ctx.commands.push(PaintCommand::Image {
                    image,
                    dest: geometry.bounds,
                });
            }
            (BubbleContent::Sticker { .. }, None) => {}
        }

        self.fonts.uncovered(time_label, &mut ctx.uncovered);
        let x = match geometry.time.align {
            TextAlign::Left => geometry.time.x,
            TextAlign::Right => geometry.time.x - self.fonts.measure(time_label, &TIME_FONT),
        };
        ctx.commands.push(PaintCommand::Text {
            text: time_label.to_string(),
            x,
            baseline: geometry.time.baseline,
            font: TIME_FONT,
            color: theme.time,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_loader::MemoryResolver;
    use crate::model::Author;
    use futures::executor::block_on;

    fn compose(messages: &[Message], resolver: &MemoryResolver) -> Result<RenderContext, ExportError> {
        let fonts = FontContext::new();
        let compositor = Compositor::new(&fonts, resolver);
        block_on(compositor.compose(messages, &Theme::sunrise(), 320, 568, &mut ImageCache::new()))
    }

    #[test]
    fn test_background_then_gradient() {
        let ctx = compose(&[], &MemoryResolver::new()).unwrap();
        assert_eq!(ctx.commands.len(), 2);
        assert!(matches!(
            ctx.commands[0],
            PaintCommand::FillRect { paint: Paint::Solid(_), .. }
        ));
        match ctx.commands[1] {
            PaintCommand::FillRect {
                paint: Paint::Linear { start, end, .. },
                ..
            } => {
                assert_eq!(start, (0.0, 0.0));
                assert_eq!(end, (0.0, 568.0));
            }
            ref other => panic!("expected gradient, got {:?}", other),
        }
        assert_eq!(ctx.cursor_y, TOP_OFFSET);
    }

    #[test]
    fn test_receive_row_stacking_order() {
        let msgs = [Message::text("m1", Author::Receive, "hey", "09:41")];
        let ctx = compose(&msgs, &MemoryResolver::new()).unwrap();
        let kinds: Vec<&str> = ctx.commands[2..]
            .iter()
            .map(|c| match c {
                PaintCommand::FillCircle { .. } => "circle",
                PaintCommand::AvatarGlyph { .. } => "glyph",
                PaintCommand::FillRoundRect { .. } => "bubble",
                PaintCommand::Text { .. } => "text",
                PaintCommand::Image { .. } => "image",
                PaintCommand::FillRect { .. } => "rect",
            })
            .collect();
        assert_eq!(kinds, vec!["circle", "glyph", "bubble", "text", "text"]);
    }

    #[test]
    fn test_send_row_has_no_avatar() {
        let msgs = [Message::text("m1", Author::Send, "hey", "09:41")];
        let ctx = compose(&msgs, &MemoryResolver::new()).unwrap();
        assert!(!ctx.commands.iter().any(|c| matches!(
            c,
            PaintCommand::FillCircle { .. } | PaintCommand::AvatarGlyph { .. }
        )));
    }

    #[test]
    fn test_send_time_label_ends_left_of_bubble() {
        let msgs = [Message::text("m1", Author::Send, "hey", "09:41")];
        let ctx = compose(&msgs, &MemoryResolver::new()).unwrap();
        let bubble = ctx.bubbles[0].bounds;
        let fonts = FontContext::new();
        let label_width = fonts.measure("09:41", &TIME_FONT);
        let time = ctx
            .commands
            .iter()
            .find_map(|c| match c {
                PaintCommand::Text { text, x, .. } if text == "09:41" => Some(*x),
                _ => None,
            })
            .unwrap();
        assert!((time + label_width - (bubble.x - 6.0)).abs() < 1e-9);
    }

    #[test]
    fn test_cursor_advances_with_gap() {
        let msgs = [
            Message::text("a", Author::Send, "one", "09:41"),
            Message::text("b", Author::Send, "two", "09:42"),
        ];
        let ctx = compose(&msgs, &MemoryResolver::new()).unwrap();
        assert_eq!(ctx.bubbles[0].bounds.y, 80.0);
        assert_eq!(ctx.bubbles[1].bounds.y, 80.0 + 34.0 + 12.0);
        assert_eq!(ctx.cursor_y, 80.0 + 2.0 * (34.0 + 12.0));
    }

    #[test]
    fn test_blank_lines_emit_no_text() {
        let msgs = [Message::text("a", Author::Send, "a\n\nb", "")];
        let ctx = compose(&msgs, &MemoryResolver::new()).unwrap();
        let lines: Vec<&str> = ctx
            .commands
            .iter()
            .filter_map(|c| match c {
                PaintCommand::Text { text, font, .. } if font.size == BODY_FONT.size => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_sticker_row_uses_resolved_dimensions() {
        let mut resolver = MemoryResolver::new();
        resolver.insert(
            "cat.png",
            LoadedImage::from_rgba(image::RgbaImage::new(320, 240)),
        );
        let msgs = [Message::sticker("s", Author::Receive, "cat.png", "10:00")];
        let ctx = compose(&msgs, &resolver).unwrap();
        assert_eq!(ctx.bubbles[0].bounds, Rect::new(52.0, 80.0, 160.0, 120.0));
        assert!(ctx.commands.iter().any(|c| matches!(c, PaintCommand::Image { .. })));
        assert!(!ctx.commands.iter().any(|c| matches!(c, PaintCommand::FillRoundRect { .. })));
    }

    #[test]
    fn test_uncovered_characters_are_collected() {
        let fonts = FontContext::bundled();
        let resolver = MemoryResolver::new();
        let compositor = Compositor::new(&fonts, &resolver);
        let msgs = [Message::text("a", Author::Receive, "ok 世", "09:41")];
        let ctx = block_on(compositor.compose(
            &msgs,
            &Theme::sunrise(),
            320,
            568,
            &mut ImageCache::new(),
        ))
        .unwrap();
        assert_eq!(ctx.uncovered.into_iter().collect::<Vec<_>>(), vec!['世']);
    }

    #[test]
    fn test_missing_sticker_aborts() {
        let msgs = [
            Message::text("a", Author::Send, "before", "09:41"),
            Message::sticker("s", Author::Send, "gone.png", "09:42"),
        ];
        let err = compose(&msgs, &MemoryResolver::new()).unwrap_err();
        assert!(matches!(err, ExportError::ImageLoad { ref message_id, .. } if message_id == "s"));
    }
}
