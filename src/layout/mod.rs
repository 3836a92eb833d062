//! # Bubble Layout
//!
//! Pure geometry for one message: where its bubble, avatar and time label
//! go, given the cursor position and canvas width. Nothing here draws; the
//! compositor turns a [`BubbleGeometry`] into paint commands.
//!
//! ```text
//!  receive:  [8][avatar 34][10][ bubble ≤220 ][6]09:41
//!  send:                   09:41[6][ bubble ≤220 ][8]
//! ```

use crate::model::Author;
use crate::style::{self, Color, GradientAxis, Paint, Theme};
use crate::text::{self, FontSpec, TextMeasure};

/// Gap between the canvas edge and the outermost element of a row.
pub const EDGE_PADDING: f64 = 8.0;
/// Diameter of the circular avatar slot on received messages.
pub const AVATAR_SIZE: f64 = 34.0;
/// Gap between the avatar and the bubble.
pub const AVATAR_GAP: f64 = 10.0;
pub const BUBBLE_RADIUS: f64 = 18.0;
pub const MAX_BUBBLE_WIDTH: f64 = 220.0;
/// Used when every wrapped line measures zero wide.
pub const MIN_BUBBLE_WIDTH: f64 = 120.0;
pub const BUBBLE_PADDING_X: f64 = 14.0;
pub const BUBBLE_PADDING_Y: f64 = 10.0;
pub const BODY_FONT: FontSpec = FontSpec { size: 14.0 };
/// 1.5 × the body font size.
pub const LINE_HEIGHT: f64 = 21.0;
pub const TIME_FONT: FontSpec = FontSpec { size: 10.0 };
/// Horizontal gap between a bubble and its time label, and the label's
/// baseline inset from the bubble bottom.
pub const TIME_OFFSET: f64 = 6.0;
/// Stickers are scaled down so their longest side fits this.
pub const STICKER_MAX_SIZE: f64 = 160.0;
/// Vertical space added after every message.
pub const MESSAGE_GAP: f64 = 12.0;

/// An axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Horizontal alignment of a text run relative to its anchor x.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
}

/// Where a message's time label goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimePlacement {
    pub x: f64,
    /// Alphabetic baseline.
    pub baseline: f64,
    pub align: TextAlign,
}

/// What sits inside the bubble bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum BubbleContent {
    Text {
        lines: Vec<String>,
        /// Left edge of every line.
        x: f64,
        /// Em-box top of the first line; later lines follow at
        /// [`LINE_HEIGHT`] intervals.
        top: f64,
        color: Color,
    },
    /// The sticker image is scaled to exactly the bubble bounds.
    Sticker { width: u32, height: u32 },
}

/// Complete geometry of one laid-out message.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleGeometry {
    pub author: Author,
    pub bounds: Rect,
    /// Bubble background. `None` for stickers, which have no fill.
    pub fill: Option<Paint>,
    pub avatar: Option<Rect>,
    pub time: TimePlacement,
    pub content: BubbleContent,
}

/// A laid-out message and the cursor position just below it (before the
/// inter-message gap).
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub geometry: BubbleGeometry,
    pub next_y: f64,
}

/// Computes bubble geometry using a text measurer for wrapping.
pub struct BubbleLayoutEngine<'a, M: TextMeasure + ?Sized> {
    measurer: &'a M,
}

impl<'a, M: TextMeasure + ?Sized> BubbleLayoutEngine<'a, M> {
    pub fn new(measurer: &'a M) -> Self {
        Self { measurer }
    }

    /// Lay out a text message with its top edge at `cursor_y`.
    pub fn layout_text(
        &self,
        author: Author,
        text: &str,
        cursor_y: f64,
        theme: &Theme,
        canvas_width: f64,
    ) -> Placement {
        let max_text_width = MAX_BUBBLE_WIDTH - BUBBLE_PADDING_X * 2.0;
        let lines = text::wrap(self.measurer, text, max_text_width, &BODY_FONT);

        let widest = lines
            .iter()
            .map(|line| self.measurer.measure(line, &BODY_FONT))
            .fold(0.0_f64, f64::max);
        let width = if widest > 0.0 {
            MAX_BUBBLE_WIDTH.min(widest + BUBBLE_PADDING_X * 2.0)
        } else {
            MIN_BUBBLE_WIDTH
        };

        // The last line only needs its glyph height, not a full line
        // height, so trailing line spacing doesn't pad the bubble.
        let block_height = text_block_height(lines.len());
        let height = block_height + BUBBLE_PADDING_Y * 2.0;

        let (bounds, avatar, time) = place_row(author, cursor_y, width, height, canvas_width);
        let (bubble_spec, text_color) = match author {
            Author::Send => (&theme.send_bubble, theme.send_text),
            Author::Receive => (&theme.receive_bubble, theme.receive_text),
        };
        let top = cursor_y + BUBBLE_PADDING_Y + (height - BUBBLE_PADDING_Y * 2.0 - block_height) / 2.0;

        Placement {
            geometry: BubbleGeometry {
                author,
                bounds,
                fill: Some(style::resolve(bubble_spec, bounds, GradientAxis::Diagonal)),
                avatar,
                time,
                content: BubbleContent::Text {
                    lines,
                    x: bounds.x + BUBBLE_PADDING_X,
                    top,
                    color: text_color,
                },
            },
            next_y: cursor_y + row_height(author, height),
        }
    }

    /// Lay out a sticker whose decoded image is `image_dims` pixels.
    pub fn layout_sticker(
        &self,
        author: Author,
        cursor_y: f64,
        canvas_width: f64,
        image_dims: (u32, u32),
    ) -> Placement {
        let (width, height) = sticker_size(image_dims);
        let (bounds, avatar, time) =
            place_row(author, cursor_y, width as f64, height as f64, canvas_width);

        Placement {
            geometry: BubbleGeometry {
                author,
                bounds,
                fill: None,
                avatar,
                time,
                content: BubbleContent::Sticker { width, height },
            },
            next_y: cursor_y + row_height(author, height as f64),
        }
    }
}

/// Height of `line_count` lines where the last one uses the font size
/// rather than the full line height.
pub fn text_block_height(line_count: usize) -> f64 {
    line_count.saturating_sub(1) as f64 * LINE_HEIGHT + BODY_FONT.size
}

/// Scale an image down (never up) so its longest side is at most
/// [`STICKER_MAX_SIZE`], keeping the aspect ratio.
pub fn sticker_size((w, h): (u32, u32)) -> (u32, u32) {
    let longest = w.max(h).max(1) as f64;
    let scale = (STICKER_MAX_SIZE / longest).min(1.0);
    let scaled = |v: u32| ((v as f64 * scale).round() as u32).max(1);
    (scaled(w), scaled(h))
}

fn row_height(author: Author, content_height: f64) -> f64 {
    let avatar = if author.has_avatar() { AVATAR_SIZE } else { 0.0 };
    content_height.max(avatar)
}

/// Position a `width × height` bubble for `author`, returning the bubble
/// bounds, the avatar slot (receive only) and the time label placement.
fn place_row(
    author: Author,
    cursor_y: f64,
    width: f64,
    height: f64,
    canvas_width: f64,
) -> (Rect, Option<Rect>, TimePlacement) {
    let baseline = cursor_y + height - TIME_OFFSET;
    match author {
        Author::Send => {
            let x = canvas_width - width - EDGE_PADDING;
            let time = TimePlacement {
                x: x - TIME_OFFSET,
                baseline,
                align: TextAlign::Right,
            };
            (Rect::new(x, cursor_y, width, height), None, time)
        }
        Author::Receive => {
            let avatar = Rect::new(EDGE_PADDING, cursor_y, AVATAR_SIZE, AVATAR_SIZE);
            let x = avatar.right() + AVATAR_GAP;
            let time = TimePlacement {
                x: x + width + TIME_OFFSET,
                baseline,
                align: TextAlign::Left,
            };
            (Rect::new(x, cursor_y, width, height), Some(avatar), time)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontContext;

    /// Every code point is 10px wide.
    struct Mono;

    impl TextMeasure for Mono {
        fn measure(&self, text: &str, _font: &FontSpec) -> f64 {
            text.chars().count() as f64 * 10.0
        }
    }

    #[test]
    fn test_send_text_is_right_aligned() {
        let engine = BubbleLayoutEngine::new(&Mono);
        let p = engine.layout_text(Author::Send, "Hello", 80.0, &Theme::sunrise(), 320.0);
        let g = &p.geometry;
        // 5 chars * 10 + 28 padding
        assert_eq!(g.bounds, Rect::new(320.0 - 78.0 - 8.0, 80.0, 78.0, 34.0));
        assert!(g.avatar.is_none());
        assert_eq!(g.time.align, TextAlign::Right);
        assert_eq!(g.time.x, g.bounds.x - 6.0);
        assert_eq!(g.time.baseline, 80.0 + 34.0 - 6.0);
        assert_eq!(p.next_y, 114.0);
    }

    #[test]
    fn test_receive_text_reserves_avatar() {
        let engine = BubbleLayoutEngine::new(&Mono);
        let p = engine.layout_text(Author::Receive, "Hi", 80.0, &Theme::sunrise(), 320.0);
        let g = &p.geometry;
        assert_eq!(g.avatar, Some(Rect::new(8.0, 80.0, 34.0, 34.0)));
        assert_eq!(g.bounds.x, 52.0);
        assert_eq!(g.time.align, TextAlign::Left);
        assert_eq!(g.time.x, g.bounds.right() + 6.0);
        // A one-line bubble is exactly as tall as the avatar.
        assert_eq!(p.next_y, 80.0 + 34.0);
    }

    #[test]
    fn test_width_is_capped_and_text_wraps() {
        let engine = BubbleLayoutEngine::new(&Mono);
        let text = "x".repeat(50);
        let p = engine.layout_text(Author::Send, &text, 0.0, &Theme::sunrise(), 400.0);
        // widest line is 190px + 28 padding
        assert_eq!(p.geometry.bounds.width, 218.0);
        assert!(p.geometry.bounds.width <= MAX_BUBBLE_WIDTH);
        match &p.geometry.content {
            BubbleContent::Text { lines, .. } => {
                // 192px usable -> 19 chars per line
                assert_eq!(lines.len(), 3);
                assert_eq!(lines[0].len(), 19);
            }
            other => panic!("expected text, got {:?}", other),
        }
        assert_eq!(p.geometry.bounds.height, 2.0 * 21.0 + 14.0 + 20.0);
    }

    #[test]
    fn test_oversized_glyph_hits_width_cap() {
        struct Huge;
        impl TextMeasure for Huge {
            fn measure(&self, text: &str, _font: &FontSpec) -> f64 {
                text.chars().count() as f64 * 300.0
            }
        }
        let engine = BubbleLayoutEngine::new(&Huge);
        let p = engine.layout_text(Author::Receive, "W", 0.0, &Theme::mint(), 400.0);
        assert_eq!(p.geometry.bounds.width, MAX_BUBBLE_WIDTH);
    }

    #[test]
    fn test_two_line_height_excludes_trailing_spacing() {
        let engine = BubbleLayoutEngine::new(&Mono);
        let p = engine.layout_text(Author::Send, "a\nb", 0.0, &Theme::sunrise(), 320.0);
        assert_eq!(p.geometry.bounds.height, 21.0 + 14.0 + 20.0);
    }

    #[test]
    fn test_blank_text_gets_minimum_width() {
        let engine = BubbleLayoutEngine::new(&Mono);
        let p = engine.layout_text(Author::Send, "", 0.0, &Theme::sunrise(), 320.0);
        assert_eq!(p.geometry.bounds.width, MIN_BUBBLE_WIDTH);
    }

    #[test]
    fn test_text_colours_follow_author() {
        let theme = Theme::midnight();
        let engine = BubbleLayoutEngine::new(&Mono);
        let send = engine.layout_text(Author::Send, "a", 0.0, &theme, 320.0);
        let recv = engine.layout_text(Author::Receive, "a", 0.0, &theme, 320.0);
        assert!(matches!(send.geometry.fill, Some(Paint::Linear { .. })));
        assert!(matches!(recv.geometry.fill, Some(Paint::Solid(_))));
        assert!(matches!(
            send.geometry.content,
            BubbleContent::Text { color, .. } if color == theme.send_text
        ));
    }

    #[test]
    fn test_sticker_scales_down_only() {
        assert_eq!(sticker_size((320, 160)), (160, 80));
        assert_eq!(sticker_size((100, 50)), (100, 50));
        assert_eq!(sticker_size((100, 400)), (40, 160));
    }

    #[test]
    fn test_sticker_layout() {
        let ctx = FontContext::new();
        let engine = BubbleLayoutEngine::new(&ctx);
        let send = engine.layout_sticker(Author::Send, 100.0, 375.0, (512, 512));
        assert_eq!(send.geometry.bounds, Rect::new(375.0 - 160.0 - 8.0, 100.0, 160.0, 160.0));
        assert!(send.geometry.fill.is_none());
        assert_eq!(send.next_y, 260.0);

        // A tiny sticker still advances by the avatar height.
        let recv = engine.layout_sticker(Author::Receive, 100.0, 375.0, (20, 10));
        assert_eq!(recv.geometry.bounds.x, 52.0);
        assert_eq!(recv.next_y, 134.0);
    }
}
