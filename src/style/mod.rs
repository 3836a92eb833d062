//! # Themes and Paint Resolution
//!
//! A theme is a named set of colours and gradients controlling how an
//! exported conversation looks. Colours are written the way a stylesheet
//! would write them (`#ffe069`, `rgba(255, 255, 255, 0.85)`) so themes can be
//! authored inline in a conversation document.
//!
//! [`resolve`] turns a theme colour into a concrete [`Paint`] for a given
//! bounding box. It is pure: the same spec and box always produce the same
//! paint.

use crate::layout::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build a colour from 8-bit channels and a 0.0 - 1.0 alpha.
    pub fn rgba8(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn hex(hex: &str) -> Self {
        Self::parse_hex(hex).unwrap_or(Color::BLACK)
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let (r, g, b) = match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex.get(0..1)?.repeat(2), 16).ok()?;
                let g = u8::from_str_radix(&hex.get(1..2)?.repeat(2), 16).ok()?;
                let b = u8::from_str_radix(&hex.get(2..3)?.repeat(2), 16).ok()?;
                (r, g, b)
            }
            6 => {
                let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
                let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
                let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
                (r, g, b)
            }
            _ => return None,
        };
        Some(Self::rgba8(r, g, b, 1.0))
    }

    /// 8-bit channels, alpha included, rounded to nearest.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl FromStr for Color {
    type Err = String;

    /// Accepts `#rgb`, `#rrggbb`, `rgb(r, g, b)` and `rgba(r, g, b, a)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('#') {
            return Self::parse_hex(s).ok_or_else(|| format!("Invalid hex colour '{}'", s));
        }
        let (args, expect_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(format!("Unsupported colour syntax '{}'", s));
        };
        let args = args
            .strip_suffix(')')
            .ok_or_else(|| format!("Missing ')' in colour '{}'", s))?;
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        let expected = if expect_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(format!(
                "Expected {} components in colour '{}', found {}",
                expected,
                s,
                parts.len()
            ));
        }
        let channel = |p: &str| {
            p.parse::<u8>()
                .map_err(|_| format!("Invalid channel '{}' in colour '{}'", p, s))
        };
        let alpha = if expect_alpha {
            parts[3]
                .parse::<f64>()
                .map_err(|_| format!("Invalid alpha '{}' in colour '{}'", parts[3], s))?
        } else {
            1.0
        };
        Ok(Self::rgba8(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            alpha,
        ))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, _] = self.to_rgba8();
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", r, g, b, self.a)
        }
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

/// A theme colour: either one solid colour or a two-stop gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Solid(Color),
    Gradient([Color; 2]),
}

/// A named set of colours for one visual style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default)]
    pub label: String,
    pub phone_background: Color,
    /// Top and bottom stops of the full-height chat overlay.
    pub chat_background: [Color; 2],
    pub receive_bubble: ColorSpec,
    pub receive_text: Color,
    pub send_bubble: ColorSpec,
    pub send_text: Color,
    pub time: Color,
}

/// Ids of the built-in themes, in display order.
pub const THEME_IDS: [&str; 3] = ["sunrise", "midnight", "mint"];

impl Theme {
    /// Look up a built-in theme by id.
    pub fn by_id(id: &str) -> Option<Theme> {
        match id {
            "sunrise" => Some(Self::sunrise()),
            "midnight" => Some(Self::midnight()),
            "mint" => Some(Self::mint()),
            _ => None,
        }
    }

    pub fn sunrise() -> Theme {
        Theme {
            label: "晨曦".to_string(),
            phone_background: Color::hex("#2B303F"),
            chat_background: [
                Color::rgba8(255, 227, 175, 0.4),
                Color::rgba8(255, 255, 255, 0.0),
            ],
            receive_bubble: ColorSpec::Solid(Color::rgba8(255, 255, 255, 0.85)),
            receive_text: Color::hex("#2f2000"),
            send_bubble: ColorSpec::Solid(Color::hex("#ffe069")),
            send_text: Color::hex("#2f2000"),
            time: Color::rgba8(255, 255, 255, 0.65),
        }
    }

    pub fn midnight() -> Theme {
        Theme {
            label: "午夜".to_string(),
            phone_background: Color::hex("#2B303F"),
            chat_background: [
                Color::rgba8(8, 12, 24, 0.65),
                Color::rgba8(8, 12, 24, 0.25),
            ],
            receive_bubble: ColorSpec::Solid(Color::rgba8(17, 32, 56, 0.9)),
            receive_text: Color::hex("#f5f5f6"),
            send_bubble: ColorSpec::Gradient([Color::hex("#5cf0c3"), Color::hex("#2d80ff")]),
            send_text: Color::hex("#031819"),
            time: Color::rgba8(255, 255, 255, 0.65),
        }
    }

    pub fn mint() -> Theme {
        Theme {
            label: "薄荷".to_string(),
            phone_background: Color::hex("#2B303F"),
            chat_background: [
                Color::rgba8(220, 255, 245, 0.5),
                Color::rgba8(255, 255, 255, 0.3),
            ],
            receive_bubble: ColorSpec::Solid(Color::rgba8(255, 255, 255, 0.95)),
            receive_text: Color::hex("#013049"),
            send_bubble: ColorSpec::Gradient([Color::hex("#7efff5"), Color::hex("#4facfe")]),
            send_text: Color::hex("#013049"),
            time: Color::rgba8(255, 255, 255, 0.65),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::sunrise()
    }
}

/// Which way a gradient runs across its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientAxis {
    /// Top edge to bottom edge.
    Vertical,
    /// Left edge to right edge.
    Horizontal,
    /// Top-left corner to bottom-right corner.
    Diagonal,
}

/// A fully resolved fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Two-stop linear gradient from `start` (colour `from`) to `end`
    /// (colour `to`), in surface coordinates.
    Linear {
        start: (f64, f64),
        end: (f64, f64),
        from: Color,
        to: Color,
    },
}

/// Resolve a theme colour into a paint spanning `bounds` along `axis`.
pub fn resolve(spec: &ColorSpec, bounds: Rect, axis: GradientAxis) -> Paint {
    match *spec {
        ColorSpec::Solid(color) => Paint::Solid(color),
        ColorSpec::Gradient([from, to]) => {
            let start = (bounds.x, bounds.y);
            let end = match axis {
                GradientAxis::Vertical => (bounds.x, bounds.bottom()),
                GradientAxis::Horizontal => (bounds.right(), bounds.y),
                GradientAxis::Diagonal => (bounds.right(), bounds.bottom()),
            };
            Paint::Linear {
                start,
                end,
                from,
                to,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_and_rgba() {
        let c: Color = "#ffe069".parse().unwrap();
        assert_eq!(c.to_rgba8(), [255, 224, 105, 255]);

        let c: Color = "rgba(255, 255, 255, 0.85)".parse().unwrap();
        assert_eq!(c.to_rgba8(), [255, 255, 255, 217]);

        let c: Color = "#abc".parse().unwrap();
        assert_eq!(c.to_rgba8(), [0xaa, 0xbb, 0xcc, 255]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("rgba(1, 2, 3)".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#é1".parse::<Color>().is_err());
        assert!("hsl(0, 0%, 0%)".parse::<Color>().is_err());
        assert!("rgb(300, 0, 0)".parse::<Color>().is_err());
    }

    #[test]
    fn test_theme_deserializes_from_css_strings() {
        let json = r##"{
            "phoneBackground": "#2B303F",
            "chatBackground": ["rgba(8, 12, 24, 0.65)", "rgba(8, 12, 24, 0.25)"],
            "receiveBubble": "rgba(17, 32, 56, 0.9)",
            "receiveText": "#f5f5f6",
            "sendBubble": ["#5cf0c3", "#2d80ff"],
            "sendText": "#031819",
            "time": "rgba(255, 255, 255, 0.65)"
        }"##;
        let theme: Theme = serde_json::from_str(json).unwrap();
        let mut expected = Theme::midnight();
        expected.label = String::new();
        assert_eq!(theme, expected);
    }

    #[test]
    fn test_builtin_ids_resolve() {
        for id in THEME_IDS {
            assert!(Theme::by_id(id).is_some(), "missing theme {}", id);
        }
        assert!(Theme::by_id("neon").is_none());
    }

    #[test]
    fn test_resolve_solid_ignores_bounds() {
        let spec = ColorSpec::Solid(Color::hex("#ffe069"));
        let a = resolve(&spec, Rect::new(0.0, 0.0, 10.0, 10.0), GradientAxis::Diagonal);
        let b = resolve(&spec, Rect::new(5.0, 5.0, 99.0, 1.0), GradientAxis::Vertical);
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolve_gradient_spans_box() {
        let spec = Theme::midnight().send_bubble;
        let bounds = Rect::new(100.0, 80.0, 60.0, 34.0);
        match resolve(&spec, bounds, GradientAxis::Diagonal) {
            Paint::Linear { start, end, from, .. } => {
                assert_eq!(start, (100.0, 80.0));
                assert_eq!(end, (160.0, 114.0));
                assert_eq!(from, Color::hex("#5cf0c3"));
            }
            other => panic!("expected gradient, got {:?}", other),
        }
        match resolve(&spec, bounds, GradientAxis::Vertical) {
            Paint::Linear { end, .. } => assert_eq!(end, (100.0, 114.0)),
            other => panic!("expected gradient, got {:?}", other),
        }
    }
}
