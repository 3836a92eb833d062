//! Built-in fallback metrics.
//!
//! Used for any character no registered face covers, and for everything
//! when no faces are registered at all. Widths are in ems and only need to
//! be plausible and deterministic: wide East-Asian characters take a full
//! em, Latin text roughly follows a proportional sans-serif.

/// Approximate advance widths for a proportional sans-serif.
pub struct FallbackMetrics;

/// Ascent as a fraction of the font size, measured from the em-box top.
pub const FALLBACK_ASCENT: f64 = 0.8;

impl FallbackMetrics {
    /// Advance width of `ch` in ems.
    pub fn em_width(ch: char) -> f64 {
        if is_wide(ch) {
            return 1.0;
        }
        match ch {
            '\u{0}'..='\u{1f}' | '\u{7f}' => 0.0,
            ' ' | 'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '!' | '|' | '\'' => 0.28,
            'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.33,
            'm' | 'w' => 0.83,
            'M' | 'W' => 0.89,
            'A'..='Z' => 0.67,
            '0'..='9' => 0.56,
            _ if ch.is_ascii() => 0.5,
            _ => 0.6,
        }
    }

    /// Advance width of `ch` in pixels at `font_size`.
    pub fn char_width(ch: char, font_size: f64) -> f64 {
        Self::em_width(ch) * font_size
    }
}

/// Whether `ch` is rendered full-width (CJK ideographs, kana, Hangul,
/// full-width forms, emoji).
pub fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F
        | 0x2600..=0x27BF
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1F64F
        | 0x1F680..=0x1F6FF
        | 0x1F900..=0x1F9FF
        | 0x20000..=0x2FFFD
        | 0x30000..=0x3FFFD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cjk_is_full_em() {
        assert_eq!(FallbackMetrics::char_width('世', 14.0), 14.0);
        assert_eq!(FallbackMetrics::char_width('界', 14.0), 14.0);
        assert_eq!(FallbackMetrics::char_width('ア', 14.0), 14.0);
    }

    #[test]
    fn test_latin_is_narrower_than_cjk() {
        for ch in "Hello, World 123".chars() {
            assert!(FallbackMetrics::em_width(ch) < 1.0, "{:?}", ch);
            assert!(FallbackMetrics::em_width(ch) > 0.0, "{:?}", ch);
        }
    }

    #[test]
    fn test_symbols_and_transport_emoji_are_wide() {
        for ch in ['☀', '✂', '❤', '🚀', '🛫', '👍'] {
            assert!(is_wide(ch), "{:?}", ch);
            assert_eq!(FallbackMetrics::em_width(ch), 1.0);
        }
        assert!(!is_wide('é'));
    }

    #[test]
    fn test_control_chars_have_no_width() {
        assert_eq!(FallbackMetrics::em_width('\t'), 0.0);
    }
}
