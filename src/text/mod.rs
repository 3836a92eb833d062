//! # Text Wrapping
//!
//! Greedy, character-granularity line breaking. Chat bubbles mix Latin and
//! CJK text, and CJK has no inter-word spaces, so lines break between any
//! two code points rather than at word boundaries.

/// The font a run of text is set in. Only the size affects layout; the
/// face itself comes from whatever the [`TextMeasure`] implementation has
/// registered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    /// Font size in pixels.
    pub size: f64,
}

impl FontSpec {
    pub fn new(size: f64) -> Self {
        Self { size }
    }
}

/// Text-width measurement: `(text, font) -> pixel width`.
///
/// Implementations must be deterministic and monotonic: appending a
/// character never makes a string narrower.
pub trait TextMeasure {
    fn measure(&self, text: &str, font: &FontSpec) -> f64;
}

/// Wrap `text` into lines no wider than `max_width`.
///
/// Explicit `\n` breaks are honoured first and an empty paragraph becomes an
/// empty line. Within a paragraph, a line is flushed when the next code
/// point would overflow it; a single code point wider than `max_width`
/// still gets a line to itself.
pub fn wrap<M: TextMeasure + ?Sized>(
    measurer: &M,
    text: &str,
    max_width: f64,
    font: &FontSpec,
) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut line = String::new();
        for ch in paragraph.chars() {
            let mut candidate = String::with_capacity(line.len() + ch.len_utf8());
            candidate.push_str(&line);
            candidate.push(ch);

            if !line.is_empty() && measurer.measure(&candidate, font) > max_width {
                lines.push(std::mem::take(&mut line));
                line.push(ch);
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every code point is `w` pixels wide.
    struct Mono(f64);

    impl TextMeasure for Mono {
        fn measure(&self, text: &str, _font: &FontSpec) -> f64 {
            text.chars().count() as f64 * self.0
        }
    }

    fn font() -> FontSpec {
        FontSpec::new(14.0)
    }

    #[test]
    fn test_single_line() {
        let lines = wrap(&Mono(10.0), "Hello", 200.0, &font());
        assert_eq!(lines, vec!["Hello"]);
    }

    #[test]
    fn test_breaks_mid_word() {
        let lines = wrap(&Mono(10.0), "abcdefg", 30.0, &font());
        assert_eq!(lines, vec!["abc", "def", "g"]);
    }

    #[test]
    fn test_exact_fit_does_not_break() {
        let lines = wrap(&Mono(10.0), "abc", 30.0, &font());
        assert_eq!(lines, vec!["abc"]);
    }

    #[test]
    fn test_explicit_breaks_and_blank_lines() {
        let lines = wrap(&Mono(10.0), "Hello\n\n世界", 200.0, &font());
        assert_eq!(lines, vec!["Hello", "", "世界"]);
    }

    #[test]
    fn test_trailing_newline_yields_empty_line() {
        let lines = wrap(&Mono(10.0), "hi\n", 200.0, &font());
        assert_eq!(lines, vec!["hi", ""]);
    }

    #[test]
    fn test_empty_input_is_one_empty_line() {
        assert_eq!(wrap(&Mono(10.0), "", 100.0, &font()), vec![""]);
    }

    #[test]
    fn test_oversized_char_sits_alone() {
        let lines = wrap(&Mono(50.0), "ab", 30.0, &font());
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_code_points_not_bytes() {
        // Three-byte CJK chars must never be split.
        let lines = wrap(&Mono(10.0), "世界你好", 20.0, &font());
        assert_eq!(lines, vec!["世界", "你好"]);
    }

    /// Rebuild `text` from its wrapped lines: lines within a paragraph
    /// concatenate, paragraphs join on `\n`. Every paragraph, blank ones
    /// included, owns at least one line.
    fn reconstruct(text: &str, lines: &[String]) -> String {
        let mut rebuilt = String::new();
        let mut iter = lines.iter();
        for (i, paragraph) in text.split('\n').enumerate() {
            if i > 0 {
                rebuilt.push('\n');
            }
            let mut acc = iter.next().expect("ran out of lines").clone();
            while acc.len() < paragraph.len() {
                acc.push_str(iter.next().expect("ran out of lines"));
            }
            assert_eq!(acc, paragraph);
            rebuilt.push_str(&acc);
        }
        assert!(iter.next().is_none(), "lines left over");
        rebuilt
    }

    #[test]
    fn test_lines_fit_and_reconstruct() {
        let measurer = crate::font::FontContext::new();
        let text = "The quick brown fox 跳過了 the lazy dog\n\nsecond paragraph 第二段落 with more words";
        let max = 60.0;
        let lines = wrap(&measurer, text, max, &font());

        for line in &lines {
            if line.chars().count() > 1 {
                assert!(
                    measurer.measure(line, &font()) <= max,
                    "line {:?} overflows",
                    line
                );
            }
        }

        assert_eq!(reconstruct(text, &lines), text);
    }

    #[test]
    fn test_only_blank_lines_reconstruct() {
        let lines = wrap(&Mono(10.0), "\n\n", 100.0, &font());
        assert_eq!(lines, vec!["", "", ""]);
        assert_eq!(reconstruct("\n\n", &lines), "\n\n");
        assert_eq!(reconstruct("a\n\nb", &wrap(&Mono(10.0), "a\n\nb", 100.0, &font())), "a\n\nb");
    }
}
