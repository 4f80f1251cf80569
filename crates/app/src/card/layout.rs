//! Card geometry as a flat draw list.
//!
//! The layout is pure: text widths come from a [`TextMetrics`]
//! implementation, so tests can check positions without a font file.

use paw_fortune_core::{GeneratedFortune, Rarity};

/// An sRGB color.
pub type Rgb = [u8; 3];

/// Canvas width.
pub const CANVAS_WIDTH: u32 = 1200;
/// Height of the square image block.
pub const IMAGE_HEIGHT: u32 = 1200;
/// Height of the text block under the image.
pub const TEXT_BLOCK_HEIGHT: u32 = 500;
/// Canvas height.
pub const CANVAS_HEIGHT: u32 = IMAGE_HEIGHT + TEXT_BLOCK_HEIGHT;
/// Horizontal margin of the text block.
pub const PADDING: f32 = 60.0;

pub const WHITE: Rgb = [0xFF, 0xFF, 0xFF];
pub const TEXT_BLOCK_BG: Rgb = [0xF5, 0xF3, 0xFF];
pub const RULE_COLOR: Rgb = [0x81, 0x8C, 0xF8];
pub const TITLE_COLOR: Rgb = [0x31, 0x2E, 0x81];
pub const ACTION_COLOR: Rgb = [0x6B, 0x72, 0x80];
pub const QUOTE_COLOR: Rgb = [0x4F, 0x46, 0xE5];
pub const FOOTER_COLOR: Rgb = [0x9C, 0xA3, 0xAF];

const RULE_WIDTH: f32 = 4.0;
const TITLE_SIZE: f32 = 70.0;
const BADGE_TEXT_SIZE: f32 = 40.0;
const BADGE_HEIGHT: f32 = 60.0;
const BADGE_RADIUS: f32 = 30.0;
const BADGE_TEXT_PADDING: f32 = 40.0;
const ACTION_SIZE: f32 = 40.0;
const QUOTE_SIZE: f32 = 50.0;
const QUOTE_LINE_HEIGHT: f32 = 80.0;
const FOOTER_SIZE: f32 = 30.0;

/// Where a text op's `(x, y)` sits relative to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Top-left corner.
    TopLeft,
    /// Middle of the top edge.
    TopCenter,
    /// Center of the text box.
    Center,
}

/// One drawing instruction, in canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    /// The fortune's image, scaled to fill the rectangle.
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Rgb,
    },
    RoundedRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        color: Rgb,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        color: Rgb,
        anchor: Anchor,
    },
}

/// Measures rendered text width.
pub trait TextMetrics {
    /// Advance width of `text` at `size` pixels.
    fn text_width(&self, text: &str, size: f32) -> f32;
}

/// Fallback metrics: every character is one em wide.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmEstimate;

impl TextMetrics for EmEstimate {
    #[allow(clippy::cast_precision_loss)]
    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size
    }
}

/// Break `text` into lines no wider than `max_width`, one character at a
/// time. The first character always stays on the first line.
#[must_use]
pub fn wrap_chars(text: &str, max_width: f32, size: f32, metrics: &impl TextMetrics) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for (n, ch) in text.chars().enumerate() {
        let mut candidate = line.clone();
        candidate.push(ch);
        if n > 0 && metrics.text_width(&candidate, size) > max_width {
            lines.push(std::mem::take(&mut line));
            line.push(ch);
        } else {
            line = candidate;
        }
    }
    lines.push(line);
    lines
}

/// Text of the footer line.
#[must_use]
pub fn footer_text(date: &str) -> String {
    format!("PawFortune 爪爪运势 • {date} •©胡子盖 horffsky@gmail.com")
}

/// Export file name for a card.
///
/// Path separators and control characters in the title become `_`.
#[must_use]
pub fn file_name(title: &str, millis: i64) -> String {
    let safe: String = title
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\') || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("paw-fortune-{safe}-{millis}.png")
}

/// Badge pill color for a rarity.
#[must_use]
pub const fn badge_color(rarity: Rarity) -> Rgb {
    rarity.badge_rgb()
}

/// Lay out the card for `fortune`. `date` is printed in the footer.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn card_ops(fortune: &GeneratedFortune, date: &str, metrics: &impl TextMetrics) -> Vec<DrawOp> {
    let width = CANVAS_WIDTH as f32;
    let image_height = IMAGE_HEIGHT as f32;
    let data = &fortune.data;

    let mut ops = vec![
        DrawOp::FillRect {
            x: 0.0,
            y: 0.0,
            width,
            height: CANVAS_HEIGHT as f32,
            color: WHITE,
        },
        DrawOp::Image {
            x: 0.0,
            y: 0.0,
            width,
            height: image_height,
        },
        DrawOp::FillRect {
            x: 0.0,
            y: image_height,
            width,
            height: TEXT_BLOCK_HEIGHT as f32,
            color: TEXT_BLOCK_BG,
        },
        DrawOp::Line {
            from: (PADDING, image_height + 20.0),
            to: (width - PADDING, image_height + 20.0),
            width: RULE_WIDTH,
            color: RULE_COLOR,
        },
        DrawOp::Text {
            text: data.title.clone(),
            x: PADDING,
            y: image_height + 60.0,
            size: TITLE_SIZE,
            color: TITLE_COLOR,
            anchor: Anchor::TopLeft,
        },
    ];

    let label = data.rarity.label_zh();
    let badge_width = metrics.text_width(label, BADGE_TEXT_SIZE) + BADGE_TEXT_PADDING;
    let badge_x = width - PADDING - badge_width;
    let badge_y = image_height + 65.0;
    ops.push(DrawOp::RoundedRect {
        x: badge_x,
        y: badge_y,
        width: badge_width,
        height: BADGE_HEIGHT,
        radius: BADGE_RADIUS,
        color: badge_color(data.rarity),
    });
    ops.push(DrawOp::Text {
        text: label.to_string(),
        x: badge_x + badge_width / 2.0,
        y: badge_y + BADGE_HEIGHT / 2.0 + 2.0,
        size: BADGE_TEXT_SIZE,
        color: WHITE,
        anchor: Anchor::Center,
    });

    ops.push(DrawOp::Text {
        text: format!("抽到了：{}", data.action_description),
        x: PADDING,
        y: image_height + 150.0,
        size: ACTION_SIZE,
        color: ACTION_COLOR,
        anchor: Anchor::TopLeft,
    });

    let quote = format!("✨ {}", data.fortune_quote);
    let mut y = image_height + 230.0;
    for line in wrap_chars(&quote, PADDING.mul_add(-2.0, width), QUOTE_SIZE, metrics) {
        ops.push(DrawOp::Text {
            text: line,
            x: PADDING,
            y,
            size: QUOTE_SIZE,
            color: QUOTE_COLOR,
            anchor: Anchor::TopLeft,
        });
        y += QUOTE_LINE_HEIGHT;
    }

    ops.push(DrawOp::Text {
        text: footer_text(date),
        x: width / 2.0,
        y: CANVAS_HEIGHT as f32 - 50.0,
        size: FOOTER_SIZE,
        color: FOOTER_COLOR,
        anchor: Anchor::TopCenter,
    });

    ops
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use paw_fortune_core::{Animal, FortuneData};

    use super::*;

    /// Every character is 10px wide regardless of size.
    struct Fixed;

    impl TextMetrics for Fixed {
        #[allow(clippy::cast_precision_loss)]
        fn text_width(&self, text: &str, _size: f32) -> f32 {
            text.chars().count() as f32 * 10.0
        }
    }

    fn fortune(rarity: Rarity, quote: &str) -> GeneratedFortune {
        GeneratedFortune {
            data: FortuneData {
                animal: Animal::Cat,
                title: "夜宵之王".into(),
                action_description: "抱着拉面碗的加菲猫".into(),
                fortune_quote: quote.into(),
                base_label: "YUMMY".into(),
                visual_prompt: "garfield cat eating ramen".into(),
                rarity,
            },
            image_url: "data:image/png;base64,AAAA".into(),
            timestamp: 1_760_000_000_000,
        }
    }

    fn texts(ops: &[DrawOp]) -> Vec<(&str, f32, f32, Anchor)> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Text {
                    text, x, y, anchor, ..
                } => Some((text.as_str(), *x, *y, *anchor)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_fixed_geometry() {
        let ops = card_ops(&fortune(Rarity::Common, "好"), "2026/10/17", &Fixed);
        assert_eq!(
            ops.first(),
            Some(&DrawOp::FillRect {
                x: 0.0,
                y: 0.0,
                width: 1200.0,
                height: 1700.0,
                color: WHITE
            })
        );
        assert!(ops.contains(&DrawOp::Image {
            x: 0.0,
            y: 0.0,
            width: 1200.0,
            height: 1200.0
        }));
        assert!(ops.contains(&DrawOp::FillRect {
            x: 0.0,
            y: 1200.0,
            width: 1200.0,
            height: 500.0,
            color: TEXT_BLOCK_BG
        }));
        assert!(ops.contains(&DrawOp::Line {
            from: (60.0, 1220.0),
            to: (1140.0, 1220.0),
            width: 4.0,
            color: RULE_COLOR
        }));

        let texts = texts(&ops);
        assert!(texts.contains(&("夜宵之王", 60.0, 1260.0, Anchor::TopLeft)));
        assert!(texts.contains(&("抽到了：抱着拉面碗的加菲猫", 60.0, 1350.0, Anchor::TopLeft)));
        assert!(texts.contains(&("✨ 好", 60.0, 1430.0, Anchor::TopLeft)));
        assert!(texts.contains(&(
            "PawFortune 爪爪运势 • 2026/10/17 •©胡子盖 horffsky@gmail.com",
            600.0,
            1650.0,
            Anchor::TopCenter
        )));
    }

    #[test]
    fn test_badge_right_aligned() {
        let ops = card_ops(&fortune(Rarity::Secret, "好"), "d", &Fixed);
        // "隐藏（狗屎运款）" is 8 chars -> 80 + 40
        let badge = ops
            .iter()
            .find(|op| matches!(op, DrawOp::RoundedRect { .. }))
            .unwrap();
        assert_eq!(
            badge,
            &DrawOp::RoundedRect {
                x: 1200.0 - 60.0 - 120.0,
                y: 1265.0,
                width: 120.0,
                height: 60.0,
                radius: 30.0,
                color: [0xFA, 0xCC, 0x15],
            }
        );
        assert!(texts(&ops).contains(&("隐藏（狗屎运款）", 1080.0, 1297.0, Anchor::Center)));
    }

    #[test]
    fn test_badge_colors() {
        assert_eq!(badge_color(Rarity::Common), [0x9C, 0xA3, 0xAF]);
        assert_eq!(badge_color(Rarity::Rare), [0x60, 0xA5, 0xFA]);
        assert_eq!(badge_color(Rarity::UltraRare), [0xA8, 0x55, 0xF7]);
    }

    #[test]
    fn test_em_estimate_badge_width() {
        let ops = card_ops(&fortune(Rarity::Rare, "好"), "d", &EmEstimate);
        assert!(ops.iter().any(|op| matches!(
            op,
            DrawOp::RoundedRect { width, .. } if *width == 2.0 * 40.0 + 40.0
        )));
    }

    #[test]
    fn test_quote_wraps_with_line_height() {
        // 2 + 120 chars at 10px: 108 fit per 1080px line
        let quote = "运".repeat(120);
        let ops = card_ops(&fortune(Rarity::Common, &quote), "d", &Fixed);
        let quote_lines: Vec<_> = texts(&ops)
            .into_iter()
            .filter(|(_, x, y, _)| *x == 60.0 && *y >= 1430.0 && *y < 1650.0)
            .collect();
        assert_eq!(quote_lines.len(), 2);
        assert_eq!(quote_lines[0].2, 1430.0);
        assert_eq!(quote_lines[1].2, 1510.0);
        assert_eq!(quote_lines[0].0.chars().count(), 108);
        assert_eq!(quote_lines[1].0.chars().count(), 14);
    }

    #[test]
    fn test_wrap_keeps_first_char() {
        assert_eq!(wrap_chars("ab", 5.0, 1.0, &Fixed), vec!["a", "b"]);
        assert_eq!(wrap_chars("", 5.0, 1.0, &Fixed), vec![""]);
    }

    #[test]
    fn test_footer_text() {
        assert_eq!(
            footer_text("2026/10/17"),
            "PawFortune 爪爪运势 • 2026/10/17 •©胡子盖 horffsky@gmail.com"
        );
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            file_name("夜宵之王", 1_760_000_000_123),
            "paw-fortune-夜宵之王-1760000000123.png"
        );
        assert_eq!(file_name("a/b", 1), "paw-fortune-a_b-1.png");
    }
}
