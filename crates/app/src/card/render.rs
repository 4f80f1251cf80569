//! Rasterize a card draw list into a PNG.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Local, Utc};
use fontdue::{Font, FontSettings};
use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use paw_fortune_core::GeneratedFortune;
use tracing::{debug, info, instrument, warn};

use super::CardError;
use super::layout::{
    Anchor, CANVAS_HEIGHT, CANVAS_WIDTH, DrawOp, EmEstimate, Rgb, TextMetrics, card_ops, file_name,
};

/// Font-backed text metrics.
struct FontMetrics<'a>(&'a Font);

impl TextMetrics for FontMetrics<'_> {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars()
            .map(|c| self.0.metrics(c, size).advance_width)
            .sum()
    }
}

/// Renders fortune cards.
pub struct CardRenderer {
    font: Option<Font>,
}

impl std::fmt::Debug for CardRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardRenderer")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl CardRenderer {
    /// A renderer that draws text with the font at `font_path`.
    ///
    /// Without a path, text is skipped.
    ///
    /// # Errors
    ///
    /// Returns `CardError::Font` if the file cannot be read or parsed.
    pub fn new(font_path: Option<&Path>) -> Result<Self, CardError> {
        let font = match font_path {
            Some(path) => {
                let bytes = fs::read(path).map_err(|e| {
                    CardError::Font(format!("failed to read font {}: {e}", path.display()))
                })?;
                let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|e| {
                    CardError::Font(format!("failed to parse font {}: {e}", path.display()))
                })?;
                debug!(path = %path.display(), "Loaded card font");
                Some(font)
            }
            None => None,
        };
        Ok(Self { font })
    }

    /// A renderer without a font.
    #[must_use]
    pub const fn without_font() -> Self {
        Self { font: None }
    }

    /// Whether text will be drawn.
    #[must_use]
    pub const fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// The draw list for `fortune`, measured with the loaded font if any.
    #[must_use]
    pub fn layout(&self, fortune: &GeneratedFortune) -> Vec<DrawOp> {
        let date = card_date(fortune.timestamp);
        match &self.font {
            Some(font) => card_ops(fortune, &date, &FontMetrics(font)),
            None => card_ops(fortune, &date, &EmEstimate),
        }
    }

    /// Render `fortune` to an RGBA canvas.
    ///
    /// # Errors
    ///
    /// Returns an error if the fortune's image cannot be decoded.
    pub fn render(&self, fortune: &GeneratedFortune) -> Result<RgbaImage, CardError> {
        let picture = decode_data_uri(&fortune.image_url)?;
        let mut canvas = RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, Rgba([255, 255, 255, 255]));

        if self.font.is_none() {
            warn!("No card font configured, text is skipped");
        }

        for op in self.layout(fortune) {
            match op {
                DrawOp::FillRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => fill_rect(&mut canvas, x, y, width, height, color),
                DrawOp::Image {
                    x,
                    y,
                    width,
                    height,
                } => draw_picture(&mut canvas, &picture, x, y, width, height),
                DrawOp::Line {
                    from,
                    to,
                    width,
                    color,
                } => draw_line(&mut canvas, from, to, width, color),
                DrawOp::RoundedRect {
                    x,
                    y,
                    width,
                    height,
                    radius,
                    color,
                } => fill_rounded_rect(&mut canvas, x, y, width, height, radius, color),
                DrawOp::Text {
                    text,
                    x,
                    y,
                    size,
                    color,
                    anchor,
                } => {
                    if let Some(font) = &self.font {
                        draw_text(&mut canvas, font, &text, (x, y), size, color, anchor);
                    }
                }
            }
        }

        Ok(canvas)
    }

    /// Render and save `fortune` as a PNG in `out_dir`.
    ///
    /// The file is named after the title and `now` in epoch milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the file cannot be written.
    #[instrument(skip(self, fortune), fields(title = %fortune.data.title))]
    pub fn export(
        &self,
        fortune: &GeneratedFortune,
        out_dir: &Path,
        now: DateTime<Utc>,
    ) -> Result<PathBuf, CardError> {
        let canvas = self.render(fortune)?;
        fs::create_dir_all(out_dir)?;
        let path = out_dir.join(file_name(&fortune.data.title, now.timestamp_millis()));
        canvas.save(&path)?;
        info!(path = %path.display(), "Card exported");
        Ok(path)
    }
}

/// Footer date: the fortune's local calendar date.
#[must_use]
pub fn card_date(timestamp_millis: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_millis)
        .map(|t| t.with_timezone(&Local).format("%Y/%m/%d").to_string())
        .unwrap_or_default()
}

/// Decode a `data:<mime>;base64,<payload>` URI into an image.
///
/// # Errors
///
/// Returns `CardError::DataUri` for malformed URIs and `CardError::Image`
/// for undecodable payloads.
pub fn decode_data_uri(uri: &str) -> Result<DynamicImage, CardError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| CardError::DataUri("missing data: prefix".to_string()))?;
    let (_mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| CardError::DataUri("not base64-encoded".to_string()))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| CardError::DataUri(e.to_string()))?;
    Ok(image::load_from_memory(&bytes)?)
}

// =============================================================================
// Pixel helpers
// =============================================================================

fn rgba(color: Rgb, alpha: u8) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], alpha])
}

/// Alpha-blend `src` onto the pixel at (x, y), ignoring out-of-bounds.
fn blend(canvas: &mut RgbaImage, x: i64, y: i64, src: Rgba<u8>) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    let Some(dst) = canvas.get_pixel_mut_checked(x, y) else {
        return;
    };
    let alpha = u16::from(src.0[3]);
    if alpha == 0 {
        return;
    }
    let inv_alpha = 255 - alpha;
    for (d, s) in dst.0.iter_mut().zip(src.0).take(3) {
        let mixed = (u16::from(s) * alpha + u16::from(*d) * inv_alpha + 127) / 255;
        *d = u8::try_from(mixed).unwrap_or(u8::MAX);
    }
    dst.0[3] = 255;
}

#[allow(clippy::cast_possible_truncation)]
fn span(start: f32, len: f32) -> std::ops::Range<i64> {
    (start.floor() as i64)..((start + len).ceil() as i64)
}

fn fill_rect(canvas: &mut RgbaImage, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
    for py in span(y, height) {
        for px in span(x, width) {
            blend(canvas, px, py, rgba(color, 255));
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn draw_picture(canvas: &mut RgbaImage, picture: &DynamicImage, x: f32, y: f32, width: f32, height: f32) {
    let scaled = picture
        .resize_exact(width.round() as u32, height.round() as u32, FilterType::Lanczos3)
        .to_rgba8();
    image::imageops::overlay(canvas, &scaled, x.round() as i64, y.round() as i64);
}

/// Stroke a segment with butt caps.
#[allow(clippy::cast_precision_loss)]
fn draw_line(canvas: &mut RgbaImage, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb) {
    let half = width / 2.0;
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let len_sq = dx.mul_add(dx, dy * dy);
    if len_sq == 0.0 {
        return;
    }
    let min_x = from.0.min(to.0) - half;
    let min_y = from.1.min(to.1) - half;
    let max_x = from.0.max(to.0) + half;
    let max_y = from.1.max(to.1) + half;

    for py in span(min_y, max_y - min_y) {
        for px in span(min_x, max_x - min_x) {
            let (cx, cy) = (px as f32 + 0.5, py as f32 + 0.5);
            let t = (cx - from.0).mul_add(dx, (cy - from.1) * dy) / len_sq;
            if !(0.0..=1.0).contains(&t) {
                continue;
            }
            let (nx, ny) = (t.mul_add(dx, from.0), t.mul_add(dy, from.1));
            let dist = (cx - nx).hypot(cy - ny);
            blend(canvas, px, py, rgba(color, coverage(half - dist)));
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn fill_rounded_rect(
    canvas: &mut RgbaImage,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    radius: f32,
    color: Rgb,
) {
    let radius = radius.min(width / 2.0).min(height / 2.0);
    for py in span(y, height) {
        for px in span(x, width) {
            let (cx, cy) = (px as f32 + 0.5, py as f32 + 0.5);
            // Distance outside the rectangle shrunk by the radius
            let qx = (cx - (x + width / 2.0)).abs() - (width / 2.0 - radius);
            let qy = (cy - (y + height / 2.0)).abs() - (height / 2.0 - radius);
            let outside = qx.max(0.0).hypot(qy.max(0.0));
            blend(canvas, px, py, rgba(color, coverage(radius - outside)));
        }
    }
}

/// Antialiased coverage for a signed distance inside an edge.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn coverage(inside: f32) -> u8 {
    ((inside + 0.5).clamp(0.0, 1.0) * 255.0).round() as u8
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn draw_text(
    canvas: &mut RgbaImage,
    font: &Font,
    text: &str,
    (x, y): (f32, f32),
    size: f32,
    color: Rgb,
    anchor: Anchor,
) {
    let (ascent, descent) = font
        .horizontal_line_metrics(size)
        .map_or((size, 0.0), |m| (m.ascent, m.descent));
    let width = FontMetrics(font).text_width(text, size);

    let left = match anchor {
        Anchor::TopLeft => x,
        Anchor::TopCenter | Anchor::Center => x - width / 2.0,
    };
    let top = match anchor {
        Anchor::TopLeft | Anchor::TopCenter => y,
        Anchor::Center => y - (ascent - descent) / 2.0,
    };
    let baseline = top + ascent;

    let mut pen = left;
    for ch in text.chars() {
        let (metrics, bitmap) = font.rasterize(ch, size);
        let gx = (pen + metrics.xmin as f32).round() as i64;
        let gy = (baseline - metrics.height as f32 - metrics.ymin as f32).round() as i64;
        for (i, &mask) in bitmap.iter().enumerate() {
            if mask == 0 || metrics.width == 0 {
                continue;
            }
            let (col, row) = (i % metrics.width, i / metrics.width);
            blend(
                canvas,
                gx + col as i64,
                gy + row as i64,
                rgba(color, mask),
            );
        }
        pen += metrics.advance_width;
    }
}
