//! PNG word clouds.
//!
//! Words are laid out largest first along an Archimedean spiral from the
//! canvas center, shrinking a word until it fits or drops below the minimum
//! size. Glyphs are drawn unshaped in the order they arrive, which is the
//! display order produced by [`crate::render::display_text`].

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont, point};
use image::{ImageFormat, Rgb, RgbImage};
use tracing::{debug, info};

use crate::error::{Result, StatsError};
use crate::render::{Renderer, WordCloudConfig};
use crate::vocabulary::word_frequencies;

const MIN_FONT_SIZE: f32 = 4.0;
const SHRINK_FACTOR: f32 = 0.8;
const SPIRAL_STEP: f64 = 2.0;
const ANGLE_STEP: f64 = 0.1;
// Block fallback: advance and glyph box as fractions of the font size.
const BLOCK_ADVANCE: f32 = 0.6;
const BLOCK_INSET: f32 = 0.05;
const BLOCK_TOP: f32 = 0.2;
const BLOCK_BOTTOM: f32 = 0.9;

// viridis, dark to light
const PALETTE: [Rgb<u8>; 6] = [
    Rgb([68, 1, 84]),
    Rgb([65, 68, 135]),
    Rgb([42, 120, 142]),
    Rgb([34, 168, 132]),
    Rgb([122, 209, 81]),
    Rgb([189, 223, 38]),
];

/// Rasterizes the word cloud into a PNG at the requested path.
///
/// With `font_path` set, words are drawn with that font. Without one, each
/// character is drawn as a solid block so the layout is still visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngRenderer;

impl Renderer for PngRenderer {
    fn render(&self, blob: &str, config: &WordCloudConfig, output: &Path) -> Result<PathBuf> {
        if config.width == 0 || config.height == 0 {
            return Err(StatsError::Render(format!(
                "canvas must not be empty, got {}x{}",
                config.width, config.height
            )));
        }
        let background = parse_color(&config.background_color)?;
        let face = match &config.font_path {
            Some(path) => Face::load(path)?,
            None => Face::Blocks,
        };

        let mut canvas = RgbImage::from_pixel(config.width, config.height, background);
        let bounds = (config.width as i32, config.height as i32);
        let words = word_frequencies(blob, config.max_words);
        let mut placed: Vec<Slot> = Vec::with_capacity(words.len());

        for (rank, entry) in words.iter().enumerate() {
            let mut size = (entry.weight as f32 * config.max_font_size as f32).max(MIN_FONT_SIZE);
            loop {
                let (w, h) = face.measure(&entry.word, size);
                if let Some(slot) = find_slot(w, h, bounds, &placed) {
                    face.draw(&mut canvas, &entry.word, size, slot, PALETTE[rank % PALETTE.len()]);
                    placed.push(slot);
                    break;
                }
                if size <= MIN_FONT_SIZE {
                    debug!("No room left for {:?}", entry.word);
                    break;
                }
                size = (size * SHRINK_FACTOR).max(MIN_FONT_SIZE);
            }
        }

        canvas
            .save_with_format(output, ImageFormat::Png)
            .map_err(|e| StatsError::Render(format!("{}: {e}", output.display())))?;

        info!(
            "Drew {} of {} words into {}",
            placed.len(),
            words.len(),
            output.display()
        );
        Ok(output.to_path_buf())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Slot {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl Slot {
    fn overlaps(&self, other: &Slot) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// First free slot for a `w` x `h` box along a spiral from the center.
fn find_slot(w: i32, h: i32, (width, height): (i32, i32), placed: &[Slot]) -> Option<Slot> {
    if w > width || h > height {
        return None;
    }
    let (cx, cy) = (f64::from(width) / 2.0, f64::from(height) / 2.0);
    let max_radius = cx.hypot(cy);

    let mut angle = 0.0f64;
    loop {
        let radius = SPIRAL_STEP * angle;
        if radius > max_radius {
            return None;
        }
        let slot = Slot {
            x: (cx + radius * angle.cos()) as i32 - w / 2,
            y: (cy + radius * angle.sin()) as i32 - h / 2,
            w,
            h,
        };
        let inside = slot.x >= 0 && slot.y >= 0 && slot.x + w <= width && slot.y + h <= height;
        if inside && !placed.iter().any(|p| p.overlaps(&slot)) {
            return Some(slot);
        }
        angle += ANGLE_STEP;
    }
}

enum Face {
    Font(FontVec),
    Blocks,
}

impl Face {
    fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| StatsError::io(path, e))?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| StatsError::Render(format!("{}: {e}", path.display())))?;
        Ok(Face::Font(font))
    }

    fn measure(&self, word: &str, size: f32) -> (i32, i32) {
        match self {
            Face::Font(font) => {
                let scaled = font.as_scaled(PxScale::from(size));
                let mut width = 0.0f32;
                let mut prev: Option<GlyphId> = None;
                for c in word.chars() {
                    let id = font.glyph_id(c);
                    if let Some(prev) = prev {
                        width += scaled.kern(prev, id);
                    }
                    width += scaled.h_advance(id);
                    prev = Some(id);
                }
                (width.ceil() as i32, scaled.height().ceil() as i32)
            }
            Face::Blocks => {
                let chars = word.chars().count() as f32;
                ((chars * size * BLOCK_ADVANCE).ceil() as i32, size.ceil() as i32)
            }
        }
    }

    fn draw(&self, canvas: &mut RgbImage, word: &str, size: f32, slot: Slot, color: Rgb<u8>) {
        match self {
            Face::Font(font) => {
                let scale = PxScale::from(size);
                let scaled = font.as_scaled(scale);
                let mut caret = point(slot.x as f32, slot.y as f32 + scaled.ascent());
                let mut prev: Option<GlyphId> = None;
                for c in word.chars() {
                    let id = font.glyph_id(c);
                    if let Some(prev) = prev {
                        caret.x += scaled.kern(prev, id);
                    }
                    let glyph = id.with_scale_and_position(scale, caret);
                    caret.x += scaled.h_advance(id);
                    prev = Some(id);

                    if let Some(outlined) = font.outline_glyph(glyph) {
                        let bounds = outlined.px_bounds();
                        outlined.draw(|gx, gy, coverage| {
                            let x = bounds.min.x as i32 + gx as i32;
                            let y = bounds.min.y as i32 + gy as i32;
                            blend(canvas, x, y, color, coverage);
                        });
                    }
                }
            }
            Face::Blocks => {
                let advance = size * BLOCK_ADVANCE;
                let top = slot.y + (size * BLOCK_TOP) as i32;
                let bottom = slot.y + (size * BLOCK_BOTTOM) as i32;
                for (i, _) in word.chars().enumerate() {
                    let left = slot.x + (i as f32 * advance + size * BLOCK_INSET) as i32;
                    let right = slot.x + ((i + 1) as f32 * advance - size * BLOCK_INSET) as i32;
                    for y in top..bottom {
                        for x in left..right {
                            blend(canvas, x, y, color, 1.0);
                        }
                    }
                }
            }
        }
    }
}

fn blend(canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for (dst, src) in pixel.0.iter_mut().zip(color.0) {
        *dst = (f32::from(*dst) * (1.0 - coverage) + f32::from(src) * coverage).round() as u8;
    }
}

/// Parses a named color or `#rrggbb`.
pub fn parse_color(name: &str) -> Result<Rgb<u8>> {
    let name = name.trim().to_ascii_lowercase();
    let rgb = match name.as_str() {
        "white" => [255, 255, 255],
        "black" => [0, 0, 0],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "gray" | "grey" => [128, 128, 128],
        hex if hex.len() == 7 && hex.starts_with('#') => {
            let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
            match (channel(1..3), channel(3..5), channel(5..7)) {
                (Ok(r), Ok(g), Ok(b)) => [r, g, b],
                _ => return Err(StatsError::Render(format!("invalid color {name:?}"))),
            }
        }
        _ => return Err(StatsError::Render(format!("unknown color {name:?}"))),
    };
    Ok(Rgb(rgb))
}
