//! Text watermark rendering with fontdue.

use super::compositor::overlay_centered;
use crate::{Result, WatermarkerError};
use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};
use std::fmt;
use std::path::Path;

const EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSansMono.ttf");

pub const DEFAULT_FONT_SIZE: f32 = 32.0;

/// Lays out and rasterises watermark text.
#[derive(Clone)]
pub struct TextRenderer {
    font: Font,
    size: f32,
    color: Rgba<u8>,
}

impl fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextRenderer")
            .field("size", &self.size)
            .field("color", &self.color)
            .finish()
    }
}

impl TextRenderer {
    /// Renderer using the bundled DejaVu Sans Mono, 32 px, black.
    pub fn embedded() -> Result<Self> {
        Self::from_bytes(EMBEDDED_FONT)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    fn from_bytes(data: impl std::ops::Deref<Target = [u8]>) -> Result<Self> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| WatermarkerError::Font(e.to_string()))?;
        Ok(Self { font, size: DEFAULT_FONT_SIZE, color: Rgba([0, 0, 0, 255]) })
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_color(mut self, color: Rgba<u8>) -> Self {
        self.color = color;
        self
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    fn line_height(&self) -> f32 {
        self.font
            .horizontal_line_metrics(self.size)
            .map(|m| m.new_line_size)
            .unwrap_or(self.size * 1.2)
    }

    fn ascent(&self) -> f32 {
        self.font
            .horizontal_line_metrics(self.size)
            .map(|m| m.ascent)
            .unwrap_or(self.size)
    }

    /// Pen advance of `line`, kerning included.
    pub fn line_width(&self, line: &str) -> f32 {
        let mut width = 0.0;
        let mut prev: Option<char> = None;
        for ch in line.chars() {
            if let Some(p) = prev {
                width += self.font.horizontal_kern(p, ch, self.size).unwrap_or(0.0);
            }
            width += self.font.metrics(ch, self.size).advance_width;
            prev = Some(ch);
        }
        width
    }

    /// Greedy word wrap to `max_width` pixels. Explicit newlines always break;
    /// a single word wider than `max_width` keeps a line of its own.
    pub fn wrap(&self, text: &str, max_width: u32) -> Vec<String> {
        let max_width = max_width as f32;
        let mut lines = Vec::new();

        for paragraph in text.lines() {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                if current.is_empty() {
                    current.push_str(word);
                    continue;
                }
                let candidate = format!("{current} {word}");
                if self.line_width(&candidate) <= max_width {
                    current = candidate;
                } else {
                    lines.push(std::mem::replace(&mut current, word.to_string()));
                }
            }
            lines.push(current);
        }

        // Blank lines only pad the block; trailing ones would shift the centre.
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines
    }

    /// Render `text` onto a transparent block, each line centred within it.
    /// Returns `None` when there is nothing to draw.
    pub fn render(&self, text: &str, max_width: u32) -> Option<RgbaImage> {
        let lines = self.wrap(text, max_width);
        if lines.iter().all(|l| l.is_empty()) {
            return None;
        }

        let line_height = self.line_height();
        let block_width = lines
            .iter()
            .map(|l| self.line_width(l))
            .fold(0.0f32, f32::max)
            .ceil()
            .max(1.0) as u32;
        let block_height = (line_height * lines.len() as f32).ceil().max(1.0) as u32;
        let mut block = RgbaImage::new(block_width, block_height);

        let ascent = self.ascent();
        for (row, line) in lines.iter().enumerate() {
            let baseline = (ascent + row as f32 * line_height).round() as i32;
            let mut pen_x = (block_width as f32 - self.line_width(line)) / 2.0;
            let mut prev: Option<char> = None;

            for ch in line.chars() {
                if let Some(p) = prev {
                    pen_x += self.font.horizontal_kern(p, ch, self.size).unwrap_or(0.0);
                }
                let (metrics, bitmap) = self.font.rasterize(ch, self.size);
                let x0 = pen_x.round() as i32 + metrics.xmin;
                let y0 = baseline - metrics.height as i32 - metrics.ymin;
                self.draw_glyph(&mut block, &bitmap, metrics.width, x0, y0);

                pen_x += metrics.advance_width;
                prev = Some(ch);
            }
        }

        Some(block)
    }

    fn draw_glyph(&self, block: &mut RgbaImage, coverage: &[u8], width: usize, x0: i32, y0: i32) {
        if width == 0 {
            return;
        }
        for (i, &cov) in coverage.iter().enumerate() {
            if cov == 0 {
                continue;
            }
            let x = x0 + (i % width) as i32;
            let y = y0 + (i / width) as i32;
            if x < 0 || y < 0 || x >= block.width() as i32 || y >= block.height() as i32 {
                continue;
            }
            let alpha = (cov as u32 * self.color[3] as u32 / 255) as u8;
            let px = block.get_pixel_mut(x as u32, y as u32);
            // Overlapping glyph edges keep the stronger coverage.
            if alpha > px[3] {
                *px = Rgba([self.color[0], self.color[1], self.color[2], alpha]);
            }
        }
    }

    /// Draw `text` centred over the whole of `target`, wrapping to its width.
    /// Returns false when the text had nothing visible to draw.
    pub fn stamp(&self, target: &mut RgbaImage, text: &str) -> bool {
        match self.render(text, target.width()) {
            Some(block) => {
                overlay_centered(target, &block, 1.0);
                true
            }
            None => false,
        }
    }
}
