//! The image directory and the file-level edit and watermark operations.

use crate::edit::EditRequest;
use crate::image_io::{open_image, save_image};
use crate::naming::{prepare_edited_filename, prepare_output_filename};
use crate::watermark::{self, TextRenderer, WatermarkRequest, DEFAULT_OPACITY};
use crate::{Result, WatermarkerError};
use image::Rgba;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const DEFAULT_IMAGE_DIR: &str = "img";
pub const DEFAULT_QUALITY: u8 = 100;

/// Resolves names inside the image directory and writes derived outputs next
/// to their inputs.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    text: TextRenderer,
    opacity: f32,
    quality: u8,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            text: TextRenderer::embedded()?,
            opacity: DEFAULT_OPACITY,
            quality: DEFAULT_QUALITY,
        })
    }

    pub fn with_text_renderer(mut self, renderer: TextRenderer) -> Self {
        self.text = renderer;
        self
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        if size.is_finite() && size > 0.0 {
            self.text = self.text.with_size(size);
        }
        self
    }

    pub fn with_text_color(mut self, color: Rgba<u8>) -> Self {
        self.text = self.text.with_color(color);
        self
    }

    /// Clamped to 0..=1; NaN keeps the current opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        if !opacity.is_nan() {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Path of `name`, or `MissingFile` if it is not there.
    pub fn require(&self, name: &str) -> Result<PathBuf> {
        let path = self.resolve(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(WatermarkerError::MissingFile(path))
        }
    }

    /// Edit `input` and write `<base>-edited-<label>.<ext>`.
    #[instrument(skip(self))]
    pub fn apply_edit(&self, input: &str, request: &EditRequest) -> Result<PathBuf> {
        let image = open_image(&self.require(input)?)?;
        let edited = request.apply(&image)?;

        let output = self.resolve(&prepare_edited_filename(input, request.option().label()));
        save_image(&edited, &output, self.quality)?;
        info!(output = %output.display(), "Edit written");
        Ok(output)
    }

    /// Stamp `text` over `input` and write `<base>-with-watermark.<ext>`.
    #[instrument(skip(self))]
    pub fn add_text_watermark(&self, input: &str, text: &str) -> Result<PathBuf> {
        let image = open_image(&self.require(input)?)?;
        let marked = watermark::add_text_watermark(&image, &self.text, text);

        let output = self.resolve(&prepare_output_filename(input));
        save_image(&marked, &output, self.quality)?;
        info!(output = %output.display(), "Text watermark written");
        Ok(output)
    }

    /// Blend the `watermark_file` image over `input` and write
    /// `<base>-with-watermark.<ext>`. Both files must exist.
    #[instrument(skip(self))]
    pub fn add_image_watermark(&self, input: &str, watermark_file: &str) -> Result<PathBuf> {
        let input_path = self.require(input)?;
        let watermark_path = self.require(watermark_file)?;

        let image = open_image(&input_path)?;
        let mark = open_image(&watermark_path)?;
        let (marked, position) = watermark::add_image_watermark(&image, &mark, self.opacity);

        let output = self.resolve(&prepare_output_filename(input));
        save_image(&marked, &output, self.quality)?;
        info!(
            output = %output.display(),
            x = position.x,
            y = position.y,
            opacity = self.opacity,
            "Image watermark written"
        );
        Ok(output)
    }

    pub fn apply_watermark(&self, input: &str, request: &WatermarkRequest) -> Result<PathBuf> {
        match request {
            WatermarkRequest::Text { text } => self.add_text_watermark(input, text),
            WatermarkRequest::Image { file } => self.add_image_watermark(input, file),
        }
    }
}
