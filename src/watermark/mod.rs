//! Text and image watermarks.
//!
//! Both kinds are placed at the centre of the base image. Text is drawn fully
//! opaque in the renderer's colour; image watermarks are blended source-over
//! at a configurable opacity (0.5 by default).

pub mod compositor;
pub mod text;

pub use compositor::{blend_layer, centered_position, overlay_centered, PlacementPosition};
pub use text::TextRenderer;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_OPACITY: f32 = 0.5;
pub const DEFAULT_WATERMARK_IMAGE: &str = "logo.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WatermarkType {
    Text,
    Image,
}

impl WatermarkType {
    pub const ALL: [WatermarkType; 2] = [WatermarkType::Text, WatermarkType::Image];

    pub fn label(self) -> &'static str {
        match self {
            WatermarkType::Text => "Text watermark",
            WatermarkType::Image => "Image watermark",
        }
    }
}

impl fmt::Display for WatermarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WatermarkRequest {
    Text { text: String },
    /// Watermark image name, resolved in the image directory.
    Image { file: String },
}

impl WatermarkRequest {
    pub fn kind(&self) -> WatermarkType {
        match self {
            WatermarkRequest::Text { .. } => WatermarkType::Text,
            WatermarkRequest::Image { .. } => WatermarkType::Image,
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            WatermarkRequest::Text { .. } => "Text watermark was added successfully!",
            WatermarkRequest::Image { .. } => "Image watermark was added successfully!",
        }
    }
}

/// Draw `text` centred over `image`.
pub fn add_text_watermark(image: &DynamicImage, renderer: &TextRenderer, text: &str) -> DynamicImage {
    let mut canvas = image.to_rgba8();
    renderer.stamp(&mut canvas, text);
    DynamicImage::ImageRgba8(canvas)
}

/// Blend `watermark` centred over `image` at `opacity`.
pub fn add_image_watermark(
    image: &DynamicImage,
    watermark: &DynamicImage,
    opacity: f32,
) -> (DynamicImage, PlacementPosition) {
    let mut canvas = image.to_rgba8();
    let position = overlay_centered(&mut canvas, &watermark.to_rgba8(), opacity);
    (DynamicImage::ImageRgba8(canvas), position)
}
