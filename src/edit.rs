//! Pixel edits applied before watermarking.

use crate::{Result, WatermarkerError};
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Edit chosen in the input collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditOption {
    Brighten,
    IncreaseContrast,
    Grayscale,
    Invert,
}

impl EditOption {
    pub const ALL: [EditOption; 4] = [
        EditOption::Brighten,
        EditOption::IncreaseContrast,
        EditOption::Grayscale,
        EditOption::Invert,
    ];

    /// Menu label, also used verbatim in edited filenames.
    pub fn label(self) -> &'static str {
        match self {
            EditOption::Brighten => "Make image brighter",
            EditOption::IncreaseContrast => "Increase contrast",
            EditOption::Grayscale => "Make image b&w",
            EditOption::Invert => "Invert image",
        }
    }
}

impl fmt::Display for EditOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl FromStr for Axis {
    type Err = WatermarkerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hortz" | "horizontal" | "horizontally" | "h" => Ok(Axis::Horizontal),
            "vert" | "vertical" | "vertically" | "v" => Ok(Axis::Vertical),
            other => Err(WatermarkerError::InvalidInput(format!("unknown axis '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvertOperation {
    Flip(Axis),
    /// Same transform as `Flip`; kept as its own menu word.
    Mirror(Axis),
    Rotate { degrees: f32 },
}

/// Fully parameterised edit, ready to apply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditRequest {
    Brighten { value: f32 },
    Contrast { value: f32 },
    Grayscale,
    Invert(InvertOperation),
}

impl EditRequest {
    pub fn option(&self) -> EditOption {
        match self {
            EditRequest::Brighten { .. } => EditOption::Brighten,
            EditRequest::Contrast { .. } => EditOption::IncreaseContrast,
            EditRequest::Grayscale => EditOption::Grayscale,
            EditRequest::Invert(_) => EditOption::Invert,
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            EditRequest::Brighten { .. } => "Image brightness was changed successfully!",
            EditRequest::Contrast { .. } => "Image contrast was changed successfully!",
            EditRequest::Grayscale => "Image was made black&white successfully!",
            EditRequest::Invert(_) => "Image was inverted successfully!",
        }
    }

    /// Apply the edit. Parameters are checked here as well as at parse time,
    /// since requests can also come from an answers file.
    pub fn apply(&self, image: &DynamicImage) -> Result<DynamicImage> {
        match *self {
            EditRequest::Brighten { value } => Ok(brighten(image, check_adjustment(value)?)),
            EditRequest::Contrast { value } => {
                Ok(increase_contrast(image, check_adjustment(value)?))
            }
            EditRequest::Grayscale => Ok(grayscale(image)),
            EditRequest::Invert(op) => invert(image, op),
        }
    }
}

fn check_adjustment(value: f32) -> Result<f32> {
    if (-1.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(WatermarkerError::InvalidInput(format!(
            "adjustment {value} is outside -1..1"
        )))
    }
}

/// Parse a raw brightness/contrast line.
pub fn parse_adjustment(line: &str) -> Result<f32> {
    let value: f32 = line
        .trim()
        .parse()
        .map_err(|_| WatermarkerError::InvalidInput(format!("'{}' is not a number", line.trim())))?;
    check_adjustment(value)
}

/// Parse a raw rotation line (degrees, clockwise).
pub fn parse_degrees(line: &str) -> Result<f32> {
    let degrees: f32 = line
        .trim()
        .parse()
        .map_err(|_| WatermarkerError::InvalidInput(format!("'{}' is not a number", line.trim())))?;
    if degrees.is_finite() {
        Ok(degrees)
    } else {
        Err(WatermarkerError::InvalidInput("rotation must be finite".to_string()))
    }
}

/// Run `f` over the RGB channels of every pixel; alpha is left alone.
fn map_channels(image: &DynamicImage, f: impl Fn(u8) -> u8 + Sync) -> DynamicImage {
    let mut rgba = image.to_rgba8();
    rgba.par_chunks_exact_mut(4).for_each(|px| {
        for c in &mut px[..3] {
            *c = f(*c);
        }
    });
    DynamicImage::ImageRgba8(rgba)
}

/// `value` in -1 (black) ..= 1 (white).
pub fn brighten(image: &DynamicImage, value: f32) -> DynamicImage {
    map_channels(image, |c| {
        let c = c as f32;
        let out = if value < 0.0 {
            c * (1.0 + value)
        } else {
            c + (255.0 - c) * value
        };
        out.floor().clamp(0.0, 255.0) as u8
    })
}

/// `value` in -1 ..= 1; 0 leaves the image unchanged.
pub fn increase_contrast(image: &DynamicImage, value: f32) -> DynamicImage {
    let factor = (value + 1.0) / (1.0 - value);
    map_channels(image, |c| {
        (factor * (c as f32 - 127.0) + 127.0).floor().clamp(0.0, 255.0) as u8
    })
}

pub fn grayscale(image: &DynamicImage) -> DynamicImage {
    image.grayscale()
}

pub fn invert(image: &DynamicImage, op: InvertOperation) -> Result<DynamicImage> {
    match op {
        InvertOperation::Flip(axis) | InvertOperation::Mirror(axis) => Ok(match axis {
            Axis::Horizontal => image.fliph(),
            Axis::Vertical => image.flipv(),
        }),
        InvertOperation::Rotate { degrees } => rotate(image, degrees),
    }
}

/// Rotate clockwise. Quarter turns are lossless; other angles grow the canvas
/// to the rotated bounding box and fill the new corners with transparency.
pub fn rotate(image: &DynamicImage, degrees: f32) -> Result<DynamicImage> {
    if !degrees.is_finite() {
        return Err(WatermarkerError::InvalidInput("rotation must be finite".to_string()));
    }
    let normalised = degrees.rem_euclid(360.0);
    let near = |target: f32| (normalised - target).abs() < 0.01;

    if near(0.0) || near(360.0) {
        return Ok(image.clone());
    }
    if near(90.0) {
        return Ok(image.rotate90());
    }
    if near(180.0) {
        return Ok(image.rotate180());
    }
    if near(270.0) {
        return Ok(image.rotate270());
    }

    let theta = degrees.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let (w, h) = (image.width() as f32, image.height() as f32);
    let canvas_w = (w * cos + h * sin).ceil() as u32;
    let canvas_h = (w * sin + h * cos).ceil() as u32;

    // Rotate on a square that holds both the source and the result, then crop
    // to the rotated bounding box.
    let side = canvas_w.max(canvas_h).max(image.width()).max(image.height());
    let mut square = RgbaImage::from_pixel(side, side, Rgba([0, 0, 0, 0]));
    let x = (side - image.width()) / 2;
    let y = (side - image.height()) / 2;
    imageops::replace(&mut square, &image.to_rgba8(), x as i64, y as i64);

    let turned = rotate_about_center(&square, theta, Interpolation::Bilinear, Rgba([0, 0, 0, 0]));
    let rotated = imageops::crop_imm(
        &turned,
        (side - canvas_w) / 2,
        (side - canvas_h) / 2,
        canvas_w,
        canvas_h,
    )
    .to_image();
    Ok(DynamicImage::ImageRgba8(rotated))
}
