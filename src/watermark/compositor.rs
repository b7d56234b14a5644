//! Source-over compositing of an overlay onto a base image.

use image::{Rgba, RgbaImage};

/// Top-left corner of an overlay on the base canvas. May be negative when the
/// overlay is larger than the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

/// Offset that centres an overlay of `overlay` size on a canvas of `base` size:
/// `base / 2 - overlay / 2`, with halves rounded up.
pub fn centered_position(base: (u32, u32), overlay: (u32, u32)) -> PlacementPosition {
    let offset = |b: u32, o: u32| (b as f64 / 2.0 - o as f64 / 2.0 + 0.5).floor() as i32;
    PlacementPosition { x: offset(base.0, overlay.0), y: offset(base.1, overlay.1) }
}

/// Blend `overlay` onto `target` at `position`, scaling the overlay's alpha by
/// `opacity`. Parts falling outside the target are clipped.
pub fn blend_layer(
    target: &mut RgbaImage,
    overlay: &RgbaImage,
    position: PlacementPosition,
    opacity: f32,
) {
    let x_start = position.x.max(0);
    let y_start = position.y.max(0);
    let x_end = (position.x + overlay.width() as i32).min(target.width() as i32);
    let y_end = (position.y + overlay.height() as i32).min(target.height() as i32);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let src = *overlay.get_pixel((tx - position.x) as u32, (ty - position.y) as u32);
            let dst = target.get_pixel_mut(tx as u32, ty as u32);
            *dst = blend_pixels(*dst, src, opacity);
        }
    }
}

/// Centre `overlay` on `target` and blend it. Returns where it landed.
pub fn overlay_centered(target: &mut RgbaImage, overlay: &RgbaImage, opacity: f32) -> PlacementPosition {
    let position = centered_position(target.dimensions(), overlay.dimensions());
    blend_layer(target, overlay, position, opacity);
    position
}

/// Porter-Duff "over": result = fg + bg * (1 - fg.alpha), with the foreground
/// alpha first multiplied by `opacity`.
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fg_alpha = (foreground[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    let bg_alpha = background[3] as f32 / 255.0;
    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |fg: u8, bg: u8| -> u8 {
        let fg = fg as f32 / 255.0;
        let bg = bg as f32 / 255.0;
        let out = (fg * fg_alpha + bg * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(foreground[0], background[0]),
        channel(foreground[1], background[1]),
        channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
