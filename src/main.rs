//! watermarker CLI - edit an image and stamp a watermark on it

use clap::Parser;
use image::Rgba;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use watermarker::workspace::{DEFAULT_IMAGE_DIR, DEFAULT_QUALITY};
use watermarker::{ScriptedSession, Session, TextRenderer, WatermarkerError, Workspace};

#[derive(Parser)]
#[command(name = "watermarker", about = "Edit an image and add a text or image watermark")]
struct Args {
    /// Directory holding input images; outputs are written next to them
    #[arg(short, long, default_value = DEFAULT_IMAGE_DIR)]
    img_dir: PathBuf,
    /// TrueType font for text watermarks (default: bundled DejaVu Sans Mono)
    #[arg(short, long)]
    font: Option<PathBuf>,
    /// Text watermark size in pixels
    #[arg(long, default_value = "32", value_parser = parse_font_size)]
    font_size: f32,
    /// Text watermark colour as hex RGB, e.g. "ff0000"
    #[arg(long, default_value = "000000", value_parser = parse_color)]
    color: Rgba<u8>,
    /// Source opacity of image watermarks (0.0-1.0)
    #[arg(long, default_value = "0.5", value_parser = parse_opacity)]
    opacity: f32,
    /// JPEG output quality (1-100)
    #[arg(short, long, default_value_t = DEFAULT_QUALITY)]
    quality: u8,
    /// Run one session from a JSON answers file instead of prompting
    #[arg(short, long)]
    answers: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_font_size(s: &str) -> Result<f32, String> {
    let size: f32 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if size.is_finite() && size > 0.0 {
        Ok(size)
    } else {
        Err("font size must be a positive number".to_string())
    }
}

fn parse_opacity(s: &str) -> Result<f32, String> {
    let opacity: f32 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..=1.0).contains(&opacity) {
        Ok(opacity)
    } else {
        Err("opacity must be between 0 and 1".to_string())
    }
}

fn parse_color(s: &str) -> Result<Rgba<u8>, String> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("'{s}' is not a 6-digit hex colour"));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("'{s}' is not a hex colour"))
    };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, 255]))
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), WatermarkerError> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut workspace = Workspace::new(&args.img_dir)?
        .with_opacity(args.opacity)
        .with_quality(args.quality);
    if let Some(font) = &args.font {
        workspace = workspace.with_text_renderer(TextRenderer::from_file(font)?);
    }
    let workspace = workspace.with_font_size(args.font_size).with_text_color(args.color);
    tracing::debug!(?workspace, "Workspace ready");

    if let Some(path) = &args.answers {
        let script = ScriptedSession::from_file(path)?;
        script.run(&workspace, &mut io::stdout().lock())?;
        return Ok(());
    }

    let stdin = io::stdin();
    Session::new(&workspace, stdin.lock(), io::stdout()).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["watermarker"]).unwrap();
        assert_eq!(args.font_size, 32.0);
        assert_eq!(args.opacity, 0.5);
        assert_eq!(args.color, Rgba([0, 0, 0, 255]));
        assert_eq!(args.img_dir, PathBuf::from("img"));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        for bad in [
            &["watermarker", "--opacity", "NaN"][..],
            &["watermarker", "--opacity", "1.5"],
            &["watermarker", "--opacity", "-0.1"],
            &["watermarker", "--font-size", "0"],
            &["watermarker", "--font-size", "-4"],
            &["watermarker", "--font-size", "NaN"],
            &["watermarker", "--color", "red"],
            &["watermarker", "--quality", "300"],
        ] {
            assert!(Args::try_parse_from(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!(parse_color("#ff8000").unwrap(), Rgba([255, 128, 0, 255]));
        assert_eq!(parse_color("0A0b0C").unwrap(), Rgba([10, 11, 12, 255]));
        assert!(parse_color("fff").is_err());
        assert!(parse_color("zzzzzz").is_err());
    }
}
