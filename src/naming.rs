//! Output filename derivation.

/// Split `filename` into base and extension at the last `.`.
///
/// A leading dot (`.hidden`) is part of the base, not an extension separator.
fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => (&filename[..idx], Some(&filename[idx + 1..])),
        _ => (filename, None),
    }
}

fn with_suffix(filename: &str, suffix: &str) -> String {
    match split_extension(filename) {
        (base, Some(ext)) => format!("{base}{suffix}.{ext}"),
        (base, None) => format!("{base}{suffix}"),
    }
}

/// `name.ext` -> `name-with-watermark.ext`
pub fn prepare_output_filename(filename: &str) -> String {
    with_suffix(filename, "-with-watermark")
}

/// `name.ext` -> `name-edited-<option>.ext`
pub fn prepare_edited_filename(filename: &str, option: &str) -> String {
    with_suffix(filename, &format!("-edited-{option}"))
}
