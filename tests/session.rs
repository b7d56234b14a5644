use image::{DynamicImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use watermarker::image_io::{open_image, save_image};
use watermarker::{
    EditRequest, ScriptedSession, Session, SessionReport, WatermarkRequest, Workspace,
    FAILURE_MESSAGE,
};

fn write_fixture(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 4]) {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)));
    save_image(&img, &dir.join(name), 100).unwrap();
}

/// Image directory with a white 100x100 `test.jpg`/`test.png` and a red
/// 50x50 `logo.png`.
fn fixture_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "test.jpg", 100, 100, [255, 255, 255, 255]);
    write_fixture(dir.path(), "test.png", 100, 100, [255, 255, 255, 255]);
    write_fixture(dir.path(), "logo.png", 50, 50, [255, 0, 0, 255]);
    dir
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Run sessions over `script` until it declines or runs out; return what was printed.
fn run_script(workspace: &Workspace, script: &str) -> String {
    let mut session = Session::new(workspace, Cursor::new(script.as_bytes().to_vec()), Vec::new());
    session.run().unwrap();
    String::from_utf8(session.prompt().output().clone()).unwrap()
}

#[test]
fn declining_leaves_filesystem_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(dir.path()).unwrap();

    let printed = run_script(&workspace, "n\n");

    assert!(printed.contains("Welcome to \"Watermark manager\""));
    assert!(!printed.contains("What file"));
    assert!(file_names(dir.path()).is_empty());
}

#[test]
fn text_watermark_writes_changed_copy() {
    let dir = fixture_dir();
    let workspace = Workspace::new(dir.path()).unwrap();

    let printed = run_script(&workspace, "y\ntest.jpg\nn\n1\nHELLO\nn\n");

    assert!(printed.contains("Text watermark was added successfully!"));
    let output = dir.path().join("test-with-watermark.jpg");
    assert!(output.is_file());

    let original = open_image(&dir.path().join("test.jpg")).unwrap().to_rgb8();
    let marked = open_image(&output).unwrap().to_rgb8();
    assert_eq!(original.dimensions(), marked.dimensions());
    assert_ne!(original, marked);
}

#[test]
fn image_watermark_is_centred_at_half_opacity() {
    let dir = fixture_dir();
    let workspace = Workspace::new(dir.path()).unwrap();

    // Empty watermark name falls back to logo.png.
    let printed = run_script(&workspace, "y\ntest.png\nn\n2\n\nn\n");
    assert!(printed.contains("Image watermark was added successfully!"));

    let marked = open_image(&dir.path().join("test-with-watermark.png")).unwrap().to_rgba8();
    assert_eq!(marked.get_pixel(25, 25).0, [255, 128, 128, 255]);
    assert_eq!(marked.get_pixel(74, 74).0, [255, 128, 128, 255]);
    assert_eq!(marked.get_pixel(24, 24).0, [255, 255, 255, 255]);
    assert_eq!(marked.get_pixel(75, 75).0, [255, 255, 255, 255]);
}

#[test]
fn missing_input_reports_failure_without_output() {
    let dir = fixture_dir();
    let workspace = Workspace::new(dir.path()).unwrap();
    let before = file_names(dir.path());

    let printed = run_script(&workspace, "y\nghost.jpg\nn\n1\nHELLO\nn\n");

    assert!(printed.contains(FAILURE_MESSAGE));
    assert!(!printed.contains("successfully"));
    assert_eq!(file_names(dir.path()), before);
}

#[test]
fn missing_watermark_image_reports_failure() {
    let dir = fixture_dir();
    let workspace = Workspace::new(dir.path()).unwrap();

    let printed = run_script(&workspace, "y\ntest.png\nn\n2\nbrand.png\nn\n");

    assert!(printed.contains(FAILURE_MESSAGE));
    assert!(!dir.path().join("test-with-watermark.png").exists());
}

#[test]
fn brighten_then_watermark() {
    let dir = fixture_dir();
    write_fixture(dir.path(), "grey.png", 10, 10, [100, 100, 100, 255]);
    let workspace = Workspace::new(dir.path()).unwrap();

    let printed = run_script(&workspace, "y\ngrey.png\ny\n1\n1\n1\nHI\nn\n");

    assert!(printed.contains("Choose value from (decrease brightness) -1 to 1"));
    assert!(printed.contains("Image brightness was changed successfully!"));
    assert!(printed.contains("Text watermark was added successfully!"));

    let edited = open_image(&dir.path().join("grey-edited-Make image brighter.png"))
        .unwrap()
        .to_rgba8();
    assert!(edited.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    assert!(dir.path().join("grey-with-watermark.png").is_file());
}

#[test]
fn failed_edit_still_runs_watermark() {
    let dir = fixture_dir();
    let workspace = Workspace::new(dir.path()).unwrap();

    let printed = run_script(&workspace, "y\ntest.png\ny\n2\n1\nlots\nHI\nn\n");

    assert_eq!(printed.matches(FAILURE_MESSAGE).count(), 1);
    assert!(printed.contains("Text watermark was added successfully!"));
    assert!(!dir.path().join("test-edited-Increase contrast.png").exists());
}

#[test]
fn invert_rotate_swaps_dimensions() {
    let dir = fixture_dir();
    write_fixture(dir.path(), "wide.png", 40, 20, [0, 0, 255, 255]);
    let workspace = Workspace::new(dir.path()).unwrap();

    let printed = run_script(&workspace, "y\nwide.png\ny\n4\n1\nrotate\n90\nHI\nn\n");

    assert!(printed.contains("Image was inverted successfully!"));
    let rotated = open_image(&dir.path().join("wide-edited-Invert image.png")).unwrap();
    assert_eq!((rotated.width(), rotated.height()), (20, 40));
}

#[test]
fn session_loops_until_input_ends() {
    let dir = fixture_dir();
    let workspace = Workspace::new(dir.path()).unwrap();

    let script = "y\ntest.png\nn\n1\nONE\ny\ntest.jpg\nn\n1\nTWO\n";
    let printed = run_script(&workspace, script);

    assert_eq!(printed.matches("Welcome to").count(), 3);
    assert_eq!(printed.matches("Text watermark was added successfully!").count(), 2);
    assert!(dir.path().join("test-with-watermark.png").is_file());
    assert!(dir.path().join("test-with-watermark.jpg").is_file());
}

#[test]
fn undecodable_filename_reports_failure_and_returns_to_gate() {
    let dir = fixture_dir();
    let workspace = Workspace::new(dir.path()).unwrap();
    let before = file_names(dir.path());

    let script = b"y\n\xff\xfe.jpg\nn\n".to_vec();
    let mut session = Session::new(&workspace, Cursor::new(script), Vec::new());
    session.run().unwrap();
    let printed = String::from_utf8(session.prompt().output().clone()).unwrap();

    assert_eq!(printed.matches(FAILURE_MESSAGE).count(), 1);
    assert_eq!(printed.matches("Welcome to").count(), 2);
    assert_eq!(file_names(dir.path()), before);
}

#[test]
fn undecodable_filename_then_good_session() {
    let dir = fixture_dir();
    let workspace = Workspace::new(dir.path()).unwrap();

    let script = b"y\n\xff.png\ny\ntest.png\nn\n1\nHI\nn\n".to_vec();
    let mut session = Session::new(&workspace, Cursor::new(script), Vec::new());
    session.run().unwrap();
    let printed = String::from_utf8(session.prompt().output().clone()).unwrap();

    assert!(printed.contains(FAILURE_MESSAGE));
    assert!(printed.contains("Text watermark was added successfully!"));
    assert!(dir.path().join("test-with-watermark.png").is_file());
}

#[test]
fn rotate_by_odd_angle_keeps_whole_image() {
    let dir = fixture_dir();
    write_fixture(dir.path(), "wide.png", 20, 10, [255, 0, 0, 255]);
    let workspace = Workspace::new(dir.path()).unwrap();

    let printed = run_script(&workspace, "y\nwide.png\ny\n4\n1\nrotate\n45\nHI\nn\n");

    assert!(printed.contains("Image was inverted successfully!"));
    let rotated = open_image(&dir.path().join("wide-edited-Invert image.png")).unwrap();
    assert_eq!((rotated.width(), rotated.height()), (22, 22));
}

#[test]
fn grayscale_twice_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let colourful = RgbaImage::from_fn(30, 30, |x, y| Rgba([(x * 8) as u8, (y * 8) as u8, 90, 255]));
    save_image(&DynamicImage::ImageRgba8(colourful), &dir.path().join("c.png"), 100).unwrap();
    let workspace = Workspace::new(dir.path()).unwrap();

    let once = workspace.apply_edit("c.png", &EditRequest::Grayscale).unwrap();
    let once_name = once.file_name().unwrap().to_string_lossy().into_owned();
    let twice = workspace.apply_edit(&once_name, &EditRequest::Grayscale).unwrap();

    assert_eq!(twice, dir.path().join("c-edited-Make image b&w-edited-Make image b&w.png"));
    let a = open_image(&once).unwrap().to_rgba8();
    let b = open_image(&twice).unwrap().to_rgba8();
    assert_eq!(a, b);
}

#[test]
fn scripted_session_runs_both_steps() {
    let dir = fixture_dir();
    let workspace = Workspace::new(dir.path()).unwrap();
    let answers = dir.path().join("answers.json");
    std::fs::write(
        &answers,
        r#"{
            "inputImage": "test.png",
            "edit": { "invert": { "flip": "horizontal" } },
            "watermark": { "image": { "file": "logo.png" } }
        }"#,
    )
    .unwrap();

    let script = ScriptedSession::from_file(&answers).unwrap();
    assert_eq!(script.watermark, WatermarkRequest::Image { file: "logo.png".into() });

    let mut out = Vec::new();
    let report = script.run(&workspace, &mut out).unwrap();

    assert_eq!(
        report,
        SessionReport {
            edited: Some(dir.path().join("test-edited-Invert image.png")),
            watermarked: Some(dir.path().join("test-with-watermark.png")),
        }
    );
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Image was inverted successfully!"));
    assert!(printed.contains("Image watermark was added successfully!"));
}

#[test]
fn scripted_session_rejects_out_of_range_edit() {
    let dir = fixture_dir();
    let workspace = Workspace::new(dir.path()).unwrap();
    let script = ScriptedSession {
        input_image: "test.png".into(),
        edit: Some(EditRequest::Brighten { value: 4.0 }),
        watermark: WatermarkRequest::Text { text: "HELLO".into() },
    };

    let mut out = Vec::new();
    let report = script.run(&workspace, &mut out).unwrap();

    assert_eq!(report.edited, None);
    assert!(report.watermarked.is_some());
    assert!(String::from_utf8(out).unwrap().contains(FAILURE_MESSAGE));
}
