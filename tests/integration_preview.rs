mod common;

use std::path::Path;
use std::time::Instant;

use common::*;
use hypr_switcher::preview::{Dimensions, PreviewBounds, PreviewResolver};
use hypr_switcher::recency::SortMode;
use hypr_switcher::state::DisplayMode;
use image::{ImageFormat, RgbImage};

fn write_capture(dir: &Path, name: &str, width: u32, height: u32) {
    RgbImage::new(width, height)
        .save_with_format(dir.join(name), ImageFormat::Jpeg)
        .unwrap();
}

#[test]
fn missing_capture_falls_back_to_min_width_and_target_height() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = PreviewResolver::new(dir.path().to_path_buf(), PreviewBounds::default());
    let entry = resolver.resolve("0x123");
    assert!(entry.is_fallback());
    assert_eq!(
        entry.dimensions,
        Dimensions {
            width: 30,
            height: 180
        }
    );
}

#[test]
fn capture_is_measured_from_the_file() {
    let dir = tempfile::tempdir().unwrap();
    write_capture(dir.path(), "123.jpg", 400, 300);
    let resolver = PreviewResolver::new(dir.path().to_path_buf(), PreviewBounds::default());
    let entry = resolver.resolve("0x123");
    assert_eq!(entry.path.as_deref(), Some(dir.path().join("123.jpg").as_path()));
    assert_eq!(
        entry.dimensions,
        Dimensions {
            width: 240,
            height: 180
        }
    );
}

#[test]
fn refreshed_capture_is_picked_up_on_next_resolve() {
    let dir = tempfile::tempdir().unwrap();
    write_capture(dir.path(), "abc.jpg", 400, 300);
    let resolver = PreviewResolver::new(dir.path().to_path_buf(), PreviewBounds::default());
    assert_eq!(resolver.resolve("0xabc").dimensions.width, 240);

    // The capture daemon replaces the file with an ultrawide shot.
    write_capture(dir.path(), "abc.jpg", 1280, 360);
    assert_eq!(
        resolver.resolve("0xabc").dimensions,
        Dimensions {
            width: 320,
            height: 90
        }
    );

    std::fs::remove_file(dir.path().join("abc.jpg")).unwrap();
    assert!(resolver.resolve("0xabc").is_fallback());
}

#[test]
fn truncated_capture_is_measured_from_its_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beef.jpg");
    RgbImage::new(800, 600)
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();
    // Cut the file off partway through the pixel data.
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let resolver = PreviewResolver::new(dir.path().to_path_buf(), PreviewBounds::default());
    let entry = resolver.resolve("0xbeef");
    assert_eq!(entry.path.as_deref(), Some(path.as_path()));
    assert_eq!(
        entry.dimensions,
        Dimensions {
            width: 240,
            height: 180
        }
    );
}

#[test]
fn clamped_width_keeps_aspect_ratio() {
    let bounds = PreviewBounds::default();
    for (w, h) in [(3840u32, 1080u32), (5120, 1440), (10, 400), (1, 1000)] {
        let d = bounds.fit(w, h);
        assert!((30..=320).contains(&d.width), "{w}x{h} -> {d:?}");
        let aspect = w as f64 / h as f64;
        assert_eq!(d.height, (d.width as f64 / aspect).round() as u32, "{w}x{h}");
    }
    assert_eq!(bounds.fit(1920, 1080).height, 180);
}

#[test]
fn preview_frame_tile_widths_follow_captures() {
    let dir = tempfile::tempdir().unwrap();
    write_capture(dir.path(), "a.jpg", 1600, 900);
    let wm = FakeWm::with_windows(&THREE, Some("0xa"));
    let surface = RecordingSurface::default();
    let mut sw = switcher_with(
        &wm,
        &surface,
        dir.path(),
        settings(DisplayMode::Previews, SortMode::Alphabetical),
    );
    let t0 = Instant::now();
    sw.show(t0);
    sw.tick(t0 + SHOW_DELAY);

    let frame = surface.last_frame().unwrap();
    let widths: Vec<u32> = frame.tiles().map(|t| t.width).collect();
    // 16:9 at 180px is 320 wide; the others have no capture.
    assert_eq!(widths, vec![320 + 24, 30 + 24, 30 + 24]);
    let first = frame.tiles().next().unwrap();
    assert!(first.preview.as_ref().unwrap().path.is_some());
    // 320 - 52 reserved = 268px -> (268 - 12) / 6 = 42 chars, "term" fits.
    assert_eq!(first.title, "term");
}
