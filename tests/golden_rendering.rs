#![cfg(feature = "raster")]

use std::fs;
use std::path::PathBuf;

use lifegrid::calendar::parse_date;
use lifegrid::{generate_wallpaper, normalize, RawOptions};
use sha2::{Digest, Sha256};

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("tests/goldens/expected");
    p.push(name);
    p
}

/// SHA-256 of the decoded RGBA rows, so the digest pins pixels rather than
/// the PNG encoder's compression choices.
fn pixel_digest(png_data: &[u8]) -> (u32, u32, String) {
    let decoder = png::Decoder::new(png_data);
    let mut reader = decoder.read_info().expect("png header");
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).expect("png frame");
    assert_eq!(info.color_type, png::ColorType::Rgba);
    buf.truncate(info.buffer_size());
    (info.width, info.height, hex::encode(Sha256::digest(&buf)))
}

/// Fixtures use a flat background, square cells without rounding and
/// opaque colors on whole pixels, and no text, so every pixel is exact.
fn check_golden(name: &str, options: &str, now: &str, size: (u32, u32)) {
    let raw = RawOptions::from_json(options).expect("options fixture");
    let now = parse_date(now).expect("now");
    let wallpaper = generate_wallpaper(&normalize(&raw), now, None).expect("render");
    let (width, height, digest) = pixel_digest(&wallpaper.png_data);
    assert_eq!((width, height), size);

    let expected_path = golden_path(name);
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all(expected_path.parent().expect("golden dir")).ok();
        fs::write(&expected_path, format!("{}\n", digest)).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    let expected = fs::read_to_string(&expected_path).unwrap_or_else(|e| {
        panic!(
            "unable to read golden {:?} ({}); run with UPDATE_GOLDENS=1 to create it",
            expected_path, e
        )
    });
    assert_eq!(expected.trim(), digest, "golden {} changed", name);
}

#[test]
fn golden_life_calendar() {
    check_golden(
        "life_calendar.sha256",
        r##"{ "width": 640, "height": 360, "dob": "1990-05-01", "years": 50, "columns": 52,
             "cellSize": 6, "gap": 0, "radius": 0, "dotScale": 1,
             "bg0": "#101418", "bg1": "#101418", "pastColor": "#5cc8ff",
             "currentColor": "#f59e0b", "futureColor": "#2a2f3a",
             "caption": "", "showPercent": false }"##,
        "2026-10-18T00:00:00Z",
        (640, 360),
    );
}

#[test]
fn golden_year_progress_at_2x() {
    check_golden(
        "year_progress_2x.sha256",
        r##"{ "width": 360, "height": 400, "scale": 2, "mode": "custom", "units": 30,
             "currentIndex": 11, "columns": 6, "cellSize": 40, "gap": 4, "radius": 0,
             "dotScale": 0.5, "shape": "square",
             "bg0": "#101418", "bg1": "#101418", "pastColor": "#5cc8ff",
             "currentColor": "#f59e0b", "futureColor": "#2a2f3a",
             "caption": "", "showPercent": false }"##,
        "2026-10-18T00:00:00Z",
        (720, 800),
    );
}
