//! Properties of option normalization over awkward inputs

use lifegrid::{normalize, normalize_with, Mode, RawOptions, RenderConfig, Shape};
use serde_json::{json, Value};

fn raw(value: Value) -> RawOptions {
    RawOptions::from_value(value).expect("object")
}

const NUMERIC_KEYS: &[(&str, f64, f64)] = &[
    ("width", 320.0, 8192.0),
    ("height", 320.0, 8192.0),
    ("scale", 1.0, 4.0),
    ("years", 50.0, 120.0),
    ("columns", 1.0, 400.0),
    ("cellSize", 6.0, 64.0),
    ("gap", 0.0, 24.0),
    ("radius", 0.0, 24.0),
    ("dotScale", 0.3, 1.0),
    ("margin", 0.0, 300.0),
];

fn numeric(cfg: &RenderConfig, key: &str) -> f64 {
    match key {
        "width" => cfg.width as f64,
        "height" => cfg.height as f64,
        "scale" => cfg.scale,
        "years" => cfg.years as f64,
        "columns" => cfg.columns as f64,
        "cellSize" => cfg.cell_size as f64,
        "gap" => cfg.gap as f64,
        "radius" => cfg.radius as f64,
        "dotScale" => cfg.dot_scale,
        "margin" => cfg.margin as f64,
        other => panic!("unknown key {}", other),
    }
}

fn awkward_values() -> Vec<Value> {
    vec![
        json!(-1),
        json!(0),
        json!(-1e300),
        json!(1e300),
        json!(9999),
        json!(2.75),
        json!("abc"),
        json!("12px"),
        json!(""),
        json!("Infinity"),
        json!(true),
        json!([1, 2]),
        json!({ "n": 1 }),
        Value::Null,
    ]
}

#[test]
fn every_numeric_field_lands_in_range() {
    for profile in [RenderConfig::default(), RenderConfig::api()] {
        for (key, lo, hi) in NUMERIC_KEYS {
            for v in awkward_values() {
                let mut doc = serde_json::Map::new();
                doc.insert(key.to_string(), v.clone());
                let cfg = normalize_with(&raw(Value::Object(doc)), &profile);
                let n = numeric(&cfg, key);
                assert!(
                    n >= *lo && n <= *hi,
                    "{} = {:?} normalized to {} outside [{}, {}]",
                    key,
                    v,
                    n,
                    lo,
                    hi
                );
            }
        }
    }
}

#[test]
fn documented_clamp_examples() {
    assert_eq!(normalize(&raw(json!({ "cellSize": 9999 }))).cell_size, 64);
    assert_eq!(normalize(&raw(json!({ "cellSize": "abc" }))).cell_size, 6);
    assert_eq!(normalize(&raw(json!({ "dotScale": 0 }))).dot_scale, 1.0);
    assert_eq!(normalize(&raw(json!({ "scale": "2.5" }))).scale, 2.5);
}

#[test]
fn normalization_is_idempotent() {
    let inputs = vec![
        json!({}),
        json!({ "mode": "custom", "units": 7, "currentIndex": 3 }),
        json!({ "mode": "custom", "units": -4, "currentIndex": 99 }),
        json!({ "mode": "custom", "units": 10, "currentIndex": 25 }),
        json!({ "dob": "1990-05-01", "years": 200, "shape": "circle" }),
        json!({ "dob": "garbage", "captionWeight": 1000, "bg0": "nope" }),
        json!({ "width": "4000.9", "scale": 3.3, "dotScale": 0.42 }),
        json!({ "futureColor": "rgba(1, 2, 3, 0.5)", "captionItalic": "yes" }),
        json!({ "dob": "+10000-01-01" }),
        json!({ "dob": 1990, "customText": 0 }),
    ];
    for profile in [RenderConfig::default(), RenderConfig::api()] {
        for input in &inputs {
            let once = normalize_with(&raw(input.clone()), &profile);
            let twice = normalize_with(&once.to_raw(), &profile);
            assert_eq!(once, twice, "input {}", input);
        }
    }
}

#[test]
fn mode_and_shape_fall_back_without_error() {
    let cfg = normalize(&raw(json!({ "mode": "CUSTOM", "shape": "Circle" })));
    assert_eq!(cfg.mode, Mode::Life);
    assert_eq!(cfg.shape, Shape::Square);
}

#[test]
fn custom_units_are_bounded() {
    let cfg = normalize(&raw(json!({ "mode": "custom", "units": 1e12 })));
    assert_eq!(cfg.units, Some(lifegrid::options::MAX_UNITS as u32));
    // textual units are not numbers
    let cfg = normalize(&raw(json!({ "mode": "custom", "units": "12" })));
    assert_eq!(cfg.units, None);
}

#[test]
fn file_values_are_overridden_by_later_layers() {
    let file = RawOptions::from_json(r#"{ "width": 800, "caption": "file" }"#).unwrap();
    let flags = raw(json!({ "caption": "flag" }));
    let cfg = normalize(&file.merge(flags));
    assert_eq!(cfg.width, 800);
    assert_eq!(cfg.caption, "flag");
}

#[test]
fn non_object_documents_are_config_errors() {
    for text in ["[]", "42", "\"x\"", "null"] {
        let err = RawOptions::from_json(text).unwrap_err();
        assert!(matches!(err, lifegrid::Error::ConfigError(_)), "{}", text);
    }
    assert!(RawOptions::from_json("{ nope").is_err());
}
