use criterion::{criterion_group, criterion_main, Criterion};

use lifegrid::calendar::parse_date;
use lifegrid::query::config_from_query;
use lifegrid::{draw_wallpaper, generate_wallpaper, normalize, RawOptions, RecordingSurface};

// Run with:
//    cargo bench

fn bench_life_calendar(c: &mut Criterion) {
    let raw = RawOptions::from_json(r#"{ "dob": "1990-05-01", "years": 90 }"#)
        .expect("options");
    let config = normalize(&raw);
    let now = parse_date("2026-10-18T00:00:00Z").expect("now");

    c.bench_function("draw_life_calendar_recording", |b| {
        b.iter(|| {
            let mut surface = RecordingSurface::new();
            draw_wallpaper(&mut surface, &config, now);
            surface.into_commands().len()
        })
    });

    c.bench_function("generate_life_calendar_png", |b| {
        b.iter(|| generate_wallpaper(&config, now, None).expect("render"))
    });
}

fn bench_phone_endpoint(c: &mut Criterion) {
    let now = parse_date("2026-10-18T00:00:00Z").expect("now");
    let config = config_from_query("style=days&showPercent=1", now);

    c.bench_function("generate_phone_year_png", |b| {
        b.iter(|| generate_wallpaper(&config, now, None).expect("render"))
    });
}

criterion_group!(benches, bench_life_calendar, bench_phone_endpoint);
criterion_main!(benches);
