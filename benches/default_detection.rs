use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use encoding_rs::UTF_8;
use schema_detect::config::{DetectionOptions, EnumOptions};
use schema_detect::detector::DetectionService;
use schema_detect::{io_utils, profile};
use tempfile::TempDir;

fn generate_events(rows: usize) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let csv_path = temp_dir.path().join("events.csv");
    let mut file = File::create(&csv_path).expect("create csv");
    writeln!(
        file,
        "event_id,title,description,start_date,venue,address,coordinates,category"
    )
    .expect("header");
    for i in 0..rows {
        let category = match i % 4 {
            0 => "music",
            1 => "market",
            2 => "sports",
            _ => "theatre",
        };
        let day = (i % 28) + 1;
        let lat = 47.0 + (i % 500) as f64 / 100.0;
        let lng = 6.0 + (i % 900) as f64 / 100.0;
        writeln!(
            file,
            "{i},Event number {i},An evening with friends and music in the park near the river,2024-07-{day:02},Hall {hall},{n} Main Street,\"{lat:.4},{lng:.4}\",{category}",
            hall = i % 17,
            n = i % 250,
        )
        .expect("row");
    }
    (temp_dir, csv_path)
}

fn bench_default_detection(c: &mut Criterion) {
    let (temp_dir, csv_path) = generate_events(5_000);
    let table = io_utils::read_table(&csv_path, b',', UTF_8, 0).expect("read table");
    let options = DetectionOptions::default();
    let context = profile::build_context(&table.headers, &table.rows, &options);
    let service = DetectionService::with_default(EnumOptions::default());

    let mut group = c.benchmark_group("default_detection");

    group.bench_function("profile_rows", |b| {
        b.iter_batched(
            || (),
            |_| profile::build_context(&table.headers, &table.rows, &options),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("detect", |b| {
        b.iter(|| service.detect(None, &context));
    });

    drop(temp_dir);
    group.finish();
}

criterion_group!(benches, bench_default_detection);
criterion_main!(benches);
