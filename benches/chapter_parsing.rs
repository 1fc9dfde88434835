use chaptergen::chapters::{
    decode_candidates, format_timestamp, parse_chapter_text, parse_timestamp, validate_completion,
    validate_titles,
};
use chaptergen::ValidationProfile;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const COMPLETION: &str = "Here are the chapters:\n\
    00:00 - Introduction to Node\n\
    05:00 - Server Setup Basics\n\
    15:00 - Database Integration Steps\n\
    25:00 - Routing With Express\n\
    35:00 - Authentication and Sessions\n\
    45:00 - Testing The API\n\
    52:30 - Deploying To Production\n";

fn bench_timestamps(c: &mut Criterion) {
    c.bench_function("timestamp_parse", |b| {
        b.iter(|| {
            black_box(parse_timestamp(black_box("52:30")).ok());
            black_box(parse_timestamp(black_box("5:xx")).ok());
        })
    });

    c.bench_function("timestamp_format", |b| {
        b.iter(|| black_box(format_timestamp(black_box(3150))))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    c.bench_function("parse_chapter_text", |b| {
        b.iter(|| black_box(parse_chapter_text(black_box(COMPLETION)).ok()))
    });

    let chapters = parse_chapter_text(COMPLETION)
        .and_then(|candidates| decode_candidates(&candidates))
        .unwrap();
    c.bench_function("validate_titles", |b| {
        b.iter(|| black_box(validate_titles(black_box(&chapters)).is_ok()))
    });

    let strict = ValidationProfile::strict();
    c.bench_function("validate_completion_strict", |b| {
        b.iter(|| black_box(validate_completion(black_box(COMPLETION), 3600, &strict).ok()))
    });
}

criterion_group!(benches, bench_timestamps, bench_pipeline);
criterion_main!(benches);
