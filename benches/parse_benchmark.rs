//! Benchmarks for aozorabunko parsing performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks test parsing performance at various document sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::Cursor;

/// Creates a synthetic Aozora Bunko document with the given number of paragraphs.
fn create_test_document(paragraph_count: usize) -> String {
    let mut text = String::from(
        "ベンチマーク\r\n作者不詳\r\n\r\n\
         -------------------------------------------------------\r\n\
         【テキスト中に現れる記号について】\r\n\
         《》：ルビ\r\n\
         ｜：ルビの付く文字列の始まりを特定する記号\r\n\
         -------------------------------------------------------\r\n\r\n",
    );

    for i in 0..paragraph_count {
        text.push_str(&format!(
            "\u{3000}第{}段落。｜下人《げにん》は\t\t雨やみを待っていた［＃「待っていた」に傍点］。ＡＢＣ１２３。\r\n",
            i
        ));
        if i % 10 == 9 {
            text.push_str("［＃改ページ］\r\n\r\n");
        }
    }

    text.push_str(
        "\r\n\r\n\r\n底本：「ベンチマーク全集」出版社\r\n\
         \u{3000}1986（昭和61）年9月24日第1刷発行\r\n\
         入力：テスト\r\n",
    );
    text
}

/// Wraps a document in a single-entry Shift_JIS archive.
fn create_test_archive(document: &str) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));

    let options = SimpleFileOptions::default();
    zip.start_file("bench_ruby.txt", options).unwrap();
    let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode(document);
    zip.write_all(&encoded).unwrap();

    zip.finish().unwrap();
    buffer
}

/// Benchmark full document parsing.
fn bench_document_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_parsing");

    for para_count in [10, 100, 1000, 5000].iter() {
        let document = create_test_document(*para_count);

        group.throughput(Throughput::Bytes(document.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("paragraphs", para_count),
            &document,
            |b, doc| {
                b.iter(|| {
                    let _ = aozorabunko::parse(black_box(doc));
                });
            },
        );
    }

    group.finish();
}

/// Benchmark body cleaning alone.
fn bench_body_cleaning(c: &mut Criterion) {
    let mut group = c.benchmark_group("body_cleaning");

    for para_count in [100, 1000].iter() {
        let document = create_test_document(*para_count);

        group.bench_with_input(
            BenchmarkId::new("clean_body", para_count),
            &document,
            |b, doc| {
                b.iter(|| aozorabunko::parser::clean_body(black_box(doc)));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("strip_noise", para_count),
            &document,
            |b, doc| {
                b.iter(|| aozorabunko::strip_noise(black_box(doc)));
            },
        );
    }

    group.finish();
}

/// Benchmark archive reading and Shift_JIS decoding.
fn bench_archive_reading(c: &mut Criterion) {
    let mut group = c.benchmark_group("archive_reading");

    for para_count in [100, 1000].iter() {
        let data = create_test_archive(&create_test_document(*para_count));

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("paragraphs", para_count),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut archive =
                        aozorabunko::AozoraArchive::from_bytes(black_box(data.clone())).unwrap();
                    let _ = archive.read_text("bench_ruby.txt");
                });
            },
        );
    }

    group.finish();
}

/// Benchmark row emission.
fn bench_emit(c: &mut Criterion) {
    let document = aozorabunko::parse(&create_test_document(1000)).unwrap();

    c.bench_function("emit_1000", |b| {
        b.iter(|| aozorabunko::emit(black_box(&document)));
    });
}

criterion_group!(
    benches,
    bench_document_parsing,
    bench_body_cleaning,
    bench_archive_reading,
    bench_emit,
);
criterion_main!(benches);
