use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use crimetrend_core::{
    BatchConfig, BatchModeler, CleanConfig, Document, HeaderMapping, ModelFamily, analyze_html, clean_table,
    extract_table,
};

fn fixture() -> (String, HeaderMapping) {
    let html = std::fs::read_to_string("../../tests/fixtures/crime_table.html").unwrap();
    let headers = HeaderMapping::from_file("../../tests/fixtures/headers.txt").unwrap();
    (html, headers)
}

fn bench_extract(c: &mut Criterion) {
    let (html, _) = fixture();

    c.bench_function("parse", |b| b.iter(|| Document::parse(black_box(&html))));
    c.bench_function("extract_table", |b| b.iter(|| extract_table(black_box(&html))));
}

fn bench_fit(c: &mut Criterion) {
    let (html, headers) = fixture();
    let raw = extract_table(&html).unwrap();
    let wide = clean_table(&headers.apply(raw).unwrap(), &CleanConfig::default()).unwrap();
    let long = wide.to_long();

    let mut group = c.benchmark_group("fit_all");

    for family in [ModelFamily::Linear, ModelFamily::StandardizedLinear, ModelFamily::CUBIC] {
        let modeler = BatchModeler::new(BatchConfig { family, ..Default::default() });
        group.bench_with_input(BenchmarkId::from_parameter(family), &long, |b, long| {
            b.iter(|| modeler.fit_all(black_box(long)))
        });
    }

    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let (html, headers) = fixture();

    c.bench_function("full_pipeline", |b| b.iter(|| analyze_html(black_box(&html), &headers)));
}

criterion_group!(benches, bench_extract, bench_fit, bench_full_pipeline);
criterion_main!(benches);
