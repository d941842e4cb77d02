use criterion::{Criterion, criterion_group, criterion_main};
use mdspan_engine::{HtmlOptions, Parser, PosCache, to_html};
mod common;

fn bench_pulldown_cmark_baseline(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);

    let content = common::generate_markdown_content(100);
    group.bench_function("pulldown_cmark", |b| {
        b.iter(|| {
            let parser = pulldown_cmark::Parser::new(std::hint::black_box(&content));
            let events: Vec<_> = parser.collect();
            std::hint::black_box(events);
        });
    });

    group.bench_function("mdspan", |b| {
        b.iter(|| {
            let doc = Parser::new().parse(std::hint::black_box(&content)).unwrap();
            std::hint::black_box(doc);
        });
    });

    group.finish();
}

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");
    group.sample_size(10);

    let content = common::generate_markdown_content(100);
    let doc = Parser::new().parse(&content).unwrap();

    group.bench_function("html", |b| {
        b.iter(|| std::hint::black_box(to_html(&doc, &HtmlOptions::default())));
    });

    group.bench_function("pulldown_cmark_html", |b| {
        b.iter(|| {
            let mut html = String::new();
            pulldown_cmark::html::push_html(&mut html, pulldown_cmark::Parser::new(&content));
            std::hint::black_box(html);
        });
    });

    group.bench_function("poscache", |b| {
        b.iter(|| {
            let mut cache = PosCache::new();
            cache.initialize(&doc);
            std::hint::black_box(cache);
        });
    });

    group.finish();
}

fn bench_nesting(c: &mut Criterion) {
    let mut group = c.benchmark_group("nesting");
    group.sample_size(10);

    let content = common::generate_nested_quotes(200);
    group.bench_function("nested_quotes_200", |b| {
        b.iter(|| std::hint::black_box(Parser::new().parse(&content).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_pulldown_cmark_baseline, bench_rendering, bench_nesting);
criterion_main!(benches);
