// benches/decode_bench.rs
//! Benchmarks for response decoding and Markdown rendering.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use notion_api::formatting::render_blocks;
use notion_api::{Block, Page, PaginatedResponse};

const BLOCK_CHILDREN: &str = include_str!("../tests/fixtures/api_responses/block_children.json");
const PAGE: &str = include_str!("../tests/fixtures/api_responses/page_with_properties.json");

/// Builds a block list of `copies` times the fixture page, minus unsupported kinds.
fn renderable_blocks(copies: usize) -> Vec<Block> {
    let page: PaginatedResponse<Block> =
        serde_json::from_str(BLOCK_CHILDREN).expect("fixture decodes");
    let supported: Vec<Block> = page
        .results
        .into_iter()
        .filter(|b| !b.is_unsupported())
        .collect();
    supported.iter().cycle().take(supported.len() * copies).cloned().collect()
}

fn bench_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    group.bench_function("block_children", |b| {
        b.iter(|| {
            let page: PaginatedResponse<Block> =
                serde_json::from_str(black_box(BLOCK_CHILDREN)).unwrap();
            black_box(page)
        })
    });

    group.bench_function("page_with_properties", |b| {
        b.iter(|| {
            let page: Page = serde_json::from_str(black_box(PAGE)).unwrap();
            black_box(page)
        })
    });

    group.finish();
}

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_markdown");

    for copies in [1, 25, 250] {
        let blocks = renderable_blocks(copies);
        group.bench_with_input(BenchmarkId::from_parameter(blocks.len()), &blocks, |b, blocks| {
            b.iter(|| render_blocks(black_box(blocks)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decoding, bench_rendering);
criterion_main!(benches);
