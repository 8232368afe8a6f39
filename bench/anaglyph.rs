use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cv_anaglyph::block_matching::full_correspondences;
use cv_anaglyph::prelude::*;

/// Textured pair with the right view shifted by `shift` pixels.
fn synthetic_pair(width: usize, height: usize, shift: usize) -> FilteredPair {
    let texture = |x: usize, y: usize| ((x * 7919 + y * 104_729) % 251) as f32;

    let left = FilteredImage::from_fn(width, height, |x, y| texture(x, y));
    let right = FilteredImage::from_fn(width, height, |x, y| texture(x + shift, y));

    FilteredPair::new(left, right).unwrap()
}

fn anaglyph_bench(c: &mut Criterion) {
    let _ = env_logger::builder().is_test(true).try_init();

    // Build frame
    let pair = synthetic_pair(128, 128, 6);

    // Build disparity alg
    let config = SearchConfig {
        block_size: 8,
        max_window: 16,
        vertical_window: 1,
        one_sided_search: false,
        no_vertical_search: false,
        dw_threshold: 0.05,
        dw_extension: 1.2,
        reciprocity_threshold: 1,
        reciprocity_scale_factor: 1
    };
    let mut disp = AnaglyphDisparity::new(config.clone()).unwrap();

    c.bench_function("block matching 128x128", |b| {
        b.iter(|| full_correspondences(black_box(&pair), &config))
    });
    c.bench_function("full pipeline 128x128", |b| b.iter(|| disp.compute(black_box(&pair))));
}

criterion_group!(benches, anaglyph_bench);
criterion_main!(benches);
