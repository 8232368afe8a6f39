#![allow(dead_code)]

use cv_anaglyph::prelude::*;

/// Deterministic xorshift noise in [0, 255).
pub fn noise(len: usize, seed: u64) -> Vec<f32> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;

    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 255) as f32
        })
        .collect()
}

/// A noise texture, every block of which is unique.
pub fn texture(width: usize, height: usize, seed: u64) -> FilteredImage {
    FilteredImage::from_vec(width, height, noise(width * height, seed)).unwrap()
}

/// A pair where the right view is the left view moved `shift` pixels to the left, i.e. a point
/// at `x` in the left view sits at `x - shift` in the right view.
pub fn shifted_pair(width: usize, height: usize, shift: usize, seed: u64) -> FilteredPair {
    let wide = texture(width + shift, height, seed);

    let left = FilteredImage::from_fn(width, height, |x, y| wide.get(x, y));
    let right = FilteredImage::from_fn(width, height, |x, y| wide.get(x + shift, y));

    FilteredPair::new(left, right).unwrap()
}

/// Symmetric horizontal search, no vertical search, permissive window estimation.
pub fn config(block_size: usize, max_window: usize) -> SearchConfig {
    SearchConfig {
        block_size,
        max_window,
        vertical_window: 0,
        one_sided_search: false,
        no_vertical_search: true,
        dw_threshold: 0.3,
        dw_extension: 1.0,
        reciprocity_threshold: 0,
        reciprocity_scale_factor: 1
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
