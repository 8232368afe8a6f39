//! End to end disparity estimation.

mod common;

use std::sync::{Arc, Mutex};

use cv_anaglyph::debug::{DebugSink, ImageDirSink};
use cv_anaglyph::prelude::*;
use cv_anaglyph::Error;
use image::{Rgb, RgbImage};

/// Records which sides were reported.
#[derive(Clone, Default)]
struct Recorder {
    seen: Arc<Mutex<Vec<(Side, (usize, usize))>>>
}

impl DebugSink for Recorder {
    fn filled_disparity(&mut self, side: Side, filled: &DisparityMap) -> cv_anaglyph::Result<()> {
        self.seen.lock().unwrap().push((side, filled.shape()));
        Ok(())
    }
}

#[test]
fn shifted_region_is_recovered_and_reciprocal() {
    common::init_logger();

    let pair = common::shifted_pair(64, 64, 5, 42);
    let config = common::config(16, 8);

    let mut alg = AnaglyphDisparity::new(config).unwrap();
    let result = alg.compute(&pair).unwrap();

    assert_eq!(result.window, 5);

    for y in 0..64 {
        for x in 16..48 {
            assert_eq!(result.raw_left.get(x, y), -5);
            assert_eq!(result.raw_right.get(x, y), 5);

            assert!(result.mask_left.is_valid(x, y), "left invalid at ({}, {})", x, y);
            assert!(result.mask_right.is_valid(x, y), "right invalid at ({}, {})", x, y);
            assert_eq!(result.left.get(x, y), 5);
            assert_eq!(result.right.get(x, y), 5);
        }
    }

    assert_eq!(result.left.shape(), (64, 64));
    assert_eq!(result.mask_right.shape(), (64, 64));
}

/// Flat pair with a textured 32x32 region at (16, 16) in the left view, `shift` pixels further
/// left in the right view.
fn flat_pair_with_region(shift: usize, seed: u64) -> FilteredPair {
    let texture = common::texture(64, 64, seed);
    let region = |x: usize, y: usize| (16..48).contains(&x) && (16..48).contains(&y);

    let left = FilteredImage::from_fn(64, 64, |x, y| {
        if region(x, y) { texture.get(x, y) } else { 0.0 }
    });
    let right = FilteredImage::from_fn(64, 64, |x, y| {
        if region(x + shift, y) { texture.get(x + shift, y) } else { 0.0 }
    });

    FilteredPair::new(left, right).unwrap()
}

#[test]
fn textured_region_on_a_flat_background_is_recovered() {
    common::init_logger();

    let pair = flat_pair_with_region(5, 17);
    let mut alg = AnaglyphDisparity::new(common::config(16, 8)).unwrap();

    let result = alg.compute(&pair).unwrap();

    for y in 16..48 {
        for x in 16..48 {
            assert_eq!(result.raw_left.get(x, y), -5, "raw left at ({}, {})", x, y);
            assert_eq!(result.raw_right.get(x, y), 5, "raw right at ({}, {})", x, y);

            assert!(result.mask_left.is_valid(x, y), "left invalid at ({}, {})", x, y);
            assert!(result.mask_right.is_valid(x, y), "right invalid at ({}, {})", x, y);
            assert_eq!(result.left.get(x, y), 5);
            assert_eq!(result.right.get(x, y), 5);
        }
    }
}

#[test]
fn one_sided_search_recovers_the_shift() {
    let pair = common::shifted_pair(64, 64, 5, 42);
    let mut config = common::config(16, 8);
    config.one_sided_search = true;

    let mut alg = AnaglyphDisparity::new(config).unwrap();
    assert!(alg.config().one_sided_search);

    let result = alg.compute(&pair).unwrap();

    assert_eq!(result.window, 5);

    for y in 0..64 {
        // Left blocks only look left, right blocks only look right
        for x in 0..64 {
            assert_eq!(result.raw_left.get(x, y), if x < 16 { 0 } else { -5 });
            assert_eq!(result.raw_right.get(x, y), if x < 48 { 5 } else { 0 });
        }

        for x in 16..48 {
            assert!(result.mask_left.is_valid(x, y), "left invalid at ({}, {})", x, y);
            assert!(result.mask_right.is_valid(x, y), "right invalid at ({}, {})", x, y);
            assert_eq!(result.left.get(x, y), 5);
            assert_eq!(result.right.get(x, y), 5);
        }
    }
}

#[test]
fn final_fields_are_zero_outside_the_masks() {
    let pair = common::shifted_pair(64, 32, 4, 8);
    let mut alg = AnaglyphDisparity::new(common::config(16, 8)).unwrap();

    let result = alg.compute(&pair).unwrap();

    for y in 0..32 {
        for x in 0..64 {
            if !result.mask_left.is_valid(x, y) {
                assert_eq!(result.left.get(x, y), 0);
            }
            if !result.mask_right.is_valid(x, y) {
                assert_eq!(result.right.get(x, y), 0);
            }
        }
    }
}

#[test]
fn debug_sink_receives_both_filled_fields() {
    let recorder = Recorder::default();
    let seen = recorder.seen.clone();

    let pair = common::shifted_pair(32, 32, 2, 1);
    let mut alg = AnaglyphDisparity::new(common::config(16, 4))
        .unwrap()
        .with_debug_sink(recorder);

    alg.compute(&pair).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(*seen, vec![(Side::Left, (32, 32)), (Side::Right, (32, 32))]);
}

#[test]
fn image_sink_writes_pngs() {
    let dir = std::env::temp_dir().join(format!("cv-anaglyph-sink-{}", std::process::id()));
    let sink = ImageDirSink::new(&dir).unwrap();
    let left_path = sink.filled_path(Side::Left);
    let right_path = sink.filled_path(Side::Right);

    let pair = common::shifted_pair(32, 32, 2, 4);
    let mut alg = AnaglyphDisparity::new(common::config(16, 4))
        .unwrap()
        .with_debug_sink(sink);
    alg.compute(&pair).unwrap();

    let written = image::open(&left_path).unwrap();
    assert_eq!((written.width(), written.height()), (32, 32));
    assert!(right_path.exists());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn invalid_configurations_are_rejected() {
    let mut config = common::config(0, 4);
    assert!(matches!(AnaglyphDisparity::new(config.clone()), Err(Error::ZeroBlockSize)));

    config.block_size = 8;
    config.dw_threshold = 1.5;
    assert!(matches!(AnaglyphDisparity::new(config.clone()), Err(Error::InvalidConfig(_))));

    config.dw_threshold = 0.5;
    config.dw_extension = 0.5;
    assert!(matches!(AnaglyphDisparity::new(config.clone()), Err(Error::InvalidConfig(_))));

    config.dw_extension = 1.0;
    config.reciprocity_scale_factor = 0;
    assert!(matches!(AnaglyphDisparity::new(config), Err(Error::InvalidConfig(_))));
}

#[test]
fn unaligned_pair_is_rejected_at_entry() {
    let pair = common::shifted_pair(40, 32, 2, 4);
    let mut alg = AnaglyphDisparity::new(common::config(16, 4)).unwrap();

    assert!(matches!(alg.compute(&pair), Err(Error::NotBlockAligned { .. })));
}

#[test]
fn config_loads_from_json() {
    let json = r#"{
        "block_size": 16,
        "max_window": 30,
        "vertical_window": 2,
        "one_sided_search": true,
        "no_vertical_search": false,
        "dw_threshold": 0.01,
        "dw_extension": 1.2,
        "reciprocity_threshold": 1,
        "reciprocity_scale_factor": 1
    }"#;

    let config = SearchConfig::from_json_str(json).unwrap();
    assert_eq!(config.max_window, 30);
    assert_eq!(config.effective_vertical_window(), 2);

    let missing = r#"{ "block_size": 16 }"#;
    assert!(matches!(SearchConfig::from_json_str(missing), Err(Error::Json(_))));

    let invalid = json.replace("0.01", "-0.5");
    assert!(matches!(SearchConfig::from_json_str(&invalid), Err(Error::InvalidConfig(_))));
}

#[test]
fn anaglyph_is_padded_to_whole_blocks() {
    let anaglyph = RgbImage::from_fn(70, 50, |x, y| Rgb([(x * 3) as u8, (y * 5) as u8, 40]));
    let params = PreprocessParams { sigma: 1.0 };

    let pair = FilteredPair::from_anaglyph(&anaglyph, &params, 16).unwrap();
    assert_eq!(pair.shape(), (64, 80));
    pair.check_block_aligned(16).unwrap();

    let mut alg = AnaglyphDisparity::new(common::config(16, 4)).unwrap();
    let result = alg.compute(&pair).unwrap();

    let left = result.left.cropped(70, 50);
    let mask = result.mask_left.cropped(70, 50);
    assert_eq!(left.shape(), (50, 70));
    assert_eq!(mask.shape(), (50, 70));
}
