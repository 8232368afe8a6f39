//! # Reciprocity validation
//!
//! Cross-checks the left and right disparity fields pixel by pixel. Both fields are read in the
//! left-minus-right convention: the left pixel `x` corresponds to the right pixel `x - d`, and
//! the right pixel `x` to the left pixel `x + d`. A pixel is kept only if its own disparity and
//! the one found at its correspondent are both positive and agree within a tolerance.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::disparity::{DisparityMap, ReciprocityMask};
use crate::error::*;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Stands in for the cross disparity when the correspondent falls outside the image. Negative,
/// so it always fails the positivity test.
const OUT_OF_BOUNDS: i32 = -10000;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Disparity fields with invalid pixels zeroed, and the masks saying which pixels survived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub left: DisparityMap,
    pub right: DisparityMap,
    pub mask_left: ReciprocityMask,
    pub mask_right: ReciprocityMask
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Validate two disparity fields against each other.
///
/// Both fields are first divided by `scale_factor` and rounded (half to even), the outputs are
/// expressed in that reduced unit.
pub fn validate(
    disp_left: &DisparityMap,
    disp_right: &DisparityMap,
    scale_factor: u32,
    threshold: u32
) -> Result<Validated> {
    if disp_left.shape() != disp_right.shape() {
        return Err(Error::ShapeMismatch {
            left: disp_left.shape(),
            right: disp_right.shape()
        });
    }

    if scale_factor == 0 {
        return Err(Error::InvalidConfig(
            "reciprocity scale factor must be at least 1".into()
        ));
    }

    let left = rescale(disp_left, scale_factor);
    let right = rescale(disp_right, scale_factor);

    let (width, height) = (left.width(), left.height());

    let mut mask_left = ReciprocityMask::new(width, height);
    let mut mask_right = ReciprocityMask::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let d_left = left.get(x, y);
            let cross = cross_lookup(&right, y, x as i64 - d_left as i64);
            mask_left.set(x, y, reciprocal(d_left, cross, threshold));

            let d_right = right.get(x, y);
            let cross = cross_lookup(&left, y, x as i64 + d_right as i64);
            mask_right.set(x, y, reciprocal(d_right, cross, threshold));
        }
    }

    Ok(Validated {
        left: apply_mask(&left, &mask_left),
        right: apply_mask(&right, &mask_right),
        mask_left,
        mask_right
    })
}

/// Disparity of `other` at `(x2, y)`, or the out-of-bounds sentinel.
///
/// Column zero counts as out of bounds.
fn cross_lookup(other: &DisparityMap, y: usize, x2: i64) -> i32 {
    if x2 > 0 && x2 < other.width() as i64 {
        other.get(x2 as usize, y)
    }
    else {
        OUT_OF_BOUNDS
    }
}

fn reciprocal(own: i32, cross: i32, threshold: u32) -> bool {
    own > 0 && cross > 0 && own.abs_diff(cross) <= threshold
}

fn rescale(dmap: &DisparityMap, scale_factor: u32) -> DisparityMap {
    if scale_factor == 1 {
        return dmap.clone();
    }

    let s = scale_factor as f64;

    DisparityMap::from_fn(dmap.width(), dmap.height(), |x, y| {
        (dmap.get(x, y) as f64 / s).round_ties_even() as i32
    })
}

fn apply_mask(dmap: &DisparityMap, mask: &ReciprocityMask) -> DisparityMap {
    DisparityMap::from_fn(dmap.width(), dmap.height(), |x, y| {
        if mask.is_valid(x, y) {
            dmap.get(x, y)
        }
        else {
            0
        }
    })
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
