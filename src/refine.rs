//! # Refinement
//!
//! Fills the gaps left by reciprocity validation with a morphological closing of the validated
//! field, then validates the filled fields again so a filled pixel only survives if it is also
//! reciprocal.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::{GrayImage, Luma};
use imageproc::morphology::{grayscale_close, Mask};

use crate::debug::DebugSink;
use crate::disparity::{DisparityMap, ReciprocityMask, Side};
use crate::error::*;
use crate::reciprocity::{validate, Validated};

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Side length of the elliptical structuring element used for closing.
pub const CLOSING_KERNEL_SIZE: u32 = 35;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Fill and revalidate a pair of validated fields.
///
/// Pixels whose mask is set keep their validated value, the others take the value of the closed
/// field. The filled fields are handed to `sink` and then checked for reciprocity again with no
/// rescaling.
pub fn refine(
    validated: &Validated,
    threshold: u32,
    sink: &mut dyn DebugSink
) -> Result<Validated> {
    let kernel = ellipse_mask(CLOSING_KERNEL_SIZE);

    let left = fill(&validated.left, &validated.mask_left, &kernel)?;
    let right = fill(&validated.right, &validated.mask_right, &kernel)?;

    sink.filled_disparity(Side::Left, &left)?;
    sink.filled_disparity(Side::Right, &right)?;

    validate(&left, &right, 1, threshold)
}

/// Substitute the closed field wherever the mask is unset.
fn fill(valid: &DisparityMap, mask: &ReciprocityMask, kernel: &Mask) -> Result<DisparityMap> {
    let closed = grayscale_close(&to_gray(valid)?, kernel);

    Ok(DisparityMap::from_fn(valid.width(), valid.height(), |x, y| {
        if mask.is_valid(x, y) {
            valid.get(x, y)
        }
        else {
            closed.get_pixel(x as u32, y as u32)[0] as i32
        }
    }))
}

/// Convert a field to 8 bits, failing on any value outside 0-255.
fn to_gray(dmap: &DisparityMap) -> Result<GrayImage> {
    if let Some(&value) = dmap.values().iter().find(|&&d| !(0..=255).contains(&d)) {
        return Err(Error::DisparityOutOfRange { value });
    }

    Ok(GrayImage::from_fn(dmap.width() as u32, dmap.height() as u32, |x, y| {
        Luma([dmap.get(x as usize, y as usize) as u8])
    }))
}

/// Ellipse inscribed in a `size x size` square, rasterised row by row.
fn ellipse_image(size: u32) -> GrayImage {
    let r = (size / 2) as i64;
    let c = r as f64;
    let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };

    let mut image = GrayImage::new(size, size);

    for row in 0..size {
        let dy = row as i64 - r;
        if dy.abs() > r {
            continue;
        }

        let dx = (c * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round_ties_even() as i64;
        let start = (r - dx).max(0);
        let end = (r + dx + 1).min(size as i64);

        for col in start..end {
            image.put_pixel(col as u32, row, Luma([255]));
        }
    }

    image
}

fn ellipse_mask(size: u32) -> Mask {
    let centre = (size / 2) as u8;

    Mask::from_image(&ellipse_image(size), centre, centre)
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
