//! # Anaglyph preprocessing
//!
//! Turns a red-cyan anaglyph into the filtered pair consumed by the disparity pipeline: pad to a
//! whole number of blocks, split the two views and take the Laplacian of Gaussian of each, which
//! removes most of the colour difference between the views.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::{imageops, GrayImage, Luma, Rgb, RgbImage};

use crate::config::PreprocessParams;
use crate::error::*;
use crate::frame::{FilteredImage, FilteredPair};

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Weight of the green channel in the right view, blue gets the rest.
const RIGHT_GREEN_WEIGHT: f32 = 0.95;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Pad the bottom and right edges with black up to the next multiple of `block_size`.
pub fn pad_to_block(image: &RgbImage, block_size: usize) -> Result<RgbImage> {
    if block_size == 0 {
        return Err(Error::ZeroBlockSize);
    }

    let round_up = |v: u32| {
        let bs = block_size as u32;
        (v + bs - 1) / bs * bs
    };

    let (width, height) = (round_up(image.width()), round_up(image.height()));

    if (width, height) == image.dimensions() {
        return Ok(image.clone());
    }

    let mut padded = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    imageops::replace(&mut padded, image, 0, 0);

    Ok(padded)
}

/// Split a red-cyan anaglyph into its left (red) and right (cyan) views.
pub fn split_anaglyph(image: &RgbImage) -> (GrayImage, GrayImage) {
    let left = GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y)[0]])
    });

    let right = GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgb([_, g, b]) = *image.get_pixel(x, y);
        let val = g as f32 * RIGHT_GREEN_WEIGHT + b as f32 * (1.0 - RIGHT_GREEN_WEIGHT);
        Luma([val.round().clamp(0.0, 255.0) as u8])
    });

    (left, right)
}

/// Zero-sum Laplacian of Gaussian kernel of side `2 * ceil(3 * sigma) + 1`, row-major.
pub fn log_kernel(sigma: f32) -> (usize, Vec<f32>) {
    let radius = (3.0 * sigma).ceil() as isize;
    let size = (2 * radius + 1) as usize;

    let s2 = sigma * sigma;
    let mut kernel = Vec::with_capacity(size * size);

    for j in -radius..=radius {
        for i in -radius..=radius {
            let r2 = (i * i + j * j) as f32;
            kernel.push(((r2 - 2.0 * s2) / (s2 * s2)) * (-r2 / (2.0 * s2)).exp());
        }
    }

    let mean = kernel.iter().sum::<f32>() / kernel.len() as f32;
    kernel.iter_mut().for_each(|k| *k -= mean);

    (size, kernel)
}

/// Convolve the image with a Laplacian of Gaussian, treating pixels outside as zero.
pub fn laplacian_of_gaussian(image: &GrayImage, sigma: f32) -> FilteredImage {
    let (size, kernel) = log_kernel(sigma);
    let radius = (size / 2) as isize;

    let src = FilteredImage::from_luma(image);
    let (width, height) = (src.width() as isize, src.height() as isize);

    FilteredImage::from_fn(src.width(), src.height(), |x, y| {
        let mut acc = 0.0f32;

        for j in -radius..=radius {
            let sy = y as isize + j;
            if sy < 0 || sy >= height {
                continue;
            }

            for i in -radius..=radius {
                let sx = x as isize + i;
                if sx < 0 || sx >= width {
                    continue;
                }

                // Symmetric kernel, so correlation and convolution agree
                let k = kernel[((j + radius) as usize) * size + (i + radius) as usize];
                acc += k * src.get(sx as usize, sy as usize);
            }
        }

        acc
    })
}

impl FilteredPair {
    /// Pad, split and filter an anaglyph.
    ///
    /// The pair covers the padded image, use `DisparityMap::cropped` to bring results back to
    /// the anaglyph's own size.
    pub fn from_anaglyph(
        anaglyph: &RgbImage,
        params: &PreprocessParams,
        block_size: usize
    ) -> Result<Self> {
        params.validate()?;

        let padded = pad_to_block(anaglyph, block_size)?;
        let (left, right) = split_anaglyph(&padded);

        FilteredPair::new(
            laplacian_of_gaussian(&left, params.sigma),
            laplacian_of_gaussian(&right, params.sigma)
        )
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_is_black_and_keeps_the_source() {
        let image = RgbImage::from_pixel(10, 5, Rgb([200, 100, 50]));

        let padded = pad_to_block(&image, 8).unwrap();

        assert_eq!(padded.dimensions(), (16, 8));
        assert_eq!(*padded.get_pixel(9, 4), Rgb([200, 100, 50]));
        assert_eq!(*padded.get_pixel(0, 0), Rgb([200, 100, 50]));
        assert_eq!(*padded.get_pixel(10, 0), Rgb([0, 0, 0]));
        assert_eq!(*padded.get_pixel(0, 5), Rgb([0, 0, 0]));
        assert_eq!(*padded.get_pixel(15, 7), Rgb([0, 0, 0]));
    }

    #[test]
    fn kernel_is_zero_sum() {
        let (size, kernel) = log_kernel(1.4);

        assert_eq!(size, 11);
        assert_eq!(kernel.len(), 121);
        assert!(kernel.iter().sum::<f32>().abs() < 1e-4);
    }

    #[test]
    fn flat_interior_has_no_response() {
        let image = GrayImage::from_pixel(32, 32, Luma([100]));
        let filtered = laplacian_of_gaussian(&image, 1.0);

        assert!(filtered.get(16, 16).abs() < 1e-2);
    }
}
