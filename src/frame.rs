//! # Filtered frames
//!
//! Floating point images holding the pre-filtered (edge/texture) response of each anaglyph view.
//! These are only used as a matching cost source, never displayed.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::error::*;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// A single channel floating point image stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredImage {
    data: Vec<f32>,
    width: usize,
    height: usize
}

/// The left and right filtered views of one anaglyph, guaranteed to share a shape.
#[derive(Debug, Clone)]
pub struct FilteredPair {
    pub left: FilteredImage,
    pub right: FilteredImage
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl FilteredImage {
    /// Create a zero filled image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0.0; width * height],
            width,
            height
        }
    }

    /// Wrap an existing row-major buffer.
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != width * height {
            return Err(Error::BufferSize {
                expected: width * height,
                actual: data.len()
            });
        }

        Ok(Self { data, width, height })
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F: FnMut(usize, usize) -> f32>(width: usize, height: usize, mut f: F) -> Self {
        let mut data = Vec::with_capacity(width * height);

        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }

        Self { data, width, height }
    }

    /// Convert a luma image into a floating point one, without scaling.
    pub fn from_luma(image: &image::GrayImage) -> Self {
        Self {
            data: image.as_raw().iter().map(|&p| p as f32).collect(),
            width: image.width() as usize,
            height: image.height() as usize
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// (height, width), the same order the maps report their shape in.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    pub fn put(&mut self, x: usize, y: usize, val: f32) {
        self.data[y * self.width + x] = val;
    }

    /// A full row of the image.
    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }
}

impl FilteredPair {
    /// Pair two filtered views, checking that their shapes agree.
    pub fn new(left: FilteredImage, right: FilteredImage) -> Result<Self> {
        if left.shape() != right.shape() {
            return Err(Error::ShapeMismatch {
                left: left.shape(),
                right: right.shape()
            });
        }

        Ok(Self { left, right })
    }

    pub fn width(&self) -> usize {
        self.left.width()
    }

    pub fn height(&self) -> usize {
        self.left.height()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.left.shape()
    }

    /// Check that the pair is tiled exactly by blocks of the given size.
    pub fn check_block_aligned(&self, block_size: usize) -> Result<()> {
        if block_size == 0 {
            return Err(Error::ZeroBlockSize);
        }

        if self.width() % block_size != 0 || self.height() % block_size != 0 {
            return Err(Error::NotBlockAligned {
                width: self.width(),
                height: self.height(),
                block_size
            });
        }

        Ok(())
    }
}
