//! # General disparity objects
//!
//! This module provides the disparity and reciprocity maps shared by every stage, along with the
//! generic algorithm trait.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::GrayImage;

use crate::error::*;
use crate::frame::FilteredPair;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// An integer disparity map, one signed horizontal offset per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisparityMap {
    data: Vec<i32>,
    width: usize,
    height: usize
}

/// A binary map marking the pixels whose disparity has been cross-confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReciprocityMask {
    data: Vec<u8>,
    width: usize,
    height: usize
}

/// Output of a complete disparity estimation run.
#[derive(Debug, Clone)]
pub struct StereoDisparity {
    /// Final left disparity, zero where `mask_left` is unset.
    pub left: DisparityMap,
    pub right: DisparityMap,
    pub mask_left: ReciprocityMask,
    pub mask_right: ReciprocityMask,

    /// Block matching result before any validation, in matcher sign convention.
    pub raw_left: DisparityMap,
    pub raw_right: DisparityMap,

    /// Search radius used for the rematching pass.
    pub window: usize
}

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right
}

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

pub trait DisparityAlgorithm {
    /// Compute the disparity maps of the given filtered pair.
    fn compute(&mut self, pair: &FilteredPair) -> Result<StereoDisparity>;
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl Side {
    /// Short lowercase name, used for file names and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right"
        }
    }
}

impl DisparityMap {
    pub fn new(width: usize, height: usize) -> Self {
        DisparityMap {
            data: vec![0; width * height],
            width,
            height
        }
    }

    /// Wrap an existing row-major buffer.
    pub fn from_vec(width: usize, height: usize, data: Vec<i32>) -> Result<Self> {
        if data.len() != width * height {
            return Err(Error::BufferSize {
                expected: width * height,
                actual: data.len()
            });
        }

        Ok(Self { data, width, height })
    }

    /// Build a map by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F: FnMut(usize, usize) -> i32>(width: usize, height: usize, mut f: F) -> Self {
        let mut data = Vec::with_capacity(width * height);

        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }

        Self { data, width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// (height, width)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn get(&self, x: usize, y: usize) -> i32 {
        self.data[y * self.width + x]
    }

    pub fn put(&mut self, x: usize, y: usize, val: i32) {
        self.data[y * self.width + x] = val;
    }

    /// All values in row-major order.
    pub fn values(&self) -> &[i32] {
        &self.data
    }

    /// Set every pixel of the square region with top-left corner `(x, y)` to `val`.
    pub fn fill_block(&mut self, x: usize, y: usize, block_size: usize, val: i32) {
        for row in y..(y + block_size).min(self.height) {
            let start = row * self.width + x;
            let end = row * self.width + (x + block_size).min(self.width);
            self.data[start..end].fill(val);
        }
    }

    /// Returns true if every block of the grid holds a single value.
    pub fn is_block_constant(&self, block_size: usize) -> bool {
        (0..self.height).all(|y| {
            (0..self.width).all(|x| {
                let origin_x = x - x % block_size;
                let origin_y = y - y % block_size;
                self.get(x, y) == self.get(origin_x, origin_y)
            })
        })
    }

    /// A copy of the map with every value negated.
    pub fn negated(&self) -> Self {
        Self {
            data: self.data.iter().map(|d| -d).collect(),
            width: self.width,
            height: self.height
        }
    }

    /// Largest disparity magnitude in the map, zero for an empty map.
    pub fn max_abs(&self) -> usize {
        self.data.iter().map(|d| d.unsigned_abs() as usize).max().unwrap_or(0)
    }

    /// The top-left `width x height` region of the map.
    pub fn cropped(&self, width: usize, height: usize) -> Self {
        let width = width.min(self.width);
        let height = height.min(self.height);

        Self::from_fn(width, height, |x, y| self.get(x, y))
    }

    /// Converts the map into a Luma8 image, clamping values into the 0-255 range.
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let val = self.get(x as usize, y as usize).clamp(0, 255);
            image::Luma([val as u8])
        })
    }

    /// Converts the map to a normalised GrayImage.
    ///
    /// Stretches the range between the smallest and largest disparity to 0-255. A constant map is
    /// equivalent to `.to_luma()`.
    pub fn to_luma_normalised(&self) -> GrayImage {
        let min = self.data.iter().copied().min().unwrap_or(0);
        let max = self.data.iter().copied().max().unwrap_or(0);

        if min == max {
            return self.to_luma();
        }

        let mult = 255.0 / (max - min) as f32;

        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let val = (self.get(x as usize, y as usize) - min) as f32 * mult;
            image::Luma([val.round().clamp(0.0, 255.0) as u8])
        })
    }
}

impl ReciprocityMask {
    /// A mask with every pixel marked invalid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0; width * height],
            width,
            height
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    pub fn is_valid(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == 1
    }

    pub fn set(&mut self, x: usize, y: usize, valid: bool) {
        self.data[y * self.width + x] = valid as u8;
    }

    /// Number of valid pixels.
    pub fn count_valid(&self) -> usize {
        self.data.iter().filter(|&&m| m == 1).count()
    }

    pub fn values(&self) -> &[u8] {
        &self.data
    }

    pub fn cropped(&self, width: usize, height: usize) -> Self {
        let width = width.min(self.width);
        let height = height.min(self.height);
        let mut new = Self::new(width, height);

        for y in 0..height {
            for x in 0..width {
                new.set(x, y, self.is_valid(x, y));
            }
        }

        new
    }

    /// Valid pixels white, invalid black.
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Luma([self.get(x as usize, y as usize) * 255])
        })
    }
}
