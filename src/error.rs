//! # Error standards
//!
//! This module provides a standardised error enum and result type for this crate.

// -----------------------------------------------------------------------------------------------
// TYPES
// -----------------------------------------------------------------------------------------------

/// Standard result type used in the anaglyph crate.
pub type Result<T> = std::result::Result<T, Error>;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Image shapes differ: {left:?} (left) vs {right:?} (right)")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize)
    },

    #[error("Buffer holds {actual} values but the image needs {expected}")]
    BufferSize {
        expected: usize,
        actual: usize
    },

    #[error("Block size must be greater than zero")]
    ZeroBlockSize,

    #[error("Image of {width}x{height} is not tiled exactly by blocks of size {block_size}")]
    NotBlockAligned {
        width: usize,
        height: usize,
        block_size: usize
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No valid match for the block at (y: {y}, x: {x})")]
    NoMatch {
        y: usize,
        x: usize
    },

    #[error("Disparity value {value} does not fit in the 8-bit range required for refinement")]
    DisparityOutOfRange {
        value: i32
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Could not parse configuration: {0}")]
    Json(#[from] serde_json::Error)
}
