//! # Anaglyph Disparity
//!
//! This crate estimates the disparity between the two views embedded in a red-cyan anaglyph,
//! the first step in recovering a stereo pair from it.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

mod disparity;
mod error;
mod frame;
pub mod anaglyph;
pub mod block_matching;
pub mod config;
pub mod debug;
pub mod preprocess;
pub mod reciprocity;
pub mod refine;
pub mod rematch;
pub mod window;

// -----------------------------------------------------------------------------------------------
// EXPORTS
// -----------------------------------------------------------------------------------------------

pub use crate::error::{Error, Result};

pub mod prelude {
    pub use crate::anaglyph::AnaglyphDisparity;
    pub use crate::config::{PreprocessParams, SearchConfig};
    pub use crate::disparity::{
        DisparityAlgorithm, DisparityMap, ReciprocityMask, Side, StereoDisparity
    };
    pub use crate::frame::{FilteredImage, FilteredPair};
}
