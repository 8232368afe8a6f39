//! # Search configuration
//!
//! Parameters for the block search, window adaptation and reciprocity stages. There are no
//! defaults: every field must be provided by the caller, either in code or from a JSON file.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::*;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Parameters of the disparity estimation pipeline.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Side length of the square matching blocks.
    pub block_size: usize,

    /// Horizontal search radius of the first matching pass.
    pub max_window: usize,

    /// Vertical search radius, ignored when `no_vertical_search` is set.
    pub vertical_window: usize,

    /// Only search the far side of the origin in each direction.
    pub one_sided_search: bool,

    pub no_vertical_search: bool,

    /// Minimum share of pixels a disparity magnitude must hold to bound the refined window.
    pub dw_threshold: f64,

    /// Multiplicative margin applied to the estimated window.
    pub dw_extension: f64,

    /// Largest difference between cross-checked disparities still considered reciprocal.
    pub reciprocity_threshold: u32,

    /// Disparities are divided by this factor (and rounded) before the reciprocity check.
    pub reciprocity_scale_factor: u32
}

/// Parameters of the Laplacian of Gaussian pre-filter.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct PreprocessParams {
    pub sigma: f32
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl SearchConfig {
    /// Check every parameter against its documented range.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(Error::ZeroBlockSize);
        }

        if !(0.0..=1.0).contains(&self.dw_threshold) {
            return Err(Error::InvalidConfig(format!(
                "dw_threshold must lie in [0, 1], got {}", self.dw_threshold
            )));
        }

        // Also rejects NaN
        if !(self.dw_extension >= 1.0) || !self.dw_extension.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "dw_extension must be a finite value >= 1, got {}", self.dw_extension
            )));
        }

        if self.reciprocity_scale_factor == 0 {
            return Err(Error::InvalidConfig(
                "reciprocity_scale_factor must be at least 1".into()
            ));
        }

        Ok(())
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SearchConfig = serde_json::from_str(json)?;
        config.validate()?;

        Ok(config)
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;

        Self::from_json_str(&json)
    }

    /// Vertical search radius actually used by the matcher.
    pub fn effective_vertical_window(&self) -> usize {
        if self.no_vertical_search {
            0
        }
        else {
            self.vertical_window
        }
    }
}

impl PreprocessParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.sigma > 0.0) || !self.sigma.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "sigma must be a finite value > 0, got {}", self.sigma
            )));
        }

        Ok(())
    }
}
