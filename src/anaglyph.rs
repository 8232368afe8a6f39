//! # Anaglyph disparity
//!
//! Full disparity estimation for the two views of a red-cyan anaglyph: block matching with a
//! large window, window estimation from the disparity histogram, rematching of the blocks outside
//! that window, reciprocity validation and closing-based refinement.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::time::Instant;

use log::{debug, info};

use crate::block_matching::full_correspondences;
use crate::config::SearchConfig;
use crate::debug::{DebugSink, NoDebug};
use crate::disparity::{DisparityAlgorithm, StereoDisparity};
use crate::error::*;
use crate::frame::FilteredPair;
use crate::reciprocity::validate;
use crate::refine::refine;
use crate::rematch::rematch_invalid;
use crate::window::estimate_window;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

pub struct AnaglyphDisparity {
    config: SearchConfig,
    sink: Box<dyn DebugSink>
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl AnaglyphDisparity {
    /// Create a new instance of the algorithm, rejecting invalid parameters.
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            sink: Box::new(NoDebug)
        })
    }

    /// Send intermediate fields to the given sink.
    pub fn with_debug_sink<S: DebugSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

impl DisparityAlgorithm for AnaglyphDisparity {
    /// Compute the disparity maps for the given filtered pair.
    fn compute(&mut self, pair: &FilteredPair) -> Result<StereoDisparity> {
        pair.check_block_aligned(self.config.block_size)?;

        let start = Instant::now();
        info!(
            "Computing disparity for a {}x{} pair with {:?}",
            pair.width(), pair.height(), self.config
        );

        // ---- BLOCK MATCHING ----

        let (raw_left, raw_right) = full_correspondences(pair, &self.config)?;

        // ---- WINDOW ESTIMATION ----

        let window = estimate_window(&raw_left, &raw_right, &self.config);

        // ---- REMATCHING ----

        let mut dmap_left = raw_left.clone();
        let mut dmap_right = raw_right.clone();
        let (left_count, right_count) =
            rematch_invalid(&mut dmap_left, &mut dmap_right, pair, window, &self.config)?;
        debug!("Rematched {} left and {} right blocks", left_count, right_count);

        // ---- RECIPROCITY ----

        // The matcher measures the left map from left to right, the validator expects both maps
        // as left minus right.
        let validated = validate(
            &dmap_left.negated(),
            &dmap_right,
            self.config.reciprocity_scale_factor,
            self.config.reciprocity_threshold
        )?;
        debug!(
            "Reciprocal pixels: {} left, {} right",
            validated.mask_left.count_valid(), validated.mask_right.count_valid()
        );

        // ---- REFINEMENT ----

        let refined = refine(&validated, self.config.reciprocity_threshold, self.sink.as_mut())?;

        info!(
            "Disparity complete in {:?}: {} left, {} right valid pixels",
            start.elapsed(),
            refined.mask_left.count_valid(),
            refined.mask_right.count_valid()
        );

        Ok(StereoDisparity {
            left: refined.left,
            right: refined.right,
            mask_left: refined.mask_left,
            mask_right: refined.mask_right,
            raw_left,
            raw_right,
            window
        })
    }
}
