//! # Block matching
//!
//! Exhaustive windowed correspondence search between the two filtered views. Every block of the
//! regular grid is compared against every candidate block in the other view using the sum of
//! absolute differences (SAD), and the offset of the cheapest candidate becomes the disparity of
//! the whole block.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::ops::RangeInclusive;

use log::{debug, trace};
use rayon::prelude::*;

use crate::config::SearchConfig;
use crate::disparity::DisparityMap;
use crate::error::*;
use crate::frame::{FilteredImage, FilteredPair};

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Top-left pixel of a grid block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockOrigin {
    pub y: usize,
    pub x: usize
}

/// Top-left pixel of the best candidate block, with its cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub y: usize,
    pub x: usize,
    pub cost: f32
}

/// Searches one filtered view for the blocks of the other.
pub struct BlockMatcher<'a> {
    config: &'a SearchConfig,
    pair: &'a FilteredPair
}

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Blocks of the left view are searched for in the right view.
    LeftSeeksRight,

    /// Blocks of the right view are searched for in the left view.
    RightSeeksLeft
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl BlockOrigin {
    pub fn new(y: usize, x: usize) -> Self {
        Self { y, x }
    }
}

impl<'a> BlockMatcher<'a> {
    pub fn new(config: &'a SearchConfig, pair: &'a FilteredPair) -> Self {
        Self { config, pair }
    }

    /// Iterate the block grid in row-major order.
    pub fn grid(&self) -> impl Iterator<Item = BlockOrigin> {
        let bs = self.config.block_size;
        let width = self.pair.width();

        (0..self.pair.height())
            .step_by(bs)
            .flat_map(move |y| (0..width).step_by(bs).map(move |x| BlockOrigin::new(y, x)))
    }

    /// Find the candidate block minimising the SAD against the block at `origin`.
    ///
    /// Candidates are scanned with x in the outer loop and y in the inner loop, both ascending,
    /// and only a strictly lower cost replaces the running best, so the first of several equal
    /// candidates wins. Candidates whose block would leave the image are skipped. Returns `None`
    /// if no candidate fits, or if the origin block itself does not.
    pub fn find(
        &self,
        direction: Direction,
        origin: BlockOrigin,
        horizontal_window: usize
    ) -> Option<Match> {
        if !self.fits(origin.x as isize, origin.y as isize) {
            return None;
        }

        let (source, target) = match direction {
            Direction::LeftSeeksRight => (&self.pair.left, &self.pair.right),
            Direction::RightSeeksLeft => (&self.pair.right, &self.pair.left)
        };

        let mut best: Option<Match> = None;
        let mut best_cost = f32::INFINITY;

        for cx in self.x_range(direction, origin.x, horizontal_window) {
            for cy in self.y_range(origin.y) {
                if !self.fits(cx, cy) {
                    continue;
                }

                let (cx, cy) = (cx as usize, cy as usize);
                let cost = self.sad(source, origin.x, origin.y, target, cx, cy);

                if cost < best_cost {
                    best_cost = cost;
                    best = Some(Match { y: cy, x: cx, cost });
                }
            }
        }

        best
    }

    /// Run `find` for every given origin in parallel.
    ///
    /// The results are returned in the same order as `origins`.
    pub fn find_all(
        &self,
        direction: Direction,
        origins: &[BlockOrigin],
        horizontal_window: usize
    ) -> Vec<(BlockOrigin, Option<Match>)> {
        origins
            .par_iter()
            .map(|&origin| (origin, self.find(direction, origin, horizontal_window)))
            .collect()
    }

    /// Horizontal candidate range for the given direction.
    fn x_range(&self, direction: Direction, x: usize, window: usize) -> RangeInclusive<isize> {
        let x = x as isize;
        let w = window as isize;

        match (direction, self.config.one_sided_search) {
            (Direction::LeftSeeksRight, true) => (x - w)..=(x - 1),
            (Direction::RightSeeksLeft, true) => x..=(x + w),
            (_, false) => (x - w)..=(x + w)
        }
    }

    fn y_range(&self, y: usize) -> RangeInclusive<isize> {
        let y = y as isize;
        let v = self.config.effective_vertical_window() as isize;

        (y - v)..=(y + v)
    }

    /// True if the whole block with top-left corner `(x, y)` lies inside the image.
    fn fits(&self, x: isize, y: isize) -> bool {
        let bs = self.config.block_size as isize;

        x >= 0
            && y >= 0
            && x <= self.pair.width() as isize - bs
            && y <= self.pair.height() as isize - bs
    }

    /// Sum of absolute differences between two blocks anchored at their top-left corners.
    fn sad(
        &self,
        a: &FilteredImage, ax: usize, ay: usize,
        b: &FilteredImage, bx: usize, by: usize
    ) -> f32 {
        let bs = self.config.block_size;
        let mut acc = 0.0f32;

        for j in 0..bs {
            let row_a = &a.row(ay + j)[ax..ax + bs];
            let row_b = &b.row(by + j)[bx..bx + bs];

            acc += row_a
                .iter()
                .zip(row_b)
                .map(|(pa, pb)| (pa - pb).abs())
                .sum::<f32>();
        }

        acc
    }
}

/// Broadcast the disparity of a match over its origin block.
///
/// Writes `found.x - origin.x` into every pixel of the block. A missing match is an error, the
/// map is left untouched in that case.
pub fn write_match(
    map: &mut DisparityMap,
    origin: BlockOrigin,
    found: Option<Match>,
    block_size: usize
) -> Result<()> {
    let found = found.ok_or(Error::NoMatch { y: origin.y, x: origin.x })?;
    let disparity = found.x as i32 - origin.x as i32;

    map.fill_block(origin.x, origin.y, block_size, disparity);

    Ok(())
}

/// Compute the raw left and right disparity maps over the whole grid with `max_window`.
///
/// Blocks without any valid candidate keep a disparity of zero.
pub fn full_correspondences(
    pair: &FilteredPair,
    config: &SearchConfig
) -> Result<(DisparityMap, DisparityMap)> {
    config.validate()?;
    pair.check_block_aligned(config.block_size)?;

    let matcher = BlockMatcher::new(config, pair);
    let origins: Vec<BlockOrigin> = matcher.grid().collect();

    let mut dmap_left = DisparityMap::new(pair.width(), pair.height());
    let mut dmap_right = DisparityMap::new(pair.width(), pair.height());

    for (direction, dmap) in [
        (Direction::LeftSeeksRight, &mut dmap_left),
        (Direction::RightSeeksLeft, &mut dmap_right)
    ] {
        let mut unmatched = 0usize;

        for (origin, found) in matcher.find_all(direction, &origins, config.max_window) {
            if found.is_none() {
                trace!("{:?}: no candidate for block {:?}", direction, origin);
                unmatched += 1;
                continue;
            }

            write_match(dmap, origin, found, config.block_size)?;
        }

        debug!(
            "{:?}: matched {} of {} blocks with window {}",
            direction, origins.len() - unmatched, origins.len(), config.max_window
        );
    }

    Ok((dmap_left, dmap_right))
}
