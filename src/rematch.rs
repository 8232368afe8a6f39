//! # Rematching
//!
//! Second block matching pass restricted to the estimated window, run only over the blocks
//! whose first-pass disparity fell outside that window.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use log::debug;

use crate::block_matching::{write_match, BlockMatcher, BlockOrigin, Direction};
use crate::config::SearchConfig;
use crate::disparity::DisparityMap;
use crate::error::*;
use crate::frame::FilteredPair;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Block origins of `dmap` whose disparity magnitude exceeds `window`.
pub fn blocks_outside_window(
    dmap: &DisparityMap,
    block_size: usize,
    window: usize
) -> Vec<BlockOrigin> {
    (0..dmap.height())
        .step_by(block_size)
        .flat_map(|y| (0..dmap.width()).step_by(block_size).map(move |x| BlockOrigin::new(y, x)))
        .filter(|o| dmap.get(o.x, o.y).unsigned_abs() as usize > window)
        .collect()
}

/// Rematch the out-of-window blocks of both maps with the tightened `window`.
///
/// The left and right maps are processed independently. A block for which the tightened search
/// finds no candidate keeps its first-pass value. Returns the number of rewritten blocks per side.
pub fn rematch_invalid(
    dmap_left: &mut DisparityMap,
    dmap_right: &mut DisparityMap,
    pair: &FilteredPair,
    window: usize,
    config: &SearchConfig
) -> Result<(usize, usize)> {
    pair.check_block_aligned(config.block_size)?;

    let matcher = BlockMatcher::new(config, pair);

    let left = rematch_side(&matcher, Direction::LeftSeeksRight, dmap_left, window, config)?;
    let right = rematch_side(&matcher, Direction::RightSeeksLeft, dmap_right, window, config)?;

    Ok((left, right))
}

fn rematch_side(
    matcher: &BlockMatcher,
    direction: Direction,
    dmap: &mut DisparityMap,
    window: usize,
    config: &SearchConfig
) -> Result<usize> {
    let invalid = blocks_outside_window(dmap, config.block_size, window);
    let mut rewritten = 0;

    for (origin, found) in matcher.find_all(direction, &invalid, window) {
        if found.is_some() {
            write_match(dmap, origin, found, config.block_size)?;
            rewritten += 1;
        }
    }

    debug!(
        "{:?}: {} blocks outside window {}, {} rematched",
        direction, invalid.len(), window, rewritten
    );

    Ok(rewritten)
}
