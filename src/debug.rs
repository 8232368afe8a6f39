//! # Debug output
//!
//! Hooks receiving intermediate disparity fields, kept out of the algorithm itself so that a run
//! never touches the filesystem unless asked to.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use std::path::{Path, PathBuf};

use log::debug;

use crate::disparity::{DisparityMap, Side};
use crate::error::*;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDebug;

/// Writes every received field as a normalised PNG into a directory.
#[derive(Debug, Clone)]
pub struct ImageDirSink {
    dir: PathBuf
}

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

pub trait DebugSink {
    /// Called by the refiner with the gap-filled field of one side, before it is revalidated.
    fn filled_disparity(&mut self, side: Side, filled: &DisparityMap) -> Result<()>;
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl DebugSink for NoDebug {
    fn filled_disparity(&mut self, _side: Side, _filled: &DisparityMap) -> Result<()> {
        Ok(())
    }
}

impl ImageDirSink {
    /// Create the sink, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        std::fs::create_dir_all(dir.as_ref())?;

        Ok(Self {
            dir: dir.as_ref().to_path_buf()
        })
    }

    /// Path the field of the given side is written to.
    pub fn filled_path(&self, side: Side) -> PathBuf {
        self.dir.join(format!("{}_filled_disparity.png", side.name()))
    }
}

impl DebugSink for ImageDirSink {
    fn filled_disparity(&mut self, side: Side, filled: &DisparityMap) -> Result<()> {
        let path = self.filled_path(side);
        debug!("Writing {} filled disparity to {}", side.name(), path.display());

        filled.to_luma_normalised().save(&path)?;

        Ok(())
    }
}
