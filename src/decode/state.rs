//! Per-decode scratch state
//!
//! Everything the tile loop mutates lives here, so one decode call owns one
//! state and separate decodes never share anything.

use super::transform::WORKSPACE_LEN;
use crate::common::{Channel, DecodeStats, TILE_AREA};

/// Scratch state for decoding one archive entry
#[derive(Debug, Clone)]
pub struct DecoderState {
    /// Absolute bit position of the next unread code
    pub cursor: u64,
    /// Running DC accumulators for red, green, blue and alpha
    pub dc: [i32; 4],
    /// Coefficients of the block being decoded, raster order
    pub coefficients: [i32; TILE_AREA],
    /// Intermediate rows of the inverse transform, stride 9
    pub workspace: [i32; WORKSPACE_LEN],
    /// Spatial samples of the current tile, one plane per channel
    pub planes: [[i32; TILE_AREA]; 4],
    /// Counters collected so far
    pub stats: DecodeStats,
}

impl DecoderState {
    /// Create a state positioned at the start of the payload
    pub fn new() -> Self {
        Self {
            cursor: 0,
            dc: [0; 4],
            coefficients: [0; TILE_AREA],
            workspace: [0; WORKSPACE_LEN],
            planes: [[0; TILE_AREA]; 4],
            stats: DecodeStats::default(),
        }
    }

    /// Current DC accumulator of a channel
    pub fn dc_of(&self, channel: Channel) -> i32 {
        self.dc[channel.index()]
    }
}

impl Default for DecoderState {
    fn default() -> Self {
        Self::new()
    }
}
