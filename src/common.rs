//! Common types and constants for the texture archive and its codec
//!
//! This module defines the error type, the channel identifiers and the
//! fixed sizes shared by the container parser and the image decoder.

use thiserror::Error;

/// Color channel of a tile, in bitstream order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Luma-like plane (stored first)
    Red = 0,
    /// Cr-like plane
    Green = 1,
    /// Cb-like plane
    Blue = 2,
    /// Independent alpha plane, only present when the header says so
    Alpha = 3,
}

impl Channel {
    /// Channels decoded for every tile of an opaque texture
    pub const OPAQUE: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Channels decoded for every tile of a texture with alpha
    pub const WITH_ALPHA: [Channel; 4] =
        [Channel::Red, Channel::Green, Channel::Blue, Channel::Alpha];

    /// Channel sequence for a texture, depending on its alpha flag
    pub fn sequence(has_alpha: bool) -> &'static [Channel] {
        if has_alpha {
            &Self::WITH_ALPHA
        } else {
            &Self::OPAQUE
        }
    }

    /// Index of this channel into per-channel arrays
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Error type for archive and decode operations
#[derive(Debug, Error)]
pub enum TexPakError {
    /// Structural problem in the directory or data file
    #[error("Invalid archive format: {0}")]
    Format(String),

    /// Requested entry is not in the directory
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Raster size does not fit in memory addressing
    #[error("Texture dimensions too large: {width}x{height}")]
    DimensionsTooLarge {
        /// Declared width in pixels
        width: u32,
        /// Declared height in pixels
        height: u32,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for archive and decode operations
pub type Result<T> = std::result::Result<T, TexPakError>;

/// Edge length of a tile in pixels
pub const TILE_SIZE: usize = 8;

/// Number of samples in one tile
pub const TILE_AREA: usize = TILE_SIZE * TILE_SIZE;

/// Fractional bits of the fixed-point sample format
pub const FIXED_SHIFT: u32 = 16;

/// Bytes per output pixel (RGBA8888)
pub const BYTES_PER_PIXEL: usize = 4;

/// Length of the fixed directory header (magic, declared size, count)
pub const DIRECTORY_HEADER_SIZE: usize = 12;

/// Length of a data file entry header
pub const ENTRY_HEADER_SIZE: u64 = 20;

/// Amount the declared entry size exceeds the payload length
pub const DECLARED_SIZE_BIAS: u32 = 8;

/// Flag bit marking an entry with an alpha plane
pub const FLAG_ALPHA: u32 = 1 << 7;

/// Counters collected while decoding one entry
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStats {
    /// Tiles visited, including partial edge tiles
    pub tiles: usize,
    /// Channel blocks short-circuited by the flat fill code
    pub flat_blocks: usize,
    /// Channel blocks decoded through the coefficient tables
    pub coded_blocks: usize,
    /// Escape sequences read while decoding coefficients
    pub escape_codes: usize,
    /// Final bit cursor position
    pub bits_consumed: u64,
    /// Bits read beyond the end of the payload (zero-filled)
    pub overrun_bits: u64,
}
