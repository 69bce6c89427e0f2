//! Texture decoding
//!
//! Turns an entry's entropy-coded payload into an RGBA8888 raster. The
//! payload is walked tile by tile, left to right and top to bottom; each
//! tile holds one block per channel (red, green, blue, then alpha when the
//! header has it) and every block reads on from where the previous one
//! stopped.

mod color;
mod decoder;
mod reader;
mod state;
mod transform;

pub use color::{clamp_channel, ycc_to_rgb, OPAQUE};
pub use decoder::extend_dc;
pub use reader::{words_from_le_bytes, BitReader};
pub use state::DecoderState;
pub use transform::{inverse_transform, WORKSPACE_LEN, WORKSPACE_STRIDE};

use crate::archive::TextureHeader;
use crate::common::{Channel, DecodeStats, TexPakError, BYTES_PER_PIXEL, TILE_SIZE};
use crate::Result;

/// Width of the fill mode selector following the DC delta
pub const FILL_MODE_BITS: u32 = 2;

/// Fill mode selecting a flat block
pub const FILL_FLAT: u32 = 2;

/// How a channel block was coded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Every sample equals the DC accumulator
    Flat,
    /// Coefficients decoded through the control table
    Coded,
}

/// Decoded RGBA8888 image, row-major without padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Allocate a zeroed raster
    ///
    /// Fails with [`TexPakError::DimensionsTooLarge`] when the size overflows
    /// or the allocation cannot be satisfied.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let too_large = || TexPakError::DimensionsTooLarge { width, height };
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(too_large)?;

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|_| too_large())?;
        pixels.resize(len, 0);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// RGBA bytes
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Take ownership of the RGBA bytes
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// RGBA value at `(x, y)`
    ///
    /// # Panics
    /// Panics if the coordinates are outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let start = y as usize * self.stride() + x as usize * BYTES_PER_PIXEL;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.pixels[start..start + BYTES_PER_PIXEL]);
        rgba
    }
}

/// Decode an entry payload into a raster
pub fn decode(header: &TextureHeader, words: &[u32]) -> Result<Raster> {
    decode_with_stats(header, words).map(|(raster, _)| raster)
}

/// Decode an entry payload, also returning decode counters
pub fn decode_with_stats(header: &TextureHeader, words: &[u32]) -> Result<(Raster, DecodeStats)> {
    let mut raster = Raster::new(header.width, header.height)?;
    let reader = BitReader::new(words);
    let mut state = DecoderState::new();
    let channels = Channel::sequence(header.has_alpha);

    let tiles_x = (header.width as usize).div_ceil(TILE_SIZE);
    let tiles_y = (header.height as usize).div_ceil(TILE_SIZE);

    for tile_y in 0..tiles_y {
        for tile_x in 0..tiles_x {
            for &channel in channels {
                let kind = state.decode_channel(&reader, channel);
                state.finish_channel(channel, kind);
            }
            color::write_tile(
                &state.planes,
                header.has_alpha,
                &mut raster,
                tile_x,
                tile_y,
            );
            state.stats.tiles += 1;
        }
    }

    // A payload cut short by the data file still counts at its declared size
    let payload_bits = reader.bit_len().max(header.word_count() as u64 * 32);
    state.stats.bits_consumed = state.cursor;
    state.stats.overrun_bits = state.cursor.saturating_sub(payload_bits);
    if state.stats.overrun_bits > 0 {
        log::warn!(
            "payload exhausted {} bits early ({}x{}), decoded with zero fill",
            state.stats.overrun_bits,
            header.width,
            header.height
        );
    }

    log::trace!(
        "decoded {}x{}: {} tiles, {} flat, {} coded, {} escapes, {} bits",
        header.width,
        header.height,
        state.stats.tiles,
        state.stats.flat_blocks,
        state.stats.coded_blocks,
        state.stats.escape_codes,
        state.stats.bits_consumed
    );

    Ok((raster, state.stats))
}

/// Decode a payload given as raw little-endian bytes
pub fn decode_bytes(header: &TextureHeader, payload: &[u8]) -> Result<Raster> {
    decode(header, &words_from_le_bytes(payload))
}
