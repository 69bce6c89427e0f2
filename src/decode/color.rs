//! Pixel reconstruction
//!
//! Combines the decorrelated planes of a tile into RGBA8 and writes the
//! tile into the output raster. The red plane carries luma, blue the
//! Cb-like difference and green the Cr-like difference; all three are
//! zero-centred.

use super::Raster;
use crate::common::{Channel, BYTES_PER_PIXEL, FIXED_SHIFT, TILE_AREA, TILE_SIZE};

const CR_TO_R: f32 = 1.402;
const CB_TO_G: f32 = 0.344136;
const CR_TO_G: f32 = 0.714136;
const CB_TO_B: f32 = 1.772;

/// Alpha written for entries without an alpha plane
pub const OPAQUE: u8 = 0xFF;

/// Convert a 16.16 sample to a float
#[inline]
fn to_float(sample: i32) -> f32 {
    sample as f32 / (1u32 << FIXED_SHIFT) as f32
}

/// Round and clamp a reconstructed value to a byte
#[inline]
pub fn clamp_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Convert one luma/difference triple to RGB
pub fn ycc_to_rgb(y: f32, cb: f32, cr: f32) -> [u8; 3] {
    [
        clamp_channel(y + CR_TO_R * cr),
        clamp_channel(y - CB_TO_G * cb - CR_TO_G * cr),
        clamp_channel(y + CB_TO_B * cb),
    ]
}

/// Reconstruct the RGBA value of one tile position
pub fn reconstruct(planes: &[[i32; TILE_AREA]; 4], has_alpha: bool, pos: usize) -> [u8; 4] {
    let y = to_float(planes[Channel::Red.index()][pos]);
    let cr = to_float(planes[Channel::Green.index()][pos]);
    let cb = to_float(planes[Channel::Blue.index()][pos]);
    let [r, g, b] = ycc_to_rgb(y, cb, cr);

    let a = if has_alpha {
        clamp_channel(to_float(planes[Channel::Alpha.index()][pos]))
    } else {
        OPAQUE
    };

    [r, g, b, a]
}

/// Write a reconstructed tile at tile coordinates `(tile_x, tile_y)`
///
/// Columns and rows past the raster edge are dropped.
pub fn write_tile(
    planes: &[[i32; TILE_AREA]; 4],
    has_alpha: bool,
    raster: &mut Raster,
    tile_x: usize,
    tile_y: usize,
) {
    let width = raster.width() as usize;
    let height = raster.height() as usize;
    let x0 = tile_x * TILE_SIZE;
    let y0 = tile_y * TILE_SIZE;
    if x0 >= width || y0 >= height {
        return;
    }

    let cols = TILE_SIZE.min(width - x0);
    let rows = TILE_SIZE.min(height - y0);
    let stride = raster.stride();
    let pixels = raster.pixels_mut();

    for row in 0..rows {
        let start = (y0 + row) * stride + x0 * BYTES_PER_PIXEL;
        let line = &mut pixels[start..start + cols * BYTES_PER_PIXEL];
        for (col, pixel) in line.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
            pixel.copy_from_slice(&reconstruct(planes, has_alpha, row * TILE_SIZE + col));
        }
    }
}
