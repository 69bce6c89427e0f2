//! texpak - reader for a paired directory/data texture archive
//!
//! The archive stores every texture as an 8×8 block-transform bitstream: a
//! DC delta per channel, then either a flat fill or run/level coefficients,
//! an inverse butterfly transform and a fixed luma/difference to RGB
//! matrix. This crate parses the container and decodes entries into
//! RGBA8888 rasters; it never writes archives.
//!
//! # Features
//!
//! - Directory parsing with exact record accounting
//! - Bit-exact decoding of flat and coded blocks, with or without alpha
//! - Zero-filled, non-fatal decoding of truncated payloads
//! - Per-decode state, so entries can be decoded on many threads at once
//! - Concurrent batch extraction (`async` feature)
//!
//! # Example
//!
//! ```no_run
//! use texpak::Archive;
//!
//! let mut archive = Archive::open("textures.dir")?;
//! for entry in archive.entries() {
//!     println!("{} @ {:#x}", entry.name, entry.data_offset);
//! }
//!
//! let raster = archive.decode("tileA")?;
//! assert_eq!(raster.pixels().len(), (raster.width() * raster.height() * 4) as usize);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Public modules
pub mod archive;
pub mod common;
pub mod decode;
pub mod error;
pub mod tables;

// Async modules (only available with async feature)
#[cfg(feature = "async")]
pub mod async_batch;

// Re-export commonly used types
pub use archive::{data_path_for, Archive, ArchiveEntry, Directory, TextureHeader};
pub use common::{Channel, DecodeStats, Result, TexPakError, TILE_AREA, TILE_SIZE};
pub use decode::{decode_with_stats, BitReader, BlockKind, DecoderState, Raster};

#[cfg(feature = "async")]
pub use async_batch::AsyncBatchDecoder;

/// Decode an entry payload into an RGBA8888 raster
///
/// # Arguments
/// * `header` - The entry header from the data file
/// * `words` - The payload as little-endian 32-bit words
///
/// # Returns
/// The decoded raster, `header.width × header.height` pixels
pub fn decode(header: &TextureHeader, words: &[u32]) -> Result<Raster> {
    decode::decode(header, words)
}

/// Decode an entry payload given as raw bytes
///
/// # Arguments
/// * `header` - The entry header from the data file
/// * `payload` - `header.compressed_size` bytes following the header
pub fn decode_bytes(header: &TextureHeader, payload: &[u8]) -> Result<Raster> {
    decode::decode_bytes(header, payload)
}
