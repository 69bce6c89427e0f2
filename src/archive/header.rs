//! Data file entry headers

use crate::common::{TexPakError, DECLARED_SIZE_BIAS, ENTRY_HEADER_SIZE, FLAG_ALPHA};
use crate::Result;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// Metadata stored in front of every compressed texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureHeader {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Payload length in bytes (declared size minus 8)
    pub compressed_size: u32,
    /// Thumbnail width; not used by the decoder
    pub thumb_width: u16,
    /// Thumbnail height; not used by the decoder
    pub thumb_height: u16,
    /// Raw flags word
    pub flags: u32,
    /// Whether tiles carry an alpha block (flag bit 7)
    pub has_alpha: bool,
    /// Absolute offset of the first payload byte
    pub data_start: u64,
}

impl TextureHeader {
    /// Read the header stored at `offset`
    pub fn read_at<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<Self> {
        reader.seek(SeekFrom::Start(offset))?;
        Self::read_from(reader, offset).map_err(|err| match err {
            TexPakError::Io(io) if io.kind() == ErrorKind::UnexpectedEof => TexPakError::Format(
                format!("entry header at {offset:#x} is truncated"),
            ),
            other => other,
        })
    }

    fn read_from<R: Read>(reader: &mut R, offset: u64) -> Result<Self> {
        let width = reader.read_u32::<LittleEndian>()?;
        let height = reader.read_u32::<LittleEndian>()?;
        let declared_size = reader.read_u32::<LittleEndian>()?;
        let thumb_width = reader.read_u16::<LittleEndian>()?;
        let thumb_height = reader.read_u16::<LittleEndian>()?;
        let flags = reader.read_u32::<LittleEndian>()?;

        // The size field counts itself and the dimension words
        let compressed_size = declared_size.checked_sub(DECLARED_SIZE_BIAS).ok_or_else(|| {
            TexPakError::Format(format!(
                "entry at {offset:#x} declares size {declared_size}, below {DECLARED_SIZE_BIAS}"
            ))
        })?;

        Ok(Self {
            width,
            height,
            compressed_size,
            thumb_width,
            thumb_height,
            flags,
            has_alpha: flags & FLAG_ALPHA != 0,
            data_start: offset + ENTRY_HEADER_SIZE,
        })
    }

    /// Number of whole payload words
    pub fn word_count(&self) -> usize {
        (self.compressed_size / 4) as usize
    }
}
