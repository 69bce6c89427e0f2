//! Paired directory/data texture archive
//!
//! The directory file maps entry names to offsets in the data file; the data
//! file holds, at each offset, a [`TextureHeader`] followed by the entry's
//! compressed payload. Opening an archive parses the whole directory once;
//! entry headers and payloads are read on demand.

mod directory;
mod header;

pub use directory::{ArchiveEntry, Directory};
pub use header::TextureHeader;

use crate::common::{DecodeStats, TexPakError};
use crate::decode::{self, words_from_le_bytes, Raster};
use crate::Result;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Extension of the data file paired with a directory file
pub const DATA_EXTENSION: &str = "dat";

/// Path of the data file paired with `directory_path`
pub fn data_path_for<P: AsRef<Path>>(directory_path: P) -> PathBuf {
    directory_path.as_ref().with_extension(DATA_EXTENSION)
}

/// An open texture archive
#[derive(Debug)]
pub struct Archive<R = BufReader<File>> {
    directory: Directory,
    data: R,
}

impl Archive<BufReader<File>> {
    /// Open a directory file and the data file next to it
    pub fn open<P: AsRef<Path>>(directory_path: P) -> Result<Self> {
        let data_path = data_path_for(&directory_path);
        Self::open_pair(directory_path, data_path)
    }

    /// Open an explicit directory/data file pair
    pub fn open_pair<P: AsRef<Path>, Q: AsRef<Path>>(
        directory_path: P,
        data_path: Q,
    ) -> Result<Self> {
        let directory_bytes = std::fs::read(directory_path.as_ref())?;
        let data = BufReader::new(File::open(data_path.as_ref())?);
        log::debug!(
            "opening archive {} with data file {}",
            directory_path.as_ref().display(),
            data_path.as_ref().display()
        );
        Self::from_parts(&directory_bytes, data)
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Build an archive from directory bytes and any seekable data source
    pub fn from_parts(directory_bytes: &[u8], data: R) -> Result<Self> {
        let directory = Directory::parse(directory_bytes)?;
        log::debug!("directory lists {} entries", directory.entries().len());
        Ok(Self { directory, data })
    }

    /// Parsed directory
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Entries in directory order
    pub fn entries(&self) -> &[ArchiveEntry] {
        self.directory.entries()
    }

    /// Number of directory records
    pub fn len(&self) -> usize {
        self.directory.entries().len()
    }

    /// Whether the directory has no records
    pub fn is_empty(&self) -> bool {
        self.directory.entries().is_empty()
    }

    /// Whether an entry with this exact name exists
    pub fn contains(&self, name: &str) -> bool {
        self.directory.get(name).is_some()
    }

    /// Directory record for a name
    pub fn entry(&self, name: &str) -> Result<&ArchiveEntry> {
        self.directory
            .get(name)
            .ok_or_else(|| TexPakError::NotFound(name.to_string()))
    }

    /// Read the data file header of a named entry
    pub fn resolve(&mut self, name: &str) -> Result<TextureHeader> {
        let offset = self.entry(name)?.data_offset;
        let header = TextureHeader::read_at(&mut self.data, offset as u64)?;
        log::debug!(
            "resolved {name}: {}x{}, {} payload bytes, alpha={}",
            header.width,
            header.height,
            header.compressed_size,
            header.has_alpha
        );
        Ok(header)
    }

    /// Read an entry's payload as little-endian words
    ///
    /// Only the bytes present in the data file are returned; the decoder
    /// reads zero bits past the end of a payload cut short.
    pub fn read_payload(&mut self, header: &TextureHeader) -> Result<Vec<u32>> {
        self.data.seek(SeekFrom::Start(header.data_start))?;

        let size = header.compressed_size as usize;
        let mut bytes = Vec::new();
        (&mut self.data)
            .take(header.compressed_size as u64)
            .read_to_end(&mut bytes)?;

        if bytes.len() < size {
            log::warn!(
                "payload at {:#x} truncated: {} of {} bytes present",
                header.data_start,
                bytes.len(),
                size
            );
        }
        if size % 4 != 0 {
            log::warn!(
                "payload at {:#x} is {} bytes, ignoring trailing partial word",
                header.data_start,
                size
            );
        }

        Ok(words_from_le_bytes(&bytes))
    }

    /// Resolve, read and decode a named entry
    pub fn decode(&mut self, name: &str) -> Result<Raster> {
        self.decode_with_stats(name).map(|(raster, _)| raster)
    }

    /// Resolve, read and decode a named entry, also returning decode counters
    pub fn decode_with_stats(&mut self, name: &str) -> Result<(Raster, DecodeStats)> {
        let header = self.resolve(name)?;
        let words = self.read_payload(&header)?;
        decode::decode_with_stats(&header, &words)
    }

    /// Decode every entry in directory order
    ///
    /// Failures are reported per entry and never stop the remaining ones.
    pub fn decode_all(&mut self) -> Vec<(String, Result<Raster>)> {
        let names: Vec<String> = self.entries().iter().map(|e| e.name.clone()).collect();
        names
            .into_iter()
            .map(|name| {
                let result = self.decode(&name);
                if let Err(err) = &result {
                    log::warn!("failed to decode {name}: {err}");
                }
                (name, result)
            })
            .collect()
    }

    /// Release the data source
    pub fn into_inner(self) -> R {
        self.data
    }
}
