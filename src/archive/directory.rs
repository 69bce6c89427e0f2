//! Directory file parsing
//!
//! The directory is a 12-byte header (magic, declared size, entry count)
//! followed by `count` records of a NUL-terminated name and a little-endian
//! offset into the data file.

use crate::common::{TexPakError, DIRECTORY_HEADER_SIZE};
use crate::Result;
use byteorder::{LittleEndian, ReadBytesExt};
use std::collections::HashMap;
use std::io::{BufRead, Cursor, Read};

/// One directory record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name as stored, case preserved
    pub name: String,
    /// Offset of the entry header in the data file
    pub data_offset: u32,
}

/// Parsed directory: records in file order plus a name index
#[derive(Debug, Clone)]
pub struct Directory {
    magic: [u8; 4],
    declared_size: u32,
    entries: Vec<ArchiveEntry>,
    index: HashMap<String, usize>,
}

impl Directory {
    /// Parse a complete directory file
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < DIRECTORY_HEADER_SIZE {
            return Err(TexPakError::Format(format!(
                "directory header needs {} bytes, file has {}",
                DIRECTORY_HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut cursor = Cursor::new(bytes);
        let mut magic = [0u8; 4];
        cursor.read_exact(&mut magic)?;
        let declared_size = cursor.read_u32::<LittleEndian>()?;
        let count = cursor.read_u32::<LittleEndian>()?;

        if declared_size as usize != bytes.len() {
            log::debug!(
                "directory declares {} bytes, file has {}",
                declared_size,
                bytes.len()
            );
        }

        // Each record needs at least a NUL and an offset
        let mut entries = Vec::with_capacity((count as usize).min(bytes.len() / 5));
        let mut index = HashMap::with_capacity(entries.capacity());
        let mut name = Vec::new();

        for record in 0..count {
            name.clear();
            cursor.read_until(0, &mut name)?;
            if name.pop() != Some(0) {
                return Err(TexPakError::Format(format!(
                    "record {record} of {count}: name is not NUL-terminated"
                )));
            }

            let data_offset = cursor.read_u32::<LittleEndian>().map_err(|_| {
                TexPakError::Format(format!("record {record} of {count}: offset is truncated"))
            })?;

            let name = String::from_utf8_lossy(&name).into_owned();
            index.entry(name.clone()).or_insert(entries.len());
            entries.push(ArchiveEntry { name, data_offset });
        }

        let consumed = cursor.position() as usize;
        if consumed != bytes.len() {
            return Err(TexPakError::Format(format!(
                "{} trailing bytes after {} records",
                bytes.len() - consumed,
                count
            )));
        }

        Ok(Self {
            magic,
            declared_size,
            entries,
            index,
        })
    }

    /// Magic bytes from the header
    pub fn magic(&self) -> [u8; 4] {
        self.magic
    }

    /// Size field from the header
    pub fn declared_size(&self) -> u32 {
        self.declared_size
    }

    /// Records in file order
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Look up a record by exact name; the first of any duplicates wins
    pub fn get(&self, name: &str) -> Option<&ArchiveEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }
}
