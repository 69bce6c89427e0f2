//! Bitstream and archive builders shared by the integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use texpak::tables::{AC_CODES, END_CODE, ESCAPE_CODE, ESCAPE_LITERAL_BITS};

/// Fill mode of a flat block
const FILL_FLAT: u32 = 0b10;

/// Fill mode written in front of coded blocks
const FILL_CODED: u32 = 0b00;

/// DC size prefixes, indexed by delta width
const DC_PREFIXES: [(u32, u32); 11] = [
    (0b100, 3),
    (0b00, 2),
    (0b01, 2),
    (0b101, 3),
    (0b110, 3),
    (0b1110, 4),
    (0b11110, 5),
    (0b111110, 6),
    (0b1111110, 7),
    (0b11111110, 8),
    (0b11111111, 8),
];

/// MSB-first bit packer producing payload words
#[derive(Debug, Default)]
pub struct BitWriter {
    words: Vec<u32>,
    acc: u64,
    used: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: u32, width: u32) -> &mut Self {
        for bit in (0..width).rev() {
            self.acc = (self.acc << 1) | ((value >> bit) & 1) as u64;
            self.used += 1;
            if self.used == 32 {
                self.words.push(self.acc as u32);
                self.acc = 0;
                self.used = 0;
            }
        }
        self
    }

    /// Append a DC delta with its size prefix
    pub fn dc(&mut self, delta: i32) -> &mut Self {
        let magnitude = delta.unsigned_abs();
        let width = 32 - magnitude.leading_zeros();
        assert!(width <= 10, "DC delta {delta} out of range");

        let (prefix, prefix_len) = DC_PREFIXES[width as usize];
        self.push(prefix, prefix_len);
        if width > 0 {
            let raw = if delta > 0 {
                delta as u32
            } else {
                (delta + (1 << width) - 1) as u32
            };
            self.push(raw, width);
        }
        self
    }

    /// Append a flat block
    pub fn flat(&mut self, delta: i32) -> &mut Self {
        self.dc(delta).push(FILL_FLAT, 2)
    }

    /// Append the DC delta and fill mode that open a coded block
    pub fn coded_start(&mut self, delta: i32) -> &mut Self {
        self.dc(delta).push(FILL_CODED, 2)
    }

    /// Append a coded block with `(run, level)` pairs and the end code
    pub fn coded(&mut self, delta: i32, coefficients: &[(u8, i32)]) -> &mut Self {
        self.coded_start(delta);
        for &(run, level) in coefficients {
            self.coefficient(run, level);
        }
        self.push(END_CODE.0, END_CODE.1 as u32)
    }

    /// Append one coefficient, through the code table when possible
    pub fn coefficient(&mut self, run: u8, level: i32) -> &mut Self {
        assert_ne!(level, 0);
        let code = AC_CODES
            .iter()
            .find(|c| c.run == run && c.level as i32 == level.abs());
        match code {
            Some(code) => self
                .push(code.bits, code.len as u32)
                .push((level < 0) as u32, 1),
            None => self.escape(run, level),
        }
    }

    /// Append a coefficient as an escape literal
    pub fn escape(&mut self, run: u8, level: i32) -> &mut Self {
        self.push(ESCAPE_CODE.0, ESCAPE_CODE.1 as u32);
        let run = (run as u32) << 8;
        match level {
            -127..=127 => self.push(run | (level as u8) as u32, ESCAPE_LITERAL_BITS),
            128..=255 => self.push(run, ESCAPE_LITERAL_BITS).push(level as u32, 8),
            -256..=-128 => self
                .push(run | 0x80, ESCAPE_LITERAL_BITS)
                .push((level + 256) as u32, 8),
            _ => panic!("escape level {level} out of range"),
        }
    }

    pub fn bit_len(&self) -> u64 {
        self.words.len() as u64 * 32 + self.used as u64
    }

    pub fn into_words(mut self) -> Vec<u32> {
        if self.used > 0 {
            self.words.push((self.acc << (32 - self.used)) as u32);
        }
        self.words
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.into_words()
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect()
    }
}

/// Payload of tiles that are flat in every channel, given as absolute values
pub fn flat_tiles(tiles: &[[i32; 4]], has_alpha: bool) -> Vec<u8> {
    let channels = if has_alpha { 4 } else { 3 };
    let mut previous = [0i32; 4];
    let mut writer = BitWriter::new();
    for tile in tiles {
        for c in 0..channels {
            writer.flat(tile[c] - previous[c]);
            previous[c] = tile[c];
        }
    }
    writer.into_bytes()
}

/// In-memory directory/data pair
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    records: Vec<(String, u32)>,
    data: Vec<u8>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry header and payload to the data file
    pub fn entry(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        has_alpha: bool,
        payload: &[u8],
    ) -> &mut Self {
        let offset = self.data.len() as u32;
        self.data.extend_from_slice(&width.to_le_bytes());
        self.data.extend_from_slice(&height.to_le_bytes());
        self.data
            .extend_from_slice(&(payload.len() as u32 + 8).to_le_bytes());
        self.data.extend_from_slice(&((width / 4) as u16).to_le_bytes());
        self.data.extend_from_slice(&((height / 4) as u16).to_le_bytes());
        let flags: u32 = if has_alpha { 0x80 } else { 0 };
        self.data.extend_from_slice(&flags.to_le_bytes());
        self.data.extend_from_slice(payload);
        self.records.push((name.to_string(), offset));
        self
    }

    /// Add a directory record without data, e.g. pointing past the end
    pub fn record(&mut self, name: &str, offset: u32) -> &mut Self {
        self.records.push((name.to_string(), offset));
        self
    }

    pub fn directory_bytes(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, offset) in &self.records {
            body.extend_from_slice(name.as_bytes());
            body.push(0);
            body.extend_from_slice(&offset.to_le_bytes());
        }
        let mut bytes = b"TDIR".to_vec();
        bytes.extend_from_slice(&((12 + body.len()) as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.records.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&body);
        bytes
    }

    pub fn data_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Write `<stem>.dir` and `<stem>.dat` into `dir`, returning the directory path
    pub fn write_to(&self, dir: &Path, stem: &str) -> PathBuf {
        let directory_path = dir.join(format!("{stem}.dir"));
        fs::write(&directory_path, self.directory_bytes()).unwrap();
        fs::write(dir.join(format!("{stem}.dat")), &self.data).unwrap();
        directory_path
    }
}
