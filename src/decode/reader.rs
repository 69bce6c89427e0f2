//! Random-access bit reader over the compressed payload
//!
//! The payload is a sequence of 32-bit words read MSB-first. The reader
//! keeps no cursor of its own: the decoder seeks backward and forward while
//! resolving codes, so every read names its absolute bit position.

/// Unaligned MSB-first bit extraction over 32-bit words
#[derive(Debug, Clone, Copy)]
pub struct BitReader<'a> {
    words: &'a [u32],
}

impl<'a> BitReader<'a> {
    /// Wrap a payload of little-endian-decoded words
    pub fn new(words: &'a [u32]) -> Self {
        Self { words }
    }

    /// Payload length in bits
    pub fn bit_len(&self) -> u64 {
        self.words.len() as u64 * 32
    }

    /// Word at `index`, or zero past the end of the payload
    fn word(&self, index: u64) -> u32 {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.words.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// Read `count` (at most 32) bits starting at absolute bit `pos`
    ///
    /// Reads that run past the last word see zero bits.
    pub fn read_bits(&self, pos: u64, count: u32) -> u32 {
        debug_assert!(count <= 32);
        if count == 0 {
            return 0;
        }

        let index = pos / 32;
        let offset = (pos % 32) as u32;

        let mut value = (self.word(index) << offset) >> (32 - count);
        if offset + count > 32 {
            value |= self.word(index + 1) >> (64 - offset - count);
        }
        value
    }
}

/// Reinterpret payload bytes as little-endian words
///
/// A trailing partial word is dropped.
pub fn words_from_le_bytes(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_reads() {
        let words = [0xDEAD_BEEF, 0x0123_4567];
        let reader = BitReader::new(&words);

        assert_eq!(reader.read_bits(0, 32), 0xDEAD_BEEF);
        assert_eq!(reader.read_bits(0, 8), 0xDE);
        assert_eq!(reader.read_bits(32, 16), 0x0123);
        assert_eq!(reader.read_bits(4, 4), 0xE);
    }

    #[test]
    fn test_crossing_read() {
        let words = [0x0000_00FF, 0xF000_0000];
        let reader = BitReader::new(&words);

        // Last 8 bits of word 0 and first 4 of word 1
        assert_eq!(reader.read_bits(24, 12), 0xFFF);
        assert_eq!(reader.read_bits(28, 8), 0xFF);
    }

    #[test]
    fn test_overrun_reads_zero() {
        let words = [0xFFFF_FFFF];
        let reader = BitReader::new(&words);

        assert_eq!(reader.read_bits(16, 32), 0xFFFF_0000);
        assert_eq!(reader.read_bits(32, 17), 0);
        assert_eq!(reader.read_bits(u64::MAX - 40, 32), 0);
        assert_eq!(BitReader::new(&[]).read_bits(0, 8), 0);
    }

    #[test]
    fn test_zero_count() {
        let reader = BitReader::new(&[0xFFFF_FFFF]);
        assert_eq!(reader.read_bits(5, 0), 0);
    }

    #[test]
    fn test_words_from_le_bytes() {
        let words = words_from_le_bytes(&[0x78, 0x56, 0x34, 0x12, 0xAA, 0xBB]);
        assert_eq!(words, vec![0x1234_5678]);
    }
}
