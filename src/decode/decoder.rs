//! Per-channel entropy decoding
//!
//! Each tile carries one block per channel: a DC delta against the running
//! accumulator and a two-bit fill mode. Flat blocks stop there; any other
//! mode is followed by a run/level coefficient stream terminated by the end
//! code.

use super::reader::BitReader;
use super::state::DecoderState;
use super::transform::inverse_transform;
use super::{BlockKind, FILL_FLAT, FILL_MODE_BITS};
use crate::common::{Channel, FIXED_SHIFT, TILE_AREA};
use crate::tables::{
    dc_skip_bits, dc_value_bits, lookup, Control, DC_JUMP, END_CODE, ESCAPE_CODE,
    ESCAPE_EXTENSION_BITS, ESCAPE_LITERAL_BITS, LOOKAHEAD_BITS, MULTIPLIER, ZIGZAG,
};

/// Width of the prefix indexing [`DC_JUMP`]
const DC_PREFIX_BITS: u32 = 8;

/// Undo the biased signed representation of a DC delta
///
/// Values in the lower half of the range are negative: `raw - (2^width - 1)`.
pub fn extend_dc(raw: u32, width: u32) -> i32 {
    if width == 0 {
        return 0;
    }
    let raw = raw as i32;
    if raw < 1 << (width - 1) {
        raw - ((1 << width) - 1)
    } else {
        raw
    }
}

impl DecoderState {
    /// Decode the next block of `channel` into `self.coefficients`
    ///
    /// Flat blocks leave spatial samples in the buffer; coded blocks leave
    /// dequantised coefficients that still need the inverse transform.
    pub fn decode_channel(&mut self, reader: &BitReader<'_>, channel: Channel) -> BlockKind {
        let entry = DC_JUMP[reader.read_bits(self.cursor, DC_PREFIX_BITS) as usize];
        let skip = dc_skip_bits(entry);
        let width = dc_value_bits(entry);
        let raw = reader.read_bits(self.cursor + skip as u64, width);
        self.cursor += (skip + width) as u64;

        let dc = &mut self.dc[channel.index()];
        *dc = dc.wrapping_add(extend_dc(raw, width));
        let base = *dc << FIXED_SHIFT;

        let fill_mode = reader.read_bits(self.cursor, FILL_MODE_BITS);
        self.cursor += FILL_MODE_BITS as u64;
        if fill_mode == FILL_FLAT {
            self.coefficients = [base; TILE_AREA];
            self.stats.flat_blocks += 1;
            return BlockKind::Flat;
        }

        self.coefficients = [0; TILE_AREA];
        self.coefficients[0] = base;

        let mut index = 0usize;
        loop {
            let lookahead = reader.read_bits(self.cursor, LOOKAHEAD_BITS);
            let (run, level) = match lookup(lookahead) {
                Control::End => {
                    self.cursor += END_CODE.1 as u64;
                    break;
                }
                // Corrupt stream: leave the cursor for the next block
                Control::Invalid => break,
                Control::Escape => self.read_escape(reader),
                Control::Coefficient { run, level, len } => {
                    self.cursor += len as u64;
                    (run as usize, level as i32)
                }
            };

            index += run + 1;
            if index >= TILE_AREA {
                break;
            }
            let pos = ZIGZAG[index] as usize;
            self.coefficients[pos] = level.wrapping_mul(MULTIPLIER[pos]);
        }

        self.stats.coded_blocks += 1;
        BlockKind::Coded
    }

    /// Read the run/level literal following an escape code
    fn read_escape(&mut self, reader: &BitReader<'_>) -> (usize, i32) {
        self.cursor += ESCAPE_CODE.1 as u64;
        let literal = reader.read_bits(self.cursor, ESCAPE_LITERAL_BITS);
        self.cursor += ESCAPE_LITERAL_BITS as u64;

        let run = (literal >> 8) as usize;
        let level = match literal & 0xFF {
            0x00 => {
                let extension = reader.read_bits(self.cursor, ESCAPE_EXTENSION_BITS) as i32;
                self.cursor += ESCAPE_EXTENSION_BITS as u64;
                extension
            }
            0x80 => {
                let extension = reader.read_bits(self.cursor, ESCAPE_EXTENSION_BITS) as i32;
                self.cursor += ESCAPE_EXTENSION_BITS as u64;
                extension - 256
            }
            byte => byte as u8 as i8 as i32,
        };

        self.stats.escape_codes += 1;
        (run, level)
    }

    /// Move the decoded block of `channel` into its spatial plane
    pub fn finish_channel(&mut self, channel: Channel, kind: BlockKind) {
        let plane = &mut self.planes[channel.index()];
        match kind {
            BlockKind::Flat => *plane = self.coefficients,
            BlockKind::Coded => inverse_transform(&self.coefficients, &mut self.workspace, plane),
        }
    }
}
